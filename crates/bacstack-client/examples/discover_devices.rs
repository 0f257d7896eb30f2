//! Discover BACnet devices on the local network using WhoIs.
//!
//! Usage:
//!   cargo run -p bacstack-client --example discover_devices

use bacstack_client::BacnetClient;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Bound to 0.0.0.0:47808.
    let client = BacnetClient::new().await?;

    let devices = client.discover(None, Duration::from_secs(3)).await?;

    if devices.is_empty() {
        println!("No devices found.");
    } else {
        for device in &devices {
            println!(
                "Device {} at {} (vendor {:?}, max APDU {:?})",
                device.device_id, device.address, device.vendor_id, device.max_apdu
            );
        }
        println!("\nDiscovered {} device(s).", devices.len());
    }

    Ok(())
}
