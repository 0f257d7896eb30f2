//! Read the present value of an object on a device.
//!
//! Usage:
//!   cargo run -p bacstack-client --example read_property -- --ip 192.168.1.100 --device 1234

use bacstack_client::BacnetClient;
use bacstack_core::types::{ObjectType, PropertyId};
use bacstack_datalink::DataLinkAddress;
use std::net::IpAddr;

fn arg(name: &str) -> Option<String> {
    std::env::args().skip_while(|a| a != name).nth(1)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let ip: IpAddr = arg("--ip")
        .ok_or("usage: --ip <device-ip> --device <instance>")?
        .parse()?;
    let device_id: u32 = arg("--device")
        .ok_or("usage: --ip <device-ip> --device <instance>")?
        .parse()?;

    let client = BacnetClient::new().await?;
    let address = DataLinkAddress::Ip((ip, DataLinkAddress::BACNET_IP_DEFAULT_PORT).into());

    let name = client
        .read_property(
            address,
            device_id,
            ObjectType::Device,
            device_id,
            PropertyId::ObjectName,
        )
        .await?;
    println!("Device object-name: {name:?}");

    let value = client
        .read_property(
            address,
            device_id,
            ObjectType::AnalogInput,
            0,
            PropertyId::PresentValue,
        )
        .await?;
    println!("analog-input,0 present-value: {value:?}");
    Ok(())
}
