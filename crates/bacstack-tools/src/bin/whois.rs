use bacstack_client::BacnetClient;
use bacstack_tools::{init_logging, ConfigArgs};
use clap::Parser;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "bacstack-whois", about = "Broadcast a WhoIs and list the devices that answer")]
struct Args {
    #[command(flatten)]
    config: ConfigArgs,
    /// How long to collect IAm answers.
    #[arg(long, default_value_t = 3)]
    wait_secs: u64,
    /// Lowest device instance to ask for (needs --high).
    #[arg(long, requires = "high")]
    low: Option<u32>,
    /// Highest device instance to ask for (needs --low).
    #[arg(long, requires = "low")]
    high: Option<u32>,
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = args.config.load()?;
    init_logging(&config);

    let client = BacnetClient::with_config(config).await?;
    let range = args.low.zip(args.high);
    let devices = client
        .discover(range, Duration::from_secs(args.wait_secs))
        .await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&devices)?);
    } else {
        for d in &devices {
            println!(
                "device {} at {} vendor={:?} max_apdu={:?}",
                d.device_id, d.address, d.vendor_id, d.max_apdu
            );
        }
    }
    Ok(())
}
