use bacstack_client::BacnetClient;
use bacstack_datalink::DataLinkAddress;
use bacstack_tools::{init_logging, select_property, ConfigArgs, ObjectTypeArg, PropertyArg};
use clap::Parser;
use std::net::IpAddr;

#[derive(Parser, Debug)]
#[command(name = "bacstack-readprop", about = "Read one property of a BACnet object")]
struct Args {
    #[command(flatten)]
    config: ConfigArgs,
    #[arg(long)]
    ip: IpAddr,
    #[arg(long, default_value_t = 47808)]
    port: u16,
    /// Device instance of the target.
    #[arg(long)]
    device: u32,
    #[arg(long, value_enum, default_value = "device")]
    object_type: ObjectTypeArg,
    /// Object instance; defaults to the device instance.
    #[arg(long)]
    instance: Option<u32>,
    #[arg(long, value_enum, default_value = "present-value")]
    property: PropertyArg,
    /// Numeric property identifier, overrides --property.
    #[arg(long)]
    property_id: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = args.config.load()?;
    init_logging(&config);

    let client = BacnetClient::with_config(config).await?;
    let addr = DataLinkAddress::Ip((args.ip, args.port).into());
    let result = client
        .read_property(
            addr,
            args.device,
            args.object_type.into_object_type(),
            args.instance.unwrap_or(args.device),
            select_property(args.property, args.property_id),
        )
        .await;

    match result {
        Ok(v) => println!("value: {v:?}"),
        Err(e) => {
            eprintln!("read failed: {e}");
            std::process::exit(1);
        }
    }
    Ok(())
}
