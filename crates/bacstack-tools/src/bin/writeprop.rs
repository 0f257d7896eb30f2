use bacstack_client::BacnetClient;
use bacstack_datalink::DataLinkAddress;
use bacstack_tools::{
    init_logging, parse_value, select_property, ConfigArgs, ObjectTypeArg, PropertyArg,
    ValueTypeArg,
};
use clap::Parser;
use std::net::IpAddr;

#[derive(Parser, Debug)]
#[command(name = "bacstack-writeprop", about = "Write one property of a BACnet object")]
struct Args {
    #[command(flatten)]
    config: ConfigArgs,
    #[arg(long)]
    ip: IpAddr,
    #[arg(long, default_value_t = 47808)]
    port: u16,
    #[arg(long)]
    device: u32,
    #[arg(long, value_enum, default_value = "analog-output")]
    object_type: ObjectTypeArg,
    #[arg(long)]
    instance: u32,
    #[arg(long, value_enum, default_value = "present-value")]
    property: PropertyArg,
    #[arg(long)]
    property_id: Option<u32>,
    #[arg(long, value_enum, default_value = "real")]
    value_type: ValueTypeArg,
    #[arg(long)]
    value: String,
    /// Command priority, 1 (highest) to 16.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=16))]
    priority: Option<u8>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = args.config.load()?;
    init_logging(&config);

    let value = parse_value(args.value_type, &args.value)?;
    let client = BacnetClient::with_config(config).await?;
    let addr = DataLinkAddress::Ip((args.ip, args.port).into());

    client
        .write_property_with_priority(
            addr,
            args.device,
            args.object_type.into_object_type(),
            args.instance,
            select_property(args.property, args.property_id),
            &[value],
            args.priority,
        )
        .await?;
    println!("write acknowledged");
    Ok(())
}
