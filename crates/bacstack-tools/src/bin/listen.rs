use bacstack_client::{BacnetClient, Notification};
use bacstack_core::services::subscribe_cov::{CovSubscription, SubscribeCovRequest};
use bacstack_core::types::ObjectId;
use bacstack_datalink::DataLinkAddress;
use bacstack_tools::{init_logging, ConfigArgs, ObjectTypeArg};
use clap::Parser;
use std::net::IpAddr;
use tokio::sync::broadcast::error::RecvError;

#[derive(Parser, Debug)]
#[command(name = "bacstack-listen", about = "Print COV and event notifications")]
struct Args {
    #[command(flatten)]
    config: ConfigArgs,
    #[arg(long)]
    ip: Option<IpAddr>,
    #[arg(long, default_value_t = 47808)]
    port: u16,
    #[arg(long)]
    device: Option<u32>,
    /// Subscribe to COV for this object type.
    #[arg(long, value_enum, requires = "ip", requires = "device", requires = "instance")]
    object_type: Option<ObjectTypeArg>,
    /// Instance number for COV subscription.
    #[arg(long)]
    instance: Option<u32>,
    #[arg(long, default_value_t = 1)]
    process_id: u32,
    /// Subscription lifetime; 0 subscribes indefinitely.
    #[arg(long, default_value_t = 0)]
    lifetime_seconds: u32,
    /// Ask for confirmed notifications.
    #[arg(long)]
    confirmed: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = args.config.load()?;
    init_logging(&config);

    let client = BacnetClient::with_config(config).await?;
    let mut notifications = client.notifications();
    let mut errors = client.errors();

    if let (Some(ip), Some(device), Some(object_type), Some(instance)) =
        (args.ip, args.device, args.object_type, args.instance)
    {
        let addr = DataLinkAddress::Ip((ip, args.port).into());
        let object_id = ObjectId::try_new(object_type.into_object_type(), instance)?;
        client
            .subscribe_cov(
                addr,
                device,
                SubscribeCovRequest {
                    subscriber_process_id: args.process_id,
                    monitored_object_id: object_id,
                    subscription: Some(CovSubscription {
                        issue_confirmed_notifications: args.confirmed,
                        lifetime_seconds: args.lifetime_seconds,
                    }),
                    invoke_id: 0,
                },
            )
            .await?;
        println!("COV subscription active for {object_id}");
    }

    println!("Listening for notifications (Ctrl+C to stop)...");
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            received = notifications.recv() => match received {
                Ok(Notification::Cov(cov)) => println!(
                    "COV from {}: object={} values={:?}",
                    cov.source, cov.monitored_object_id, cov.values
                ),
                Ok(Notification::Event(evt)) => println!(
                    "EVENT from {}: object={} type={} state={:?}->{:?}",
                    evt.source, evt.event_object_id, evt.event_type, evt.from_state, evt.to_state
                ),
                Err(RecvError::Lagged(n)) => log::warn!("{n} notifications dropped"),
                Err(RecvError::Closed) => break,
            },
            received = errors.recv() => match received {
                Ok(err) => log::error!("transport: {err}"),
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
            _ = &mut shutdown => break,
        }
    }
    Ok(())
}
