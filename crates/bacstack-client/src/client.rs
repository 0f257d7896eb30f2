use crate::engine::{self, encode_apdu, encode_frame, Command, Engine, Inbound, Reply};
use crate::events::{DiscoveredDevice, EventSenders, Notification, TransportError};
use crate::invoke::InvokeIdAllocator;
use crate::{ClientConfig, ClientDataValue, ClientError, PropertyValue};
use bacstack_core::encoding::reader::Reader;
use bacstack_core::npdu::{Npdu, NpduAddress};
use bacstack_core::services::read_property::{
    ReadPropertyAck, ReadPropertyRequest, SERVICE_READ_PROPERTY,
};
use bacstack_core::services::subscribe_cov::{SubscribeCovRequest, SERVICE_SUBSCRIBE_COV};
use bacstack_core::services::who_is::WhoIsRequest;
use bacstack_core::services::write_property::{WritePropertyRequest, SERVICE_WRITE_PROPERTY};
use bacstack_core::types::{DataValue, ObjectId, ObjectType, PropertyId};
use bacstack_datalink::{BacnetIpTransport, BvlcFunction, DataLink, DataLinkAddress};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;

const INBOUND_QUEUE_LEN: usize = 256;

/// Async BACnet/IP client.
///
/// The client owns two tokio tasks: one receives datagrams, the other runs
/// the protocol engine that matches replies to requests, reassembles
/// segmented responses and publishes discoveries and notifications. Dropping
/// the client stops both.
///
/// ```no_run
/// # async fn demo() -> Result<(), bacstack_client::ClientError> {
/// use bacstack_client::{BacnetClient, ClientConfig};
/// use bacstack_core::types::{ObjectType, PropertyId};
/// use std::time::Duration;
///
/// let client = BacnetClient::with_config(ClientConfig::default()).await?;
/// for device in client.discover(None, Duration::from_secs(3)).await? {
///     let name = client
///         .read_property(
///             device.address,
///             device.device_id,
///             ObjectType::Device,
///             device.device_id,
///             PropertyId::ObjectName,
///         )
///         .await?;
///     println!("{}: {name:?}", device.device_id);
/// }
/// # Ok(())
/// # }
/// ```
pub struct BacnetClient {
    commands: mpsc::UnboundedSender<Command>,
    invoke_ids: Mutex<InvokeIdAllocator>,
    events: EventSenders,
    config: ClientConfig,
    engine_task: JoinHandle<()>,
    reader_task: JoinHandle<()>,
}

impl std::fmt::Debug for BacnetClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BacnetClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BacnetClient {
    /// Binds a UDP transport with the default configuration.
    pub async fn new() -> Result<Self, ClientError> {
        Self::with_config(ClientConfig::default()).await
    }

    pub async fn with_config(config: ClientConfig) -> Result<Self, ClientError> {
        let datalink = BacnetIpTransport::bind(config.bind_addr()).await?;
        Ok(Self::with_datalink(datalink, config))
    }

    /// Runs the client over any [`DataLink`]. Must be called from within a
    /// tokio runtime.
    pub fn with_datalink<D: DataLink + 'static>(datalink: D, config: ClientConfig) -> Self {
        let datalink = Arc::new(datalink);
        let events = EventSenders::new();
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_QUEUE_LEN);

        let engine = Engine::new(config.timeout, events.clone());
        let engine_task = tokio::spawn(engine::run(
            engine,
            datalink.clone(),
            command_rx,
            inbound_rx,
        ));
        let reader_task = tokio::spawn(engine::read_loop(datalink, inbound_tx));

        Self {
            commands,
            invoke_ids: Mutex::new(InvokeIdAllocator::new()),
            events,
            config,
            engine_task,
            reader_task,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Devices announced by IAm, in arrival order.
    pub fn discoveries(&self) -> broadcast::Receiver<DiscoveredDevice> {
        self.events.discoveries.subscribe()
    }

    /// Change-of-value and event notifications, confirmed or not.
    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.events.notifications.subscribe()
    }

    /// Send and receive failures of the data link.
    pub fn errors(&self) -> broadcast::Receiver<TransportError> {
        self.events.errors.subscribe()
    }

    /// Snapshot of every IAm seen so far. A device that answered twice is
    /// listed twice.
    pub async fn discovered_devices(&self) -> Result<Vec<DiscoveredDevice>, ClientError> {
        let (reply, rx) = oneshot::channel();
        self.submit(Command::Devices { reply })?;
        rx.await.map_err(|_| ClientError::EngineStopped)
    }

    /// Broadcasts a global WhoIs, optionally limited to a device instance
    /// range. Answers arrive on [`discoveries`](Self::discoveries).
    pub async fn who_is(&self, range: Option<(u32, u32)>) -> Result<(), ClientError> {
        let request = match range {
            Some((low, high)) => WhoIsRequest::range(low, high),
            None => WhoIsRequest::global(),
        };
        let apdu = encode_apdu(|w| request.encode(w))?;
        let npdu = Npdu::routed(NpduAddress::global_broadcast(), false);
        let frame = encode_frame(BvlcFunction::OriginalBroadcastNpdu, &npdu, &apdu)?;
        self.submit(Command::Send {
            address: DataLinkAddress::local_broadcast(self.config.port),
            frame,
        })
    }

    /// Sends a WhoIs and collects the devices that answer within `wait`.
    pub async fn discover(
        &self,
        range: Option<(u32, u32)>,
        wait: Duration,
    ) -> Result<Vec<DiscoveredDevice>, ClientError> {
        let mut discoveries = self.discoveries();
        self.who_is(range).await?;

        let deadline = Instant::now() + wait;
        let mut devices = Vec::new();
        loop {
            match tokio::time::timeout_at(deadline, discoveries.recv()).await {
                Ok(Ok(device)) => devices.push(device),
                Ok(Err(broadcast::error::RecvError::Lagged(skipped))) => {
                    log::warn!("discovery fell behind, {skipped} announcements skipped");
                }
                Ok(Err(broadcast::error::RecvError::Closed)) | Err(_) => break,
            }
        }
        Ok(devices)
    }

    pub async fn read_property(
        &self,
        address: DataLinkAddress,
        device_id: u32,
        object_type: ObjectType,
        instance: u32,
        property_id: PropertyId,
    ) -> Result<PropertyValue, ClientError> {
        let object_id = ObjectId::try_new(object_type, instance)?;
        let invoke_id = self.next_invoke_id().await;
        let request = ReadPropertyRequest {
            object_id,
            property_id,
            array_index: None,
            invoke_id,
        };
        let apdu = encode_apdu(|w| request.encode(w))?;
        let reply = self
            .send_confirmed(address, device_id, invoke_id, SERVICE_READ_PROPERTY, apdu)
            .await?;
        let Reply::Complex { payload, .. } = reply else {
            return Err(ClientError::UnsupportedResponse);
        };

        let mut r = Reader::new(&payload);
        let ack = ReadPropertyAck::decode_after_header(&mut r)?;
        Ok(into_property_value(property_id, ack.values))
    }

    pub async fn write_property(
        &self,
        address: DataLinkAddress,
        device_id: u32,
        object_type: ObjectType,
        instance: u32,
        property_id: PropertyId,
        values: &[ClientDataValue],
    ) -> Result<(), ClientError> {
        self.write_property_with_priority(
            address,
            device_id,
            object_type,
            instance,
            property_id,
            values,
            None,
        )
        .await
    }

    /// [`write_property`](Self::write_property) at a command priority
    /// (1..=16).
    #[allow(clippy::too_many_arguments)]
    pub async fn write_property_with_priority(
        &self,
        address: DataLinkAddress,
        device_id: u32,
        object_type: ObjectType,
        instance: u32,
        property_id: PropertyId,
        values: &[ClientDataValue],
        priority: Option<u8>,
    ) -> Result<(), ClientError> {
        let object_id = ObjectId::try_new(object_type, instance)?;
        let invoke_id = self.next_invoke_id().await;
        let data: Vec<DataValue<'_>> = values.iter().map(ClientDataValue::as_data_value).collect();
        let request = WritePropertyRequest {
            object_id,
            property_id,
            values: &data,
            priority,
            invoke_id,
        };
        let apdu = encode_apdu(|w| request.encode(w))?;
        self.expect_simple_ack(address, device_id, invoke_id, SERVICE_WRITE_PROPERTY, apdu)
            .await
    }

    /// Subscribes to change-of-value notifications; they arrive on
    /// [`notifications`](Self::notifications). The request's invoke ID is
    /// assigned here.
    pub async fn subscribe_cov(
        &self,
        address: DataLinkAddress,
        device_id: u32,
        mut request: SubscribeCovRequest,
    ) -> Result<(), ClientError> {
        request.invoke_id = self.next_invoke_id().await;
        let invoke_id = request.invoke_id;
        let apdu = encode_apdu(|w| request.encode(w))?;
        self.expect_simple_ack(address, device_id, invoke_id, SERVICE_SUBSCRIBE_COV, apdu)
            .await
    }

    pub async fn cancel_cov_subscription(
        &self,
        address: DataLinkAddress,
        device_id: u32,
        subscriber_process_id: u32,
        monitored_object_id: ObjectId,
    ) -> Result<(), ClientError> {
        self.subscribe_cov(
            address,
            device_id,
            SubscribeCovRequest::cancel(subscriber_process_id, monitored_object_id, 0),
        )
        .await
    }

    async fn next_invoke_id(&self) -> u8 {
        self.invoke_ids.lock().await.next()
    }

    fn submit(&self, command: Command) -> Result<(), ClientError> {
        self.commands
            .send(command)
            .map_err(|_| ClientError::EngineStopped)
    }

    async fn send_confirmed(
        &self,
        address: DataLinkAddress,
        device_id: u32,
        invoke_id: u8,
        service_choice: u8,
        apdu: Vec<u8>,
    ) -> Result<Reply, ClientError> {
        let (reply, rx) = oneshot::channel();
        self.submit(Command::Confirmed {
            address,
            device_id: Some(device_id),
            invoke_id,
            service_choice,
            apdu,
            reply,
        })?;
        rx.await.map_err(|_| ClientError::EngineStopped)?
    }

    async fn expect_simple_ack(
        &self,
        address: DataLinkAddress,
        device_id: u32,
        invoke_id: u8,
        service_choice: u8,
        apdu: Vec<u8>,
    ) -> Result<(), ClientError> {
        match self
            .send_confirmed(address, device_id, invoke_id, service_choice, apdu)
            .await?
        {
            Reply::Simple { .. } => Ok(()),
            Reply::Complex { .. } => Err(ClientError::UnsupportedResponse),
        }
    }
}

impl Drop for BacnetClient {
    fn drop(&mut self) {
        self.engine_task.abort();
        self.reader_task.abort();
    }
}

fn into_property_value(property_id: PropertyId, values: Vec<DataValue<'_>>) -> PropertyValue {
    if property_id == PropertyId::ObjectList {
        return PropertyValue::ObjectList(
            values
                .into_iter()
                .filter_map(|v| match v {
                    DataValue::ObjectId(id) => Some(id),
                    _ => None,
                })
                .collect(),
        );
    }
    let mut values: Vec<ClientDataValue> = values.into_iter().map(ClientDataValue::from).collect();
    match values.len() {
        1 => PropertyValue::Value(values.remove(0)),
        _ => PropertyValue::List(values),
    }
}

#[cfg(test)]
mod tests {
    use super::BacnetClient;
    use crate::engine::encode_frame;
    use crate::{ClientConfig, ClientDataValue, ClientError, Notification, PropertyValue};
    use bacstack_core::npdu::Npdu;
    use bacstack_core::services::subscribe_cov::{CovSubscription, SubscribeCovRequest};
    use bacstack_core::types::{ErrorClass, ErrorCode, ObjectId, ObjectType, PropertyId};
    use bacstack_core::EncodeError;
    use bacstack_datalink::{BvlcFunction, DataLink, DataLinkAddress, DataLinkError};
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use std::time::Duration;
    use tokio::sync::{mpsc, Mutex};
    use tokio::time::timeout;

    struct MockDataLink {
        sent: mpsc::UnboundedSender<(DataLinkAddress, Vec<u8>)>,
        inbound: Mutex<mpsc::UnboundedReceiver<(Vec<u8>, DataLinkAddress)>>,
    }

    impl DataLink for MockDataLink {
        async fn send(&self, address: DataLinkAddress, frame: &[u8]) -> Result<(), DataLinkError> {
            self.sent
                .send((address, frame.to_vec()))
                .map_err(|_| DataLinkError::Closed)
        }

        async fn recv(&self, buf: &mut [u8]) -> Result<(usize, DataLinkAddress), DataLinkError> {
            let mut inbound = self.inbound.lock().await;
            let Some((frame, source)) = inbound.recv().await else {
                return Err(DataLinkError::Closed);
            };
            if frame.len() > buf.len() {
                return Err(DataLinkError::FrameTooLarge);
            }
            buf[..frame.len()].copy_from_slice(&frame);
            Ok((frame.len(), source))
        }
    }

    /// The far side of a [`MockDataLink`].
    struct Peer {
        sent: mpsc::UnboundedReceiver<(DataLinkAddress, Vec<u8>)>,
        inbound: mpsc::UnboundedSender<(Vec<u8>, DataLinkAddress)>,
    }

    impl Peer {
        async fn next_sent(&mut self) -> (DataLinkAddress, Vec<u8>) {
            timeout(Duration::from_secs(1), self.sent.recv())
                .await
                .expect("client sent nothing")
                .expect("client gone")
        }

        fn reply(&self, from: DataLinkAddress, apdu: &[u8]) {
            let frame =
                encode_frame(BvlcFunction::OriginalUnicastNpdu, &Npdu::local(false), apdu).unwrap();
            self.inbound.send((frame, from)).unwrap();
        }
    }

    fn device_addr() -> DataLinkAddress {
        DataLinkAddress::Ip(SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)), 47808))
    }

    fn client_with(config: ClientConfig) -> (BacnetClient, Peer) {
        let (sent_tx, sent_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let datalink = MockDataLink {
            sent: sent_tx,
            inbound: Mutex::new(inbound_rx),
        };
        (
            BacnetClient::with_datalink(datalink, config),
            Peer {
                sent: sent_rx,
                inbound: inbound_tx,
            },
        )
    }

    fn client() -> (BacnetClient, Peer) {
        client_with(ClientConfig::default())
    }

    // BVLC (4) + local NPDU expecting a reply (2) + confirmed header up to the invoke id.
    fn invoke_id_of(frame: &[u8]) -> u8 {
        frame[8]
    }

    const I_AM_1234: [u8; 14] = [
        0x10, 0x00, 0xC4, 0x02, 0x00, 0x04, 0xD2, 0x22, 0x05, 0xC4, 0x91, 0x03, 0x21, 0x0F,
    ];

    #[tokio::test]
    async fn who_is_broadcasts_global_request() {
        let (client, mut peer) = client();
        client.who_is(None).await.unwrap();

        let (address, frame) = peer.next_sent().await;
        assert_eq!(address, DataLinkAddress::local_broadcast(47808));
        assert_eq!(
            frame,
            vec![0x81, 0x0B, 0x00, 0x0C, 0x01, 0x20, 0xFF, 0xFF, 0x00, 0xFF, 0x10, 0x08]
        );
    }

    #[tokio::test]
    async fn who_is_rejects_out_of_range_limits() {
        let (client, mut peer) = client();
        let err = client.who_is(Some((0, 0x40_0000))).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Encode(EncodeError::InstanceOutOfRange(0x40_0000))
        ));
        assert!(peer.sent.try_recv().is_err());
    }

    #[tokio::test]
    async fn i_am_is_published_as_discovery() {
        let (client, peer) = client();
        let mut discoveries = client.discoveries();

        peer.reply(device_addr(), &I_AM_1234);

        let device = timeout(Duration::from_secs(1), discoveries.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(device.address, device_addr());
        assert_eq!(device.device_id, 1234);
        assert_eq!(device.npdu_source, None);
        assert_eq!(device.max_apdu, Some(1476));
        assert_eq!(device.vendor_id, Some(15));
    }

    #[tokio::test]
    async fn repeated_i_am_keeps_every_entry() {
        let (client, peer) = client();
        let mut discoveries = client.discoveries();

        peer.reply(device_addr(), &I_AM_1234);
        peer.reply(device_addr(), &I_AM_1234);
        for _ in 0..2 {
            timeout(Duration::from_secs(1), discoveries.recv())
                .await
                .unwrap()
                .unwrap();
        }

        let devices = client.discovered_devices().await.unwrap();
        assert_eq!(devices.len(), 2);
        assert!(devices.iter().all(|d| d.device_id == 1234));
    }

    #[tokio::test]
    async fn discover_collects_answers_until_the_window_closes() {
        let (client, mut peer) = client();
        let discover = client.discover(None, Duration::from_millis(200));
        let answer = async {
            peer.next_sent().await;
            peer.reply(device_addr(), &I_AM_1234);
        };
        let (devices, ()) = tokio::join!(discover, answer);
        let devices = devices.unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].device_id, 1234);
    }

    #[tokio::test]
    async fn read_property_returns_single_value() {
        let (client, mut peer) = client();
        let read = client.read_property(
            device_addr(),
            1234,
            ObjectType::AnalogInput,
            1,
            PropertyId::PresentValue,
        );
        let respond = async {
            let (address, frame) = peer.next_sent().await;
            assert_eq!(address, device_addr());
            assert_eq!(&frame[4..6], &[0x01, 0x04]);
            assert_eq!(frame[9], 0x0C);
            let invoke_id = invoke_id_of(&frame);
            peer.reply(
                device_addr(),
                &[
                    0x30, invoke_id, 0x0C, 0x0C, 0x00, 0x00, 0x00, 0x01, 0x19, 0x55, 0x3E, 0x21,
                    0x2A, 0x3F,
                ],
            );
        };
        let (value, ()) = tokio::join!(read, respond);
        assert_eq!(
            value.unwrap(),
            PropertyValue::Value(ClientDataValue::Unsigned(42))
        );
    }

    #[tokio::test]
    async fn read_object_list_yields_object_ids() {
        let (client, mut peer) = client();
        let read = client.read_property(
            device_addr(),
            1234,
            ObjectType::Device,
            1234,
            PropertyId::ObjectList,
        );
        let respond = async {
            let (_, frame) = peer.next_sent().await;
            let invoke_id = invoke_id_of(&frame);
            peer.reply(
                device_addr(),
                &[
                    0x30, invoke_id, 0x0C, 0x0C, 0x02, 0x00, 0x04, 0xD2, 0x19, 0x4C, 0x3E, 0xC4,
                    0x02, 0x00, 0x04, 0xD2, 0xC4, 0x00, 0x00, 0x00, 0x01, 0x3F,
                ],
            );
        };
        let (value, ()) = tokio::join!(read, respond);
        assert_eq!(
            value.unwrap(),
            PropertyValue::ObjectList(vec![
                ObjectId::new(ObjectType::Device, 1234),
                ObjectId::new(ObjectType::AnalogInput, 1),
            ])
        );
    }

    #[tokio::test]
    async fn invalid_instance_fails_before_sending() {
        let (client, mut peer) = client();
        let err = client
            .read_property(
                device_addr(),
                1234,
                ObjectType::AnalogInput,
                0x40_0000,
                PropertyId::PresentValue,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Encode(EncodeError::InstanceOutOfRange(0x40_0000))
        ));
        assert!(peer.sent.try_recv().is_err());
    }

    #[tokio::test]
    async fn unanswered_request_times_out_and_late_reply_is_dropped() {
        let (client, mut peer) =
            client_with(ClientConfig::default().with_timeout(Duration::from_millis(50)));
        let err = client
            .read_property(
                device_addr(),
                1234,
                ObjectType::AnalogInput,
                1,
                PropertyId::PresentValue,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Timeout { invoke_id: 1 }));

        let (_, frame) = peer.next_sent().await;
        peer.reply(
            device_addr(),
            &[
                0x30,
                invoke_id_of(&frame),
                0x0C,
                0x0C,
                0x00,
                0x00,
                0x00,
                0x01,
                0x19,
                0x55,
                0x3E,
                0x21,
                0x2A,
                0x3F,
            ],
        );

        // The next request gets a fresh invoke id and its own answer.
        let write = client.write_property(
            device_addr(),
            1234,
            ObjectType::AnalogValue,
            1,
            PropertyId::PresentValue,
            &[ClientDataValue::Real(1.5)],
        );
        let respond = async {
            let (_, frame) = peer.next_sent().await;
            assert_eq!(invoke_id_of(&frame), 2);
            peer.reply(device_addr(), &[0x20, 2, 0x0F]);
        };
        let (result, ()) = tokio::join!(write, respond);
        result.unwrap();
    }

    #[tokio::test]
    async fn write_property_encodes_values_and_priority() {
        let (client, mut peer) = client();
        let write = client.write_property_with_priority(
            device_addr(),
            1234,
            ObjectType::AnalogValue,
            1,
            PropertyId::PresentValue,
            &[ClientDataValue::Real(72.5)],
            Some(8),
        );
        let respond = async {
            let (_, frame) = peer.next_sent().await;
            let invoke_id = invoke_id_of(&frame);
            assert_eq!(
                &frame[9..],
                &[
                    0x0F, 0x0C, 0x00, 0x80, 0x00, 0x01, 0x3E, 0x44, 0x42, 0x91, 0x00, 0x00, 0x3F,
                    0x19, 0x55, 0x49, 0x08,
                ]
            );
            peer.reply(device_addr(), &[0x20, invoke_id, 0x0F]);
        };
        let (result, ()) = tokio::join!(write, respond);
        result.unwrap();
    }

    #[tokio::test]
    async fn remote_error_is_reported() {
        let (client, mut peer) = client();
        let read = client.read_property(
            device_addr(),
            1234,
            ObjectType::AnalogInput,
            1,
            PropertyId::Proprietary(512),
        );
        let respond = async {
            let (_, frame) = peer.next_sent().await;
            peer.reply(
                device_addr(),
                &[0x50, invoke_id_of(&frame), 0x0C, 0x91, 0x02, 0x91, 0x20],
            );
        };
        let (result, ()) = tokio::join!(read, respond);
        match result.unwrap_err() {
            ClientError::RemoteServiceError {
                service_choice,
                error_class,
                error_code,
                ..
            } => {
                assert_eq!(service_choice, 0x0C);
                assert_eq!(error_class, Some(ErrorClass::Property));
                assert_eq!(error_code, Some(ErrorCode::UnknownProperty));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn subscribe_then_receive_notification() {
        let (client, mut peer) = client();
        let mut notifications = client.notifications();
        let object_id = ObjectId::new(ObjectType::AnalogInput, 1);

        let subscribe = client.subscribe_cov(
            device_addr(),
            1234,
            SubscribeCovRequest {
                subscriber_process_id: 1,
                monitored_object_id: object_id,
                subscription: Some(CovSubscription {
                    issue_confirmed_notifications: false,
                    lifetime_seconds: 300,
                }),
                invoke_id: 0,
            },
        );
        let respond = async {
            let (_, frame) = peer.next_sent().await;
            assert_eq!(frame[9], 0x05);
            peer.reply(device_addr(), &[0x20, invoke_id_of(&frame), 0x05]);
        };
        let (result, ()) = tokio::join!(subscribe, respond);
        result.unwrap();

        peer.reply(
            device_addr(),
            &[
                0x10, 0x02, 0x09, 0x01, 0x1C, 0x02, 0x00, 0x04, 0xD2, 0x2C, 0x00, 0x00, 0x00,
                0x01, 0x39, 0x00, 0x4E, 0x09, 0x55, 0x2E, 0x44, 0x42, 0x28, 0x00, 0x00, 0x2F,
                0x4F,
            ],
        );
        let notification = timeout(Duration::from_secs(1), notifications.recv())
            .await
            .unwrap()
            .unwrap();
        let Notification::Cov(cov) = notification else {
            panic!("expected a cov notification");
        };
        assert!(!cov.confirmed);
        assert_eq!(cov.monitored_object_id, object_id);
        assert_eq!(cov.values[0].values, vec![ClientDataValue::Real(42.0)]);
    }

    #[tokio::test]
    async fn closed_link_is_reported_on_error_stream() {
        let (client, peer) = client();
        let mut errors = client.errors();
        drop(peer);

        let err = timeout(Duration::from_secs(1), errors.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(*err, DataLinkError::Closed));
    }
}
