//! The protocol engine.
//!
//! [`Engine`] holds every piece of mutable protocol state: outstanding
//! invocations, segment assemblies and discovered devices. It is driven
//! one event at a time (a command, a datagram, a timer tick) and queues the
//! frames it wants sent. [`run`] owns an engine on a tokio task and
//! [`read_loop`] feeds it datagrams from the data link.

use crate::events::{CovNotification, DiscoveredDevice, EventNotification, EventSenders, Notification};
use crate::invoke::{Completion, PendingInvocation, PendingTable};
use crate::segmentation::{SegmentKind, SegmentOutcome, SegmentTable, MAX_REASSEMBLY_LEN};
use crate::ClientError;
use bacstack_core::apdu::{
    AbortPdu, ApduType, ComplexAckHeader, ConfirmedRequestHeader, ErrorPduHeader, RejectPdu,
    SegmentAck, SimpleAck, UnconfirmedRequestHeader,
};
use bacstack_core::encoding::{reader::Reader, writer::Writer};
use bacstack_core::npdu::{Npdu, NpduAddress};
use bacstack_core::services::cov_notification::{
    CovNotificationRequest, SERVICE_CONFIRMED_COV_NOTIFICATION,
    SERVICE_UNCONFIRMED_COV_NOTIFICATION,
};
use bacstack_core::services::error::ServiceError;
use bacstack_core::services::event_notification::{
    EventNotificationRequest, SERVICE_CONFIRMED_EVENT_NOTIFICATION,
    SERVICE_UNCONFIRMED_EVENT_NOTIFICATION,
};
use bacstack_core::services::i_am::{IAmRequest, SERVICE_I_AM};
use bacstack_core::{DecodeError, EncodeError};
use bacstack_datalink::bip::bvlc::BVLC_HEADER_LEN;
use bacstack_datalink::{
    BvlcFrame, BvlcFunction, BvlcHeader, DataLink, DataLinkAddress, DataLinkError,
    MAX_BIP_FRAME_LEN,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};

// version, control, DNET/DLEN/DADR and SNET/SLEN/SADR with 8-octet MACs, hop count
const MAX_NPDU_HEADER_LEN: usize = 2 + 2 * (3 + 8) + 1;

/// Successful outcome of a confirmed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Reply {
    Simple { service_choice: u8 },
    /// Service payload following the complex-ack header.
    Complex { service_choice: u8, payload: Vec<u8> },
}

#[derive(Debug)]
pub(crate) enum Command {
    /// Send a confirmed request and report its outcome on `reply`.
    Confirmed {
        address: DataLinkAddress,
        /// Device instance, used to find a routed path to the device.
        device_id: Option<u32>,
        invoke_id: u8,
        service_choice: u8,
        apdu: Vec<u8>,
        reply: Completion,
    },
    /// Send a finished frame; no reply is expected.
    Send {
        address: DataLinkAddress,
        frame: Vec<u8>,
    },
    Devices {
        reply: oneshot::Sender<Vec<DiscoveredDevice>>,
    },
}

#[derive(Debug)]
pub(crate) enum Inbound {
    Datagram(Vec<u8>, DataLinkAddress),
    TransportError(DataLinkError),
}

/// Builds a complete BACnet/IP frame: BVLC header, `npdu`, then `apdu`.
pub(crate) fn encode_frame(
    function: BvlcFunction,
    npdu: &Npdu,
    apdu: &[u8],
) -> Result<Vec<u8>, EncodeError> {
    let mut buf = vec![0u8; BVLC_HEADER_LEN + MAX_NPDU_HEADER_LEN + apdu.len()];
    let mut w = Writer::new(&mut buf);
    w.write_all(&[0; BVLC_HEADER_LEN])?;
    npdu.encode(&mut w)?;
    w.write_all(apdu)?;
    let len = w.position();
    buf.truncate(len);
    BvlcHeader::patch(&mut buf, function)?;
    Ok(buf)
}

/// Encodes an APDU into a buffer that grows until it fits.
pub(crate) fn encode_apdu<F>(mut encode: F) -> Result<Vec<u8>, EncodeError>
where
    F: FnMut(&mut Writer<'_>) -> Result<(), EncodeError>,
{
    for size in [512usize, 1024, 2048, 4096, 8192, 16_384, 32_768, 65_536] {
        let mut buf = vec![0u8; size];
        let mut w = Writer::new(&mut buf);
        match encode(&mut w) {
            Ok(()) => {
                let written_len = w.as_written().len();
                buf.truncate(written_len);
                return Ok(buf);
            }
            Err(EncodeError::BufferTooSmall) => continue,
            Err(e) => return Err(e),
        }
    }
    Err(EncodeError::BufferTooSmall)
}

fn reply_npdu(npdu_source: Option<NpduAddress>) -> Npdu {
    match npdu_source {
        Some(source) => Npdu::routed(source, false),
        None => Npdu::local(false),
    }
}

pub(crate) struct Engine {
    timeout: Duration,
    pending: PendingTable,
    segments: SegmentTable,
    devices: Vec<DiscoveredDevice>,
    outbound: Vec<(DataLinkAddress, Vec<u8>)>,
    events: EventSenders,
}

impl Engine {
    pub fn new(timeout: Duration, events: EventSenders) -> Self {
        Self {
            timeout,
            pending: PendingTable::default(),
            segments: SegmentTable::default(),
            devices: Vec::new(),
            outbound: Vec::new(),
            events,
        }
    }

    pub fn handle_command(&mut self, command: Command, now: Instant) {
        match command {
            Command::Confirmed {
                address,
                device_id,
                invoke_id,
                service_choice,
                apdu,
                reply,
            } => {
                if self.pending.contains(invoke_id) {
                    let _ = reply.send(Err(ClientError::InvokeIdInUse { invoke_id }));
                    return;
                }
                let npdu = match self.route_to(address, device_id) {
                    Some(destination) => Npdu::routed(destination, true),
                    None => Npdu::local(true),
                };
                let frame = match encode_frame(BvlcFunction::OriginalUnicastNpdu, &npdu, &apdu) {
                    Ok(frame) => frame,
                    Err(e) => {
                        let _ = reply.send(Err(e.into()));
                        return;
                    }
                };
                let pending =
                    PendingInvocation::new(address, service_choice, now + self.timeout, reply);
                if self.pending.insert(invoke_id, pending).is_ok() {
                    log::debug!("sending service {service_choice} to {address} as invoke {invoke_id}");
                    self.outbound.push((address, frame));
                }
            }
            Command::Send { address, frame } => self.outbound.push((address, frame)),
            Command::Devices { reply } => {
                let _ = reply.send(self.devices.clone());
            }
        }
    }

    /// NPDU source of the first discovered device matching the address and,
    /// when given, the device instance.
    fn route_to(&self, address: DataLinkAddress, device_id: Option<u32>) -> Option<NpduAddress> {
        self.devices
            .iter()
            .find(|d| d.address == address && device_id.map_or(true, |id| d.device_id == id))
            .and_then(|d| d.npdu_source)
    }

    pub fn handle_datagram(&mut self, datagram: &[u8], src: DataLinkAddress, now: Instant) {
        let frame = match BvlcFrame::decode(datagram) {
            Ok(frame) => frame,
            Err(e) => {
                log::debug!("dropping invalid bvlc frame from {src}: {e}");
                return;
            }
        };
        if !frame.carries_npdu() {
            log::debug!("ignoring bvlc function {:?} from {src}", frame.function);
            return;
        }
        let source = frame
            .origin
            .map(|origin| DataLinkAddress::Ip(SocketAddr::V4(origin)))
            .unwrap_or(src);

        let mut r = Reader::new(frame.payload);
        let npdu = match Npdu::decode(&mut r) {
            Ok(npdu) => npdu,
            Err(e) => {
                log::debug!("dropping frame from {source} with invalid npdu: {e}");
                return;
            }
        };
        if npdu.is_network_message() {
            log::debug!("ignoring network layer message from {source}");
            return;
        }
        self.handle_apdu(source, npdu.source, r.rest(), now);
    }

    fn handle_apdu(
        &mut self,
        source: DataLinkAddress,
        npdu_source: Option<NpduAddress>,
        apdu: &[u8],
        now: Instant,
    ) {
        if let Err(e) = self.dispatch_apdu(source, npdu_source, apdu, now) {
            log::debug!("dropping apdu from {source}: {e}");
        }
    }

    fn dispatch_apdu(
        &mut self,
        source: DataLinkAddress,
        npdu_source: Option<NpduAddress>,
        apdu: &[u8],
        now: Instant,
    ) -> Result<(), DecodeError> {
        let first = *apdu.first().ok_or(DecodeError::UnexpectedEof)?;
        let mut r = Reader::new(apdu);
        match ApduType::of(first) {
            Some(ApduType::UnconfirmedRequest) => {
                let header = UnconfirmedRequestHeader::decode(&mut r)?;
                self.handle_unconfirmed(source, npdu_source, header.service_choice, &mut r)
            }
            Some(ApduType::ConfirmedRequest) => {
                let header = ConfirmedRequestHeader::decode(&mut r)?;
                match header.segment {
                    Some(segment) => {
                        let outcome = self.segments.accept(
                            source,
                            SegmentKind::ConfirmedRequest,
                            header.invoke_id,
                            &header.unsegmented_bytes(),
                            segment,
                            r.rest(),
                            now + self.timeout,
                        );
                        self.apply_segment_outcome(
                            source,
                            npdu_source,
                            SegmentKind::ConfirmedRequest,
                            header.invoke_id,
                            outcome,
                            now,
                        );
                        Ok(())
                    }
                    None => self.handle_confirmed_request(source, npdu_source, header, &mut r),
                }
            }
            Some(ApduType::SimpleAck) => {
                let ack = SimpleAck::decode(&mut r)?;
                self.complete(
                    source,
                    ack.invoke_id,
                    Some(ack.service_choice),
                    Ok(Reply::Simple {
                        service_choice: ack.service_choice,
                    }),
                );
                Ok(())
            }
            Some(ApduType::ComplexAck) => {
                let header = ComplexAckHeader::decode(&mut r)?;
                match header.segment {
                    None => self.complete(
                        source,
                        header.invoke_id,
                        Some(header.service_choice),
                        Ok(Reply::Complex {
                            service_choice: header.service_choice,
                            payload: r.rest().to_vec(),
                        }),
                    ),
                    Some(segment) => {
                        if !self.is_awaiting(source, header.invoke_id, Some(header.service_choice)) {
                            log::debug!(
                                "dropping segment for unknown invoke {} from {source}",
                                header.invoke_id
                            );
                            return Ok(());
                        }
                        let outcome = self.segments.accept(
                            source,
                            SegmentKind::ComplexAck,
                            header.invoke_id,
                            &header.unsegmented_bytes(),
                            segment,
                            r.rest(),
                            now + self.timeout,
                        );
                        self.apply_segment_outcome(
                            source,
                            npdu_source,
                            SegmentKind::ComplexAck,
                            header.invoke_id,
                            outcome,
                            now,
                        );
                    }
                }
                Ok(())
            }
            Some(ApduType::Error) => {
                let header = ErrorPduHeader::decode(&mut r)?;
                let error = ServiceError::decode_after_header(&mut r)?;
                self.complete(
                    source,
                    header.invoke_id,
                    Some(header.service_choice),
                    Err(ClientError::RemoteServiceError {
                        service_choice: header.service_choice,
                        error_class_raw: error.error_class,
                        error_code_raw: error.error_code,
                        error_class: error.class(),
                        error_code: error.code(),
                    }),
                );
                Ok(())
            }
            Some(ApduType::Reject) => {
                let reject = RejectPdu::decode(&mut r)?;
                self.complete(
                    source,
                    reject.invoke_id,
                    None,
                    Err(ClientError::RemoteReject {
                        reason: reject.reason,
                    }),
                );
                Ok(())
            }
            Some(ApduType::Abort) => {
                let abort = AbortPdu::decode(&mut r)?;
                self.complete(
                    source,
                    abort.invoke_id,
                    None,
                    Err(ClientError::RemoteAbort {
                        reason: abort.reason,
                        server: abort.server,
                    }),
                );
                Ok(())
            }
            Some(ApduType::SegmentAck) => {
                // Outbound requests are never segmented.
                log::debug!("ignoring segment ack from {source}");
                Ok(())
            }
            None => Err(DecodeError::Unsupported),
        }
    }

    fn handle_unconfirmed(
        &mut self,
        source: DataLinkAddress,
        npdu_source: Option<NpduAddress>,
        service_choice: u8,
        r: &mut Reader<'_>,
    ) -> Result<(), DecodeError> {
        match service_choice {
            SERVICE_I_AM => {
                let i_am = IAmRequest::decode_after_header(r)?;
                let device = DiscoveredDevice::from_i_am(source, npdu_source, i_am);
                log::debug!("discovered device {} at {source}", device.device_id);
                self.devices.push(device.clone());
                self.events.discovered(device);
            }
            SERVICE_UNCONFIRMED_COV_NOTIFICATION => {
                let request = CovNotificationRequest::decode_after_header(r)?;
                self.events
                    .notify(Notification::Cov(CovNotification::new(source, false, request)));
            }
            SERVICE_UNCONFIRMED_EVENT_NOTIFICATION => {
                let request = EventNotificationRequest::decode_after_header(r)?;
                self.events
                    .notify(Notification::Event(EventNotification::new(source, false, request)));
            }
            other => log::debug!("ignoring unconfirmed service {other} from {source}"),
        }
        Ok(())
    }

    fn handle_confirmed_request(
        &mut self,
        source: DataLinkAddress,
        npdu_source: Option<NpduAddress>,
        header: ConfirmedRequestHeader,
        r: &mut Reader<'_>,
    ) -> Result<(), DecodeError> {
        let notification = match header.service_choice {
            SERVICE_CONFIRMED_COV_NOTIFICATION => {
                let request = CovNotificationRequest::decode_after_header(r)?;
                Notification::Cov(CovNotification::new(source, true, request))
            }
            SERVICE_CONFIRMED_EVENT_NOTIFICATION => {
                let request = EventNotificationRequest::decode_after_header(r)?;
                Notification::Event(EventNotification::new(source, true, request))
            }
            other => {
                log::debug!("ignoring confirmed service {other} from {source}");
                return Ok(());
            }
        };

        let ack = SimpleAck {
            invoke_id: header.invoke_id,
            service_choice: header.service_choice,
        };
        self.queue_reply(source, npdu_source, |w| ack.encode(w));
        self.events.notify(notification);
        Ok(())
    }

    fn apply_segment_outcome(
        &mut self,
        source: DataLinkAddress,
        npdu_source: Option<NpduAddress>,
        kind: SegmentKind,
        invoke_id: u8,
        outcome: SegmentOutcome,
        now: Instant,
    ) {
        match outcome {
            SegmentOutcome::Accepted { ack: None } => {}
            SegmentOutcome::Accepted { ack: Some(ack) } => {
                self.queue_segment_ack(source, npdu_source, ack)
            }
            SegmentOutcome::OutOfOrder { nak } => self.queue_segment_ack(source, npdu_source, nak),
            SegmentOutcome::Complete { apdu, ack } => {
                self.queue_segment_ack(source, npdu_source, ack);
                self.handle_apdu(source, npdu_source, &apdu, now);
            }
            SegmentOutcome::Orphaned => {
                log::debug!("dropping segment of invoke {invoke_id} from {source}: no assembly");
            }
            SegmentOutcome::Overflow if kind == SegmentKind::ConfirmedRequest => {
                log::debug!("dropping oversized request {invoke_id} from {source}");
            }
            SegmentOutcome::Overflow => {
                self.complete(
                    source,
                    invoke_id,
                    None,
                    Err(ClientError::ResponseTooLarge {
                        limit: MAX_REASSEMBLY_LEN,
                    }),
                );
            }
        }
    }

    fn queue_segment_ack(
        &mut self,
        address: DataLinkAddress,
        npdu_source: Option<NpduAddress>,
        ack: SegmentAck,
    ) {
        self.queue_reply(address, npdu_source, |w| ack.encode(w));
    }

    fn queue_reply<F>(&mut self, address: DataLinkAddress, npdu_source: Option<NpduAddress>, encode: F)
    where
        F: FnMut(&mut Writer<'_>) -> Result<(), EncodeError>,
    {
        let frame = encode_apdu(encode).and_then(|apdu| {
            encode_frame(
                BvlcFunction::OriginalUnicastNpdu,
                &reply_npdu(npdu_source),
                &apdu,
            )
        });
        match frame {
            Ok(frame) => self.outbound.push((address, frame)),
            Err(e) => log::warn!("failed to encode reply to {address}: {e}"),
        }
    }

    fn is_awaiting(&self, source: DataLinkAddress, invoke_id: u8, service_choice: Option<u8>) -> bool {
        match self.pending.get(invoke_id) {
            Some(pending) => {
                pending.address == source
                    && service_choice.map_or(true, |s| s == pending.service_choice)
            }
            None => false,
        }
    }

    /// Completes a pending invocation if `source` and `service_choice`
    /// match what was sent.
    fn complete(
        &mut self,
        source: DataLinkAddress,
        invoke_id: u8,
        service_choice: Option<u8>,
        result: Result<Reply, ClientError>,
    ) {
        if !self.is_awaiting(source, invoke_id, service_choice) {
            log::debug!("dropping reply for invoke {invoke_id} from {source}: no matching request");
            return;
        }
        self.segments.abandon(invoke_id);
        self.pending.complete(invoke_id, result);
    }

    pub fn expire(&mut self, now: Instant) {
        for invoke_id in self.pending.expire(now) {
            self.segments.abandon(invoke_id);
        }
        self.segments.expire_requests(now);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.pending.next_deadline(), self.segments.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn take_outbound(&mut self) -> Vec<(DataLinkAddress, Vec<u8>)> {
        std::mem::take(&mut self.outbound)
    }

    pub fn publish_error(&self, error: DataLinkError) {
        self.events.transport_error(error);
    }
}

/// Drives `engine` until the command channel or the inbound channel closes.
pub(crate) async fn run<D: DataLink>(
    mut engine: Engine,
    datalink: Arc<D>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    mut inbound: mpsc::Receiver<Inbound>,
) {
    loop {
        let deadline = engine.next_deadline();
        tokio::select! {
            command = commands.recv() => match command {
                Some(command) => engine.handle_command(command, Instant::now()),
                None => break,
            },
            message = inbound.recv() => match message {
                Some(Inbound::Datagram(datagram, src)) => {
                    engine.handle_datagram(&datagram, src, Instant::now())
                }
                Some(Inbound::TransportError(e)) => engine.publish_error(e),
                None => break,
            },
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                engine.expire(Instant::now());
            }
        }

        for (address, frame) in engine.take_outbound() {
            if let Err(e) = datalink.send(address, &frame).await {
                log::warn!("send to {address} failed: {e}");
                engine.publish_error(e);
            }
        }
    }
    log::debug!("client engine stopped");
}

/// Receives datagrams and forwards them to the engine. Stops when the link
/// reports [`DataLinkError::Closed`] or the engine goes away.
pub(crate) async fn read_loop<D: DataLink>(datalink: Arc<D>, inbound: mpsc::Sender<Inbound>) {
    let mut buf = vec![0u8; MAX_BIP_FRAME_LEN];
    loop {
        let (message, closed) = match datalink.recv(&mut buf).await {
            Ok((n, src)) => (Inbound::Datagram(buf[..n].to_vec(), src), false),
            Err(DataLinkError::Closed) => (Inbound::TransportError(DataLinkError::Closed), true),
            Err(e) => {
                log::warn!("receive failed: {e}");
                (Inbound::TransportError(e), false)
            }
        };
        if inbound.send(message).await.is_err() || closed {
            break;
        }
    }
}
