//! Things the engine reports without being asked: discovered devices,
//! change-of-value and event notifications, and transport failures.
//!
//! Each kind fans out over a `tokio::sync::broadcast` channel. Subscribing
//! returns a receiver; dropping it unsubscribes. A receiver that falls
//! behind sees `RecvError::Lagged` and skips ahead.

use crate::ClientDataValue;
use bacstack_core::npdu::NpduAddress;
use bacstack_core::services::cov_notification::CovNotificationRequest;
use bacstack_core::services::event_notification::{EventNotificationRequest, TimeStamp};
use bacstack_core::services::i_am::IAmRequest;
use bacstack_core::types::{EventState, ObjectId, PropertyId, Segmentation};
use bacstack_datalink::{DataLinkAddress, DataLinkError};
use std::sync::Arc;
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// A device that answered a WhoIs, or announced itself unprompted.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiscoveredDevice {
    pub address: DataLinkAddress,
    pub device_id: u32,
    /// Network and MAC of the device when the IAm came through a router.
    pub npdu_source: Option<NpduAddress>,
    pub max_apdu: Option<u32>,
    pub segmentation: Option<Segmentation>,
    pub vendor_id: Option<u32>,
}

impl DiscoveredDevice {
    pub(crate) fn from_i_am(
        address: DataLinkAddress,
        npdu_source: Option<NpduAddress>,
        i_am: IAmRequest,
    ) -> Self {
        Self {
            address,
            device_id: i_am.device_id.instance(),
            npdu_source,
            max_apdu: i_am.max_apdu,
            segmentation: i_am.segmentation,
            vendor_id: i_am.vendor_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CovPropertyValue {
    pub property_id: PropertyId,
    pub array_index: Option<u32>,
    pub values: Vec<ClientDataValue>,
    pub priority: Option<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CovNotification {
    pub source: DataLinkAddress,
    pub confirmed: bool,
    pub subscriber_process_id: u32,
    pub initiating_device_id: ObjectId,
    pub monitored_object_id: ObjectId,
    pub time_remaining_seconds: u32,
    pub values: Vec<CovPropertyValue>,
}

impl CovNotification {
    pub(crate) fn new(
        source: DataLinkAddress,
        confirmed: bool,
        request: CovNotificationRequest<'_>,
    ) -> Self {
        Self {
            source,
            confirmed,
            subscriber_process_id: request.subscriber_process_id,
            initiating_device_id: request.initiating_device_id,
            monitored_object_id: request.monitored_object_id,
            time_remaining_seconds: request.time_remaining_seconds,
            values: request
                .values
                .into_iter()
                .map(|p| CovPropertyValue {
                    property_id: p.property_id,
                    array_index: p.array_index,
                    values: p.values.into_iter().map(ClientDataValue::from).collect(),
                    priority: p.priority,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventNotification {
    pub source: DataLinkAddress,
    pub confirmed: bool,
    pub process_id: u32,
    pub initiating_device_id: ObjectId,
    pub event_object_id: ObjectId,
    pub timestamp: TimeStamp,
    pub notification_class: u32,
    pub priority: u32,
    pub event_type: u32,
    pub message_text: Option<String>,
    pub notify_type: u32,
    pub ack_required: Option<bool>,
    pub from_state_raw: u32,
    pub from_state: Option<EventState>,
    pub to_state_raw: u32,
    pub to_state: Option<EventState>,
}

impl EventNotification {
    pub(crate) fn new(
        source: DataLinkAddress,
        confirmed: bool,
        request: EventNotificationRequest<'_>,
    ) -> Self {
        Self {
            source,
            confirmed,
            process_id: request.process_id,
            initiating_device_id: request.initiating_device_id,
            event_object_id: request.event_object_id,
            timestamp: request.timestamp,
            notification_class: request.notification_class,
            priority: request.priority,
            event_type: request.event_type,
            message_text: request.message_text.map(str::to_string),
            notify_type: request.notify_type,
            ack_required: request.ack_required,
            from_state_raw: request.from_state,
            from_state: EventState::from_u32(request.from_state),
            to_state_raw: request.to_state,
            to_state: EventState::from_u32(request.to_state),
        }
    }
}

/// A notification received from a BACnet device.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Cov(CovNotification),
    Event(EventNotification),
}

/// A send or receive failure of the data link. Shared because every error
/// subscriber gets the same instance.
pub type TransportError = Arc<DataLinkError>;

/// Sending halves of the event channels.
#[derive(Debug, Clone)]
pub(crate) struct EventSenders {
    pub discoveries: broadcast::Sender<DiscoveredDevice>,
    pub notifications: broadcast::Sender<Notification>,
    pub errors: broadcast::Sender<TransportError>,
}

impl EventSenders {
    pub fn new() -> Self {
        Self {
            discoveries: broadcast::channel(EVENT_CHANNEL_CAPACITY).0,
            notifications: broadcast::channel(EVENT_CHANNEL_CAPACITY).0,
            errors: broadcast::channel(EVENT_CHANNEL_CAPACITY).0,
        }
    }

    // A send only fails when nobody is subscribed, which is not an error.
    pub fn discovered(&self, device: DiscoveredDevice) {
        let _ = self.discoveries.send(device);
    }

    pub fn notify(&self, notification: Notification) {
        let _ = self.notifications.send(notification);
    }

    pub fn transport_error(&self, error: DataLinkError) {
        let _ = self.errors.send(Arc::new(error));
    }
}
