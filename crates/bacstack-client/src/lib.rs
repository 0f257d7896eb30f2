//! Async BACnet/IP client.
//!
//! [`BacnetClient`] discovers devices with WhoIs, reads and writes
//! properties, subscribes to change-of-value reporting and surfaces COV and
//! event notifications. [`ExtendedClient`] layers object-list reads,
//! notification-class activation and limit alarming on top.
//!
//! # Feature flags
//!
//! - **`serde`** — derives `Serialize`/`Deserialize` on [`ClientConfig`] and
//!   [`DiscoveredDevice`].

pub mod client;
pub mod config;
mod engine;
pub mod error;
pub mod events;
pub mod extended;
pub mod invoke;
pub mod segmentation;
pub mod value;

pub use bacstack_core::services::event_notification::TimeStamp;
pub use bacstack_core::types::EventState;
pub use client::BacnetClient;
pub use config::ClientConfig;
pub use error::ClientError;
pub use events::{
    CovNotification, CovPropertyValue, DiscoveredDevice, EventNotification, Notification,
    TransportError,
};
pub use extended::{
    Alarming, ExtendedClient, Limit, NotificationClassActivation, PropertyAccess, Transitions,
    ValidDays,
};
pub use invoke::InvokeIdAllocator;
pub use segmentation::MAX_REASSEMBLY_LEN;
pub use value::{ClientBitString, ClientDataValue, PropertyValue};
