use crate::apdu::ConfirmedRequestHeader;
use crate::encoding::{
    primitives::{encode_ctx_boolean, encode_ctx_object_id, encode_ctx_unsigned},
    writer::Writer,
};
use crate::types::ObjectId;
use crate::EncodeError;

pub const SERVICE_SUBSCRIBE_COV: u8 = 0x05;

/// Subscription terms. A request without them cancels the subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CovSubscription {
    pub issue_confirmed_notifications: bool,
    pub lifetime_seconds: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscribeCovRequest {
    pub subscriber_process_id: u32,
    pub monitored_object_id: ObjectId,
    pub subscription: Option<CovSubscription>,
    pub invoke_id: u8,
}

impl SubscribeCovRequest {
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        ConfirmedRequestHeader::new(self.invoke_id, SERVICE_SUBSCRIBE_COV).encode(w)?;

        encode_ctx_unsigned(w, 0, self.subscriber_process_id)?;
        encode_ctx_object_id(w, 1, self.monitored_object_id)?;
        if let Some(sub) = self.subscription {
            encode_ctx_boolean(w, 2, sub.issue_confirmed_notifications)?;
            encode_ctx_unsigned(w, 3, sub.lifetime_seconds)?;
        }
        Ok(())
    }

    pub fn cancel(subscriber_process_id: u32, monitored_object_id: ObjectId, invoke_id: u8) -> Self {
        Self {
            subscriber_process_id,
            monitored_object_id,
            subscription: None,
            invoke_id,
        }
    }
}
