#[cfg(feature = "alloc")]
use crate::encoding::{reader::Reader, tag::Tag};
#[cfg(feature = "alloc")]
use crate::services::value_codec::decode_values_until_closing;
#[cfg(feature = "alloc")]
use crate::services::{
    decode_ctx_unsigned_body, decode_optional_ctx_unsigned, decode_required_ctx_object_id,
    decode_required_ctx_unsigned,
};
#[cfg(feature = "alloc")]
use crate::types::{DataValue, ObjectId, PropertyId};
#[cfg(feature = "alloc")]
use crate::DecodeError;
#[cfg(feature = "alloc")]
use alloc::vec::Vec;

pub const SERVICE_CONFIRMED_COV_NOTIFICATION: u8 = 0x01;
pub const SERVICE_UNCONFIRMED_COV_NOTIFICATION: u8 = 0x02;

#[cfg(feature = "alloc")]
#[derive(Debug, Clone, PartialEq)]
pub struct CovPropertyValue<'a> {
    pub property_id: PropertyId,
    pub array_index: Option<u32>,
    pub values: Vec<DataValue<'a>>,
    pub priority: Option<u8>,
}

#[cfg(feature = "alloc")]
#[derive(Debug, Clone, PartialEq)]
pub struct CovNotificationRequest<'a> {
    pub subscriber_process_id: u32,
    pub initiating_device_id: ObjectId,
    pub monitored_object_id: ObjectId,
    pub time_remaining_seconds: u32,
    pub values: Vec<CovPropertyValue<'a>>,
}

#[cfg(feature = "alloc")]
impl<'a> CovNotificationRequest<'a> {
    pub fn decode_after_header(r: &mut Reader<'a>) -> Result<Self, DecodeError> {
        let subscriber_process_id = decode_required_ctx_unsigned(r, 0)?;
        let initiating_device_id = decode_required_ctx_object_id(r, 1)?;
        let monitored_object_id = decode_required_ctx_object_id(r, 2)?;
        let time_remaining_seconds = decode_required_ctx_unsigned(r, 3)?;

        if Tag::decode(r)? != (Tag::Opening { tag_num: 4 }) {
            return Err(DecodeError::InvalidTag);
        }

        let mut values = Vec::new();
        loop {
            let property_id = match Tag::decode(r)? {
                Tag::Closing { tag_num: 4 } => break,
                Tag::Context { tag_num: 0, len } => {
                    PropertyId::from_u32(decode_ctx_unsigned_body(r, len)?)
                }
                _ => return Err(DecodeError::InvalidTag),
            };

            let (array_index, value_open) = match Tag::decode(r)? {
                Tag::Context { tag_num: 1, len } => {
                    let idx = decode_ctx_unsigned_body(r, len)?;
                    (Some(idx), Tag::decode(r)?)
                }
                other => (None, other),
            };
            if value_open != (Tag::Opening { tag_num: 2 }) {
                return Err(DecodeError::InvalidTag);
            }
            let property_values = decode_values_until_closing(r, 2)?;

            let priority = match decode_optional_ctx_unsigned(r, 3)? {
                Some(p) => Some(u8::try_from(p).map_err(|_| DecodeError::InvalidValue)?),
                None => None,
            };

            values.push(CovPropertyValue {
                property_id,
                array_index,
                values: property_values,
                priority,
            });
        }

        Ok(Self {
            subscriber_process_id,
            initiating_device_id,
            monitored_object_id,
            time_remaining_seconds,
            values,
        })
    }
}
