use crate::apdu::UnconfirmedRequestHeader;
use crate::encoding::{
    primitives::{
        decode_app_enumerated, decode_app_object_id, decode_app_unsigned, encode_app_enumerated,
        encode_app_object_id, encode_app_unsigned,
    },
    reader::Reader,
    writer::Writer,
};
use crate::types::{ObjectId, ObjectType, Segmentation};
use crate::{DecodeError, EncodeError};

pub const SERVICE_I_AM: u8 = 0x00;

/// An I-Am announcement. Only the device identifier is mandatory on decode;
/// the remaining fields are read when the sender includes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IAmRequest {
    pub device_id: ObjectId,
    pub max_apdu: Option<u32>,
    pub segmentation: Option<Segmentation>,
    pub vendor_id: Option<u32>,
}

impl IAmRequest {
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        UnconfirmedRequestHeader {
            service_choice: SERVICE_I_AM,
        }
        .encode(w)?;
        encode_app_object_id(w, self.device_id)?;
        encode_app_unsigned(w, self.max_apdu.unwrap_or(1476))?;
        encode_app_enumerated(
            w,
            self.segmentation.unwrap_or(Segmentation::NoSegmentation) as u32,
        )?;
        encode_app_unsigned(w, self.vendor_id.unwrap_or(0))
    }

    /// Decodes the service body. Announcements for anything other than a
    /// Device object are rejected. A malformed optional field ends the
    /// optional part: it and the fields after it decode as `None`.
    pub fn decode_after_header(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let device_id = decode_app_object_id(r)?;
        if device_id.object_type() != ObjectType::Device {
            return Err(DecodeError::InvalidValue);
        }
        let max_apdu = optional(r, decode_app_unsigned);
        let segmentation = max_apdu.and_then(|_| {
            optional(r, |r| {
                Segmentation::from_u32(decode_app_enumerated(r)?).ok_or(DecodeError::InvalidValue)
            })
        });
        let vendor_id = segmentation.and_then(|_| optional(r, decode_app_unsigned));

        Ok(Self {
            device_id,
            max_apdu,
            segmentation,
            vendor_id,
        })
    }
}

/// Decodes a trailing field, leaving the reader untouched when it is absent
/// or malformed.
fn optional<'a, T>(
    r: &mut Reader<'a>,
    decode: impl FnOnce(&mut Reader<'a>) -> Result<T, DecodeError>,
) -> Option<T> {
    if r.is_empty() {
        return None;
    }
    let mut field = *r;
    let value = decode(&mut field).ok()?;
    *r = field;
    Some(value)
}
