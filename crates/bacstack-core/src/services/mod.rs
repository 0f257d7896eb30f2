pub mod cov_notification;
pub mod error;
pub mod event_notification;
pub mod i_am;
pub mod read_property;
pub mod subscribe_cov;
pub mod value_codec;
pub mod who_is;
pub mod write_property;

use crate::encoding::{primitives::decode_unsigned, reader::Reader, tag::Tag};
use crate::types::ObjectId;
use crate::DecodeError;

/// Content octets of a context-tagged unsigned whose tag was already read.
pub(crate) fn decode_ctx_unsigned_body(r: &mut Reader<'_>, len: u32) -> Result<u32, DecodeError> {
    decode_unsigned(r, len as usize)
}

/// Decode a required context-tagged unsigned integer at the expected tag number.
pub(crate) fn decode_required_ctx_unsigned(
    r: &mut Reader<'_>,
    expected_tag_num: u8,
) -> Result<u32, DecodeError> {
    match Tag::decode(r)? {
        Tag::Context { tag_num, len } if tag_num == expected_tag_num => {
            decode_ctx_unsigned_body(r, len)
        }
        _ => Err(DecodeError::InvalidTag),
    }
}

/// Decode a required context-tagged BACnet object identifier at the expected tag number.
pub(crate) fn decode_required_ctx_object_id(
    r: &mut Reader<'_>,
    expected_tag_num: u8,
) -> Result<ObjectId, DecodeError> {
    match Tag::decode(r)? {
        Tag::Context { tag_num, len: 4 } if tag_num == expected_tag_num => {
            r.read_be_u32().map(ObjectId::from_raw)
        }
        _ => Err(DecodeError::InvalidTag),
    }
}

/// Reads a context-tagged unsigned if the next tag carries `expected_tag_num`,
/// leaving the reader untouched otherwise (including at end of input).
pub(crate) fn decode_optional_ctx_unsigned(
    r: &mut Reader<'_>,
    expected_tag_num: u8,
) -> Result<Option<u32>, DecodeError> {
    if r.is_empty() {
        return Ok(None);
    }
    let mut probe = *r;
    match Tag::decode(&mut probe)? {
        Tag::Context { tag_num, len } if tag_num == expected_tag_num => {
            let value = decode_ctx_unsigned_body(&mut probe, len)?;
            *r = probe;
            Ok(Some(value))
        }
        _ => Ok(None),
    }
}
