use crate::encoding::{
    reader::Reader,
    tag::{AppTag, Tag},
    writer::Writer,
};
use crate::types::{BitString, Date, ObjectId, Time};
use crate::{DecodeError, EncodeError};

/// Character sets defined for BACnet character strings. Only UTF-8 is
/// supported on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CharacterSet {
    Utf8 = 0,
    Dbcs = 1,
    Jis = 2,
    Ucs4 = 3,
    Ucs2 = 4,
    Iso8859_1 = 5,
}

/// Minimum number of octets needed to carry `value` as an unsigned integer.
pub const fn unsigned_len(value: u32) -> usize {
    if value < 0x100 {
        1
    } else if value < 0x1_0000 {
        2
    } else if value < 0x100_0000 {
        3
    } else {
        4
    }
}

/// Minimum number of octets needed to carry `value` in two's complement.
pub const fn signed_len(value: i32) -> usize {
    if value >= -128 && value < 128 {
        1
    } else if value >= -32_768 && value < 32_768 {
        2
    } else if value >= -8_388_608 && value < 8_388_608 {
        3
    } else {
        4
    }
}

pub fn encode_unsigned(w: &mut Writer<'_>, value: u32) -> Result<usize, EncodeError> {
    let len = unsigned_len(value);
    w.write_all(&value.to_be_bytes()[4 - len..])?;
    Ok(len)
}

pub fn decode_unsigned(r: &mut Reader<'_>, len: usize) -> Result<u32, DecodeError> {
    if !(1..=4).contains(&len) {
        return Err(DecodeError::InvalidLength);
    }
    Ok(r
        .read_exact(len)?
        .iter()
        .fold(0u32, |acc, b| (acc << 8) | u32::from(*b)))
}

pub fn encode_signed(w: &mut Writer<'_>, value: i32) -> Result<usize, EncodeError> {
    let len = signed_len(value);
    w.write_all(&value.to_be_bytes()[4 - len..])?;
    Ok(len)
}

pub fn decode_signed(r: &mut Reader<'_>, len: usize) -> Result<i32, DecodeError> {
    if !(1..=4).contains(&len) {
        return Err(DecodeError::InvalidLength);
    }
    let bytes = r.read_exact(len)?;
    let fill = if bytes[0] & 0x80 != 0 { 0xFF } else { 0x00 };
    let mut out = [fill; 4];
    out[4 - len..].copy_from_slice(bytes);
    Ok(i32::from_be_bytes(out))
}

fn len_u32(len: usize) -> Result<u32, EncodeError> {
    u32::try_from(len).map_err(|_| EncodeError::InvalidLength)
}

fn encode_unsigned_tagged(w: &mut Writer<'_>, tag: Tag, value: u32) -> Result<(), EncodeError> {
    tag.encode(w)?;
    encode_unsigned(w, value).map(|_| ())
}

pub fn encode_app_unsigned(w: &mut Writer<'_>, value: u32) -> Result<(), EncodeError> {
    let len = unsigned_len(value) as u32;
    encode_unsigned_tagged(w, Tag::Application { tag: AppTag::UnsignedInt, len }, value)
}

pub fn encode_app_enumerated(w: &mut Writer<'_>, value: u32) -> Result<(), EncodeError> {
    let len = unsigned_len(value) as u32;
    encode_unsigned_tagged(w, Tag::Application { tag: AppTag::Enumerated, len }, value)
}

pub fn encode_app_signed(w: &mut Writer<'_>, value: i32) -> Result<(), EncodeError> {
    let len = signed_len(value) as u32;
    Tag::Application { tag: AppTag::SignedInt, len }.encode(w)?;
    encode_signed(w, value).map(|_| ())
}

pub fn encode_app_boolean(w: &mut Writer<'_>, value: bool) -> Result<(), EncodeError> {
    Tag::Application {
        tag: AppTag::Boolean,
        len: u32::from(value),
    }
    .encode(w)
}

pub fn encode_app_real(w: &mut Writer<'_>, value: f32) -> Result<(), EncodeError> {
    Tag::Application { tag: AppTag::Real, len: 4 }.encode(w)?;
    w.write_all(&value.to_be_bytes())
}

pub fn encode_app_double(w: &mut Writer<'_>, value: f64) -> Result<(), EncodeError> {
    Tag::Application { tag: AppTag::Double, len: 8 }.encode(w)?;
    w.write_all(&value.to_be_bytes())
}

pub fn encode_app_octet_string(w: &mut Writer<'_>, value: &[u8]) -> Result<(), EncodeError> {
    Tag::Application {
        tag: AppTag::OctetString,
        len: len_u32(value.len())?,
    }
    .encode(w)?;
    w.write_all(value)
}

/// Encodes an application character string. Any character set other than
/// [`CharacterSet::Utf8`] is rejected before anything is written.
pub fn encode_app_character_string(
    w: &mut Writer<'_>,
    value: &str,
    charset: CharacterSet,
) -> Result<(), EncodeError> {
    if charset != CharacterSet::Utf8 {
        return Err(EncodeError::UnsupportedCharacterSet(charset as u8));
    }
    Tag::Application {
        tag: AppTag::CharacterString,
        len: len_u32(value.len() + 1)?,
    }
    .encode(w)?;
    w.write_u8(charset as u8)?;
    w.write_all(value.as_bytes())
}

pub fn encode_app_bit_string(w: &mut Writer<'_>, value: BitString<'_>) -> Result<(), EncodeError> {
    if value.unused_bits > 7 || (value.data.is_empty() && value.unused_bits != 0) {
        return Err(EncodeError::ValueOutOfRange);
    }
    Tag::Application {
        tag: AppTag::BitString,
        len: len_u32(value.data.len() + 1)?,
    }
    .encode(w)?;
    w.write_u8(value.unused_bits)?;
    w.write_all(value.data)
}

pub fn encode_app_date(w: &mut Writer<'_>, value: Date) -> Result<(), EncodeError> {
    Tag::Application { tag: AppTag::Date, len: 4 }.encode(w)?;
    w.write_all(&value.to_bytes())
}

pub fn encode_app_time(w: &mut Writer<'_>, value: Time) -> Result<(), EncodeError> {
    Tag::Application { tag: AppTag::Time, len: 4 }.encode(w)?;
    w.write_all(&value.to_bytes())
}

pub fn encode_app_object_id(w: &mut Writer<'_>, value: ObjectId) -> Result<(), EncodeError> {
    Tag::Application { tag: AppTag::ObjectId, len: 4 }.encode(w)?;
    w.write_be_u32(value.raw())
}

pub fn encode_ctx_unsigned(w: &mut Writer<'_>, tag_num: u8, value: u32) -> Result<(), EncodeError> {
    let len = unsigned_len(value) as u32;
    encode_unsigned_tagged(w, Tag::Context { tag_num, len }, value)
}

pub fn encode_ctx_boolean(w: &mut Writer<'_>, tag_num: u8, value: bool) -> Result<(), EncodeError> {
    Tag::Context { tag_num, len: 1 }.encode(w)?;
    w.write_u8(u8::from(value))
}

pub fn encode_ctx_object_id(
    w: &mut Writer<'_>,
    tag_num: u8,
    value: ObjectId,
) -> Result<(), EncodeError> {
    Tag::Context { tag_num, len: 4 }.encode(w)?;
    w.write_be_u32(value.raw())
}

pub fn encode_opening_tag(w: &mut Writer<'_>, tag_num: u8) -> Result<(), EncodeError> {
    Tag::Opening { tag_num }.encode(w)
}

pub fn encode_closing_tag(w: &mut Writer<'_>, tag_num: u8) -> Result<(), EncodeError> {
    Tag::Closing { tag_num }.encode(w)
}

pub fn decode_app_unsigned(r: &mut Reader<'_>) -> Result<u32, DecodeError> {
    match Tag::decode(r)? {
        Tag::Application { tag: AppTag::UnsignedInt, len } => decode_unsigned(r, len as usize),
        _ => Err(DecodeError::InvalidTag),
    }
}

pub fn decode_app_enumerated(r: &mut Reader<'_>) -> Result<u32, DecodeError> {
    match Tag::decode(r)? {
        Tag::Application { tag: AppTag::Enumerated, len } => decode_unsigned(r, len as usize),
        _ => Err(DecodeError::InvalidTag),
    }
}

pub fn decode_app_object_id(r: &mut Reader<'_>) -> Result<ObjectId, DecodeError> {
    match Tag::decode(r)? {
        Tag::Application { tag: AppTag::ObjectId, len: 4 } => {
            r.read_be_u32().map(ObjectId::from_raw)
        }
        _ => Err(DecodeError::InvalidTag),
    }
}

/// Decodes the content octets of a character string whose tag has already
/// been read: one charset octet then the text.
pub fn decode_character_string<'a>(r: &mut Reader<'a>, len: usize) -> Result<&'a str, DecodeError> {
    if len == 0 {
        return Err(DecodeError::InvalidLength);
    }
    let raw = r.read_exact(len)?;
    if raw[0] != CharacterSet::Utf8 as u8 {
        return Err(DecodeError::Unsupported);
    }
    core::str::from_utf8(&raw[1..]).map_err(|_| DecodeError::InvalidValue)
}

pub fn decode_bit_string<'a>(r: &mut Reader<'a>, len: usize) -> Result<BitString<'a>, DecodeError> {
    if len == 0 {
        return Err(DecodeError::InvalidLength);
    }
    let raw = r.read_exact(len)?;
    if raw[0] > 7 || (len == 1 && raw[0] != 0) {
        return Err(DecodeError::InvalidValue);
    }
    Ok(BitString::new(raw[0], &raw[1..]))
}
