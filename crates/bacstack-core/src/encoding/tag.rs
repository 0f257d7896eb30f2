//! Tag headers.
//!
//! The first octet of a tag is `tag_number << 4 | class << 3 | length_code`.
//! Tag numbers from 15 up use `0xF` in the high nibble and carry the number
//! in the following octet. Length code 5 announces an extended length;
//! on context tags codes 6 and 7 mark opening and closing tags.

use crate::encoding::{reader::Reader, writer::Writer};
use crate::{DecodeError, EncodeError};

const CONTEXT_CLASS: u8 = 0x08;
const EXTENDED_TAG_NUMBER: u8 = 0x0F;
const EXTENDED_LENGTH: u8 = 5;
const OPENING: u8 = 6;
const CLOSING: u8 = 7;

/// Application tag numbers (BACnet application data types).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppTag {
    Null = 0,
    Boolean = 1,
    UnsignedInt = 2,
    SignedInt = 3,
    Real = 4,
    Double = 5,
    OctetString = 6,
    CharacterString = 7,
    BitString = 8,
    Enumerated = 9,
    Date = 10,
    Time = 11,
    ObjectId = 12,
}

impl AppTag {
    pub fn from_u8(value: u8) -> Result<Self, DecodeError> {
        Ok(match value {
            0 => Self::Null,
            1 => Self::Boolean,
            2 => Self::UnsignedInt,
            3 => Self::SignedInt,
            4 => Self::Real,
            5 => Self::Double,
            6 => Self::OctetString,
            7 => Self::CharacterString,
            8 => Self::BitString,
            9 => Self::Enumerated,
            10 => Self::Date,
            11 => Self::Time,
            12 => Self::ObjectId,
            _ => return Err(DecodeError::InvalidTag),
        })
    }
}

/// A decoded tag header. `len` is the number of content octets that follow,
/// except for application booleans where it is the value itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Application { tag: AppTag, len: u32 },
    Context { tag_num: u8, len: u32 },
    Opening { tag_num: u8 },
    Closing { tag_num: u8 },
}

impl Tag {
    pub fn encode(self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        match self {
            Tag::Application { tag, len } => write_header(w, tag as u8, 0, len),
            Tag::Context { tag_num, len } => write_header(w, tag_num, CONTEXT_CLASS, len),
            Tag::Opening { tag_num } => write_lead(w, tag_num, CONTEXT_CLASS | OPENING),
            Tag::Closing { tag_num } => write_lead(w, tag_num, CONTEXT_CLASS | CLOSING),
        }
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let lead = r.read_u8()?;
        let context = lead & CONTEXT_CLASS != 0;
        let length_code = lead & 0x07;
        let tag_num = match lead >> 4 {
            EXTENDED_TAG_NUMBER => r.read_u8()?,
            n => n,
        };

        match (context, length_code) {
            (true, OPENING) => Ok(Tag::Opening { tag_num }),
            (true, CLOSING) => Ok(Tag::Closing { tag_num }),
            (true, code) => Ok(Tag::Context {
                tag_num,
                len: read_length(r, code)?,
            }),
            (false, code) => Ok(Tag::Application {
                tag: AppTag::from_u8(tag_num)?,
                len: read_length(r, code)?,
            }),
        }
    }

    /// Returns `true` for the closing tag with the given number.
    pub fn closes(self, tag_num: u8) -> bool {
        self == Tag::Closing { tag_num }
    }
}

fn write_lead(w: &mut Writer<'_>, tag_num: u8, low_bits: u8) -> Result<(), EncodeError> {
    if tag_num >= EXTENDED_TAG_NUMBER {
        w.write_u8((EXTENDED_TAG_NUMBER << 4) | low_bits)?;
        w.write_u8(tag_num)
    } else {
        w.write_u8((tag_num << 4) | low_bits)
    }
}

fn write_header(w: &mut Writer<'_>, tag_num: u8, class: u8, len: u32) -> Result<(), EncodeError> {
    if len < u32::from(EXTENDED_LENGTH) {
        return write_lead(w, tag_num, class | len as u8);
    }
    write_lead(w, tag_num, class | EXTENDED_LENGTH)?;
    match len {
        0..=253 => w.write_u8(len as u8),
        254..=0xFFFF => {
            w.write_u8(254)?;
            w.write_be_u16(len as u16)
        }
        _ => {
            w.write_u8(255)?;
            w.write_be_u32(len)
        }
    }
}

fn read_length(r: &mut Reader<'_>, code: u8) -> Result<u32, DecodeError> {
    match code {
        0..=4 => Ok(u32::from(code)),
        EXTENDED_LENGTH => match r.read_u8()? {
            254 => r.read_be_u16().map(u32::from),
            255 => r.read_be_u32(),
            n => Ok(u32::from(n)),
        },
        _ => Err(DecodeError::InvalidLength),
    }
}
