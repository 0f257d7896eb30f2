use crate::types::{BitString, Date, DateTime, ObjectId, Time};

/// One tagged application value, borrowing strings and octets from the frame
/// it was decoded from.
///
/// `OpeningTag` and `ClosingTag` are structural: they let a flat list of
/// values describe a constructed property such as a recipient list.
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue<'a> {
    Null,
    Boolean(bool),
    Unsigned(u32),
    Signed(i32),
    Real(f32),
    Double(f64),
    OctetString(&'a [u8]),
    CharacterString(&'a str),
    BitString(BitString<'a>),
    Enumerated(u32),
    Date(Date),
    Time(Time),
    DateTime(DateTime),
    ObjectId(ObjectId),
    OpeningTag(u8),
    ClosingTag(u8),
}
