use crate::encoding::{
    primitives::{
        decode_bit_string, decode_character_string, decode_signed, decode_unsigned,
        encode_app_bit_string, encode_app_boolean, encode_app_character_string, encode_app_date,
        encode_app_double, encode_app_enumerated, encode_app_object_id, encode_app_octet_string,
        encode_app_real, encode_app_signed, encode_app_time, encode_app_unsigned,
        encode_closing_tag, encode_opening_tag, CharacterSet,
    },
    reader::Reader,
    tag::{AppTag, Tag},
    writer::Writer,
};
use crate::types::{DataValue, Date, DateTime, ObjectId, Time};
use crate::{DecodeError, EncodeError};

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

pub fn encode_application_data_value(
    w: &mut Writer<'_>,
    value: &DataValue<'_>,
) -> Result<(), EncodeError> {
    match value {
        DataValue::Null => Tag::Application {
            tag: AppTag::Null,
            len: 0,
        }
        .encode(w),
        DataValue::Boolean(v) => encode_app_boolean(w, *v),
        DataValue::Unsigned(v) => encode_app_unsigned(w, *v),
        DataValue::Signed(v) => encode_app_signed(w, *v),
        DataValue::Real(v) => encode_app_real(w, *v),
        DataValue::Double(v) => encode_app_double(w, *v),
        DataValue::OctetString(v) => encode_app_octet_string(w, v),
        DataValue::CharacterString(v) => encode_app_character_string(w, v, CharacterSet::Utf8),
        DataValue::BitString(v) => encode_app_bit_string(w, *v),
        DataValue::Enumerated(v) => encode_app_enumerated(w, *v),
        DataValue::Date(v) => encode_app_date(w, *v),
        DataValue::Time(v) => encode_app_time(w, *v),
        DataValue::DateTime(v) => {
            encode_app_date(w, v.date)?;
            encode_app_time(w, v.time)
        }
        DataValue::ObjectId(v) => encode_app_object_id(w, *v),
        DataValue::OpeningTag(n) => encode_opening_tag(w, *n),
        DataValue::ClosingTag(n) => encode_closing_tag(w, *n),
    }
}

/// Encodes each value in order, stopping at the first failure.
pub fn encode_application_data_values(
    w: &mut Writer<'_>,
    values: &[DataValue<'_>],
) -> Result<(), EncodeError> {
    values
        .iter()
        .try_for_each(|v| encode_application_data_value(w, v))
}

/// Decodes one application value. A date directly followed by a time is
/// returned as one [`DataValue::DateTime`].
pub fn decode_application_data_value<'a>(r: &mut Reader<'a>) -> Result<DataValue<'a>, DecodeError> {
    let tag = Tag::decode(r)?;
    match decode_application_data_value_from_tag(r, tag)? {
        DataValue::Date(date) => Ok(join_time(r, date)),
        other => Ok(other),
    }
}

pub fn decode_application_data_value_from_tag<'a>(
    r: &mut Reader<'a>,
    tag: Tag,
) -> Result<DataValue<'a>, DecodeError> {
    let (app, len) = match tag {
        Tag::Application { tag, len } => (tag, len as usize),
        Tag::Opening { tag_num } => return Ok(DataValue::OpeningTag(tag_num)),
        Tag::Closing { tag_num } => return Ok(DataValue::ClosingTag(tag_num)),
        Tag::Context { .. } => return Err(DecodeError::Unsupported),
    };

    match (app, len) {
        (AppTag::Null, 0) => Ok(DataValue::Null),
        (AppTag::Boolean, len) => Ok(DataValue::Boolean(len != 0)),
        (AppTag::UnsignedInt, len) => Ok(DataValue::Unsigned(decode_unsigned(r, len)?)),
        (AppTag::SignedInt, len) => Ok(DataValue::Signed(decode_signed(r, len)?)),
        (AppTag::Real, 4) => Ok(DataValue::Real(f32::from_be_bytes(r.read_array()?))),
        (AppTag::Double, 8) => Ok(DataValue::Double(f64::from_be_bytes(r.read_array()?))),
        (AppTag::OctetString, len) => Ok(DataValue::OctetString(r.read_exact(len)?)),
        (AppTag::CharacterString, len) => {
            Ok(DataValue::CharacterString(decode_character_string(r, len)?))
        }
        (AppTag::BitString, len) => Ok(DataValue::BitString(decode_bit_string(r, len)?)),
        (AppTag::Enumerated, len) => Ok(DataValue::Enumerated(decode_unsigned(r, len)?)),
        (AppTag::Date, 4) => Ok(DataValue::Date(Date::from_bytes(r.read_array()?))),
        (AppTag::Time, 4) => Ok(DataValue::Time(Time::from_bytes(r.read_array()?))),
        (AppTag::ObjectId, 4) => Ok(DataValue::ObjectId(ObjectId::from_raw(r.read_be_u32()?))),
        _ => Err(DecodeError::InvalidLength),
    }
}

/// Decodes the application values inside an opening tag `tag_num` (already
/// consumed) up to and including its matching closing tag.
///
/// Nested opening/closing tags are returned as structural values. The end of
/// the buffer also terminates the list. An application date directly followed
/// by an application time is joined into one [`DataValue::DateTime`].
#[cfg(feature = "alloc")]
pub fn decode_values_until_closing<'a>(
    r: &mut Reader<'a>,
    tag_num: u8,
) -> Result<Vec<DataValue<'a>>, DecodeError> {
    let mut values = Vec::new();
    let mut depth = 0usize;
    while !r.is_empty() {
        let tag = Tag::decode(r)?;
        match tag {
            Tag::Closing { tag_num: n } if depth == 0 && n == tag_num => break,
            Tag::Closing { .. } => depth = depth.checked_sub(1).ok_or(DecodeError::InvalidTag)?,
            Tag::Opening { .. } => depth += 1,
            _ => {}
        }
        let value = match decode_application_data_value_from_tag(r, tag)? {
            DataValue::Date(date) => join_time(r, date),
            other => other,
        };
        values.push(value);
    }
    Ok(values)
}

fn join_time<'a>(r: &mut Reader<'a>, date: Date) -> DataValue<'a> {
    let mut probe = *r;
    match Tag::decode(&mut probe) {
        Ok(Tag::Application {
            tag: AppTag::Time,
            len: 4,
        }) => match probe.read_array() {
            Ok(bytes) => {
                *r = probe;
                DataValue::DateTime(DateTime {
                    date,
                    time: Time::from_bytes(bytes),
                })
            }
            Err(_) => DataValue::Date(date),
        },
        _ => DataValue::Date(date),
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_application_data_value, encode_application_data_value};
    use crate::encoding::{reader::Reader, writer::Writer};
    use crate::types::{BitString, DataValue, Date, DateTime, ObjectId, ObjectType, Time};
    use crate::DecodeError;
    use proptest::prelude::*;

    fn roundtrip(v: &DataValue<'_>) -> ([u8; 64], usize) {
        let mut buf = [0u8; 64];
        let len = {
            let mut w = Writer::new(&mut buf);
            encode_application_data_value(&mut w, v).unwrap();
            w.position()
        };
        (buf, len)
    }

    #[test]
    fn scalar_values_survive_a_roundtrip() {
        let values = [
            DataValue::Null,
            DataValue::Boolean(true),
            DataValue::Unsigned(123),
            DataValue::Signed(-123),
            DataValue::Real(12.5),
            DataValue::Double(42.25),
            DataValue::OctetString(&[1, 2, 3]),
            DataValue::CharacterString("hello"),
            DataValue::BitString(BitString::new(1, &[0b1010_0000])),
            DataValue::Enumerated(9),
            DataValue::Date(Date::from_ymd(2024, 2, 3).unwrap()),
            DataValue::Time(Time::new(1, 2, 3, 4)),
            DataValue::DateTime(DateTime {
                date: Date::from_ymd(2024, 5, 6).unwrap(),
                time: Time::new(7, 8, 9, 10),
            }),
            DataValue::ObjectId(ObjectId::new(ObjectType::Device, 1)),
            DataValue::OpeningTag(1),
            DataValue::ClosingTag(1),
        ];

        for v in values {
            let (buf, len) = roundtrip(&v);
            let mut r = Reader::new(&buf[..len]);
            assert_eq!(decode_application_data_value(&mut r).unwrap(), v);
            assert!(r.is_empty());
        }
    }

    #[test]
    fn known_encodings() {
        let (buf, len) = roundtrip(&DataValue::Unsigned(42));
        assert_eq!(&buf[..len], &[0x21, 0x2A]);
        let (buf, len) = roundtrip(&DataValue::Real(1.0));
        assert_eq!(&buf[..len], &[0x44, 0x3F, 0x80, 0x00, 0x00]);
        let (buf, len) = roundtrip(&DataValue::CharacterString("hi"));
        assert_eq!(&buf[..len], &[0x73, 0x00, b'h', b'i']);
        let (buf, len) = roundtrip(&DataValue::Boolean(false));
        assert_eq!(&buf[..len], &[0x10]);
    }

    #[test]
    fn context_tag_is_not_an_application_value() {
        let mut r = Reader::new(&[0x19, 0x55]);
        assert_eq!(
            decode_application_data_value(&mut r).unwrap_err(),
            DecodeError::Unsupported
        );
    }

    #[test]
    fn null_with_content_is_rejected() {
        let mut r = Reader::new(&[0x01, 0x00, 0x21, 0x05]);
        assert_eq!(
            decode_application_data_value(&mut r).unwrap_err(),
            DecodeError::InvalidLength
        );
    }

    #[test]
    fn date_alone_stays_a_date() {
        let date = Date::from_ymd(2024, 5, 6).unwrap();
        let mut buf = [0u8; 16];
        let len = {
            let mut w = Writer::new(&mut buf);
            encode_application_data_value(&mut w, &DataValue::Date(date)).unwrap();
            encode_application_data_value(&mut w, &DataValue::Unsigned(5)).unwrap();
            w.position()
        };
        let mut r = Reader::new(&buf[..len]);
        assert_eq!(decode_application_data_value(&mut r).unwrap(), DataValue::Date(date));
        assert_eq!(decode_application_data_value(&mut r).unwrap(), DataValue::Unsigned(5));
        assert!(r.is_empty());
    }

    #[test]
    fn real_with_wrong_length_is_rejected() {
        let mut r = Reader::new(&[0x43, 0x00, 0x00, 0x00]);
        assert_eq!(
            decode_application_data_value(&mut r).unwrap_err(),
            DecodeError::InvalidLength
        );
    }

    #[cfg(feature = "alloc")]
    mod lists {
        use super::super::{decode_values_until_closing, encode_application_data_values};
        use crate::encoding::{reader::Reader, writer::Writer};
        use crate::types::{DataValue, Date, DateTime, Time};

        #[test]
        fn stops_at_matching_closing_tag() {
            let bytes = [0x21, 0x01, 0x1E, 0x21, 0x02, 0x1F, 0x21, 0x03, 0x3F, 0xAA];
            let mut r = Reader::new(&bytes);
            let values = decode_values_until_closing(&mut r, 3).unwrap();
            assert_eq!(
                values,
                vec![
                    DataValue::Unsigned(1),
                    DataValue::OpeningTag(1),
                    DataValue::Unsigned(2),
                    DataValue::ClosingTag(1),
                    DataValue::Unsigned(3),
                ]
            );
            assert_eq!(r.rest(), &[0xAA]);
        }

        #[test]
        fn end_of_buffer_terminates() {
            let mut r = Reader::new(&[0x21, 0x2A]);
            let values = decode_values_until_closing(&mut r, 3).unwrap();
            assert_eq!(values, vec![DataValue::Unsigned(42)]);
        }

        #[test]
        fn date_then_time_becomes_date_time() {
            let dt = DateTime {
                date: Date::from_ymd(2024, 5, 6).unwrap(),
                time: Time::new(7, 8, 9, 10),
            };
            let mut buf = [0u8; 32];
            let mut w = Writer::new(&mut buf);
            encode_application_data_values(
                &mut w,
                &[DataValue::DateTime(dt), DataValue::Date(dt.date), DataValue::Null],
            )
            .unwrap();
            let mut r = Reader::new(w.as_written());
            let values = decode_values_until_closing(&mut r, 3).unwrap();
            assert_eq!(
                values,
                vec![DataValue::DateTime(dt), DataValue::Date(dt.date), DataValue::Null]
            );
        }
    }

    proptest! {
        #[test]
        fn real_roundtrip(v in any::<f32>().prop_filter("nan", |v| !v.is_nan())) {
            let (buf, len) = roundtrip(&DataValue::Real(v));
            let mut r = Reader::new(&buf[..len]);
            prop_assert_eq!(decode_application_data_value(&mut r).unwrap(), DataValue::Real(v));
        }

        #[test]
        fn signed_roundtrip(v in any::<i32>()) {
            let (buf, len) = roundtrip(&DataValue::Signed(v));
            let mut r = Reader::new(&buf[..len]);
            prop_assert_eq!(decode_application_data_value(&mut r).unwrap(), DataValue::Signed(v));
        }

        #[test]
        fn character_string_roundtrip(s in "\\PC{0,40}") {
            let mut buf = [0u8; 256];
            let mut w = Writer::new(&mut buf);
            encode_application_data_value(&mut w, &DataValue::CharacterString(&s)).unwrap();
            let mut r = Reader::new(w.as_written());
            prop_assert_eq!(
                decode_application_data_value(&mut r).unwrap(),
                DataValue::CharacterString(&s)
            );
        }
    }
}
