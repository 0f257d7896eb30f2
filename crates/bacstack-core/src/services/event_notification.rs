use crate::encoding::{
    primitives::{decode_character_string, encode_app_date, encode_app_time, encode_ctx_unsigned},
    reader::Reader,
    tag::{AppTag, Tag},
    writer::Writer,
};
use crate::services::{
    decode_ctx_unsigned_body, decode_optional_ctx_unsigned, decode_required_ctx_object_id,
    decode_required_ctx_unsigned,
};
use crate::types::{Date, ObjectId, Time};
use crate::{DecodeError, EncodeError};

pub const SERVICE_CONFIRMED_EVENT_NOTIFICATION: u8 = 0x02;
pub const SERVICE_UNCONFIRMED_EVENT_NOTIFICATION: u8 = 0x03;

/// BACnetTimeStamp choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeStamp {
    Time(Time),
    SequenceNumber(u32),
    DateTime { date: Date, time: Time },
}

impl TimeStamp {
    /// Encodes the choice wrapped in opening/closing `tag_num`.
    pub fn encode_wrapped(&self, w: &mut Writer<'_>, tag_num: u8) -> Result<(), EncodeError> {
        Tag::Opening { tag_num }.encode(w)?;
        match *self {
            TimeStamp::Time(time) => {
                Tag::Context { tag_num: 0, len: 4 }.encode(w)?;
                w.write_all(&time.to_bytes())?;
            }
            TimeStamp::SequenceNumber(seq) => encode_ctx_unsigned(w, 1, seq)?,
            TimeStamp::DateTime { date, time } => {
                Tag::Opening { tag_num: 2 }.encode(w)?;
                encode_app_date(w, date)?;
                encode_app_time(w, time)?;
                Tag::Closing { tag_num: 2 }.encode(w)?;
            }
        }
        Tag::Closing { tag_num }.encode(w)
    }

    pub fn decode_wrapped(r: &mut Reader<'_>, tag_num: u8) -> Result<Self, DecodeError> {
        if Tag::decode(r)? != (Tag::Opening { tag_num }) {
            return Err(DecodeError::InvalidTag);
        }
        let timestamp = match Tag::decode(r)? {
            Tag::Context { tag_num: 0, len: 4 } => TimeStamp::Time(Time::from_bytes(r.read_array()?)),
            Tag::Context { tag_num: 1, len } => {
                TimeStamp::SequenceNumber(decode_ctx_unsigned_body(r, len)?)
            }
            Tag::Opening { tag_num: 2 } => {
                let date = match Tag::decode(r)? {
                    Tag::Application { tag: AppTag::Date, len: 4 } => Date::from_bytes(r.read_array()?),
                    _ => return Err(DecodeError::InvalidTag),
                };
                let time = match Tag::decode(r)? {
                    Tag::Application { tag: AppTag::Time, len: 4 } => Time::from_bytes(r.read_array()?),
                    _ => return Err(DecodeError::InvalidTag),
                };
                if !Tag::decode(r)?.closes(2) {
                    return Err(DecodeError::InvalidTag);
                }
                TimeStamp::DateTime { date, time }
            }
            _ => return Err(DecodeError::InvalidTag),
        };
        if !Tag::decode(r)?.closes(tag_num) {
            return Err(DecodeError::InvalidTag);
        }
        Ok(timestamp)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventNotificationRequest<'a> {
    pub process_id: u32,
    pub initiating_device_id: ObjectId,
    pub event_object_id: ObjectId,
    pub timestamp: TimeStamp,
    pub notification_class: u32,
    pub priority: u32,
    pub event_type: u32,
    pub message_text: Option<&'a str>,
    pub notify_type: u32,
    pub ack_required: Option<bool>,
    pub from_state: u32,
    pub to_state: u32,
}

impl<'a> EventNotificationRequest<'a> {
    /// Decodes the notification body. Trailing event values (ctx 12) are
    /// skipped.
    pub fn decode_after_header(r: &mut Reader<'a>) -> Result<Self, DecodeError> {
        let process_id = decode_required_ctx_unsigned(r, 0)?;
        let initiating_device_id = decode_required_ctx_object_id(r, 1)?;
        let event_object_id = decode_required_ctx_object_id(r, 2)?;
        let timestamp = TimeStamp::decode_wrapped(r, 3)?;
        let notification_class = decode_required_ctx_unsigned(r, 4)?;
        let priority = decode_required_ctx_unsigned(r, 5)?;
        let event_type = decode_required_ctx_unsigned(r, 6)?;

        let checkpoint = *r;
        let message_text = match Tag::decode(r)? {
            Tag::Context { tag_num: 7, len } => Some(decode_character_string(r, len as usize)?),
            _ => {
                *r = checkpoint;
                None
            }
        };

        let notify_type = decode_required_ctx_unsigned(r, 8)?;
        let ack_required = decode_optional_ctx_unsigned(r, 9)?.map(|v| v != 0);
        let from_state = decode_required_ctx_unsigned(r, 10)?;
        let to_state = decode_required_ctx_unsigned(r, 11)?;

        if !r.is_empty() {
            let checkpoint = *r;
            if Tag::decode(r)? == (Tag::Opening { tag_num: 12 }) {
                skip_constructed(r, 12)?;
            } else {
                *r = checkpoint;
            }
        }

        Ok(Self {
            process_id,
            initiating_device_id,
            event_object_id,
            timestamp,
            notification_class,
            priority,
            event_type,
            message_text,
            notify_type,
            ack_required,
            from_state,
            to_state,
        })
    }
}

fn skip_constructed(r: &mut Reader<'_>, tag_num: u8) -> Result<(), DecodeError> {
    loop {
        match Tag::decode(r)? {
            Tag::Closing { tag_num: closing } if closing == tag_num => return Ok(()),
            Tag::Opening { tag_num: nested } => skip_constructed(r, nested)?,
            Tag::Application {
                tag: AppTag::Boolean,
                ..
            } => {}
            Tag::Application { len, .. } | Tag::Context { len, .. } => r.skip(len as usize)?,
            Tag::Closing { .. } => return Err(DecodeError::InvalidTag),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EventNotificationRequest, TimeStamp, SERVICE_UNCONFIRMED_EVENT_NOTIFICATION};
    use crate::apdu::UnconfirmedRequestHeader;
    use crate::encoding::{
        primitives::{encode_ctx_boolean, encode_ctx_object_id, encode_ctx_unsigned},
        reader::Reader,
        tag::Tag,
        writer::Writer,
    };
    use crate::types::{Date, ObjectId, ObjectType, Time};

    fn encode_ctx_text(w: &mut Writer<'_>, tag_num: u8, text: &str) {
        Tag::Context {
            tag_num,
            len: text.len() as u32 + 1,
        }
        .encode(w)
        .unwrap();
        w.write_u8(0).unwrap();
        w.write_all(text.as_bytes()).unwrap();
    }

    #[test]
    fn decode_event_notification_after_header() {
        let mut buf = [0u8; 256];
        let mut w = Writer::new(&mut buf);
        UnconfirmedRequestHeader {
            service_choice: SERVICE_UNCONFIRMED_EVENT_NOTIFICATION,
        }
        .encode(&mut w)
        .unwrap();
        encode_ctx_unsigned(&mut w, 0, 19).unwrap();
        encode_ctx_object_id(&mut w, 1, ObjectId::new(ObjectType::Device, 1)).unwrap();
        encode_ctx_object_id(&mut w, 2, ObjectId::new(ObjectType::AnalogInput, 3)).unwrap();
        TimeStamp::SequenceNumber(42).encode_wrapped(&mut w, 3).unwrap();
        encode_ctx_unsigned(&mut w, 4, 7).unwrap();
        encode_ctx_unsigned(&mut w, 5, 100).unwrap();
        encode_ctx_unsigned(&mut w, 6, 2).unwrap();
        encode_ctx_text(&mut w, 7, "alarm message");
        encode_ctx_unsigned(&mut w, 8, 0).unwrap();
        encode_ctx_boolean(&mut w, 9, true).unwrap();
        encode_ctx_unsigned(&mut w, 10, 2).unwrap();
        encode_ctx_unsigned(&mut w, 11, 0).unwrap();
        Tag::Opening { tag_num: 12 }.encode(&mut w).unwrap();
        Tag::Opening { tag_num: 0 }.encode(&mut w).unwrap();
        encode_ctx_unsigned(&mut w, 0, 1).unwrap();
        Tag::Closing { tag_num: 0 }.encode(&mut w).unwrap();
        Tag::Closing { tag_num: 12 }.encode(&mut w).unwrap();

        let mut r = Reader::new(w.as_written());
        UnconfirmedRequestHeader::decode(&mut r).unwrap();
        let notification = EventNotificationRequest::decode_after_header(&mut r).unwrap();
        assert!(r.is_empty());
        assert_eq!(notification.process_id, 19);
        assert_eq!(notification.initiating_device_id, ObjectId::new(ObjectType::Device, 1));
        assert_eq!(notification.event_object_id, ObjectId::new(ObjectType::AnalogInput, 3));
        assert_eq!(notification.timestamp, TimeStamp::SequenceNumber(42));
        assert_eq!(notification.notification_class, 7);
        assert_eq!(notification.message_text, Some("alarm message"));
        assert_eq!(notification.ack_required, Some(true));
        assert_eq!(notification.from_state, 2);
        assert_eq!(notification.to_state, 0);
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let mut buf = [0u8; 128];
        let mut w = Writer::new(&mut buf);
        encode_ctx_unsigned(&mut w, 0, 1).unwrap();
        encode_ctx_object_id(&mut w, 1, ObjectId::new(ObjectType::Device, 9)).unwrap();
        encode_ctx_object_id(&mut w, 2, ObjectId::new(ObjectType::BinaryInput, 1)).unwrap();
        TimeStamp::Time(Time::new(12, 0, 0, 0)).encode_wrapped(&mut w, 3).unwrap();
        encode_ctx_unsigned(&mut w, 4, 1).unwrap();
        encode_ctx_unsigned(&mut w, 5, 200).unwrap();
        encode_ctx_unsigned(&mut w, 6, 0).unwrap();
        encode_ctx_unsigned(&mut w, 8, 1).unwrap();
        encode_ctx_unsigned(&mut w, 10, 0).unwrap();
        encode_ctx_unsigned(&mut w, 11, 2).unwrap();

        let mut r = Reader::new(w.as_written());
        let n = EventNotificationRequest::decode_after_header(&mut r).unwrap();
        assert_eq!(n.message_text, None);
        assert_eq!(n.ack_required, None);
        assert_eq!(n.timestamp, TimeStamp::Time(Time::new(12, 0, 0, 0)));
        assert_eq!(n.to_state, 2);
    }

    #[test]
    fn date_time_stamp_with_wildcards() {
        let stamp = TimeStamp::DateTime {
            date: Date {
                year_since_1900: 0xFF,
                month: 0xFF,
                day: 0xFF,
                weekday: 0xFF,
            },
            time: Time::new(1, 2, 3, 4),
        };
        let mut buf = [0u8; 32];
        let mut w = Writer::new(&mut buf);
        stamp.encode_wrapped(&mut w, 3).unwrap();
        let mut r = Reader::new(w.as_written());
        assert_eq!(TimeStamp::decode_wrapped(&mut r, 3).unwrap(), stamp);
    }
}
