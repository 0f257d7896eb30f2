use crate::apdu::ConfirmedRequestHeader;
use crate::encoding::{
    primitives::{encode_ctx_object_id, encode_ctx_unsigned},
    reader::Reader,
    tag::Tag,
    writer::Writer,
};
#[cfg(feature = "alloc")]
use crate::encoding::primitives::{encode_closing_tag, encode_opening_tag};
#[cfg(feature = "alloc")]
use crate::services::value_codec::{decode_values_until_closing, encode_application_data_values};
use crate::services::{decode_ctx_unsigned_body, decode_required_ctx_object_id, decode_required_ctx_unsigned};
#[cfg(feature = "alloc")]
use crate::types::DataValue;
use crate::types::{ObjectId, PropertyId};
use crate::{DecodeError, EncodeError};

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

pub const SERVICE_READ_PROPERTY: u8 = 0x0C;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadPropertyRequest {
    pub object_id: ObjectId,
    pub property_id: PropertyId,
    pub array_index: Option<u32>,
    pub invoke_id: u8,
}

impl ReadPropertyRequest {
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        let property_id = self.property_id.checked()?;
        ConfirmedRequestHeader::new(self.invoke_id, SERVICE_READ_PROPERTY).encode(w)?;
        encode_ctx_object_id(w, 0, self.object_id)?;
        encode_ctx_unsigned(w, 1, property_id)?;
        if let Some(idx) = self.array_index {
            encode_ctx_unsigned(w, 2, idx)?;
        }
        Ok(())
    }
}

/// Body of a ReadProperty complex ack.
///
/// `values` holds every application value between the opening and closing
/// ctx 3 tags, so list properties such as the object list decode to several
/// entries.
#[cfg(feature = "alloc")]
#[derive(Debug, Clone, PartialEq)]
pub struct ReadPropertyAck<'a> {
    pub object_id: ObjectId,
    pub property_id: PropertyId,
    pub array_index: Option<u32>,
    pub values: Vec<DataValue<'a>>,
}

#[cfg(feature = "alloc")]
impl<'a> ReadPropertyAck<'a> {
    pub fn encode_after_header(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        encode_ctx_object_id(w, 0, self.object_id)?;
        encode_ctx_unsigned(w, 1, self.property_id.checked()?)?;
        if let Some(idx) = self.array_index {
            encode_ctx_unsigned(w, 2, idx)?;
        }
        encode_opening_tag(w, 3)?;
        encode_application_data_values(w, &self.values)?;
        encode_closing_tag(w, 3)
    }

    pub fn decode_after_header(r: &mut Reader<'a>) -> Result<Self, DecodeError> {
        let object_id = decode_required_ctx_object_id(r, 0)?;
        let property_id = PropertyId::from_u32(decode_required_ctx_unsigned(r, 1)?);

        let (array_index, value_start) = match Tag::decode(r)? {
            Tag::Context { tag_num: 2, len } => {
                let idx = decode_ctx_unsigned_body(r, len)?;
                (Some(idx), Tag::decode(r)?)
            }
            other => (None, other),
        };
        if value_start != (Tag::Opening { tag_num: 3 }) {
            return Err(DecodeError::InvalidTag);
        }

        Ok(Self {
            object_id,
            property_id,
            array_index,
            values: decode_values_until_closing(r, 3)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ReadPropertyRequest, SERVICE_READ_PROPERTY};
    use crate::encoding::writer::Writer;
    use crate::types::{ObjectId, ObjectType, PropertyId};
    use crate::EncodeError;

    #[test]
    fn request_bytes() {
        let req = ReadPropertyRequest {
            object_id: ObjectId::new(ObjectType::AnalogInput, 1),
            property_id: PropertyId::PresentValue,
            array_index: None,
            invoke_id: 1,
        };
        let mut buf = [0u8; 32];
        let mut w = Writer::new(&mut buf);
        req.encode(&mut w).unwrap();
        assert_eq!(
            w.as_written(),
            &[0x02, 0x75, 0x01, SERVICE_READ_PROPERTY, 0x0C, 0x00, 0x00, 0x00, 0x01, 0x19, 0x55]
        );
    }

    #[test]
    fn array_index_is_context_two() {
        let req = ReadPropertyRequest {
            object_id: ObjectId::new(ObjectType::Device, 5),
            property_id: PropertyId::ObjectList,
            array_index: Some(0),
            invoke_id: 2,
        };
        let mut buf = [0u8; 32];
        let mut w = Writer::new(&mut buf);
        req.encode(&mut w).unwrap();
        assert_eq!(&w.as_written()[9..], &[0x19, 0x4C, 0x29, 0x00]);
    }

    #[test]
    fn oversized_property_id_is_rejected() {
        let req = ReadPropertyRequest {
            object_id: ObjectId::new(ObjectType::Device, 5),
            property_id: PropertyId::Proprietary(0x40_0000),
            array_index: None,
            invoke_id: 2,
        };
        let mut buf = [0u8; 32];
        let mut w = Writer::new(&mut buf);
        assert_eq!(
            req.encode(&mut w).unwrap_err(),
            EncodeError::PropertyIdOutOfRange(0x40_0000)
        );
        assert_eq!(w.position(), 0);
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn ack_collects_every_value() {
        use super::ReadPropertyAck;
        use crate::encoding::reader::Reader;
        use crate::types::DataValue;

        let bytes = [
            0x0C, 0x02, 0x00, 0x00, 0x05, // device,5
            0x19, 0x4C, // object-list
            0x3E, //
            0xC4, 0x00, 0x00, 0x00, 0x01, //
            0xC4, 0x00, 0xC0, 0x00, 0x02, //
            0x3F,
        ];
        let mut r = Reader::new(&bytes);
        let ack = ReadPropertyAck::decode_after_header(&mut r).unwrap();
        assert_eq!(ack.property_id, PropertyId::ObjectList);
        assert_eq!(
            ack.values,
            vec![
                DataValue::ObjectId(ObjectId::new(ObjectType::AnalogInput, 1)),
                DataValue::ObjectId(ObjectId::new(ObjectType::BinaryInput, 2)),
            ]
        );
        assert!(r.is_empty());
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn ack_without_value_block_is_rejected() {
        use super::ReadPropertyAck;
        use crate::encoding::reader::Reader;
        use crate::DecodeError;

        let mut r = Reader::new(&[0x0C, 0x02, 0x00, 0x00, 0x05, 0x19, 0x55, 0x21, 0x01]);
        assert_eq!(
            ReadPropertyAck::decode_after_header(&mut r).unwrap_err(),
            DecodeError::InvalidTag
        );
    }
}
