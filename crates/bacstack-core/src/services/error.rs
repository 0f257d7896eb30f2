use crate::encoding::{
    primitives::{decode_app_enumerated, encode_app_enumerated},
    reader::Reader,
    tag::Tag,
    writer::Writer,
};
use crate::types::{ErrorClass, ErrorCode};
use crate::{DecodeError, EncodeError};

/// Error class and code carried after an Error PDU header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceError {
    pub error_class: u32,
    pub error_code: u32,
}

impl ServiceError {
    pub fn class(&self) -> Option<ErrorClass> {
        ErrorClass::from_u32(self.error_class)
    }

    pub fn code(&self) -> Option<ErrorCode> {
        ErrorCode::from_u32(self.error_code)
    }

    pub fn encode_after_header(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        encode_app_enumerated(w, self.error_class)?;
        encode_app_enumerated(w, self.error_code)
    }

    /// Accepts the plain pair of application enumerations as well as the
    /// form wrapped in opening/closing ctx 0 used by some services.
    pub fn decode_after_header(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let mut probe = *r;
        let wrapped = Tag::decode(&mut probe)? == (Tag::Opening { tag_num: 0 });
        if wrapped {
            *r = probe;
        }
        let error_class = decode_app_enumerated(r)?;
        let error_code = decode_app_enumerated(r)?;
        if wrapped && !Tag::decode(r)?.closes(0) {
            return Err(DecodeError::InvalidTag);
        }
        Ok(Self {
            error_class,
            error_code,
        })
    }
}
