use crate::apdu::UnconfirmedRequestHeader;
use crate::encoding::primitives::encode_ctx_unsigned;
use crate::encoding::{reader::Reader, tag::Tag, writer::Writer};
use crate::services::decode_ctx_unsigned_body;
use crate::types::MAX_INSTANCE;
use crate::{DecodeError, EncodeError};

pub const SERVICE_WHO_IS: u8 = 0x08;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WhoIsRequest {
    pub low_limit: Option<u32>,
    pub high_limit: Option<u32>,
}

impl WhoIsRequest {
    pub const fn global() -> Self {
        Self {
            low_limit: None,
            high_limit: None,
        }
    }

    /// Asks only devices with an instance in `low..=high` to answer.
    pub const fn range(low: u32, high: u32) -> Self {
        Self {
            low_limit: Some(low),
            high_limit: Some(high),
        }
    }

    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        for limit in [self.low_limit, self.high_limit].into_iter().flatten() {
            if limit > MAX_INSTANCE {
                return Err(EncodeError::InstanceOutOfRange(limit));
            }
        }
        UnconfirmedRequestHeader {
            service_choice: SERVICE_WHO_IS,
        }
        .encode(w)?;

        if let Some(low) = self.low_limit {
            encode_ctx_unsigned(w, 0, low)?;
        }
        if let Some(high) = self.high_limit {
            encode_ctx_unsigned(w, 1, high)?;
        }
        Ok(())
    }

    pub fn decode_after_header(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let mut req = Self::global();
        while !r.is_empty() {
            match Tag::decode(r)? {
                Tag::Context { tag_num: 0, len } => {
                    req.low_limit = Some(decode_ctx_unsigned_body(r, len)?)
                }
                Tag::Context { tag_num: 1, len } => {
                    req.high_limit = Some(decode_ctx_unsigned_body(r, len)?)
                }
                _ => return Err(DecodeError::InvalidTag),
            }
        }
        Ok(req)
    }
}
