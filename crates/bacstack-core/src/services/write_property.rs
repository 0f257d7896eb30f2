use crate::apdu::ConfirmedRequestHeader;
use crate::encoding::{
    primitives::{
        encode_closing_tag, encode_ctx_object_id, encode_ctx_unsigned, encode_opening_tag,
    },
    writer::Writer,
};
use crate::services::value_codec::encode_application_data_values;
use crate::types::{DataValue, ObjectId, PropertyId};
use crate::EncodeError;

pub const SERVICE_WRITE_PROPERTY: u8 = 0x0F;

/// WriteProperty request.
///
/// Body layout: ctx 0 object id, the values wrapped in opening/closing ctx 3,
/// ctx 1 property id, then the optional ctx 4 priority.
#[derive(Debug, Clone, PartialEq)]
pub struct WritePropertyRequest<'a> {
    pub object_id: ObjectId,
    pub property_id: PropertyId,
    pub values: &'a [DataValue<'a>],
    pub priority: Option<u8>,
    pub invoke_id: u8,
}

impl<'a> WritePropertyRequest<'a> {
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        let property_id = self.property_id.checked()?;
        if let Some(priority) = self.priority {
            if !(1..=16).contains(&priority) {
                return Err(EncodeError::ValueOutOfRange);
            }
        }
        ConfirmedRequestHeader::new(self.invoke_id, SERVICE_WRITE_PROPERTY).encode(w)?;

        encode_ctx_object_id(w, 0, self.object_id)?;
        encode_opening_tag(w, 3)?;
        encode_application_data_values(w, self.values)?;
        encode_closing_tag(w, 3)?;
        encode_ctx_unsigned(w, 1, property_id)?;
        if let Some(priority) = self.priority {
            encode_ctx_unsigned(w, 4, u32::from(priority))?;
        }
        Ok(())
    }
}
