use crate::types::ObjectType;
use crate::EncodeError;

/// Largest object type number that fits the 10-bit type field.
pub const MAX_OBJECT_TYPE: u32 = 0x3FF;
/// Largest instance number that fits the 22-bit instance field.
pub const MAX_INSTANCE: u32 = 0x3F_FFFF;

/// Object identifier: object type in the upper 10 bits, instance number in
/// the lower 22 bits, exactly as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ObjectId(u32);

impl ObjectId {
    /// Packs a type and instance, masking out-of-range bits. Use
    /// [`ObjectId::try_new`] for values that come from a caller.
    pub const fn new(object_type: ObjectType, instance: u32) -> Self {
        Self(((object_type.to_u16() as u32 & MAX_OBJECT_TYPE) << 22) | (instance & MAX_INSTANCE))
    }

    /// Packs a type and instance, rejecting values that do not fit.
    pub fn try_new(object_type: ObjectType, instance: u32) -> Result<Self, EncodeError> {
        let raw_type = u32::from(object_type.to_u16());
        if raw_type > MAX_OBJECT_TYPE {
            return Err(EncodeError::ObjectTypeOutOfRange(raw_type));
        }
        if instance > MAX_INSTANCE {
            return Err(EncodeError::InstanceOutOfRange(instance));
        }
        Ok(Self::new(object_type, instance))
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn object_type(self) -> ObjectType {
        ObjectType::from_u16(((self.0 >> 22) & MAX_OBJECT_TYPE) as u16)
    }

    pub const fn instance(self) -> u32 {
        self.0 & MAX_INSTANCE
    }
}

impl core::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}:{}", self.object_type(), self.instance())
    }
}
