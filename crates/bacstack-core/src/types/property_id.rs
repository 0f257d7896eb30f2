use crate::EncodeError;

/// Largest property identifier that can be encoded.
pub const MAX_PROPERTY_ID: u32 = 0x3F_FFFF;

/// BACnet property identifiers used by this stack. Anything else travels as
/// [`Proprietary`](Self::Proprietary) with its raw number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropertyId {
    Description,
    EventState,
    HighLimit,
    LimitEnable,
    LowLimit,
    NotificationClass,
    ObjectIdentifier,
    ObjectList,
    ObjectName,
    ObjectType,
    PresentValue,
    RecipientList,
    StatusFlags,
    Units,
    VendorName,
    Proprietary(u32),
}

impl PropertyId {
    pub const fn to_u32(self) -> u32 {
        match self {
            Self::Description => 28,
            Self::EventState => 36,
            Self::HighLimit => 45,
            Self::LimitEnable => 52,
            Self::LowLimit => 59,
            Self::NotificationClass => 17,
            Self::ObjectIdentifier => 75,
            Self::ObjectList => 76,
            Self::ObjectName => 77,
            Self::ObjectType => 79,
            Self::PresentValue => 85,
            Self::RecipientList => 102,
            Self::StatusFlags => 111,
            Self::Units => 117,
            Self::VendorName => 121,
            Self::Proprietary(v) => v,
        }
    }

    pub const fn from_u32(value: u32) -> Self {
        match value {
            28 => Self::Description,
            36 => Self::EventState,
            45 => Self::HighLimit,
            52 => Self::LimitEnable,
            59 => Self::LowLimit,
            17 => Self::NotificationClass,
            75 => Self::ObjectIdentifier,
            76 => Self::ObjectList,
            77 => Self::ObjectName,
            79 => Self::ObjectType,
            85 => Self::PresentValue,
            102 => Self::RecipientList,
            111 => Self::StatusFlags,
            117 => Self::Units,
            121 => Self::VendorName,
            v => Self::Proprietary(v),
        }
    }

    /// Returns the wire value, rejecting identifiers above 22 bits.
    pub fn checked(self) -> Result<u32, EncodeError> {
        match self.to_u32() {
            v if v > MAX_PROPERTY_ID => Err(EncodeError::PropertyIdOutOfRange(v)),
            v => Ok(v),
        }
    }
}
