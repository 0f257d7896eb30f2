use core::fmt;

/// Failure while encoding a frame. Encoders stop at the first error; the
/// partially written buffer must not be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    BufferTooSmall,
    ValueOutOfRange,
    InvalidLength,
    /// Object type above 1023.
    ObjectTypeOutOfRange(u32),
    /// Object instance above 0x3F_FFFF.
    InstanceOutOfRange(u32),
    /// Property identifier above 0x3F_FFFF.
    PropertyIdOutOfRange(u32),
    /// Character set other than UTF-8.
    UnsupportedCharacterSet(u8),
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferTooSmall => f.write_str("buffer too small"),
            Self::ValueOutOfRange => f.write_str("value out of range"),
            Self::InvalidLength => f.write_str("invalid length"),
            Self::ObjectTypeOutOfRange(v) => write!(f, "object type {v} exceeds 1023"),
            Self::InstanceOutOfRange(v) => write!(f, "object instance {v} exceeds 4194303"),
            Self::PropertyIdOutOfRange(v) => write!(f, "property identifier {v} exceeds 4194303"),
            Self::UnsupportedCharacterSet(v) => write!(f, "character set {v} is not supported"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EncodeError {}

/// Failure while decoding a frame. Decoders never panic on malformed input;
/// the caller drops the datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    UnexpectedEof,
    InvalidTag,
    InvalidLength,
    InvalidValue,
    Unsupported,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => f.write_str("unexpected end of input"),
            Self::InvalidTag => f.write_str("invalid tag"),
            Self::InvalidLength => f.write_str("invalid length"),
            Self::InvalidValue => f.write_str("invalid value"),
            Self::Unsupported => f.write_str("operation unsupported"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}
