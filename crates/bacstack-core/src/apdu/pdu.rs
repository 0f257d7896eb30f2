use crate::DecodeError;

/// Segmented-message bit on confirmed requests and complex acks.
pub const FLAG_SEGMENTED: u8 = 0x08;
/// More-follows bit on confirmed requests and complex acks.
pub const FLAG_MORE_FOLLOWS: u8 = 0x04;
/// Segmented-response-accepted bit on confirmed requests.
pub const FLAG_SEGMENTED_RESPONSE_ACCEPTED: u8 = 0x02;
/// Negative-ack bit on segment acks.
pub const FLAG_NEGATIVE_ACK: u8 = 0x02;
/// Sent-by-server bit on segment acks and aborts.
pub const FLAG_SERVER: u8 = 0x01;

/// PDU type, carried in the top nibble of the first APDU octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ApduType {
    ConfirmedRequest = 0,
    UnconfirmedRequest = 1,
    SimpleAck = 2,
    ComplexAck = 3,
    SegmentAck = 4,
    Error = 5,
    Reject = 6,
    Abort = 7,
}

impl ApduType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::ConfirmedRequest),
            1 => Some(Self::UnconfirmedRequest),
            2 => Some(Self::SimpleAck),
            3 => Some(Self::ComplexAck),
            4 => Some(Self::SegmentAck),
            5 => Some(Self::Error),
            6 => Some(Self::Reject),
            7 => Some(Self::Abort),
            _ => None,
        }
    }

    /// Type of the APDU starting with `first_octet`.
    pub fn of(first_octet: u8) -> Option<Self> {
        Self::from_u8(first_octet >> 4)
    }

    pub(crate) const fn lead(self) -> u8 {
        (self as u8) << 4
    }

    /// Reads the first octet and checks it carries this type, returning the
    /// low-nibble flags.
    pub(crate) fn expect(self, r: &mut crate::encoding::reader::Reader<'_>) -> Result<u8, DecodeError> {
        let b0 = r.read_u8()?;
        if b0 >> 4 != self as u8 {
            return Err(DecodeError::InvalidValue);
        }
        Ok(b0 & 0x0F)
    }
}
