use crate::apdu::pdu::{FLAG_MORE_FOLLOWS, FLAG_SEGMENTED, FLAG_SEGMENTED_RESPONSE_ACCEPTED};
use crate::apdu::ApduType;
use crate::encoding::{reader::Reader, writer::Writer};
use crate::types::{MaxApdu, MaxSegments};
use crate::{DecodeError, EncodeError};

/// Position of a segment within a segmented message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentInfo {
    pub sequence_number: u8,
    pub window_size: u8,
    pub more_follows: bool,
}

/// `[0x0_|flags, max_segs<<4 | max_apdu, invoke_id, (seq, window), service]`
///
/// The sequence/window octets exist only when `segment` is `Some`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmedRequestHeader {
    pub segmented_response_accepted: bool,
    pub max_segments: u8,
    pub max_apdu: u8,
    pub invoke_id: u8,
    pub segment: Option<SegmentInfo>,
    pub service_choice: u8,
}

/// Length of a confirmed-request header without segment fields.
pub const CONFIRMED_REQUEST_HEADER_LEN: usize = 4;

impl ConfirmedRequestHeader {
    /// Header for an unsegmented request from this client: accepts segmented
    /// responses, more than 64 segments, APDUs up to 1476 octets.
    pub const fn new(invoke_id: u8, service_choice: u8) -> Self {
        Self {
            segmented_response_accepted: true,
            max_segments: MaxSegments::MoreThanSixtyFour as u8,
            max_apdu: MaxApdu::UpTo1476 as u8,
            invoke_id,
            segment: None,
            service_choice,
        }
    }

    fn flags(&self) -> u8 {
        let mut flags = 0;
        if let Some(seg) = self.segment {
            flags |= FLAG_SEGMENTED;
            if seg.more_follows {
                flags |= FLAG_MORE_FOLLOWS;
            }
        }
        if self.segmented_response_accepted {
            flags |= FLAG_SEGMENTED_RESPONSE_ACCEPTED;
        }
        flags
    }

    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        w.write_u8(ApduType::ConfirmedRequest.lead() | self.flags())?;
        w.write_u8((self.max_segments << 4) | (self.max_apdu & 0x0F))?;
        w.write_u8(self.invoke_id)?;
        if let Some(seg) = self.segment {
            w.write_u8(seg.sequence_number)?;
            w.write_u8(seg.window_size)?;
        }
        w.write_u8(self.service_choice)
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let flags = ApduType::ConfirmedRequest.expect(r)?;
        let limits = r.read_u8()?;
        let invoke_id = r.read_u8()?;
        let segment = if flags & FLAG_SEGMENTED != 0 {
            Some(SegmentInfo {
                sequence_number: r.read_u8()?,
                window_size: r.read_u8()?,
                more_follows: flags & FLAG_MORE_FOLLOWS != 0,
            })
        } else {
            None
        };
        Ok(Self {
            segmented_response_accepted: flags & FLAG_SEGMENTED_RESPONSE_ACCEPTED != 0,
            max_segments: (limits >> 4) & 0x07,
            max_apdu: limits & 0x0F,
            invoke_id,
            segment,
            service_choice: r.read_u8()?,
        })
    }

    /// The same header with the segment fields removed, as it would appear
    /// on the reassembled message.
    pub fn unsegmented_bytes(&self) -> [u8; CONFIRMED_REQUEST_HEADER_LEN] {
        let plain = Self {
            segment: None,
            ..*self
        };
        [
            ApduType::ConfirmedRequest.lead() | plain.flags(),
            (self.max_segments << 4) | (self.max_apdu & 0x0F),
            self.invoke_id,
            self.service_choice,
        ]
    }
}
