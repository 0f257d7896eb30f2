use crate::apdu::pdu::{FLAG_MORE_FOLLOWS, FLAG_NEGATIVE_ACK, FLAG_SEGMENTED, FLAG_SERVER};
use crate::apdu::{ApduType, SegmentInfo};
use crate::encoding::{reader::Reader, writer::Writer};
use crate::{DecodeError, EncodeError};

/// `[0x20, invoke_id, service]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimpleAck {
    pub invoke_id: u8,
    pub service_choice: u8,
}

impl SimpleAck {
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        w.write_u8(ApduType::SimpleAck.lead())?;
        w.write_u8(self.invoke_id)?;
        w.write_u8(self.service_choice)
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        ApduType::SimpleAck.expect(r)?;
        Ok(Self {
            invoke_id: r.read_u8()?,
            service_choice: r.read_u8()?,
        })
    }
}

/// Length of a complex-ack header without segment fields.
pub const COMPLEX_ACK_HEADER_LEN: usize = 3;

/// `[0x3_|flags, invoke_id, (seq, window), service]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplexAckHeader {
    pub invoke_id: u8,
    pub segment: Option<SegmentInfo>,
    pub service_choice: u8,
}

impl ComplexAckHeader {
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        let mut b0 = ApduType::ComplexAck.lead();
        if let Some(seg) = self.segment {
            b0 |= FLAG_SEGMENTED;
            if seg.more_follows {
                b0 |= FLAG_MORE_FOLLOWS;
            }
        }
        w.write_u8(b0)?;
        w.write_u8(self.invoke_id)?;
        if let Some(seg) = self.segment {
            w.write_u8(seg.sequence_number)?;
            w.write_u8(seg.window_size)?;
        }
        w.write_u8(self.service_choice)
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let flags = ApduType::ComplexAck.expect(r)?;
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
            invoke_id,
            segment,
            service_choice: r.read_u8()?,
        })
    }

    pub fn unsegmented_bytes(&self) -> [u8; COMPLEX_ACK_HEADER_LEN] {
        [ApduType::ComplexAck.lead(), self.invoke_id, self.service_choice]
    }
}

/// `[0x4_|flags, invoke_id, sequence_number, actual_window_size]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentAck {
    pub negative: bool,
    pub sent_by_server: bool,
    pub invoke_id: u8,
    pub sequence_number: u8,
    pub actual_window_size: u8,
}

impl SegmentAck {
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        let mut b0 = ApduType::SegmentAck.lead();
        if self.negative {
            b0 |= FLAG_NEGATIVE_ACK;
        }
        if self.sent_by_server {
            b0 |= FLAG_SERVER;
        }
        w.write_all(&[b0, self.invoke_id, self.sequence_number, self.actual_window_size])
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let flags = ApduType::SegmentAck.expect(r)?;
        let [invoke_id, sequence_number, actual_window_size] = r.read_array()?;
        Ok(Self {
            negative: flags & FLAG_NEGATIVE_ACK != 0,
            sent_by_server: flags & FLAG_SERVER != 0,
            invoke_id,
            sequence_number,
            actual_window_size,
        })
    }
}
