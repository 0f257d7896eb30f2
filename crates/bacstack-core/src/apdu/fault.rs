use crate::apdu::pdu::FLAG_SERVER;
use crate::apdu::ApduType;
use crate::encoding::{reader::Reader, writer::Writer};
use crate::{DecodeError, EncodeError};

/// Error PDU header `[0x50, invoke_id, service]`; the error class and code
/// follow and are decoded by `services::error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorPduHeader {
    pub invoke_id: u8,
    pub service_choice: u8,
}

impl ErrorPduHeader {
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        w.write_all(&[ApduType::Error.lead(), self.invoke_id, self.service_choice])
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        ApduType::Error.expect(r)?;
        Ok(Self {
            invoke_id: r.read_u8()?,
            service_choice: r.read_u8()?,
        })
    }
}

/// `[0x60, invoke_id, reason]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectPdu {
    pub invoke_id: u8,
    pub reason: u8,
}

impl RejectPdu {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        ApduType::Reject.expect(r)?;
        Ok(Self {
            invoke_id: r.read_u8()?,
            reason: r.read_u8()?,
        })
    }
}

/// `[0x7_|server, invoke_id, reason]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbortPdu {
    pub server: bool,
    pub invoke_id: u8,
    pub reason: u8,
}

impl AbortPdu {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let flags = ApduType::Abort.expect(r)?;
        Ok(Self {
            server: flags & FLAG_SERVER != 0,
            invoke_id: r.read_u8()?,
            reason: r.read_u8()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{AbortPdu, ErrorPduHeader, RejectPdu};
    use crate::encoding::reader::Reader;

    #[test]
    fn error_header() {
        let mut r = Reader::new(&[0x50, 0x03, 0x0F, 0x91, 0x02]);
        let hdr = ErrorPduHeader::decode(&mut r).unwrap();
        assert_eq!(hdr, ErrorPduHeader { invoke_id: 3, service_choice: 0x0F });
        assert_eq!(r.remaining(), 2);
    }

    #[test]
    fn reject_and_abort() {
        let mut r = Reader::new(&[0x60, 0x05, 0x09]);
        assert_eq!(RejectPdu::decode(&mut r).unwrap(), RejectPdu { invoke_id: 5, reason: 9 });
        let mut r = Reader::new(&[0x71, 0x05, 0x04]);
        assert_eq!(
            AbortPdu::decode(&mut r).unwrap(),
            AbortPdu { server: true, invoke_id: 5, reason: 4 }
        );
    }
}
