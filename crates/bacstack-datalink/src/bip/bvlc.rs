//! BACnet Virtual Link Control framing for BACnet/IP.
//!
//! Every datagram starts with `0x81, function, length_be16`, where `length`
//! covers the whole datagram. Forwarded-NPDU frames insert the originating
//! IPv4 address and port between the header and the NPDU.

use bacstack_core::encoding::{reader::Reader, writer::Writer};
use bacstack_core::{DecodeError, EncodeError};
use std::net::{Ipv4Addr, SocketAddrV4};

pub const BVLC_TYPE_BIP: u8 = 0x81;
pub const BVLC_HEADER_LEN: usize = 4;
pub const FORWARDED_HEADER_LEN: usize = 10;

/// Virtual link functions this client handles. Foreign-device registration
/// and table management are not among them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BvlcFunction {
    Result = 0x00,
    ForwardedNpdu = 0x04,
    DistributeBroadcastToNetwork = 0x09,
    OriginalUnicastNpdu = 0x0A,
    OriginalBroadcastNpdu = 0x0B,
}

impl BvlcFunction {
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Result),
            0x04 => Some(Self::ForwardedNpdu),
            0x09 => Some(Self::DistributeBroadcastToNetwork),
            0x0A => Some(Self::OriginalUnicastNpdu),
            0x0B => Some(Self::OriginalBroadcastNpdu),
            _ => None,
        }
    }

    pub const fn to_u8(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BvlcHeader {
    pub function: BvlcFunction,
    pub length: u16,
}

impl BvlcHeader {
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        w.write_u8(BVLC_TYPE_BIP)?;
        w.write_u8(self.function.to_u8())?;
        w.write_be_u16(self.length)
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        if r.read_u8()? != BVLC_TYPE_BIP {
            return Err(DecodeError::InvalidValue);
        }
        let function = BvlcFunction::from_u8(r.read_u8()?).ok_or(DecodeError::Unsupported)?;
        let length = r.read_be_u16()?;
        if usize::from(length) < BVLC_HEADER_LEN {
            return Err(DecodeError::InvalidLength);
        }
        Ok(Self { function, length })
    }

    /// Writes the header into the first four octets of a finished frame,
    /// using the frame's length.
    pub fn patch(frame: &mut [u8], function: BvlcFunction) -> Result<(), EncodeError> {
        if frame.len() < BVLC_HEADER_LEN {
            return Err(EncodeError::BufferTooSmall);
        }
        let length = u16::try_from(frame.len()).map_err(|_| EncodeError::InvalidLength)?;
        let mut w = Writer::new(&mut frame[..BVLC_HEADER_LEN]);
        Self { function, length }.encode(&mut w)
    }
}

/// A validated datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BvlcFrame<'a> {
    pub function: BvlcFunction,
    /// Originating station of a Forwarded-NPDU.
    pub origin: Option<SocketAddrV4>,
    /// NPDU for the NPDU-carrying functions; the raw remainder otherwise.
    pub payload: &'a [u8],
}

impl<'a> BvlcFrame<'a> {
    /// Validates the type octet and that the declared length equals the
    /// datagram length.
    pub fn decode(datagram: &'a [u8]) -> Result<Self, DecodeError> {
        let mut r = Reader::new(datagram);
        let header = BvlcHeader::decode(&mut r)?;
        if usize::from(header.length) != datagram.len() {
            return Err(DecodeError::InvalidLength);
        }

        let origin = if header.function == BvlcFunction::ForwardedNpdu {
            let [a, b, c, d] = r.read_array()?;
            let port = r.read_be_u16()?;
            Some(SocketAddrV4::new(Ipv4Addr::new(a, b, c, d), port))
        } else {
            None
        };

        Ok(Self {
            function: header.function,
            origin,
            payload: r.rest(),
        })
    }

    /// Whether the payload is an NPDU the network layer should see.
    pub fn carries_npdu(&self) -> bool {
        matches!(
            self.function,
            BvlcFunction::OriginalUnicastNpdu
                | BvlcFunction::OriginalBroadcastNpdu
                | BvlcFunction::ForwardedNpdu
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{BvlcFrame, BvlcFunction, BvlcHeader, BVLC_TYPE_BIP};
    use bacstack_core::{DecodeError, EncodeError};
    use std::net::{Ipv4Addr, SocketAddrV4};

    #[test]
    fn patch_fills_reserved_header() {
        let mut frame = [0u8, 0, 0, 0, 0x01, 0x00, 0x10, 0x08];
        BvlcHeader::patch(&mut frame, BvlcFunction::OriginalBroadcastNpdu).unwrap();
        assert_eq!(&frame[..4], &[BVLC_TYPE_BIP, 0x0B, 0x00, 0x08]);

        let decoded = BvlcFrame::decode(&frame).unwrap();
        assert_eq!(decoded.function, BvlcFunction::OriginalBroadcastNpdu);
        assert_eq!(decoded.origin, None);
        assert_eq!(decoded.payload, &[0x01, 0x00, 0x10, 0x08]);
        assert!(decoded.carries_npdu());
    }

    #[test]
    fn patch_needs_room_for_the_header() {
        let mut frame = [0u8; 3];
        assert_eq!(
            BvlcHeader::patch(&mut frame, BvlcFunction::OriginalUnicastNpdu).unwrap_err(),
            EncodeError::BufferTooSmall
        );
    }

    #[test]
    fn wrong_type_octet_is_rejected() {
        let frame = [0x82, 0x0A, 0x00, 0x06, 0x01, 0x00];
        assert_eq!(BvlcFrame::decode(&frame).unwrap_err(), DecodeError::InvalidValue);
    }

    #[test]
    fn declared_length_must_match_datagram() {
        let short = [BVLC_TYPE_BIP, 0x0A, 0x00, 0x08, 0x01, 0x00];
        assert_eq!(BvlcFrame::decode(&short).unwrap_err(), DecodeError::InvalidLength);
        let long = [BVLC_TYPE_BIP, 0x0A, 0x00, 0x04, 0x01, 0x00];
        assert_eq!(BvlcFrame::decode(&long).unwrap_err(), DecodeError::InvalidLength);
    }

    #[test]
    fn forwarded_npdu_surfaces_origin() {
        let frame = [
            BVLC_TYPE_BIP,
            0x04,
            0x00,
            0x0E,
            10,
            1,
            2,
            3,
            0xBA,
            0xC0,
            0x01,
            0x00,
            0x10,
            0x08,
        ];
        let decoded = BvlcFrame::decode(&frame).unwrap();
        assert_eq!(
            decoded.origin,
            Some(SocketAddrV4::new(Ipv4Addr::new(10, 1, 2, 3), 47808))
        );
        assert_eq!(decoded.payload, &[0x01, 0x00, 0x10, 0x08]);
    }

    #[test]
    fn truncated_forwarded_header_is_rejected() {
        let frame = [BVLC_TYPE_BIP, 0x04, 0x00, 0x07, 10, 1, 2];
        assert_eq!(BvlcFrame::decode(&frame).unwrap_err(), DecodeError::UnexpectedEof);
    }

    #[test]
    fn result_is_accepted_but_carries_no_npdu() {
        let frame = [BVLC_TYPE_BIP, 0x00, 0x00, 0x06, 0x00, 0x30];
        let decoded = BvlcFrame::decode(&frame).unwrap();
        assert_eq!(decoded.function, BvlcFunction::Result);
        assert!(!decoded.carries_npdu());
    }

    #[test]
    fn foreign_device_functions_are_unsupported() {
        let register = [BVLC_TYPE_BIP, 0x05, 0x00, 0x06, 0x00, 0x3C];
        assert_eq!(BvlcFrame::decode(&register).unwrap_err(), DecodeError::Unsupported);
    }
}
