//! Network layer header.
//!
//! `version(1) control [DNET DLEN DADR] [SNET SLEN SADR] [hop] [message type [param]]`

use crate::encoding::{reader::Reader, writer::Writer};
use crate::{DecodeError, EncodeError};

pub const NPDU_VERSION: u8 = 0x01;

pub const CONTROL_NETWORK_MESSAGE: u8 = 0x80;
pub const CONTROL_DESTINATION: u8 = 0x20;
pub const CONTROL_SOURCE: u8 = 0x08;
pub const CONTROL_EXPECTING_REPLY: u8 = 0x04;
const CONTROL_PRIORITY: u8 = 0x03;

/// Network message type that carries an optional 2-octet network number.
pub const WHO_IS_ROUTER_TO_NETWORK: u8 = 0x00;

/// Longest MAC address carried in an NPDU address.
pub const MAX_MAC_LEN: usize = 8;

/// Network number plus MAC address of a remote station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NpduAddress {
    pub network: u16,
    mac: [u8; MAX_MAC_LEN],
    mac_len: u8,
}

impl NpduAddress {
    pub fn new(network: u16, mac: &[u8]) -> Result<Self, EncodeError> {
        if mac.len() > MAX_MAC_LEN {
            return Err(EncodeError::InvalidLength);
        }
        let mut buf = [0u8; MAX_MAC_LEN];
        buf[..mac.len()].copy_from_slice(mac);
        Ok(Self {
            network,
            mac: buf,
            mac_len: mac.len() as u8,
        })
    }

    /// Every station on every network (DNET 0xFFFF, no MAC).
    pub const fn global_broadcast() -> Self {
        Self {
            network: 0xFFFF,
            mac: [0; MAX_MAC_LEN],
            mac_len: 0,
        }
    }

    pub fn mac(&self) -> &[u8] {
        &self.mac[..self.mac_len as usize]
    }

    fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        w.write_be_u16(self.network)?;
        w.write_u8(self.mac_len)?;
        w.write_all(self.mac())
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let network = r.read_be_u16()?;
        let len = r.read_u8()? as usize;
        if len > MAX_MAC_LEN {
            return Err(DecodeError::InvalidLength);
        }
        let mac = r.read_exact(len)?;
        Self::new(network, mac).map_err(|_| DecodeError::InvalidLength)
    }
}

/// Router control message carried instead of an APDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkMessage {
    pub message_type: u8,
    /// Vendor id for proprietary types, network number for
    /// Who-Is-Router-To-Network.
    pub parameter: Option<u16>,
}

impl NetworkMessage {
    fn has_parameter(message_type: u8) -> bool {
        message_type >= 0x80 || message_type == WHO_IS_ROUTER_TO_NETWORK
    }
}

/// Decoded or to-be-encoded network header. The control octet is derived
/// from which fields are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Npdu {
    pub expecting_reply: bool,
    pub priority: u8,
    pub destination: Option<NpduAddress>,
    pub source: Option<NpduAddress>,
    pub hop_count: u8,
    pub network_message: Option<NetworkMessage>,
}

impl Npdu {
    /// Header for a local frame with no routing information.
    pub const fn local(expecting_reply: bool) -> Self {
        Self {
            expecting_reply,
            priority: 0,
            destination: None,
            source: None,
            hop_count: 0,
            network_message: None,
        }
    }

    /// Header routed to `destination` with the maximum hop count.
    pub const fn routed(destination: NpduAddress, expecting_reply: bool) -> Self {
        Self {
            expecting_reply,
            priority: 0,
            destination: Some(destination),
            source: None,
            hop_count: 255,
            network_message: None,
        }
    }

    pub fn control(&self) -> u8 {
        let mut control = self.priority & CONTROL_PRIORITY;
        if self.network_message.is_some() {
            control |= CONTROL_NETWORK_MESSAGE;
        }
        if self.destination.is_some() {
            control |= CONTROL_DESTINATION;
        }
        if self.source.is_some() {
            control |= CONTROL_SOURCE;
        }
        if self.expecting_reply {
            control |= CONTROL_EXPECTING_REPLY;
        }
        control
    }

    pub fn is_network_message(&self) -> bool {
        self.network_message.is_some()
    }

    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        w.write_u8(NPDU_VERSION)?;
        w.write_u8(self.control())?;
        if let Some(dest) = &self.destination {
            dest.encode(w)?;
        }
        if let Some(src) = &self.source {
            if src.mac_len == 0 {
                return Err(EncodeError::InvalidLength);
            }
            src.encode(w)?;
        }
        if self.destination.is_some() {
            w.write_u8(self.hop_count)?;
        }
        if let Some(msg) = self.network_message {
            w.write_u8(msg.message_type)?;
            if NetworkMessage::has_parameter(msg.message_type) {
                w.write_be_u16(msg.parameter.unwrap_or(0))?;
            }
        }
        Ok(())
    }

    /// Decodes the header, leaving `r` at the first APDU octet.
    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        if r.read_u8()? != NPDU_VERSION {
            return Err(DecodeError::InvalidValue);
        }
        let control = r.read_u8()?;

        let destination = if control & CONTROL_DESTINATION != 0 {
            Some(NpduAddress::decode(r)?)
        } else {
            None
        };
        let source = if control & CONTROL_SOURCE != 0 {
            let src = NpduAddress::decode(r)?;
            if src.mac_len == 0 {
                return Err(DecodeError::InvalidLength);
            }
            Some(src)
        } else {
            None
        };
        let hop_count = if destination.is_some() { r.read_u8()? } else { 0 };

        let network_message = if control & CONTROL_NETWORK_MESSAGE != 0 {
            let message_type = r.read_u8()?;
            let parameter = if NetworkMessage::has_parameter(message_type) {
                Some(r.read_be_u16()?)
            } else {
                None
            };
            Some(NetworkMessage {
                message_type,
                parameter,
            })
        } else {
            None
        };

        Ok(Self {
            expecting_reply: control & CONTROL_EXPECTING_REPLY != 0,
            priority: control & CONTROL_PRIORITY,
            destination,
            source,
            hop_count,
            network_message,
        })
    }
}
