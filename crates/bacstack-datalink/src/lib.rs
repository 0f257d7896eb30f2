//! BACnet/IP data link for bacstack.
//!
//! [`bip::bvlc`] frames and validates virtual link datagrams;
//! [`BacnetIpTransport`] moves them over UDP through the [`DataLink`] trait.

pub mod address;
pub mod bip;
pub mod traits;

pub use address::DataLinkAddress;
pub use bip::bvlc::{BvlcFrame, BvlcFunction, BvlcHeader};
pub use bip::transport::{BacnetIpTransport, MAX_BIP_FRAME_LEN};
pub use traits::{DataLink, DataLinkError};
