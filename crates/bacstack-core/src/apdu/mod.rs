/// Simple ack, complex ack and segment ack.
pub mod ack;
/// Error, reject and abort PDUs.
pub mod fault;
/// PDU type and header flag bits.
pub mod pdu;
/// Confirmed-request header.
pub mod request;
/// Unconfirmed-request header.
pub mod unconfirmed;

pub use ack::{ComplexAckHeader, SegmentAck, SimpleAck, COMPLEX_ACK_HEADER_LEN};
pub use fault::{AbortPdu, ErrorPduHeader, RejectPdu};
pub use pdu::ApduType;
pub use request::{ConfirmedRequestHeader, SegmentInfo, CONFIRMED_REQUEST_HEADER_LEN};
pub use unconfirmed::UnconfirmedRequestHeader;
