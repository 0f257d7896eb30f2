use crate::DataLinkAddress;
use std::future::Future;
use thiserror::Error;

/// Errors that can occur at the data-link layer.
#[derive(Debug, Error)]
pub enum DataLinkError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("frame too large")]
    FrameTooLarge,
    #[error("data link closed")]
    Closed,
}

/// Raw datagram transport underneath the BACnet/IP virtual link layer.
///
/// Frames passed in and out are complete BVLC datagrams; framing and
/// validation happen above this trait. Both futures are `Send` so a client
/// can drive the link from spawned tasks.
///
/// [`BacnetIpTransport`](crate::BacnetIpTransport) is the UDP implementation.
pub trait DataLink: Send + Sync {
    /// Sends `frame` to the given data-link `address`.
    fn send(
        &self,
        address: DataLinkAddress,
        frame: &[u8],
    ) -> impl Future<Output = Result<(), DataLinkError>> + Send;

    /// Receives a datagram into `buf`, returning `(bytes_read, source_address)`.
    fn recv(
        &self,
        buf: &mut [u8],
    ) -> impl Future<Output = Result<(usize, DataLinkAddress), DataLinkError>> + Send;
}
