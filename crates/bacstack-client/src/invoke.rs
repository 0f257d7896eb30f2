//! Invoke-ID allocation and the table of outstanding confirmed requests.

use crate::engine::Reply;
use crate::ClientError;
use bacstack_datalink::DataLinkAddress;
use std::collections::HashMap;
use tokio::sync::oneshot;
use tokio::time::Instant;

/// Hands out invoke IDs 1, 2, ..., 255, then wraps back to 1. Zero is never
/// produced.
#[derive(Debug, Default)]
pub struct InvokeIdAllocator {
    last: u8,
}

impl InvokeIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> u8 {
        self.last = if self.last == u8::MAX { 1 } else { self.last + 1 };
        self.last
    }
}

pub(crate) type Completion = oneshot::Sender<Result<Reply, ClientError>>;

#[derive(Debug)]
pub(crate) struct PendingInvocation {
    pub address: DataLinkAddress,
    pub service_choice: u8,
    pub deadline: Instant,
    completion: Completion,
}

impl PendingInvocation {
    pub fn new(
        address: DataLinkAddress,
        service_choice: u8,
        deadline: Instant,
        completion: Completion,
    ) -> Self {
        Self {
            address,
            service_choice,
            deadline,
            completion,
        }
    }

    fn finish(self, result: Result<Reply, ClientError>) {
        // The caller may have stopped waiting.
        let _ = self.completion.send(result);
    }
}

/// Outstanding invocations keyed by invoke ID. Every entry leaves the table
/// exactly once: through [`complete`](Self::complete) or
/// [`expire`](Self::expire).
#[derive(Debug, Default)]
pub(crate) struct PendingTable {
    entries: HashMap<u8, PendingInvocation>,
}

impl PendingTable {
    pub fn contains(&self, invoke_id: u8) -> bool {
        self.entries.contains_key(&invoke_id)
    }

    pub fn get(&self, invoke_id: u8) -> Option<&PendingInvocation> {
        self.entries.get(&invoke_id)
    }

    pub fn insert(&mut self, invoke_id: u8, pending: PendingInvocation) -> Result<(), ClientError> {
        if self.contains(invoke_id) {
            return Err(ClientError::InvokeIdInUse { invoke_id });
        }
        self.entries.insert(invoke_id, pending);
        Ok(())
    }

    /// Completes the invocation if it is still registered. Returns whether
    /// anything was completed.
    pub fn complete(&mut self, invoke_id: u8, result: Result<Reply, ClientError>) -> bool {
        match self.entries.remove(&invoke_id) {
            Some(pending) => {
                pending.finish(result);
                true
            }
            None => false,
        }
    }

    /// Fails every invocation whose deadline has passed and returns the IDs
    /// that expired.
    pub fn expire(&mut self, now: Instant) -> Vec<u8> {
        let overdue: Vec<u8> = self
            .entries
            .iter()
            .filter(|(_, p)| p.deadline <= now)
            .map(|(id, _)| *id)
            .collect();
        for invoke_id in &overdue {
            log::debug!("invoke id {invoke_id} timed out");
            self.complete(*invoke_id, Err(ClientError::Timeout { invoke_id: *invoke_id }));
        }
        overdue
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.values().map(|p| p.deadline).min()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{InvokeIdAllocator, PendingInvocation, PendingTable};
    use crate::engine::Reply;
    use crate::ClientError;
    use bacstack_datalink::DataLinkAddress;
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use std::time::Duration;
    use tokio::sync::oneshot;
    use tokio::time::Instant;

    fn peer() -> DataLinkAddress {
        DataLinkAddress::Ip(SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)), 47808))
    }

    #[test]
    fn allocator_skips_zero_on_wrap() {
        let mut ids = InvokeIdAllocator::new();
        let first: Vec<u8> = (0..3).map(|_| ids.next()).collect();
        assert_eq!(first, vec![1, 2, 3]);
        for _ in 3..255 {
            ids.next();
        }
        assert_eq!(ids.next(), 1);
        assert_eq!(ids.next(), 2);
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let mut table = PendingTable::default();
        let deadline = Instant::now() + Duration::from_secs(1);
        let (tx, mut rx) = oneshot::channel();
        table
            .insert(7, PendingInvocation::new(peer(), 0x0C, deadline, tx))
            .unwrap();

        let (tx2, _rx2) = oneshot::channel();
        let err = table
            .insert(7, PendingInvocation::new(peer(), 0x0F, deadline, tx2))
            .unwrap_err();
        assert!(matches!(err, ClientError::InvokeIdInUse { invoke_id: 7 }));
        assert_eq!(table.get(7).map(|p| p.service_choice), Some(0x0C));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn completion_fires_once() {
        let mut table = PendingTable::default();
        let (tx, rx) = oneshot::channel();
        table
            .insert(
                3,
                PendingInvocation::new(peer(), 0x0F, Instant::now() + Duration::from_secs(1), tx),
            )
            .unwrap();

        assert!(table.complete(3, Ok(Reply::Simple { service_choice: 0x0F })));
        assert!(!table.complete(3, Err(ClientError::UnsupportedResponse)));
        assert!(matches!(rx.await.unwrap(), Ok(Reply::Simple { service_choice: 0x0F })));
    }

    #[tokio::test]
    async fn expire_only_removes_overdue_entries() {
        let mut table = PendingTable::default();
        let now = Instant::now();
        let (tx_late, rx_late) = oneshot::channel();
        let (tx_fresh, _rx_fresh) = oneshot::channel();
        table
            .insert(1, PendingInvocation::new(peer(), 0x0C, now, tx_late))
            .unwrap();
        table
            .insert(
                2,
                PendingInvocation::new(peer(), 0x0C, now + Duration::from_secs(5), tx_fresh),
            )
            .unwrap();

        assert_eq!(table.next_deadline(), Some(now));
        assert_eq!(table.expire(now), vec![1]);
        assert_eq!(table.len(), 1);
        assert!(matches!(
            rx_late.await.unwrap(),
            Err(ClientError::Timeout { invoke_id: 1 })
        ));
        assert_eq!(table.next_deadline(), Some(now + Duration::from_secs(5)));
    }
}
