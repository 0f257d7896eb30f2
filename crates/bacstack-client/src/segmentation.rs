//! Reassembly of segmented complex acks and segmented confirmed requests.
//!
//! Each assembly is keyed by peer, invoke ID and PDU kind. Segments must
//! arrive in order; a gap is answered with a negative segment ack naming the
//! last accepted segment and the assembly is left as it was. The finished
//! buffer carries a plain header so it can be dispatched like any
//! unsegmented APDU.
//!
//! A complex-ack assembly lives as long as the request that owns it. A
//! confirmed-request assembly has no owner, so it carries its own deadline,
//! pushed back on every accepted segment, and is swept by
//! [`SegmentTable::expire_requests`].

use bacstack_core::apdu::{SegmentAck, SegmentInfo};
use bacstack_datalink::DataLinkAddress;
use std::collections::HashMap;
use tokio::time::Instant;

/// Largest reassembled APDU accepted from a peer.
pub const MAX_REASSEMBLY_LEN: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum SegmentKind {
    /// A server's segmented response to one of our requests.
    ComplexAck,
    /// A segmented request a device sent to us, e.g. a confirmed notification.
    ConfirmedRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SegmentKey {
    address: DataLinkAddress,
    invoke_id: u8,
    kind: SegmentKind,
}

#[derive(Debug)]
struct SegmentAssembly {
    last_sequence: u8,
    window_size: u8,
    deadline: Instant,
    buffer: Vec<u8>,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SegmentOutcome {
    /// Stored; `ack` is set when the window boundary was reached.
    Accepted { ack: Option<SegmentAck> },
    /// Not the expected sequence number; nothing was stored.
    OutOfOrder { nak: SegmentAck },
    /// Final segment stored. `apdu` is the whole message.
    Complete { apdu: Vec<u8>, ack: SegmentAck },
    /// A later segment with no assembly to join.
    Orphaned,
    /// The message outgrew [`MAX_REASSEMBLY_LEN`]; the assembly is gone.
    Overflow,
}

#[derive(Debug, Default)]
pub(crate) struct SegmentTable {
    assemblies: HashMap<SegmentKey, SegmentAssembly>,
}

impl SegmentTable {
    /// Feeds one segment. `header` is the unsegmented form of the segment's
    /// APDU header and is only used for segment 0. `deadline` replaces the
    /// assembly's deadline when the segment is stored.
    #[allow(clippy::too_many_arguments)]
    pub fn accept(
        &mut self,
        address: DataLinkAddress,
        kind: SegmentKind,
        invoke_id: u8,
        header: &[u8],
        segment: SegmentInfo,
        body: &[u8],
        deadline: Instant,
    ) -> SegmentOutcome {
        let key = SegmentKey {
            address,
            invoke_id,
            kind,
        };
        let sequence = segment.sequence_number;
        let wraps = self
            .assemblies
            .get(&key)
            .is_some_and(|a| a.last_sequence == u8::MAX);
        let fresh = sequence == 0 && !wraps;

        if fresh {
            let mut buffer = Vec::with_capacity(header.len() + body.len());
            buffer.extend_from_slice(header);
            self.assemblies.insert(
                key,
                SegmentAssembly {
                    last_sequence: 0,
                    window_size: segment.window_size,
                    deadline,
                    buffer,
                },
            );
        }

        let Some(assembly) = self.assemblies.get_mut(&key) else {
            return SegmentOutcome::Orphaned;
        };

        if !fresh && sequence != assembly.last_sequence.wrapping_add(1) {
            log::debug!(
                "segment {sequence} from {address} out of order, expected {}",
                assembly.last_sequence.wrapping_add(1)
            );
            return SegmentOutcome::OutOfOrder {
                nak: segment_ack(&key, true, assembly.last_sequence, assembly.window_size),
            };
        }

        if assembly.buffer.len() + body.len() > MAX_REASSEMBLY_LEN {
            log::warn!("reassembly from {address} invoke {invoke_id} exceeded {MAX_REASSEMBLY_LEN} bytes");
            self.assemblies.remove(&key);
            return SegmentOutcome::Overflow;
        }

        assembly.buffer.extend_from_slice(body);
        assembly.last_sequence = sequence;
        assembly.deadline = deadline;
        let ack = segment_ack(&key, false, sequence, assembly.window_size);

        if !segment.more_follows {
            let apdu = self
                .assemblies
                .remove(&key)
                .map(|a| a.buffer)
                .unwrap_or_default();
            return SegmentOutcome::Complete { apdu, ack };
        }

        let window = assembly.window_size.max(1);
        SegmentOutcome::Accepted {
            ack: (sequence % window == 0).then_some(ack),
        }
    }

    /// Drops any complex-ack assembly that belongs to `invoke_id`.
    pub fn abandon(&mut self, invoke_id: u8) {
        self.assemblies
            .retain(|key, _| !(key.kind == SegmentKind::ComplexAck && key.invoke_id == invoke_id));
    }

    /// Drops confirmed-request assemblies whose deadline is at or before
    /// `now`. Returns how many were dropped.
    pub fn expire_requests(&mut self, now: Instant) -> usize {
        let before = self.assemblies.len();
        self.assemblies.retain(|key, assembly| {
            let stale = key.kind == SegmentKind::ConfirmedRequest && assembly.deadline <= now;
            if stale {
                log::debug!(
                    "abandoning segmented request {} from {}",
                    key.invoke_id,
                    key.address
                );
            }
            !stale
        });
        before - self.assemblies.len()
    }

    /// Earliest deadline among confirmed-request assemblies.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.assemblies
            .iter()
            .filter(|(key, _)| key.kind == SegmentKind::ConfirmedRequest)
            .map(|(_, assembly)| assembly.deadline)
            .min()
    }

    pub fn len(&self) -> usize {
        self.assemblies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assemblies.is_empty()
    }
}

fn segment_ack(key: &SegmentKey, negative: bool, sequence_number: u8, window: u8) -> SegmentAck {
    SegmentAck {
        negative,
        sent_by_server: key.kind == SegmentKind::ConfirmedRequest,
        invoke_id: key.invoke_id,
        sequence_number,
        actual_window_size: window.max(1),
    }
}
