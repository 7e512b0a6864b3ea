//! Concurrent membership table with per-entry atomic anti-entropy merge.

use std::collections::HashMap;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{info, trace, warn};

use super::messages::{EntryDigest, GossipSnapshot};
use super::state::{MembershipView, NodeId, NodeState, Status};

/// One node's authoritative view of cluster liveness.
///
/// Mutated from exactly two directions: the owner's tick/sweep cycle and
/// inbound merges arriving concurrently from arbitrary peer cycles. Every
/// write is a read-compare-replace under the `DashMap` entry guard, so
/// concurrent merges targeting the same id never lose the higher
/// heartbeat. There is no table-wide lock; sweeps never serialize gossip
/// receipt.
///
/// Entries are never deleted. A `Dead` entry stays in the table and may
/// return to `Alive` if a strictly higher heartbeat arrives.
pub struct MembershipTable {
    owner: NodeId,
    entries: DashMap<NodeId, NodeState>,
}

impl MembershipTable {
    pub fn new(owner: NodeId) -> Self {
        Self {
            owner,
            entries: DashMap::new(),
        }
    }

    /// Unconditionally write the owner's own entry as `(heartbeat, Alive, now)`.
    /// Only the owner's heartbeat tick calls this.
    pub fn record_own(&self, heartbeat: u64, now_millis: u64) {
        self.entries.insert(
            self.owner.clone(),
            NodeState {
                heartbeat,
                status: Status::Alive,
                last_updated_millis: now_millis,
            },
        );
    }

    /// Anti-entropy merge rule for a single gossiped entry.
    ///
    /// Accepts iff the id is unknown locally or the incoming heartbeat is
    /// strictly greater than the stored one; accepted entries are stamped
    /// with the receiver's clock. Lower or equal heartbeats are discarded
    /// unchanged, which makes the rule commutative and idempotent.
    ///
    /// Returns whether the incoming entry was accepted.
    pub fn merge_entry(&self, id: &NodeId, incoming: EntryDigest, now_millis: u64) -> bool {
        match self.entries.entry(id.clone()) {
            Entry::Occupied(mut current) => {
                let local = current.get();
                if incoming.heartbeat <= local.heartbeat {
                    return false;
                }
                if local.status != Status::Alive && incoming.status == Status::Alive {
                    info!(
                        "[{}] {} recovered: {} -> alive at heartbeat {}",
                        self.owner, id, local.status, incoming.heartbeat
                    );
                }
                current.insert(NodeState {
                    heartbeat: incoming.heartbeat,
                    status: incoming.status,
                    last_updated_millis: now_millis,
                });
                true
            }
            Entry::Vacant(slot) => {
                trace!(
                    "[{}] discovered {} at heartbeat {}",
                    self.owner,
                    id,
                    incoming.heartbeat
                );
                slot.insert(NodeState {
                    heartbeat: incoming.heartbeat,
                    status: incoming.status,
                    last_updated_millis: now_millis,
                });
                true
            }
        }
    }

    /// Staleness sweep over every tracked entry except the owner's own.
    ///
    /// Both transitions measure from the same `last_updated_millis`, so an
    /// entry stale beyond the dead timeout passes Alive -> Suspect -> Dead
    /// within a single sweep. The key list is snapshotted up front and each
    /// entry re-read under its guard, so merges landing mid-scan are picked
    /// up or skipped per entry, never corrupted.
    pub fn sweep(&self, now_millis: u64, suspect_timeout_ms: u64, dead_timeout_ms: u64) {
        let ids: Vec<NodeId> = self.entries.iter().map(|e| e.key().clone()).collect();
        for id in ids {
            if id == self.owner {
                continue;
            }
            if let Some(mut entry) = self.entries.get_mut(&id) {
                let elapsed = now_millis.saturating_sub(entry.last_updated_millis);
                if entry.status == Status::Alive && elapsed > suspect_timeout_ms {
                    warn!(
                        "[{}] no news from {} for {}ms, marking suspect",
                        self.owner, id, elapsed
                    );
                    entry.status = Status::Suspect;
                }
                if entry.status == Status::Suspect && elapsed > dead_timeout_ms {
                    warn!(
                        "[{}] no news from {} for {}ms, marking dead",
                        self.owner, id, elapsed
                    );
                    entry.status = Status::Dead;
                }
            }
        }
    }

    /// Point-in-time copy of the table for one gossip round.
    pub fn snapshot(&self) -> GossipSnapshot {
        let entries: HashMap<NodeId, EntryDigest> = self
            .entries
            .iter()
            .map(|e| (e.key().clone(), EntryDigest::from(e.value())))
            .collect();
        GossipSnapshot {
            from: self.owner.clone(),
            entries,
        }
    }

    /// Read-only copy for observers.
    pub fn view(&self) -> MembershipView {
        self.entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }

    pub fn get(&self, id: &NodeId) -> Option<NodeState> {
        self.entries.get(id).map(|e| e.value().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
