//! Gossip payload types.
//!
//! A gossip round ships a point-in-time copy of the sender's full table.
//! All payload types carry serde traits so the snapshot serializes
//! faithfully as `{node_id -> (heartbeat, status)}` whatever transport the
//! embedding system chooses; the in-process transport passes them by value.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::state::{NodeId, NodeState, Status};

/// Wire form of a single table entry.
///
/// Deliberately omits `last_updated_millis`: receivers stamp accepted
/// entries with their own clock, so local timestamps never travel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDigest {
    pub heartbeat: u64,
    pub status: Status,
}

impl From<&NodeState> for EntryDigest {
    fn from(state: &NodeState) -> Self {
        Self {
            heartbeat: state.heartbeat,
            status: state.status,
        }
    }
}

/// A point-in-time copy of one node's membership table, sent to a single
/// randomly chosen peer per gossip round.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GossipSnapshot {
    pub from: NodeId,
    pub entries: HashMap<NodeId, EntryDigest>,
}
