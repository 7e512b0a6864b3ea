use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque node identity, assigned once at cluster formation.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Liveness verdict for a tracked node.
///
/// Variant order is "badness" order (`Alive < Suspect < Dead`), so the
/// derived `Ord` can break ties between conflicting observations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    Alive,
    Suspect,
    Dead,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Alive => write!(f, "alive"),
            Status::Suspect => write!(f, "suspect"),
            Status::Dead => write!(f, "dead"),
        }
    }
}

/// One observer's record for one tracked node.
///
/// `last_updated_millis` is stamped from the observing node's own clock at
/// the moment the record was last accepted. It is never copied from a
/// remote node's clock.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeState {
    pub heartbeat: u64,
    pub status: Status,
    pub last_updated_millis: u64,
}

/// Read-only snapshot of a node's membership table.
pub type MembershipView = HashMap<NodeId, NodeState>;
