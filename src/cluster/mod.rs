//! Gossip-Based Failure Detection
//! This module contains the core of the protocol: the per-node membership
//! table with its anti-entropy merge rule, the staleness state machine
//! that downgrades quiet peers to suspect and dead, and the node actor
//! that runs the periodic tick/gossip/sweep cycle.
pub mod messages;
pub mod node;
pub mod roster;
pub mod state;
pub mod table;

pub use messages::{EntryDigest, GossipSnapshot};
pub use node::{GossipNode, NodeHandle};
pub use roster::{ClusterRoster, PeerSelector, UniformSelector};
pub use state::{MembershipView, NodeId, NodeState, Status};
pub use table::MembershipTable;
