//! rumor: gossip-based failure detection for node clusters.
//!
//! Every node keeps its own view of cluster liveness in a concurrent
//! membership table and exchanges snapshots of it with one random peer per
//! gossip interval. Liveness is inferred from staleness: an entry that no
//! fresher heartbeat has refreshed within the suspect/dead timeouts is
//! downgraded by a periodic sweep. The merge rule keeps only strictly
//! higher heartbeats, which makes it commutative and idempotent and gives
//! all reachable nodes eventually convergent views.

pub mod cli;
pub mod clock;
pub mod cluster;
pub mod error;
pub mod settings;
pub mod transport;

pub use cluster::{
    ClusterRoster, GossipNode, GossipSnapshot, MembershipView, NodeHandle, NodeId, NodeState,
    PeerSelector, Status, UniformSelector,
};
pub use error::{Result, RumorError};
pub use settings::Settings;
