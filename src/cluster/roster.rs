//! Static cluster roster and gossip-target selection.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::state::NodeId;

/// Immutable list of every identity in the cluster, fixed at formation.
///
/// The roster exists only to pick gossip targets; liveness tracking lives
/// in each node's membership table. It is shared by all nodes of a cluster
/// rather than held as global state.
#[derive(Clone, Debug)]
pub struct ClusterRoster {
    peers: Vec<NodeId>,
}

impl ClusterRoster {
    pub fn new(peers: Vec<NodeId>) -> Self {
        Self { peers }
    }

    pub fn peers(&self) -> &[NodeId] {
        &self.peers
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.peers.iter().any(|peer| peer == id)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

/// Picks the single peer contacted by one gossip round (fan-out is 1).
pub trait PeerSelector: Send + Sync {
    /// Return a peer from the roster, excluding `local`. `None` means this
    /// round is a no-op (empty roster, or a roster containing only the
    /// local node).
    fn select(&self, roster: &ClusterRoster, local: &NodeId) -> Option<NodeId>;
}

/// Uniform random selection over the roster, excluding the local node.
pub struct UniformSelector {
    rng: Mutex<StdRng>,
}

impl UniformSelector {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Fixed-seed selector for deterministic simulations.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for UniformSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl PeerSelector for UniformSelector {
    fn select(&self, roster: &ClusterRoster, local: &NodeId) -> Option<NodeId> {
        let candidates: Vec<&NodeId> = roster.peers().iter().filter(|id| *id != local).collect();
        if candidates.is_empty() {
            return None;
        }
        // A poisoned lock still holds a usable generator.
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let idx = rng.gen_range(0..candidates.len());
        Some(candidates[idx].clone())
    }
}
