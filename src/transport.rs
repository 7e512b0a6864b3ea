//! Gossip delivery between nodes.
//!
//! The protocol only requires that a snapshot reach a peer's inbound merge
//! entry point; how it gets there is the embedding system's choice. This
//! crate ships the in-process transport used by the driver and the test
//! suites, where peers are addressed as shared references rather than
//! sockets.

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::cluster::messages::GossipSnapshot;
use crate::cluster::node::GossipNode;
use crate::cluster::state::NodeId;
use crate::error::{Result, RumorError};

/// Delivery seam for one gossip round's snapshot.
///
/// Implementations must not block the sender beyond handing the snapshot
/// to the receiver's merge path.
#[async_trait]
pub trait GossipTransport: Send + Sync {
    async fn send(&self, to: &NodeId, snapshot: GossipSnapshot) -> Result<()>;
}

/// In-process peer registry delivering snapshots by direct method call.
///
/// Holds weak references so registration never keeps a node alive; the
/// driver owns the strong `Arc`s. A stopped node stays registered and
/// keeps accepting inbound merges, which is exactly how a "failed" node is
/// simulated without removing it from the roster.
#[derive(Default)]
pub struct InProcessNetwork {
    nodes: DashMap<NodeId, Weak<GossipNode>>,
}

impl InProcessNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, node: &Arc<GossipNode>) {
        self.nodes.insert(node.id().clone(), Arc::downgrade(node));
    }
}

#[async_trait]
impl GossipTransport for InProcessNetwork {
    async fn send(&self, to: &NodeId, snapshot: GossipSnapshot) -> Result<()> {
        let target = self
            .nodes
            .get(to)
            .and_then(|entry| entry.value().upgrade())
            .ok_or_else(|| RumorError::Transport(format!("no reachable peer {}", to)))?;
        target.receive_gossip(&snapshot);
        Ok(())
    }
}
