//! The node actor: one authoritative liveness view per cluster member,
//! kept loosely synchronized with peers via randomized pairwise gossip.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::{Result, RumorError};
use crate::settings::Settings;
use crate::transport::GossipTransport;

use super::messages::GossipSnapshot;
use super::roster::{ClusterRoster, PeerSelector, UniformSelector};
use super::state::{MembershipView, NodeId};
use super::table::MembershipTable;

/// A cluster member running the failure-detection protocol.
///
/// Each periodic cycle runs three behaviors back to back: a heartbeat tick
/// for its own entry, one gossip exchange with a random peer, and a
/// staleness sweep over the table. Inbound gossip from other nodes' cycles
/// can land at any point, including mid-cycle; the table absorbs those
/// merges per-entry without coordination.
pub struct GossipNode {
    id: NodeId,
    roster: Arc<ClusterRoster>,
    settings: Settings,
    table: MembershipTable,
    clock: Arc<dyn Clock>,
    transport: Arc<dyn GossipTransport>,
    selector: Box<dyn PeerSelector>,

    // Both are written only from the owning node's cycle; peers only read.
    heartbeat: AtomicU64,
    last_tick_millis: AtomicU64,
}

impl std::fmt::Debug for GossipNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GossipNode")
            .field("id", &self.id)
            .field("roster_size", &self.roster.len())
            .field("heartbeat", &self.heartbeat.load(Ordering::Relaxed))
            .finish()
    }
}

impl GossipNode {
    pub fn new(
        id: NodeId,
        roster: Arc<ClusterRoster>,
        settings: Settings,
        clock: Arc<dyn Clock>,
        transport: Arc<dyn GossipTransport>,
    ) -> Result<Arc<Self>> {
        Self::with_selector(
            id,
            roster,
            settings,
            clock,
            transport,
            Box::new(UniformSelector::new()),
        )
    }

    /// Construct with an explicit peer selector (seeded selectors make
    /// simulations deterministic).
    pub fn with_selector(
        id: NodeId,
        roster: Arc<ClusterRoster>,
        settings: Settings,
        clock: Arc<dyn Clock>,
        transport: Arc<dyn GossipTransport>,
        selector: Box<dyn PeerSelector>,
    ) -> Result<Arc<Self>> {
        settings.validate()?;
        if !roster.contains(&id) {
            return Err(RumorError::Config(format!(
                "node {} is not in the cluster roster",
                id
            )));
        }
        Ok(Arc::new(Self {
            table: MembershipTable::new(id.clone()),
            id,
            roster,
            settings,
            clock,
            transport,
            selector,
            heartbeat: AtomicU64::new(0),
            last_tick_millis: AtomicU64::new(0),
        }))
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Current own-heartbeat counter.
    pub fn heartbeat(&self) -> u64 {
        self.heartbeat.load(Ordering::Acquire)
    }

    /// Advance the node's own heartbeat and refresh its own table entry.
    ///
    /// Must only be invoked from the owning node's cycle. Fails only on
    /// the clock-regression precondition: a wall clock running backwards
    /// would make every staleness comparison meaningless, so the node
    /// refuses to keep ticking and leaves recovery to the driver.
    pub fn tick(&self) -> Result<u64> {
        let now = self.clock.now_millis();
        let last = self.last_tick_millis.load(Ordering::Acquire);
        if now < last {
            return Err(RumorError::ClockRegression {
                node: self.id.clone(),
                last_millis: last,
                observed_millis: now,
            });
        }
        self.last_tick_millis.store(now, Ordering::Release);

        let beat = self.heartbeat.fetch_add(1, Ordering::AcqRel) + 1;
        self.table.record_own(beat, now);
        Ok(beat)
    }

    /// Send a snapshot of the full table to one randomly chosen peer.
    ///
    /// A roster without any other member makes this a no-op. The snapshot
    /// is copied out before sending; no table lock is held during delivery.
    pub async fn gossip_round(&self) -> Result<()> {
        let Some(peer) = self.selector.select(&self.roster, &self.id) else {
            return Ok(());
        };
        let snapshot = self.table.snapshot();
        debug!(
            "[{}] gossiping {} entries to {}",
            self.id,
            snapshot.entries.len(),
            peer
        );
        self.transport.send(&peer, snapshot).await
    }

    /// Inbound gossip entry point, safe under concurrent invocation from
    /// any number of peer cycles.
    ///
    /// Applies the anti-entropy merge per entry. The node's own entry is
    /// never touched: only its own tick may update it, and the local copy
    /// always carries the highest own heartbeat anyway.
    pub fn receive_gossip(&self, snapshot: &GossipSnapshot) {
        let now = self.clock.now_millis();
        let mut accepted = 0usize;
        for (id, digest) in &snapshot.entries {
            if *id == self.id {
                continue;
            }
            if self.table.merge_entry(id, *digest, now) {
                accepted += 1;
            }
        }
        debug!(
            "[{}] merged gossip from {}: accepted {}/{} entries",
            self.id,
            snapshot.from,
            accepted,
            snapshot.entries.len()
        );
    }

    /// Apply the staleness state machine to every tracked peer entry.
    pub fn sweep(&self) {
        self.table.sweep(
            self.clock.now_millis(),
            self.settings.suspect_timeout_ms,
            self.settings.dead_timeout_ms,
        );
    }

    /// Read-only snapshot of the membership table for observers.
    pub fn view(&self) -> MembershipView {
        self.table.view()
    }

    /// Point-in-time gossip payload, as sent by [`Self::gossip_round`].
    /// Drivers that deliver gossip themselves pair this with
    /// [`Self::receive_gossip`] on the target node.
    pub fn snapshot(&self) -> GossipSnapshot {
        self.table.snapshot()
    }

    async fn run_cycle(&self) -> Result<()> {
        self.tick()?;
        if let Err(err) = self.gossip_round().await {
            // Unreachable peers are routine (a stopped node stays in the
            // roster); the next round picks a fresh target.
            debug!("[{}] gossip round failed: {}", self.id, err);
        }
        self.sweep();
        Ok(())
    }

    /// Launch the periodic tick/gossip/sweep cycle on the current runtime.
    ///
    /// The loop sleeps between cycles and checks the shutdown signal in the
    /// same `select!`, so cancellation never interrupts a partial cycle.
    /// Stopping the loop does not unregister the node from its transport:
    /// peers keep merging into its table, it merely stops advancing its own
    /// heartbeat and stops originating gossip.
    pub fn start(self: &Arc<Self>, interval: Duration) -> NodeHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let node = Arc::clone(self);

        let join = tokio::spawn(async move {
            info!(
                "[{}] starting cycle every {}ms",
                node.id,
                interval.as_millis()
            );
            let mut cycle = time::interval(interval);
            cycle.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("[{}] shutdown signal received, exiting cycle", node.id);
                        break;
                    }
                    _ = cycle.tick() => {
                        if let Err(err) = node.run_cycle().await {
                            warn!("[{}] cycle aborted: {}", node.id, err);
                            return Err(err);
                        }
                    }
                }
            }
            Ok(())
        });

        NodeHandle {
            id: self.id.clone(),
            shutdown: shutdown_tx,
            join,
        }
    }
}

/// Lifecycle handle for a started node, held by the external driver.
pub struct NodeHandle {
    id: NodeId,
    shutdown: mpsc::Sender<()>,
    join: JoinHandle<Result<()>>,
}

impl NodeHandle {
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Signal the cycle to stop and wait for it to exit.
    ///
    /// Surfaces a `ClockRegression` if the cycle already aborted on one.
    pub async fn stop(self) -> Result<()> {
        // The loop may already have exited (clock regression); a closed
        // channel is fine either way.
        let _ = self.shutdown.send(()).await;
        self.join.await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::cluster::messages::EntryDigest;
    use crate::cluster::state::Status;
    use crate::clock::ManualClock;
    use crate::transport::InProcessNetwork;

    fn test_roster(ids: &[&str]) -> Arc<ClusterRoster> {
        Arc::new(ClusterRoster::new(
            ids.iter().map(|id| NodeId::from(*id)).collect(),
        ))
    }

    fn test_node(id: &str, roster: &Arc<ClusterRoster>, clock: Arc<ManualClock>) -> Arc<GossipNode> {
        GossipNode::with_selector(
            NodeId::from(id),
            roster.clone(),
            Settings::default(),
            clock,
            Arc::new(InProcessNetwork::new()),
            Box::new(UniformSelector::seeded(1)),
        )
        .unwrap()
    }

    fn snapshot_from(from: &str, entries: &[(&str, u64, Status)]) -> GossipSnapshot {
        let mut map = HashMap::new();
        for (id, heartbeat, status) in entries {
            map.insert(
                NodeId::from(*id),
                EntryDigest {
                    heartbeat: *heartbeat,
                    status: *status,
                },
            );
        }
        GossipSnapshot {
            from: NodeId::from(from),
            entries: map,
        }
    }

    #[test]
    fn test_new_rejects_id_missing_from_roster() {
        let roster = test_roster(&["a", "b"]);
        let result = GossipNode::new(
            NodeId::from("stranger"),
            roster,
            Settings::default(),
            Arc::new(ManualClock::new(0)),
            Arc::new(InProcessNetwork::new()),
        );
        assert!(matches!(result, Err(RumorError::Config(_))));
    }

    #[test]
    fn test_tick_advances_own_entry() {
        let roster = test_roster(&["a", "b"]);
        let clock = Arc::new(ManualClock::new(1000));
        let node = test_node("a", &roster, clock.clone());

        assert!(node.view().is_empty());
        assert_eq!(node.tick().unwrap(), 1);
        clock.advance(1000);
        assert_eq!(node.tick().unwrap(), 2);

        let own = node.view()[&NodeId::from("a")].clone();
        assert_eq!(own.heartbeat, 2);
        assert_eq!(own.status, Status::Alive);
        assert_eq!(own.last_updated_millis, 2000);
    }

    #[test]
    fn test_tick_rejects_clock_regression() {
        let roster = test_roster(&["a", "b"]);
        let clock = Arc::new(ManualClock::new(5000));
        let node = test_node("a", &roster, clock.clone());

        node.tick().unwrap();
        clock.set(4000);
        assert!(matches!(
            node.tick(),
            Err(RumorError::ClockRegression { .. })
        ));
        // The counter must not have advanced past the failed tick.
        assert_eq!(node.heartbeat(), 1);
    }

    #[test]
    fn test_receive_gossip_never_touches_own_entry() {
        let roster = test_roster(&["a", "b"]);
        let clock = Arc::new(ManualClock::new(1000));
        let node = test_node("a", &roster, clock);

        node.tick().unwrap();
        node.receive_gossip(&snapshot_from(
            "b",
            &[("a", 99, Status::Dead), ("b", 3, Status::Alive)],
        ));

        let view = node.view();
        assert_eq!(view[&NodeId::from("a")].heartbeat, 1);
        assert_eq!(view[&NodeId::from("a")].status, Status::Alive);
        assert_eq!(view[&NodeId::from("b")].heartbeat, 3);
    }

    #[test]
    fn test_sweep_then_self_heal() {
        let roster = test_roster(&["a", "b"]);
        let clock = Arc::new(ManualClock::new(0));
        let node = test_node("a", &roster, clock.clone());

        node.receive_gossip(&snapshot_from("b", &[("b", 1, Status::Alive)]));
        clock.set(7000);
        node.sweep();
        assert_eq!(node.view()[&NodeId::from("b")].status, Status::Dead);

        // The peer comes back with a strictly fresher heartbeat.
        node.receive_gossip(&snapshot_from("b", &[("b", 2, Status::Alive)]));
        assert_eq!(node.view()[&NodeId::from("b")].status, Status::Alive);
    }

    #[tokio::test]
    async fn test_gossip_round_with_lonely_roster_is_noop() {
        let roster = test_roster(&["a"]);
        let clock = Arc::new(ManualClock::new(0));
        let node = GossipNode::with_selector(
            NodeId::from("a"),
            roster,
            Settings::default(),
            clock,
            Arc::new(InProcessNetwork::new()),
            Box::new(UniformSelector::seeded(1)),
        )
        .unwrap();

        node.tick().unwrap();
        assert!(node.gossip_round().await.is_ok());
    }
}
