//! start/stop semantics of the periodic node cycle, driven on tokio's
//! paused test clock so sleeps resolve instantly and deterministically.

use std::sync::Arc;
use std::time::Duration;

use rumor::clock::{Clock, ManualClock, SystemClock};
use rumor::cluster::{ClusterRoster, GossipNode, NodeId, Status};
use rumor::transport::InProcessNetwork;
use rumor::{RumorError, Settings};

fn quiet_settings() -> Settings {
    // Generous timeouts so short runs never trip the sweep.
    Settings {
        gossip_interval_ms: 50,
        suspect_timeout_ms: 60_000,
        dead_timeout_ms: 120_000,
    }
}

fn build_running_cluster(
    size: usize,
    settings: &Settings,
    clock: Arc<dyn Clock>,
) -> (Vec<Arc<GossipNode>>, Arc<InProcessNetwork>) {
    let ids: Vec<NodeId> = (0..size)
        .map(|i| NodeId::new(format!("node-{}", i)))
        .collect();
    let roster = Arc::new(ClusterRoster::new(ids.clone()));
    let network = Arc::new(InProcessNetwork::new());
    let nodes: Vec<Arc<GossipNode>> = ids
        .iter()
        .map(|id| {
            let node = GossipNode::new(
                id.clone(),
                roster.clone(),
                settings.clone(),
                clock.clone(),
                network.clone(),
            )
            .expect("node should build");
            network.register(&node);
            node
        })
        .collect();
    (nodes, network)
}

#[tokio::test(start_paused = true)]
async fn test_running_cluster_discovers_every_member() {
    let settings = quiet_settings();
    let (nodes, _network) = build_running_cluster(3, &settings, Arc::new(SystemClock));

    let handles: Vec<_> = nodes
        .iter()
        .map(|node| node.start(settings.gossip_interval()))
        .collect();

    tokio::time::sleep(Duration::from_millis(1200)).await;

    for node in &nodes {
        let view = node.view();
        assert_eq!(view.len(), 3, "{} is missing members", node.id());
        for state in view.values() {
            assert_eq!(state.status, Status::Alive);
        }
    }

    for handle in handles {
        handle.stop().await.expect("clean shutdown");
    }
}

#[tokio::test(start_paused = true)]
async fn test_stopped_node_stops_ticking_but_keeps_merging() {
    let settings = quiet_settings();
    let (nodes, _network) = build_running_cluster(2, &settings, Arc::new(SystemClock));
    let stopped = nodes[0].clone();
    let survivor = nodes[1].clone();

    let stopped_handle = stopped.start(settings.gossip_interval());
    let survivor_handle = survivor.start(settings.gossip_interval());
    tokio::time::sleep(Duration::from_millis(400)).await;

    stopped_handle.stop().await.expect("clean shutdown");
    let frozen_heartbeat = stopped.heartbeat();
    let survivor_heartbeat_before = stopped.view()[survivor.id()].heartbeat;

    tokio::time::sleep(Duration::from_millis(400)).await;

    // Its own counter froze with the loop...
    assert_eq!(stopped.heartbeat(), frozen_heartbeat);
    // ...but the survivor's gossip still lands in its table.
    let survivor_heartbeat_after = stopped.view()[survivor.id()].heartbeat;
    assert!(
        survivor_heartbeat_after > survivor_heartbeat_before,
        "stopped node no longer accepts merges ({} -> {})",
        survivor_heartbeat_before,
        survivor_heartbeat_after
    );
    // And the survivor sees the stopped node's heartbeat frozen too.
    assert_eq!(survivor.view()[stopped.id()].heartbeat, frozen_heartbeat);

    survivor_handle.stop().await.expect("clean shutdown");
}

#[tokio::test(start_paused = true)]
async fn test_clock_regression_aborts_the_cycle() {
    let settings = quiet_settings();
    let clock = Arc::new(ManualClock::new(10_000));
    let (nodes, _network) = build_running_cluster(2, &settings, clock.clone());

    let handle = nodes[0].start(Duration::from_millis(10));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(nodes[0].heartbeat() > 0);

    // Wall clock jumps backwards: the next tick must refuse and abort.
    clock.set(1_000);
    tokio::time::sleep(Duration::from_millis(100)).await;

    let result = handle.stop().await;
    assert!(matches!(result, Err(RumorError::ClockRegression { .. })));
}
