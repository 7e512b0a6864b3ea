use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use tokio::time::{self, MissedTickBehavior};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rumor::cli;
use rumor::clock::{Clock, SystemClock};
use rumor::cluster::{ClusterRoster, GossipNode, NodeHandle, NodeId};
use rumor::transport::InProcessNetwork;

/// Simulation driver: builds a fixed roster, runs every node's cycle,
/// optionally stops one node mid-run to simulate a failure, and logs each
/// node's membership view once per interval.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rumor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse args and env vars
    let args = cli::Cli::parse();
    if args.cluster_size == 0 {
        anyhow::bail!("cluster size must be at least 1");
    }
    if let Some(idx) = args.fail_node {
        if idx >= args.cluster_size {
            anyhow::bail!(
                "fail-node index {} out of range for cluster of {}",
                idx,
                args.cluster_size
            );
        }
    }
    let cluster_size = args.cluster_size;
    let print_json = args.json;
    let fail_node = args.fail_node;
    let fail_after = Duration::from_millis(args.fail_after_ms);
    let run_for = Duration::from_millis(args.run_for_ms);
    let settings = args.into_settings();
    settings.validate()?;

    // Cluster formation: fixed identities, shared roster, in-process transport
    let ids: Vec<NodeId> = (0..cluster_size)
        .map(|i| NodeId::new(format!("node-{}", i)))
        .collect();
    let roster = Arc::new(ClusterRoster::new(ids.clone()));
    let network = Arc::new(InProcessNetwork::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let mut nodes: Vec<Arc<GossipNode>> = Vec::with_capacity(ids.len());
    for id in &ids {
        let node = GossipNode::new(
            id.clone(),
            roster.clone(),
            settings.clone(),
            clock.clone(),
            network.clone(),
        )?;
        network.register(&node);
        nodes.push(node);
    }

    info!(
        "Starting {} nodes, gossip every {}ms (suspect {}ms, dead {}ms)",
        nodes.len(),
        settings.gossip_interval_ms,
        settings.suspect_timeout_ms,
        settings.dead_timeout_ms
    );
    let mut handles: Vec<Option<NodeHandle>> = nodes
        .iter()
        .map(|node| Some(node.start(settings.gossip_interval())))
        .collect();

    // Observe once per interval until the run is over
    let started = Instant::now();
    let mut observe = time::interval(settings.gossip_interval());
    observe.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        observe.tick().await;
        let elapsed = started.elapsed();

        if let Some(idx) = fail_node {
            if elapsed >= fail_after {
                if let Some(handle) = handles[idx].take() {
                    info!("Simulating failure of {}", handle.id());
                    handle.stop().await.context("stopping failed node")?;
                }
            }
        }

        for node in &nodes {
            log_view(node, print_json)?;
        }

        if elapsed >= run_for {
            break;
        }
    }

    for handle in handles.into_iter().flatten() {
        handle.stop().await?;
    }
    info!("Simulation finished after {:?}", started.elapsed());

    Ok(())
}

fn log_view(node: &Arc<GossipNode>, json: bool) -> anyhow::Result<()> {
    let view = node.view();
    if json {
        info!("[{}] view: {}", node.id(), serde_json::to_string(&view)?);
    } else {
        let mut entries: Vec<_> = view.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let rendered: Vec<String> = entries
            .iter()
            .map(|(id, state)| format!("{}={}({})", id, state.status, state.heartbeat))
            .collect();
        info!("[{}] view: {}", node.id(), rendered.join(" "));
    }
    Ok(())
}
