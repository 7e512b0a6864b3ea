//! CLI for the cluster simulation driver
//!
use crate::settings;

pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Clone, Debug, clap::Parser)]
pub struct Cli {
    // Number of nodes in the simulated cluster
    #[clap(
        long,
        default_value = "5",
        env("RUMOR_CLUSTER_SIZE"),
        help = "Number of nodes in the simulated cluster"
    )]
    pub cluster_size: usize,

    // Interval between tick/gossip/sweep cycles
    #[clap(
        long,
        default_value = settings::DEFAULT_GOSSIP_INTERVAL_MS,
        env("RUMOR_GOSSIP_INTERVAL_MS"),
        help = "Milliseconds between gossip cycles"
    )]
    pub gossip_interval_ms: u64,

    // Staleness threshold before a quiet peer is suspected
    #[clap(
        long,
        default_value = settings::DEFAULT_SUSPECT_TIMEOUT_MS,
        env("RUMOR_SUSPECT_TIMEOUT_MS"),
        help = "Milliseconds of silence before a peer is marked suspect"
    )]
    pub suspect_timeout_ms: u64,

    // Staleness threshold before a suspected peer is declared dead
    #[clap(
        long,
        default_value = settings::DEFAULT_DEAD_TIMEOUT_MS,
        env("RUMOR_DEAD_TIMEOUT_MS"),
        help = "Milliseconds of silence before a peer is marked dead"
    )]
    pub dead_timeout_ms: u64,

    // Index of the node whose failure is simulated
    #[clap(
        long,
        env("RUMOR_FAIL_NODE"),
        help = "Index of the node to stop mid-run (simulated failure)"
    )]
    pub fail_node: Option<usize>,

    #[clap(
        long,
        default_value = "5000",
        env("RUMOR_FAIL_AFTER_MS"),
        help = "Milliseconds to wait before stopping the failed node"
    )]
    pub fail_after_ms: u64,

    #[clap(
        long,
        default_value = "15000",
        env("RUMOR_RUN_FOR_MS"),
        help = "Total simulation duration in milliseconds"
    )]
    pub run_for_ms: u64,

    #[clap(long, help = "Print membership views as JSON instead of plain text")]
    pub json: bool,
}

impl Cli {
    pub fn into_settings(self) -> settings::Settings {
        settings::Settings {
            gossip_interval_ms: self.gossip_interval_ms,
            suspect_timeout_ms: self.suspect_timeout_ms,
            dead_timeout_ms: self.dead_timeout_ms,
        }
    }
}
