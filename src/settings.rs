//! Rumor application settings
use std::time::Duration;

use crate::error::{Result, RumorError};

pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const STANDARD_GOSSIP_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_GOSSIP_INTERVAL_MS: &str = "1000";
pub const STANDARD_SUSPECT_TIMEOUT_MS: u64 = 3000;
pub const DEFAULT_SUSPECT_TIMEOUT_MS: &str = "3000";
pub const STANDARD_DEAD_TIMEOUT_MS: u64 = 6000;
pub const DEFAULT_DEAD_TIMEOUT_MS: &str = "6000";

/// Protocol timing configuration shared by every node of a cluster.
///
/// One periodic cycle per node runs tick, gossip, and sweep back to back
/// every `gossip_interval_ms`. The two timeouts are measured against the
/// `last_updated` stamp of each table entry; an entry older than
/// `suspect_timeout_ms` is downgraded to Suspect, older than
/// `dead_timeout_ms` to Dead.
#[derive(Clone, Debug)]
pub struct Settings {
    pub gossip_interval_ms: u64,
    pub suspect_timeout_ms: u64,
    pub dead_timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gossip_interval_ms: STANDARD_GOSSIP_INTERVAL_MS,
            suspect_timeout_ms: STANDARD_SUSPECT_TIMEOUT_MS,
            dead_timeout_ms: STANDARD_DEAD_TIMEOUT_MS,
        }
    }
}

impl Settings {
    pub fn gossip_interval(&self) -> Duration {
        Duration::from_millis(self.gossip_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.gossip_interval_ms == 0 {
            return Err(RumorError::Config(
                "gossip interval must be non-zero".to_string(),
            ));
        }
        if self.suspect_timeout_ms >= self.dead_timeout_ms {
            return Err(RumorError::Config(format!(
                "suspect timeout ({}ms) must be shorter than dead timeout ({}ms)",
                self.suspect_timeout_ms, self.dead_timeout_ms
            )));
        }
        Ok(())
    }
}
