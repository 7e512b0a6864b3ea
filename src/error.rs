use std::fmt;

use crate::cluster::state::NodeId;

/// Main error type for the rumor failure-detection library
#[derive(Debug)]
pub enum RumorError {
    /// Local clock observed earlier than the previously recorded tick time.
    /// Elapsed-time math against the membership table would be meaningless,
    /// so the affected node must stop ticking and let the driver decide
    /// whether to abort or resynchronize.
    ClockRegression {
        node: NodeId,
        last_millis: u64,
        observed_millis: u64,
    },

    /// Configuration errors (bad intervals, unknown local id, ...)
    Config(String),

    /// Gossip delivery errors
    Transport(String),

    /// Node task lifecycle errors (panicked or already-stopped loops)
    Lifecycle(String),
}

impl fmt::Display for RumorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RumorError::ClockRegression {
                node,
                last_millis,
                observed_millis,
            } => write!(
                f,
                "Clock regression on {}: observed {}ms after recording {}ms",
                node, observed_millis, last_millis
            ),
            RumorError::Config(msg) => write!(f, "Configuration error: {}", msg),
            RumorError::Transport(msg) => write!(f, "Transport error: {}", msg),
            RumorError::Lifecycle(msg) => write!(f, "Lifecycle error: {}", msg),
        }
    }
}

impl std::error::Error for RumorError {}

// Convenient type alias for Results using our error type
pub type Result<T> = std::result::Result<T, RumorError>;

impl From<tokio::task::JoinError> for RumorError {
    fn from(err: tokio::task::JoinError) -> Self {
        RumorError::Lifecycle(format!("node task failed to join: {}", err))
    }
}
