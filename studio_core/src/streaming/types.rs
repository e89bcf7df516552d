//! Observable state of a job stream session.

use serde::{Deserialize, Serialize};

/// Link state of a session.
///
/// `Connecting -> Live -> Degraded -> Connecting -> ...`, and any state
/// moves to `Stopped` on `stop()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    /// A channel is being opened.
    Connecting,
    /// The channel is open and delivering frames.
    Live,
    /// The channel is down; snapshots come from polling.
    Degraded,
    /// No session.
    #[default]
    Stopped,
}

impl LinkState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkState::Connecting => "connecting",
            LinkState::Live => "live",
            LinkState::Degraded => "degraded",
            LinkState::Stopped => "stopped",
        }
    }

    /// True while a session is running, whatever the channel's health.
    pub fn is_active(&self) -> bool {
        !matches!(self, LinkState::Stopped)
    }
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
