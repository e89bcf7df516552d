//! Timing configuration for job stream sessions.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::{CoreError, CoreResult};

/// Default interval between snapshot polls while the channel is down.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3_000);

/// Default delay before re-opening a failed channel.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(5_000);

/// Configuration for a job stream session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Interval between snapshot polls once the session has degraded.
    pub poll_interval: Duration,
    /// Delay between a channel failure and the single reconnection attempt.
    pub reconnect_delay: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}

impl StreamConfig {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Reject zero durations; a zero poll interval would spin.
    pub fn validate(&self) -> CoreResult<()> {
        if self.poll_interval.is_zero() {
            return Err(CoreError::config("poll_interval must be non-zero"));
        }
        if self.reconnect_delay.is_zero() {
            return Err(CoreError::config("reconnect_delay must be non-zero"));
        }
        Ok(())
    }
}
