//! Session configuration

use std::time::Duration;

/// Session configuration
pub struct SessionConfig;

impl SessionConfig {
    /// How often the balance poller refreshes
    pub const BALANCE_POLL_INTERVAL: Duration = Duration::from_secs(30);
}
