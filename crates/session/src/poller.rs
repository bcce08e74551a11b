//! Periodic balance refresh

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::SessionManager;
use crate::config::SessionConfig;

/// Periodic balance refresh.
///
/// Owns its tokio task: dropping the poller aborts it, so polling cannot
/// outlive the surface that started it. A tick that fails is ignored; the
/// next one simply tries again, and ticks while signed out are no-ops.
pub struct BalancePoller {
    handle: JoinHandle<()>,
}

impl BalancePoller {
    /// Spawn with the default interval
    pub fn spawn(manager: SessionManager) -> Self {
        Self::spawn_with_interval(manager, SessionConfig::BALANCE_POLL_INTERVAL)
    }

    /// Spawn with a custom interval
    pub fn spawn_with_interval(manager: SessionManager, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // An interval's first tick completes immediately; consume it so
            // polling starts one full period after spawn.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(err) = manager.fetch_balance().await {
                    debug!(error = %err, "periodic balance refresh failed");
                }
            }
        });
        Self { handle }
    }

    /// Whether the polling task is still running
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for BalancePoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
