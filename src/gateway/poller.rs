//! Reconciliation poller: periodically re-queries venue-authoritative state
//! (positions, account, realtime quotes for subscribed symbols) and emits
//! corrective events. This bounds local staleness to one interval for
//! venues that do not guarantee push delivery.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::domain::EventSink;
use crate::venue::VenueApi;

use super::{poll_account, poll_positions, refresh_quotes, SubscriptionSet};

#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Interval between reconciliation cycles
    pub interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
        }
    }
}

/// Handle to a running poller. `shutdown` signals the task and awaits its
/// termination, so callers can order teardown deterministically relative to
/// the venue session.
pub struct PollerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            warn!("poller task join failed: {e}");
        }
    }
}

pub(crate) fn spawn(
    venue: Arc<dyn VenueApi>,
    events: EventSink,
    subscribed: SubscriptionSet,
    account_id: String,
    config: PollerConfig,
) -> PollerHandle {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; connect already ran the initial
        // snapshots, so skip it.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown_rx.changed() => {
                    // A dropped handle counts as shutdown too
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                    continue;
                }
            }

            // Each step is individually fallible; a transient venue failure
            // must not end the loop or the session.
            if let Err(e) = poll_positions(&venue, &events).await {
                warn!("position poll failed: {e}");
            }
            if let Err(e) = poll_account(&venue, &events, &account_id).await {
                warn!("account poll failed: {e}");
            }
            if let Err(e) = refresh_quotes(&venue, &events, &subscribed).await {
                warn!("quote refresh failed: {e}");
            }
        }

        debug!("reconciliation poller stopped");
    });

    PollerHandle { shutdown_tx, task }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_interval_is_three_seconds() {
        assert_eq!(PollerConfig::default().interval, Duration::from_secs(3));
    }
}
