use std::sync::mpsc::{SyncSender, TrySendError};
use std::time::Duration;

use tokio::sync::oneshot;

use crate::api::ApiClient;
use crate::snapshot::SnapshotStore;

/// Drives the fetch cycle for watch mode: one fetch immediately on
/// startup, then one per interval, until the shutdown signal fires or the
/// UI goes away. The poller is the only writer of the snapshot store.
///
/// Fetches are strictly sequential (each one is awaited before the next
/// tick is taken), so a slow response can delay the next poll but two
/// polls can never be in flight at once and snapshots cannot regress to
/// an older response.
pub struct Poller {
    api: ApiClient,
    store: SnapshotStore,
    interval: Duration,
}

impl Poller {
    pub fn new(api: ApiClient, store: SnapshotStore, interval: Duration) -> Self {
        // the interval timer panics on a zero period
        let interval = interval.max(Duration::from_secs(1));
        Self {
            api,
            store,
            interval,
        }
    }

    /// Poll until told to stop. Every cycle ends with a nudge on the
    /// wakeup channel so the UI redraws promptly; a full channel just
    /// means a redraw is already pending.
    pub async fn run(self, wakeup_tx: SyncSender<()>, mut shutdown_rx: oneshot::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.poll_once().await;
                    if let Err(TrySendError::Disconnected(_)) = wakeup_tx.try_send(()) {
                        break;
                    }
                }
                _ = &mut shutdown_rx => {
                    break;
                }
            }
        }
    }

    async fn poll_once(&self) {
        match self.api.fetch_ping_results().await {
            Ok(results) => self.store.publish(results),
            Err(err) => {
                log::debug!("poll failed: {err}");
                self.store.record_error(err.to_string());
            }
        }
    }
}
