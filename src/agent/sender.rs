use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::api::ApiClient;
use crate::model::PingResult;

/// Batches measured results and posts them to the backend.
///
/// A batch is flushed when it reaches `capacity`, or `flush_timeout`
/// after its first result arrived, whichever comes first. A failed post
/// is logged and the batch dropped; the backend keeps history, so one
/// lost batch costs one interval of data, not the run.
pub struct ReportSender {
    tx: mpsc::Sender<PingResult>,
    task: JoinHandle<()>,
}

impl ReportSender {
    pub fn spawn(api: ApiClient, capacity: usize, flush_timeout: Duration) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity * 2);
        let task = tokio::spawn(run_batch_loop(api, rx, capacity, flush_timeout));
        Self { tx, task }
    }

    /// Producer handle for the probe workers (they use `blocking_send`).
    pub fn handle(&self) -> mpsc::Sender<PingResult> {
        self.tx.clone()
    }

    /// Drop the producer side, flush whatever is buffered and wait for
    /// the loop to finish.
    pub async fn close(self) {
        drop(self.tx);
        let _ = self.task.await;
    }
}

async fn run_batch_loop(
    api: ApiClient,
    mut rx: mpsc::Receiver<PingResult>,
    capacity: usize,
    flush_timeout: Duration,
) {
    let mut batch = Vec::with_capacity(capacity);
    loop {
        // the flush clock starts at the first result of each batch
        let Some(first) = rx.recv().await else { break };
        batch.push(first);
        let flush_at = Instant::now() + flush_timeout;

        let mut closed = false;
        while batch.len() < capacity {
            tokio::select! {
                _ = tokio::time::sleep_until(flush_at) => break,
                next = rx.recv() => match next {
                    Some(result) => batch.push(result),
                    None => {
                        closed = true;
                        break;
                    }
                }
            }
        }

        send_batch(&api, &batch).await;
        batch.clear();

        if closed {
            break;
        }
    }
}

async fn send_batch(api: &ApiClient, batch: &[PingResult]) {
    log::debug!("reporting {} result(s)", batch.len());
    if let Err(err) = api.push_ping_results(batch).await {
        log::error!("can't report {} result(s): {}", batch.len(), err);
    }
}
