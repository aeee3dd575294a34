use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::model::PingResult;

/// The complete displayed state: rows of the last successful poll plus
/// the bookkeeping the status line needs. Rows are never merged; each
/// successful poll replaces the whole vector (collection order is render
/// order, rows have no identity of their own).
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub results: Vec<PingResult>,
    /// Monotonic count of successful polls. 0 means never fetched.
    pub seq: u64,
    pub fetched_at: Option<DateTime<Utc>>,
    /// Message of the most recent failed poll, cleared by the next success.
    pub last_error: Option<String>,
}

impl Snapshot {
    pub fn has_data(&self) -> bool {
        self.seq > 0
    }

    /// True when the table is showing rows older than the latest poll
    /// attempt, i.e. we have data but the last poll failed.
    pub fn is_stale(&self) -> bool {
        self.has_data() && self.last_error.is_some()
    }
}

/// Shared store for the current snapshot, written by the poller and read
/// by the UI. Replacement is all-or-nothing: the row vector is swapped
/// under one lock, so a reader can never observe rows from two different
/// polls mixed together.
#[derive(Clone, Default)]
pub struct SnapshotStore {
    inner: Arc<Mutex<Snapshot>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the rows of a successful poll, wholesale.
    pub fn publish(&self, results: Vec<PingResult>) {
        let mut snap = self.inner.lock().unwrap();
        snap.results = results;
        snap.seq += 1;
        snap.fetched_at = Some(Utc::now());
        snap.last_error = None;
    }

    /// Keep the rows we have, remember why the latest poll failed.
    pub fn record_error(&self, message: String) {
        let mut snap = self.inner.lock().unwrap();
        snap.last_error = Some(message);
    }

    /// Clone of the current state, for rendering.
    pub fn current(&self) -> Snapshot {
        self.inner.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(host_name: &str, ip: &str) -> PingResult {
        PingResult {
            host_name: host_name.to_string(),
            ip: ip.to_string(),
            time: "2024-01-01T12:00:00Z".parse().unwrap(),
            rtt: 1_000_000,
            success: true,
        }
    }

    #[test]
    fn starts_without_data() {
        let snap = SnapshotStore::new().current();
        assert!(!snap.has_data());
        assert!(!snap.is_stale());
        assert_eq!(snap.seq, 0);
        assert!(snap.results.is_empty());
        assert!(snap.fetched_at.is_none());
    }

    #[test]
    fn publish_replaces_the_whole_collection() {
        let store = SnapshotStore::new();
        store.publish(vec![row("db1", "10.0.0.5"), row("db2", "10.0.0.6")]);
        store.publish(vec![row("web1", "10.0.1.1")]);

        let snap = store.current();
        assert_eq!(snap.seq, 2);
        assert_eq!(snap.results.len(), 1);
        assert_eq!(snap.results[0].host_name, "web1");
    }

    #[test]
    fn failed_poll_keeps_last_good_rows() {
        let store = SnapshotStore::new();
        store.publish(vec![row("db1", "10.0.0.5")]);
        store.record_error("connection refused".to_string());

        let snap = store.current();
        assert_eq!(snap.results.len(), 1);
        assert_eq!(snap.seq, 1);
        assert!(snap.is_stale());
        assert_eq!(snap.last_error.as_deref(), Some("connection refused"));

        store.publish(vec![row("db1", "10.0.0.5")]);
        assert!(store.current().last_error.is_none());
        assert!(!store.current().is_stale());
    }

    // Two in-flight polls resolving in any order must never leave the
    // store showing a mixture of both row sets.
    #[test]
    fn replacement_is_atomic_across_overlapping_publishers() {
        let store = SnapshotStore::new();
        let alpha: Vec<PingResult> =
            (0..3).map(|i| row("alpha", &format!("10.0.0.{i}"))).collect();
        let beta: Vec<PingResult> =
            (0..5).map(|i| row("beta", &format!("10.1.0.{i}"))).collect();

        let mut writers = Vec::new();
        for rows in [alpha, beta] {
            let store = store.clone();
            writers.push(std::thread::spawn(move || {
                for _ in 0..200 {
                    store.publish(rows.clone());
                }
            }));
        }

        let reader = {
            let store = store.clone();
            std::thread::spawn(move || {
                for _ in 0..500 {
                    let snap = store.current();
                    if snap.results.is_empty() {
                        continue;
                    }
                    let host = snap.results[0].host_name.clone();
                    assert!(snap.results.iter().all(|r| r.host_name == host));
                    match host.as_str() {
                        "alpha" => assert_eq!(snap.results.len(), 3),
                        "beta" => assert_eq!(snap.results.len(), 5),
                        other => panic!("mixed snapshot, unexpected host {other}"),
                    }
                }
            })
        };

        for writer in writers {
            writer.join().unwrap();
        }
        reader.join().unwrap();
    }
}
