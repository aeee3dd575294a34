use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One measured reachability outcome for a host.
///
/// This is the canonical record shared by both sides of the wire: the
/// backend serves a bare JSON array of these from `GET /ping-results`,
/// and the agent posts a bare JSON array to the same path. `rtt` travels
/// in nanoseconds and is only converted to milliseconds for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingResult {
    #[serde(default)]
    pub host_name: String,
    pub ip: String,
    pub time: DateTime<Utc>,
    pub rtt: u64,
    pub success: bool,
}

impl PingResult {
    /// Successful probe, stamped with the current time.
    pub fn pong(host_name: &str, ip: &str, rtt: Duration) -> Self {
        Self {
            host_name: host_name.to_string(),
            ip: ip.to_string(),
            time: Utc::now(),
            rtt: rtt.as_nanos() as u64,
            success: true,
        }
    }

    /// Probe that got no reply in time.
    pub fn timeout(host_name: &str, ip: &str) -> Self {
        Self {
            host_name: host_name.to_string(),
            ip: ip.to_string(),
            time: Utc::now(),
            rtt: 0,
            success: false,
        }
    }
}

/// Render a nanosecond round-trip time the way the table shows it:
/// milliseconds with exactly three fractional digits.
pub fn format_rtt_ms(rtt_ns: u64) -> String {
    format!("{:.3} ms", rtt_ns as f64 / 1e6)
}

/// Render a result timestamp for the table, UTC wall time.
pub fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}
