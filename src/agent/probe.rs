use std::net::{IpAddr, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{Context, anyhow};
use pinger::{PingOptions, ping};

use crate::model::PingResult;

// resolve a target to the single address we will probe, ipv4 unless forced
pub fn resolve_target_ip(host: &str, force_ipv6: bool) -> anyhow::Result<String> {
    let addrs: Vec<IpAddr> = (host, 80)
        .to_socket_addrs()
        .with_context(|| format!("failed to resolve host: {}", host))?
        .map(|s| s.ip())
        .collect();

    let filtered: Vec<IpAddr> = if force_ipv6 {
        addrs
            .into_iter()
            .filter(|ip| matches!(ip, IpAddr::V6(_)))
            .collect()
    } else {
        addrs
            .into_iter()
            .filter(|ip| matches!(ip, IpAddr::V4(_)))
            .collect()
    };

    filtered
        .first()
        .map(|ip| ip.to_string())
        .ok_or_else(|| anyhow!("could not resolve host: {}", host))
}

/// One OS thread per target, each running a ping stream and feeding
/// measured results into the report channel.
pub fn spawn_probe_workers(
    targets: Vec<(String, String)>,
    interval: Duration,
    running: Arc<AtomicBool>,
    report_tx: tokio::sync::mpsc::Sender<PingResult>,
) -> Vec<thread::JoinHandle<()>> {
    targets
        .into_iter()
        .map(|(host_name, ip)| {
            let running = running.clone();
            let report_tx = report_tx.clone();
            thread::spawn(move || run_probe_loop(host_name, ip, interval, running, report_tx))
        })
        .collect()
}

fn run_probe_loop(
    host_name: String,
    ip: String,
    interval: Duration,
    running: Arc<AtomicBool>,
    report_tx: tokio::sync::mpsc::Sender<PingResult>,
) {
    let options = PingOptions::new(ip.clone(), interval, None);
    let stream = match ping(options) {
        Ok(stream) => stream,
        Err(err) => {
            log::error!("host({}) ping failed, reason: ping init failed, err: {}", ip, err);
            return;
        }
    };

    while running.load(Ordering::Relaxed) {
        let result = match stream.recv() {
            Ok(pinger::PingResult::Pong(duration, _line)) => {
                PingResult::pong(&host_name, &ip, duration)
            }
            Ok(pinger::PingResult::Timeout(_)) => PingResult::timeout(&host_name, &ip),
            Ok(pinger::PingResult::PingExited(status, err)) => {
                if status.code() != Some(0) {
                    log::error!(
                        "host({}) ping failed, reason: ping exited, status: {} err: {}",
                        ip, status, err
                    );
                }
                continue;
            }
            Ok(pinger::PingResult::Unknown(msg)) => {
                log::warn!("host({}) unparsed ping output: {}", ip, msg);
                continue;
            }
            Err(err) => {
                log::error!("host({}) ping failed, reason: stream closed, err: {}", ip, err);
                break;
            }
        };

        // channel gone means the reporter shut down first
        if report_tx.blocking_send(result).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loopback_resolves_to_ipv4_by_default() {
        let ip = resolve_target_ip("localhost", false).unwrap();
        assert_eq!(ip, "127.0.0.1");
    }

    #[test]
    fn literal_addresses_pass_through() {
        let ip = resolve_target_ip("10.0.0.5", false).unwrap();
        assert_eq!(ip, "10.0.0.5");
    }

    #[test]
    fn unresolvable_host_is_a_startup_error() {
        let err = resolve_target_ip("host.invalid", false);
        assert!(err.is_err());
    }
}
