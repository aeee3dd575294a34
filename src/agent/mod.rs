mod probe;
mod sender;

pub use probe::{resolve_target_ip, spawn_probe_workers};
pub use sender::ReportSender;

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::bail;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyModifiers};
use ratatui::crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tokio::signal;

use crate::api::ApiClient;

struct RawModeGuard;

impl RawModeGuard {
    fn new() -> std::io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Agent mode: ping every target on its own interval and report the
/// measurements to the backend in batches. Runs until Ctrl+C or q.
pub async fn run_agent_mode(
    targets: Vec<String>,
    url: String,
    interval: u64,
    batch_size: usize,
    flush_ms: u64,
    force_ipv6: bool,
) -> anyhow::Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let shutdown_tx = Arc::new(Mutex::new(Some(shutdown_tx)));

    let running_for_signal = running.clone();
    let shutdown_tx_for_signal = shutdown_tx.clone();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                println!("\nReceived Ctrl+C, shutting down gracefully...");
                running_for_signal.store(false, Ordering::Relaxed);
                if let Some(tx) = shutdown_tx_for_signal.lock().unwrap().take() {
                    let _ = tx.send(());
                }
            }
            Err(err) => {
                log::error!("unable to listen for shutdown signal: {}", err);
            }
        }
    });

    // Deduplicate target addresses while preserving original order
    let mut seen = HashSet::new();
    let targets: Vec<String> = targets
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect();

    if targets.is_empty() {
        bail!("no valid targets provided");
    }

    // Resolve every target up front; a bad target is a startup error
    let mut target_pairs = Vec::new();
    for target in &targets {
        let ip = resolve_target_ip(target, force_ipv6)?;
        target_pairs.push((target.clone(), ip));
    }

    let api = ApiClient::new(&url)?;

    println!("🚀 PingBoard Agent Mode Started");
    println!("┌─────────────────────────────────────────────────────────");
    println!("│ Targets   : {} host(s)", target_pairs.len());
    for (i, (host, ip)) in target_pairs.iter().enumerate() {
        if i < 5 {
            println!("│           : {} -> {}", host, ip);
        } else if i == 5 {
            println!("│           : ... ({} more)", target_pairs.len() - 5);
            break;
        }
    }
    println!("│ Interval  : {} seconds", interval);
    println!("│ Report URL: {}", api.results_url());
    println!("│ Batch     : up to {} result(s), partial flush after {} ms", batch_size, flush_ms);
    println!("│ Actions   : Press Ctrl+C or q to stop");
    println!("└─────────────────────────────────────────────────────────");

    let reporter = ReportSender::spawn(api, batch_size, Duration::from_millis(flush_ms));

    let probe_threads = spawn_probe_workers(
        target_pairs,
        Duration::from_secs(interval),
        running.clone(),
        reporter.handle(),
    );

    // Listen for q/esc to exit
    let running_for_key = running.clone();
    let shutdown_tx_for_key = shutdown_tx.clone();
    let key_listener = std::thread::spawn(move || {
        let _raw_mode = match RawModeGuard::new() {
            Ok(guard) => guard,
            Err(_) => return,
        };

        while running_for_key.load(Ordering::Relaxed) {
            if let Ok(true) = event::poll(Duration::from_millis(50)) {
                if let Ok(Event::Key(key)) = event::read() {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => {
                            running_for_key.store(false, Ordering::Relaxed);
                            if let Some(tx) = shutdown_tx_for_key.lock().unwrap().take() {
                                let _ = tx.send(());
                            }
                            break;
                        }
                        KeyCode::Char('c') if key.modifiers == KeyModifiers::CONTROL => {
                            running_for_key.store(false, Ordering::Relaxed);
                            if let Some(tx) = shutdown_tx_for_key.lock().unwrap().take() {
                                let _ = tx.send(());
                            }
                            break;
                        }
                        _ => {}
                    }
                }
            }
        }
    });

    // Block until Ctrl+C or a quit key fires the shutdown channel
    let _ = shutdown_rx.await;
    running.store(false, Ordering::Relaxed);

    // Workers notice the flag after their next stream event
    for handle in probe_threads {
        let _ = handle.join();
    }
    let _ = key_listener.join();

    // Final flush of anything still buffered
    reporter.close().await;

    Ok(())
}
