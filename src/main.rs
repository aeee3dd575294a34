use clap::{Parser, Subcommand};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::{runtime::Builder, task};

use pingboard::api::ApiClient;
use pingboard::poller::Poller;
use pingboard::snapshot::SnapshotStore;
use pingboard::{agent, draw, i18n, terminal};

const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Parser, Debug)]
#[command(
    version = "v0.1.0",
    about = "📡 PingBoard - A live terminal dashboard for ping results collected by a backend"
)]
struct Args {
    /// Backend base URL to poll for results
    #[arg(help = "backend base URL to poll for results", required = false)]
    url: Option<String>,

    /// Interval in seconds between result polls
    #[arg(short, long, default_value_t = 5, help = "Interval in seconds between result polls")]
    interval: u64,

    #[arg(long = "lang", help = "Language: en, ru (default: system language)")]
    lang: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Agent mode: ping targets and report the results to the backend
    Agent {
        /// Target IP addresses or hostnames to ping
        #[arg(help = "target IP addresses or hostnames to ping", required = true)]
        target: Vec<String>,

        /// Backend base URL to report results to
        #[arg(short, long, default_value = DEFAULT_BASE_URL, help = "Backend base URL to report results to")]
        url: String,

        /// Interval in seconds between pings
        #[arg(short, long, default_value_t = 10, help = "Interval in seconds between pings")]
        interval: u64,

        /// Maximum number of results per report batch
        #[arg(short, long, default_value_t = 16, help = "Maximum number of results per report batch")]
        batch_size: usize,

        /// Flush a partial batch after this many milliseconds
        #[arg(long = "flush-ms", default_value_t = 1000, help = "Flush a partial batch after this many milliseconds")]
        flush_ms: u64,

        #[clap(long = "force_ipv6", default_value_t = false, short = '6', help = "Force using IPv6")]
        force_ipv6: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // parse command line arguments
    let args = Args::parse();

    // Determine language: command line arg > environment variable > system language
    let lang = args
        .lang
        .clone()
        .or_else(|| std::env::var("PINGBOARD_LANG").ok())
        .unwrap_or_else(i18n::detect_system_language);

    match args.command {
        Some(Commands::Agent { target, url, interval, batch_size, flush_ms, force_ipv6 }) => {
            env_logger::init();

            let rt = Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()?;

            let res = rt.block_on(agent::run_agent_mode(
                target, url, interval, batch_size, flush_ms, force_ipv6,
            ));

            // if error print error message and exit
            if let Err(err) = res {
                eprintln!("{}", err);
                std::process::exit(1);
            }
        }
        None => {
            // Default watch mode
            let url = args.url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

            let rt = Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()?;

            let res = rt.block_on(run_watch_mode(url, args.interval, lang));

            // if error print error message and exit
            if let Err(err) = res {
                eprintln!("{}", err);
                std::process::exit(1);
            }
        }
    }
    Ok(())
}

async fn run_watch_mode(url: String, interval: u64, lang: String) -> anyhow::Result<()> {
    let api = ApiClient::new(&url)?;
    let store = SnapshotStore::new();
    let running = Arc::new(Mutex::new(true));

    // wakeup channel (poller -> ui), capacity 1 latches a pending redraw
    let (wakeup_tx, wakeup_rx) = mpsc::sync_channel::<()>(1);
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let poller = Poller::new(api, store.clone(), Duration::from_secs(interval));
    let poller_task = task::spawn(poller.run(wakeup_tx, shutdown_rx));

    // init terminal
    let terminal = draw::init_terminal()?;
    let terminal_guard = Arc::new(Mutex::new(terminal::TerminalGuard::new(terminal)));

    // UI loop gets its own thread, it blocks on keyboard and redraw waits
    let store_for_ui = store.clone();
    let running_for_ui = running.clone();
    let terminal_guard_for_ui = terminal_guard.clone();
    let url_for_ui = url.clone();
    let lang_for_ui = lang.clone();
    let ui_task = task::spawn_blocking(move || {
        let mut guard = terminal_guard_for_ui.lock().unwrap();
        draw::draw_interface_with_updates(
            guard.terminal.as_mut().unwrap(),
            &store_for_ui,
            wakeup_rx,
            running_for_ui,
            &url_for_ui,
            &lang_for_ui,
        )
        .ok();
    });

    // UI leaves first (quit key or wakeup channel gone), then the poller
    // is told to stop so its timer does not outlive the screen
    ui_task.await?;
    *running.lock().unwrap() = false;
    let _ = shutdown_tx.send(());

    // restore terminal right away, a poll may still be in flight
    if let Some(mut terminal) = terminal_guard.lock().unwrap().terminal.take() {
        draw::restore_terminal(&mut terminal)?;
    }

    poller_task.await?;

    Ok(())
}
