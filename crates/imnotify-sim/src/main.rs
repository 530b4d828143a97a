//! imnotify-sim: runs the connection and presence core against a simulated
//! build fleet and a log-only chat backend.
//!
//! Builds start and finish at random, sessions are dropped now and then, and
//! everything the accounts would publish is written to the log.

mod backend;
mod fleet;
mod settings;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use imnotify_config::{AccountConfig, ImConfig};
use imnotify_presence::{ConnectionProvider, PresenceBroadcaster};
use rand::Rng;

use crate::backend::LogBackendFactory;
use crate::fleet::SimulatedFleet;

#[derive(Parser)]
#[command(name = "imnotify-sim", about = "Simulate build-farm presence broadcasting")]
struct Args {
    /// Config file (defaults to the platform config path).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of build workers.
    #[arg(long, default_value_t = 3)]
    workers: u32,

    /// Executors per worker.
    #[arg(long, default_value_t = 2)]
    executors: u32,

    /// Connect attempts that fail before an account comes online.
    #[arg(long, default_value_t = 0)]
    flaky: u32,

    /// Seconds between simulated build events.
    #[arg(long, default_value_t = 5)]
    event_interval: u64,

    /// Chance per build event that a live session gets dropped.
    #[arg(long, default_value_t = 0.05)]
    drop_rate: f64,

    /// Stop after this many seconds (0 runs until Ctrl-C).
    #[arg(long, default_value_t = 0)]
    duration: u64,
}

struct Account {
    factory: Arc<LogBackendFactory>,
    provider: Arc<ConnectionProvider>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imnotify_presence=debug,imnotify_sim=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to load config");
            std::process::exit(1);
        }
    };

    let fleet = Arc::new(SimulatedFleet::new(args.workers, args.executors));
    let broadcaster = PresenceBroadcaster::new(
        fleet.clone(),
        settings::broadcast_schedule(&config.presence),
    );
    let policy = settings::reconnect_policy(&config.reconnect);

    let mut accounts = Vec::new();
    for account in effective_accounts(&config) {
        let factory = Arc::new(LogBackendFactory::new(&account, args.flaky));
        let provider = Arc::new(ConnectionProvider::new(factory.clone(), policy));
        provider.connect_in_background();
        if config.presence.enabled {
            broadcaster.register(Arc::clone(&provider));
        }
        accounts.push(Account { factory, provider });
    }
    tracing::info!(
        accounts = accounts.len(),
        workers = args.workers,
        executors = args.executors,
        "simulation started"
    );

    let run = simulate(&args, &fleet, &broadcaster, &accounts);
    if args.duration > 0 {
        let _ = tokio::time::timeout(Duration::from_secs(args.duration), run).await;
    } else {
        tokio::select! {
            _ = run => {}
            _ = tokio::signal::ctrl_c() => tracing::info!("interrupted"),
        }
    }

    for account in &accounts {
        broadcaster.unregister(&account.provider);
        account.provider.shutdown().await;
    }
    tracing::info!("simulation finished");
}

fn load_config(args: &Args) -> Result<ImConfig, imnotify_common::ConfigError> {
    match &args.config {
        Some(path) => imnotify_config::load_from_path(path),
        None => imnotify_config::load_default(),
    }
}

fn effective_accounts(config: &ImConfig) -> Vec<AccountConfig> {
    if config.accounts.is_empty() {
        vec![AccountConfig {
            name: "local".into(),
            ..Default::default()
        }]
    } else {
        config.accounts.clone()
    }
}

async fn simulate(
    args: &Args,
    fleet: &SimulatedFleet,
    broadcaster: &PresenceBroadcaster,
    accounts: &[Account],
) {
    let mut ticker = tokio::time::interval(Duration::from_secs(args.event_interval.max(1)));
    ticker.tick().await;
    loop {
        ticker.tick().await;

        let event = fleet.step();
        tracing::info!("{event}");
        broadcaster.on_build_event();

        for account in accounts {
            if rand::thread_rng().gen_bool(args.drop_rate.clamp(0.0, 1.0)) {
                account.factory.drop_session();
            }
            account.provider.send("#builds", &event).await;
        }
    }
}
