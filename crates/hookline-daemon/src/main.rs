//! Hookline - telephony headset call control.
//!
//! Finds the headset, mirrors mute/off-hook/ring onto its indicators, and
//! keeps them in step with hook switch and mute button presses while the
//! operator drives the same states from the keyboard.

use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result, anyhow};
use tokio::signal::unix::{SignalKind, signal};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod console;

use config::{DaemonConfig, LogFormat};
use console::ConsoleObserver;
use hookline_core::{Command, HidBackend, Outcome, Session, run_event_pump};
use hookline_hid::{HiddevDevice, find_device};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load_config()?;
    init_logging(&config.daemon)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting hookline");

    let path = match &config.device.path {
        Some(path) => path.clone(),
        None => find_device(&config.device.scan_config()?).context("No headset found")?,
    };
    let device = HiddevDevice::open(&path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    device.log_identity();

    let session = Arc::new(
        Session::new(device)
            .with_observer(Box::new(ConsoleObserver))
            .with_read_policy(config.session.read_policy()),
    );

    if config.session.sync_on_start {
        session.sync_from_device();
    }

    let event_thread = {
        let session = Arc::clone(&session);
        let poll = config.session.event_poll();
        thread::Builder::new()
            .name("hid-events".to_string())
            .spawn(move || run_event_pump(&session, poll))
            .context("Failed to start event thread")?
    };

    console::print_help();
    let mut keys = console::spawn_key_reader()?;
    let mut terminate = signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
    let mut interrupt = signal(SignalKind::interrupt()).context("Failed to install SIGINT handler")?;
    let mut tick = tokio::time::interval(config.session.input_tick());
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Running. Press q to quit.");

    while session.is_running() {
        tokio::select! {
            _ = tick.tick() => {
                while session.is_running() {
                    let Ok(key) = keys.try_recv() else { break };
                    handle_key(&session, key);
                }
            }
            _ = terminate.recv() => {
                info!("Received SIGTERM");
                session.request_shutdown();
            }
            _ = interrupt.recv() => {
                info!("Received SIGINT");
                session.request_shutdown();
            }
        }
    }

    info!("Waiting for event thread...");
    let pumped = tokio::task::spawn_blocking(move || event_thread.join())
        .await
        .context("Failed to join event thread")?
        .map_err(|_| anyhow!("Event thread panicked"))?;
    pumped.context("Event loop failed")?;

    info!("Hookline stopped");
    Ok(())
}

fn handle_key<D: HidBackend>(session: &Session<D>, key: char) {
    let Some(command) = Command::from_key(key) else {
        return;
    };

    match session.dispatch(command) {
        Ok(Outcome::Applied(state)) => debug!(?command, ?state, "Command applied"),
        Ok(Outcome::ShuttingDown) => info!("Quit requested"),
        Ok(Outcome::Help) => console::print_help(),
        Ok(Outcome::Reports(reports)) => console::print_reports(&reports),
        Err(e) => error!(?command, error = %e, "Command failed"),
    }
}

fn init_logging(config: &DaemonConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)
            .with_context(|| format!("Invalid log_level: {:?}", config.log_level))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    match config.log_format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
    Ok(())
}
