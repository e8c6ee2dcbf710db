//! Constrained-device agent entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  MqttConnector     BusListener      LogListener                │
//! │  (PubSubPort)      (Listener)       (Listener)                 │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              Coordinator (pure logic)                  │    │
//! │  │  caches · ThresholdPolicy · ActuatorManager            │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  SensorManager · PerformanceManager (PeriodicTask threads)     │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Exit codes: `0` normal, `2` startup failure, `130` interrupted.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use cda::{DeviceApp, DeviceConfig};

const EXIT_STARTUP_FAILURE: u8 = 2;
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser, Debug)]
#[command(name = "cda", version, about = "Constrained-device agent")]
struct Cli {
    /// TOML configuration file; defaults apply when omitted
    #[arg(short = 'c', long = "config-file", value_name = "PATH")]
    config_file: Option<PathBuf>,
}

enum Outcome {
    Completed,
    Interrupted,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(Outcome::Completed) => ExitCode::SUCCESS,
        Ok(Outcome::Interrupted) => {
            info!("interrupted, exiting");
            ExitCode::from(EXIT_INTERRUPTED)
        }
        Err(e) => {
            error!("startup failed: {e:#}");
            ExitCode::from(EXIT_STARTUP_FAILURE)
        }
    }
}

fn run(cli: &Cli) -> Result<Outcome> {
    let config = DeviceConfig::load(cli.config_file.as_deref()).context("loading configuration")?;
    let mut app = DeviceApp::new(&config).context("building device app")?;

    let (interrupt_tx, interrupt_rx) = mpsc::channel::<()>();
    ctrlc::set_handler(move || {
        let _ = interrupt_tx.send(());
    })
    .context("installing Ctrl+C handler")?;

    app.start().context("starting device app")?;

    let interrupted = if config.device.run_forever {
        info!("running until interrupted");
        interrupt_rx.recv().is_ok()
    } else {
        let window = Duration::from_secs(config.device.run_duration_secs);
        info!("running for {:?}", window);
        match interrupt_rx.recv_timeout(window) {
            Ok(()) => true,
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => false,
        }
    };

    app.stop();
    Ok(if interrupted {
        Outcome::Interrupted
    } else {
        Outcome::Completed
    })
}
