//! Driver process entry point.
//!
//! Starts one driver for one device from a settings file, with exit code 0
//! on normal completion and nonzero on fatal initialization failure.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use light_schedule::{load_settings, Driver, Intensity, LightTransport, SystemClock};
use light_schedule::error::TransportError;

#[derive(Debug, Parser)]
#[command(name = "light-scheduler", about = "Drive a light through a cyclic intensity profile")]
struct Cli {
    /// Path to the scheduler settings TOML.
    #[arg(long, default_value = "scheduler.toml")]
    settings: PathBuf,

    /// Override the profile file referenced by the settings.
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Run the profile exactly once instead of looping.
    #[arg(long)]
    once: bool,
}

/// Stand-in transport that logs commands. Deployments wire the real serial
/// link to the device here.
struct ConsoleTransport;

impl LightTransport for ConsoleTransport {
    fn announce_presence(&mut self) -> Result<(), TransportError> {
        info!("announcing presence to light device");
        Ok(())
    }

    fn set_intensity(&mut self, intensity: Intensity) -> Result<(), TransportError> {
        info!(%intensity, "device intensity command");
        Ok(())
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut settings = match load_settings(&cli.settings) {
        Ok(settings) => settings,
        Err(err) => {
            error!(path = %cli.settings.display(), error = %err, "failed to load settings");
            return ExitCode::from(2);
        }
    };
    if let Some(profile) = cli.profile {
        settings.profile_path = profile;
    }
    if cli.once {
        settings.run_continuously = false;
    }

    let mut driver = match Driver::initialize(&settings, ConsoleTransport, SystemClock) {
        Ok(driver) => driver,
        Err(err) => {
            error!(error = %err, "driver initialization failed");
            return ExitCode::FAILURE;
        }
    };

    match driver.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "driver stopped with an error");
            ExitCode::FAILURE
        }
    }
}
