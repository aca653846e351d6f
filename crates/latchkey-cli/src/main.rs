//! `latchkey`: runs the access-control firmware against simulated devices.
//!
//! Cards are presented by typing on stdin, one per line:
//!
//! ```text
//! B8 24 A4 51      present a card with this identifier
//! !                present a card whose serial cannot be read
//! quit             stop
//! ```
//!
//! Ctrl+C also stops the loop. Outputs are reported through the log.

use std::io::BufRead;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use latchkey_core::Identifier;
use latchkey_firmware::{AccessController, FirmwareConfig};
use latchkey_hardware::mock::{
    MockCardReader, MockCardReaderHandle, MockIndicator, MockRelay, MockTone,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted
    #[arg(long, short = 'c', env = "LATCHKEY_CONFIG")]
    config: Option<PathBuf>,

    /// Override the authorized card identifier (hex, e.g. "B8:24:A4:51")
    #[arg(long)]
    authorized_uid: Option<Identifier>,

    /// Skip the power-on tone sweep
    #[arg(long)]
    no_sweep: bool,

    /// Stop after this many seconds instead of waiting for Ctrl+C
    #[arg(long, value_name = "SECS")]
    run_for: Option<u64>,
}

/// A line typed on stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Present(Identifier),
    Unreadable,
    Quit,
}

/// Parse one stdin line. Blank lines yield `None`.
fn parse_command(line: &str) -> latchkey_core::Result<Option<Command>> {
    match line.trim() {
        "" => Ok(None),
        "!" => Ok(Some(Command::Unreadable)),
        "q" | "quit" | "exit" => Ok(Some(Command::Quit)),
        hex => hex.parse().map(|uid| Some(Command::Present(uid))),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<FirmwareConfig> {
    let mut config = match &cli.config {
        Some(path) => FirmwareConfig::load_from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => FirmwareConfig::default(),
    };

    if let Some(uid) = cli.authorized_uid {
        config.access.authorized_uid = uid;
    }
    if cli.no_sweep {
        config.buzzer.startup_sweep.enabled = false;
    }
    Ok(config)
}

/// Feed stdin lines to the simulated reader.
///
/// Runs on a plain thread: a blocking stdin read must not hold up runtime
/// shutdown.
fn spawn_card_feeder(handle: MockCardReaderHandle, shutdown: CancellationToken) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "stdin read failed");
                    break;
                }
            };

            let result = match parse_command(&line) {
                Ok(None) => continue,
                Ok(Some(Command::Present(uid))) => handle.present_card(uid),
                Ok(Some(Command::Unreadable)) => handle.present_unreadable_card(),
                Ok(Some(Command::Quit)) => {
                    shutdown.cancel();
                    break;
                }
                Err(e) => {
                    warn!(error = %e, line = line.trim(), "ignoring input");
                    continue;
                }
            };

            if let Err(e) = result {
                error!(error = %e, "reader no longer accepts cards");
                break;
            }
        }
    });
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config(&cli)?;
    let timing = config.timing.clone();
    info!(authorized_uid = %config.access.authorized_uid, "starting latchkey");

    let (reader, handle) = MockCardReader::new();
    let mut controller =
        AccessController::new(reader, MockIndicator::new(), MockTone::new(), MockRelay::new(), config)
            .context("invalid configuration")?;

    let shutdown = CancellationToken::new();

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl+C received, stopping...");
            }
            shutdown.cancel();
        });
    }

    if let Some(secs) = cli.run_for {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            shutdown.cancel();
        });
    }

    spawn_card_feeder(handle, shutdown.clone());

    let summary = latchkey_firmware::run(&mut controller, &timing, shutdown).await?;
    println!(
        "{} polls, {} granted, {} denied, {} unreadable",
        summary.polls, summary.granted, summary.denied, summary.read_failures
    );
    Ok(())
}
