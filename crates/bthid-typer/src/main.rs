//! bthid-typer — entry point.
//!
//! Emulates a Bluetooth HID keyboard and types one line of text into a
//! paired host.
//!
//! # Usage
//!
//! ```text
//! bthid-typer [OPTIONS] [TEXT]
//!
//! Arguments:
//!   [TEXT]                 Text to type; read from stdin when omitted
//!
//! Options:
//!   --source <ADDR>        Local adapter address [default: any adapter]
//!   --target <ADDR>        Host to type into
//!   --config <PATH>        Config file [default: ~/.config/bthid-typer/config.toml]
//!   --preamble <N>         Throw-away keystrokes before the text [default: 10]
//!   --sdp-socket <PATH>    SDP server socket [default: /var/run/sdp]
//!   --save-config          Write the effective settings to the config file and exit
//!   -v, --verbose          Raise the log level (-v debug, -vv trace)
//! ```
//!
//! # Settings precedence
//!
//! Command-line flags win over environment variables, which win over the
//! config file, which wins over built-in defaults.
//!
//! | Variable        | Flag       |
//! |-----------------|------------|
//! | `BTHID_SOURCE`  | `--source` |
//! | `BTHID_TARGET`  | `--target` |
//!
//! `RUST_LOG`, when set, replaces the log filter entirely.
//!
//! # Architecture overview
//!
//! ```text
//! main()
//!  └─ KeyboardServiceUseCase::run     -- resolve adapter, publish SDP record
//!       └─ TypeTextUseCase::run       -- connect, handshake, stream reports
//!  └─ exit code from SessionOutcome
//! ```

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use bthid_core::BdAddr;
use bthid_typer::application::register_service::KeyboardServiceUseCase;
use bthid_typer::application::type_text::{SessionConfig, TypeTextUseCase};
use bthid_typer::infrastructure::{
    adapter::HciAdapterResolver,
    l2cap::L2capConnector,
    pacer::ThreadPacer,
    sdp::{SdpRegistrar, DEFAULT_SDP_SOCKET},
    storage::config::{config_file_path, load_config_from, save_config_to, AppConfig},
};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Types text into a paired host by emulating a Bluetooth keyboard.
#[derive(Debug, Parser)]
#[command(
    name = "bthid-typer",
    about = "Type text into a paired host as a Bluetooth HID keyboard",
    version
)]
struct Cli {
    /// Address of the local adapter to use.
    ///
    /// Omit to let the kernel pick any adapter.
    #[arg(long, env = "BTHID_SOURCE")]
    source: Option<BdAddr>,

    /// Address of the host to type into.
    #[arg(long, env = "BTHID_TARGET")]
    target: Option<BdAddr>,

    /// Path of the TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of throw-away keystrokes typed before the text.
    #[arg(long)]
    preamble: Option<usize>,

    /// Path of the local SDP server's Unix socket.
    #[arg(long, default_value = DEFAULT_SDP_SOCKET)]
    sdp_socket: PathBuf,

    /// Write the effective settings to the config file and exit.
    #[arg(long)]
    save_config: bool,

    /// Raise the log level; repeat for more detail.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Text to type.  Read from standard input when omitted.
    text: Option<String>,
}

impl Cli {
    /// Overlays the command-line values on top of the file config.
    fn apply_to(&self, config: &mut AppConfig) {
        if let Some(source) = self.source {
            config.bluetooth.source = Some(source);
        }
        if let Some(target) = self.target {
            config.bluetooth.target = Some(target);
        }
        if let Some(n) = self.preamble {
            config.typer.preamble_len = n;
        }
    }

    fn config_path(&self) -> anyhow::Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => config_file_path().context("cannot locate the config file"),
        }
    }
}

/// Builds the session settings from the merged config.
fn session_config(config: &AppConfig) -> SessionConfig {
    SessionConfig {
        source: config.bluetooth.source.unwrap_or(BdAddr::ANY),
        target: config.bluetooth.target,
        preamble_len: config.typer.preamble_len,
    }
}

/// Level names from least to most verbose.
const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Returns the tracing filter for `base` raised to at least debug (`-v`) or
/// trace (`-vv`).  A base that is already more verbose is kept.
fn log_filter(base: &str, verbose: u8) -> String {
    let floor = match verbose {
        0 => return base.to_string(),
        1 => "debug",
        _ => "trace",
    };
    let rank = |level: &str| LEVELS.iter().position(|l| l.eq_ignore_ascii_case(level));
    match (rank(base.trim()), rank(floor)) {
        (Some(have), Some(want)) if have >= want => base.to_string(),
        _ => floor.to_string(),
    }
}

fn read_payload(text: Option<String>) -> anyhow::Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read text from stdin")?;
    // The session adds its own trailing newline.
    if buf.ends_with('\n') {
        buf.pop();
    }
    Ok(buf)
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config_path()?;
    let mut config = load_config_from(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    cli.apply_to(&mut config);

    // ── Logging setup ─────────────────────────────────────────────────────────
    //
    // `RUST_LOG` wins when set; otherwise the config's level, raised by -v.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(log_filter(&config.typer.log_level, cli.verbose))
        }))
        .init();

    if cli.save_config {
        save_config_to(&config_path, &config)
            .with_context(|| format!("failed to write config to {}", config_path.display()))?;
        info!(path = %config_path.display(), "config saved");
        return Ok(());
    }

    let session = session_config(&config);
    let payload = read_payload(cli.text)?;

    info!(
        source = %session.source,
        target = ?session.target.map(|t| t.to_string()),
        chars = payload.chars().count(),
        "bthid-typer starting"
    );

    let service = KeyboardServiceUseCase::new(
        Arc::new(HciAdapterResolver),
        Arc::new(SdpRegistrar::new(&cli.sdp_socket, session.source)),
        config.service.to_service_info(),
    );
    let typer = TypeTextUseCase::new(Arc::new(L2capConnector), Arc::new(ThreadPacer), session.clone());

    let outcome = service.run(session.source, || typer.run(&payload));

    if let Some(e) = outcome.error {
        error!(reports = outcome.reports_sent, "typing aborted");
        return Err(anyhow::Error::new(e).context("typing session aborted"));
    }

    info!(
        reports = outcome.reports_sent,
        skipped = outcome.chars_skipped,
        "bthid-typer finished"
    );
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
