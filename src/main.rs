// AxeProfiler - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading and logging initialisation
// 3. Storage directory bootstrap
// 4. Interactive session launch on stdin/stdout
//
// Exit code 0 on clean session termination; 1 when bootstrap or the
// terminal itself fails.

use axeprofiler::app::session::Session;
use axeprofiler::app::store::ProfileStore;
use axeprofiler::net::client::HttpDeviceClient;
use axeprofiler::platform::config::{load_config, PlatformPaths};
use axeprofiler::util::{constants, logging};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

/// AxeProfiler - profile manager for AxeOS bitcoin mining devices.
///
/// Saves named sets of device operating parameters (frequency, core
/// voltage, fan speed) and applies them to a device over its HTTP API
/// through an interactive menu session.
#[derive(Parser, Debug)]
#[command(name = "AxeProfiler", version, about)]
struct Cli {
    /// Directory to store profiles in (overrides config and platform default).
    #[arg(short = 's', long = "storage-dir")]
    storage_dir: Option<PathBuf>,

    /// Default device address offered at the run prompt.
    #[arg(short = 'a', long = "address")]
    address: Option<String>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    // Resolve paths and config before logging init so the configured log
    // level can be honoured; config warnings are replayed afterwards.
    let platform_paths = PlatformPaths::resolve();
    let (config, config_warnings) = load_config(&platform_paths.config_dir);

    logging::init(cli.debug, config.log_level.as_deref());

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "AxeProfiler starting"
    );
    for warning in &config_warnings {
        tracing::warn!("{}", warning);
    }

    // Storage directory: CLI flag > config > platform default.
    let storage_dir = cli
        .storage_dir
        .or(config.storage_dir)
        .unwrap_or(platform_paths.profiles_dir);

    if let Err(e) = std::fs::create_dir_all(&storage_dir) {
        tracing::error!(dir = %storage_dir.display(), error = %e, "Storage bootstrap failed");
        eprintln!(
            "Error: could not create profile directory '{}': {e}",
            storage_dir.display()
        );
        std::process::exit(1);
    }

    let store = ProfileStore::new(storage_dir);
    let transport = HttpDeviceClient::new(config.http_timeout_secs);
    let default_address = cli.address.or(config.default_address);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if let Err(e) = show_notice(&mut out, &store) {
        eprintln!("Error: terminal write failed: {e}");
        std::process::exit(1);
    }

    let mut session = Session::new(store, transport, default_address, stdin.lock(), &mut out);
    if let Err(e) = session.run() {
        tracing::error!(error = %e, "Session aborted on terminal I/O failure");
        eprintln!("Error: terminal I/O failed: {e}");
        std::process::exit(1);
    }
}

/// One-time startup notice shown before the first menu.
fn show_notice(out: &mut impl Write, store: &ProfileStore) -> std::io::Result<()> {
    writeln!(
        out,
        "{} v{} - profile manager for AxeOS miners",
        constants::APP_NAME,
        constants::APP_VERSION
    )?;
    writeln!(out, "Profiles are stored in: {}", store.dir().display())?;
    Ok(())
}
