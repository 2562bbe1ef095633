//! VantagePoint CLI - binary entry point.
//!
//! Resolves settings from `~/.vantagepoint/config.toml` and the environment,
//! then walks one session through the five phases on stdin/stdout:
//!
//! ```text
//! main() -> Settings::resolve -> VantageService -> walk::run(friction)
//!                                                      |
//!                                                      v
//!                                      receipt JSON on stdout
//! ```
//!
//! Logs never go to the terminal. They land in the first writable file among
//! `~/.vantagepoint/logs/vantagepoint.log` and `./.vantagepoint/logs/vantagepoint.log`.

mod walk;

use std::{
    fs::{self, File, OpenOptions},
    io,
    path::PathBuf,
    sync::Mutex,
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use vantage_config::{Settings, VantageConfig};
use vantage_engine::VantageService;

#[derive(Parser, Debug)]
#[command(name = "vantagepoint", about = "Structured reasoning from friction to a committed path")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the operating mode the current environment selects.
    Mode,
    /// Walk a session from provocation to receipt.
    Run {
        /// What is causing friction.
        friction: String,
    },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let mut skipped = Vec::new();
    match open_log_file(log_dirs(), &mut skipped) {
        Some((log_path, file)) => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .with(env_filter)
                .init();
            tracing::info!(path = %log_path.display(), "Logging initialized");
            for reason in skipped {
                tracing::warn!("Skipped log location: {reason}");
            }
        }
        // Stdout carries the walk and the receipt; no file means no logs.
        None => tracing_subscriber::registry().with(env_filter).init(),
    }
}

/// `logs/` under the config directory, then under `./.vantagepoint`.
fn log_dirs() -> Vec<PathBuf> {
    let config_dir = VantageConfig::path().and_then(|p| p.parent().map(PathBuf::from));
    config_dir
        .into_iter()
        .chain([PathBuf::from(".vantagepoint")])
        .map(|dir| dir.join("logs"))
        .collect()
}

/// Open `vantagepoint.log` in the first usable directory. Directories that
/// fail are described in `skipped`.
fn open_log_file(
    dirs: impl IntoIterator<Item = PathBuf>,
    skipped: &mut Vec<String>,
) -> Option<(PathBuf, File)> {
    for dir in dirs {
        let path = dir.join("vantagepoint.log");
        let opened = fs::create_dir_all(&dir)
            .and_then(|()| OpenOptions::new().create(true).append(true).open(&path));
        match opened {
            Ok(file) => return Some((path, file)),
            Err(e) => skipped.push(format!("{}: {e}", path.display())),
        }
    }
    None
}

fn load_settings() -> Settings {
    // A broken config file is logged by the loader; env and defaults still apply.
    let config = VantageConfig::load().ok().flatten();
    Settings::resolve(config.as_ref())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let settings = load_settings();

    match cli.command {
        Command::Mode => {
            let mode = settings.mode_selector().resolve();
            println!("{mode}: {}", mode.description());
        }
        Command::Run { friction } => {
            let service = VantageService::with_defaults(settings);
            let stdin = io::stdin();
            let mut walk = walk::Walk::new(stdin.lock(), io::stdout());
            let receipt = walk.run(&service, &friction).await?;
            println!("{}", serde_json::to_string_pretty(&receipt)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Command, open_log_file};

    #[test]
    fn run_takes_friction() {
        let cli = Cli::parse_from(["vantagepoint", "run", "deploys break"]);
        assert!(matches!(cli.command, Command::Run { friction } if friction == "deploys break"));
    }

    #[test]
    fn mode_has_no_arguments() {
        let cli = Cli::parse_from(["vantagepoint", "mode"]);
        assert!(matches!(cli.command, Command::Mode));
    }

    #[test]
    fn run_requires_friction() {
        assert!(Cli::try_parse_from(["vantagepoint", "run"]).is_err());
    }

    #[test]
    fn log_file_falls_back_past_unusable_dirs() {
        let root = tempfile::tempdir().unwrap();
        let blocked = root.path().join("blocked");
        std::fs::write(&blocked, "not a directory").unwrap();
        let usable = root.path().join("local").join("logs");

        let mut skipped = Vec::new();
        let (path, _file) =
            open_log_file([blocked.join("logs"), usable.clone()], &mut skipped).unwrap();

        assert_eq!(path, usable.join("vantagepoint.log"));
        assert!(path.exists());
        assert_eq!(skipped.len(), 1);
    }

    #[test]
    fn no_usable_dir_means_no_log_file() {
        let root = tempfile::tempdir().unwrap();
        let blocked = root.path().join("blocked");
        std::fs::write(&blocked, "").unwrap();

        let mut skipped = Vec::new();
        assert!(open_log_file([blocked.join("logs")], &mut skipped).is_none());
        assert_eq!(skipped.len(), 1);
    }
}
