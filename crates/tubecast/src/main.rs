// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tubecast - YouTube links in, audio messages out.
//!
//! This is the binary entry point for the Tubecast service.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod check;
mod recent;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tubecast_coordinator::command::RECENT_LIMIT;

/// Tubecast - YouTube links in, audio messages out.
#[derive(Parser, Debug)]
#[command(name = "tubecast", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the bot until interrupted.
    Serve,
    /// Print the most recent conversions.
    Recent {
        /// Number of entries to print.
        #[arg(short = 'n', long, default_value_t = RECENT_LIMIT)]
        n: usize,
    },
    /// Validate configuration, locate ffmpeg, and open the store.
    Check,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => tubecast_config::load_and_validate_path(path),
        None => tubecast_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            tubecast_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.service.log_level);

    let result = match cli.command {
        Some(Commands::Serve) => {
            if let Err(errors) = tubecast_config::validate_for_serve(&config) {
                tubecast_config::render_errors(&errors);
                std::process::exit(1);
            }
            serve::run_serve(config).await
        }
        Some(Commands::Recent { n }) => recent::run_recent(&config, n).await,
        Some(Commands::Check) => check::run_check(&config).await,
        None => {
            println!("tubecast: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tubecast={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn recent_defaults_to_ten() {
        let cli = Cli::try_parse_from(["tubecast", "recent"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Recent { n: 10 })));

        let cli = Cli::try_parse_from(["tubecast", "recent", "-n", "3"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Recent { n: 3 })));
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["tubecast", "check", "--config", "/tmp/t.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/t.toml")));
        assert!(matches!(cli.command, Some(Commands::Check)));
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = tubecast_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.service.log_level, "info");
        assert!(tubecast_config::validate_for_serve(&config).is_err());
    }
}
