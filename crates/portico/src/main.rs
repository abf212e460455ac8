// SPDX-FileCopyrightText: 2026 Portico Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Portico - a small plugin host.
//!
//! This is the binary entry point.

mod plugins;
mod serve;
mod shutdown;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use portico_config::{ConfigError, PorticoConfig};

/// Portico - serves HTTP routes contributed by compiled-in plugins.
#[derive(Parser, Debug)]
#[command(name = "portico", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Start the gateway (default).
    Serve,
    /// List compiled-in plugins and whether they are enabled.
    Plugins {
        /// Only show plugins whose name or description matches.
        #[arg(long)]
        search: Option<String>,
    },
    /// Load and validate the configuration, then exit.
    CheckConfig,
}

fn load_config(path: Option<&Path>) -> Result<PorticoConfig, Vec<ConfigError>> {
    match path {
        Some(path) => portico_config::load_and_validate_path(path),
        None => portico_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            portico_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Commands::Plugins { search } => {
            match plugins::render_plugin_list(&config, search.as_deref()) {
                Ok(listing) => print!("{listing}"),
                Err(e) => {
                    eprintln!("error: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::CheckConfig => {
            println!(
                "portico: configuration OK (listening on {}:{}, {} plugin override(s))",
                config.server.host,
                config.server.port,
                config.plugins.len()
            );
        }
    }
}
