//! msgdeck CLI
//!
//! Terminal dashboard for a WhatsApp-gateway backend. Without a subcommand
//! this opens the interactive TUI; subcommands are one-shot actions over
//! the same gateway client.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use msgdeck_core::tui::{AppConfig, run_tui};
use msgdeck_core::{Config, HttpGatewayClient};

mod cli;
mod commands;

use cli::{Cli, Command};

fn main() -> ExitCode {
    let args = Cli::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(args.debug, &config.general.log_level);

    let client = match HttpGatewayClient::new(&config.backend) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("error: failed to build HTTP client: {err}");
            return ExitCode::FAILURE;
        }
    };

    match args.command {
        None => {
            tracing::info!(backend = %config.backend.base_url, "starting dashboard");
            match run_tui(client, AppConfig::from_config(&config)) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    eprintln!("error: {err}");
                    ExitCode::FAILURE
                }
            }
        }
        Some(Command::Status { json }) => commands::status(&client, json),
        Some(Command::Qr) => commands::qr(&client),
        Some(Command::SendText {
            number,
            message,
            json,
        }) => commands::send_text(&client, &number, &message, json),
        Some(Command::SendMedia {
            number,
            file,
            caption,
            json,
        }) => commands::send_media(&client, &number, &file, caption, json),
        Some(Command::Logout) => commands::logout(&client, config.ui.logout_grace()),
    }
}

/// Load config from the explicit path or the default locations, then apply
/// CLI/env overrides.
fn load_config(args: &Cli) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path).context("loading configuration")?,
        None => Config::load().context("loading configuration")?,
    };
    if let Some(url) = &args.backend_url {
        config.backend.base_url = url.clone();
    }
    Ok(config)
}

/// Logging goes to stderr so it never fights the TUI or the plain/JSON
/// stdout contract. Precedence: --debug, then MSGDECK_LOG, then the
/// config's log level.
fn init_logging(debug: bool, default_level: &str) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("MSGDECK_LOG").unwrap_or_else(|_| {
            EnvFilter::try_new(default_level).unwrap_or_else(|_| EnvFilter::new("info"))
        })
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
