//! Command-line interface definitions
//!
//! Without a subcommand, msgdeck opens the interactive dashboard. The
//! subcommands are one-shot automation entry points over the same gateway
//! client the TUI uses.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "msgdeck", version)]
#[command(about = "Terminal dashboard for a WhatsApp-gateway backend")]
#[command(
    long_about = "Terminal dashboard for a WhatsApp-gateway backend.\n\n\
    Run without a subcommand to open the interactive dashboard: connection \
    status, a scannable pairing QR while the backend waits for a device \
    link, and send forms once connected. Subcommands perform one-shot \
    actions for scripting."
)]
pub struct Cli {
    /// Base URL of the gateway backend
    #[arg(long, env = "MSGDECK_BACKEND_URL", global = true)]
    pub backend_url: Option<String>,

    /// Path to a msgdeck.toml config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the backend connection status
    Status {
        /// Emit a single JSON object instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Print the pairing QR code while the backend waits for a scan
    Qr,

    /// Send a text message
    SendText {
        /// Recipient phone number (international format, digits only)
        #[arg(long)]
        number: String,

        /// Message body
        #[arg(long)]
        message: String,

        /// Emit a single JSON object instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Send a media file (png jpg jpeg pdf doc docx xls xlsx)
    SendMedia {
        /// Recipient phone number (international format, digits only)
        #[arg(long)]
        number: String,

        /// File to upload
        #[arg(long)]
        file: PathBuf,

        /// Optional caption
        #[arg(long)]
        caption: Option<String>,

        /// Emit a single JSON object instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Log out and reset the gateway session
    Logout,
}
