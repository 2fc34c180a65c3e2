use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::{AcquirerCommands, OfferCommands, StepCommands};

/// Backoffice for TigerFy sales funnels
///
/// Manage offers (Telegram bot funnels), the ordered steps each offer is made
/// of and the payment acquirers you keep on file. Every command acts for the
/// owner given with `--owner` or `TIGERFY_OWNER`. Run `serve` to expose the
/// same operations over MCP on stdio.
#[derive(Parser)]
#[command(version, about, name = "tfy")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/tigerfy/tigerfy.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Owner every command acts for
    #[arg(long, global = true, env = "TIGERFY_OWNER")]
    pub owner: Option<String>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for the TigerFy CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Manage offers
    #[command(alias = "o")]
    Offer {
        #[command(subcommand)]
        command: OfferCommands,
    },
    /// Manage the steps of an offer
    #[command(alias = "s")]
    Step {
        #[command(subcommand)]
        command: StepCommands,
    },
    /// Manage payment acquirers
    #[command(alias = "a")]
    Acquirer {
        #[command(subcommand)]
        command: AcquirerCommands,
    },
    /// Start the MCP server
    Serve,
}
