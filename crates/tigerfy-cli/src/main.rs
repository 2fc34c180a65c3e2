//! TigerFy CLI Application
//!
//! Command-line backoffice for TigerFy offers, steps and acquirers, plus an
//! MCP server exposing the same operations.

mod args;
mod cli;
mod mcp;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use mcp::{run_stdio_server, TigerfyMcpServer};
use renderer::TerminalRenderer;
use tigerfy_core::{BackofficeBuilder, Session};
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        owner,
        no_color,
        command,
    } = Args::parse();

    let session = Session::from(owner);
    session
        .require_owner()
        .context("Pass --owner or set TIGERFY_OWNER")?;

    let backoffice = BackofficeBuilder::new()
        .with_database_path(database_file)
        .build()
        .await
        .context("Failed to initialize backoffice")?;

    let renderer = TerminalRenderer::new(!no_color);

    info!("TigerFy started");

    match command {
        Some(Offer { command }) => {
            Cli::new(backoffice, session, renderer)
                .handle_offer_command(command)
                .await
        }
        Some(Step { command }) => {
            Cli::new(backoffice, session, renderer)
                .handle_step_command(command)
                .await
        }
        Some(Acquirer { command }) => {
            Cli::new(backoffice, session, renderer)
                .handle_acquirer_command(command)
                .await
        }
        Some(Serve) => {
            info!("Starting TigerFy MCP server");
            run_stdio_server(TigerfyMcpServer::new(backoffice, session))
                .await
                .context("MCP server failed")
        }
        None => Cli::new(backoffice, session, renderer).list_offers().await,
    }
}
