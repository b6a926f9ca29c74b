//! Command line entry points
//!
//! - `serve`: run the relay HTTP server
//! - `providers`: show the configured upstream providers

pub mod providers;
pub mod serve;

use clap::{Parser, Subcommand};

/// Chat relay - streams chat completions from OpenAI-compatible providers as plain text
#[derive(Parser)]
#[command(name = "chat-relay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the relay HTTP server
    Serve,

    /// List providers with their base URL, default model and secret status
    Providers(providers::ProvidersArgs),
}
