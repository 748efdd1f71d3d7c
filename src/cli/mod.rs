//! CLI interface for market-quotes
//!
//! Provides subcommands for:
//! - `serve`: Run the quote HTTP API
//! - `fetch`: Fetch one batch and print it
//! - `config`: Show the effective configuration

mod fetch;
mod serve;

pub use fetch::FetchArgs;
pub use serve::ServeArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "market-quotes")]
#[command(about = "Rate-limited stock quote retrieval for the finance dashboard")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the quote HTTP API
    Serve(ServeArgs),
    /// Fetch quotes once and print JSON
    Fetch(FetchArgs),
    /// Show the effective configuration
    Config,
}
