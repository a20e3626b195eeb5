//! Command-line interface definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Market data gateway with caching, request coalescing and vendor fallback
#[derive(Parser, Debug)]
#[command(name = "quotegate")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (defaults apply when it does not exist)
    #[arg(long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Latest quote for a symbol
    Quote(SymbolArg),

    /// Listed option expirations for a symbol
    Expirations(SymbolArg),

    /// Option chain for a symbol and expiration
    Chain(ChainArgs),

    /// Show configured providers and cache
    Stats,
}

#[derive(Parser, Debug)]
pub struct SymbolArg {
    /// Underlying ticker, e.g. SPY
    pub symbol: String,
}

#[derive(Parser, Debug)]
pub struct ChainArgs {
    /// Underlying ticker, e.g. SPY
    pub symbol: String,

    /// Expiration date (YYYY-MM-DD)
    pub expiration: NaiveDate,
}
