//! Command-line adapter.

pub mod command;
pub mod market;
pub mod output;

use crate::application::MarketDataGateway;
use crate::error::Result;

use command::Commands;

/// Run one command against `gateway`.
///
/// # Errors
///
/// Returns the fetch error of the command, or an output encoding error.
pub async fn dispatch(gateway: &MarketDataGateway, command: Commands) -> Result<()> {
    match command {
        Commands::Quote(args) => market::quote(gateway, &args.symbol).await,
        Commands::Expirations(args) => market::expirations(gateway, &args.symbol).await,
        Commands::Chain(args) => market::chain(gateway, &args.symbol, args.expiration).await,
        Commands::Stats => market::stats(gateway),
    }
}
