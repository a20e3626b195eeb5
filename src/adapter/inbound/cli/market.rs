//! Market data commands.

use chrono::NaiveDate;
use serde_json::json;
use tabled::{Table, Tabled};

use super::output;
use crate::application::MarketDataGateway;
use crate::domain::{OptionLeg, OptionsChain, Symbol};
use crate::error::Result;

#[derive(Tabled)]
struct LegRow {
    #[tabled(rename = "Strike")]
    strike: String,
    #[tabled(rename = "Bid")]
    bid: String,
    #[tabled(rename = "Ask")]
    ask: String,
    #[tabled(rename = "Volume")]
    volume: String,
    #[tabled(rename = "OI")]
    open_interest: String,
    #[tabled(rename = "IV")]
    iv: String,
    #[tabled(rename = "Delta")]
    delta: String,
}

impl From<&OptionLeg> for LegRow {
    fn from(leg: &OptionLeg) -> Self {
        let count = |v: Option<u64>| v.map_or_else(|| "-".to_string(), |n| n.to_string());
        Self {
            strike: format!("{:.2}", leg.strike),
            bid: output::number(leg.bid, 2),
            ask: output::number(leg.ask, 2),
            volume: count(leg.volume),
            open_interest: count(leg.open_interest),
            iv: output::number(leg.implied_volatility.map(|iv| iv * 100.0), 1),
            delta: output::number(leg.delta, 3),
        }
    }
}

/// `quotegate quote <SYMBOL>`
pub async fn quote(gateway: &MarketDataGateway, symbol: &str) -> Result<()> {
    let quote = gateway.get_quote(symbol).await?;
    if output::is_json() {
        return output::json(&quote);
    }

    output::section(&format!("Quote {}", quote.symbol));
    output::key_value("Price", output::number(quote.price, 2));
    if let Some(as_of) = quote.as_of {
        output::key_value("As of", as_of.to_rfc3339());
    }
    Ok(())
}

/// `quotegate expirations <SYMBOL>`
pub async fn expirations(gateway: &MarketDataGateway, symbol: &str) -> Result<()> {
    let dates = gateway.get_expirations(symbol).await?;
    let symbol = display_symbol(symbol);
    if output::is_json() {
        return output::json(&json!({
            "symbol": symbol,
            "expirations": dates,
        }));
    }

    output::section(&format!("Expirations {symbol}"));
    for date in &dates {
        println!("{date}");
    }
    output::key_value("Total", dates.len());
    Ok(())
}

/// The symbol as the gateway keys it.
fn display_symbol(raw: &str) -> String {
    Symbol::parse(raw).map(|s| s.to_string()).unwrap_or_default()
}

/// `quotegate chain <SYMBOL> <YYYY-MM-DD>`
pub async fn chain(gateway: &MarketDataGateway, symbol: &str, expiration: NaiveDate) -> Result<()> {
    let chain = gateway.get_chain(symbol, expiration).await?;
    if output::is_json() {
        return output::json(&chain);
    }
    print_chain(&chain);
    Ok(())
}

fn print_chain(chain: &OptionsChain) {
    output::section(&format!("Chain {} {}", chain.symbol, chain.expiration));
    output::key_value("Underlying", output::number(chain.underlying_price, 2));
    output::key_value("Contracts", chain.len());

    for (title, legs) in [("Calls", &chain.calls), ("Puts", &chain.puts)] {
        output::section(title);
        if legs.is_empty() {
            println!("(none)");
            continue;
        }
        let rows: Vec<LegRow> = legs.iter().map(LegRow::from).collect();
        println!("{}", Table::new(rows));
    }
}

/// `quotegate stats`
pub fn stats(gateway: &MarketDataGateway) -> Result<()> {
    let stats = gateway.stats();
    if output::is_json() {
        return output::json(&stats);
    }

    output::section("Gateway");
    output::key_value("Primary", stats.primary);
    output::key_value("Fallback", stats.fallback.unwrap_or("disabled"));
    output::key_value("Cache", stats.cache_driver.unwrap_or("disabled"));
    output::section("In flight");
    output::key_value("Quotes", stats.in_flight.quotes);
    output::key_value("Expirations", stats.in_flight.expirations);
    output::key_value("Chains", stats.in_flight.chains);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leg_row_formats_missing_fields_as_dash() {
        let leg = OptionLeg {
            bid: Some(1.25),
            implied_volatility: Some(0.183),
            volume: Some(12),
            ..OptionLeg::at_strike(550.0)
        };
        let row = LegRow::from(&leg);
        assert_eq!(row.strike, "550.00");
        assert_eq!(row.bid, "1.25");
        assert_eq!(row.ask, "-");
        assert_eq!(row.volume, "12");
        assert_eq!(row.open_interest, "-");
        assert_eq!(row.iv, "18.3");
        assert_eq!(row.delta, "-");
    }

    #[test]
    fn displayed_symbol_matches_gateway_key() {
        let raw = " brk.b ";
        let keyed = Symbol::parse(raw).unwrap();
        assert_eq!(display_symbol(raw), keyed.as_str());
        assert_eq!(display_symbol(raw), "BRK.B");
    }
}
