//! CLI output helpers: human-readable text or one JSON document per command.

use std::fmt::Display;
use std::sync::OnceLock;

use serde::Serialize;

use crate::error::Result;

const RULE_WIDTH: usize = 56;

static JSON: OnceLock<bool> = OnceLock::new();

/// Select the output mode. Only the first call has an effect.
pub fn configure(json: bool) {
    let _ = JSON.set(json);
}

/// Return whether machine-readable JSON output is enabled.
#[must_use]
pub fn is_json() -> bool {
    JSON.get().copied().unwrap_or(false)
}

/// Print `value` as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if `value` fails to serialize.
pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a section header and separator.
pub fn section(title: &str) {
    println!();
    println!("{title}");
    println!("{}", "─".repeat(RULE_WIDTH));
}

/// Print a simple key/value line.
pub fn key_value(label: &str, value: impl Display) {
    println!("{label:<14} {value}");
}

/// Format an optional number, `-` when absent.
#[must_use]
pub fn number(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.decimals$}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_formats_or_dashes() {
        assert_eq!(number(Some(550.1234), 2), "550.12");
        assert_eq!(number(None, 2), "-");
    }
}
