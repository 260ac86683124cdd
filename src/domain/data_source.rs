use {
    serde::{Deserialize, Serialize},
    strum_macros::{Display, EnumIter, EnumString},
};

use crate::config::constants::{AVAILABLE_SYMBOLS_BINANCE, AVAILABLE_SYMBOLS_BINGX};

/// Exchange feeding the chart.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DataSource {
    #[default]
    Binance,
    Bingx,
}

/// Symbols that exist on both exchanges under different spellings.
const SYMBOL_ALIASES: &[(&str, &str)] = &[
    ("BTCUSDT", "BTC-USDT"),
    ("ETHUSDT", "ETH-USDT"),
    ("SOLUSDT", "SOL-USDT"),
];

impl DataSource {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Binance => "Binance",
            Self::Bingx => "BingX Futures",
        }
    }

    pub fn available_symbols(&self) -> &'static [&'static str] {
        match self {
            Self::Binance => AVAILABLE_SYMBOLS_BINANCE,
            Self::Bingx => AVAILABLE_SYMBOLS_BINGX,
        }
    }

    /// Uppercases `symbol` and rewrites the known cross-exchange aliases into
    /// this exchange's spelling (`BTCUSDT` <-> `BTC-USDT`). Unknown symbols pass through.
    pub fn consistent_symbol(&self, symbol: &str) -> String {
        let upper = symbol.trim().to_uppercase();
        for &(binance, bingx) in SYMBOL_ALIASES {
            match self {
                Self::Bingx if upper == binance => return bingx.to_string(),
                Self::Binance if upper == bingx => return binance.to_string(),
                _ => {}
            }
        }
        upper
    }
}

/// Human-facing pair notation used in prompts: `BTC-USDT` and `BTCUSDT` both become `BTC/USDT`.
pub fn display_symbol(symbol: &str) -> String {
    if symbol.contains('-') {
        symbol.replacen('-', "/", 1)
    } else if let Some(base) = symbol.strip_suffix("USDT") {
        format!("{}/USDT", base)
    } else {
        symbol.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn aliases_follow_the_exchange() {
        assert_eq!(DataSource::Bingx.consistent_symbol("btcusdt"), "BTC-USDT");
        assert_eq!(DataSource::Binance.consistent_symbol("ETH-USDT"), "ETHUSDT");
        assert_eq!(DataSource::Binance.consistent_symbol("adausdt"), "ADAUSDT");
        assert_eq!(DataSource::Bingx.consistent_symbol("XAUUSD"), "XAUUSD");
    }

    #[test]
    fn display_symbol_uses_slash() {
        assert_eq!(display_symbol("BTC-USDT"), "BTC/USDT");
        assert_eq!(display_symbol("SOLUSDT"), "SOL/USDT");
        assert_eq!(display_symbol("EURUSD"), "EURUSD");
    }

    #[test]
    fn parses_from_lowercase_names() {
        assert_eq!(DataSource::from_str("bingx").ok(), Some(DataSource::Bingx));
        assert_eq!(DataSource::from_str("Binance").ok(), Some(DataSource::Binance));
        assert_eq!(DataSource::Binance.to_string(), "binance");
    }
}
