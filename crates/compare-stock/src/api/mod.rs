//! Data sources for company fundamentals

pub mod cached;
pub mod snapshot_dir;
pub mod yahoo;

pub use cached::CachedSource;
pub use snapshot_dir::SnapshotDirSource;
pub use yahoo::YahooClient;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::{Result, StockError};
use crate::snapshot::FinancialSnapshot;

/// Something that can produce a [`FinancialSnapshot`] for a ticker
#[async_trait]
pub trait FundamentalsSource: Send + Sync {
    /// Fetch the fundamentals of an already validated symbol
    async fn fetch(&self, symbol: &str) -> Result<FinancialSnapshot>;

    /// Source name for logs and reports
    fn name(&self) -> &str;
}

static SYMBOL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z0-9^][A-Z0-9.\-^=]{0,14}$").expect("symbol pattern is valid")
});

/// Normalise a user-typed ticker: trim and uppercase, then check its shape.
pub fn validate_symbol(raw: &str) -> Result<String> {
    let symbol = raw.trim().to_uppercase();
    if SYMBOL_RE.is_match(&symbol) {
        Ok(symbol)
    } else {
        Err(StockError::InvalidSymbol(raw.trim().to_string()))
    }
}

/// Exchange a bare ticker is listed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Market {
    #[default]
    Us,
    Paris,
    London,
    Frankfurt,
    Amsterdam,
    Milan,
    Toronto,
    Tokyo,
    HongKong,
}

impl Market {
    pub const ALL: [Market; 9] = [
        Market::Us,
        Market::Paris,
        Market::London,
        Market::Frankfurt,
        Market::Amsterdam,
        Market::Milan,
        Market::Toronto,
        Market::Tokyo,
        Market::HongKong,
    ];

    /// Exchange suffix appended to bare tickers
    pub fn suffix(self) -> &'static str {
        match self {
            Market::Us => "",
            Market::Paris => ".PA",
            Market::London => ".L",
            Market::Frankfurt => ".DE",
            Market::Amsterdam => ".AS",
            Market::Milan => ".MI",
            Market::Toronto => ".TO",
            Market::Tokyo => ".T",
            Market::HongKong => ".HK",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Market::Us => "us",
            Market::Paris => "paris",
            Market::London => "london",
            Market::Frankfurt => "frankfurt",
            Market::Amsterdam => "amsterdam",
            Market::Milan => "milan",
            Market::Toronto => "toronto",
            Market::Tokyo => "tokyo",
            Market::HongKong => "hong-kong",
        }
    }

    /// Append the exchange suffix unless the ticker already names one.
    ///
    /// Indices (`^FCHI`) and currency/commodity pairs (`EURUSD=X`) are
    /// left alone.
    pub fn qualify(self, symbol: &str) -> String {
        if symbol.contains('.') || symbol.starts_with('^') || symbol.contains('=') {
            symbol.to_string()
        } else {
            format!("{symbol}{}", self.suffix())
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Market {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['_', ' '], "-");
        Market::ALL
            .into_iter()
            .find(|m| {
                let suffix = m.suffix().trim_start_matches('.');
                m.code() == wanted || (!suffix.is_empty() && suffix.eq_ignore_ascii_case(&wanted))
            })
            .ok_or_else(|| {
                let known: Vec<_> = Market::ALL.iter().map(|m| m.code()).collect();
                format!("unknown market: {s} (expected one of {})", known.join(", "))
            })
    }
}
