//! Company fundamentals as returned by a data source

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Currency shown when the provider does not report one
pub const DEFAULT_CURRENCY: &str = "USD";

/// Provider keys of the numeric fields, in the "info" object layout.
pub mod keys {
    pub const SHORT_NAME: &str = "shortName";
    pub const SECTOR: &str = "sector";
    pub const INDUSTRY: &str = "industry";
    pub const CURRENCY: &str = "currency";
    pub const CURRENT_PRICE: &str = "currentPrice";
    pub const MARKET_CAP: &str = "marketCap";
    pub const TOTAL_REVENUE: &str = "totalRevenue";
    pub const NET_INCOME: &str = "netIncomeToCommon";
    pub const TRAILING_EPS: &str = "trailingEps";
    pub const TRAILING_PE: &str = "trailingPE";
    pub const RETURN_ON_EQUITY: &str = "returnOnEquity";
    pub const TOTAL_DEBT: &str = "totalDebt";
    pub const STOCKHOLDERS_EQUITY: &str = "totalStockholdersEquity";
    pub const FREE_CASHFLOW: &str = "freeCashflow";
}

/// Fundamentals of one company.
///
/// Every figure is optional: providers routinely omit fields for banks,
/// recent IPOs or foreign listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    pub symbol: String,
    pub short_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub currency: Option<String>,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub total_revenue: Option<f64>,
    pub net_income_to_common: Option<f64>,
    pub trailing_eps: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub total_debt: Option<f64>,
    pub total_stockholders_equity: Option<f64>,
    pub free_cashflow: Option<f64>,
    /// Provider keys whose value was present but not numeric
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub malformed: BTreeSet<String>,
}

impl FinancialSnapshot {
    /// Create an empty snapshot for a symbol
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    /// Build a snapshot from a flat info object.
    ///
    /// Numbers may be JSON numbers or numeric strings. `null`, absent keys
    /// and empty strings are missing. Anything else is recorded in
    /// [`malformed`](Self::malformed) and treated as missing.
    pub fn from_info(symbol: impl Into<String>, info: &Value) -> Self {
        let mut malformed = BTreeSet::new();
        let mut number = |key: &str| read_number(info, key, &mut malformed);

        let current_price = number(keys::CURRENT_PRICE);
        let market_cap = number(keys::MARKET_CAP);
        let total_revenue = number(keys::TOTAL_REVENUE);
        let net_income_to_common = number(keys::NET_INCOME);
        let trailing_eps = number(keys::TRAILING_EPS);
        let trailing_pe = number(keys::TRAILING_PE);
        let return_on_equity = number(keys::RETURN_ON_EQUITY);
        let total_debt = number(keys::TOTAL_DEBT);
        let total_stockholders_equity = number(keys::STOCKHOLDERS_EQUITY);
        let free_cashflow = number(keys::FREE_CASHFLOW);

        Self {
            symbol: symbol.into(),
            short_name: read_text(info, keys::SHORT_NAME),
            sector: read_text(info, keys::SECTOR),
            industry: read_text(info, keys::INDUSTRY),
            currency: read_text(info, keys::CURRENCY),
            current_price,
            market_cap,
            total_revenue,
            net_income_to_common,
            trailing_eps,
            trailing_pe,
            return_on_equity,
            total_debt,
            total_stockholders_equity,
            free_cashflow,
            malformed,
        }
    }

    /// Company name, or the symbol when the provider has none
    pub fn display_name(&self) -> &str {
        self.short_name.as_deref().unwrap_or(&self.symbol)
    }

    /// Reporting currency, defaulting to USD
    pub fn currency_label(&self) -> &str {
        self.currency.as_deref().unwrap_or(DEFAULT_CURRENCY)
    }

    /// Whether the provider key held an unusable value
    pub fn is_malformed(&self, key: &str) -> bool {
        self.malformed.contains(key)
    }

    /// True when the provider returned nothing usable for this symbol
    pub fn is_empty(&self) -> bool {
        self.short_name.is_none()
            && self.malformed.is_empty()
            && [
                self.current_price,
                self.market_cap,
                self.total_revenue,
                self.net_income_to_common,
                self.trailing_eps,
                self.trailing_pe,
                self.return_on_equity,
                self.total_debt,
                self.total_stockholders_equity,
                self.free_cashflow,
            ]
            .iter()
            .all(Option::is_none)
    }
}

fn read_number(info: &Value, key: &str, malformed: &mut BTreeSet<String>) -> Option<f64> {
    match info.get(key)? {
        Value::Null => None,
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => s.trim().parse().ok().or_else(|| {
            malformed.insert(key.to_string());
            None
        }),
        _ => {
            malformed.insert(key.to_string());
            None
        }
    }
}

fn read_text(info: &Value, key: &str) -> Option<String> {
    info.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_info_reads_all_fields() {
        let info = json!({
            "shortName": "Apple Inc.",
            "sector": "Technology",
            "industry": "Consumer Electronics",
            "currentPrice": 189.5,
            "marketCap": 2_950_000_000_000_i64,
            "totalRevenue": 383_285_000_000_i64,
            "netIncomeToCommon": 96_995_000_000_i64,
            "trailingEps": 6.13,
            "trailingPE": 30.9,
            "returnOnEquity": 1.56,
            "totalDebt": 111_088_000_000_i64,
            "freeCashflow": 84_726_000_000_i64
        });

        let snapshot = FinancialSnapshot::from_info("AAPL", &info);
        assert_eq!(snapshot.display_name(), "Apple Inc.");
        assert_eq!(snapshot.sector.as_deref(), Some("Technology"));
        assert_eq!(snapshot.current_price, Some(189.5));
        assert_eq!(snapshot.total_revenue, Some(383_285_000_000.0));
        assert_eq!(snapshot.total_stockholders_equity, None);
        assert_eq!(snapshot.currency_label(), "USD");
        assert!(snapshot.malformed.is_empty());
        assert!(!snapshot.is_empty());
    }

    #[test]
    fn test_numeric_strings_and_nulls() {
        let info = json!({
            "totalRevenue": "1000",
            "netIncomeToCommon": null,
            "totalDebt": "",
            "freeCashflow": " -25.5 "
        });
        let snapshot = FinancialSnapshot::from_info("X", &info);
        assert_eq!(snapshot.total_revenue, Some(1000.0));
        assert_eq!(snapshot.net_income_to_common, None);
        assert_eq!(snapshot.total_debt, None);
        assert_eq!(snapshot.free_cashflow, Some(-25.5));
        assert!(snapshot.malformed.is_empty());
    }

    #[test]
    fn test_malformed_values_are_recorded() {
        let info = json!({
            "returnOnEquity": "n/a",
            "totalDebt": {"raw": 10},
            "marketCap": [1, 2]
        });
        let snapshot = FinancialSnapshot::from_info("X", &info);
        assert_eq!(snapshot.return_on_equity, None);
        assert!(snapshot.is_malformed(keys::RETURN_ON_EQUITY));
        assert!(snapshot.is_malformed(keys::TOTAL_DEBT));
        assert!(snapshot.is_malformed(keys::MARKET_CAP));
        assert!(!snapshot.is_empty());
    }

    #[test]
    fn test_display_name_falls_back_to_symbol() {
        let snapshot = FinancialSnapshot::from_info("TSLA", &json!({"shortName": "  "}));
        assert_eq!(snapshot.display_name(), "TSLA");
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_non_object_info_is_empty() {
        let snapshot = FinancialSnapshot::from_info("X", &json!([]));
        assert!(snapshot.is_empty());
    }
}
