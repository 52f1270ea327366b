//! Yahoo Finance client
//!
//! Fundamentals come from the quote-summary endpoint, whose modules are
//! flattened into the info-object layout understood by
//! [`FinancialSnapshot::from_info`]. The latest close from
//! `yahoo_finance_api` fills in the price when the summary lacks one.

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use url::Url;
use yahoo_finance_api as yahoo;

use super::FundamentalsSource;
use crate::config::CompareConfig;
use crate::error::{Result, StockError};
use crate::snapshot::{keys, FinancialSnapshot};

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) stock-compare";
const MODULES: &str =
    "price,summaryProfile,summaryDetail,financialData,defaultKeyStatistics,balanceSheetHistory";

/// Info key and the JSON pointers tried in order inside a summary result
const FIELD_MAP: &[(&str, &[&str])] = &[
    (keys::SHORT_NAME, &["/price/shortName", "/price/longName"]),
    (keys::CURRENCY, &["/price/currency", "/financialData/financialCurrency"]),
    (keys::SECTOR, &["/summaryProfile/sector"]),
    (keys::INDUSTRY, &["/summaryProfile/industry"]),
    (
        keys::CURRENT_PRICE,
        &["/financialData/currentPrice", "/price/regularMarketPrice"],
    ),
    (keys::MARKET_CAP, &["/price/marketCap", "/summaryDetail/marketCap"]),
    (keys::TOTAL_REVENUE, &["/financialData/totalRevenue"]),
    (keys::NET_INCOME, &["/defaultKeyStatistics/netIncomeToCommon"]),
    (keys::TRAILING_EPS, &["/defaultKeyStatistics/trailingEps"]),
    (keys::TRAILING_PE, &["/summaryDetail/trailingPE"]),
    (keys::RETURN_ON_EQUITY, &["/financialData/returnOnEquity"]),
    (keys::TOTAL_DEBT, &["/financialData/totalDebt"]),
    (keys::FREE_CASHFLOW, &["/financialData/freeCashflow"]),
    (
        keys::STOCKHOLDERS_EQUITY,
        &["/balanceSheetHistory/balanceSheetStatements/0/totalStockholderEquity"],
    ),
];

/// Yahoo Finance fundamentals client
pub struct YahooClient {
    client: Client,
    base_url: String,
    rate_limiter: SharedRateLimiter,
    max_retries: u32,
    config: CompareConfig,
    cookie: Option<String>,
    crumb: Option<String>,
}

impl YahooClient {
    /// Create a client honouring the retry, timeout and rate settings.
    ///
    /// `YAHOO_COOKIE` and `YAHOO_CRUMB` are attached to requests when set;
    /// Yahoo may refuse quote-summary calls without them.
    pub fn new(config: &CompareConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        let rate = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(rate)));

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            rate_limiter,
            max_retries: config.max_retries.max(1),
            config: config.clone(),
            cookie: compare_utils::env_string("YAHOO_COOKIE"),
            crumb: compare_utils::env_string("YAHOO_CRUMB"),
        })
    }

    /// Point the client at another host (proxies, test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Attach a session cookie and crumb, overriding `YAHOO_COOKIE`/`YAHOO_CRUMB`
    pub fn with_credentials(mut self, cookie: impl Into<String>, crumb: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self.crumb = Some(crumb.into());
        self
    }

    fn summary_url(&self, symbol: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| StockError::ConfigError(format!("invalid Yahoo base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| StockError::ConfigError("Yahoo base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["v10", "finance", "quoteSummary", symbol]);
        url.query_pairs_mut().append_pair("modules", MODULES);
        if let Some(crumb) = &self.crumb {
            url.query_pairs_mut().append_pair("crumb", crumb);
        }
        Ok(url)
    }

    /// Fetch the raw quote-summary document, retrying transient failures
    async fn quote_summary(&self, symbol: &str) -> Result<Value> {
        let url = self.summary_url(symbol)?;
        let mut last_error = None;

        for attempt in 0..self.max_retries {
            if attempt > 0 {
                let delay = self.config.retry_backoff(attempt - 1);
                debug!("Retrying {} in {:?} (attempt {})", symbol, delay, attempt + 1);
                tokio::time::sleep(delay).await;
            }

            self.rate_limiter.until_ready().await;

            let mut request = self.client.get(url.clone());
            if let Some(cookie) = &self.cookie {
                request = request.header(reqwest::header::COOKIE, cookie);
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    warn!("Yahoo request for {} failed: {}", symbol, e);
                    last_error = Some(StockError::NetworkError(e));
                    continue;
                }
            };

            let status = response.status();
            if status.is_success() {
                return Ok(response.json().await?);
            }

            let body = response.text().await.unwrap_or_default();
            match status {
                StatusCode::NOT_FOUND => {
                    // Yahoo answers 404 with a JSON error for unknown tickers
                    return serde_json::from_str(&body)
                        .map_err(|_| StockError::InvalidSymbol(symbol.to_string()));
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    last_error = Some(StockError::RateLimitExceeded {
                        provider: "Yahoo Finance".to_string(),
                    });
                }
                s if s.is_server_error() => {
                    last_error = Some(StockError::YahooFinanceError(format!("HTTP {s}: {body}")));
                }
                s => {
                    return Err(StockError::YahooFinanceError(format!("HTTP {s}: {body}")));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            StockError::YahooFinanceError(format!("no response for {symbol}"))
        }))
    }

    /// Close of the latest daily bar
    async fn latest_close(&self, symbol: &str) -> Result<f64> {
        self.rate_limiter.until_ready().await;

        let provider = yahoo::YahooConnector::new()
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;
        let response = provider
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;
        let quote = response
            .last_quote()
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        Ok(quote.close)
    }
}

#[async_trait]
impl FundamentalsSource for YahooClient {
    #[instrument(skip(self))]
    async fn fetch(&self, symbol: &str) -> Result<FinancialSnapshot> {
        let document = self.quote_summary(symbol).await?;
        let info = flatten_quote_summary(symbol, &document)?;
        let mut snapshot = FinancialSnapshot::from_info(symbol, &info);

        if snapshot.current_price.is_none() {
            match self.latest_close(symbol).await {
                Ok(close) => {
                    debug!("Using latest close {} as price for {}", close, symbol);
                    snapshot.current_price = Some(close);
                }
                Err(e) => warn!("No price available for {}: {}", symbol, e),
            }
        }

        if snapshot.is_empty() {
            return Err(StockError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "Yahoo Finance returned no fundamentals".to_string(),
            });
        }

        Ok(snapshot)
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}

/// Turn a quote-summary document into a flat info object.
pub fn flatten_quote_summary(symbol: &str, document: &Value) -> Result<Value> {
    let summary = document.get("quoteSummary").ok_or_else(|| {
        StockError::YahooFinanceError("response has no quoteSummary".to_string())
    })?;

    if let Some(error) = summary.get("error").filter(|e| !e.is_null()) {
        let description = error
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(
            if error.get("code").and_then(Value::as_str) == Some("Not Found") {
                StockError::InvalidSymbol(symbol.to_string())
            } else {
                StockError::YahooFinanceError(description.to_string())
            },
        );
    }

    let result = summary
        .pointer("/result/0")
        .ok_or_else(|| StockError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: "empty quote summary".to_string(),
        })?;

    let mut info = Map::new();
    for (key, pointers) in FIELD_MAP {
        if let Some(value) = pointers
            .iter()
            .filter_map(|p| result.pointer(p))
            .map(unwrap_raw)
            .find(|v| !v.is_null())
        {
            info.insert((*key).to_string(), value);
        }
    }

    Ok(Value::Object(info))
}

/// Yahoo wraps numbers as `{"raw": 1.0, "fmt": "1.00"}` and missing ones
/// as `{}`.
fn unwrap_raw(value: &Value) -> Value {
    match value {
        Value::Object(map) => map.get("raw").cloned().unwrap_or(Value::Null),
        other => other.clone(),
    }
}
