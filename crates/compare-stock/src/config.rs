//! Configuration for company comparison

use crate::api::Market;
use crate::error::{Result, StockError};
use crate::language::Language;
use compare_utils::{lookup_parse, lookup_string};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Model used for commentary unless overridden
pub const DEFAULT_MODEL: &str = "llama3-70b-8192";

/// Upper bound on attempts per request
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Default location of the session file, relative to the working directory
pub const DEFAULT_SESSION_PATH: &str = ".stock-compare/session.json";

/// Data provider for company fundamentals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DataProvider {
    /// Yahoo Finance quote summary (default, no API key required)
    #[default]
    Yahoo,
    /// Offline directory of JSON info objects
    SnapshotDir,
}

/// Configuration for comparison runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareConfig {
    /// Data provider to use
    pub default_provider: DataProvider,

    /// Directory read by [`DataProvider::SnapshotDir`]
    pub snapshot_dir: Option<PathBuf>,

    /// Cache TTL for fundamentals
    pub cache_ttl_fundamental: Duration,

    /// Maximum number of attempts for API calls
    pub max_retries: u32,

    /// Initial backoff duration for retries
    pub retry_backoff_base: Duration,

    /// Request timeout duration
    pub request_timeout: Duration,

    /// Outgoing data requests allowed per second
    pub requests_per_second: u32,

    /// LLM model identifier
    pub model: String,

    /// Sampling temperature for commentary
    pub temperature: f32,

    /// Token budget of the comparison commentary
    pub comparison_max_tokens: usize,

    /// Token budget of a follow-up answer
    pub question_max_tokens: usize,

    /// Language of labels and prompts
    pub language: Language,

    /// Exchange bare tickers are qualified with
    pub market: Market,

    /// Where the last comparison is persisted
    pub session_path: PathBuf,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            default_provider: DataProvider::Yahoo,
            snapshot_dir: None,
            cache_ttl_fundamental: Duration::from_secs(3600), // 1 hour
            max_retries: 3,
            retry_backoff_base: Duration::from_secs(1),
            request_timeout: Duration::from_secs(30),
            requests_per_second: 2,
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            comparison_max_tokens: 800,
            question_max_tokens: 500,
            language: Language::French,
            market: Market::Us,
            session_path: PathBuf::from(DEFAULT_SESSION_PATH),
        }
    }
}

impl CompareConfig {
    /// Create a new configuration builder
    pub fn builder() -> CompareConfigBuilder {
        CompareConfigBuilder::default()
    }

    /// Defaults overridden by `STOCK_COMPARE_*` and `LLM_MODEL` variables
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env().build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.default_provider == DataProvider::SnapshotDir && self.snapshot_dir.is_none() {
            return Err(StockError::ConfigError(
                "snapshot_dir required when using the SnapshotDir provider".to_string(),
            ));
        }

        if self.max_retries == 0 {
            return Err(StockError::ConfigError(
                "max_retries must be greater than 0".to_string(),
            ));
        }

        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(StockError::ConfigError(format!(
                "max_retries must be at most {MAX_RETRIES_LIMIT}, got {}",
                self.max_retries
            )));
        }

        if self.requests_per_second == 0 {
            return Err(StockError::ConfigError(
                "requests_per_second must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(StockError::ConfigError(format!(
                "temperature must be within [0, 2], got {}",
                self.temperature
            )));
        }

        if self.comparison_max_tokens == 0 || self.question_max_tokens == 0 {
            return Err(StockError::ConfigError(
                "token budgets must be greater than 0".to_string(),
            ));
        }

        if self.model.trim().is_empty() {
            return Err(StockError::ConfigError("model must not be empty".to_string()));
        }

        Ok(())
    }

    /// Get retry backoff duration for attempt number
    pub fn retry_backoff(&self, attempt: u32) -> Duration {
        let factor = 2_u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.retry_backoff_base.saturating_mul(factor)
    }
}

/// Builder for CompareConfig
#[derive(Debug, Default)]
pub struct CompareConfigBuilder {
    default_provider: Option<DataProvider>,
    snapshot_dir: Option<PathBuf>,
    cache_ttl_fundamental: Option<Duration>,
    max_retries: Option<u32>,
    retry_backoff_base: Option<Duration>,
    request_timeout: Option<Duration>,
    requests_per_second: Option<u32>,
    model: Option<String>,
    temperature: Option<f32>,
    comparison_max_tokens: Option<usize>,
    question_max_tokens: Option<usize>,
    language: Option<Language>,
    market: Option<Market>,
    session_path: Option<PathBuf>,
}

impl CompareConfigBuilder {
    /// Set the data provider
    pub fn default_provider(mut self, provider: DataProvider) -> Self {
        self.default_provider = Some(provider);
        self
    }

    /// Read fundamentals from a directory of JSON files
    pub fn snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = Some(dir.into());
        self.default_provider = Some(DataProvider::SnapshotDir);
        self
    }

    /// Set cache TTL for fundamentals
    pub fn cache_ttl_fundamental(mut self, duration: Duration) -> Self {
        self.cache_ttl_fundamental = Some(duration);
        self
    }

    /// Set maximum retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Set retry backoff base duration
    pub fn retry_backoff_base(mut self, duration: Duration) -> Self {
        self.retry_backoff_base = Some(duration);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the outgoing request rate
    pub fn requests_per_second(mut self, rate: u32) -> Self {
        self.requests_per_second = Some(rate);
        self
    }

    /// Set the LLM model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the comparison token budget
    pub fn comparison_max_tokens(mut self, tokens: usize) -> Self {
        self.comparison_max_tokens = Some(tokens);
        self
    }

    /// Set the follow-up token budget
    pub fn question_max_tokens(mut self, tokens: usize) -> Self {
        self.question_max_tokens = Some(tokens);
        self
    }

    /// Set the output language
    pub fn language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    /// Set the market bare tickers belong to
    pub fn market(mut self, market: Market) -> Self {
        self.market = Some(market);
        self
    }

    /// Set the session file location
    pub fn session_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_path = Some(path.into());
        self
    }

    /// Fill unset fields from the environment
    pub fn with_env(self) -> Self {
        self.with_lookup(|key| std::env::var(key).ok())
    }

    /// Fill unset fields from `lookup`; values already set on the builder win
    pub fn with_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let string = |key: &str| lookup_string(&lookup, key);

        if self.snapshot_dir.is_none() {
            if let Some(dir) = string("STOCK_COMPARE_SNAPSHOT_DIR") {
                self = self.snapshot_dir(dir);
            }
        }
        self.model = self.model.or_else(|| string("LLM_MODEL"));
        self.temperature = self
            .temperature
            .or_else(|| lookup_parse(&lookup, "STOCK_COMPARE_TEMPERATURE"));
        self.language = self
            .language
            .or_else(|| lookup_parse(&lookup, "STOCK_COMPARE_LANG"));
        self.market = self
            .market
            .or_else(|| lookup_parse(&lookup, "STOCK_COMPARE_MARKET"));
        self.session_path = self
            .session_path
            .or_else(|| string("STOCK_COMPARE_SESSION").map(PathBuf::from));
        self.max_retries = self
            .max_retries
            .or_else(|| lookup_parse(&lookup, "STOCK_COMPARE_MAX_RETRIES"));
        self.cache_ttl_fundamental = self.cache_ttl_fundamental.or_else(|| {
            lookup_parse(&lookup, "STOCK_COMPARE_CACHE_TTL_SECS").map(Duration::from_secs)
        });
        self.request_timeout = self.request_timeout.or_else(|| {
            lookup_parse(&lookup, "STOCK_COMPARE_TIMEOUT_SECS").map(Duration::from_secs)
        });
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<CompareConfig> {
        let defaults = CompareConfig::default();

        let config = CompareConfig {
            default_provider: self.default_provider.unwrap_or(defaults.default_provider),
            snapshot_dir: self.snapshot_dir,
            cache_ttl_fundamental: self
                .cache_ttl_fundamental
                .unwrap_or(defaults.cache_ttl_fundamental),
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            retry_backoff_base: self.retry_backoff_base.unwrap_or(defaults.retry_backoff_base),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            requests_per_second: self
                .requests_per_second
                .unwrap_or(defaults.requests_per_second),
            model: self.model.unwrap_or(defaults.model),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            comparison_max_tokens: self
                .comparison_max_tokens
                .unwrap_or(defaults.comparison_max_tokens),
            question_max_tokens: self
                .question_max_tokens
                .unwrap_or(defaults.question_max_tokens),
            language: self.language.unwrap_or(defaults.language),
            market: self.market.unwrap_or(defaults.market),
            session_path: self.session_path.unwrap_or(defaults.session_path),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CompareConfig::default();
        assert_eq!(config.default_provider, DataProvider::Yahoo);
        assert_eq!(config.model, "llama3-70b-8192");
        assert_eq!(config.comparison_max_tokens, 800);
        assert_eq!(config.question_max_tokens, 500);
        assert_eq!(config.language, Language::French);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = CompareConfig::builder()
            .max_retries(5)
            .request_timeout(Duration::from_secs(60))
            .language(Language::English)
            .market(Market::Paris)
            .model("llama-3.3-70b-versatile")
            .build()
            .unwrap();

        assert_eq!(config.max_retries, 5);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.language, Language::English);
        assert_eq!(config.market, Market::Paris);
        assert_eq!(config.model, "llama-3.3-70b-versatile");
    }

    #[test]
    fn test_snapshot_dir_selects_provider() {
        let config = CompareConfig::builder()
            .snapshot_dir("fixtures")
            .build()
            .unwrap();
        assert_eq!(config.default_provider, DataProvider::SnapshotDir);
        assert_eq!(config.snapshot_dir, Some(PathBuf::from("fixtures")));
    }

    #[test]
    fn test_validation_snapshot_dir_missing() {
        let config = CompareConfig {
            default_provider: DataProvider::SnapshotDir,
            snapshot_dir: None,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(CompareConfig::builder().max_retries(0).build().is_err());
        assert!(CompareConfig::builder().temperature(2.5).build().is_err());
        assert!(CompareConfig::builder().temperature(-0.1).build().is_err());
        assert!(CompareConfig::builder().question_max_tokens(0).build().is_err());
        assert!(CompareConfig::builder().requests_per_second(0).build().is_err());
        assert!(CompareConfig::builder().model(" ").build().is_err());
    }

    #[test]
    fn test_retry_backoff() {
        let config = CompareConfig::default();
        assert_eq!(config.retry_backoff(0), Duration::from_secs(1));
        assert_eq!(config.retry_backoff(1), Duration::from_secs(2));
        assert_eq!(config.retry_backoff(2), Duration::from_secs(4));
    }

    #[test]
    fn test_retry_backoff_saturates() {
        let config = CompareConfig::default();
        assert_eq!(
            config.retry_backoff(38),
            Duration::from_secs(1).saturating_mul(u32::MAX)
        );
        assert!(config.retry_backoff(u32::MAX) >= config.retry_backoff(31));
    }

    #[test]
    fn test_validation_caps_max_retries() {
        assert!(CompareConfig::builder().max_retries(MAX_RETRIES_LIMIT).build().is_ok());
        assert!(CompareConfig::builder().max_retries(40).build().is_err());
    }

    fn vars(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
        }
    }

    #[test]
    fn test_lookup_fills_unset_fields() {
        let config = CompareConfig::builder()
            .with_lookup(vars(&[
                ("LLM_MODEL", "llama-3.3-70b-versatile"),
                ("STOCK_COMPARE_TEMPERATURE", "0.2"),
                ("STOCK_COMPARE_LANG", "en"),
                ("STOCK_COMPARE_MARKET", "paris"),
                ("STOCK_COMPARE_SESSION", "/tmp/compare.json"),
                ("STOCK_COMPARE_MAX_RETRIES", "5"),
                ("STOCK_COMPARE_CACHE_TTL_SECS", "60"),
                ("STOCK_COMPARE_TIMEOUT_SECS", "5"),
            ]))
            .build()
            .unwrap();

        assert_eq!(config.model, "llama-3.3-70b-versatile");
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.language, Language::English);
        assert_eq!(config.market, Market::Paris);
        assert_eq!(config.session_path, PathBuf::from("/tmp/compare.json"));
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.cache_ttl_fundamental, Duration::from_secs(60));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.default_provider, DataProvider::Yahoo);
    }

    #[test]
    fn test_builder_values_beat_lookup() {
        let config = CompareConfig::builder()
            .model("mixtral-8x7b-32768")
            .language(Language::French)
            .snapshot_dir("fixtures")
            .with_lookup(vars(&[
                ("LLM_MODEL", "llama-3.3-70b-versatile"),
                ("STOCK_COMPARE_LANG", "en"),
                ("STOCK_COMPARE_SNAPSHOT_DIR", "elsewhere"),
            ]))
            .build()
            .unwrap();

        assert_eq!(config.model, "mixtral-8x7b-32768");
        assert_eq!(config.language, Language::French);
        assert_eq!(config.snapshot_dir, Some(PathBuf::from("fixtures")));
    }

    #[test]
    fn test_lookup_snapshot_dir_switches_provider() {
        let config = CompareConfig::builder()
            .with_lookup(vars(&[("STOCK_COMPARE_SNAPSHOT_DIR", "demos/snapshots")]))
            .build()
            .unwrap();
        assert_eq!(config.default_provider, DataProvider::SnapshotDir);
        assert_eq!(config.snapshot_dir, Some(PathBuf::from("demos/snapshots")));
    }

    #[test]
    fn test_lookup_ignores_unparseable_values() {
        let config = CompareConfig::builder()
            .with_lookup(vars(&[
                ("STOCK_COMPARE_TEMPERATURE", "warm"),
                ("STOCK_COMPARE_MAX_RETRIES", "-1"),
                ("LLM_MODEL", "   "),
            ]))
            .build()
            .unwrap();
        let defaults = CompareConfig::default();
        assert_eq!(config.temperature, defaults.temperature);
        assert_eq!(config.max_retries, defaults.max_retries);
        assert_eq!(config.model, DEFAULT_MODEL);
    }
}
