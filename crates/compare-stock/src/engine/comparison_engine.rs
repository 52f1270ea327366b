//! Comparison engine: fetch, score, chart and commentary

use compare_llm::{CompletionRequest, LLMProvider, Message};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::api::{
    validate_symbol, CachedSource, FundamentalsSource, SnapshotDirSource, YahooClient,
};
use crate::config::{CompareConfig, DataProvider};
use crate::error::{Result, StockError};
use crate::prompts::PromptLibrary;
use crate::report::{AiCommentary, CompanyProfile, ComparisonReport};
use crate::session::Session;
use crate::snapshot::FinancialSnapshot;

/// Orchestrates a comparison of two companies
pub struct ComparisonEngine {
    source: Arc<dyn FundamentalsSource>,
    llm: Option<Arc<dyn LLMProvider>>,
    prompts: PromptLibrary,
    config: CompareConfig,
}

impl ComparisonEngine {
    pub fn new(
        source: Arc<dyn FundamentalsSource>,
        llm: Option<Arc<dyn LLMProvider>>,
        config: CompareConfig,
    ) -> Result<Self> {
        config.validate()?;
        let prompts = PromptLibrary::new(config.language)?;
        Ok(Self {
            source,
            llm,
            prompts,
            config,
        })
    }

    /// Build the configured data source behind a TTL cache.
    pub fn from_config(config: CompareConfig, llm: Option<Arc<dyn LLMProvider>>) -> Result<Self> {
        let ttl = config.cache_ttl_fundamental;
        let source: Arc<dyn FundamentalsSource> = match config.default_provider {
            DataProvider::Yahoo => Arc::new(CachedSource::new(YahooClient::new(&config)?, ttl)),
            DataProvider::SnapshotDir => {
                let dir = config.snapshot_dir.clone().ok_or_else(|| {
                    StockError::ConfigError("snapshot_dir is not set".to_string())
                })?;
                Arc::new(CachedSource::new(SnapshotDirSource::new(dir), ttl))
            }
        };
        info!("Using {} for fundamentals", source.name());
        Self::new(source, llm, config)
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }

    /// Validate a ticker and qualify it with the configured market
    pub fn resolve_symbol(&self, raw: &str) -> Result<String> {
        let symbol = validate_symbol(raw)?;
        Ok(self.config.market.qualify(&symbol))
    }

    /// Fetch the fundamentals of one ticker
    #[instrument(skip(self))]
    pub async fn fetch(&self, raw: &str) -> Result<FinancialSnapshot> {
        let symbol = self.resolve_symbol(raw)?;
        debug!("Fetching {} from {}", symbol, self.source.name());

        let snapshot = self.source.fetch(&symbol).await?;
        if snapshot.is_empty() {
            return Err(StockError::DataUnavailable {
                symbol,
                reason: format!("{} returned no usable figures", self.source.name()),
            });
        }
        if !snapshot.malformed.is_empty() {
            warn!(
                "{} has unusable values for: {}",
                symbol,
                snapshot
                    .malformed
                    .iter()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        Ok(snapshot)
    }

    /// Profiles, scores and chart of two companies, without commentary
    pub async fn compare_data(&self, first: &str, second: &str) -> Result<ComparisonReport> {
        info!("Comparing {} and {}", first, second);
        let (a, b) = futures::future::try_join(self.fetch(first), self.fetch(second)).await?;
        Ok(ComparisonReport::new(vec![a, b], self.config.language))
    }

    /// Full comparison including the LLM commentary.
    ///
    /// A failed LLM call is reported in the commentary; only data errors
    /// fail the comparison.
    pub async fn compare(&self, first: &str, second: &str) -> Result<ComparisonReport> {
        let report = self.compare_data(first, second).await?;
        let snapshots: Vec<&FinancialSnapshot> = report.snapshots.iter().collect();
        let commentary = self.commentary(&snapshots).await;
        Ok(report.with_commentary(commentary))
    }

    /// Ask the LLM which company looks more promising
    pub async fn commentary(&self, snapshots: &[&FinancialSnapshot]) -> AiCommentary {
        let Some(llm) = &self.llm else {
            return AiCommentary::Unavailable(no_provider_message(self.config.language).to_string());
        };

        let prompt = match self.prompts.comparison(snapshots) {
            Ok(prompt) => prompt,
            Err(e) => return AiCommentary::Failed(e.to_string()),
        };

        match self
            .complete(llm.as_ref(), prompt, self.config.comparison_max_tokens)
            .await
        {
            Ok(text) => AiCommentary::Answer(text),
            Err(e) => {
                warn!("Commentary failed: {}", e);
                AiCommentary::Failed(e.to_string())
            }
        }
    }

    /// Fetch and score a single company
    pub async fn score_one(&self, ticker: &str) -> Result<CompanyProfile> {
        let snapshot = self.fetch(ticker).await?;
        let profile = CompanyProfile::build(&snapshot, self.config.language);
        info!("{} scored {}", profile.symbol, profile.score);
        Ok(profile)
    }

    /// Follow-up question about the last comparison
    pub async fn ask(&self, question: &str, session: &Session) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(StockError::EmptyQuestion);
        }
        let llm = self.llm.as_ref().ok_or_else(|| {
            StockError::LlmUnavailable(no_provider_message(self.config.language).to_string())
        })?;
        if session.is_empty() {
            debug!("Asking without a previous comparison");
        }

        let prompt = self.prompts.follow_up(&session.ai_answer, question)?;
        self.complete(llm.as_ref(), prompt, self.config.question_max_tokens)
            .await
    }

    async fn complete(
        &self,
        llm: &dyn LLMProvider,
        prompt: String,
        max_tokens: usize,
    ) -> Result<String> {
        let request = CompletionRequest::builder(&self.config.model)
            .add_message(Message::user(prompt))
            .max_tokens(max_tokens)
            .temperature(self.config.temperature)
            .build();

        debug!("Sending prompt to {} ({})", llm.name(), self.config.model);
        let response = llm.complete(request).await?;
        debug!("{} used {} tokens", llm.name(), response.usage.total());
        Ok(response.text().trim().to_string())
    }
}

fn no_provider_message(lang: crate::Language) -> &'static str {
    match lang {
        crate::Language::French => {
            "Clé API non trouvée. Définis GROQ_API_KEY pour obtenir l'analyse IA."
        }
        crate::Language::English => "No API key found. Set GROQ_API_KEY to get the AI analysis.",
    }
}
