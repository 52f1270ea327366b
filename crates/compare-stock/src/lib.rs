//! Side-by-side company comparison for investors
//!
//! This crate fetches the fundamentals of two listed companies and compares
//! them:
//!
//! - Fundamentals from Yahoo Finance or an offline directory of JSON files
//! - A weighted financial score out of 10 (net margin, ROE, leverage, FCF)
//! - Estimated net margin and debt/equity next to each profile
//! - A key-indicator bar chart rendered as text
//! - LLM commentary and follow-up questions, in French or English
//!
//! # Example
//!
//! ```rust,ignore
//! use compare_stock::{CompareConfig, ComparisonEngine};
//! use compare_llm::providers::OpenAIProvider;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let llm = OpenAIProvider::from_env()?;
//!     let engine = ComparisonEngine::from_config(
//!         CompareConfig::from_env()?,
//!         Some(Arc::new(llm)),
//!     )?;
//!
//!     let report = engine.compare("AAPL", "TSLA").await?;
//!     println!("{report}");
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cache;
pub mod chart;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod language;
pub mod prompts;
pub mod ratios;
pub mod report;
pub mod scoring;
pub mod session;
pub mod snapshot;

// Re-export main types for convenience
pub use api::{FundamentalsSource, Market, validate_symbol};
pub use config::{CompareConfig, DataProvider};
pub use engine::ComparisonEngine;
pub use error::{Result, StockError};
pub use language::Language;
pub use report::{AiCommentary, CompanyProfile, ComparisonReport};
pub use scoring::{FinancialScore, score};
pub use session::{Session, SessionStore};
pub use snapshot::FinancialSnapshot;
