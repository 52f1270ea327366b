//! Last comparison, persisted between invocations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;
use crate::report::ComparisonReport;
use crate::snapshot::FinancialSnapshot;

/// State a follow-up question is asked against
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub tickers: Vec<String>,
    pub snapshots: Vec<FinancialSnapshot>,
    /// Commentary of the last comparison, empty when there was none
    pub ai_answer: String,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Replace the state with the outcome of a comparison
    pub fn record(&mut self, report: &ComparisonReport) {
        self.tickers = report.tickers();
        self.snapshots = report.snapshots.clone();
        self.ai_answer = report.commentary.answer().unwrap_or_default().to_string();
        self.updated_at = Some(report.generated_at);
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}

/// JSON file holding a [`Session`]
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the session; a missing file is an empty session
    pub async fn load(&self) -> Result<Session> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No session at {}", self.path.display());
                Ok(Session::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write the session, creating parent directories
    pub async fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(session)?;
        tokio::fs::write(&self.path, content).await?;
        debug!("Session saved to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use crate::report::AiCommentary;

    fn report(commentary: AiCommentary) -> ComparisonReport {
        ComparisonReport::new(
            vec![FinancialSnapshot::new("AAPL"), FinancialSnapshot::new("TSLA")],
            Language::French,
        )
        .with_commentary(commentary)
    }

    #[test]
    fn test_record() {
        let mut session = Session::default();
        assert!(session.is_empty());

        session.record(&report(AiCommentary::Answer("Apple".to_string())));
        assert_eq!(session.tickers, vec!["AAPL", "TSLA"]);
        assert_eq!(session.snapshots.len(), 2);
        assert_eq!(session.ai_answer, "Apple");
        assert!(session.updated_at.is_some());

        // a comparison without commentary clears the stale answer
        session.record(&report(AiCommentary::Failed("HTTP 500".to_string())));
        assert_eq!(session.ai_answer, "");
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("none.json"));
        assert_eq!(store.load().await.unwrap(), Session::default());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested/state/session.json"));

        let mut session = Session::default();
        session.record(&report(AiCommentary::Answer("Tesla".to_string())));
        tokio_test::assert_ok!(store.save(&session).await);

        assert_eq!(store.load().await.unwrap(), session);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(SessionStore::new(path).load().await.is_err());
    }
}
