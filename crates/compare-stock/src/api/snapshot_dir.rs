//! Offline source reading info objects from a directory
//!
//! Each company lives in `<dir>/<SYMBOL>.json`, holding the same flat
//! camelCase info object the online providers return. Useful for demos,
//! tests and reproducible reports.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::FundamentalsSource;
use crate::error::{Result, StockError};
use crate::snapshot::FinancialSnapshot;

pub struct SnapshotDirSource {
    dir: PathBuf,
}

impl SnapshotDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.json"))
    }
}

#[async_trait]
impl FundamentalsSource for SnapshotDirSource {
    async fn fetch(&self, symbol: &str) -> Result<FinancialSnapshot> {
        let path = self.path_for(symbol);
        debug!("Reading snapshot from {}", path.display());

        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StockError::DataUnavailable {
                    symbol: symbol.to_string(),
                    reason: format!("no snapshot file at {}", path.display()),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let info: serde_json::Value = serde_json::from_str(&raw)?;
        Ok(FinancialSnapshot::from_info(symbol, &info))
    }

    fn name(&self) -> &str {
        "snapshot-dir"
    }
}
