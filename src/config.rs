use crate::application::query::DEFAULT_PAGE_LIMIT;
use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Runtime settings, read from an optional JSON file.
///
/// Every field has a default so a partial file (or none at all) is valid.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    pub log_json: bool,
    /// Deadline applied to each transfer, in milliseconds.
    pub transfer_timeout_ms: u64,
    pub default_page_limit: usize,
    /// Selects the persistent backend when set.
    pub db_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_json: false,
            transfer_timeout_ms: 5000,
            default_page_limit: DEFAULT_PAGE_LIMIT,
            db_path: None,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            LedgerError::ConfigError(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| LedgerError::ConfigError(format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the engine cannot run with. Call again after applying overrides.
    pub fn validate(&self) -> Result<()> {
        if self.transfer_timeout_ms == 0 {
            return Err(LedgerError::ConfigError(
                "transfer_timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_millis(self.transfer_timeout_ms)
    }
}
