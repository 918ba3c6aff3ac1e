//! Service configuration loaded from the environment.
//!
//! Variables use the `RECS_` prefix and an optional `.env` file is honored:
//!
//! | variable             | default          |
//! |----------------------|------------------|
//! | `RECS_DATA_PATH`     | `data/seed.json` |
//! | `RECS_DEFAULT_LIMIT` | `5`              |
//! | `RECS_REBUILD_MODE`  | `synchronous`    |

use anyhow::anyhow;
use pipeline::DEFAULT_LIMIT;
use serde::Deserialize;
use std::path::PathBuf;

const ENV_PREFIX: &str = "RECS_";

/// When the similarity model is rebuilt after a rating is recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RebuildMode {
    /// `record_rating` returns only once the new model is published
    #[default]
    Synchronous,
    /// `record_rating` returns right away; the rebuild runs on a blocking
    /// worker and publishes when done
    Background,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Seed file loaded at startup
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    /// Recommendations per request when the caller doesn't specify
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    #[serde(default)]
    pub rebuild_mode: RebuildMode,
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data/seed.json")
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            default_limit: default_limit(),
            rebuild_mode: RebuildMode::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::prefixed(ENV_PREFIX)
            .from_env::<ServiceConfig>()
            .map_err(|e| anyhow!("Failed to load config: {}", e))
    }

    /// Load configuration from explicit key/value pairs (keys carry the prefix)
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed(ENV_PREFIX)
            .from_iter(vars)
            .map_err(|e| anyhow!("Failed to load config: {}", e))
    }

    pub fn with_rebuild_mode(mut self, rebuild_mode: RebuildMode) -> Self {
        self.rebuild_mode = rebuild_mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ServiceConfig::from_vars(vars(&[])).unwrap();

        assert_eq!(config.data_path, PathBuf::from("data/seed.json"));
        assert_eq!(config.default_limit, 5);
        assert_eq!(config.rebuild_mode, RebuildMode::Synchronous);
    }

    #[test]
    fn test_reads_prefixed_vars() {
        let config = ServiceConfig::from_vars(vars(&[
            ("RECS_DATA_PATH", "/srv/tourism/seed.json"),
            ("RECS_DEFAULT_LIMIT", "8"),
            ("RECS_REBUILD_MODE", "background"),
            ("UNRELATED", "ignored"),
        ]))
        .unwrap();

        assert_eq!(config.data_path, PathBuf::from("/srv/tourism/seed.json"));
        assert_eq!(config.default_limit, 8);
        assert_eq!(config.rebuild_mode, RebuildMode::Background);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(ServiceConfig::from_vars(vars(&[("RECS_DEFAULT_LIMIT", "lots")])).is_err());
        assert!(ServiceConfig::from_vars(vars(&[("RECS_REBUILD_MODE", "sometimes")])).is_err());
    }
}
