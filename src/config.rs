use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::mapping::DbProvider;
use crate::naming::RuleSet;

/// Defaults applied to every mapping a resolver builds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    pub provider: DbProvider,
    pub rules: RuleSet,
}

impl MapperConfig {
    pub fn new(provider: DbProvider, rules: RuleSet) -> Self {
        Self { provider, rules }
    }

    /// Platform config file location (e.g. `~/.config/ormgen/config.json`)
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "ormgen").map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load from `path`, else from the default location if it exists, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => {
                    tracing::debug!("no config file, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        let config = Self::from_json(&text)
            .with_context(|| format!("Failed to parse config: {:?}", path))?;

        tracing::debug!(?path, provider = %config.provider, "loaded config");
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::{DbRule, ViewRule};

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = MapperConfig::from_json(r#"{"provider": "postgresql"}"#).unwrap();
        assert_eq!(config.provider, DbProvider::PostgreSql);
        assert_eq!(config.rules, RuleSet::default());

        let config = MapperConfig::from_json(r#"{"rules": {"view": "ToTitleCase"}}"#).unwrap();
        assert_eq!(config.provider, DbProvider::MsSql);
        assert_eq!(config.rules.db, DbRule::AsIs);
        assert_eq!(config.rules.view, ViewRule::ToTitleCase);
    }

    #[test]
    fn test_unknown_provider_rejected() {
        assert!(MapperConfig::from_json(r#"{"provider": "db2"}"#).is_err());
    }
}
