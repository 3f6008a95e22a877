//! Configuration loader
//!
//! Loads the feature-system settings (analysis writing systems, gloss
//! separator, placeholder text) from `featsys.yaml`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use featsys_types::FeatureError;

pub const CONFIG_FILE_NAME: &str = "featsys.yaml";

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "FEATSYS_CONFIG_DIR";

/// Settings shared by catalog bootstrap and rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureSystemConfig {
    /// Analysis writing systems in preference order; the first is the default.
    /// Catalog ids are replicated into each of these when a definition has no
    /// localized labels.
    pub analysis_writing_systems: Vec<String>,

    /// Separator used in compact glosses when a feature defines none
    pub default_gloss_separator: String,

    /// Shown in place of a label that cannot be resolved
    pub missing_text: String,
}

impl Default for FeatureSystemConfig {
    fn default() -> Self {
        Self {
            analysis_writing_systems: vec!["en".to_string()],
            default_gloss_separator: ".".to_string(),
            missing_text: "***".to_string(),
        }
    }
}

impl FeatureSystemConfig {
    pub fn with_writing_systems<S: Into<String>>(
        writing_systems: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            analysis_writing_systems: writing_systems.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), FeatureError> {
        if self.analysis_writing_systems.is_empty() {
            return Err(FeatureError::Configuration {
                details: "at least one analysis writing system is required".to_string(),
            });
        }
        if let Some(blank) = self
            .analysis_writing_systems
            .iter()
            .find(|ws| ws.trim().is_empty())
        {
            return Err(FeatureError::Configuration {
                details: format!("blank writing system id '{}'", blank),
            });
        }
        Ok(())
    }
}

pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// Create loader from FEATSYS_CONFIG_DIR or fall back to a "config" dir
    ///
    /// Path resolution order:
    /// 1. FEATSYS_CONFIG_DIR environment variable
    /// 2. Relative "config" (running from the repository root)
    /// 3. CARGO_MANIFEST_DIR/config (tests and cargo run)
    pub fn from_env() -> Self {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Self::new(dir);
        }

        if Path::new("config").join(CONFIG_FILE_NAME).exists() {
            return Self::new("config");
        }

        Self::new(concat!(env!("CARGO_MANIFEST_DIR"), "/config"))
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Load `featsys.yaml`. A missing file yields the defaults.
    pub fn load(&self) -> Result<FeatureSystemConfig> {
        let path = self.config_dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            debug!(path = %path.display(), "no feature system config, using defaults");
            return Ok(FeatureSystemConfig::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: FeatureSystemConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.validate()?;

        info!(
            path = %path.display(),
            writing_systems = ?config.analysis_writing_systems,
            "loaded feature system config"
        );
        Ok(config)
    }
}
