use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use glex_core::{EngineConfig, PatternDef, default_patterns};

/// Tool configuration as stored on disk.
///
/// Everything has a default, so an empty JSON object is a valid config file.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EngineSettings {
    /// Combination templates as kind letters, most specific first.
    #[serde(default = "glex_core::extraction::combine::default_templates")]
    pub templates: Vec<String>,

    #[serde(default = "EngineSettings::default_max_repeats")]
    pub max_repeats: usize,

    #[serde(default = "EngineSettings::default_max_matches_per_pattern")]
    pub max_matches_per_pattern: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            templates: glex_core::extraction::combine::default_templates(),
            max_repeats: Self::default_max_repeats(),
            max_matches_per_pattern: Self::default_max_matches_per_pattern(),
        }
    }
}

impl EngineSettings {
    const fn default_max_repeats() -> usize {
        5
    }

    const fn default_max_matches_per_pattern() -> usize {
        100
    }
}

impl Config {
    /// Load a config file, or fall back to defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Run 'glex init' to create one.",
                path.display()
            );
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write the default config to `path`.
    pub fn write_default(path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(&Self::default())?;
        std::fs::write(path, content)?;
        info!("Wrote default config to {}", path.display());
        Ok(())
    }

    /// Combine this config with a pattern table into an engine config.
    #[must_use]
    pub fn to_engine_config(&self, patterns: Vec<PatternDef>) -> EngineConfig {
        EngineConfig {
            patterns,
            templates: self.engine.templates.clone(),
            max_repeats: self.engine.max_repeats,
            max_matches_per_pattern: self.engine.max_matches_per_pattern,
        }
    }
}

/// Load a pattern table from a JSON file (an array of pattern rows), or the
/// built-in table when `path` is `None`.
pub fn load_pattern_table(path: Option<&Path>) -> anyhow::Result<Vec<PatternDef>> {
    let Some(path) = path else {
        return Ok(default_patterns());
    };
    let content = std::fs::read_to_string(path)?;
    let table: Vec<PatternDef> = serde_json::from_str(&content)?;
    info!("Loaded {} patterns from {}", table.len(), path.display());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn test_empty_object_is_a_valid_config() {
        let config: Config = serde_json::from_str("{}").expect("empty config should deserialize");
        assert_eq!(config.engine.max_repeats, 5);
        assert_eq!(config.engine.max_matches_per_pattern, 100);
        assert!(!config.engine.templates.is_empty());
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn test_config_round_trip() {
        let config = Config::default();
        let json = serde_json::to_string(&config).expect("config should serialize");
        let back: Config = serde_json::from_str(&json).expect("valid JSON should deserialize");
        assert_eq!(back.engine.templates, config.engine.templates);
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn test_builtin_table_loads_without_a_path() {
        let table = load_pattern_table(None).expect("builtin table should load");
        assert!(!table.is_empty());
        let engine_config = Config::default().to_engine_config(table);
        assert!(glex_core::ExtractionEngine::new(engine_config).is_ok());
    }
}
