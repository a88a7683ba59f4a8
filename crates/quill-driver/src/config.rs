//! Driver configuration, loaded from an optional `quill.toml`.

use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Deserialize, Default)]
pub struct AnalysisConfig {
    /// Emit every inferred top-level type, not just the ones that fail.
    #[serde(default)]
    pub verbose: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_default_to_false() {
        let config: Config = toml::from_str("").unwrap();
        assert!(!config.analysis.verbose);
    }

    #[test]
    fn verbose_flag_is_read() {
        let config: Config = toml::from_str("[analysis]\nverbose = true\n").unwrap();
        assert!(config.analysis.verbose);
    }
}
