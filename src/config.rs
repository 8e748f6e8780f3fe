use serde::{Deserialize, Serialize};
use std::path::Path;
use anyhow::{Result, anyhow};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    pub detection: DetectionConfig,
    pub context: ContextConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Minimum row count for a table to qualify
    pub min_rows: usize,

    /// Minimum effective column count (colspan-weighted)
    pub min_cols: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Maximum characters captured before and after each table
    pub max_chars: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            detection: DetectionConfig {
                min_rows: 2,
                min_cols: 2,
            },
            context: ContextConfig { max_chars: 500 },
        }
    }
}

impl ExtractorConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow!("Failed to read config file: {}", e))?;

        let config: ExtractorConfig = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file: {}", e))?;

        Ok(config)
    }

    pub fn load_from_env() -> Self {
        let mut config = Self::default();

        if let Ok(rows) = std::env::var("TABULADOR_MIN_ROWS") {
            if let Ok(value) = rows.parse::<usize>() {
                config.detection.min_rows = value;
            }
        }

        if let Ok(cols) = std::env::var("TABULADOR_MIN_COLS") {
            if let Ok(value) = cols.parse::<usize>() {
                config.detection.min_cols = value;
            }
        }

        if let Ok(chars) = std::env::var("TABULADOR_CONTEXT_CHARS") {
            if let Ok(value) = chars.parse::<usize>() {
                config.context.max_chars = value;
            }
        }

        config
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| anyhow!("Failed to serialize config: {}", e))?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| anyhow!("Failed to write config file: {}", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = ExtractorConfig::default();
        assert_eq!(config.detection.min_rows, 2);
        assert_eq!(config.detection.min_cols, 2);
        assert_eq!(config.context.max_chars, 500);
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = ExtractorConfig::default();
        config.context.max_chars = 250;

        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        config.save_to_file(&config_path).unwrap();

        let loaded = ExtractorConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.context.max_chars, 250);
        assert_eq!(loaded.detection.min_rows, 2);
    }
}
