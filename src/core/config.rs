use super::calendar::MIN_DATE;
use super::history::{DEFAULT_CONCURRENCY, DEFAULT_LOOKBACK_DAYS};
use super::i18n::Locale;
use crate::providers::argentina_datos::DEFAULT_BASE_URL;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct HistoryConfig {
    /// Number of business days shown in the history table.
    pub lookback_days: usize,
    /// No lookup is made for dates before this one.
    pub min_date: NaiveDate,
    /// Maximum number of lookups in flight.
    pub concurrency: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            min_date: MIN_DATE,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    pub history: HistoryConfig,
    pub locale: Locale,
}

impl AppConfig {
    /// Loads the config from the default location, or built-in defaults when
    /// no file exists there yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("ar", "pesowatcher", "peso-watcher")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
provider:
  base_url: "http://example.com/v1"
  timeout_secs: 3
history:
  lookback_days: 5
  min_date: "2010-06-01"
  concurrency: 2
locale: es
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.provider.base_url, "http://example.com/v1");
        assert_eq!(config.provider.timeout(), Duration::from_secs(3));
        assert_eq!(config.history.lookback_days, 5);
        assert_eq!(
            config.history.min_date,
            NaiveDate::from_ymd_opt(2010, 6, 1).unwrap()
        );
        assert_eq!(config.history.concurrency, 2);
        assert_eq!(config.locale, Locale::Es);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let yaml_str = r#"
history:
  lookback_days: 3
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        assert_eq!(config.provider.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.provider.timeout_secs, 10);
        assert_eq!(config.history.lookback_days, 3);
        assert_eq!(config.history.min_date, MIN_DATE);
        assert_eq!(config.history.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(config.locale, Locale::En);
    }

    #[test]
    fn test_example_config_parses() {
        let config: AppConfig =
            serde_yaml::from_str(include_str!("../../docs/example_config.yaml")).unwrap();
        assert_eq!(config.history.lookback_days, DEFAULT_LOOKBACK_DAYS);
        assert_eq!(config.provider.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_load_from_path_reports_bad_yaml() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), "history: [not, a, map]").unwrap();

        let err = AppConfig::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse config file"));
    }
}
