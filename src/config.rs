use crate::services::classifier::identifier::{DEFAULT_API_BASE, DEFAULT_MODEL};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BIND: &str = "0.0.0.0:3000";
const DEFAULT_DATA_DIR: &str = ".waste-sorter";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Extra time a remote client waits on top of the server's own oracle timeout.
const CLIENT_TIMEOUT_MARGIN: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    pub bind: String,
    pub data_dir: PathBuf,
    pub timeout: Duration,
    pub demo_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            bind: DEFAULT_BIND.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            demo_mode: false,
        }
    }
}

impl AppConfig {
    /// Reads `.env` (if any) and then the process environment.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            api_key: non_empty("GEMINI_API_KEY"),
            api_base: non_empty("GEMINI_API_BASE").unwrap_or(defaults.api_base),
            model: non_empty("GEMINI_MODEL").unwrap_or(defaults.model),
            bind: non_empty("WASTE_SORTER_BIND").unwrap_or(defaults.bind),
            data_dir: non_empty("WASTE_SORTER_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            timeout: non_empty("WASTE_SORTER_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            demo_mode: non_empty("WASTE_SORTER_DEMO_MODE")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(defaults.demo_mode),
        }
    }

    pub fn stats_path(&self) -> PathBuf {
        self.data_dir.join("stats.db")
    }

    /// Budget for `sort --server`, which sits in front of a server-side oracle call.
    pub fn client_timeout(&self) -> Duration {
        self.timeout + CLIENT_TIMEOUT_MARGIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]);
        assert!(config.api_key.is_none());
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.bind, DEFAULT_BIND);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(!config.demo_mode);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = config_from(&[
            ("GEMINI_API_KEY", "abc"),
            ("WASTE_SORTER_TIMEOUT_SECS", "5"),
            ("WASTE_SORTER_DEMO_MODE", "TRUE"),
            ("WASTE_SORTER_DATA_DIR", "/tmp/sorter"),
        ]);
        assert_eq!(config.api_key.as_deref(), Some("abc"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.demo_mode);
        assert_eq!(config.stats_path(), PathBuf::from("/tmp/sorter/stats.db"));
    }

    #[test]
    fn remote_client_outwaits_the_oracle() {
        let config = config_from(&[("WASTE_SORTER_TIMEOUT_SECS", "12")]);
        assert!(config.client_timeout() > config.timeout);
        assert_eq!(config.client_timeout(), Duration::from_secs(22));
    }

    #[test]
    fn blank_or_invalid_values_are_ignored() {
        let config = config_from(&[("GEMINI_API_KEY", "  "), ("WASTE_SORTER_TIMEOUT_SECS", "soon")]);
        assert!(config.api_key.is_none());
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }
}
