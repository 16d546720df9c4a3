//! Cache configuration.
//!
//! Controls the stale-while-revalidate product cache via `vetrina.toml`.

use serde::Deserialize;
use time::Duration;

const DEFAULT_DURATION_SECONDS: u64 = 300;

/// Cache configuration from `vetrina.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Serve product lists from the cache. When off, every read hits the backend.
    pub enabled: bool,
    /// Freshness window of a cached list, in seconds.
    pub duration_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration_seconds: DEFAULT_DURATION_SECONDS,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            duration_seconds: settings.duration_seconds,
        }
    }
}

impl CacheConfig {
    pub fn with_duration_seconds(mut self, seconds: u64) -> Self {
        self.duration_seconds = seconds;
        self
    }

    /// Freshness window as a `time::Duration`, saturating on overflow.
    pub fn duration(&self) -> Duration {
        Duration::seconds(i64::try_from(self.duration_seconds).unwrap_or(i64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.duration_seconds, 300);
        assert_eq!(config.duration(), Duration::minutes(5));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: CacheConfig =
            serde_json::from_str(r#"{"duration_seconds": 30}"#).expect("valid cache config");
        assert!(config.enabled);
        assert_eq!(config.duration(), Duration::seconds(30));
    }

    #[test]
    fn oversized_duration_saturates() {
        let config = CacheConfig::default().with_duration_seconds(u64::MAX);
        assert_eq!(config.duration(), Duration::seconds(i64::MAX));
    }
}
