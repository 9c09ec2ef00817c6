use std::time::Duration;

use crate::error::ConfigError;

// =========================================================
// 运行时配置 (Runtime Configuration)
// =========================================================

/// 这些是默认值，环境中没有定义对应变量时使用
pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

const API_URL_VAR: &str = "API_URL";
const API_TIMEOUT_VAR: &str = "API_TIMEOUT_MS";

/// Where the backend lives and how long a request may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Backend origin without trailing slash, e.g. `http://localhost:5000`.
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            ..Self::default()
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reads `API_URL` / `API_TIMEOUT_MS` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same variables, captured at compile time. Used by the browser build,
    /// which has no process environment.
    pub fn from_build_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| match name {
            API_URL_VAR => option_env!("API_URL").map(str::to_string),
            API_TIMEOUT_VAR => option_env!("API_TIMEOUT_MS").map(str::to_string),
            _ => None,
        })
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup(API_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout_ms = match lookup(API_TIMEOUT_VAR).filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or(ConfigError::InvalidTimeout(raw))?,
            None => DEFAULT_TIMEOUT_MS,
        };

        Ok(Self {
            base_url: normalize_base_url(&base_url)?,
            timeout: Duration::from_millis(timeout_ms),
        })
    }

    /// Absolute URL for a backend path.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidBaseUrl(raw.to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_to_local_backend() {
        let config = ApiConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ApiConfig::default());
        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn reads_overrides_and_trims_trailing_slash() {
        let config = ApiConfig::from_lookup(lookup_from(&[
            ("API_URL", "https://api.example.org/"),
            ("API_TIMEOUT_MS", "2500"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://api.example.org");
        assert_eq!(config.timeout, Duration::from_millis(2500));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            ApiConfig::from_lookup(lookup_from(&[("API_URL", "localhost:5000")])),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            ApiConfig::from_lookup(lookup_from(&[("API_TIMEOUT_MS", "soon")])),
            Err(ConfigError::InvalidTimeout(_))
        ));
        assert!(matches!(
            ApiConfig::from_lookup(lookup_from(&[("API_TIMEOUT_MS", "0")])),
            Err(ConfigError::InvalidTimeout(_))
        ));
    }

    #[test]
    fn url_joins_paths() {
        let config = ApiConfig::new("http://localhost:5000/").unwrap();
        assert_eq!(config.url("/api/login"), "http://localhost:5000/api/login");
        assert_eq!(config.url("api/login"), "http://localhost:5000/api/login");
    }
}
