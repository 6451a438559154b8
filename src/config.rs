use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};
use dotenvy::dotenv;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    /// `None` runs the store purely in memory.
    pub database_url: Option<String>,
    pub api_prefix: String,

    // Rate limiting; 0 disables the limiter
    pub rate_api_per_min: u32,

    pub log_dir: String,

    /// Browser origins allowed to call the API; `*` allows any.
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, falling back to defaults for
    /// missing or blank keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            server_addr: var("SERVER_ADDR").unwrap_or_else(|| "127.0.0.1:8000".to_string()),
            database_url: var("DATABASE_URL"),
            api_prefix: var("API_PREFIX")
                .map(|p| p.trim_end_matches('/').to_string())
                .unwrap_or_default(),
            rate_api_per_min: parse_or(var("RATE_API_PER_MIN"), "RATE_API_PER_MIN", 1000)?,
            log_dir: var("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            cors_origins: var("CORS_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|o| !o.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_else(|| vec!["*".to_string()]),
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number, got '{value}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.server_addr, "127.0.0.1:8000");
        assert!(config.database_url.is_none());
        assert_eq!(config.api_prefix, "");
        assert_eq!(config.rate_api_per_min, 1000);
        assert_eq!(config.log_dir, "logs");
        assert_eq!(config.cors_origins, vec!["*"]);
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("SERVER_ADDR", "0.0.0.0:9000"),
            ("DATABASE_URL", "mysql://hr:hr@localhost/hrms"),
            ("API_PREFIX", "/api/"),
            ("RATE_API_PER_MIN", "0"),
        ])
        .unwrap();
        assert_eq!(config.server_addr, "0.0.0.0:9000");
        assert_eq!(
            config.database_url.as_deref(),
            Some("mysql://hr:hr@localhost/hrms")
        );
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.rate_api_per_min, 0);
    }

    #[test]
    fn cors_origins_are_comma_separated() {
        let config = config_from(&[(
            "CORS_ORIGINS",
            "http://localhost:5173, https://hr.example.com,",
        )])
        .unwrap();
        assert_eq!(
            config.cors_origins,
            vec!["http://localhost:5173", "https://hr.example.com"]
        );
    }

    #[test]
    fn blank_database_url_means_in_memory() {
        let config = config_from(&[("DATABASE_URL", "  ")]).unwrap();
        assert!(config.database_url.is_none());
    }

    #[test]
    fn malformed_rate_is_an_error() {
        let err = config_from(&[("RATE_API_PER_MIN", "lots")]).unwrap_err();
        assert!(err.to_string().contains("RATE_API_PER_MIN"));
    }
}
