use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub api_timeout_secs: u64,
    pub refresh_interval_ms: u64,
    pub page_limit: u32,
    pub session_file: String,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let log_format = match env::var("LOG_FORMAT").ok().as_deref() {
            None | Some("") | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(Error::Config(format!(
                    "Invalid value for LOG_FORMAT: {}",
                    other
                )))
            }
        };

        let config = Self {
            api_base_url: get_env("API_BASE_URL")?,
            api_timeout_secs: get_env_parse_or("API_TIMEOUT_SECS", 30)?,
            refresh_interval_ms: get_env_parse_or("REFRESH_INTERVAL_MS", 5000)?,
            page_limit: get_env_parse_or("PAGE_LIMIT", 10)?,
            session_file: env::var("SESSION_FILE")
                .unwrap_or_else(|_| ".campaign-session.json".to_string()),
            log_format,
        };
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        url::Url::parse(&self.api_base_url)
            .map_err(|e| Error::Config(format!("Invalid value for API_BASE_URL: {}", e)))?;
        if self.refresh_interval_ms == 0 {
            return Err(Error::Config(
                "REFRESH_INTERVAL_MS must be greater than zero".to_string(),
            ));
        }
        if self.page_limit == 0 {
            return Err(Error::Config("PAGE_LIMIT must be greater than zero".to_string()));
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }

    /// Configuration pointing at `base_url` with every other value defaulted.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: base_url.into(),
            api_timeout_secs: 30,
            refresh_interval_ms: 5000,
            page_limit: 10,
            session_file: ".campaign-session.json".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::with_base_url("http://localhost:8080/api");
        assert!(config.check().is_ok());
        assert_eq!(config.refresh_interval(), Duration::from_secs(5));
        assert_eq!(config.page_limit, 10);
    }

    #[test]
    fn rejects_bad_base_url_and_zero_interval() {
        let mut config = Config::with_base_url("not a url");
        assert!(matches!(config.check(), Err(Error::Config(_))));

        config.api_base_url = "http://localhost".to_string();
        config.refresh_interval_ms = 0;
        assert!(matches!(config.check(), Err(Error::Config(_))));
    }
}
