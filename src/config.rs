// ⚙️ Config - environment settings for the form and the pricing service

use std::env;
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_LOG_FILE: &str = "house-price.log";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Form-side configuration.
///
/// | Env Var           | Default                 |
/// |-------------------|-------------------------|
/// | `PRICING_API_URL` | `http://localhost:5000` |
/// | `HOUSE_PRICE_LOG` | `house-price.log`       |
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the pricing service, without trailing `/`
    pub api_url: String,
    pub log_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = env::var("PRICING_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let api_url = api_url.trim().trim_end_matches('/').to_string();
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                name: "PRICING_API_URL",
                expected: "an http(s) URL",
                value: api_url,
            });
        }

        let log_file = env::var("HOUSE_PRICE_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILE.into());

        Ok(Self {
            api_url,
            log_file: PathBuf::from(log_file),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

/// Pricing service configuration.
///
/// | Env Var              | Default   |
/// |----------------------|-----------|
/// | `PRICING_HOST`       | `0.0.0.0` |
/// | `PRICING_PORT`       | `5000`    |
/// | `MODEL_METRICS_PATH` | unset     |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// JSON file with the reported model metrics; built-in values when unset
    pub metrics_path: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("PRICING_HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port_raw = env::var("PRICING_PORT").unwrap_or_else(|_| "5000".into());
        let port = port_raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
            name: "PRICING_PORT",
            expected: "a valid u16",
            value: port_raw.clone(),
        })?;

        let metrics_path = env::var("MODEL_METRICS_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            host,
            port,
            metrics_path,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:5000");
        assert_eq!(config.log_file, PathBuf::from("house-price.log"));
    }

    #[test]
    fn test_bind_addr() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 5001,
            metrics_path: None,
        };
        assert_eq!(config.bind_addr(), "127.0.0.1:5001");
    }

    #[test]
    fn test_config_error_message() {
        let err = ConfigError::Invalid {
            name: "PRICING_PORT",
            expected: "a valid u16",
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "PRICING_PORT must be a valid u16, got \"abc\"");
    }
}
