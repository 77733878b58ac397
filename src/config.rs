use std::net::SocketAddr;
use std::path::PathBuf;

/// Server configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub listen_addr: SocketAddr,
    /// Shared secret of the reload webhook; the webhook is off without one.
    pub reload_secret: Option<String>,
    /// Absolute base for URLs in feeds.
    pub base_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let data_dir = std::env::var("PYVO_DATA_DIR")
            .unwrap_or_else(|_| "pyvo-data".to_string())
            .into();

        let listen_addr = std::env::var("PYVO_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .map_err(|_| {
                ConfigError::Invalid("PYVO_LISTEN_ADDR", "must be a valid socket address")
            })?;

        let reload_secret = match std::env::var("PYVO_RELOAD_SECRET") {
            Ok(s) if s.is_empty() => {
                return Err(ConfigError::Invalid(
                    "PYVO_RELOAD_SECRET",
                    "must not be empty when set",
                ))
            }
            Ok(s) => Some(s),
            Err(_) => None,
        };

        let base_url = std::env::var("PYVO_BASE_URL")
            .unwrap_or_else(|_| "https://pyvo.cz".to_string());
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Invalid(
                "PYVO_BASE_URL",
                "must be an absolute http(s) URL",
            ));
        }

        Ok(Config {
            data_dir,
            listen_addr,
            reload_secret,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Invalid(&'static str, &'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Invalid(var, msg) => write!(f, "Invalid value for {}: {}", var, msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            ConfigError::Invalid("PYVO_LISTEN_ADDR", "must be a valid socket address").to_string(),
            "Invalid value for PYVO_LISTEN_ADDR: must be a valid socket address"
        );
    }
}
