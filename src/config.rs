use std::time::Duration;

use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be an http or https URL, got {url}")]
    UnsupportedScheme { name: &'static str, url: Url },
}

/// Endpoint addresses and transport settings for the backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub upload_url: Url,
    pub ask_url: Url,
    /// `None` waits for the backend indefinitely.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(upload_url: Url, ask_url: Url, timeout_secs: Option<u64>) -> Result<Self, ConfigError> {
        check_scheme("upload URL", &upload_url)?;
        check_scheme("ask URL", &ask_url)?;

        Ok(Self {
            upload_url,
            ask_url,
            timeout: timeout_secs.filter(|secs| *secs > 0).map(Duration::from_secs),
        })
    }
}

fn check_scheme(name: &'static str, url: &Url) -> Result<(), ConfigError> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(ConfigError::UnsupportedScheme { name, url: url.clone() }),
    }
}
