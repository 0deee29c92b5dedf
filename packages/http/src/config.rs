//! Client configuration for talking to a metadata service.

use std::time::Duration;

use url::Url;

use crate::error::Error;

/// Link-local address of the EC2 instance metadata service.
pub const DEFAULT_ENDPOINT: &str = "http://169.254.169.254/latest/meta-data/";

/// Per-request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Timeouts at or above this are rejected; the service is link-local.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(5);

/// Directory nesting allowed before materialization gives up.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Where and how to reach a metadata service.
///
/// Built explicitly and handed to the fetcher; there is no process-wide
/// default that can be mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    endpoint: String,
    timeout: Duration,
    max_depth: usize,
}

impl ClientConfig {
    /// Create a config for the given base endpoint.
    ///
    /// Keys are appended to the endpoint verbatim, so it should normally end
    /// with `/`.
    pub fn new(endpoint: &str) -> Result<Self, Error> {
        let url = Url::parse(endpoint)?;
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(Error::InvalidUrl {
                    message: format!("unsupported scheme '{}' in {}", other, endpoint),
                })
            }
        }

        Ok(Self {
            endpoint: url.to_string(),
            ..Self::default()
        })
    }

    /// Set the per-request timeout. Must be non-zero and under [`MAX_TIMEOUT`].
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, Error> {
        if timeout.is_zero() || timeout >= MAX_TIMEOUT {
            return Err(Error::InvalidConfig {
                message: format!(
                    "timeout must be between 1ms and {}ms, got {}ms",
                    MAX_TIMEOUT.as_millis() - 1,
                    timeout.as_millis()
                ),
            });
        }
        self.timeout = timeout;
        Ok(self)
    }

    /// Set the maximum directory nesting. Zero only allows a leaf at the
    /// requested path.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(config.timeout(), Duration::from_secs(2));
        assert_eq!(config.max_depth(), DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn default_endpoint_is_normalized() {
        let parsed = ClientConfig::new(DEFAULT_ENDPOINT).unwrap();
        assert_eq!(parsed, ClientConfig::default());
    }

    #[test]
    fn custom_endpoint() {
        let config = ClientConfig::new("http://127.0.0.1:8080/latest/meta-data/").unwrap();
        assert_eq!(config.endpoint(), "http://127.0.0.1:8080/latest/meta-data/");
    }

    #[test]
    fn bare_host_gains_root_slash() {
        let config = ClientConfig::new("http://localhost:1338").unwrap();
        assert_eq!(config.endpoint(), "http://localhost:1338/");
    }

    #[test]
    fn invalid_endpoints_rejected() {
        assert!(matches!(
            ClientConfig::new("not a url"),
            Err(Error::UrlParse(_))
        ));
        assert!(matches!(
            ClientConfig::new("ftp://169.254.169.254/"),
            Err(Error::InvalidUrl { .. })
        ));
    }

    #[test]
    fn timeout_bounds() {
        let config = ClientConfig::default()
            .with_timeout(Duration::from_millis(500))
            .unwrap();
        assert_eq!(config.timeout(), Duration::from_millis(500));

        assert!(ClientConfig::default()
            .with_timeout(Duration::ZERO)
            .is_err());
        assert!(ClientConfig::default()
            .with_timeout(Duration::from_secs(5))
            .is_err());
        assert!(ClientConfig::default()
            .with_timeout(Duration::from_millis(4999))
            .is_ok());
    }

    #[test]
    fn max_depth_setter() {
        let config = ClientConfig::default().with_max_depth(4);
        assert_eq!(config.max_depth(), 4);
    }
}
