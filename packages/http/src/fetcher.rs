//! Single-request access to a metadata service.
//!
//! [`MetadataSource`] is the seam the materializer talks to, so tree
//! walking can be tested against canned responses without a network.

use reqwest::blocking::Client;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::Error;

/// Something that can return the raw body stored at a metadata path.
pub trait MetadataSource: Send + Sync {
    /// Fetch the body at `path`, relative to the source's base endpoint.
    ///
    /// # Errors
    ///
    /// * [`Error::KeyNotFound`] - the service reports the path as absent.
    /// * [`Error::UnexpectedStatus`] - any other non-success status.
    /// * [`Error::Transport`] - no usable response (including timeouts).
    fn fetch(&self, path: &str) -> Result<String, Error>;
}

impl<S: MetadataSource + ?Sized> MetadataSource for &S {
    fn fetch(&self, path: &str) -> Result<String, Error> {
        (**self).fetch(path)
    }
}

impl<S: MetadataSource + ?Sized> MetadataSource for Box<S> {
    fn fetch(&self, path: &str) -> Result<String, Error> {
        (**self).fetch(path)
    }
}

/// Production metadata source using a blocking reqwest client.
///
/// Every request is a plain `GET <endpoint><path>`; there are no retries.
pub struct MetadataFetcher {
    client: Client,
    endpoint: String,
}

impl MetadataFetcher {
    /// Create a fetcher whose client enforces the configured timeout.
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(Error::Client)?;

        Ok(Self {
            client,
            endpoint: config.endpoint().to_string(),
        })
    }

    /// Create a fetcher around an existing client.
    ///
    /// The caller is responsible for the client's timeout.
    pub fn with_client(client: Client, config: &ClientConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint().to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }
}

impl MetadataSource for MetadataFetcher {
    fn fetch(&self, path: &str) -> Result<String, Error> {
        let url = self.url_for(path);
        debug!(%url, "fetching metadata");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| Error::transport(path, e))?;

        let status = response.status();
        if status == http::StatusCode::NOT_FOUND {
            return Err(Error::KeyNotFound {
                path: path.to_string(),
            });
        }
        if !status.is_success() {
            return Err(Error::UnexpectedStatus {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(|e| Error::transport(path, e))?;
        debug!(%url, status = status.as_u16(), len = body.len(), "metadata fetched");

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}
