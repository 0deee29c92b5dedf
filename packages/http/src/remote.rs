//! Instance descriptions from a remote cloud API.
//!
//! This is the alternative to walking the local metadata service: ask the
//! provider's control-plane API to describe an instance by identifier.
//!
//! ## Protocol
//!
//! - `describe(id)` -> `GET <endpoint>?Action=DescribeInstances&Version=2016-11-15&InstanceId.1=<id>`
//! - Requests are signed by a [`RequestSigner`]; the default is
//!   [`SigV4Signer`] with the ambient credentials.
//! - JSON bodies are parsed as-is, XML bodies are converted to JSON
//!   (elements become members, repeated tags arrays), anything else is
//!   kept as a string.
//!
//! ## Example
//!
//! ```ignore
//! use imds_http::remote::{AmbientConfig, DescriptionGateway, HttpDescriptionGateway};
//!
//! let config = AmbientConfig::from_env()?;
//! let gateway = HttpDescriptionGateway::new(config)?;
//! let description = gateway.describe("i-0123456789abcdef0")?;
//! ```

use std::fmt;
use std::time::Duration;

use reqwest::blocking::{Client, Request};
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

pub use crate::sigv4::SigV4Signer;

/// API version sent with every describe call.
pub const DESCRIBE_API_VERSION: &str = "2016-11-15";

/// Environment variable overriding the describe endpoint.
pub const ENDPOINT_VAR: &str = "IMDS_DESCRIBE_ENDPOINT";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Describe failures, split by stage.
#[derive(thiserror::Error, Debug)]
pub enum DescribeError {
    /// Region, credentials or endpoint could not be resolved.
    #[error("failed to load remote API config: {message}")]
    Config { message: String },

    /// The remote call was made, or attempted, and failed.
    #[error("describe call failed: {message}")]
    Call { message: String },
}

impl DescribeError {
    fn config(message: impl Into<String>) -> Self {
        DescribeError::Config {
            message: message.into(),
        }
    }

    fn call(message: impl fmt::Display) -> Self {
        DescribeError::Call {
            message: message.to_string(),
        }
    }
}

/// Static credentials resolved from the environment.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Ambient configuration needed to reach the remote API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbientConfig {
    pub region: String,
    pub credentials: Credentials,
    pub endpoint: Url,
}

impl AmbientConfig {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Result<Self, DescribeError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve configuration through an arbitrary variable lookup.
    ///
    /// Region comes from `AWS_REGION`, falling back to `AWS_DEFAULT_REGION`.
    /// Credentials come from `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`
    /// and the optional `AWS_SESSION_TOKEN`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DescribeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let region = var("AWS_REGION")
            .or_else(|| var("AWS_DEFAULT_REGION"))
            .ok_or_else(|| DescribeError::config("no region set (AWS_REGION)"))?;

        let access_key_id = var("AWS_ACCESS_KEY_ID")
            .ok_or_else(|| DescribeError::config("no credentials set (AWS_ACCESS_KEY_ID)"))?;
        let secret_access_key = var("AWS_SECRET_ACCESS_KEY").ok_or_else(|| {
            DescribeError::config("no credentials set (AWS_SECRET_ACCESS_KEY)")
        })?;

        let endpoint = var(ENDPOINT_VAR)
            .unwrap_or_else(|| format!("https://ec2.{}.amazonaws.com/", region));
        let endpoint = Url::parse(&endpoint)
            .map_err(|e| DescribeError::config(format!("invalid endpoint '{}': {}", endpoint, e)))?;

        Ok(Self {
            region,
            credentials: Credentials {
                access_key_id,
                secret_access_key,
                session_token: var("AWS_SESSION_TOKEN"),
            },
            endpoint,
        })
    }
}

/// Authenticates an outgoing describe request.
pub trait RequestSigner: Send + Sync {
    fn sign(&self, request: &mut Request, config: &AmbientConfig) -> Result<(), String>;
}

/// Sends requests unsigned, for endpoints that authenticate some other way
/// (a local proxy, a test stub).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSigning;

impl RequestSigner for NoSigning {
    fn sign(&self, _request: &mut Request, _config: &AmbientConfig) -> Result<(), String> {
        Ok(())
    }
}

/// The result of describing one or more instances.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Description {
    /// Identifiers the call was scoped to.
    pub identifiers: Vec<String>,

    /// Provider-defined response: the JSON body, the XML body converted to
    /// JSON, or otherwise the raw body as a string.
    pub document: serde_json::Value,
}

/// Something that can describe an instance by identifier.
pub trait DescriptionGateway {
    fn describe(&self, identifier: &str) -> Result<Description, DescribeError>;
}

/// Blocking HTTP implementation of [`DescriptionGateway`].
pub struct HttpDescriptionGateway<G = SigV4Signer> {
    client: Client,
    config: AmbientConfig,
    signer: G,
}

impl HttpDescriptionGateway<SigV4Signer> {
    /// A gateway that signs requests for the EC2 API.
    pub fn new(config: AmbientConfig) -> Result<Self, DescribeError> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| DescribeError::config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            signer: SigV4Signer::ec2(),
        })
    }
}

impl<G: RequestSigner> HttpDescriptionGateway<G> {
    /// Replace the request signer.
    pub fn with_signer<H: RequestSigner>(self, signer: H) -> HttpDescriptionGateway<H> {
        HttpDescriptionGateway {
            client: self.client,
            config: self.config,
            signer,
        }
    }

    pub fn config(&self) -> &AmbientConfig {
        &self.config
    }
}

impl<G: RequestSigner> DescriptionGateway for HttpDescriptionGateway<G> {
    fn describe(&self, identifier: &str) -> Result<Description, DescribeError> {
        if identifier.is_empty() {
            return Err(DescribeError::call("instance identifier is empty"));
        }
        info!(identifier, region = %self.config.region, "describing instance");

        let mut request = self
            .client
            .get(self.config.endpoint.clone())
            .query(&[
                ("Action", "DescribeInstances"),
                ("Version", DESCRIBE_API_VERSION),
                ("InstanceId.1", identifier),
            ])
            .build()
            .map_err(DescribeError::call)?;

        self.signer
            .sign(&mut request, &self.config)
            .map_err(DescribeError::call)?;

        debug!(url = %request.url(), "sending describe request");
        let response = self.client.execute(request).map_err(DescribeError::call)?;

        let status = response.status();
        let body_text = response.text().map_err(DescribeError::call)?;

        if !status.is_success() {
            return Err(DescribeError::call(format!(
                "HTTP {} {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown"),
                body_text
            )));
        }

        let document = parse_document(body_text);

        Ok(Description {
            identifiers: vec![identifier.to_string()],
            document,
        })
    }
}

fn parse_document(body: String) -> serde_json::Value {
    if let Ok(json) = serde_json::from_str(&body) {
        return json;
    }
    if body.trim_start().starts_with('<') {
        if let Some(json) = crate::xml::to_json(&body) {
            return json;
        }
        debug!("describe response is not well-formed XML, keeping it verbatim");
    }
    serde_json::Value::String(body)
}

/// Describe one instance using configuration from the environment.
///
/// The request is signed with the ambient credentials. Configuration
/// failures and call failures come back as distinct [`DescribeError`]
/// variants.
pub fn describe_instance(identifier: &str) -> Result<Description, DescribeError> {
    let config = AmbientConfig::from_env()?;
    HttpDescriptionGateway::new(config)?.describe(identifier)
}
