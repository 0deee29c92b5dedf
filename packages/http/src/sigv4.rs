//! AWS Signature Version 4 for describe requests.
//!
//! The signature covers the method, path, query string, the `host` and
//! `x-amz-date` headers (plus `x-amz-security-token` when a session token is
//! present) and the SHA-256 of the body:
//!
//! ```text
//! Authorization: AWS4-HMAC-SHA256 Credential=<key-id>/<yyyymmdd>/<region>/<service>/aws4_request,
//!                SignedHeaders=host;x-amz-date, Signature=<hex>
//! ```

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::blocking::Request;
use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION};
use sha2::{Digest, Sha256};
use url::Url;

use crate::remote::{AmbientConfig, Credentials, RequestSigner};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const TERMINATOR: &str = "aws4_request";

const AMZ_DATE: &str = "x-amz-date";
const SECURITY_TOKEN: &str = "x-amz-security-token";

/// Service name of the EC2 API in credential scopes.
pub const EC2_SERVICE: &str = "ec2";

/// Signing failures. Surfaced to callers as a describe call error.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SigningError {
    #[error("request URL has no host")]
    MissingHost,

    #[error("invalid HMAC key")]
    InvalidKey,

    #[error("header '{name}' is not a valid header value")]
    InvalidHeader { name: &'static str },
}

/// Everything one signature is computed over.
#[derive(Debug, Clone)]
pub struct SigningInput<'a> {
    pub method: &'a str,
    pub url: &'a Url,
    /// Headers to sign, as `(name, value)`. Names are lowercased and sorted
    /// during canonicalization.
    pub headers: &'a [(String, String)],
    pub payload: &'a [u8],
    pub region: &'a str,
    pub service: &'a str,
    pub time: DateTime<Utc>,
}

impl SigningInput<'_> {
    fn date(&self) -> String {
        self.time.format("%Y%m%d").to_string()
    }

    fn scope(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.date(),
            self.region,
            self.service,
            TERMINATOR
        )
    }

    fn sorted_headers(&self) -> Vec<(String, String)> {
        let mut headers: Vec<(String, String)> = self
            .headers
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value.trim().to_string()))
            .collect();
        headers.sort();
        headers
    }

    fn signed_headers(&self) -> String {
        self.sorted_headers()
            .into_iter()
            .map(|(name, _)| name)
            .collect::<Vec<_>>()
            .join(";")
    }

    /// The canonical request, one component per line.
    pub fn canonical_request(&self) -> String {
        let mut query: Vec<(String, String)> = self
            .url
            .query_pairs()
            .map(|(k, v)| {
                (
                    urlencoding::encode(&k).into_owned(),
                    urlencoding::encode(&v).into_owned(),
                )
            })
            .collect();
        query.sort();
        let query = query
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let headers: String = self
            .sorted_headers()
            .iter()
            .map(|(name, value)| format!("{}:{}\n", name, value))
            .collect();

        let path = match self.url.path() {
            "" => "/",
            path => path,
        };

        format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            self.method,
            path,
            query,
            headers,
            self.signed_headers(),
            hex::encode(Sha256::digest(self.payload))
        )
    }

    pub fn string_to_sign(&self) -> String {
        format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            amz_date(self.time),
            self.scope(),
            hex::encode(Sha256::digest(self.canonical_request().as_bytes()))
        )
    }

    /// Hex signature of this input under `secret_access_key`.
    pub fn signature(&self, secret_access_key: &str) -> Result<String, SigningError> {
        let key = signing_key(secret_access_key, &self.date(), self.region, self.service)?;
        Ok(hex::encode(hmac_sha256(
            &key,
            self.string_to_sign().as_bytes(),
        )?))
    }

    /// Value of the `Authorization` header.
    pub fn authorization(&self, credentials: &Credentials) -> Result<String, SigningError> {
        Ok(format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM,
            credentials.access_key_id,
            self.scope(),
            self.signed_headers(),
            self.signature(&credentials.secret_access_key)?
        ))
    }
}

/// `YYYYMMDD'T'HHMMSS'Z'`, the format of `x-amz-date`.
pub fn amz_date(time: DateTime<Utc>) -> String {
    time.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Derive the per-day, per-region, per-service signing key.
pub fn signing_key(
    secret_access_key: &str,
    date: &str,
    region: &str,
    service: &str,
) -> Result<Vec<u8>, SigningError> {
    let k_date = hmac_sha256(
        format!("AWS4{}", secret_access_key).as_bytes(),
        date.as_bytes(),
    )?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, TERMINATOR.as_bytes())
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, SigningError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| SigningError::InvalidKey)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// `host[:port]` as the HTTP client will send it.
fn host_header(url: &Url) -> Result<String, SigningError> {
    let host = url.host_str().ok_or(SigningError::MissingHost)?;
    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, SigningError> {
    HeaderValue::from_str(value).map_err(|_| SigningError::InvalidHeader { name })
}

/// [`RequestSigner`] that signs with the ambient static credentials.
#[derive(Debug, Clone, Copy)]
pub struct SigV4Signer {
    service: &'static str,
}

impl SigV4Signer {
    pub fn new(service: &'static str) -> Self {
        Self { service }
    }

    /// Signer for the EC2 API.
    pub fn ec2() -> Self {
        Self::new(EC2_SERVICE)
    }

    /// Sign `request` as of `time`. Adds `x-amz-date`, the session token
    /// header when present, and `Authorization`.
    pub fn sign_at(
        &self,
        request: &mut Request,
        config: &AmbientConfig,
        time: DateTime<Utc>,
    ) -> Result<(), SigningError> {
        let date = amz_date(time);
        let mut headers = vec![
            ("host".to_string(), host_header(request.url())?),
            (AMZ_DATE.to_string(), date.clone()),
        ];
        if let Some(token) = &config.credentials.session_token {
            headers.push((SECURITY_TOKEN.to_string(), token.clone()));
        }

        let payload = request
            .body()
            .and_then(|body| body.as_bytes())
            .unwrap_or_default();
        let authorization = SigningInput {
            method: request.method().as_str(),
            url: request.url(),
            headers: &headers,
            payload,
            region: &config.region,
            service: self.service,
            time,
        }
        .authorization(&config.credentials)?;

        let request_headers = request.headers_mut();
        request_headers.insert(
            HeaderName::from_static(AMZ_DATE),
            header_value(AMZ_DATE, &date)?,
        );
        if let Some(token) = &config.credentials.session_token {
            request_headers.insert(
                HeaderName::from_static(SECURITY_TOKEN),
                header_value(SECURITY_TOKEN, token)?,
            );
        }
        request_headers.insert(
            AUTHORIZATION,
            header_value("authorization", &authorization)?,
        );
        Ok(())
    }
}

impl Default for SigV4Signer {
    fn default() -> Self {
        Self::ec2()
    }
}

impl RequestSigner for SigV4Signer {
    fn sign(&self, request: &mut Request, config: &AmbientConfig) -> Result<(), String> {
        self.sign_at(request, config, Utc::now())
            .map_err(|e| e.to_string())
    }
}
