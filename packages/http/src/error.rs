/// Boxed cause of a transport failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The metadata service answered 404 for this path.
    #[error("key {path:?} not found")]
    KeyNotFound { path: String },

    /// The metadata service answered with a non-2xx status other than 404.
    #[error("unexpected HTTP status {status} for {path:?}")]
    UnexpectedStatus { path: String, status: u16 },

    /// The request never produced a status: connect failure, timeout, or a
    /// body that could not be read.
    #[error("request for {path:?} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: BoxError,
    },

    #[error("key is empty")]
    EmptyKey,

    /// The namespace root was a scalar instead of a listing.
    #[error("metadata root is not a directory")]
    RootNotDirectory,

    #[error("namespace nests deeper than {max_depth} levels at {path:?}")]
    DepthExceeded { path: String, max_depth: usize },

    #[error("cancelled before fetching {path:?}")]
    Cancelled { path: String },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid URL: {message}")]
    InvalidUrl { message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The HTTP client itself could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(#[source] reqwest::Error),
}

impl Error {
    pub(crate) fn transport(path: &str, source: impl Into<BoxError>) -> Self {
        Error::Transport {
            path: path.to_string(),
            source: source.into(),
        }
    }

    /// Whether this error means the requested key does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::KeyNotFound { .. })
    }
}

/// Result type alias for metadata operations.
pub type Result<T> = std::result::Result<T, Error>;
