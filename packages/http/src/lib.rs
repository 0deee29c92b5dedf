//! # imds-http
//!
//! Reading instance metadata over HTTP.
//!
//! A metadata service exposes a directory-like namespace: fetching a
//! directory yields a newline-separated listing of children (directories
//! carry a trailing `/`), fetching anything else yields a scalar value.
//!
//! ## Pieces
//!
//! ### MetadataFetcher
//!
//! One blocking `GET` per call, with 404 reported separately from every
//! other failure:
//!
//! ```ignore
//! use imds_http::{ClientConfig, MetadataFetcher, MetadataSource};
//!
//! let fetcher = MetadataFetcher::new(&ClientConfig::default())?;
//! let listing = fetcher.fetch("placement/")?;
//! ```
//!
//! ### TreeMaterializer
//!
//! Walks the namespace depth-first and builds an `imds_tree` tree:
//!
//! ```ignore
//! use imds_http::{ClientConfig, TreeMaterializer};
//!
//! let materializer = TreeMaterializer::from_config(&ClientConfig::default())?;
//!
//! // Everything, as a directory
//! let tree = materializer.fetch_tree()?;
//!
//! // One key, which may be a leaf or a sub-directory
//! let zone = materializer.fetch_value("placement/availability-zone")?;
//! ```
//!
//! ### Remote descriptions
//!
//! [`remote`] asks a cloud API to describe an instance by identifier
//! instead of reading the local service. Requests are signed with
//! [`sigv4`].

pub mod cancel;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod materialize;
pub mod remote;
pub mod sigv4;
mod xml;

pub use cancel::CancellationToken;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use fetcher::{MetadataFetcher, MetadataSource};
pub use materialize::TreeMaterializer;
pub use remote::{
    describe_instance, AmbientConfig, Description, DescribeError, DescriptionGateway,
    HttpDescriptionGateway, SigV4Signer,
};
