//! # imds-cli
//!
//! Print instance metadata as indented JSON.
//!
//! ## Usage
//!
//! ```bash
//! # The whole metadata tree
//! imds
//!
//! # One key; directories need their trailing slash
//! imds --key placement/availability-zone
//! imds --key network/interfaces/
//!
//! # `/` is the root, the same as no key
//! imds --key /
//!
//! # A local stub instead of the link-local service
//! imds --endpoint http://127.0.0.1:1338/latest/meta-data/
//!
//! # Ask the remote API instead of the local service
//! imds --instance-id i-0123456789abcdef0
//! ```
//!
//! Errors go to stderr and the process exits with status 1.

use std::time::Duration;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use imds_http::config::{DEFAULT_ENDPOINT, DEFAULT_MAX_DEPTH, DEFAULT_TIMEOUT};
use imds_http::{describe_instance, ClientConfig, DescribeError, TreeMaterializer};
use imds_tree::{render, render_value, MetadataNode, RenderError};

/// imds - dump instance metadata as JSON
#[derive(Parser, Debug)]
#[command(name = "imds")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Metadata key to fetch (fetch everything if empty)
    #[arg(long)]
    pub key: Option<String>,

    /// Metadata service base URL
    #[arg(long, env = "IMDS_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Instance ID to describe through the remote API instead
    #[arg(long)]
    pub instance_id: Option<String>,

    /// Per-request timeout in milliseconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_millis() as u64)]
    pub timeout_ms: u64,

    /// Maximum directory nesting to follow
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// More log output on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// What a set of arguments asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation<'a> {
    Describe(&'a str),
    Tree,
    Value(&'a str),
}

impl Args {
    /// Empty `--instance-id` and `--key` values count as absent.
    pub fn operation(&self) -> Operation<'_> {
        if let Some(id) = self.instance_id.as_deref().filter(|id| !id.is_empty()) {
            return Operation::Describe(id);
        }
        match self.key.as_deref().filter(|key| !key.is_empty()) {
            Some(key) => Operation::Value(key),
            None => Operation::Tree,
        }
    }

    pub fn client_config(&self) -> Result<ClientConfig, imds_http::Error> {
        Ok(ClientConfig::new(&self.endpoint)?
            .with_timeout(Duration::from_millis(self.timeout_ms))?
            .with_max_depth(self.max_depth))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Metadata(#[from] imds_http::Error),

    #[error("{0}")]
    Describe(#[from] DescribeError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),
}

/// Execute the requested operation and return the rendered output.
pub fn run(args: &Args) -> Result<String, AppError> {
    let operation = args.operation();
    debug!(?operation, endpoint = %args.endpoint, "running");

    match operation {
        Operation::Describe(id) => {
            let description = describe_instance(id)?;
            Ok(render_value(&description.document)?)
        }
        Operation::Tree => {
            let materializer = TreeMaterializer::from_config(&args.client_config()?)?;
            let tree = materializer.fetch_tree()?;
            Ok(render(&MetadataNode::Directory(tree))?)
        }
        Operation::Value(key) => {
            let materializer = TreeMaterializer::from_config(&args.client_config()?)?;
            let node = materializer.fetch_value(key)?;
            Ok(render(&node)?)
        }
    }
}

/// Install a stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise verbosity picks the level.
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // A subscriber may already be installed (tests); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
