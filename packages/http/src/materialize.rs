//! Recursive materialization of a metadata namespace into a tree.
//!
//! The service represents a directory as a newline-separated listing of
//! child names, where a trailing `/` marks a child that is itself a
//! directory. Any body without a newline is a leaf value.

use imds_tree::{Directory, MetadataNode};
use tracing::{info, trace};

use crate::cancel::CancellationToken;
use crate::config::{ClientConfig, DEFAULT_MAX_DEPTH};
use crate::error::{Error, Result};
use crate::fetcher::{MetadataFetcher, MetadataSource};

/// Marker the service appends to directory names in a listing.
const DIRECTORY_MARKER: char = '/';

/// Walks a metadata namespace through a [`MetadataSource`].
///
/// Fetches are strictly sequential and depth-first. The first failure
/// aborts the walk and is returned as-is; no partial tree is produced.
pub struct TreeMaterializer<S> {
    source: S,
    max_depth: usize,
    cancellation: Option<CancellationToken>,
}

impl TreeMaterializer<MetadataFetcher> {
    /// Build a materializer backed by a real HTTP fetcher.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let fetcher = MetadataFetcher::new(config)?;
        Ok(TreeMaterializer::new(fetcher).with_max_depth(config.max_depth()))
    }
}

impl<S: MetadataSource> TreeMaterializer<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            max_depth: DEFAULT_MAX_DEPTH,
            cancellation: None,
        }
    }

    /// Limit how many directory levels below the start path are followed.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Check `token` before every fetch.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Materialize the whole namespace from its root.
    ///
    /// The root is always a listing; a scalar root is reported as
    /// [`Error::RootNotDirectory`] rather than coerced.
    pub fn fetch_tree(&self) -> Result<Directory> {
        info!("materializing metadata tree");
        match self.materialize("")? {
            MetadataNode::Directory(children) => Ok(children),
            MetadataNode::Leaf(_) => Err(Error::RootNotDirectory),
        }
    }

    /// Materialize a single key, which may be a leaf or a sub-directory.
    ///
    /// One leading `/` is ignored. Directory keys must carry their trailing
    /// `/` (e.g. `placement/`), as the service expects. The key `/` names
    /// the namespace root and yields the whole tree; `""` names nothing and
    /// is [`Error::EmptyKey`].
    pub fn fetch_value(&self, key: &str) -> Result<MetadataNode> {
        if key.is_empty() {
            return Err(Error::EmptyKey);
        }
        let key = key.strip_prefix(DIRECTORY_MARKER).unwrap_or(key);
        if key.is_empty() {
            info!("materializing metadata root");
            return self.fetch_tree().map(MetadataNode::Directory);
        }
        info!(key, "materializing metadata key");
        self.materialize(key)
    }

    /// Materialize whatever is stored at `path`.
    pub fn materialize(&self, path: &str) -> Result<MetadataNode> {
        self.walk(path, 0)
    }

    fn walk(&self, path: &str, depth: usize) -> Result<MetadataNode> {
        if depth > self.max_depth {
            return Err(Error::DepthExceeded {
                path: path.to_string(),
                max_depth: self.max_depth,
            });
        }
        if self.cancellation.as_ref().is_some_and(|t| t.is_cancelled()) {
            return Err(Error::Cancelled {
                path: path.to_string(),
            });
        }

        let body = self.source.fetch(path)?;
        if !body.contains('\n') {
            return Ok(MetadataNode::Leaf(body.trim().to_string()));
        }

        let mut children = Directory::new();
        for entry in body.trim().lines().filter(|line| !line.is_empty()) {
            let name = entry.strip_suffix(DIRECTORY_MARKER).unwrap_or(entry);
            // The fetch path keeps the marker; the service 404s without it.
            let child_path = format!("{}{}", path, entry);
            trace!(parent = path, child = %child_path, "descending");

            let child = self.walk(&child_path, depth + 1)?;
            children.insert(name.to_string(), child);
        }

        Ok(MetadataNode::Directory(children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::mock::{MockReply, MockSource};

    fn stub() -> MockSource {
        MockSource::new()
            .with_body("", "instance-id\nfolder/\n")
            .with_body("instance-id", "i-abcdef123456")
            .with_body("folder/", "subkey\n")
            .with_body("folder/subkey", "subvalue")
    }

    fn expected_tree() -> Directory {
        let mut folder = Directory::new();
        folder.insert("subkey".to_string(), MetadataNode::leaf("subvalue"));
        let mut root = Directory::new();
        root.insert("instance-id".to_string(), MetadataNode::leaf("i-abcdef123456"));
        root.insert("folder".to_string(), MetadataNode::Directory(folder));
        root
    }

    #[test]
    fn fetch_tree_builds_nested_directories() {
        let source = stub();
        let tree = TreeMaterializer::new(&source).fetch_tree().unwrap();
        assert_eq!(tree, expected_tree());
    }

    #[test]
    fn directory_fetch_paths_keep_the_marker() {
        let source = stub();
        TreeMaterializer::new(&source).fetch_tree().unwrap();
        assert_eq!(
            source.recorded(),
            vec!["", "instance-id", "folder/", "folder/subkey"]
        );
    }

    #[test]
    fn leaf_is_trimmed() {
        let source = MockSource::new().with_body("hostname", "  ip-10-0-0-1.ec2.internal \t");
        let node = TreeMaterializer::new(&source)
            .fetch_value("hostname")
            .unwrap();
        assert_eq!(node, MetadataNode::leaf("ip-10-0-0-1.ec2.internal"));
    }

    #[test]
    fn fetch_value_returns_leaf_unwrapped() {
        let source = stub();
        let materializer = TreeMaterializer::new(&source);
        assert_eq!(
            materializer.fetch_value("instance-id").unwrap(),
            MetadataNode::leaf("i-abcdef123456")
        );
        assert_eq!(
            materializer.fetch_value("folder/subkey").unwrap(),
            MetadataNode::leaf("subvalue")
        );
    }

    #[test]
    fn fetch_value_returns_subdirectory() {
        let source = stub();
        let node = TreeMaterializer::new(&source).fetch_value("folder/").unwrap();
        assert_eq!(node.resolve("subkey").unwrap().as_leaf(), Some("subvalue"));
    }

    #[test]
    fn fetch_value_strips_one_leading_slash() {
        let source = stub();
        let materializer = TreeMaterializer::new(&source);
        assert!(materializer.fetch_value("/instance-id").is_ok());
        assert!(materializer
            .fetch_value("//instance-id")
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn fetch_value_rejects_empty_key() {
        let source = stub();
        let materializer = TreeMaterializer::new(&source);
        assert!(matches!(materializer.fetch_value(""), Err(Error::EmptyKey)));
        assert!(source.recorded().is_empty());
    }

    #[test]
    fn fetch_value_of_root_is_whole_tree() {
        let source = stub();
        let node = TreeMaterializer::new(&source).fetch_value("/").unwrap();
        assert_eq!(node, MetadataNode::Directory(expected_tree()));
        assert_eq!(
            source.recorded(),
            vec!["", "instance-id", "folder/", "folder/subkey"]
        );
    }

    #[test]
    fn fetch_value_of_scalar_root_is_not_a_tree() {
        let source = MockSource::new().with_body("", "just-a-value");
        assert!(matches!(
            TreeMaterializer::new(&source).fetch_value("/"),
            Err(Error::RootNotDirectory)
        ));
    }

    #[test]
    fn missing_key_is_key_not_found() {
        let source = stub();
        let err = TreeMaterializer::new(&source)
            .fetch_value("nonexistent")
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains(r#"key "nonexistent" not found"#));
    }

    #[test]
    fn empty_listing_is_empty_directory() {
        let source = MockSource::new()
            .with_body("", "empty/\n")
            .with_body("empty/", "\n  \n");
        let tree = TreeMaterializer::new(&source).fetch_tree().unwrap();
        assert_eq!(tree.get("empty"), Some(&MetadataNode::directory()));
    }

    #[test]
    fn crlf_listings_are_accepted() {
        let source = MockSource::new()
            .with_body("", "ami-id\r\nplacement/\r\n")
            .with_body("ami-id", "ami-0123")
            .with_body("placement/", "region\r\n")
            .with_body("placement/region", "eu-west-1");
        let tree = TreeMaterializer::new(&source).fetch_tree().unwrap();
        assert_eq!(
            imds_tree::resolve(&tree, "placement/region").unwrap(),
            &MetadataNode::leaf("eu-west-1")
        );
    }

    #[test]
    fn scalar_root_is_not_a_tree() {
        let source = MockSource::new().with_body("", "just-a-value");
        assert!(matches!(
            TreeMaterializer::new(&source).fetch_tree(),
            Err(Error::RootNotDirectory)
        ));
    }

    #[test]
    fn sibling_not_found_aborts_walk() {
        let source = MockSource::new()
            .with_body("", "a\nb\nc\n")
            .with_body("a", "1")
            .with_body("c", "3");
        let err = TreeMaterializer::new(&source).fetch_tree().unwrap_err();
        assert!(matches!(err, Error::KeyNotFound { ref path } if path == "b"));
        // Nothing after the failing sibling is requested.
        assert_eq!(source.recorded(), vec!["", "a", "b"]);
    }

    #[test]
    fn nested_transport_failure_aborts_walk() {
        let source = MockSource::new()
            .with_body("", "folder/\nlast\n")
            .with_body("folder/", "ok\nbroken\n")
            .with_body("folder/ok", "fine")
            .with_reply("folder/broken", MockReply::Transport("timed out".into()))
            .with_body("last", "never");
        let err = TreeMaterializer::new(&source).fetch_tree().unwrap_err();
        assert!(matches!(err, Error::Transport { ref path, .. } if path == "folder/broken"));
        assert!(!source.recorded().contains(&"last".to_string()));
    }

    #[test]
    fn unexpected_status_propagates() {
        let source = MockSource::new()
            .with_body("", "a\n")
            .with_reply("a", MockReply::Status(500));
        assert!(matches!(
            TreeMaterializer::new(&source).fetch_tree(),
            Err(Error::UnexpectedStatus { status: 500, .. })
        ));
    }

    #[test]
    fn self_referencing_listing_hits_depth_guard() {
        // Every level lists one more level below it.
        let mut source = MockSource::new();
        let mut path = String::new();
        for _ in 0..10 {
            source = source.with_body(path.clone(), "loop/\n");
            path.push_str("loop/");
        }

        let err = TreeMaterializer::new(&source)
            .with_max_depth(3)
            .fetch_tree()
            .unwrap_err();
        assert!(matches!(err, Error::DepthExceeded { max_depth: 3, .. }));
        assert_eq!(source.recorded().len(), 4);
    }

    #[test]
    fn depth_guard_allows_exact_depth() {
        let source = stub();
        let tree = TreeMaterializer::new(&source)
            .with_max_depth(2)
            .fetch_tree()
            .unwrap();
        assert_eq!(tree, expected_tree());

        let err = TreeMaterializer::new(&source)
            .with_max_depth(1)
            .fetch_tree()
            .unwrap_err();
        assert!(matches!(err, Error::DepthExceeded { ref path, .. } if path == "folder/subkey"));
    }

    #[test]
    fn cancelled_token_stops_before_first_fetch() {
        let source = stub();
        let token = CancellationToken::new();
        token.cancel();

        let err = TreeMaterializer::new(&source)
            .with_cancellation(token)
            .fetch_tree()
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled { ref path } if path.is_empty()));
        assert!(source.recorded().is_empty());
    }

    #[test]
    fn cancellation_mid_walk_skips_remaining_fetches() {
        let token = CancellationToken::new();
        let source = stub().cancel_on("instance-id", token.clone());

        let err = TreeMaterializer::new(&source)
            .with_cancellation(token)
            .fetch_tree()
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled { ref path } if path == "folder/"));
        assert_eq!(source.recorded(), vec!["", "instance-id"]);
    }

    #[test]
    fn repeated_walks_are_identical() {
        let source = stub();
        let materializer = TreeMaterializer::new(&source);
        assert_eq!(
            materializer.fetch_tree().unwrap(),
            materializer.fetch_tree().unwrap()
        );
    }
}
