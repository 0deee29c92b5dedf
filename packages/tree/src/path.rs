//! Path type with non-empty segments.

use std::fmt;

use crate::error::PathError;

/// A validated key into a metadata tree.
///
/// Segments are separated by `/` and must be non-empty. Their contents are
/// otherwise unrestricted: metadata keys routinely contain `-`, `.` and `:`.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Path {
    pub segments: Vec<String>,
}

impl Path {
    /// Parse a `/`-delimited key.
    ///
    /// Unlike a filesystem path, nothing is normalized: an empty string, a
    /// leading or trailing `/`, and `//` are all rejected.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use imds_tree::Path;
    ///
    /// let path = Path::parse("network/interfaces/macs").unwrap();
    /// assert_eq!(path.len(), 3);
    ///
    /// assert!(Path::parse("").is_err());
    /// assert!(Path::parse("network//macs").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, PathError> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        for (position, segment) in s.split('/').enumerate() {
            if segment.is_empty() {
                return Err(PathError::EmptySegment { position });
            }
            segments.push(segment.to_string());
        }

        Ok(Path { segments })
    }

    /// Number of segments. Always at least one for a parsed path.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.segments.iter()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

impl std::ops::Index<usize> for Path {
    type Output = String;

    fn index(&self, i: usize) -> &Self::Output {
        &self.segments[i]
    }
}

impl std::str::FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_paths() {
        assert_eq!(Path::parse("foo").unwrap().len(), 1);
        assert_eq!(Path::parse("foo/bar").unwrap().len(), 2);
        assert_eq!(Path::parse("foo/bar/baz").unwrap().len(), 3);
    }

    #[test]
    fn empty_string_rejected() {
        assert_eq!(Path::parse(""), Err(PathError::Empty));
    }

    #[test]
    fn empty_segments_rejected() {
        assert_eq!(
            Path::parse("/foo"),
            Err(PathError::EmptySegment { position: 0 })
        );
        assert_eq!(
            Path::parse("foo//bar"),
            Err(PathError::EmptySegment { position: 1 })
        );
        assert_eq!(
            Path::parse("foo/"),
            Err(PathError::EmptySegment { position: 1 })
        );
        assert!(Path::parse("/").is_err());
    }

    #[test]
    fn metadata_style_segments_allowed() {
        let p = Path::parse("public-keys/0=my-key/openssh-key").unwrap();
        assert_eq!(p.len(), 3);
        assert_eq!(&p[1], "0=my-key");

        let p = Path::parse("network/interfaces/macs/0e:49:61:0f:c3:11").unwrap();
        assert_eq!(&p[3], "0e:49:61:0f:c3:11");
    }

    #[test]
    fn display_roundtrips() {
        let p = Path::parse("placement/availability-zone").unwrap();
        assert_eq!(p.to_string(), "placement/availability-zone");
    }

    #[test]
    fn from_str_impl() {
        let p: Path = "a/b".parse().unwrap();
        assert_eq!(p.segments, vec!["a".to_string(), "b".to_string()]);
        assert!("".parse::<Path>().is_err());
    }

    #[test]
    fn iter_in_order() {
        let p = Path::parse("a/b/c").unwrap();
        let segments: Vec<&String> = p.iter().collect();
        assert_eq!(segments, vec!["a", "b", "c"]);
        assert!(!p.is_empty());
    }
}
