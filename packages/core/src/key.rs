//! Hierarchical keys with whole-segment prefix semantics.

use std::fmt;

/// A hierarchical key: an ordered sequence of non-empty path segments.
///
/// Construction is infallible and normalizing: repeated and trailing
/// separators are dropped, so `Key::new("/a//b/")` equals
/// `Key::new("a/b")`. The derived ordering compares segment-by-segment,
/// which is what merge iteration over multiple stores relies on.
///
/// # Examples
///
/// ```rust
/// use plexstore_core::Key;
///
/// let key = Key::new("/blocks/CIQABC");
/// assert_eq!(key.len(), 2);
/// assert_eq!(key.to_string(), "/blocks/CIQABC");
/// assert!(key.has_prefix(&Key::new("/blocks")));
/// ```
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Key {
    segments: Vec<String>,
}

impl Key {
    /// Parse a key string, normalizing separators.
    pub fn new(s: &str) -> Self {
        let segments = s
            .split('/')
            .filter(|c| !c.is_empty())
            .map(|c| c.to_string())
            .collect();
        Key { segments }
    }

    /// The root key (no segments).
    pub fn root() -> Self {
        Key {
            segments: Vec::new(),
        }
    }

    /// Build a key from pre-split segments. Empty segments are dropped.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments = segments
            .into_iter()
            .map(Into::into)
            .filter(|s| !s.is_empty())
            .collect();
        Key { segments }
    }

    /// The key's segments, in order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True for the root key.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// True if the key has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append another key's segments to this one.
    #[must_use]
    pub fn join(&self, other: &Key) -> Key {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Key { segments }
    }

    /// Append a single segment.
    #[must_use]
    pub fn child(&self, segment: &str) -> Key {
        let mut segments = self.segments.clone();
        segments.extend(
            segment
                .split('/')
                .filter(|c| !c.is_empty())
                .map(|c| c.to_string()),
        );
        Key { segments }
    }

    /// Whole-segment prefix check.
    ///
    /// A prefix matches iff the key equals it or extends it by whole
    /// segments: `/ab` is not a prefix of `/abc`, but is of `/ab/c`.
    pub fn has_prefix(&self, prefix: &Key) -> bool {
        prefix.segments.len() <= self.segments.len()
            && prefix.segments == self.segments[..prefix.segments.len()]
    }

    /// Strip a whole-segment prefix, or `None` if it does not match.
    #[must_use]
    pub fn strip_prefix(&self, prefix: &Key) -> Option<Key> {
        if self.has_prefix(prefix) {
            Some(Key {
                segments: self.segments[prefix.segments.len()..].to_vec(),
            })
        } else {
            None
        }
    }

    /// The key with its last segment removed. The root is its own parent.
    #[must_use]
    pub fn parent(&self) -> Key {
        let mut segments = self.segments.clone();
        segments.pop();
        Key { segments }
    }

    /// The last segment, if any.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::new(s)
    }
}

/// Shorthand for building keys in tests and examples.
///
/// ```rust
/// use plexstore_core::key;
///
/// let k = key!("users/alice");
/// assert_eq!(k.len(), 2);
/// ```
#[macro_export]
macro_rules! key {
    ($s:expr) => {
        $crate::Key::new($s)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_normalize() {
        assert_eq!(Key::new("").len(), 0);
        assert_eq!(Key::new("foo").len(), 1);
        assert_eq!(Key::new("/foo/bar"), Key::new("foo/bar"));
        assert_eq!(Key::new("foo//bar/"), Key::new("foo/bar"));
    }

    #[test]
    fn display_with_leading_slash() {
        assert_eq!(key!("a/b").to_string(), "/a/b");
        assert_eq!(Key::root().to_string(), "/");
    }

    #[test]
    fn segment_wise_prefix() {
        let k = key!("ab/c");
        assert!(k.has_prefix(&key!("ab")));
        assert!(k.has_prefix(&key!("ab/c")));
        assert!(k.has_prefix(&Key::root()));

        // Not a raw string prefix match: /ab does not cover /abc.
        assert!(!key!("abc").has_prefix(&key!("ab")));
    }

    #[test]
    fn strip_prefix_works() {
        let k = key!("a/b/c");
        assert_eq!(k.strip_prefix(&key!("a")), Some(key!("b/c")));
        assert_eq!(k.strip_prefix(&key!("a/b/c")), Some(Key::root()));
        assert_eq!(k.strip_prefix(&key!("x")), None);
    }

    #[test]
    fn join_and_child() {
        assert_eq!(key!("a").join(&key!("b/c")), key!("a/b/c"));
        assert_eq!(key!("a").child("b"), key!("a/b"));
        assert_eq!(Key::root().join(&key!("x")), key!("x"));
    }

    #[test]
    fn parent_and_name() {
        let k = key!("a/b/c");
        assert_eq!(k.parent(), key!("a/b"));
        assert_eq!(k.name(), Some("c"));
        assert_eq!(Key::root().parent(), Key::root());
        assert_eq!(Key::root().name(), None);
    }

    #[test]
    fn ordering_is_segment_wise() {
        assert!(key!("a/b") < key!("a/c"));
        assert!(key!("a/b") < key!("b"));
        // '!' sorts below '/' in byte order; segment-wise order must
        // still put the shorter shared-prefix key first.
        assert!(key!("a") < key!("a!b"));
        assert!(key!("a/z") < key!("a!b"));
    }

    #[test]
    fn from_segments_drops_empties() {
        let k = Key::from_segments(vec!["a", "", "b"]);
        assert_eq!(k, key!("a/b"));
    }
}
