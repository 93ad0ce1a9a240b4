//! Path pattern matching.
//!
//! # Responsibilities
//! - Parse route patterns (exact, subtree, wildcard subtree)
//! - Match a request path against a pattern
//! - Canonicalize request paths
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - `/api/*` and `/api/` are the same subtree pattern
//! - No regex, prefix comparison only

use thiserror::Error;

/// Error raised while parsing or registering a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("empty route pattern")]
    Empty,
    #[error("route pattern '{0}' must start with '/'")]
    MissingLeadingSlash(String),
    #[error("route pattern '{0}' may only use '*' as its final segment")]
    MisplacedWildcard(String),
    #[error("route pattern '{0}' is not a canonical path")]
    NotCanonical(String),
    #[error("route pattern '{0}' is registered more than once")]
    Duplicate(String),
}

/// A compiled path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    /// Matches one path only.
    Exact(String),
    /// Matches every path starting with the prefix. The prefix always ends in '/'.
    Subtree(String),
}

impl PathPattern {
    /// Parse a pattern string.
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(PatternError::Empty);
        }
        if !raw.starts_with('/') {
            return Err(PatternError::MissingLeadingSlash(raw.to_string()));
        }

        let (path, wildcard) = match raw.strip_suffix('*') {
            Some(prefix) if prefix.ends_with('/') => (prefix, true),
            Some(_) => return Err(PatternError::MisplacedWildcard(raw.to_string())),
            None => (raw, false),
        };
        if path.contains('*') {
            return Err(PatternError::MisplacedWildcard(raw.to_string()));
        }
        if path.contains(['?', '#']) || clean_path(path) != path {
            return Err(PatternError::NotCanonical(raw.to_string()));
        }

        if wildcard || path.ends_with('/') {
            Ok(PathPattern::Subtree(path.to_string()))
        } else {
            Ok(PathPattern::Exact(path.to_string()))
        }
    }

    /// Returns true if the path falls under this pattern.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(p) => path == p,
            PathPattern::Subtree(prefix) => path.starts_with(prefix.as_str()),
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, PathPattern::Exact(_))
    }

    /// Normalized pattern text; wildcard forms are reported with a trailing slash.
    pub fn as_str(&self) -> &str {
        match self {
            PathPattern::Exact(p) | PathPattern::Subtree(p) => p,
        }
    }
}

impl std::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical form of a request path.
///
/// Removes empty and `.` segments, resolves `..`, and keeps a trailing slash
/// when the input had one.
pub fn clean_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let mut cleaned = String::with_capacity(path.len() + 1);
    cleaned.push('/');
    cleaned.push_str(&segments.join("/"));
    if path.ends_with('/') && cleaned != "/" {
        cleaned.push('/');
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!(PathPattern::parse("/").unwrap(), PathPattern::Subtree("/".into()));
        assert_eq!(PathPattern::parse("/*").unwrap(), PathPattern::Subtree("/".into()));
        assert_eq!(PathPattern::parse("/api").unwrap(), PathPattern::Exact("/api".into()));
        assert_eq!(
            PathPattern::parse("/api/").unwrap(),
            PathPattern::parse("/api/*").unwrap()
        );
    }

    #[test]
    fn test_parse_rejects_bad_patterns() {
        assert_eq!(PathPattern::parse(""), Err(PatternError::Empty));
        assert!(matches!(
            PathPattern::parse("api/"),
            Err(PatternError::MissingLeadingSlash(_))
        ));
        assert!(matches!(
            PathPattern::parse("/api*"),
            Err(PatternError::MisplacedWildcard(_))
        ));
        assert!(matches!(
            PathPattern::parse("/*/v1"),
            Err(PatternError::MisplacedWildcard(_))
        ));
        assert!(matches!(
            PathPattern::parse("/api//v1"),
            Err(PatternError::NotCanonical(_))
        ));
    }

    #[test]
    fn test_path_matcher() {
        let exact = PathPattern::parse("/api").unwrap();
        assert!(exact.matches("/api"));
        assert!(!exact.matches("/api/"));
        assert!(!exact.matches("/apix"));

        let subtree = PathPattern::parse("/api/").unwrap();
        assert!(subtree.matches("/api/"));
        assert!(subtree.matches("/api/v1/users"));
        assert!(!subtree.matches("/api"));
        assert!(!subtree.matches("/API/v1"));
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path(""), "/");
        assert_eq!(clean_path("/"), "/");
        assert_eq!(clean_path("/api/v1/"), "/api/v1/");
        assert_eq!(clean_path("//api///v1"), "/api/v1");
        assert_eq!(clean_path("/api/./v1/../me"), "/api/me");
        assert_eq!(clean_path("/../.."), "/");
        assert_eq!(clean_path("/a/.."), "/");
    }
}
