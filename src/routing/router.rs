//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes
//! - Look up the backend for a request path
//! - Return matched backend, redirect, or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Exact patterns beat subtree patterns; longer subtrees beat shorter ones
//! - O(n) scan (the table holds a handful of rules)
//! - Matching runs on the percent-decoded path; the raw path is what gets forwarded

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

use crate::config::{Backend, RouteConfig};
use crate::routing::matcher::{clean_path, PathPattern, PatternError};

/// A compiled route.
#[derive(Debug, Clone)]
pub struct Route {
    pub pattern: PathPattern,
    pub backend: Backend,
}

/// Outcome of a table lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Forward to this backend.
    Matched(Backend),
    /// Answer with a permanent redirect to this location.
    Redirect(String),
    NotFound,
}

/// Ordered, immutable set of path rules.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a rule list in registration order.
    pub fn from_config(routes: &[RouteConfig]) -> Result<Self, PatternError> {
        let mut table = Self::new();
        for route in routes {
            table.register(&route.pattern, route.backend)?;
        }
        Ok(table)
    }

    /// Add a rule. A pattern may only be registered once.
    pub fn register(&mut self, pattern: &str, backend: Backend) -> Result<(), PatternError> {
        let pattern = PathPattern::parse(pattern)?;
        if self.routes.iter().any(|r| r.pattern == pattern) {
            return Err(PatternError::Duplicate(pattern.to_string()));
        }
        self.routes.push(Route { pattern, backend });
        Ok(())
    }

    /// Backend for the path, or `None` if no rule covers it.
    pub fn resolve(&self, path: &str) -> Option<Backend> {
        self.best_match(path).map(|r| r.backend)
    }

    /// Full lookup including canonical-path and trailing-slash redirects.
    ///
    /// `raw_path` is the path as it appears on the wire, percent-encoding included.
    pub fn lookup(&self, raw_path: &str, query: Option<&str>) -> Resolution {
        let decoded = percent_decode_str(raw_path).decode_utf8_lossy();
        let path = decoded.as_ref();

        let cleaned = clean_path(path);
        if cleaned != path {
            return Resolution::Redirect(with_query(encode_path(&cleaned), query));
        }

        let best = self.best_match(path);
        let exact = best.is_some_and(|r| r.pattern.is_exact() || path.ends_with('/'));
        if !exact {
            let with_slash = format!("{}/", path);
            if self.is_subtree_root(&with_slash) {
                return Resolution::Redirect(with_query(encode_path(&with_slash), query));
            }
        }

        match best {
            Some(route) => Resolution::Matched(route.backend),
            None => Resolution::NotFound,
        }
    }

    fn best_match(&self, path: &str) -> Option<&Route> {
        if let Some(route) = self
            .routes
            .iter()
            .find(|r| r.pattern.is_exact() && r.pattern.matches(path))
        {
            return Some(route);
        }

        let mut best: Option<&Route> = None;
        for route in self.routes.iter().filter(|r| r.pattern.matches(path)) {
            let longer = best.map_or(true, |b| {
                route.pattern.as_str().len() > b.pattern.as_str().len()
            });
            if longer {
                best = Some(route);
            }
        }
        best
    }

    fn is_subtree_root(&self, path: &str) -> bool {
        self.routes
            .iter()
            .any(|r| !r.pattern.is_exact() && r.pattern.as_str() == path)
    }
}

/// Characters that must stay escaped in a redirect location path.
const PATH_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, PATH_ESCAPE).to_string()
}

fn with_query(path: String, query: Option<&str>) -> String {
    match query {
        Some(q) if !q.is_empty() => format!("{}?{}", path, q),
        _ => path,
    }
}
