//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, query)
//!     → router.rs (route lookup, redirects)
//!     → matcher.rs (evaluate path patterns)
//!     → Return: Matched(backend), Redirect(location) or NotFound
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → Parse patterns (exact, subtree)
//!     → Reject duplicates
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: most specific pattern wins, independent of registration order

pub mod matcher;
pub mod router;

pub use matcher::{PathPattern, PatternError};
pub use router::{Resolution, Route, RouteTable};
