//! Credential subsystem.
//!
//! # Data Flow
//! ```text
//! Every inbound request:
//!     → source.rs reads the mounted token file (optional)
//!     → environment override replaces it when non-empty
//!     → dispatcher sets `Authorization: Bearer <token>` if anything was found
//! ```
//!
//! # Design Decisions
//! - Nothing is cached; a rotated token is picked up by the next request
//! - A missing or unreadable file is not an error

pub mod source;

pub use source::CredentialSource;
