//! # TaxBridge Shared Library
//!
//! Shared types and business logic used by the TaxBridge API server:
//!
//! - `models`: tenant, user, buyer and invoice records plus their
//!   database operations
//! - `auth`: password hashing, session tokens and the request auth context
//! - `db`: PostgreSQL pool construction and migrations
//! - `fbr`: the FBR submission adapter and the submission orchestrator

pub mod auth;
pub mod db;
pub mod fbr;
pub mod models;

/// Current version of the TaxBridge shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
