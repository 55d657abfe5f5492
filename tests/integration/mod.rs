//! Integration tests for conntrack-other
//!
//! # Test Organization
//!
//! - `state_machine`: exhaustive direction sequences against the public handler API
//! - `table`: connection table end to end, including hardware sync
//! - `config`: configuration files on disk and environment overrides
//! - `concurrency`: updates of distinct connections from many threads
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test integration_tests
//! ```

pub mod config;
pub mod table;
