//! Shared helpers for integration tests that need a real PostgreSQL.
//!
//! Each test crate under `backend/tests/` pulls this in with `mod support;`.

pub mod cluster_skip;
pub mod embedded_postgres;

pub use cluster_skip::handle_cluster_setup_failure;
pub use embedded_postgres::{provision_template_database, shared_cluster};
