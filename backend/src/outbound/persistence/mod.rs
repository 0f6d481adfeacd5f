//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Thin adapters translate between Diesel rows and domain records; row
//! structs (`models.rs`) and table definitions (`schema.rs`) stay private to
//! this module. Connections come from a `bb8` pool through `diesel-async`.
//!
//! ```no_run
//! use incident_backend::outbound::persistence::{
//!     DbPool, DieselIncidentRepository, PoolConfig,
//! };
//!
//! # async fn example() -> Result<(), incident_backend::outbound::persistence::PoolError> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/incidents")).await?;
//! let repo = DieselIncidentRepository::new(pool);
//! # let _ = repo;
//! # Ok(())
//! # }
//! ```

mod diesel_incident_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_incident_repository::DieselIncidentRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DEFAULT_CHECKOUT_TIMEOUT, DEFAULT_MAX_CONNECTIONS, DbPool, PoolConfig, PoolError};
