//! HTTP inbound adapter exposing the incident REST endpoints.

pub mod error;
pub mod health;
pub mod incidents;
pub mod state;

pub use error::ApiResult;
