//! Outbound adapters implementing domain ports.

pub mod geocoding;
pub mod persistence;
