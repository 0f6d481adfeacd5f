//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see the driving ports,
//! so they stay testable without a database or network.

use std::sync::Arc;

use crate::domain::ports::{
    FixtureIncidentCommand, FixtureIncidentQuery, IncidentCommand, IncidentQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub incidents: Arc<dyn IncidentCommand>,
    pub incidents_query: Arc<dyn IncidentQuery>,
}

impl HttpState {
    /// Bundle the incident ports.
    pub fn new(
        incidents: Arc<dyn IncidentCommand>,
        incidents_query: Arc<dyn IncidentQuery>,
    ) -> Self {
        Self {
            incidents,
            incidents_query,
        }
    }
}

impl Default for HttpState {
    /// Fixture ports backed by an empty store.
    fn default() -> Self {
        Self::new(Arc::new(FixtureIncidentCommand), Arc::new(FixtureIncidentQuery))
    }
}
