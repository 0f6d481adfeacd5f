//! Embedded PostgreSQL provisioning for repository tests.
//!
//! One cluster serves the whole test binary. The schema is migrated once into
//! a template database named after a hash of `migrations/`, and every test
//! clones a private database from that template.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use incident_backend::domain::ports::IncidentRepositoryError;
use incident_backend::outbound::persistence::run_migrations;
use pg_embedded_setup_unpriv::test_support::hash_directory;
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use uuid::Uuid;

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const TEMPLATE_NAME_PREFIX: &str = "incidents_template";

/// The cluster shared by every test in this binary.
pub fn shared_cluster() -> Result<&'static ClusterHandle, String> {
    pg_embedded_setup_unpriv::test_support::shared_cluster_handle()
        .map_err(|err| format!("start embedded cluster: {err:?}"))
}

fn template_database_name() -> Result<String, IncidentRepositoryError> {
    let migrations = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations");
    let hash = hash_directory(migrations)
        .map_err(|err| IncidentRepositoryError::query(format!("hash migrations: {err}")))?;
    let short_hash = hash.get(..8).unwrap_or(&hash);
    Ok(format!("{TEMPLATE_NAME_PREFIX}_{short_hash}"))
}

fn ensure_template_database(cluster: &ClusterHandle) -> Result<String, IncidentRepositoryError> {
    let template_name = template_database_name()?;
    let _lock = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let exists = cluster
        .database_exists(template_name.as_str())
        .map_err(|err| IncidentRepositoryError::query(format!("template check: {err:?}")))?;
    if !exists {
        cluster
            .create_database(template_name.as_str())
            .map_err(|err| IncidentRepositoryError::query(format!("create template: {err:?}")))?;
        migrate_schema(&cluster.connection().database_url(&template_name))?;
    }

    Ok(template_name)
}

/// A fresh database holding the migrated, empty `incidents` table.
pub fn provision_template_database(
    cluster: &ClusterHandle,
) -> Result<TemporaryDatabase, IncidentRepositoryError> {
    let template_name = ensure_template_database(cluster)?;
    let db_name = format!("test_{}", Uuid::new_v4().simple());
    cluster
        .temporary_database_from_template(db_name.as_str(), template_name.as_str())
        .map_err(|err| {
            IncidentRepositoryError::query(format!("create database from template: {err:?}"))
        })
}

/// Apply the backend's embedded migrations to `url`.
pub fn migrate_schema(url: &str) -> Result<(), IncidentRepositoryError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| IncidentRepositoryError::connection(err.to_string()))?;
    runtime
        .block_on(run_migrations(url))
        .map_err(|err| IncidentRepositoryError::query(format!("migration: {err}")))
}
