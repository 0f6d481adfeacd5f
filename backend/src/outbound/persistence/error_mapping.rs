//! Diesel and pool error mapping for the incident repository.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;
use crate::domain::ports::IncidentRepositoryError;

/// Pool failures mean the store is unreachable.
pub(super) fn map_pool_error(error: PoolError) -> IncidentRepositoryError {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    IncidentRepositoryError::connection(message)
}

/// Map Diesel errors onto connection, constraint and query failures.
///
/// Constraint and serialization failures keep the database message so callers
/// can explain why a change was refused.
pub(super) fn map_diesel_error(error: DieselError) -> IncidentRepositoryError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(error = %error, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            IncidentRepositoryError::connection("database connection closed")
        }
        DieselError::DatabaseError(kind, info) if is_constraint_kind(&kind) => {
            IncidentRepositoryError::constraint(info.message())
        }
        DieselError::RollbackErrorOnCommit { commit_error, .. } => {
            IncidentRepositoryError::constraint(commit_error.to_string())
        }
        DieselError::NotFound => IncidentRepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => IncidentRepositoryError::query("database query error"),
        _ => IncidentRepositoryError::query("database error"),
    }
}

fn is_constraint_kind(kind: &DatabaseErrorKind) -> bool {
    matches!(
        kind,
        DatabaseErrorKind::UniqueViolation
            | DatabaseErrorKind::ForeignKeyViolation
            | DatabaseErrorKind::NotNullViolation
            | DatabaseErrorKind::CheckViolation
            | DatabaseErrorKind::SerializationFailure
    )
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn database_error(kind: DatabaseErrorKind, message: &str) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(message.to_owned()))
    }

    #[rstest]
    #[case(DatabaseErrorKind::CheckViolation)]
    #[case(DatabaseErrorKind::NotNullViolation)]
    #[case(DatabaseErrorKind::UniqueViolation)]
    #[case(DatabaseErrorKind::SerializationFailure)]
    fn constraint_kinds_keep_database_message(#[case] kind: DatabaseErrorKind) {
        let error = map_diesel_error(database_error(kind, "violates incidents_timestamps_ordered"));
        assert_eq!(
            error,
            IncidentRepositoryError::constraint("violates incidents_timestamps_ordered")
        );
    }

    #[rstest]
    fn closed_connection_maps_to_connection_error() {
        let error = map_diesel_error(database_error(DatabaseErrorKind::ClosedConnection, "gone"));
        assert!(matches!(error, IncidentRepositoryError::Connection { .. }));
    }

    #[rstest]
    fn other_errors_map_to_query_error() {
        let error = map_diesel_error(database_error(DatabaseErrorKind::Unknown, "syntax"));
        assert!(matches!(error, IncidentRepositoryError::Query { .. }));
    }

    #[rstest]
    fn pool_checkout_maps_to_connection_error() {
        let error = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(error, IncidentRepositoryError::connection("timed out"));
    }
}
