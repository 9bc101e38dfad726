//! Conversions from external infrastructure errors into domain errors.

use praxis_domain::PraxisError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub PraxisError);

impl From<InfraError> for PraxisError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<PraxisError> for InfraError {
    fn from(value: PraxisError) -> Self {
        InfraError(value)
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        use rusqlite::ffi::ErrorCode;

        let mapped = match &value {
            SqlError::SqliteFailure(err, maybe_message) => match err.code {
                ErrorCode::DatabaseBusy => PraxisError::Database("database is busy".into()),
                ErrorCode::DatabaseLocked => PraxisError::Database("database is locked".into()),
                ErrorCode::ConstraintViolation => PraxisError::Database(format!(
                    "constraint violation: {}",
                    maybe_message.clone().unwrap_or_default()
                )),
                _ => PraxisError::Database(value.to_string()),
            },
            SqlError::QueryReturnedNoRows => PraxisError::Database("no rows returned".into()),
            other => PraxisError::Database(other.to_string()),
        };
        InfraError(mapped)
    }
}

/// Shorthand used by the repositories: any SQL failure becomes a domain
/// `Database` error.
pub(crate) fn sql_err(err: SqlError) -> PraxisError {
    InfraError::from(err).into()
}
