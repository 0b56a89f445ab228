//! Conversions from external infrastructure errors into domain errors.

use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;
use slotbook_domain::SlotbookError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SlotbookError);

impl From<InfraError> for SlotbookError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SlotbookError> for InfraError {
    fn from(value: SlotbookError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoSlotbookError {
    fn into_slotbook(self) -> SlotbookError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → SlotbookError */
/* -------------------------------------------------------------------------- */

impl IntoSlotbookError for SqlError {
    fn into_slotbook(self) -> SlotbookError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        SlotbookError::ConcurrencyConflict("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        SlotbookError::ConcurrencyConflict("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => {
                        SlotbookError::ConcurrencyConflict("unique constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        SlotbookError::Database("foreign key constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, _) => {
                        SlotbookError::Database(format!("constraint violation: {message}"))
                    }
                    _ => SlotbookError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => SlotbookError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                SlotbookError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                SlotbookError::Database(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => {
                SlotbookError::Database("invalid UTF-8 returned from sqlite".into())
            }
            RE::InvalidParameterName(parameter_name) => {
                SlotbookError::Database(format!("invalid parameter name: {parameter_name}"))
            }
            RE::InvalidPath(path) => SlotbookError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            RE::InvalidQuery => SlotbookError::Database("invalid SQL query".into()),
            other => SlotbookError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_slotbook())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → SlotbookError */
/* -------------------------------------------------------------------------- */

impl IntoSlotbookError for HttpError {
    fn into_slotbook(self) -> SlotbookError {
        if self.is_timeout() {
            return SlotbookError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return SlotbookError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                404 => SlotbookError::NotFound(message),
                429 => SlotbookError::Network(message),
                400..=499 => SlotbookError::ExternalSync(message),
                500..=599 => SlotbookError::Network(message),
                _ => SlotbookError::Network(message),
            };
        }

        SlotbookError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_slotbook())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
