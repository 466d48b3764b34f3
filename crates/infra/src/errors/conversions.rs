//! Conversions from external infrastructure errors into domain errors.

use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;
use tokenwarden_domain::TokenWardenError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub TokenWardenError);

impl From<InfraError> for TokenWardenError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<TokenWardenError> for InfraError {
    fn from(value: TokenWardenError) -> Self {
        InfraError(value)
    }
}

trait IntoTokenWardenError {
    fn into_domain(self) -> TokenWardenError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → TokenWardenError */
/* -------------------------------------------------------------------------- */

impl IntoTokenWardenError for SqlError {
    fn into_domain(self) -> TokenWardenError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match err.code {
                    ErrorCode::DatabaseBusy => TokenWardenError::Database("database is busy".into()),
                    ErrorCode::DatabaseLocked => {
                        TokenWardenError::Database("database is locked".into())
                    }
                    ErrorCode::CannotOpen => TokenWardenError::Database(format!(
                        "unable to open database file: {message}"
                    )),
                    _ => TokenWardenError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => {
                TokenWardenError::NotFound("no rows returned by query".into())
            }
            RE::FromSqlConversionFailure(_, _, cause) => {
                TokenWardenError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, name, ty) => {
                TokenWardenError::Database(format!("invalid column type for {name}: {ty}"))
            }
            RE::IntegralValueOutOfRange(column, value) => TokenWardenError::Database(format!(
                "integer {value} out of range for column {column}"
            )),
            other => TokenWardenError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_domain())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → TokenWardenError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(TokenWardenError::Database(format!("connection pool: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → TokenWardenError */
/* -------------------------------------------------------------------------- */

impl IntoTokenWardenError for HttpError {
    fn into_domain(self) -> TokenWardenError {
        if self.is_timeout() {
            return TokenWardenError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return TokenWardenError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            return TokenWardenError::Exchange { status: status.as_u16() };
        }

        if self.is_decode() {
            return TokenWardenError::MalformedResponse(self.to_string());
        }

        TokenWardenError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_domain())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → TokenWardenError */
/* -------------------------------------------------------------------------- */

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(TokenWardenError::MalformedResponse(value.to_string()))
    }
}

/// Map a panicked or cancelled blocking task.
pub fn map_join_error(err: tokio::task::JoinError) -> TokenWardenError {
    if err.is_cancelled() {
        TokenWardenError::Internal("blocking task cancelled".into())
    } else {
        TokenWardenError::Internal(format!("blocking task panicked: {err}"))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
