use sea_orm::{DbBackend, DbErr};
use thiserror::Error;

/// Errors surfaced to the caller of a list operation.
///
/// Normalization problems (bad page number, bad cursor, out-of-range limit)
/// never show up here; they are corrected before the query runs.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Validation: {0}")]
    Validation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Store error while listing {entity}: {source}")]
    Store {
        entity: &'static str,
        #[source]
        source: StoreError,
    },
}

impl QueryError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn store(entity: &'static str, source: impl Into<StoreError>) -> Self {
        Self::Store {
            entity,
            source: source.into(),
        }
    }

    /// Whether this error is likely transient (e.g. DB connection lost)
    /// and the operation may succeed if retried by the caller.
    pub fn is_transient(&self) -> bool {
        match self {
            QueryError::Store {
                source: StoreError::Database(err),
                ..
            } => matches!(err, DbErr::Conn(_) | DbErr::ConnectionAcquire(_)),
            _ => false,
        }
    }
}

impl From<validator::ValidationErrors> for QueryError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let msg = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{:?}", e.code));
                    format!("{}: {}", field, msg)
                })
            })
            .collect();

        if field_errors.is_empty() {
            QueryError::Validation("Validation failed".to_string())
        } else {
            QueryError::Validation(field_errors.join("; "))
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Unsupported database backend: {0:?}")]
    UnsupportedBackend(DbBackend),

    #[error("Already exists: {entity} with id={id}")]
    Conflict { entity: &'static str, id: String },
}

/// A stored row that could not be mapped into its entity.
///
/// List operations skip such rows instead of failing the page.
#[derive(Debug, Error)]
#[error("Cannot convert {entity} row: {reason}")]
pub struct ConversionError {
    pub entity: &'static str,
    pub reason: String,
}

impl ConversionError {
    pub fn new(entity: &'static str, reason: impl ToString) -> Self {
        Self {
            entity,
            reason: reason.to_string(),
        }
    }
}

pub type ListResult<T> = Result<T, QueryError>;
