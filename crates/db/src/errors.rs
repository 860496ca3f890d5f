use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Mapping error: {0}")]
    MappingError(String),
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::MappingError(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

// Convert DbError to DomainError
impl From<DbError> for domain::errors::DomainError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(msg) => domain::errors::DomainError::NotFound(msg),
            DbError::InvalidState(msg) => domain::errors::DomainError::InvalidState(msg),
            DbError::DatabaseError(e) => {
                domain::errors::DomainError::DatabaseError(e.to_string())
            }
            DbError::MappingError(msg) => {
                domain::errors::DomainError::InternalError(format!("Mapping error: {}", msg))
            }
        }
    }
}
