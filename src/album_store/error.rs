use thiserror::Error;

/// Errors raised by album store backends.
///
/// Driver errors keep their own message, which is what ends up in the body of
/// a 500 response.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Postgres(#[from] sqlx::Error),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Invalid row: {0}")]
    InvalidRow(String),
}

impl From<anyhow::Error> for StoreError {
    fn from(err: anyhow::Error) -> Self {
        StoreError::Schema(format!("{:#}", err))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
