use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SlaError {
    /// Invalid or missing operational hours / duration configuration.
    #[error("Configuration error: {0}")]
    Config(String),
    /// The walker could not produce a due date.
    #[error("Calculation error: {0}")]
    Calculation(String),
    /// Loading or writing calendar data failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

pub type SlaResult<T> = Result<T, SlaError>;

impl SlaError {
    pub fn config(msg: impl Into<String>) -> Self {
        SlaError::Config(msg.into())
    }

    pub fn calculation(msg: impl Into<String>) -> Self {
        SlaError::Calculation(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        SlaError::Storage(msg.into())
    }
}

// Convert from sqlx errors
impl From<sqlx::Error> for SlaError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                SlaError::Storage(format!("Database error: {}", db_err.message()))
            }
            sqlx::Error::PoolTimedOut => {
                SlaError::Storage("Timed out acquiring a database connection".to_string())
            }
            other => SlaError::Storage(other.to_string()),
        }
    }
}

// Stored operational hours documents are JSON
impl From<serde_json::Error> for SlaError {
    fn from(err: serde_json::Error) -> Self {
        SlaError::Config(format!("Malformed operational hours document: {}", err))
    }
}
