use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Remote API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid {table} row: {message}")]
    Decode {
        table: &'static str,
        message: String,
    },

    #[error("No rows returned from {0}")]
    EmptyResponse(&'static str),
}

impl StorageError {
    pub(crate) fn decode(table: &'static str, err: serde_json::Error) -> Self {
        StorageError::Decode {
            table,
            message: err.to_string(),
        }
    }
}
