use thiserror::Error;

use crate::model::TransactionId;

pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP transaction {0} not found in the transaction store")]
    TransactionNotFound(TransactionId),

    #[error("Scan dump error: {0}")]
    Dump(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to replace report file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ReportError {
    pub fn exit_code(&self) -> i32 {
        2
    }
}
