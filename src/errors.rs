use std::path::PathBuf;

use thiserror::Error;

use crate::model::RestoreType;

#[derive(Error, Debug)]
pub enum RestoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to deserialize value of key '{key}': {message}")]
    Decode { key: String, message: String },

    #[error("I/O error while reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Remote call '{operation}' failed{}: {message}", .status.map(|s| format!(" with status {s}")).unwrap_or_default())]
    Remote {
        operation: String,
        status: Option<u16>,
        message: String,
    },

    #[error("'{operation}' still failing after {attempts} attempts: {source}")]
    RetriesExhausted {
        operation: String,
        attempts: u32,
        #[source]
        source: Box<RestoreError>,
    },

    #[error("{} of the {restore_type} dump files failed: {}", .failures.len(), describe_failures(.failures))]
    UnitsFailed {
        restore_type: RestoreType,
        failures: Vec<(PathBuf, RestoreError)>,
    },
}

impl RestoreError {
    pub fn decode(key: &str, message: impl ToString) -> Self {
        RestoreError::Decode {
            key: key.to_string(),
            message: message.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RestoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// Connection failures, timeouts, throttling and server-side errors are
    /// worth another attempt; everything else fails the same way twice.
    pub fn is_retryable(&self) -> bool {
        match self {
            RestoreError::Remote { status: None, .. } => true,
            RestoreError::Remote {
                status: Some(code), ..
            } => *code == 408 || *code == 429 || *code >= 500,
            _ => false,
        }
    }
}

fn describe_failures(failures: &[(PathBuf, RestoreError)]) -> String {
    failures
        .iter()
        .map(|(path, err)| format!("{} ({})", path.display(), err))
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, RestoreError>;
