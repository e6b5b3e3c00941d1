//! Error taxonomy for command store operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by [`crate::CommandStore`]
#[derive(Error, Debug)]
pub enum StoreError {
    /// A required field was missing or unusable
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("Command not found: {0}")]
    NotFound(String),

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn missing(field: &'static str) -> Self {
        Self::Validation {
            field,
            message: format!("{} is required", field),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// HTTP status the browser front end reports for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::NotFound(_) => 404,
            Self::Io { .. } => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
