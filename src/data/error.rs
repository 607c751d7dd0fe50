use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DataError>;

// ---------------------------------------------------------------------------
// DataError – everything that can go wrong between a log file and a window
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum DataError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed delimited text in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("format error in {}: {message}", path.display())]
    Format { path: PathBuf, message: String },

    #[error(
        "{}: {what} needs at least {required} boundary markers, found {found}",
        path.display()
    )]
    IndexDerivation {
        path: PathBuf,
        what: &'static str,
        found: usize,
        required: usize,
    },

    #[error("alignment error: {0}")]
    Alignment(String),
}

impl DataError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        DataError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn csv(path: &Path, source: csv::Error) -> Self {
        DataError::Csv {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn format(path: &Path, message: impl Into<String>) -> Self {
        DataError::Format {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Load-time failures abort the whole invocation; derivation and
    /// alignment shortfalls only abort the report that hit them.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DataError::Io { .. } | DataError::Csv { .. } | DataError::Format { .. }
        )
    }
}
