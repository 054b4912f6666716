//! Error types for annotab.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for annotab operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for annotab operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Collection header metadata absent at the expected path.
    ///
    /// Fatal for collection construction; the hint points at the most common
    /// cause (an incomplete or misplaced collection clone).
    #[error(
        "annotation collection header could not be found: {path}\n  --> make sure the collection clone worked properly"
    )]
    NotFound {
        /// Expected location of `header.json`.
        path: PathBuf,
    },

    /// Operation referenced a property never observed in the collection.
    ///
    /// Recoverable: the message lists every valid property name so the
    /// caller can retry with one of them.
    #[error("property '{property}' doesn't exist; choose one of: {}", known.join(", "))]
    InvalidProperty {
        /// The property name that was requested.
        property: String,
        /// Property names actually present in the collection.
        known: Vec<String>,
    },

    /// A partition file held invalid JSON or a record missing required fields.
    ///
    /// Propagated rather than skipped: it indicates storage corruption.
    #[error("malformed annotation record in {path}: {message}")]
    MalformedRecord {
        /// The partition file that failed to parse.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// An annotation span violates `start <= end`.
    #[error("invalid annotation span [{start}, {end}): start must not exceed end")]
    InvalidSpan {
        /// Span start in document character offsets.
        start: usize,
        /// Span end in document character offsets.
        end: usize,
    },

    /// A version-control step exited unsuccessfully.
    #[error("git {step} failed in {}: {status}", dir.display())]
    Sync {
        /// Which git step failed (`add`, `commit` or `push`).
        step: &'static str,
        /// Working directory the command ran in.
        dir: PathBuf,
        /// Exit status description from the subprocess.
        status: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Create a missing-header error.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Error::NotFound { path: path.into() }
    }

    /// Create an unknown-property error listing the valid names.
    pub fn invalid_property(property: impl Into<String>, known: Vec<String>) -> Self {
        Error::InvalidProperty {
            property: property.into(),
            known,
        }
    }

    /// Create a malformed-record error for a partition file.
    pub fn malformed_record(path: &Path, message: impl ToString) -> Self {
        Error::MalformedRecord {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }

    /// Create a sync error for a failed git step.
    pub fn sync(step: &'static str, dir: &Path, status: impl ToString) -> Self {
        Error::Sync {
            step,
            dir: dir.to_path_buf(),
            status: status.to_string(),
        }
    }
}
