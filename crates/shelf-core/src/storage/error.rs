//! Storage errors
//!
//! I/O failures are classified by kind and by whether the slot was being
//! read or written, so front ends can tell the user what to fix.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Whether a failed operation was reading or writing a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// Errors that can occur while reading or writing a slot
#[derive(Error, Debug)]
pub enum StorageError {
    /// The data directory could not be created
    #[error("Cannot create data directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The slot file or its directory is not accessible
    #[error("Permission denied for '{path}'")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// No space left for the new collection
    #[error("No space left to write '{path}'")]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The slot file exists but could not be read
    #[error("Cannot read slot file '{path}': {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The slot file could not be written
    #[error("Cannot write slot file '{path}': {source}")]
    Unwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The finished temp file could not replace the slot file
    #[error("Cannot replace '{to}' with '{from}': {source}")]
    ReplaceFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Slot key cannot be mapped to a file name
    #[error("Invalid storage key '{key}'")]
    InvalidKey { key: String },

    /// The collection could not be encoded
    #[error("Cannot encode books: {0}")]
    Encode(#[from] serde_json::Error),

    /// I/O failure without path context
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StorageError {
    /// Classify an I/O error on `path`
    pub fn from_io(error: io::Error, path: PathBuf, access: Access) -> Self {
        if error.kind() == io::ErrorKind::PermissionDenied {
            return StorageError::PermissionDenied {
                path,
                source: error,
            };
        }
        if access == Access::Write && is_disk_full(&error) {
            return StorageError::DiskFull {
                path,
                source: error,
            };
        }
        match access {
            Access::Read => StorageError::Unreadable {
                path,
                source: error,
            },
            Access::Write => StorageError::Unwritable {
                path,
                source: error,
            },
        }
    }

    /// True when the user can fix the cause and retry
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StorageError::DiskFull { .. }
                | StorageError::PermissionDenied { .. }
                | StorageError::CreateDirectory { .. }
                | StorageError::InvalidKey { .. }
        )
    }

    /// A hint for fixing the cause, when there is one
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::DiskFull { .. } => Some("Free up disk space and try again."),
            StorageError::PermissionDenied { .. } => {
                Some("Check the permissions of the data directory, or set data_dir to a writable location.")
            }
            StorageError::CreateDirectory { .. } => {
                Some("Check that the parent of data_dir exists and is writable.")
            }
            StorageError::InvalidKey { .. } => {
                Some("Choose a storage_key made of letters, digits, '-' or '_'.")
            }
            _ => None,
        }
    }
}

fn is_disk_full(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    ["no space left", "disk full", "quota exceeded", "not enough space"]
        .iter()
        .any(|needle| msg.contains(needle))
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
