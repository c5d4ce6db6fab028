use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the save-file collaborator. The model itself never fails;
/// these only surface at load/save points.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid save slot name `{0}`")]
    InvalidSlot(String),

    #[error("save slot `{0}` does not exist")]
    NotFound(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed data in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode save data: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not resolve a data directory for this platform")]
    NoProjectDirs,

    #[error("could not create {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
