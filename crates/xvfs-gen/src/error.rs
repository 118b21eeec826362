//! Generator errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use xvfs_core::XvfsError;

/// Errors raised while building or emitting a table.
#[derive(Debug, Error)]
pub enum GenError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("{} has a name that is not valid UTF-8", .0.display())]
    NonUtf8Name(PathBuf),

    /// A followed symbolic link leads back to one of its own ancestors.
    #[error("{} loops back to {}", .path.display(), .ancestor.display())]
    SymlinkLoop { path: PathBuf, ancestor: PathBuf },

    /// Instance name cannot be used as a mountpoint segment.
    #[error(transparent)]
    InvalidName(#[from] XvfsError),

    #[error("too many records: {0} (indices must stay below the bucket sentinel)")]
    TooManyRecords(usize),

    #[error("failed to parse config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Formatting the generated source failed.
    #[error("failed to emit source for filesystem {0:?}")]
    Emit(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// `build::embed_directory` called outside a build script.
    #[error("OUT_DIR is not set; embed_directory must run from build.rs")]
    MissingOutDir,
}

impl GenError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type GenResult<T> = Result<T, GenError>;
