//! xvfs error types.
//!
//! Every failure in xvfs is a logical or data condition, never a transient
//! I/O fault, so nothing here carries retry hints.

use std::io;
use thiserror::Error;

/// xvfs error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XvfsError {
    /// Path has no record.
    #[error("no such file or directory: {0}")]
    NotFound(String),

    /// Bad seek target or malformed request.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Attempted to stream a directory.
    #[error("is a directory: {0}")]
    IsADirectory(String),

    /// Expected a directory.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// Requested access the entry does not grant.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Any write attempt.
    #[error("read-only filesystem: {0}")]
    ReadOnly(String),

    /// Invariant failure inside xvfs or a data provider.
    #[error("internal error: {0}")]
    Internal(String),

    /// Instance was built against a different protocol version.
    #[error("protocol mismatch: expected version {expected}, found {found}")]
    ProtocolMismatch { expected: u32, found: u32 },

    /// The host refused to register a filesystem driver.
    #[error("host registration failed: {0}")]
    HostRegistration(String),
}

impl XvfsError {
    /// Create a NotFound error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create an InvalidArgument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create an IsADirectory error.
    pub fn is_a_directory(path: impl Into<String>) -> Self {
        Self::IsADirectory(path.into())
    }

    /// Create a NotADirectory error.
    pub fn not_a_directory(path: impl Into<String>) -> Self {
        Self::NotADirectory(path.into())
    }

    /// Create a PermissionDenied error.
    pub fn permission_denied(path: impl Into<String>) -> Self {
        Self::PermissionDenied(path.into())
    }

    /// Create a ReadOnly error.
    pub fn read_only(path: impl Into<String>) -> Self {
        Self::ReadOnly(path.into())
    }

    /// Create an Internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a HostRegistration error.
    pub fn host_registration(msg: impl Into<String>) -> Self {
        Self::HostRegistration(msg.into())
    }

    /// POSIX errno a host should report for this error.
    pub fn errno(&self) -> i32 {
        match self {
            XvfsError::NotFound(_) => libc::ENOENT,
            XvfsError::InvalidArgument(_) => libc::EINVAL,
            XvfsError::IsADirectory(_) => libc::EISDIR,
            XvfsError::NotADirectory(_) => libc::ENOTDIR,
            XvfsError::PermissionDenied(_) => libc::EACCES,
            XvfsError::ReadOnly(_) => libc::EROFS,
            XvfsError::Internal(_) => libc::EINVAL,
            XvfsError::ProtocolMismatch { .. } => libc::EPROTO,
            XvfsError::HostRegistration(_) => libc::EINVAL,
        }
    }

    /// Short `perror`-style description, without the offending path.
    pub fn describe(&self) -> &'static str {
        match self {
            XvfsError::NotFound(_) => "No such file or directory",
            XvfsError::InvalidArgument(_) => "Invalid argument",
            XvfsError::IsADirectory(_) => "Is a directory",
            XvfsError::NotADirectory(_) => "Not a directory",
            XvfsError::PermissionDenied(_) => "Permission denied",
            XvfsError::ReadOnly(_) => "Read-only file system",
            XvfsError::Internal(_) => "Internal error",
            XvfsError::ProtocolMismatch { .. } => "Protocol mismatch",
            XvfsError::HostRegistration(_) => "Filesystem registration failed",
        }
    }
}

/// Convert XvfsError to std::io::Error for hosts speaking `std::io`.
impl From<XvfsError> for io::Error {
    fn from(e: XvfsError) -> Self {
        let kind = match &e {
            XvfsError::NotFound(_) => io::ErrorKind::NotFound,
            XvfsError::InvalidArgument(_) => io::ErrorKind::InvalidInput,
            XvfsError::IsADirectory(_) => io::ErrorKind::IsADirectory,
            XvfsError::NotADirectory(_) => io::ErrorKind::NotADirectory,
            XvfsError::PermissionDenied(_) => io::ErrorKind::PermissionDenied,
            XvfsError::ReadOnly(_) => io::ErrorKind::ReadOnlyFilesystem,
            XvfsError::Internal(_)
            | XvfsError::ProtocolMismatch { .. }
            | XvfsError::HostRegistration(_) => io::ErrorKind::Other,
        };
        io::Error::new(kind, e)
    }
}

/// xvfs result type.
pub type XvfsResult<T> = Result<T, XvfsError>;
