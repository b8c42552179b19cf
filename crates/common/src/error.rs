//! Error types shared by the bucket core and its drivers.

use std::path::PathBuf;

use crate::config::ConfigError;

/// Precondition failures on paths handed to a bucket.
#[derive(Debug, thiserror::Error)]
pub enum FileHandlingError {
    #[error("path not found: {0}")]
    PathNotFound(String),
    #[error("path is not a file: {0}")]
    NotAFile(String),
    #[error("path is not a directory: {0}")]
    NotADirectory(String),
    #[error("path already exists: {0}")]
    AlreadyExists(String),
    #[error("bucket is not public")]
    NotPublic,
    #[error("directory nesting exceeds {limit} levels: {path}")]
    TooDeep { path: String, limit: usize },
}

/// Failures of the download flow.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("mime type '{mime}' is not allowed for download: {path}")]
    ForbiddenMimeType { path: String, mime: String },
    #[error("download source not found: {0}")]
    SourceMissing(String),
    #[error("staged download file is missing: {0}")]
    StagingMissing(PathBuf),
    #[error("staged download file is not readable: {0}")]
    StagingUnreadable(PathBuf),
    #[error("staged download file is not writable: {0}")]
    StagingUnwritable(PathBuf),
    #[error("download io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures reported by a storage backend while moving bytes.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("destination is not writable: {0}")]
    DestinationNotWritable(String),
    #[error("copy from '{from}' to '{to}' failed: {reason}")]
    CopyFailed {
        from: String,
        to: String,
        reason: String,
    },
    #[error("ftp error: {message}")]
    Ftp {
        /// Server reply code, when the server answered at all
        status: Option<u32>,
        message: String,
    },
}

/// Reply code for "requested action not taken; file unavailable".
pub const FTP_FILE_UNAVAILABLE: u32 = 550;

impl BackendError {
    pub fn ftp(status: Option<u32>, message: impl Into<String>) -> Self {
        BackendError::Ftp {
            status,
            message: message.into(),
        }
    }

    /// Whether the server refused because the target does not exist.
    /// Every other failure, a dropped connection included, is not.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            BackendError::Ftp {
                status: Some(FTP_FILE_UNAVAILABLE),
                ..
            }
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BucketError {
    #[error(transparent)]
    FileHandling(#[from] FileHandlingError),
    #[error(transparent)]
    Download(#[from] DownloadError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("connection error: {0}")]
    Connection(String),
    #[error("authentication error: {0}")]
    Authentication(String),
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),
    #[error("missing component: {0} support is not compiled in")]
    MissingCapability(&'static str),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`BucketError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FileHandling,
    Download,
    Backend,
    Connection,
    Authentication,
    Configuration,
    MissingCapability,
    Io,
}

impl BucketError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BucketError::FileHandling(_) => ErrorKind::FileHandling,
            BucketError::Download(_) => ErrorKind::Download,
            BucketError::Backend(_) => ErrorKind::Backend,
            BucketError::Connection(_) => ErrorKind::Connection,
            BucketError::Authentication(_) => ErrorKind::Authentication,
            BucketError::Configuration(_) => ErrorKind::Configuration,
            BucketError::MissingCapability(_) => ErrorKind::MissingCapability,
            BucketError::Io(_) => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, BucketError>;
