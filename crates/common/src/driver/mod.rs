//! Storage backends.
//!
//! A [`Driver`] exposes the leaf operations a backend must provide. Every
//! path it receives has already been normalized by the owning
//! [`Bucket`](crate::bucket::Bucket); drivers never see caller input
//! directly and never check preconditions the bucket is responsible for.

use std::path::Path;

use crate::error::Result;
use crate::file_info::{DirectoryListing, FileInfo};

pub mod ftp;
mod local;

pub use ftp::{FtpDriver, FtpSession};
pub use local::LocalDriver;

pub trait Driver {
    /// Short backend name used in logs.
    fn name(&self) -> &'static str;

    /// Whether anything exists at `path`.
    fn exists(&self, path: &str) -> Result<bool>;

    fn is_file(&self, path: &str) -> Result<bool>;

    fn is_dir(&self, path: &str) -> Result<bool>;

    /// Bare names of the direct children of `path`.
    fn dir_list(&self, path: &str) -> Result<Vec<String>>;

    fn dir_list_detailed(&self, path: &str) -> Result<DirectoryListing>;

    /// Create a single directory level. The parent must exist.
    fn make_dir(&self, path: &str) -> Result<()>;

    /// Remove an empty directory.
    fn remove_dir(&self, path: &str) -> Result<()>;

    fn remove_file(&self, path: &str) -> Result<()>;

    fn file_info(&self, path: &str) -> Result<FileInfo>;

    /// Up to `limit` bytes from the start of the file at `path`, read
    /// without staging a local copy.
    fn read_head(&self, path: &str, limit: usize) -> Result<Vec<u8>>;

    /// Copy a local file to `remote`, replacing nothing the bucket has not
    /// already checked.
    fn send_file(&self, local: &Path, remote: &str) -> Result<()>;

    /// Copy `remote` to a local file.
    fn pull_file(&self, remote: &str, local: &Path) -> Result<()>;
}
