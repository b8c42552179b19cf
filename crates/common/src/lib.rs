/**
 * The bucket itself: path resolution, precondition
 *  checks, recursive directory handling and the
 *  download flow, on top of any driver.
 */
pub mod bucket;
/**
 * Bucket configuration, loaded from TOML
 *  and validated before a bucket is built.
 */
pub mod config;
/**
 * Staged downloads and the response
 *  headers that go with them.
 */
pub mod download;
/**
 * Storage backends.
 *  - Local filesystem
 *  - FTP over one persistent control connection
 */
pub mod driver;
pub mod error;
pub mod file_info;
/**
 * Remote path normalization against
 *  a bucket's base directory.
 */
pub mod path;

pub mod prelude {
    pub use crate::bucket::Bucket;
    pub use crate::config::{BucketConfig, DriverKind, FtpServerConfig};
    pub use crate::download::Download;
    pub use crate::driver::{Driver, FtpDriver, FtpSession, LocalDriver};
    pub use crate::error::{BucketError, ErrorKind, Result};
    pub use crate::file_info::{DirectoryListing, FileInfo, FileType};
}
