use std::fs;
use std::path::Path;

use crate::config::{BucketConfig, ConfigError, DriverKind};
use crate::download::{content_types, resolve_file_name, Download, Staging, SNIFF_LEN};
use crate::driver::{Driver, FtpDriver, LocalDriver};
use crate::error::{DownloadError, FileHandlingError, Result};
use crate::file_info::{DirectoryListing, FileInfo};
use crate::path;

/// Deepest directory nesting `dir_delete` will descend into.
pub const MAX_DELETE_DEPTH: usize = 64;

const PULL_PREFIX: &str = ".bucket-pull-";

/// One configured storage endpoint: a base directory plus a driver.
///
/// Every path argument is resolved against the base directory with
/// [`path::normalize`] before it reaches the driver, so callers may pass
/// paths relative to the bucket or already prefixed with the base.
///
/// Operations returning `Result<bool>` answer `Ok(false)` when they ran but
/// did not reach their post-condition, and `Err` when a precondition was
/// violated or the backend failed outright.
pub struct Bucket {
    config: BucketConfig,
    driver: Box<dyn Driver>,
}

impl std::fmt::Debug for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bucket")
            .field("basedir", &self.config.basedir)
            .field("driver", &self.driver.name())
            .finish()
    }
}

impl Bucket {
    /// Validate `config` and connect the driver it names.
    pub fn from_config(config: BucketConfig) -> Result<Self> {
        config.validate()?;
        let driver: Box<dyn Driver> = match config.driver {
            DriverKind::Local => Box::new(LocalDriver::new()),
            DriverKind::Ftp => {
                let ftp = config.ftpserver.as_ref().ok_or_else(|| {
                    ConfigError::Invalid(vec![
                        "ftpserver section is required for the ftp driver".to_string()
                    ])
                })?;
                Box::new(FtpDriver::connect(ftp)?)
            }
        };
        Ok(Self { config, driver })
    }

    /// Build a bucket around an existing driver.
    pub fn with_driver(config: BucketConfig, driver: Box<dyn Driver>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, driver })
    }

    pub fn config(&self) -> &BucketConfig {
        &self.config
    }

    pub fn normalize(&self, path: &str) -> String {
        path::normalize(path, &self.config.basedir)
    }

    pub fn is_public(&self) -> bool {
        self.config.public
    }

    pub fn file_available(&self, remote: &str) -> Result<bool> {
        self.driver.exists(&self.normalize(remote))
    }

    pub fn dir_available(&self, dir: &str) -> Result<bool> {
        let dir = self.normalize(dir);
        Ok(self.driver.exists(&dir)? && self.driver.is_dir(&dir)?)
    }

    pub fn path_exists(&self, path: &str) -> Result<bool> {
        self.file_available(path)
    }

    pub fn is_file(&self, path: &str) -> Result<bool> {
        self.driver.is_file(&self.normalize(path))
    }

    pub fn is_dir(&self, path: &str) -> Result<bool> {
        self.driver.is_dir(&self.normalize(path))
    }

    /// Upload `local` to `remote`, creating the remote parent directory.
    ///
    /// Refuses (with `Ok(false)`) to overwrite an existing remote entry or
    /// to upload a missing local file.
    pub fn file_push(&self, local: &Path, remote: &str) -> Result<bool> {
        let remote = self.normalize(remote);

        if self.driver.exists(&remote)? {
            tracing::warn!(remote = %remote, "push refused: remote already exists");
            return Ok(false);
        }
        if !local.is_file() {
            tracing::warn!(local = %local.display(), "push refused: local source missing");
            return Ok(false);
        }

        let parent = path::parent_of(&remote);
        if !self.dir_available(&parent)? && !self.dir_create(&parent)? {
            tracing::warn!(dir = %parent, "push failed: could not create remote directory");
            return Ok(false);
        }

        self.driver.send_file(local, &remote)?;
        tracing::info!(local = %local.display(), remote = %remote, "pushed file");
        self.file_available(&remote)
    }

    /// Download `remote` into `local`, creating local parent directories.
    ///
    /// The bytes land in a temporary file next to `local` that is renamed
    /// into place only once the transfer has finished, so a failed pull
    /// leaves nothing behind.
    pub fn file_pull(&self, remote: &str, local: &Path) -> Result<bool> {
        let remote = self.normalize(remote);

        if !self.driver.exists(&remote)? {
            return Err(FileHandlingError::PathNotFound(remote).into());
        }
        if local.exists() {
            return Err(FileHandlingError::AlreadyExists(local.display().to_string()).into());
        }
        let parent = match local.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }

        let partial = tempfile::Builder::new()
            .prefix(PULL_PREFIX)
            .tempfile_in(parent)?;
        self.driver.pull_file(&remote, partial.path())?;
        partial.persist_noclobber(local).map_err(|e| e.error)?;
        tracing::info!(remote = %remote, local = %local.display(), "pulled file");
        Ok(local.exists())
    }

    pub fn file_delete(&self, remote: &str) -> Result<bool> {
        let remote = self.normalize(remote);

        if !self.driver.exists(&remote)? {
            return Err(FileHandlingError::PathNotFound(remote).into());
        }
        if !self.driver.is_file(&remote)? {
            return Err(FileHandlingError::NotAFile(remote).into());
        }

        self.driver.remove_file(&remote)?;
        tracing::info!(remote = %remote, "deleted file");
        Ok(!self.driver.exists(&remote)?)
    }

    pub fn file_get_info(&self, remote: &str) -> Result<FileInfo> {
        let remote = self.normalize(remote);
        if !self.driver.exists(&remote)? {
            return Err(FileHandlingError::PathNotFound(remote).into());
        }
        self.driver.file_info(&remote)
    }

    /// Public URL of `remote`: the configured base URL followed by `remote`
    /// exactly as given.
    pub fn file_get_url(&self, remote: &str) -> Result<String> {
        if !self.config.public {
            return Err(FileHandlingError::NotPublic.into());
        }
        let normalized = self.normalize(remote);
        if !self.driver.exists(&normalized)? {
            return Err(FileHandlingError::PathNotFound(normalized).into());
        }
        let base_url = self.config.baseurl.as_deref().unwrap_or_default();
        Ok(format!("{}{}", base_url, remote))
    }

    /// Names of the entries directly inside `dir`, sorted.
    pub fn dir_list(&self, dir: &str) -> Result<Vec<String>> {
        let mut names = self.driver.dir_list(&self.normalize(dir))?;
        names.sort();
        names.dedup();
        Ok(names)
    }

    pub fn dir_list_detailed(&self, dir: &str) -> Result<DirectoryListing> {
        self.driver.dir_list_detailed(&self.normalize(dir))
    }

    /// Create `dir` and any missing ancestors below the base directory.
    pub fn dir_create(&self, dir: &str) -> Result<bool> {
        let dir = self.normalize(dir);
        if self.driver.exists(&dir)? {
            return self.driver.is_dir(&dir);
        }

        let base = path::normalize("", &self.config.basedir);
        let relative = dir.strip_prefix(base.as_str()).unwrap_or(&dir);
        let mut current = base.trim_end_matches('/').to_string();
        for segment in relative.split('/').filter(|s| !s.is_empty()) {
            current = path::join(&current, segment);
            if !self.driver.exists(&current)? {
                self.driver.make_dir(&current)?;
                tracing::info!(dir = %current, "created directory");
            }
        }

        self.dir_available(&dir)
    }

    /// Remove `dir` and everything below it, depth first, children in name
    /// order.
    ///
    /// Stops and answers `Ok(false)` as soon as one entry cannot be
    /// removed; entries already removed stay removed.
    pub fn dir_delete(&self, dir: &str) -> Result<bool> {
        let dir = self.normalize(dir);

        if !self.driver.exists(&dir)? {
            return Err(FileHandlingError::PathNotFound(dir).into());
        }
        if !self.driver.is_dir(&dir)? {
            return Err(FileHandlingError::NotADirectory(dir).into());
        }

        self.delete_tree(&dir, 0)
    }

    fn delete_tree(&self, dir: &str, depth: usize) -> Result<bool> {
        if depth >= MAX_DELETE_DEPTH {
            return Err(FileHandlingError::TooDeep {
                path: dir.to_string(),
                limit: MAX_DELETE_DEPTH,
            }
            .into());
        }

        // One listing per directory classifies every child.
        for (name, info) in self.driver.dir_list_detailed(dir)? {
            let child = path::join(dir, &name);
            let removed = if info.is_dir() {
                self.delete_tree(&child, depth + 1)?
            } else {
                self.driver.remove_file(&child)?;
                !self.driver.exists(&child)?
            };
            if !removed {
                tracing::warn!(path = %child, "recursive delete stopped");
                return Ok(false);
            }
        }

        self.driver.remove_dir(dir)?;
        tracing::info!(dir = %dir, "deleted directory");
        Ok(!self.driver.exists(dir)?)
    }

    /// Stage `remote` locally and return it as a ready-to-send download.
    ///
    /// The MIME type is identified from the file's leading bytes and from
    /// its name. If either is on the forbidden list the download is refused
    /// before anything is staged.
    pub fn download(&self, remote: &str, file_name: Option<&str>) -> Result<Download> {
        let remote = self.normalize(remote);

        if !self.driver.exists(&remote)? {
            return Err(DownloadError::SourceMissing(remote).into());
        }
        let head = self.driver.read_head(&remote, SNIFF_LEN)?;
        let forbidden = content_types(&remote, &head)
            .into_iter()
            .find(|mime| self.config.download.is_forbidden(mime));
        if let Some(mime) = forbidden {
            tracing::warn!(remote = %remote, mime = %mime, "download refused: forbidden mime type");
            return Err(DownloadError::ForbiddenMimeType { path: remote, mime }.into());
        }

        let staging = Staging::new()?;
        let staged = staging.file_path();
        self.driver.pull_file(&remote, &staged)?;
        let (staging, file, size) = staging.open()?;

        let file_name = resolve_file_name(&remote, file_name);
        tracing::info!(remote = %remote, file_name = %file_name, bytes = size, "download staged");
        Ok(Download::new(staging, file, size, file_name)?)
    }
}
