//! FTP driver.
//!
//! The control connection is opened, authenticated and switched to passive
//! mode once, when the driver is built, and is held until the driver is
//! dropped. A failed connection is never reopened.

use std::cell::RefCell;
use std::fs::File;
use std::path::Path;

use crate::config::FtpServerConfig;
use crate::error::{BackendError, BucketError, Result};
use crate::file_info::{DirectoryListing, FileInfo};
use crate::path;

pub mod listing;
mod session;

pub use listing::{parse_line, ListEntry};
pub use session::FtpSession;

pub struct FtpDriver {
    session: RefCell<Box<dyn FtpSession>>,
}

impl std::fmt::Debug for FtpDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FtpDriver").finish_non_exhaustive()
    }
}

impl FtpDriver {
    /// Connect and log in to the server described by `config`.
    pub fn connect(config: &FtpServerConfig) -> Result<Self> {
        if !cfg!(feature = "ftp") {
            return Err(BucketError::MissingCapability("ftp"));
        }
        config.validate()?;
        let session = connect(config)?;
        Ok(Self::with_session(session))
    }

    /// Wrap an already established session.
    pub fn with_session(session: Box<dyn FtpSession>) -> Self {
        Self {
            session: RefCell::new(session),
        }
    }

    fn session(&self) -> std::cell::RefMut<'_, Box<dyn FtpSession>> {
        self.session.borrow_mut()
    }

    /// Parsed `LIST` entries of `dir`, navigation entries and unparseable
    /// lines removed.
    fn entries(&self, dir: &str) -> Result<Vec<ListEntry>> {
        let lines = missing_as_empty(dir, self.session().raw_list(dir))?;
        let mut entries = Vec::with_capacity(lines.len());
        for line in lines {
            match parse_line(&line) {
                Some(entry) if !entry.is_navigation() => entries.push(entry),
                Some(_) => {}
                None => tracing::debug!(line = %line, "skipping unparseable listing line"),
            }
        }
        Ok(entries)
    }

    /// The `LIST` entry for `path`, looked up in its parent directory.
    fn entry(&self, path: &str) -> Result<Option<ListEntry>> {
        let parent = path::parent_of(path);
        let leaf = path::leaf_of(path);
        Ok(self
            .entries(&parent)?
            .into_iter()
            .find(|entry| entry.name == leaf))
    }
}

impl Drop for FtpDriver {
    fn drop(&mut self) {
        if let Err(e) = self.session.get_mut().quit() {
            tracing::debug!(error = %e, "ftp quit failed");
        }
    }
}

/// A listing of a directory the server reports as unavailable (550) is
/// empty. Any other failure is passed on.
fn missing_as_empty(
    dir: &str,
    listed: std::result::Result<Vec<String>, BackendError>,
) -> Result<Vec<String>> {
    match listed {
        Ok(lines) => Ok(lines),
        Err(e) if e.is_unavailable() => {
            tracing::debug!(path = %dir, error = %e, "directory unavailable");
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

/// Strip the directory prefix some servers prepend to `NLST` results.
fn bare_name<'a>(entry: &'a str, dir: &str) -> &'a str {
    let prefix = format!("{}/", dir.trim_end_matches('/'));
    let stripped = entry.strip_prefix(prefix.as_str()).unwrap_or(entry);
    path::leaf_of(stripped)
}

impl super::Driver for FtpDriver {
    fn name(&self) -> &'static str {
        "ftp"
    }

    fn exists(&self, path: &str) -> Result<bool> {
        if path::is_root(path) {
            return Ok(true);
        }
        let parent = path::parent_of(path);
        let leaf = path::leaf_of(path);
        Ok(self.dir_list(&parent)?.iter().any(|name| name == leaf))
    }

    fn is_file(&self, path: &str) -> Result<bool> {
        if path::is_root(path) {
            return Ok(false);
        }
        Ok(self.entry(path)?.map_or(false, |entry| !entry.is_dir()))
    }

    fn is_dir(&self, path: &str) -> Result<bool> {
        if path::is_root(path) {
            return Ok(true);
        }
        Ok(self.entry(path)?.map_or(false, |entry| entry.is_dir()))
    }

    fn dir_list(&self, path: &str) -> Result<Vec<String>> {
        tracing::debug!(path = %path, "NLST");
        let names = missing_as_empty(path, self.session().name_list(path))?;
        Ok(names
            .iter()
            .map(|entry| bare_name(entry, path))
            .filter(|name| !name.is_empty() && *name != "." && *name != "..")
            .map(str::to_string)
            .collect())
    }

    fn dir_list_detailed(&self, path: &str) -> Result<DirectoryListing> {
        tracing::debug!(path = %path, "LIST");
        Ok(self
            .entries(path)?
            .into_iter()
            .map(|entry| (entry.name.clone(), entry.into_file_info()))
            .collect())
    }

    fn make_dir(&self, path: &str) -> Result<()> {
        tracing::debug!(path = %path, "MKD");
        Ok(self.session().make_dir(path)?)
    }

    fn remove_dir(&self, path: &str) -> Result<()> {
        tracing::debug!(path = %path, "RMD");
        Ok(self.session().remove_dir(path)?)
    }

    fn remove_file(&self, path: &str) -> Result<()> {
        tracing::debug!(path = %path, "DELE");
        Ok(self.session().remove_file(path)?)
    }

    fn file_info(&self, path: &str) -> Result<FileInfo> {
        // Line-oriented listings offer no single-entry stat.
        tracing::debug!(path = %path, "file info is not available over ftp");
        Ok(FileInfo::default())
    }

    fn read_head(&self, path: &str, limit: usize) -> Result<Vec<u8>> {
        tracing::debug!(path = %path, limit, "RETR head");
        Ok(self.session().get_head(path, limit)?)
    }

    fn send_file(&self, local: &Path, remote: &str) -> Result<()> {
        tracing::debug!(local = %local.display(), remote = %remote, "STOR");
        let mut file = File::open(local)?;
        let sent = self.session().put(remote, &mut file)?;
        tracing::debug!(remote = %remote, bytes = sent, "upload finished");
        Ok(())
    }

    fn pull_file(&self, remote: &str, local: &Path) -> Result<()> {
        tracing::debug!(remote = %remote, local = %local.display(), "RETR");
        let mut file = File::create(local)?;
        let received = self.session().get(remote, &mut file)?;
        tracing::debug!(remote = %remote, bytes = received, "download finished");
        Ok(())
    }
}

#[cfg(feature = "ftp")]
fn connect(config: &FtpServerConfig) -> Result<Box<dyn FtpSession>> {
    use suppaftp::native_tls::TlsConnector;
    use suppaftp::types::FileType;
    use suppaftp::{FtpStream, Mode, NativeTlsConnector, NativeTlsFtpStream};

    let address = config.address();
    tracing::info!(address = %address, secure = config.secure, "connecting to ftp server");

    if config.secure {
        let stream = NativeTlsFtpStream::connect(&address)
            .map_err(|e| BucketError::Connection(e.to_string()))?;
        let connector =
            TlsConnector::new().map_err(|e| BucketError::Connection(e.to_string()))?;
        let mut stream = stream
            .into_secure(NativeTlsConnector::from(connector), &config.host)
            .map_err(|e| BucketError::Connection(e.to_string()))?;
        stream
            .login(&config.user, &config.pass)
            .map_err(|e| BucketError::Authentication(e.to_string()))?;
        stream.set_mode(Mode::Passive);
        stream
            .transfer_type(FileType::Binary)
            .map_err(|e| BucketError::Connection(e.to_string()))?;
        Ok(Box::new(stream))
    } else {
        let mut stream =
            FtpStream::connect(&address).map_err(|e| BucketError::Connection(e.to_string()))?;
        stream
            .login(&config.user, &config.pass)
            .map_err(|e| BucketError::Authentication(e.to_string()))?;
        stream.set_mode(Mode::Passive);
        stream
            .transfer_type(FileType::Binary)
            .map_err(|e| BucketError::Connection(e.to_string()))?;
        Ok(Box::new(stream))
    }
}

#[cfg(not(feature = "ftp"))]
fn connect(_config: &FtpServerConfig) -> Result<Box<dyn FtpSession>> {
    Err(BucketError::MissingCapability("ftp"))
}
