use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::error::{BackendError, Result};
use crate::file_info::{DirectoryListing, FileInfo, FileType};
use crate::path;

/// Driver backed by the local filesystem. Remote paths are used as
/// filesystem paths verbatim.
#[derive(Debug, Clone, Default)]
pub struct LocalDriver;

impl LocalDriver {
    pub fn new() -> Self {
        Self
    }

    fn fs_path(path: &str) -> PathBuf {
        PathBuf::from(path)
    }
}

impl super::Driver for LocalDriver {
    fn name(&self) -> &'static str {
        "local"
    }

    fn exists(&self, path: &str) -> Result<bool> {
        Ok(Self::fs_path(path).exists())
    }

    fn is_file(&self, path: &str) -> Result<bool> {
        Ok(Self::fs_path(path).is_file())
    }

    fn is_dir(&self, path: &str) -> Result<bool> {
        Ok(Self::fs_path(path).is_dir())
    }

    fn dir_list(&self, path: &str) -> Result<Vec<String>> {
        let dir = Self::fs_path(path);
        if !dir.is_dir() {
            tracing::warn!(path = %path, "listing requested for a missing directory");
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    fn dir_list_detailed(&self, path: &str) -> Result<DirectoryListing> {
        let mut listing = DirectoryListing::new();
        for name in self.dir_list(path)? {
            let info = self.file_info(&path::join(path, &name))?;
            listing.insert(name, info);
        }
        Ok(listing)
    }

    fn make_dir(&self, path: &str) -> Result<()> {
        match fs::create_dir(Self::fs_path(path)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn remove_dir(&self, path: &str) -> Result<()> {
        fs::remove_dir(Self::fs_path(path))?;
        Ok(())
    }

    fn remove_file(&self, path: &str) -> Result<()> {
        fs::remove_file(Self::fs_path(path))?;
        Ok(())
    }

    fn file_info(&self, path: &str) -> Result<FileInfo> {
        let metadata = fs::metadata(Self::fs_path(path))?;
        let file_type = if metadata.is_dir() {
            FileType::Directory
        } else {
            FileType::File
        };
        let size = if metadata.is_dir() { 0 } else { metadata.len() };
        Ok(FileInfo::new(path::leaf_of(path), size, file_type))
    }

    fn read_head(&self, path: &str, limit: usize) -> Result<Vec<u8>> {
        let mut head = Vec::with_capacity(limit);
        File::open(Self::fs_path(path))?
            .take(limit as u64)
            .read_to_end(&mut head)?;
        Ok(head)
    }

    fn send_file(&self, local: &Path, remote: &str) -> Result<()> {
        let destination = Self::fs_path(remote);
        match fs::copy(local, &destination) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                Err(BackendError::DestinationNotWritable(remote.to_string()).into())
            }
            Err(e) => Err(BackendError::CopyFailed {
                from: local.display().to_string(),
                to: remote.to_string(),
                reason: e.to_string(),
            }
            .into()),
        }
    }

    fn pull_file(&self, remote: &str, local: &Path) -> Result<()> {
        fs::copy(Self::fs_path(remote), local)?;
        Ok(())
    }
}
