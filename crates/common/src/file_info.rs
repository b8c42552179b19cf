use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    #[default]
    File,
    Directory,
}

/// What a backend knows about a single entry.
///
/// `user`, `group` and `permissions` are passed through as the backend
/// reports them and may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    pub user: String,
    pub group: String,
    pub permissions: String,
    pub extension: String,
    pub file_type: FileType,
}

/// Entries of one directory keyed by name, in ascending name order.
pub type DirectoryListing = BTreeMap<String, FileInfo>;

impl FileInfo {
    pub fn new(name: impl Into<String>, size: u64, file_type: FileType) -> Self {
        let name = name.into();
        let extension = match file_type {
            FileType::File => extension_of(&name),
            FileType::Directory => String::new(),
        };
        Self {
            name,
            size,
            extension,
            file_type,
            ..Default::default()
        }
    }

    pub fn with_owner(mut self, user: impl Into<String>, group: impl Into<String>) -> Self {
        self.user = user.into();
        self.group = group.into();
        self
    }

    pub fn with_permissions(mut self, permissions: impl Into<String>) -> Self {
        self.permissions = permissions.into();
        self
    }

    pub fn is_file(&self) -> bool {
        self.file_type == FileType::File
    }

    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }

    /// True for the placeholder returned by backends that cannot stat a
    /// single entry.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_string()
}
