//! Bucket configuration.
//!
//! A bucket is described by a small TOML document:
//!
//! ```toml
//! basedir = "/srv/files/"
//! public = true
//! baseurl = "https://cdn.example.com"
//! driver = "ftp"
//!
//! [download]
//! forbidden_mime_types = ["application/x-msdownload"]
//!
//! [ftpserver]
//! host = "ftp.example.com"
//! port = 21
//! secure = true
//! user = "uploader"
//! pass = "secret"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Which storage backend a bucket talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DriverKind {
    #[default]
    Local,
    Ftp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DownloadOptions {
    /// MIME types that may never be handed out through `download`
    #[serde(default)]
    pub forbidden_mime_types: Vec<String>,
}

impl DownloadOptions {
    /// Whether `mime` is on the forbidden list. Comparison ignores case
    /// and any parameters (`text/html; charset=utf-8` matches `text/html`).
    pub fn is_forbidden(&self, mime: &str) -> bool {
        let essence = mime_essence(mime);
        self.forbidden_mime_types
            .iter()
            .any(|forbidden| mime_essence(forbidden) == essence)
    }
}

fn mime_essence(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FtpServerConfig {
    pub host: String,
    #[serde(default = "default_ftp_port")]
    pub port: u16,
    #[serde(default)]
    pub secure: bool,
    pub user: String,
    pub pass: String,
}

fn default_ftp_port() -> u16 {
    21
}

impl FtpServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        if self.host.trim().is_empty() {
            errors.push("ftpserver.host must not be empty".to_string());
        }
        if self.port == 0 {
            errors.push("ftpserver.port must be greater than zero".to_string());
        }
        if self.user.is_empty() {
            errors.push("ftpserver.user must not be empty".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketConfig {
    /// Directory prefix applied to every remote path
    pub basedir: String,
    pub public: bool,
    /// Prefix for public URLs, required when `public` is set
    #[serde(default)]
    pub baseurl: Option<String>,
    #[serde(default)]
    pub driver: DriverKind,
    #[serde(default)]
    pub download: DownloadOptions,
    #[serde(default)]
    pub ftpserver: Option<FtpServerConfig>,
}

impl BucketConfig {
    /// A private bucket on the local filesystem rooted at `basedir`.
    pub fn local(basedir: impl Into<String>) -> Self {
        Self {
            basedir: basedir.into(),
            public: false,
            baseurl: None,
            driver: DriverKind::Local,
            download: DownloadOptions::default(),
            ftpserver: None,
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Check every rule and report all violations at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.basedir.is_empty() {
            errors.push("basedir must not be empty".to_string());
        }
        if self.public && self.baseurl.as_deref().map_or(true, str::is_empty) {
            errors.push("baseurl is required when public is true".to_string());
        }

        match (&self.driver, &self.ftpserver) {
            (DriverKind::Ftp, None) => {
                errors.push("ftpserver section is required for the ftp driver".to_string());
            }
            (DriverKind::Ftp, Some(ftp)) => {
                if let Err(ConfigError::Invalid(ftp_errors)) = ftp.validate() {
                    errors.extend(ftp_errors);
                }
            }
            (DriverKind::Local, _) => {}
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }
}
