//! Staged downloads.
//!
//! [`Bucket::download`](crate::bucket::Bucket::download) pulls the remote
//! file into a private staging directory and hands back a [`Download`]: the
//! full response header set plus the staged bytes. Consuming the value
//! ends the request; dropping it, consumed or not, deletes the staged copy.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use http::header::{
    HeaderMap, HeaderName, HeaderValue, CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_LENGTH,
    CONTENT_TYPE, EXPIRES, PRAGMA,
};
use tempfile::TempDir;

use crate::error::DownloadError;

pub const CONTENT_TRANSFER_ENCODING: HeaderName =
    HeaderName::from_static("content-transfer-encoding");

const STAGING_PREFIX: &str = "bucket-download-";
const STAGED_FILE_NAME: &str = "payload";

/// How much of a file is read to identify its content type.
pub const SNIFF_LEN: usize = 8192;

/// Private directory a download is pulled into. Removed on drop.
#[derive(Debug)]
pub(crate) struct Staging {
    dir: TempDir,
}

impl Staging {
    pub(crate) fn new() -> Result<Self, DownloadError> {
        let dir = tempfile::Builder::new().prefix(STAGING_PREFIX).tempdir()?;
        Ok(Self { dir })
    }

    pub(crate) fn file_path(&self) -> PathBuf {
        self.dir.path().join(STAGED_FILE_NAME)
    }

    /// Check the pulled file and open it for streaming.
    pub(crate) fn open(self) -> Result<(Self, File, u64), DownloadError> {
        let path = self.file_path();
        if !path.is_file() {
            return Err(DownloadError::StagingMissing(path));
        }
        let file = File::open(&path).map_err(|_| DownloadError::StagingUnreadable(path.clone()))?;
        OpenOptions::new()
            .append(true)
            .open(&path)
            .map_err(|_| DownloadError::StagingUnwritable(path.clone()))?;
        let size = file.metadata()?.len();
        Ok((self, file, size))
    }
}

/// A download ready to be sent.
#[derive(Debug)]
pub struct Download {
    headers: HeaderMap,
    file_name: String,
    content_length: u64,
    file: File,
    staging: Staging,
}

impl Download {
    pub(crate) fn new(
        staging: Staging,
        file: File,
        content_length: u64,
        file_name: String,
    ) -> Result<Self, DownloadError> {
        let headers = response_headers(&file_name, content_length)?;
        Ok(Self {
            headers,
            file_name,
            content_length,
            file,
            staging,
        })
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    /// Location of the staged copy, valid until the download is dropped.
    pub fn staged_path(&self) -> PathBuf {
        self.staging.file_path()
    }

    /// Stream the body into `writer` and clean up.
    pub fn write_to<W: Write + ?Sized>(mut self, writer: &mut W) -> io::Result<u64> {
        let written = io::copy(&mut self.file, writer)?;
        writer.flush()?;
        Ok(written)
    }

    /// Read the whole body into memory and clean up.
    pub fn into_bytes(mut self) -> io::Result<Vec<u8>> {
        let mut body = Vec::with_capacity(self.content_length as usize);
        self.file.read_to_end(&mut body)?;
        Ok(body)
    }

    /// Split into the header set and the body.
    pub fn into_parts(self) -> io::Result<(HeaderMap, Vec<u8>)> {
        let headers = self.headers.clone();
        let body = self.into_bytes()?;
        Ok((headers, body))
    }
}

/// Header set of a download response: caching disabled, opaque binary
/// body, attachment disposition.
pub fn response_headers(file_name: &str, content_length: u64) -> Result<HeaderMap, DownloadError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        CACHE_CONTROL,
        HeaderValue::from_static("no-store, no-cache, must-revalidate, max-age=0"),
    );
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(EXPIRES, HeaderValue::from_static("0"));
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(CONTENT_TRANSFER_ENCODING, HeaderValue::from_static("binary"));
    headers.insert(CONTENT_LENGTH, HeaderValue::from(content_length));

    let mut disposition = format!("attachment; filename=\"{}\"", quote_file_name(file_name));
    if !file_name.is_ascii() {
        disposition.push_str("; filename*=UTF-8''");
        disposition.push_str(&encode_ext_value(file_name));
    }
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    headers.insert(CONTENT_DISPOSITION, disposition);

    Ok(headers)
}

/// Make a file name safe to place inside a quoted header parameter.
fn quote_file_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' => '\'',
            '\\' => '_',
            c if c.is_ascii() => c,
            _ => '_',
        })
        .collect()
}

/// RFC 5987 `ext-value` encoding: attr-chars as is, every other byte of
/// the UTF-8 form percent-encoded.
fn encode_ext_value(name: &str) -> String {
    let mut encoded = String::with_capacity(name.len());
    for byte in name.bytes() {
        match byte {
            b'a'..=b'z'
            | b'A'..=b'Z'
            | b'0'..=b'9'
            | b'!'
            | b'#'
            | b'$'
            | b'&'
            | b'+'
            | b'-'
            | b'.'
            | b'^'
            | b'_'
            | b'`'
            | b'|'
            | b'~' => encoded.push(byte as char),
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

/// Candidate MIME types of a file, most specific first: the type its
/// leading bytes identify, then the type its name suggests. A file neither
/// reveals is `application/octet-stream`.
pub fn content_types(remote: &str, head: &[u8]) -> Vec<String> {
    let mut types = Vec::new();
    if let Some(kind) = infer::get(head) {
        types.push(kind.mime_type().to_string());
    }
    if let Some(guess) = mime_guess::from_path(remote).first() {
        let guess = guess.essence_str().to_string();
        if !types.contains(&guess) {
            types.push(guess);
        }
    }
    if types.is_empty() {
        types.push(mime_guess::mime::APPLICATION_OCTET_STREAM.to_string());
    }
    types
}

/// Name offered to the client: the caller's choice, else the base name of
/// the remote path.
pub fn resolve_file_name(remote: &str, requested: Option<&str>) -> String {
    match requested {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => Path::new(remote)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("download")
            .to_string(),
    }
}
