//! Shared test utilities for bucket integration tests
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use ::common::config::{BucketConfig, DriverKind, FtpServerConfig};
use ::common::driver::{FtpDriver, FtpSession};
use ::common::error::BackendError;
use ::common::prelude::Bucket;
use tempfile::TempDir;

/// Set up a private local bucket rooted in a fresh temp directory
pub fn local_bucket() -> (Bucket, TempDir) {
    local_bucket_with(|_| {})
}

pub fn local_bucket_with(configure: impl FnOnce(&mut BucketConfig)) -> (Bucket, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("bucket");
    std::fs::create_dir(&root).unwrap();

    let mut config = BucketConfig::local(format!("{}/", root.display()));
    configure(&mut config);
    let bucket = Bucket::with_driver(config, Box::new(::common::driver::LocalDriver::new())).unwrap();
    (bucket, temp_dir)
}

/// Set up a private FTP bucket with base directory `/data/` on an in-memory server
pub fn ftp_bucket() -> (Bucket, MemoryFtp) {
    ftp_bucket_with(|_| {})
}

pub fn ftp_bucket_with(configure: impl FnOnce(&mut BucketConfig)) -> (Bucket, MemoryFtp) {
    let server = MemoryFtp::new();
    server.mkdir_p("/data");

    let mut config = BucketConfig::local("/data/");
    config.driver = DriverKind::Ftp;
    config.ftpserver = Some(FtpServerConfig {
        host: "memory".to_string(),
        port: 21,
        secure: false,
        user: "anonymous".to_string(),
        pass: String::new(),
    });
    configure(&mut config);
    let driver = FtpDriver::with_session(Box::new(server.clone()));
    let bucket = Bucket::with_driver(config, Box::new(driver)).unwrap();
    (bucket, server)
}

/// Write a scratch file outside the bucket and return its path
pub fn scratch_file(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.path().join("scratch").join(name);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, contents).unwrap();
    path
}

#[derive(Debug, Clone)]
enum Node {
    Dir,
    File(Vec<u8>),
}

#[derive(Debug, Default)]
struct State {
    nodes: BTreeMap<String, Node>,
    /// Paths whose DELE/RMD is acknowledged but has no effect
    sticky: BTreeSet<String>,
    commands: Vec<String>,
    /// Replies forced onto commands, keyed by verb
    failures: BTreeMap<String, (u32, String)>,
    quit: bool,
}

/// An FTP server kept in memory. Clones share the same state, so a test
/// can keep one handle while the driver owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryFtp {
    state: Rc<RefCell<State>>,
}

fn key(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

fn parent(path: &str) -> String {
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(index) => path[..index].to_string(),
    }
}

fn leaf(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn refused(command: &str, path: &str) -> BackendError {
    BackendError::ftp(
        Some(550),
        format!("550 {} {}: no such file or directory", command, path),
    )
}

impl MemoryFtp {
    pub fn new() -> Self {
        let server = Self::default();
        server
            .state
            .borrow_mut()
            .nodes
            .insert("/".to_string(), Node::Dir);
        server
    }

    pub fn mkdir_p(&self, path: &str) {
        let mut state = self.state.borrow_mut();
        let mut current = String::new();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = format!("{}/{}", current, segment);
            state.nodes.entry(current.clone()).or_insert(Node::Dir);
        }
    }

    pub fn put_bytes(&self, path: &str, contents: &[u8]) {
        self.mkdir_p(&parent(&key(path)));
        self.state
            .borrow_mut()
            .nodes
            .insert(key(path), Node::File(contents.to_vec()));
    }

    pub fn read(&self, path: &str) -> Option<Vec<u8>> {
        match self.state.borrow().nodes.get(&key(path)) {
            Some(Node::File(bytes)) => Some(bytes.clone()),
            _ => None,
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.state.borrow().nodes.contains_key(&key(path))
    }

    pub fn make_sticky(&self, path: &str) {
        self.state.borrow_mut().sticky.insert(key(path));
    }

    pub fn commands(&self) -> Vec<String> {
        self.state.borrow().commands.clone()
    }

    pub fn has_quit(&self) -> bool {
        self.state.borrow().quit
    }

    /// Answer every later `command` with `status` until [`MemoryFtp::recover`].
    pub fn fail(&self, command: &str, status: u32, text: &str) {
        self.state
            .borrow_mut()
            .failures
            .insert(command.to_string(), (status, format!("{} {}", status, text)));
    }

    pub fn recover(&self, command: &str) {
        self.state.borrow_mut().failures.remove(command);
    }

    /// Log `command` and return the failure forced onto it, if any.
    fn record(&self, command: &str, path: &str) -> Result<(), BackendError> {
        let mut state = self.state.borrow_mut();
        state.commands.push(format!("{} {}", command, path));
        match state.failures.get(command) {
            Some((status, message)) => Err(BackendError::ftp(Some(*status), message.clone())),
            None => Ok(()),
        }
    }

    fn is_dir(&self, path: &str) -> bool {
        matches!(self.state.borrow().nodes.get(path), Some(Node::Dir))
    }

    fn children(&self, dir: &str) -> Vec<(String, Node)> {
        self.state
            .borrow()
            .nodes
            .iter()
            .filter(|(path, _)| path.as_str() != "/" && parent(path) == dir)
            .map(|(path, node)| (path.clone(), node.clone()))
            .collect()
    }
}

impl FtpSession for MemoryFtp {
    fn name_list(&mut self, path: &str) -> Result<Vec<String>, BackendError> {
        self.record("NLST", path)?;
        let dir = key(path);
        if !self.is_dir(&dir) {
            return Err(refused("NLST", path));
        }
        // Like many servers, answer with the path as requested plus the name.
        Ok(self
            .children(&dir)
            .into_iter()
            .map(|(child, _)| format!("{}/{}", path.trim_end_matches('/'), leaf(&child)))
            .collect())
    }

    fn raw_list(&mut self, path: &str) -> Result<Vec<String>, BackendError> {
        self.record("LIST", path)?;
        let dir = key(path);
        if !self.is_dir(&dir) {
            return Err(refused("LIST", path));
        }
        let children = self.children(&dir);
        let mut lines = vec![
            format!("total {}", children.len()),
            "drwxr-xr-x 3 ftp ftp 4096 Jan 5 10:00 ..".to_string(),
        ];
        for (child, node) in children {
            let line = match node {
                Node::Dir => format!("drwxr-xr-x 2 ftp ftp 4096 Jan 5 10:00 {}", leaf(&child)),
                Node::File(bytes) => format!(
                    "-rw-r--r-- 1 ftp ftp {} Jan 5 10:00 {}",
                    bytes.len(),
                    leaf(&child)
                ),
            };
            lines.push(line);
        }
        Ok(lines)
    }

    fn make_dir(&mut self, path: &str) -> Result<(), BackendError> {
        self.record("MKD", path)?;
        let dir = key(path);
        let mut state = self.state.borrow_mut();
        if state.nodes.contains_key(&dir) {
            return Err(BackendError::ftp(Some(550), format!("550 {}: file exists", path)));
        }
        if !matches!(state.nodes.get(&parent(&dir)), Some(Node::Dir)) {
            return Err(refused("MKD", path));
        }
        state.nodes.insert(dir, Node::Dir);
        Ok(())
    }

    fn remove_dir(&mut self, path: &str) -> Result<(), BackendError> {
        self.record("RMD", path)?;
        let dir = key(path);
        if !self.is_dir(&dir) {
            return Err(refused("RMD", path));
        }
        if !self.children(&dir).is_empty() {
            return Err(BackendError::ftp(
                Some(550),
                format!("550 {}: directory not empty", path),
            ));
        }
        let mut state = self.state.borrow_mut();
        if !state.sticky.contains(&dir) {
            state.nodes.remove(&dir);
        }
        Ok(())
    }

    fn remove_file(&mut self, path: &str) -> Result<(), BackendError> {
        self.record("DELE", path)?;
        let file = key(path);
        let mut state = self.state.borrow_mut();
        match state.nodes.get(&file) {
            Some(Node::File(_)) => {
                if !state.sticky.contains(&file) {
                    state.nodes.remove(&file);
                }
                Ok(())
            }
            _ => Err(refused("DELE", path)),
        }
    }

    fn put(&mut self, path: &str, reader: &mut dyn Read) -> Result<u64, BackendError> {
        self.record("STOR", path)?;
        let file = key(path);
        if !self.is_dir(&parent(&file)) {
            return Err(refused("STOR", path));
        }
        let mut contents = Vec::new();
        reader
            .read_to_end(&mut contents)
            .map_err(|e| BackendError::ftp(None, e.to_string()))?;
        let size = contents.len() as u64;
        self.state
            .borrow_mut()
            .nodes
            .insert(file, Node::File(contents));
        Ok(size)
    }

    fn get(&mut self, path: &str, writer: &mut dyn Write) -> Result<u64, BackendError> {
        let forced = self.record("RETR", path);
        let contents = self.read(path).ok_or_else(|| refused("RETR", path))?;
        if let Err(e) = forced {
            // The connection drops halfway through the transfer.
            let _ = writer.write_all(&contents[..contents.len() / 2]);
            return Err(e);
        }
        writer
            .write_all(&contents)
            .map_err(|e| BackendError::ftp(None, e.to_string()))?;
        Ok(contents.len() as u64)
    }

    fn get_head(&mut self, path: &str, limit: usize) -> Result<Vec<u8>, BackendError> {
        self.record("RETR", path)?;
        let contents = self.read(path).ok_or_else(|| refused("RETR", path))?;
        if contents.len() > limit {
            self.record("ABOR", "")?;
        }
        Ok(contents[..contents.len().min(limit)].to_vec())
    }

    fn quit(&mut self) -> Result<(), BackendError> {
        let _ = self.record("QUIT", "");
        self.state.borrow_mut().quit = true;
        Ok(())
    }
}

/// Read a file in a local bucket directly from disk
pub fn read_local(bucket: &Bucket, remote: &str) -> Vec<u8> {
    std::fs::read(Path::new(&bucket.normalize(remote))).unwrap()
}
