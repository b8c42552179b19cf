//! Bucket worker for the download gateway
//!
//! A bucket owns a single backend connection and is not shared between
//! threads, so the gateway hands every request to one dedicated worker
//! thread over a flume channel. Each job carries its own reply channel.

use anyhow::Result;
use http::HeaderMap;

use common::config::BucketConfig;
use common::prelude::{Bucket, BucketError};

/// A finished download: response headers plus the full body.
pub type Staged = (HeaderMap, Vec<u8>);

/// Jobs the bucket worker understands
#[derive(Debug)]
pub enum Job {
    /// Stage a file and read it back for sending
    Download {
        /// Path of the file in the bucket
        path: String,
        /// Name to offer the file under
        file_name: Option<String>,
        /// Where to send the outcome
        reply: flume::Sender<Result<Staged, BucketError>>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error(transparent)]
    Bucket(#[from] BucketError),
    #[error("bucket worker has stopped")]
    Stopped,
    #[error("failed to start bucket worker: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Job dispatcher that can be cloned and shared across request handlers
#[derive(Debug, Clone)]
pub struct JobDispatcher {
    tx: flume::Sender<Job>,
}

impl JobDispatcher {
    /// Create a new job dispatcher and receiver pair
    pub fn new() -> (Self, JobReceiver) {
        let (tx, rx) = flume::unbounded();
        (Self { tx }, JobReceiver { rx })
    }

    /// Dispatch a job to the worker
    ///
    /// This is non-blocking and will succeed unless the receiver has been dropped.
    pub fn dispatch(&self, job: Job) -> Result<()> {
        tracing::debug!(job = ?job, "dispatching job");
        self.tx
            .send(job)
            .map_err(|_| anyhow::anyhow!("job receiver has been dropped"))
    }

    /// Stage `path` on the worker and wait for the result.
    pub async fn download(
        &self,
        path: String,
        file_name: Option<String>,
    ) -> Result<Staged, WorkerError> {
        let (reply, outcome) = flume::bounded(1);
        self.dispatch(Job::Download {
            path,
            file_name,
            reply,
        })
        .map_err(|e| {
            tracing::error!(error = %e, "download job was not accepted");
            WorkerError::Stopped
        })?;

        let staged = outcome
            .recv_async()
            .await
            .map_err(|_| WorkerError::Stopped)??;
        Ok(staged)
    }
}

/// Job receiver for the worker thread
#[derive(Debug)]
pub struct JobReceiver {
    rx: flume::Receiver<Job>,
}

impl JobReceiver {
    /// Receive the next job (blocking)
    ///
    /// Returns None when all senders have been dropped (graceful shutdown).
    pub fn recv(&self) -> Option<Job> {
        self.rx.recv().ok()
    }
}

/// Start the worker thread and wait until its bucket is open.
///
/// The worker exits once every [`JobDispatcher`] has been dropped.
pub async fn start(
    config: BucketConfig,
) -> Result<(JobDispatcher, std::thread::JoinHandle<()>), WorkerError> {
    let (dispatcher, receiver) = JobDispatcher::new();
    let (ready_tx, ready_rx) = flume::bounded(1);

    let handle = std::thread::Builder::new()
        .name("bucket-worker".to_string())
        .spawn(move || {
            let bucket = match Bucket::from_config(config) {
                Ok(bucket) => {
                    let _ = ready_tx.send(Ok(()));
                    bucket
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };
            tracing::info!(bucket = ?bucket, "bucket worker ready");
            run(&bucket, receiver);
            tracing::info!("bucket worker stopped");
        })?;

    ready_rx
        .recv_async()
        .await
        .map_err(|_| WorkerError::Stopped)??;
    Ok((dispatcher, handle))
}

fn run(bucket: &Bucket, receiver: JobReceiver) {
    while let Some(job) = receiver.recv() {
        match job {
            Job::Download {
                path,
                file_name,
                reply,
            } => {
                let outcome = bucket
                    .download(&path, file_name.as_deref())
                    .and_then(|download| Ok(download.into_parts()?));
                if let Err(e) = &outcome {
                    tracing::warn!(path = %path, error = %e, "download failed");
                }
                if reply.send(outcome).is_err() {
                    tracing::debug!(path = %path, "requester went away before the download finished");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_start_fails_on_bad_config() {
        let mut config = BucketConfig::local("/data/");
        config.driver = common::config::DriverKind::Ftp;

        let err = start(config).await.unwrap_err();
        assert!(matches!(
            err,
            WorkerError::Bucket(BucketError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_worker_stops_when_dispatchers_drop() {
        let temp = TempDir::new().unwrap();
        let config = BucketConfig::local(format!("{}/", temp.path().display()));
        std::fs::write(temp.path().join("a.bin"), b"abc").unwrap();

        let (dispatcher, handle) = start(config).await.unwrap();
        let (headers, body) = dispatcher
            .download("a.bin".to_string(), None)
            .await
            .unwrap();
        assert_eq!(body, b"abc");
        assert_eq!(headers[http::header::CONTENT_LENGTH], "3");

        drop(dispatcher);
        handle.join().unwrap();
    }
}
