use std::fs::OpenOptions;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Args;

use common::error::BucketError;

use crate::cli::op::BucketTaskError;

#[derive(Args, Debug, Clone)]
pub struct Download {
    /// Path of the file in the bucket
    pub remote: String,

    /// Name to offer the file under (defaults to the remote base name)
    #[arg(long)]
    pub filename: Option<String>,

    /// Where to write the file (defaults to the offered name in the
    /// current directory)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error(transparent)]
    Bucket(#[from] BucketTaskError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Download {
    type Error = DownloadError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let remote = self.remote.clone();
        let filename = self.filename.clone();
        let out = self.out.clone();

        let (target, written) = ctx
            .with_bucket(move |bucket| {
                let download = bucket.download(&remote, filename.as_deref())?;
                let target = out.unwrap_or_else(|| PathBuf::from(download.file_name()));
                for (name, value) in download.headers() {
                    tracing::debug!(header = %name, value = ?value, "download header");
                }

                // create_new keeps an existing local file untouched.
                let file = OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(&target)
                    .map_err(BucketError::from)?;
                let written = download.write_to(&mut BufWriter::new(file))?;
                Ok((target, written))
            })
            .await?;

        Ok(format!(
            "downloaded {} ({} bytes) -> {}",
            self.remote,
            written,
            target.display()
        ))
    }
}
