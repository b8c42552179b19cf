use std::path::PathBuf;

use clap::Args;

use crate::cli::op::BucketTaskError;

#[derive(Args, Debug, Clone)]
pub struct Push {
    /// Local file to upload
    pub local: PathBuf,

    /// Destination path in the bucket
    pub remote: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error(transparent)]
    Bucket(#[from] BucketTaskError),
    #[error("push refused: '{remote}' already exists or '{local}' is missing")]
    Refused { local: String, remote: String },
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Push {
    type Error = PushError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let local = self.local.clone();
        let remote = self.remote.clone();
        let pushed = ctx
            .with_bucket(move |bucket| bucket.file_push(&local, &remote))
            .await?;

        if !pushed {
            return Err(PushError::Refused {
                local: self.local.display().to_string(),
                remote: self.remote.clone(),
            });
        }
        Ok(format!("pushed {} -> {}", self.local.display(), self.remote))
    }
}
