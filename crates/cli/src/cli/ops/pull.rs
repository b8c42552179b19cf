use std::path::PathBuf;

use clap::Args;

use crate::cli::op::BucketTaskError;

#[derive(Args, Debug, Clone)]
pub struct Pull {
    /// Path of the file in the bucket
    pub remote: String,

    /// Local destination; must not exist yet
    pub local: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum PullError {
    #[error(transparent)]
    Bucket(#[from] BucketTaskError),
    #[error("pull of '{0}' finished but no local file was written")]
    Incomplete(String),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Pull {
    type Error = PullError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let remote = self.remote.clone();
        let local = self.local.clone();
        let pulled = ctx
            .with_bucket(move |bucket| bucket.file_pull(&remote, &local))
            .await?;

        if !pulled {
            return Err(PullError::Incomplete(self.remote.clone()));
        }
        Ok(format!("pulled {} -> {}", self.remote, self.local.display()))
    }
}
