use clap::Args;

use crate::cli::op::BucketTaskError;

#[derive(Args, Debug, Clone)]
pub struct Info {
    /// Path of the file in the bucket
    pub path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum InfoError {
    #[error(transparent)]
    Bucket(#[from] BucketTaskError),
    #[error("failed to render file info: {0}")]
    Json(#[from] serde_json::Error),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Info {
    type Error = InfoError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let path = self.path.clone();
        let info = ctx
            .with_bucket(move |bucket| bucket.file_get_info(&path))
            .await?;

        if info.is_empty() {
            tracing::warn!(path = %self.path, "backend reported no details for this file");
        }
        Ok(serde_json::to_string_pretty(&info)?)
    }
}
