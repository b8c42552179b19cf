use clap::Args;

use crate::cli::op::BucketTaskError;

#[derive(Args, Debug, Clone)]
pub struct Url {
    /// Path of the file in the bucket
    pub path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum UrlError {
    #[error(transparent)]
    Bucket(#[from] BucketTaskError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Url {
    type Error = UrlError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let path = self.path.clone();
        Ok(ctx
            .with_bucket(move |bucket| bucket.file_get_url(&path))
            .await?)
    }
}
