use clap::Args;

use crate::cli::op::BucketTaskError;

#[derive(Args, Debug, Clone)]
pub struct Mkdir {
    /// Directory to create, with any missing parents
    pub path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MkdirError {
    #[error(transparent)]
    Bucket(#[from] BucketTaskError),
    #[error("'{0}' exists and is not a directory")]
    NotADirectory(String),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Mkdir {
    type Error = MkdirError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let path = self.path.clone();
        let created = ctx.with_bucket(move |bucket| bucket.dir_create(&path)).await?;

        if !created {
            return Err(MkdirError::NotADirectory(self.path.clone()));
        }
        Ok(format!("created {}", self.path))
    }
}
