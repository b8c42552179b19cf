use clap::Args;

use crate::cli::op::BucketTaskError;

#[derive(Args, Debug, Clone)]
pub struct Rm {
    /// Path in the bucket to remove
    pub path: String,

    /// Remove a directory and everything below it
    #[arg(long, short)]
    pub recursive: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum RmError {
    #[error(transparent)]
    Bucket(#[from] BucketTaskError),
    #[error("'{0}' could not be removed completely")]
    Incomplete(String),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Rm {
    type Error = RmError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let path = self.path.clone();
        let recursive = self.recursive;
        let removed = ctx
            .with_bucket(move |bucket| {
                if recursive {
                    bucket.dir_delete(&path)
                } else {
                    bucket.file_delete(&path)
                }
            })
            .await?;

        if !removed {
            return Err(RmError::Incomplete(self.path.clone()));
        }
        Ok(format!("removed {}", self.path))
    }
}
