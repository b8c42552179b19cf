use clap::Args;

use common::prelude::DirectoryListing;

use crate::cli::op::BucketTaskError;

#[derive(Args, Debug, Clone)]
pub struct Ls {
    /// Directory in the bucket to list (defaults to the base directory)
    #[arg(default_value = "")]
    pub path: String,

    /// Show size, owner and permissions
    #[arg(long, short)]
    pub long: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum LsError {
    #[error(transparent)]
    Bucket(#[from] BucketTaskError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Ls {
    type Error = LsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let path = self.path.clone();

        if self.long {
            let listing = ctx
                .with_bucket(move |bucket| bucket.dir_list_detailed(&path))
                .await?;
            return Ok(format_long(&listing));
        }

        let names = ctx.with_bucket(move |bucket| bucket.dir_list(&path)).await?;
        if names.is_empty() {
            Ok("No items found".to_string())
        } else {
            Ok(names.join("\n"))
        }
    }
}

fn format_long(listing: &DirectoryListing) -> String {
    if listing.is_empty() {
        return "No items found".to_string();
    }
    listing
        .iter()
        .map(|(name, info)| {
            let suffix = if info.is_dir() { "/" } else { "" };
            format!(
                "{:<10} {:<8} {:<8} {:>12} {}{}",
                info.permissions, info.user, info.group, info.size, name, suffix
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
