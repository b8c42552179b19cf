use std::error::Error;
use std::path::PathBuf;

use common::config::{BucketConfig, ConfigError};
use common::prelude::{Bucket, BucketError};

const CONFIG_DIR: &str = ".bucket";
const CONFIG_FILE: &str = "config.toml";

/// Resolve the config file path.
///
/// An explicit `--config` flag wins, otherwise `~/.bucket/config.toml`.
/// `./config.toml` is used only when no home directory can be found.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }
    match dirs::home_dir() {
        Some(home) => home.join(CONFIG_DIR).join(CONFIG_FILE),
        None => PathBuf::from(CONFIG_FILE),
    }
}

/// Failure running bucket work on the blocking pool.
#[derive(Debug, thiserror::Error)]
pub enum BucketTaskError {
    #[error(transparent)]
    Bucket(#[from] BucketError),
    #[error("bucket task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<ConfigError> for BucketTaskError {
    fn from(err: ConfigError) -> Self {
        Self::Bucket(err.into())
    }
}

#[derive(Debug, Clone)]
pub struct OpContext {
    /// Bucket config file
    pub config_path: PathBuf,
}

impl OpContext {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn load_config(&self) -> Result<BucketConfig, ConfigError> {
        let config = BucketConfig::load(&self.config_path)?;
        config.validate()?;
        Ok(config)
    }

    /// Open the bucket and run `f` against it on the blocking pool.
    ///
    /// The bucket (and its backend connection) lives only for the duration
    /// of `f`.
    pub async fn with_bucket<F, T>(&self, f: F) -> Result<T, BucketTaskError>
    where
        F: FnOnce(&Bucket) -> Result<T, BucketError> + Send + 'static,
        T: Send + 'static,
    {
        let config = self.load_config()?;
        let result = tokio::task::spawn_blocking(move || {
            let bucket = Bucket::from_config(config)?;
            tracing::debug!(bucket = ?bucket, "bucket opened");
            f(&bucket)
        })
        .await?;
        Ok(result?)
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::cli::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::cli::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::cli::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}
