pub mod download;
pub mod info;
pub mod ls;
pub mod mkdir;
pub mod pull;
pub mod push;
pub mod rm;
pub mod serve;
pub mod url;
pub mod version;

pub use download::Download;
pub use info::Info;
pub use ls::Ls;
pub use mkdir::Mkdir;
pub use pull::Pull;
pub use push::Push;
pub use rm::Rm;
pub use serve::Serve;
pub use url::Url;
pub use version::Version;
