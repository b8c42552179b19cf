pub mod args;
pub mod op;
pub mod ops;

pub use ops::{Download, Info, Ls, Mkdir, Pull, Push, Rm, Serve, Url, Version};
