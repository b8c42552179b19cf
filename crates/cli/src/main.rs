// CLI modules
mod cli;
mod http_server;
mod process;

use clap::{Parser, Subcommand};
use cli::{
    args::Args, op::Op, Download, Info, Ls, Mkdir, Pull, Push, Rm, Serve, Url, Version,
};

command_enum! {
    (Push, Push),
    (Pull, Pull),
    (Ls, Ls),
    (Rm, Rm),
    (Mkdir, Mkdir),
    (Url, Url),
    (Info, Info),
    (Download, Download),
    (Serve, Serve),
    (Version, Version),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let default_level = match args.command {
        Command::Serve(_) => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };
    let log_level = args
        .log_level
        .as_deref()
        .and_then(|level| level.parse().ok())
        .unwrap_or(default_level);
    let _guard = process::init_logging(log_level);

    let ctx = cli::op::OpContext::new(cli::op::resolve_config_path(args.config));

    match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
            std::process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
