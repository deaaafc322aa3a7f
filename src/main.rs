use anyhow::Result;
use clap::Parser;
use netcourse::cli::CliArgs;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = CliArgs::parse();
    init_tracing(args.verbose);
    netcourse::run(args).await
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "netcourse=debug"
    } else {
        "netcourse=info"
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
