pub mod bot;
pub mod cli;
pub mod config;
pub mod course;
pub mod http;

use anyhow::Result;
use bot::{Channel, QueryHandler};
use cli::{CliArgs, ConsoleSink, run_console};
use config::AppConfig;
use course::{RemoteCourseSource, RemoteQuoteSource};
use http::HttpDebugConfig;
use std::process::ExitCode;

/// Handles the message given on the command line, or every stdin line when
/// there is none.
pub async fn run(args: CliArgs) -> Result<ExitCode> {
    let config = AppConfig::load_with_path(args.config.as_deref())?;
    tracing::debug!(?config, "configuration loaded");

    let debug = HttpDebugConfig::from_verbose(args.verbose);
    let handler = QueryHandler::new(
        RemoteCourseSource::new(&config, debug),
        RemoteQuoteSource::new(&config, debug),
        config.fields.clone(),
    );

    match args.message_line() {
        Some(line) => {
            let channel = handler.handle(&line, &mut ConsoleSink).await;
            Ok(ExitCode::from(exit_status(channel)))
        }
        None => {
            run_console(&handler).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn exit_status(channel: Channel) -> u8 {
    match channel {
        Channel::Message => 0,
        Channel::Error => 1,
    }
}
