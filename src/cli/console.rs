use crate::bot::{Channel, Delivery, DeliverySink, QueryHandler};
use crate::course::{CourseSource, QuoteSource};
use anyhow::Result;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Prints message-channel deliveries to stdout and error-channel ones to
/// stderr. A closed stream is logged, not fatal.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl DeliverySink for ConsoleSink {
    fn deliver(&mut self, delivery: Delivery) {
        let written = match delivery.channel {
            Channel::Message => write_line(&mut io::stdout().lock(), &delivery.text),
            Channel::Error => write_line(&mut io::stderr().lock(), &delivery.text),
        };
        if let Err(err) = written {
            tracing::warn!(error = %err, channel = ?delivery.channel, "failed to write delivery");
        }
    }
}

fn write_line(out: &mut impl Write, text: &str) -> io::Result<()> {
    writeln!(out, "{text}")?;
    out.flush()
}

/// Handles stdin lines as chat messages until EOF, `exit` or `quit`.
pub async fn run_console<C: CourseSource, Q: QuoteSource>(
    handler: &QueryHandler<C, Q>,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut sink = ConsoleSink;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if is_exit_line(line) {
            break;
        }
        if line.is_empty() {
            continue;
        }

        handler.handle(line, &mut sink).await;
    }

    Ok(())
}

fn is_exit_line(line: &str) -> bool {
    line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit")
}
