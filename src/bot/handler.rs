use super::commands::{Identifier, parse_query};
use super::delivery::{Channel, Delivery, DeliverySink};
use crate::config::FieldNames;
use crate::course::{CourseSource, QuoteSource, Report, ReportFormatter};

pub const PROCESSING_TEXT: &str = "📡 正在查询该用户的所有网课任务数据，请稍候...✨";
pub const SERVICE_UNAVAILABLE_TEXT: &str = "💥 网课查询服务暂时不可用";

/// Runs one chat message through validate, fetch, quote, and format.
///
/// Holds no per-query state, so one handler may serve concurrent queries.
#[derive(Debug)]
pub struct QueryHandler<C, Q> {
    course: C,
    quotes: Q,
    formatter: ReportFormatter,
}

impl<C: CourseSource, Q: QuoteSource> QueryHandler<C, Q> {
    pub fn new(course: C, quotes: Q, fields: FieldNames) -> Self {
        Self {
            course,
            quotes,
            formatter: ReportFormatter::new(fields),
        }
    }

    /// Delivers a processing notice followed by the report (or a single
    /// validation error) and returns the channel of the last delivery.
    pub async fn handle<S: DeliverySink>(&self, raw_input: &str, sink: &mut S) -> Channel {
        let identifier = match parse_query(raw_input) {
            Ok(identifier) => identifier,
            Err(err) => {
                tracing::debug!(input = raw_input, reason = err.message(), "rejected query");
                sink.deliver(Delivery::error(err.message()));
                return Channel::Error;
            }
        };

        sink.deliver(Delivery::message(PROCESSING_TEXT));

        let delivery = match self.run_pipeline(&identifier).await {
            Ok(report) => Delivery::from(report),
            Err(err) => {
                tracing::error!(error = %format!("{err:#}"), "course query failed");
                Delivery::error(SERVICE_UNAVAILABLE_TEXT)
            }
        };
        let channel = delivery.channel;
        sink.deliver(delivery);
        channel
    }

    async fn run_pipeline(&self, identifier: &Identifier) -> anyhow::Result<Report> {
        let outcome = self.course.fetch(identifier.as_str()).await?;
        let quote = if outcome.has_tasks() {
            Some(self.quotes.fetch_quote().await)
        } else {
            None
        };
        Ok(self.formatter.format(&outcome, quote.as_deref()))
    }
}
