use super::payload::RawPayload;
use std::future::Future;

/// Classified result of one call to the course endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// A JSON object came back with HTTP 200; its own `code` still has to be
    /// checked against the success sentinel.
    Success(RawPayload),
    ApiError { code: i64, message: String },
    /// Network-level failure. `message` names the category only.
    TransportError { message: String },
    MalformedPayload { http_status: u16, message: String },
}

impl FetchOutcome {
    /// Whether the outcome carries at least one task worth rendering.
    pub fn has_tasks(&self) -> bool {
        match self {
            Self::Success(payload) => payload.is_success() && !payload.tasks().is_empty(),
            _ => false,
        }
    }
}

pub trait CourseSource {
    /// Remote failures are reported as an `Ok` outcome. `Err` means the call
    /// could not even be attempted.
    fn fetch(
        &self,
        identifier: &str,
    ) -> impl Future<Output = anyhow::Result<FetchOutcome>> + Send;
}

pub trait QuoteSource {
    /// Never fails; falls back to a fixed line.
    fn fetch_quote(&self) -> impl Future<Output = String> + Send;
}
