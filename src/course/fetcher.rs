use super::payload::RawPayload;
use super::provider::{CourseSource, FetchOutcome};
use crate::config::AppConfig;
use crate::http::debug::mask_url;
use crate::http::{HttpClient, HttpDebugConfig, HttpResponseData};
use anyhow::Context;
use std::collections::HashMap;
use std::time::Duration;

const TIMEOUT_MESSAGE: &str = "请求超时";
const CONNECT_MESSAGE: &str = "无法连接到查询服务器";
const NETWORK_MESSAGE: &str = "网络请求异常";

/// Course endpoint client. Every `fetch` makes exactly one POST on a fresh
/// connection pool that is dropped when the call returns.
#[derive(Debug, Clone)]
pub struct RemoteCourseSource {
    api_url: String,
    identifier_field: String,
    headers: HashMap<String, String>,
    timeout: Duration,
    debug: HttpDebugConfig,
}

impl RemoteCourseSource {
    pub fn new(config: &AppConfig, debug: HttpDebugConfig) -> Self {
        Self {
            api_url: config.api_url.clone(),
            identifier_field: config.identifier_field.clone(),
            headers: config.headers.clone(),
            timeout: config.timeout,
            debug,
        }
    }
}

impl CourseSource for RemoteCourseSource {
    async fn fetch(&self, identifier: &str) -> anyhow::Result<FetchOutcome> {
        tracing::debug!(
            identifier,
            url = %mask_url(&self.api_url),
            "querying course tasks"
        );

        let client = HttpClient::with_timeout(self.timeout, self.debug)
            .context("failed to build course HTTP client")?;
        let form = [(self.identifier_field.as_str(), identifier)];

        let response = match client.post_form(&self.api_url, &self.headers, &form).await {
            Ok(response) => response,
            Err(err) if err.is_builder() => {
                return Err(
                    anyhow::Error::new(err.without_url()).context("failed to build course request")
                );
            }
            Err(err) => {
                let outcome = transport_outcome(&err);
                tracing::warn!(error = %err.without_url(), "course request failed");
                return Ok(outcome);
            }
        };

        let outcome = classify_response(&response);
        tracing::debug!(status = response.status, ?outcome, "course response classified");
        Ok(outcome)
    }
}

fn transport_outcome(err: &reqwest::Error) -> FetchOutcome {
    let message = if err.is_timeout() {
        TIMEOUT_MESSAGE
    } else if err.is_connect() {
        CONNECT_MESSAGE
    } else {
        NETWORK_MESSAGE
    };
    FetchOutcome::TransportError {
        message: message.to_string(),
    }
}

fn classify_response(response: &HttpResponseData) -> FetchOutcome {
    let body = response.body.trim_start_matches('\u{feff}');
    let payload = match serde_json::from_str(body) {
        Ok(value) => RawPayload::from_value(value),
        Err(err) => {
            tracing::warn!(status = response.status, error = %err, "course response is not JSON");
            None
        }
    };

    let status = response.status;
    match payload {
        Some(payload) if response.is_ok() => FetchOutcome::Success(payload),
        Some(payload) => FetchOutcome::ApiError {
            code: payload.code.unwrap_or_else(|| i64::from(status)),
            message: payload
                .message
                .unwrap_or_else(|| format!("服务器返回异常状态 HTTP {status}")),
        },
        None => FetchOutcome::MalformedPayload {
            http_status: status,
            message: format!("服务器返回了无法解析的数据（HTTP {status}）"),
        },
    }
}
