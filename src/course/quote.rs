use super::payload::parse_code;
use super::provider::QuoteSource;
use crate::config::AppConfig;
use crate::http::{HttpClient, HttpDebugConfig};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

pub const FALLBACK_QUOTE: &str = "🌟 今天也要加油哦，未来的你会感谢现在努力的自己！";
/// `code` value the quote endpoint uses to signal success.
pub const QUOTE_SUCCESS_CODE: i64 = 200;

const DEFAULT_CONTENT: &str = "坚持不懈的努力，才有精彩的明天！";
const DEFAULT_AUTHOR: &str = "佚名";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub content: String,
    pub author: String,
}

impl Quote {
    /// Expects `{"code": 200, "data": {"content": ..., "author": ...}}`.
    pub fn from_payload(value: &Value) -> Option<Self> {
        if value.get("code").and_then(parse_code) != Some(QUOTE_SUCCESS_CODE) {
            return None;
        }
        let data = value.get("data")?.as_object()?;
        let text = |key: &str, default: &str| {
            data.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(default)
                .to_string()
        };

        Some(Self {
            content: text("content", DEFAULT_CONTENT),
            author: text("author", DEFAULT_AUTHOR),
        })
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "🌟 『{}』 —— {}", self.content, self.author)
    }
}

#[derive(Debug, Clone)]
pub struct RemoteQuoteSource {
    url: String,
    timeout: Duration,
    debug: HttpDebugConfig,
}

impl RemoteQuoteSource {
    pub fn new(config: &AppConfig, debug: HttpDebugConfig) -> Self {
        Self {
            url: config.quote_url.clone(),
            timeout: config.quote_timeout,
            debug,
        }
    }

    async fn try_fetch(&self) -> Option<Quote> {
        let client = match HttpClient::with_timeout(self.timeout, self.debug) {
            Ok(client) => client,
            Err(err) => {
                tracing::warn!(error = %err, "failed to build quote HTTP client");
                return None;
            }
        };

        let response = match client.get(&self.url, &HashMap::new()).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(error = %err.without_url(), "quote request failed");
                return None;
            }
        };
        if !response.is_ok() {
            tracing::debug!(status = response.status, "quote endpoint returned non-200");
            return None;
        }

        let value: Value = match serde_json::from_str(response.body.trim_start_matches('\u{feff}')) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(error = %err, "quote response is not JSON");
                return None;
            }
        };
        let quote = Quote::from_payload(&value);
        if quote.is_none() {
            tracing::debug!("quote response has an unexpected shape");
        }
        quote
    }
}

impl QuoteSource for RemoteQuoteSource {
    async fn fetch_quote(&self) -> String {
        match self.try_fetch().await {
            Some(quote) => quote.to_string(),
            None => FALLBACK_QUOTE.to_string(),
        }
    }
}
