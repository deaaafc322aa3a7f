use super::debug::HttpDebugConfig;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Request, RequestBuilder};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
#[cfg(test)]
use std::sync::{Arc, Mutex};

/// Thin wrapper over `reqwest::Client` that can dump each exchange as
/// `[http-debug]` lines with secrets masked.
#[derive(Clone)]
pub struct HttpClient {
    inner: Client,
    debug: HttpDebugConfig,
    sink: DumpSink,
}

#[derive(Clone)]
enum DumpSink {
    Tracing,
    #[cfg(test)]
    Capture(Arc<Mutex<Vec<String>>>),
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    pub fn new(inner: Client, debug: HttpDebugConfig) -> Self {
        Self {
            inner,
            debug,
            sink: DumpSink::Tracing,
        }
    }

    /// Builds a client with its own connection pool. `timeout` bounds the
    /// whole exchange: connect, send and body read.
    pub fn with_timeout(timeout: Duration, debug: HttpDebugConfig) -> Result<Self, reqwest::Error> {
        let inner = Client::builder().timeout(timeout).build()?;
        Ok(Self::new(inner, debug))
    }

    /// Sends `form` url-encoded. Invalid header names or values come back as
    /// a builder error before anything is sent.
    pub async fn post_form(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        form: &[(&str, &str)],
    ) -> Result<HttpResponseData, reqwest::Error> {
        let request = apply_headers(self.inner.post(url), headers)
            .form(form)
            .build()?;
        let shown = self.debug.form(form);
        self.send(request, &shown).await
    }

    pub async fn get(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<HttpResponseData, reqwest::Error> {
        let request = apply_headers(self.inner.get(url), headers).build()?;
        self.send(request, "").await
    }

    async fn send(
        &self,
        request: Request,
        shown_body: &str,
    ) -> Result<HttpResponseData, reqwest::Error> {
        if self.debug.enabled {
            self.emit(request_dump(self.debug, &request, shown_body));
        }

        let response = self.inner.execute(request).await?;
        let status = response.status().as_u16();
        let headers = if self.debug.enabled {
            response.headers().clone()
        } else {
            HeaderMap::new()
        };
        let body = response.text().await?;

        if self.debug.enabled {
            self.emit(response_dump(self.debug, status, &headers, &body));
        }
        Ok(HttpResponseData { status, body })
    }

    fn emit(&self, lines: Vec<String>) {
        match &self.sink {
            DumpSink::Tracing => {
                for line in lines {
                    tracing::debug!(target: "netcourse::http", "{line}");
                }
            }
            #[cfg(test)]
            DumpSink::Capture(captured) => {
                if let Ok(mut captured) = captured.lock() {
                    captured.extend(lines);
                }
            }
        }
    }

    #[cfg(test)]
    pub fn capturing(inner: Client, debug: HttpDebugConfig) -> (Self, Arc<Mutex<Vec<String>>>) {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let client = Self {
            inner,
            debug,
            sink: DumpSink::Capture(Arc::clone(&captured)),
        };
        (client, captured)
    }
}

fn apply_headers(builder: RequestBuilder, headers: &HashMap<String, String>) -> RequestBuilder {
    headers.iter().fold(builder, |builder, (name, value)| {
        builder.header(name.as_str(), value.as_str())
    })
}

/// `shown_body` must already be masked unless it is JSON.
fn request_dump(debug: HttpDebugConfig, request: &Request, shown_body: &str) -> Vec<String> {
    let start = format!("{} {}", request.method(), debug.url(request.url()));
    dump('>', debug, start, request.headers(), shown_body)
}

fn response_dump(
    debug: HttpDebugConfig,
    status: u16,
    headers: &HeaderMap,
    body: &str,
) -> Vec<String> {
    dump('<', debug, format!("HTTP {status}"), headers, body)
}

fn dump<'a>(
    arrow: char,
    debug: HttpDebugConfig,
    start: String,
    headers: impl IntoIterator<Item = (&'a HeaderName, &'a HeaderValue)>,
    body: &str,
) -> Vec<String> {
    let prefix = format!("[http-debug] {arrow}");
    let mut lines = vec![format!("{prefix} {start}")];
    for (name, value) in headers {
        let name = name.as_str();
        lines.push(format!("{prefix} {name}: {}", debug.header(name, value)));
    }
    lines.push(prefix.clone());

    let body = debug.body(body);
    if body.is_empty() {
        lines.push(format!("{prefix} <empty body>"));
    } else {
        lines.extend(body.lines().map(|line| format!("{prefix} {line}")));
    }
    lines
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponseData {
    pub status: u16,
    pub body: String,
}

impl HttpResponseData {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}
