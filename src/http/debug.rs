use reqwest::Url;
use reqwest::header::HeaderValue;
use serde_json::Value;

const MASK: &str = "***REDACTED***";
const DEFAULT_BODY_LIMIT: usize = 4_000;

/// Names that may carry the course session cookie or other credentials,
/// matched case-insensitively against query parameters, header names, form
/// fields and JSON object keys. Their values never reach a log line.
const SECRET_NAMES: &[&str] = &[
    "cookie",
    "set-cookie",
    "authorization",
    "x-api-key",
    "key",
    "api_key",
    "apikey",
    "token",
    "access_token",
    "secret",
    "pass",
    "password",
];

/// Controls the `[http-debug]` wire dump. Secrets are always masked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpDebugConfig {
    pub enabled: bool,
    pub max_body_chars: usize,
}

impl HttpDebugConfig {
    pub fn from_verbose(verbose: bool) -> Self {
        Self {
            enabled: verbose,
            max_body_chars: DEFAULT_BODY_LIMIT,
        }
    }

    pub fn disabled() -> Self {
        Self::from_verbose(false)
    }

    pub fn url(&self, url: &Url) -> String {
        masked_url(url)
    }

    pub fn header(&self, name: &str, value: &HeaderValue) -> String {
        if is_secret(name) {
            return MASK.to_string();
        }
        value
            .to_str()
            .map_or_else(|_| "<non-utf8>".to_string(), str::to_string)
    }

    /// Masks secret keys when the body is JSON, then clips it to
    /// `max_body_chars`.
    pub fn body(&self, raw: &str) -> String {
        let masked = masked_json_text(raw).unwrap_or_else(|| raw.to_string());
        clip(&masked, self.max_body_chars)
    }

    /// Renders the form as it goes on the wire, minus percent-encoding.
    pub fn form(&self, form: &[(&str, &str)]) -> String {
        let mut out = String::new();
        for (index, &(name, value)) in form.iter().enumerate() {
            if index > 0 {
                out.push('&');
            }
            out.push_str(name);
            out.push('=');
            out.push_str(if is_secret(name) {
                MASK
            } else {
                value
            });
        }
        out
    }
}

/// Configured header value as it may appear in a `Debug` dump.
pub fn mask_header(name: &str, value: &str) -> String {
    if is_secret(name) {
        MASK.to_string()
    } else {
        value.to_string()
    }
}

/// Configured endpoint URL with secret query parameters masked. Values that
/// do not parse as a URL are returned untouched.
pub fn mask_url(raw: &str) -> String {
    Url::parse(raw).map_or_else(|_| raw.to_string(), |url| masked_url(&url))
}

fn masked_url(url: &Url) -> String {
    if url.query().is_none() {
        return url.to_string();
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(name, value)| {
            let value = if is_secret(&name) {
                MASK.to_string()
            } else {
                value.into_owned()
            };
            (name.into_owned(), value)
        })
        .collect();

    let mut masked = url.clone();
    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked.to_string()
}

fn masked_json_text(raw: &str) -> Option<String> {
    let mut value: Value = serde_json::from_str(raw).ok()?;
    mask_json(&mut value);
    serde_json::to_string(&value).ok()
}

fn mask_json(value: &mut Value) {
    match value {
        Value::Object(map) => map.iter_mut().for_each(|(key, item)| {
            if is_secret(key) {
                *item = Value::String(MASK.to_string());
            } else {
                mask_json(item);
            }
        }),
        Value::Array(items) => items.iter_mut().for_each(mask_json),
        _ => {}
    }
}

fn clip(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        None => text.to_string(),
        Some((cut, _)) => {
            let dropped = text[cut..].chars().count();
            format!("{}... <truncated {dropped} chars>", &text[..cut])
        }
    }
}

fn is_secret(name: &str) -> bool {
    SECRET_NAMES
        .iter()
        .any(|secret| secret.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::{HttpDebugConfig, clip, mask_header, mask_url};
    use reqwest::Url;
    use reqwest::header::HeaderValue;

    #[test]
    fn from_verbose_toggles_the_dump() {
        let cfg = HttpDebugConfig::from_verbose(true);
        assert!(cfg.enabled);
        assert_eq!(cfg.max_body_chars, 4_000);
        assert!(!HttpDebugConfig::disabled().enabled);
    }

    #[test]
    fn url_masks_secret_query_params_only() {
        let url = Url::parse("http://example.com/api.php?act=chadan&token=super-secret")
            .expect("url");
        let masked = HttpDebugConfig::from_verbose(true).url(&url);
        assert!(masked.contains("act=chadan"));
        assert!(masked.contains("token=***REDACTED***"));
        assert!(!masked.contains("super-secret"));

        let plain = Url::parse("http://example.com/api.php").expect("url");
        assert_eq!(
            HttpDebugConfig::from_verbose(true).url(&plain),
            "http://example.com/api.php"
        );
    }

    #[test]
    fn mask_url_passes_through_unparseable_values() {
        assert_eq!(mask_url("not a url"), "not a url");
        assert!(!mask_url("https://x.test/?key=abc").contains("abc"));
    }

    #[test]
    fn cookie_headers_are_masked() {
        let value = HeaderValue::from_static("PHPSESSID=abc123");
        let cfg = HttpDebugConfig::from_verbose(true);
        assert_eq!(cfg.header("Cookie", &value), "***REDACTED***");
        assert_eq!(
            cfg.header("User-Agent", &HeaderValue::from_static("Bot/2.0")),
            "Bot/2.0"
        );

        assert_eq!(mask_header("user-agent", "Bot/2.0"), "Bot/2.0");
        assert_eq!(mask_header("Set-Cookie", "sid=1"), "***REDACTED***");
    }

    #[test]
    fn form_masks_password_fields() {
        let body = HttpDebugConfig::from_verbose(true)
            .form(&[("username", "13800138000"), ("pass", "hunter2")]);
        assert_eq!(body, "username=13800138000&pass=***REDACTED***");
    }

    #[test]
    fn body_masks_nested_json_keys() {
        let raw = r#"{"token":"secret","nested":{"api_key":"123"},"code":1}"#;
        let masked = HttpDebugConfig::from_verbose(true).body(raw);
        assert!(masked.contains("\"token\":\"***REDACTED***\""));
        assert!(masked.contains("\"api_key\":\"***REDACTED***\""));
        assert!(masked.contains("\"code\":1"));
        assert!(!masked.contains("secret"));
        assert!(!masked.contains("123"));
    }

    #[test]
    fn clip_counts_characters_not_bytes() {
        assert_eq!(clip("张三李四", 10), "张三李四");
        assert_eq!(clip("张三李四", 2), "张三... <truncated 2 chars>");
        assert_eq!(
            clip("abcdefghijklmnopqrstuvwxyz", 5),
            "abcde... <truncated 21 chars>"
        );
    }
}
