use crate::http::debug::mask_header;
use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://hanlin.icu/api.php?act=chadan";
pub const DEFAULT_QUOTE_URL: &str = "https://api.qqsuu.cn/api/dm-mgjuzi";
pub const DEFAULT_IDENTIFIER_FIELD: &str = "username";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Compatible; Bot/2.0)";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_QUOTE_TIMEOUT_SECS: u64 = 5;

const TIMEOUT_RANGE_SECS: RangeInclusive<u64> = 15..=20;
const QUOTE_TIMEOUT_RANGE_SECS: RangeInclusive<u64> = 1..=5;
const CONFIG_DIR_NAME: &str = "netcourse";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Everything the query pipeline needs to reach its two remote services.
#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_url: String,
    pub quote_url: String,
    /// Name of the form field carrying the student identifier.
    pub identifier_field: String,
    pub timeout: Duration,
    pub quote_timeout: Duration,
    /// Static headers sent with the course request, credentials included.
    pub headers: HashMap<String, String>,
    pub fields: FieldNames,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            quote_url: DEFAULT_QUOTE_URL.to_string(),
            identifier_field: DEFAULT_IDENTIFIER_FIELD.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            quote_timeout: Duration::from_secs(DEFAULT_QUOTE_TIMEOUT_SECS),
            headers: HashMap::from([("User-Agent".to_string(), DEFAULT_USER_AGENT.to_string())]),
            fields: FieldNames::default(),
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: HashMap<&str, String> = self
            .headers
            .iter()
            .map(|(name, value)| (name.as_str(), mask_header(name, value)))
            .collect();

        f.debug_struct("AppConfig")
            .field("api_url", &self.api_url)
            .field("quote_url", &self.quote_url)
            .field("identifier_field", &self.identifier_field)
            .field("timeout", &self.timeout)
            .field("quote_timeout", &self.quote_timeout)
            .field("headers", &headers)
            .field("fields", &self.fields)
            .finish()
    }
}

/// Field names of a task object in the remote payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldNames {
    pub student: String,
    pub school: String,
    pub platform: String,
    pub course: String,
    pub status: String,
    pub progress: String,
    pub added_at: String,
    pub course_start: String,
    pub course_end: String,
    pub exam_start: String,
    pub exam_end: String,
    pub remarks: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            student: "name".to_string(),
            school: "school".to_string(),
            platform: "ptname".to_string(),
            course: "kcname".to_string(),
            status: "status".to_string(),
            progress: "process".to_string(),
            added_at: "addtime".to_string(),
            course_start: "courseStartTime".to_string(),
            course_end: "courseEndTime".to_string(),
            exam_start: "examStartTime".to_string(),
            exam_end: "examEndTime".to_string(),
            remarks: "remarks".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFileConfig {
    api_url: Option<String>,
    quote_url: Option<String>,
    identifier_field: Option<String>,
    timeout_secs: Option<u64>,
    quote_timeout_secs: Option<u64>,
    headers: Option<HashMap<String, String>>,
    fields: Option<FieldNames>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_with_path(None)
    }

    /// Loads defaults, then the TOML file, then environment overrides.
    ///
    /// An explicit path must exist; the discovered default path is optional.
    pub fn load_with_path(explicit_path: Option<&Path>) -> Result<Self> {
        let file_config = match explicit_path {
            Some(path) => {
                if !path.is_file() {
                    bail!(
                        "Failed to load config {}: file does not exist",
                        path.display()
                    );
                }
                load_file_config(path)?.map(|cfg| (cfg, path.to_path_buf()))
            }
            None => {
                let path = discover_config_path()?;
                load_file_config(&path)?.map(|cfg| (cfg, path))
            }
        };

        dotenvy::dotenv().ok();

        let (raw, config_path) = match file_config {
            Some((raw, path)) => (raw, Some(path)),
            None => (RawFileConfig::default(), None),
        };
        resolve(raw, config_path.as_deref())
    }
}

fn resolve(raw: RawFileConfig, config_path: Option<&Path>) -> Result<AppConfig> {
    let defaults = AppConfig::default();

    let file_api_url = raw.api_url.as_deref().and_then(non_empty).map(ToOwned::to_owned);
    let file_quote_url = raw
        .quote_url
        .as_deref()
        .and_then(non_empty)
        .map(ToOwned::to_owned);

    let identifier_field = match raw.identifier_field.as_deref() {
        Some(value) => non_empty(value)
            .map(ToOwned::to_owned)
            .ok_or_else(|| config_error(config_path, "identifier_field", "must not be empty"))?,
        None => defaults.identifier_field,
    };

    let timeout = parse_timeout(
        raw.timeout_secs,
        DEFAULT_TIMEOUT_SECS,
        TIMEOUT_RANGE_SECS,
        config_path,
        "timeout_secs",
    )?;
    let quote_timeout = parse_timeout(
        raw.quote_timeout_secs,
        DEFAULT_QUOTE_TIMEOUT_SECS,
        QUOTE_TIMEOUT_RANGE_SECS,
        config_path,
        "quote_timeout_secs",
    )?;

    let mut headers = defaults.headers;
    for (name, value) in raw.headers.unwrap_or_default() {
        if non_empty(&name).is_none() {
            return Err(config_error(config_path, "headers", "header name must not be empty"));
        }
        insert_header(&mut headers, &name, value);
    }
    if let Some(cookie) = env_non_empty("NETCOURSE_COOKIE") {
        insert_header(&mut headers, "Cookie", cookie);
    }

    Ok(AppConfig {
        api_url: env_non_empty("NETCOURSE_API_URL")
            .or(file_api_url)
            .unwrap_or(defaults.api_url),
        quote_url: env_non_empty("NETCOURSE_QUOTE_URL")
            .or(file_quote_url)
            .unwrap_or(defaults.quote_url),
        identifier_field,
        timeout,
        quote_timeout,
        headers,
        fields: raw.fields.unwrap_or_default(),
    })
}

fn parse_timeout(
    value: Option<u64>,
    default_secs: u64,
    allowed: RangeInclusive<u64>,
    config_path: Option<&Path>,
    key: &str,
) -> Result<Duration> {
    let secs = value.unwrap_or(default_secs);
    if !allowed.contains(&secs) {
        return Err(config_error(
            config_path,
            key,
            &format!(
                "must be between {} and {} seconds",
                allowed.start(),
                allowed.end()
            ),
        ));
    }
    Ok(Duration::from_secs(secs))
}

/// Header names are case-insensitive; a later entry replaces any earlier
/// spelling of the same name.
fn insert_header(headers: &mut HashMap<String, String>, name: &str, value: String) {
    let name = name.trim();
    headers.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
    headers.insert(name.to_string(), value);
}

fn discover_config_path() -> Result<PathBuf> {
    let base = match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) => match non_empty(&xdg) {
            Some(dir) => PathBuf::from(dir),
            None => bail!("Failed to resolve config path: XDG_CONFIG_HOME is set but empty"),
        },
        Err(_) => dirs::home_dir()
            .context("Failed to resolve config path: HOME directory is unavailable")?
            .join(".config"),
    };
    Ok(base.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// `Ok(None)` when there is no file at `path`.
fn load_file_config(path: &Path) -> Result<Option<RawFileConfig>> {
    if !path.is_file() {
        return Ok(None);
    }

    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to load config {}: unable to read file", path.display()))?;
    let raw = toml::from_str(&text)
        .map_err(|err| anyhow!("Failed to load config {}: {err}", path.display()))?;
    Ok(Some(raw))
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .and_then(|value| non_empty(&value).map(ToOwned::to_owned))
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn config_error(config_path: Option<&Path>, key_path: &str, reason: &str) -> anyhow::Error {
    match config_path {
        Some(path) => anyhow!("Failed to load config {}: {key_path}: {reason}", path.display()),
        None => anyhow!("Invalid config: {key_path}: {reason}"),
    }
}
