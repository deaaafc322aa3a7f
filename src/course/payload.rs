use crate::config::FieldNames;
use serde_json::{Map, Value};

/// `code` value the course endpoint uses to signal success.
pub const SUCCESS_CODE: i64 = 1;
pub const BAR_WIDTH: usize = 10;
pub const NO_REMARKS: &str = "无备注信息";

const DEFAULT_STUDENT: &str = "未知用户";
const DEFAULT_SCHOOL: &str = "未知学校";
const DEFAULT_PLATFORM: &str = "未知项目";
const DEFAULT_COURSE: &str = "未知课程";
const DEFAULT_STATUS: &str = "状态未知";
const DEFAULT_PROGRESS: &str = "0.0%";
const DEFAULT_ADDED_AT: &str = "未知时间";
const DEFAULT_TIME: &str = "未设置";

const BAR_FILLED: char = '█';
const BAR_EMPTY: char = '░';

/// The decoded course response. Nothing beyond "is a JSON object" is assumed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawPayload {
    pub code: Option<i64>,
    pub message: Option<String>,
    pub data: Option<Value>,
}

impl RawPayload {
    /// Returns `None` when the body is valid JSON but not an object.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut map) = value else {
            return None;
        };

        Some(Self {
            code: map.get("code").and_then(parse_code),
            message: ["message", "msg"]
                .iter()
                .find_map(|key| map.get(*key).and_then(non_blank_text)),
            data: map.remove("data"),
        })
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(SUCCESS_CODE)
    }

    /// Raw task entries; anything but a JSON array yields no entries.
    pub fn tasks(&self) -> &[Value] {
        match &self.data {
            Some(Value::Array(items)) => items,
            _ => &[],
        }
    }
}

/// Accepts `1`, `1.0` and `"1"`.
pub(crate) fn parse_code(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|v| v.fract() == 0.0 && v.abs() < i64::MAX as f64)
                .map(|v| v as i64)
        }),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusGlyph {
    Completed,
    InProgress,
    Pending,
    Unknown,
}

impl StatusGlyph {
    /// `已完成` must match exactly; the other categories match by substring.
    pub fn from_status(status: &str) -> Self {
        if status == "已完成" {
            Self::Completed
        } else if status.contains("进行中") || status.contains("学习中") {
            Self::InProgress
        } else if status.contains("待处理") || status.contains("排队中") {
            Self::Pending
        } else {
            Self::Unknown
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "✅",
            Self::InProgress => "🔄",
            Self::Pending => "⏳",
            Self::Unknown => "❓",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    /// Parsed and clamped to `0.0..=100.0`.
    Percent(f64),
    /// Shown verbatim.
    Unparsed(String),
}

impl Progress {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
        match number.parse::<f64>() {
            // Adding 0.0 folds a parsed -0 into 0.
            Ok(pct) if pct.is_finite() => Self::Percent(pct.clamp(0.0, 100.0) + 0.0),
            _ => Self::Unparsed(raw.to_string()),
        }
    }

    pub fn percent(&self) -> f64 {
        match self {
            Self::Percent(pct) => *pct,
            Self::Unparsed(_) => 0.0,
        }
    }

    pub fn render(&self) -> String {
        match self {
            Self::Percent(pct) => format!("{} {pct:.1}%", progress_bar(*pct)),
            Self::Unparsed(raw) => raw.clone(),
        }
    }
}

pub fn progress_bar(pct: f64) -> String {
    let filled = ((BAR_WIDTH as f64 * pct / 100.0).floor() as usize).min(BAR_WIDTH);
    let mut bar = String::with_capacity(BAR_WIDTH * BAR_FILLED.len_utf8());
    bar.extend(std::iter::repeat_n(BAR_FILLED, filled));
    bar.extend(std::iter::repeat_n(BAR_EMPTY, BAR_WIDTH - filled));
    bar
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskRecord {
    pub student_name: String,
    pub school: String,
    pub platform_name: String,
    pub course_name: String,
    pub status: String,
    pub progress: Progress,
    pub added_at: String,
    pub course_window: TimeWindow,
    pub exam_window: TimeWindow,
    /// Empty when the task carries no remarks.
    pub remarks: Vec<String>,
}

impl TaskRecord {
    pub fn from_entry(entry: &Value, fields: &FieldNames) -> Self {
        let empty = Map::new();
        let task = entry.as_object().unwrap_or(&empty);
        let text = |key: &str, default: &str| text_field(task, key, default);

        Self {
            student_name: text(&fields.student, DEFAULT_STUDENT),
            school: text(&fields.school, DEFAULT_SCHOOL),
            platform_name: text(&fields.platform, DEFAULT_PLATFORM),
            course_name: text(&fields.course, DEFAULT_COURSE),
            status: text(&fields.status, DEFAULT_STATUS),
            progress: Progress::parse(&text(&fields.progress, DEFAULT_PROGRESS)),
            added_at: text(&fields.added_at, DEFAULT_ADDED_AT),
            course_window: TimeWindow {
                start: text(&fields.course_start, DEFAULT_TIME),
                end: text(&fields.course_end, DEFAULT_TIME),
            },
            exam_window: TimeWindow {
                start: text(&fields.exam_start, DEFAULT_TIME),
                end: text(&fields.exam_end, DEFAULT_TIME),
            },
            remarks: split_remarks(&text(&fields.remarks, NO_REMARKS)),
        }
    }

    pub fn glyph(&self) -> StatusGlyph {
        StatusGlyph::from_status(&self.status)
    }
}

/// Returns the normalized tasks in payload order, and whether there were none.
pub fn normalize(payload: &RawPayload, fields: &FieldNames) -> (Vec<TaskRecord>, bool) {
    let tasks: Vec<TaskRecord> = payload
        .tasks()
        .iter()
        .map(|entry| TaskRecord::from_entry(entry, fields))
        .collect();
    let is_empty = tasks.is_empty();
    (tasks, is_empty)
}

fn split_remarks(raw: &str) -> Vec<String> {
    if raw == NO_REMARKS {
        return Vec::new();
    }

    raw.split('|')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn text_field(task: &Map<String, Value>, key: &str, default: &str) -> String {
    task.get(key)
        .and_then(non_blank_text)
        .unwrap_or_else(|| default.to_string())
}

fn non_blank_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
