use super::payload::{TaskRecord, normalize};
use super::provider::FetchOutcome;
use super::quote::FALLBACK_QUOTE;
use crate::config::FieldNames;
use std::fmt::Write;

pub const NO_RECORDS: &str = "📭 没有找到该用户的任何网课任务记录！";
pub const DIVIDER: &str = "-----------------------";
pub const CLOSING_LINE: &str = "🌈 再难的任务也要坚持完成，聂半仙网课小助手和你一起努力！💪";
const NO_REMARKS_MARKER: &str = "无";
const UNKNOWN_CODE: &str = "未知";
const GENERIC_API_ERROR: &str = "接口返回错误";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub text: String,
    /// Routes the report to the error channel. An empty result counts as a
    /// failure even though the remote call succeeded.
    pub is_failure: bool,
}

impl Report {
    fn failure(text: String) -> Self {
        Self {
            text,
            is_failure: true,
        }
    }

    fn success(text: String) -> Self {
        Self {
            text,
            is_failure: false,
        }
    }
}

/// Renders a fetch outcome into the single message delivered to the user.
#[derive(Debug, Clone, Default)]
pub struct ReportFormatter {
    fields: FieldNames,
}

impl ReportFormatter {
    pub fn new(fields: FieldNames) -> Self {
        Self { fields }
    }

    /// `quote` is only consulted when there are tasks to show.
    pub fn format(&self, outcome: &FetchOutcome, quote: Option<&str>) -> Report {
        let payload = match outcome {
            FetchOutcome::TransportError { message }
            | FetchOutcome::MalformedPayload { message, .. } => {
                return Report::failure(format!("🚫 查询失败：{message}，请稍后再试～"));
            }
            FetchOutcome::ApiError { code, message } => {
                return Report::failure(api_error_line(&code.to_string(), message));
            }
            FetchOutcome::Success(payload) => payload,
        };

        if !payload.is_success() {
            let code = payload
                .code
                .map_or_else(|| UNKNOWN_CODE.to_string(), |code| code.to_string());
            let message = payload.message.as_deref().unwrap_or(GENERIC_API_ERROR);
            return Report::failure(api_error_line(&code, message));
        }

        let (tasks, is_empty) = normalize(payload, &self.fields);
        if is_empty {
            return Report::failure(NO_RECORDS.to_string());
        }

        Report::success(render_tasks(&tasks, quote.unwrap_or(FALLBACK_QUOTE)))
    }
}

fn api_error_line(code: &str, message: &str) -> String {
    format!("🚫 查询失败：{message}（错误码：{code}）")
}

fn render_tasks(tasks: &[TaskRecord], quote: &str) -> String {
    let total = tasks.len();
    let mut out = format!("🎉 查询到该用户共有 {total} 条网课任务记录：\n");
    for (index, task) in tasks.iter().enumerate() {
        render_task(&mut out, index + 1, total, task);
    }
    let _ = write!(out, "\n{quote}\n\n{CLOSING_LINE}");
    out
}

fn render_task(out: &mut String, index: usize, total: usize, task: &TaskRecord) {
    // Writing into a String cannot fail.
    let _ = write!(
        out,
        "\n📘 任务 {index}/{total}\n\
         👤 学生姓名：{}\n\
         🏫 所属学校：{}\n\
         💻 平台名称：{}\n\
         📚 课程名称：{}\n\
         {} 当前状态：{}\n\
         📈 完成进度：{}\n\
         📅 添加时间：{}\n\
         📆 课程时间：{} ~ {}\n\
         📝 考试时间：{} ~ {}\n\
         📋 备注信息：\n",
        task.student_name,
        task.school,
        task.platform_name,
        task.course_name,
        task.glyph().as_str(),
        task.status,
        task.progress.render(),
        task.added_at,
        task.course_window.start,
        task.course_window.end,
        task.exam_window.start,
        task.exam_window.end,
    );

    if task.remarks.is_empty() {
        let _ = writeln!(out, "  • {NO_REMARKS_MARKER}");
    } else {
        for remark in &task.remarks {
            let _ = writeln!(out, "  • {remark}");
        }
    }
    let _ = writeln!(out, "{DIVIDER}");
}

#[cfg(test)]
mod tests {
    use super::{CLOSING_LINE, DIVIDER, NO_RECORDS, Report, ReportFormatter};
    use crate::course::payload::RawPayload;
    use crate::course::provider::FetchOutcome;
    use crate::course::quote::FALLBACK_QUOTE;
    use serde_json::{Value, json};

    fn success(value: Value) -> FetchOutcome {
        FetchOutcome::Success(RawPayload::from_value(value).expect("object payload"))
    }

    fn format(outcome: &FetchOutcome) -> Report {
        ReportFormatter::default().format(outcome, Some("🌟 『q』 —— a"))
    }

    #[test]
    fn transport_and_malformed_outcomes_apologize() {
        let transport = format(&FetchOutcome::TransportError {
            message: "请求超时".to_string(),
        });
        assert!(transport.is_failure);
        assert_eq!(transport.text, "🚫 查询失败：请求超时，请稍后再试～");

        let malformed = format(&FetchOutcome::MalformedPayload {
            http_status: 502,
            message: "服务器返回了无法解析的数据（HTTP 502）".to_string(),
        });
        assert!(malformed.is_failure);
        assert!(malformed.text.contains("HTTP 502"));
    }

    #[test]
    fn api_errors_embed_message_and_code() {
        let report = format(&success(json!({"code": 0, "message": "user not found"})));
        assert!(report.is_failure);
        assert_eq!(report.text, "🚫 查询失败：user not found（错误码：0）");

        let generic = format(&success(json!({"data": [{"name": "x"}]})));
        assert_eq!(generic.text, "🚫 查询失败：接口返回错误（错误码：未知）");

        let explicit = format(&FetchOutcome::ApiError {
            code: 403,
            message: "forbidden".to_string(),
        });
        assert_eq!(explicit.text, "🚫 查询失败：forbidden（错误码：403）");
    }

    #[test]
    fn empty_or_absent_task_lists_are_failures() {
        for value in [
            json!({"code": 1}),
            json!({"code": 1, "data": []}),
            json!({"code": 1, "data": "none"}),
        ] {
            let report = format(&success(value));
            assert_eq!(
                report,
                Report {
                    text: NO_RECORDS.to_string(),
                    is_failure: true
                }
            );
        }
    }

    #[test]
    fn renders_each_task_numbered_in_order() {
        let report = format(&success(json!({
            "code": 1,
            "data": [{"name": "甲"}, {"name": "乙"}, {"name": "丙"}]
        })));

        assert!(!report.is_failure);
        assert!(report.text.starts_with("🎉 查询到该用户共有 3 条网课任务记录："));
        assert_eq!(report.text.matches(DIVIDER).count(), 3);
        let first = report.text.find("📘 任务 1/3").expect("task 1");
        let second = report.text.find("📘 任务 2/3").expect("task 2");
        let third = report.text.find("📘 任务 3/3").expect("task 3");
        assert!(first < second && second < third);
        assert!(report.text.find("甲").expect("甲") < report.text.find("乙").expect("乙"));
        assert!(report.text.ends_with(CLOSING_LINE));
        assert!(report.text.contains("\n🌟 『q』 —— a\n"));
    }

    #[test]
    fn renders_full_task_block() {
        let report = format(&success(json!({
            "code": 1,
            "data": [{
                "name": "张三",
                "school": "第一中学",
                "ptname": "智慧树",
                "kcname": "大学英语",
                "status": "学习中",
                "process": "55.0%",
                "addtime": "2024-03-01 10:00:00",
                "courseStartTime": "2024-03-01",
                "courseEndTime": "2024-06-30",
                "remarks": "第一章完成|第二章进行中"
            }]
        })));

        let expected = "🎉 查询到该用户共有 1 条网课任务记录：\n\
            \n📘 任务 1/1\n\
            👤 学生姓名：张三\n\
            🏫 所属学校：第一中学\n\
            💻 平台名称：智慧树\n\
            📚 课程名称：大学英语\n\
            🔄 当前状态：学习中\n\
            📈 完成进度：█████░░░░░ 55.0%\n\
            📅 添加时间：2024-03-01 10:00:00\n\
            📆 课程时间：2024-03-01 ~ 2024-06-30\n\
            📝 考试时间：未设置 ~ 未设置\n\
            📋 备注信息：\n\
            \x20\x20• 第一章完成\n\
            \x20\x20• 第二章进行中\n\
            -----------------------\n\
            \n🌟 『q』 —— a\n\
            \n🌈 再难的任务也要坚持完成，聂半仙网课小助手和你一起努力！💪";
        assert_eq!(report.text, expected);
    }

    #[test]
    fn missing_remarks_render_none_marker() {
        let report = format(&success(json!({"code": 1, "data": [{"status": "已完成"}]})));
        assert!(report.text.contains("📋 备注信息：\n  • 无\n"));
        assert!(report.text.contains("✅ 当前状态：已完成"));
    }

    #[test]
    fn missing_quote_uses_fallback() {
        let report =
            ReportFormatter::default().format(&success(json!({"code": 1, "data": [{}]})), None);
        assert!(report.text.contains(FALLBACK_QUOTE));
    }
}
