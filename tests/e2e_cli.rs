#![cfg(unix)]

use expectrl::{Eof, Regex, Session};
use serial_test::serial;
use std::process::{Command, Output};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EXPECT_TIMEOUT: Duration = Duration::from_secs(10);

#[test]
#[serial]
fn one_shot_query_prints_report_and_exits_successfully() {
    let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
    let server = rt.block_on(MockServer::start());
    rt.block_on(async {
        mount_course(&server, 1).await;
        mount_quote(&server).await;
    });

    let env = TestEnv::new();
    let output = env.run(&server, &["网课查询", "13800138000"]);

    assert!(output.status.success(), "status: {:?}", output.status);
    let stdout = String::from_utf8(output.stdout).expect("stdout is utf-8");
    assert!(stdout.contains("📡 正在查询该用户的所有网课任务数据"), "stdout:\n{stdout}");
    assert!(stdout.contains("👤 学生姓名：张三"), "stdout:\n{stdout}");
    assert!(stdout.contains("█████░░░░░ 55.0%"), "stdout:\n{stdout}");
    assert!(stdout.contains("🌟 『千里之行，始于足下』 —— 老子"), "stdout:\n{stdout}");
}

#[test]
#[serial]
fn one_shot_validation_failure_makes_no_request() {
    let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
    let server = rt.block_on(MockServer::start());
    rt.block_on(mount_course(&server, 0));

    let env = TestEnv::new();
    let output = env.run(&server, &["网课查询", "12a3"]);

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout).expect("stdout is utf-8");
    let stderr = String::from_utf8(output.stderr).expect("stderr is utf-8");
    assert!(stdout.is_empty(), "stdout:\n{stdout}");
    assert!(
        stderr.contains("📵 输入内容错误，请确保输入仅包含数字！"),
        "stderr:\n{stderr}"
    );
    rt.block_on(server.verify());
}

#[test]
#[serial]
fn stdin_mode_handles_each_line_until_exit() {
    let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
    let server = rt.block_on(MockServer::start());
    rt.block_on(async {
        mount_course(&server, 1).await;
        mount_quote(&server).await;
    });

    let env = TestEnv::new();
    let mut session = Session::spawn(env.command(&server, &[])).expect("spawn netcourse in PTY");
    session.set_expect_timeout(Some(EXPECT_TIMEOUT));

    session.send_line("网课查询").expect("send usage line");
    session
        .expect(Regex("请输入手机号或学号进行查询"))
        .expect("usage hint");

    session.send_line("/查网课 13800138000").expect("send query line");
    session.expect(Regex("学生姓名：张三")).expect("report");
    session.expect(Regex("网课小助手和你一起努力")).expect("closing line");

    session.send_line("exit").expect("exit line");
    session.expect(Eof).expect("process exits");
}

struct TestEnv {
    config_home: TempDir,
    workdir: TempDir,
}

impl TestEnv {
    fn new() -> Self {
        Self {
            config_home: tempfile::tempdir().expect("create XDG_CONFIG_HOME tempdir"),
            workdir: tempfile::tempdir().expect("create working dir"),
        }
    }

    fn command(&self, server: &MockServer, args: &[&str]) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_netcourse"));
        command
            .args(args)
            .current_dir(self.workdir.path())
            .env("NO_COLOR", "1")
            .env("XDG_CONFIG_HOME", self.config_home.path())
            .env("NETCOURSE_API_URL", format!("{}/api.php", server.uri()))
            .env("NETCOURSE_QUOTE_URL", format!("{}/quote", server.uri()))
            .env_remove("NETCOURSE_COOKIE")
            .env_remove("RUST_LOG");
        command
    }

    fn run(&self, server: &MockServer, args: &[&str]) -> Output {
        self.command(server, args).output().expect("run netcourse")
    }
}

async fn mount_course(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 1,
            "data": [{
                "name": "张三",
                "school": "第一中学",
                "status": "学习中",
                "process": "55.0%"
            }]
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_quote(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/quote"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 200,
            "data": {"content": "千里之行，始于足下", "author": "老子"}
        })))
        .mount(server)
        .await;
}
