use assert_cmd::Command;
use tempfile::NamedTempFile;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().expect("tempfile");
    std::io::Write::write_all(&mut f, contents.as_bytes()).expect("write");
    f
}

fn restflow() -> Command {
    Command::cargo_bin("restflow").expect("binary")
}

#[test]
fn run_with_empty_template_prints_empty_results() {
    let f = write_temp("");
    let out = restflow()
        .args(["run", f.path().to_string_lossy().as_ref(), "--format", "json"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&out.get_output().stdout).into_owned();
    let value: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(value["status"], "succeeded");
    assert_eq!(value["results"], serde_json::json!({}));
}

#[test]
fn run_fails_when_no_host_accepts_connections() {
    let f = write_temp("rest_calls:\n  - method: GET\n    url: /status\n");
    restflow()
        .args([
            "run",
            f.path().to_string_lossy().as_ref(),
            "--host",
            "127.0.0.1",
            "--port",
            "1",
            "--timeout",
            "2000",
        ])
        .assert()
        .code(3); // RUN_FAILED
}

#[test]
fn run_rejects_invalid_template_before_sending() {
    let f = write_temp("rest_calls:\n  - method: GET\n    url: /x\n    response_format: csv\n");
    restflow()
        .args(["run", f.path().to_string_lossy().as_ref(), "--host", "127.0.0.1"])
        .assert()
        .code(2); // VALIDATION_FAILED
}

#[test]
fn run_reports_missing_template_file() {
    restflow()
        .args(["run", "/nonexistent/template.yaml"])
        .assert()
        .code(4); // RUNTIME_ERROR
}

#[test]
fn run_rejects_malformed_set_values() {
    let f = write_temp("");
    restflow()
        .args(["run", f.path().to_string_lossy().as_ref(), "--set", "novalue"])
        .assert()
        .code(4);
}
