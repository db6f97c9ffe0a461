use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_page_script(dir: &TempDir, cards: &[(&str, &str)]) {
    let mut html = String::from("<html><body><main>");
    for (name, href) in cards {
        html.push_str(&format!(
            "<a class=\"gc-card\" aria-label=\"{}\" href=\"{}\"></a>",
            name, href
        ));
    }
    html.push_str("</main></body></html>");

    let script = format!("cat <<'EOF'\n{}\nEOF\n", html);
    fs::write(dir.path().join("page.sh"), script).expect("write page script");
}

fn write_config(dir: &TempDir, query: &str) -> std::path::PathBuf {
    let state_dir = dir.path().join("data");
    let script = dir.path().join("page.sh");
    let content = format!(
        r#"[general]
state_dir = "{}"

[watch]
query = "{}"

[source]
kind = "command"
command = "sh"
args = ["{}"]
timeout_secs = 10
"#,
        state_dir.display(),
        query,
        script.display()
    );

    let path = dir.path().join("config.toml");
    fs::write(&path, content).expect("write config");
    path
}

fn read_json(path: &Path) -> Value {
    let content = fs::read_to_string(path).expect("read state file");
    serde_json::from_str(&content).expect("valid json")
}

#[test]
fn config_init_writes_config_and_seeds_state() {
    let dir = TempDir::new().expect("temp dir");

    let mut cmd = cargo_bin_cmd!("careers-watch");
    cmd.current_dir(dir.path())
        .env_remove("QUERY")
        .args(["config", "init", "--path", "config.toml", "--query", "rust"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Watching \"rust\""));

    let content = fs::read_to_string(dir.path().join("config.toml")).expect("read config");
    assert!(content.contains("state_dir = \"./data\""));
    assert!(content.contains("query = \"rust\""));

    assert_eq!(
        read_json(&dir.path().join("data").join("links.json")),
        serde_json::json!([])
    );
    assert_eq!(
        read_json(&dir.path().join("data").join("changes.json")),
        serde_json::json!([])
    );
}

#[test]
fn malformed_dotenv_is_reported() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join(".env"), "this line has no equals sign\n").expect("write .env");

    let mut cmd = cargo_bin_cmd!("careers-watch");
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .args(["config", "init", "--path", "config.toml"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Failed to load .env file"));
}

#[test]
fn config_init_refuses_to_overwrite() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "# mine\n").expect("write config");

    let mut cmd = cargo_bin_cmd!("careers-watch");
    cmd.args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    assert_eq!(fs::read_to_string(&config_path).unwrap(), "# mine\n");
}

#[test]
fn run_without_query_fails() {
    let dir = TempDir::new().expect("temp dir");

    let mut cmd = cargo_bin_cmd!("careers-watch");
    cmd.current_dir(dir.path())
        .env_remove("QUERY")
        .env_remove("CAREERS_WATCH__WATCH__QUERY")
        .args(["run", "--once"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("QUERY"));

    assert!(!dir.path().join("data").exists());
}

#[test]
fn run_once_records_snapshot_and_changes() {
    let dir = TempDir::new().expect("temp dir");
    write_page_script(&dir, &[("Software Engineer", "/jobs/1?utm=x")]);
    let config_path = write_config(&dir, "rust");

    let mut cmd = cargo_bin_cmd!("careers-watch");
    cmd.arg("--config")
        .arg(&config_path)
        .args(["run", "--once"])
        .assert()
        .success();

    let links = read_json(&dir.path().join("data").join("links.json"));
    assert_eq!(
        links,
        serde_json::json!([
            {"name": "Software Engineer", "link": "https://careers.google.com/jobs/1?utm=x"}
        ])
    );

    let changes = read_json(&dir.path().join("data").join("changes.json"));
    assert_eq!(changes[0]["action"], "added");
    assert_eq!(changes[0]["link"]["name"], "Software Engineer");

    let mut cmd = cargo_bin_cmd!("careers-watch");
    cmd.arg("--config")
        .arg(&config_path)
        .arg("changes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Added jobs:"))
        .stdout(predicate::str::contains(
            "- Software Engineer:\n  https://careers.google.com/jobs/1\n",
        ));
}

#[test]
fn run_once_reports_removed_jobs_on_next_cycle() {
    let dir = TempDir::new().expect("temp dir");
    write_page_script(&dir, &[("Software Engineer", "/jobs/1"), ("SRE", "/jobs/2")]);
    let config_path = write_config(&dir, "rust");

    let mut cmd = cargo_bin_cmd!("careers-watch");
    cmd.arg("--config")
        .arg(&config_path)
        .args(["run", "--once"])
        .assert()
        .success();

    write_page_script(&dir, &[("SRE", "/jobs/2")]);

    let mut cmd = cargo_bin_cmd!("careers-watch");
    cmd.arg("--config")
        .arg(&config_path)
        .args(["run", "--once"])
        .assert()
        .success();

    let mut cmd = cargo_bin_cmd!("careers-watch");
    let output = cmd
        .arg("--config")
        .arg(&config_path)
        .args(["changes", "--json"])
        .output()
        .expect("run changes");

    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(
        value,
        serde_json::json!([
            {
                "link": {"name": "Software Engineer", "link": "https://careers.google.com/jobs/1"},
                "action": "removed"
            }
        ])
    );
}

#[test]
fn run_once_fails_when_page_has_no_cards() {
    let dir = TempDir::new().expect("temp dir");
    write_page_script(&dir, &[]);
    let config_path = write_config(&dir, "rust");

    let mut cmd = cargo_bin_cmd!("careers-watch");
    cmd.arg("--config")
        .arg(&config_path)
        .args(["run", "--once"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cycle failed"));

    let links = read_json(&dir.path().join("data").join("links.json"));
    assert_eq!(links, serde_json::json!([]));
}

#[test]
fn changes_without_history_prints_placeholder() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = write_config(&dir, "rust");

    let mut cmd = cargo_bin_cmd!("careers-watch");
    cmd.arg("--config")
        .arg(&config_path)
        .arg("changes")
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes recorded"));
}

#[test]
fn doctor_reports_missing_state_as_warning() {
    let dir = TempDir::new().expect("temp dir");
    write_page_script(&dir, &[("SRE", "/jobs/2")]);
    let config_path = write_config(&dir, "rust");

    let mut cmd = cargo_bin_cmd!("careers-watch");
    let output = cmd
        .arg("--config")
        .arg(&config_path)
        .args(["doctor", "--json"])
        .output()
        .expect("run doctor");

    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(value["overall"], "warn");

    let status = |name: &str| {
        value["checks"]
            .as_array()
            .expect("checks array")
            .iter()
            .find(|check| check["name"] == name)
            .map(|check| check["status"].clone())
    };
    assert_eq!(status("watch"), Some(Value::from("ok")));
    assert_eq!(status("state"), Some(Value::from("warn")));
    assert_eq!(status("source"), Some(Value::from("ok")));
}

#[test]
fn doctor_fails_without_query() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = write_config(&dir, "");

    let mut cmd = cargo_bin_cmd!("careers-watch");
    cmd.env_remove("QUERY")
        .env_remove("CAREERS_WATCH__WATCH__QUERY")
        .arg("--config")
        .arg(&config_path)
        .arg("doctor")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("No search query configured"));
}
