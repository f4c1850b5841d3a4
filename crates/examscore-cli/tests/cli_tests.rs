//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn examscore() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("examscore").unwrap()
}

/// A command isolated from any config file or scoring URL on this machine.
fn isolated(dir: &TempDir) -> Command {
    let mut cmd = examscore();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("AI_SCORING_URL", "")
        .env_remove("EXAMSCORE_TIMEOUT_SECS")
        .env_remove("EXAMSCORE_HOST")
        .env_remove("EXAMSCORE_PORT")
        .env_remove("HOST")
        .env_remove("PORT");
    cmd
}

const SKY_REQUEST: &str = r#"{"answers": [
    {"question_id": "q1", "key_answer": "The sky is blue", "student_answer": "sky is blue", "max_score": 10},
    {"question_id": "q2", "key_answer": "Mitochondria", "student_answer": "", "max_score": 3}
]}"#;

fn write_request(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("answers.json");
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn similarity_standard_policy() {
    examscore()
        .args(["similarity", "The sky is blue", "sky is blue"])
        .assert()
        .success()
        .stdout("0.6667\n");
}

#[test]
fn similarity_lenient_policy() {
    examscore()
        .args(["similarity", "The sky is blue", "sky is blue", "--policy", "lenient"])
        .assert()
        .success()
        .stdout("0.8000\n");
}

#[test]
fn similarity_identical_texts() {
    examscore()
        .args(["similarity", "  Hello World ", "hello world"])
        .assert()
        .success()
        .stdout("1.0000\n");
}

#[test]
fn similarity_unknown_policy() {
    examscore()
        .args(["similarity", "a", "b", "--policy", "generous"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown similarity policy"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    isolated(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created examscore.toml"))
        .stdout(predicate::str::contains("Created answers.example.json"));

    assert!(dir.path().join("examscore.toml").exists());
    assert!(dir.path().join("answers.example.json").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("examscore.toml"), "# mine\n").unwrap();

    isolated(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("examscore.toml already exists"))
        .stdout(predicate::str::contains("Created answers.example.json"));

    let kept = std::fs::read_to_string(dir.path().join("examscore.toml")).unwrap();
    assert_eq!(kept, "# mine\n");
}

#[test]
fn init_output_can_be_scored() {
    let dir = TempDir::new().unwrap();
    isolated(&dir).arg("init").assert().success();

    isolated(&dir)
        .args(["score", "--answers", "answers.example.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("scored by local"));
}

#[test]
fn score_json_locally() {
    let dir = TempDir::new().unwrap();
    let path = write_request(&dir, SKY_REQUEST);

    let output = isolated(&dir)
        .args(["score", "--format", "json", "--answers"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["results"][0]["similarity_score"], 0.6667);
    assert_eq!(json["results"][0]["final_score"], 7);
    assert_eq!(json["results"][1]["final_score"], 0);
    assert_eq!(json["total_score"], 7);
    assert_eq!(json["total_max_score"], 13.0);
}

#[test]
fn score_table_locally() {
    let dir = TempDir::new().unwrap();
    let path = write_request(&dir, SKY_REQUEST);

    isolated(&dir)
        .args(["score", "--answers"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("0.6667"))
        .stdout(predicate::str::contains("Total: 7/13 (scored by local)"));
}

#[test]
fn score_falls_back_when_remote_unreachable() {
    let dir = TempDir::new().unwrap();
    let path = write_request(&dir, SKY_REQUEST);
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    isolated(&dir)
        .env("AI_SCORING_URL", format!("http://127.0.0.1:{port}/score_exam"))
        .args(["score", "--answers"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 7/13 (scored by local)"))
        .stdout(predicate::str::contains("Remote scoring failed"));
}

#[test]
fn score_rejects_request_without_answers_array() {
    let dir = TempDir::new().unwrap();
    let path = write_request(&dir, r#"{"answers": "q1"}"#);

    isolated(&dir)
        .args(["score", "--answers"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("answers array is required"));
}

#[test]
fn score_rejects_invalid_max_score() {
    let dir = TempDir::new().unwrap();
    let path = write_request(
        &dir,
        r#"{"answers": [{"question_id": "q1", "key_answer": "a", "student_answer": "a", "max_score": -1}]}"#,
    );

    isolated(&dir)
        .args(["score", "--answers"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid max_score"));
}

#[test]
fn score_nonexistent_file() {
    let dir = TempDir::new().unwrap();

    isolated(&dir)
        .args(["score", "--answers", "nonexistent.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn score_unknown_format() {
    let dir = TempDir::new().unwrap();
    let path = write_request(&dir, SKY_REQUEST);

    isolated(&dir)
        .args(["score", "--format", "xml", "--answers"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn help_output() {
    examscore()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Automatic scoring of free-text exam answers"));
}

#[test]
fn version_output() {
    examscore()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("examscore"));
}
