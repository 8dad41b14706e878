use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("arxiv-digest").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(contains("--config-dir"))
        .stdout(contains("--days"));
}

#[test]
fn test_cli_empty_api_key_fails_fast() {
    let dir = tempdir().unwrap();
    let config_dir = dir.path().join("config");
    fs::create_dir(&config_dir).unwrap();
    fs::write(config_dir.join("api.txt"), "\n").unwrap();
    // Unroutable address: reaching the network would hang or fail differently
    fs::write(config_dir.join("url.json"), r#"{"url": "http://10.255.255.1/search/?query=x"}"#).unwrap();

    let mut cmd = Command::cargo_bin("arxiv-digest").unwrap();
    cmd.arg("--config-dir")
        .arg(&config_dir)
        .arg("--output-dir")
        .arg(dir.path().join("summary"))
        .timeout(std::time::Duration::from_secs(30));
    cmd.assert()
        .failure()
        .stderr(contains("API key is missing or empty"));

    assert!(!dir.path().join("summary").exists());
}

#[test]
fn test_cli_missing_config_dir() {
    let dir = tempdir().unwrap();

    let mut cmd = Command::cargo_bin("arxiv-digest").unwrap();
    cmd.arg("--config-dir").arg(dir.path().join("nope"));
    cmd.assert()
        .failure()
        .stderr(contains("Failed to load configuration"));
}

#[test]
fn test_cli_rejects_zero_concurrency() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("api.txt"), "sk-test\n").unwrap();
    fs::write(dir.path().join("url.json"), r#"{"url": "https://arxiv.org/search/?query=x"}"#).unwrap();

    let mut cmd = Command::cargo_bin("arxiv-digest").unwrap();
    cmd.arg("--config-dir").arg(dir.path()).arg("--concurrency").arg("0");
    cmd.assert()
        .failure()
        .stderr(contains("concurrency must be greater than zero"));
}
