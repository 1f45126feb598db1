//! Binary-level tests run against an isolated HOME.

use assert_cmd::Command;
use predicates::str::contains;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

struct TestEnv {
    _tmp: TempDir,
    home: PathBuf,
    base: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let home = tmp.path().join("home");
        let base = tmp.path().join("github");
        fs::create_dir_all(&home).expect("create isolated home");
        fs::create_dir_all(&base).expect("create base dir");
        Self { _tmp: tmp, home, base }
    }

    fn add_repo(&self, org: &str, name: &str) {
        let dir = self.base.join(org).join(name);
        fs::create_dir_all(&dir).expect("create repo");
        fs::write(dir.join("compose.yaml"), "services: {}\n").expect("write compose file");
    }

    fn ledger(&self) -> PathBuf {
        self.home.join(".config/loopback-manager/assignments.txt")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("loopback-manager").unwrap();
        cmd.env("HOME", &self.home)
            .env("GITHUB_BASE_DIR", &self.base)
            .env_remove("LOOPBACK_MANAGER_DATA_FILE")
            .env_remove("RUST_LOG");
        cmd
    }

    fn run_json(&self, args: &[&str]) -> Value {
        let out = self
            .cmd()
            .args(args)
            .arg("--json")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }
}

#[test]
fn assign_then_list_json() {
    let env = TestEnv::new();
    env.add_repo("acme", "web");

    env.cmd()
        .args(["assign", "acme", "web"])
        .assert()
        .success()
        .stdout(contains("Assigned 127.0.0.10 to acme/web"));

    let listed = env.run_json(&["list"]);
    assert_eq!(listed[0]["org"], "acme");
    assert_eq!(listed[0]["name"], "web");
    assert_eq!(listed[0]["ip"], "127.0.0.10");
    assert_eq!(fs::read_to_string(env.ledger()).unwrap(), "acme web 127.0.0.10\n");
}

#[test]
fn conflict_exits_nonzero() {
    let env = TestEnv::new();
    env.add_repo("acme", "a");
    env.add_repo("acme", "b");

    env.cmd().args(["assign", "acme", "a", "--ip", "127.0.0.20"]).assert().success();
    env.cmd()
        .args(["assign", "acme", "b", "-i", "127.0.0.20"])
        .assert()
        .failure()
        .stderr(contains("already assigned to acme/a"));
}

#[test]
fn invalid_address_exits_nonzero() {
    let env = TestEnv::new();
    env.cmd()
        .args(["assign", "acme", "a", "--ip", "192.168.0.1"])
        .assert()
        .failure()
        .stderr(contains("invalid IP address"));
}

#[test]
fn auto_assign_dry_run_then_execute() {
    let env = TestEnv::new();
    env.add_repo("acme", "a");
    env.add_repo("acme", "b");

    env.cmd()
        .arg("auto-assign")
        .assert()
        .success()
        .stdout(contains("Found 2 unassigned repositories:"))
        .stdout(contains("DRY RUN MODE"))
        .stdout(contains("To execute, run with --execute flag"))
        .stdout(contains("Would assign 127.0.0.11 to acme/b"));
    assert!(!env.ledger().exists());

    env.cmd().args(["auto-assign", "--execute"]).assert().success();
    assert_eq!(
        fs::read_to_string(env.ledger()).unwrap(),
        "acme a 127.0.0.10\nacme b 127.0.0.11\n"
    );

    let unassigned = env.run_json(&["scan"]);
    assert_eq!(unassigned.as_array().map(Vec::len), Some(0));
}

#[test]
fn remove_missing_fails_and_existing_succeeds() {
    let env = TestEnv::new();
    env.cmd()
        .args(["remove", "acme", "a"])
        .assert()
        .failure()
        .stderr(contains("no IP assignment found for acme/a"));

    env.cmd().args(["assign", "acme", "a"]).assert().success();
    env.cmd()
        .args(["rm", "acme", "a"])
        .assert()
        .success()
        .stdout(contains("Removed IP assignment 127.0.0.10 for acme/a"));
}

#[test]
fn check_reports_no_duplicates() {
    let env = TestEnv::new();
    env.cmd()
        .arg("check")
        .assert()
        .success()
        .stdout(contains("No duplicate IPs found."));
}

#[test]
fn config_file_range_is_used() {
    let env = TestEnv::new();
    env.add_repo("acme", "a");
    let config = env.home.join("custom.yaml");
    fs::write(&config, "ip_range:\n  start: 100\n  end: 110\n").unwrap();

    env.cmd()
        .args(["assign", "acme", "a", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(contains("127.0.0.100"));
}
