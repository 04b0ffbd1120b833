//! End-to-end tests for the `refsort` binary.
//!
//! Each test gets its own database, workspace and settings file in a temp
//! directory, so nothing touches `~/.refsort`.

use assert_cmd::Command;
use serde_json::Value;
use std::path::{Path, PathBuf};

struct Env {
    dir: tempfile::TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// A command with isolated paths and no owner.
    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("refsort").unwrap();
        cmd.env_remove("REFSORT_OWNER")
            .env_remove("REFSORT_DB")
            .env_remove("REFSORT_TEST_DB")
            .env_remove("REFSORT_WORKSPACE")
            .env_remove("RUST_LOG")
            .env("REFSORT_CONFIG", self.path("config.json"))
            .arg("--db")
            .arg(self.path("projects.db"))
            .arg("--workspace")
            .arg(self.path("workspace.json"))
            .arg("--no-color");
        cmd
    }

    /// A command signed in as `user_1`.
    fn owned(&self) -> Command {
        let mut cmd = self.cmd();
        cmd.args(["--owner", "user_1"]);
        cmd
    }

    fn json(&self, mut cmd: Command, args: &[&str]) -> Value {
        let output = cmd.arg("--json").args(args).output().unwrap();
        assert!(
            output.status.success(),
            "refsort {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }

    fn contents(&self) -> Vec<String> {
        let list = self.json(self.cmd(), &["list"]);
        list["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["content"].as_str().unwrap().to_string())
            .collect()
    }
}

fn write(path: &Path, content: &str) {
    std::fs::write(path, content).unwrap();
}

#[test]
fn test_add_prepend_and_export() {
    let env = Env::new();
    env.cmd().args(["add", "Smith 2020"]).assert().success();
    env.cmd()
        .args(["add", "Jones 2019", "--prepend"])
        .assert()
        .success();

    assert_eq!(env.contents(), vec!["Jones 2019", "Smith 2020"]);

    let output = env.cmd().arg("export").output().unwrap();
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "[1] Jones 2019\n\n[2] Smith 2020\n"
    );
}

#[test]
fn test_import_strips_markers() {
    let env = Env::new();
    let input = env.path("refs.txt");
    write(&input, "[1] Alpha\n\n[2] Beta\n\n");

    let result = env.json(env.cmd(), &["import", input.to_str().unwrap()]);
    assert_eq!(result["count"], 2);
    assert_eq!(env.contents(), vec!["Alpha", "Beta"]);
}

#[test]
fn test_import_from_stdin() {
    let env = Env::new();
    env.cmd()
        .arg("import")
        .write_stdin("First\r\n\r\nSecond")
        .assert()
        .success();

    assert_eq!(env.contents(), vec!["First", "Second"]);
}

#[test]
fn test_move_and_remove_use_positions() {
    let env = Env::new();
    env.cmd().arg("import").write_stdin("A\n\nB\n\nC").assert().success();

    env.cmd().args(["move", "1", "3"]).assert().success();
    assert_eq!(env.contents(), vec!["B", "C", "A"]);

    env.cmd().args(["remove", "2"]).assert().success();
    assert_eq!(env.contents(), vec!["B", "A"]);
}

#[test]
fn test_remove_out_of_range_fails_and_keeps_list() {
    let env = Env::new();
    env.cmd().arg("import").write_stdin("A\n\nB\n\nC").assert().success();

    let output = env.cmd().args(["--json", "remove", "6"]).output().unwrap();
    assert_eq!(output.status.code(), Some(4));

    let err: Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(err["error"]["code"], "INDEX_OUT_OF_RANGE");
    assert_eq!(env.contents(), vec!["A", "B", "C"]);
}

#[test]
fn test_export_empty_list_fails() {
    let env = Env::new();
    let output = env.cmd().arg("export").output().unwrap();
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_export_to_file_with_links() {
    let env = Env::new();
    env.cmd()
        .args(["add", "Doe (2021). https://doi.org/10.1/x"])
        .assert()
        .success();

    let out = env.path("refs.txt");
    env.cmd()
        .args(["export", "--links", "--output", out.to_str().unwrap()])
        .assert()
        .success();

    let plain = std::fs::read_to_string(&out).unwrap();
    let html = std::fs::read_to_string(env.path("refs.html")).unwrap();
    assert_eq!(plain, "[1] Doe (2021). https://doi.org/10.1/x");
    assert!(html.contains("<a href=\"https://doi.org/10.1/x\">"));
}

#[test]
fn test_export_to_html_file_keeps_plain_text() {
    let env = Env::new();
    env.cmd()
        .args(["add", "Doe. https://example.org"])
        .assert()
        .success();

    let out = env.path("refs.html");
    env.cmd()
        .args(["export", "--links", "--output", out.to_str().unwrap()])
        .assert()
        .success();

    let plain = std::fs::read_to_string(&out).unwrap();
    let html = std::fs::read_to_string(env.path("refs.links.html")).unwrap();
    assert_eq!(plain, "[1] Doe. https://example.org");
    assert!(html.contains("<a href=\"https://example.org\">"));
}

#[test]
fn test_save_requires_owner() {
    let env = Env::new();
    env.cmd().args(["add", "A"]).assert().success();

    let output = env.cmd().arg("save").output().unwrap();
    assert_eq!(output.status.code(), Some(5));
    assert!(!env.path("projects.db").exists());
}

#[test]
fn test_save_open_round_trip() {
    let env = Env::new();
    env.cmd().args(["title", "Thesis"]).assert().success();
    env.cmd().arg("import").write_stdin("A\n\nB").assert().success();

    let saved = env.json(env.owned(), &["save"]);
    assert_eq!(saved["created"], true);
    let id = saved["project_id"].as_str().unwrap().to_string();

    // Nothing changed: no store calls.
    let again = env.json(env.owned(), &["save"]);
    assert_eq!(again["remote_calls"], 0);

    env.owned().arg("close").assert().success();
    assert!(env.contents().is_empty());

    env.owned().args(["open", &id]).assert().success();
    assert_eq!(env.contents(), vec!["A", "B"]);

    let status = env.json(env.owned(), &["status"]);
    assert_eq!(status["state"], "ready");
    assert_eq!(status["title"], "Thesis");
    assert_eq!(status["dirty"], false);
}

#[test]
fn test_reorder_saves_items_only() {
    let env = Env::new();
    env.cmd().arg("import").write_stdin("A\n\nB").assert().success();
    env.json(env.owned(), &["save"]);

    env.owned().args(["move", "2", "1"]).assert().success();
    let status = env.json(env.owned(), &["status"]);
    assert_eq!(status["items_changed"], true);
    assert_eq!(status["title_changed"], false);

    let saved = env.json(env.owned(), &["save"]);
    assert_eq!(saved["items_written"], true);
    assert_eq!(saved["title_written"], false);
    assert_eq!(saved["remote_calls"], 1);
}

#[test]
fn test_open_missing_project_is_not_found() {
    let env = Env::new();
    env.cmd().args(["add", "local"]).assert().success();

    let output = env.owned().args(["open", "proj_missing"]).output().unwrap();
    assert_eq!(output.status.code(), Some(3));

    let status = env.json(env.owned(), &["status"]);
    assert_eq!(status["state"], "anonymous");
    assert_eq!(env.contents(), vec!["local"]);
}

#[test]
fn test_projects_lists_only_owner() {
    let env = Env::new();
    env.cmd().args(["title", "Mine"]).assert().success();
    env.json(env.owned(), &["save"]);

    let mine = env.json(env.owned(), &["projects"]);
    assert_eq!(mine["count"], 1);
    assert_eq!(mine["projects"][0]["title"], "Mine");

    let theirs = env.json(
        {
            let mut cmd = env.cmd();
            cmd.args(["--owner", "user_2"]);
            cmd
        },
        &["projects"],
    );
    assert_eq!(theirs["count"], 0);
}

#[test]
fn test_settings_prepend_applies_to_add() {
    let env = Env::new();
    let settings = env.json(env.cmd(), &["settings", "--prepend", "true"]);
    assert_eq!(settings["prepend"], true);

    env.cmd().args(["add", "first"]).assert().success();
    env.cmd().args(["add", "second"]).assert().success();
    assert_eq!(env.contents(), vec!["second", "first"]);
}

#[test]
fn test_version_json() {
    let env = Env::new();
    let version = env.json(env.cmd(), &["version"]);
    assert_eq!(version["version"], env!("CARGO_PKG_VERSION"));
}
