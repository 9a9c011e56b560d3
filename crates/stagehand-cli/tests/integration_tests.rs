//! End-to-end tests of the `stagehand` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A command running in `dir` with an empty tool configuration.
fn stagehand(dir: &Path) -> Command {
    let config = dir.join("tool.toml");
    if !config.exists() {
        fs::write(&config, "").unwrap();
    }
    let mut cmd = Command::cargo_bin("stagehand").unwrap();
    cmd.current_dir(dir)
        .env_remove("RUST_LOG")
        .arg("--no-color")
        .arg("--config")
        .arg(&config);
    cmd
}

fn workspace(action_file: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("stagehand.toml"), action_file).unwrap();
    temp
}

const LAYOUT: &str = r##"
[vars]
name = "demo"

[[settings.groups]]
name = "docs"
actions = ["readme"]
manual = true

[[actions]]
name = "layout"
dirs = ["src/bin", "docs"]

[[actions]]
name = "readme"
files = [{ path = "docs/README.md", data = "# {{ .name }}" }]

[[actions]]
name = "main"
files = [{ path = "src/main.rs", data = "// {{ .name | upper }}" }]
"##;

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("stagehand")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_version_flag() {
    Command::cargo_bin("stagehand")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_no_arguments_is_usage_error() {
    Command::cargo_bin("stagehand")
        .unwrap()
        .assert()
        .code(2);
}

#[test]
fn test_run_creates_dirs_and_files() {
    let temp = workspace(LAYOUT);

    stagehand(temp.path()).arg("run").assert().success();

    assert!(temp.path().join("src/bin").is_dir());
    assert_eq!(
        fs::read_to_string(temp.path().join("src/main.rs")).unwrap(),
        "// DEMO"
    );
    // manual action without its group
    assert!(!temp.path().join("docs/README.md").exists());
}

#[test]
fn test_group_and_var_override() {
    let temp = workspace(LAYOUT);

    stagehand(temp.path())
        .args(["run", "--group", "docs", "--var", "name=other"])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(temp.path().join("docs/README.md")).unwrap(),
        "# other"
    );
    // not a member of the selected group
    assert!(!temp.path().join("src/main.rs").exists());
}

#[test]
fn test_dry_run_reports_without_writing() {
    let temp = workspace(LAYOUT);

    stagehand(temp.path())
        .args(["run", "--dry-run"])
        .assert()
        .success()
        .stderr(predicate::str::contains("create dir: src/bin"));

    assert!(!temp.path().join("src").exists());
    assert!(!temp.path().join("docs").exists());
}

#[test]
fn test_missing_action_file_exits_3() {
    let temp = TempDir::new().unwrap();

    stagehand(temp.path())
        .arg("run")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Action file not found"));
}

#[test]
fn test_conflicting_file_sources_exit_2() {
    let temp = workspace(
        r#"
[[actions]]
name = "bad"
files = [{ path = "a.txt", data = "x", local = "b.txt" }]
"#,
    );

    stagehand(temp.path())
        .arg("run")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("action [bad]"));
    assert!(!temp.path().join("a.txt").exists());
}

#[test]
fn test_unknown_group_exit_2() {
    let temp = workspace(LAYOUT);

    stagehand(temp.path())
        .args(["check", "--group", "nope"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown group 'nope'"));
}

#[test]
fn test_missing_config_file_exits_4() {
    let temp = workspace(LAYOUT);

    Command::cargo_bin("stagehand")
        .unwrap()
        .current_dir(temp.path())
        .args(["--config", "absent.toml", "check"])
        .assert()
        .code(4);
}

#[test]
fn test_check_plain_lists_plan_in_order() {
    let temp = workspace(LAYOUT);

    stagehand(temp.path())
        .args(["--output-format", "plain", "check"])
        .assert()
        .success()
        .stdout(predicate::eq("0\tdirs\tlayout\t2\n2\tfiles\tmain\t1\n"));
}

#[test]
fn test_check_skip_pattern() {
    let temp = workspace(LAYOUT);

    stagehand(temp.path())
        .args(["--output-format", "plain", "check", "--skip", "^lay"])
        .assert()
        .success()
        .stdout(predicate::eq("2\tfiles\tmain\t1\n"));
}

#[test]
fn test_check_json() {
    let temp = workspace(LAYOUT);

    let output = stagehand(temp.path())
        .args(["--output-format", "json", "check", "--group", "docs"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let steps: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(steps[0]["name"], "readme");
    assert_eq!(steps[0]["kind"], "files");
    assert_eq!(steps.as_array().unwrap().len(), 1);
}

#[test]
fn test_invalid_skip_pattern_exit_2() {
    let temp = workspace(LAYOUT);

    stagehand(temp.path())
        .args(["check", "--skip", "("])
        .assert()
        .code(2);
}

#[test]
fn test_rm_glob_and_fs_tree() {
    let temp = workspace(
        r#"
[vars]
pkg = "core"

[[actions]]
name = "clean"
rm = ["build/tmp*"]

[[actions]]
name = "rename"
fs = ["tree"]
"#,
    );
    fs::create_dir_all(temp.path().join("build")).unwrap();
    fs::write(temp.path().join("build/tmp1.log"), "").unwrap();
    fs::write(temp.path().join("build/tmp2.log"), "").unwrap();
    fs::write(temp.path().join("build/keep.log"), "").unwrap();
    fs::create_dir_all(temp.path().join("tree/{{ .pkg }}")).unwrap();
    fs::write(temp.path().join("tree/{{ .pkg }}/lib.txt"), "{{ .pkg }}").unwrap();

    stagehand(temp.path()).arg("run").assert().success();

    assert!(!temp.path().join("build/tmp1.log").exists());
    assert!(!temp.path().join("build/tmp2.log").exists());
    assert!(temp.path().join("build/keep.log").exists());
    assert_eq!(
        fs::read_to_string(temp.path().join("tree/core/lib.txt")).unwrap(),
        "core"
    );
    assert!(!temp.path().join("tree/{{ .pkg }}").exists());
}

#[test]
fn test_missing_key_error_policy() {
    let temp = workspace(
        r#"
[[actions]]
name = "strict"
files = [{ path = "out.txt", data = "{{ .absent }}" }]
"#,
    );

    stagehand(temp.path())
        .args(["run", "--missing-key", "error"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("strict"));
    assert!(!temp.path().join("out.txt").exists());

    stagehand(temp.path()).arg("run").assert().success();
    assert_eq!(fs::read_to_string(temp.path().join("out.txt")).unwrap(), "");
}

#[test]
fn test_awd_resolves_file_before_changing_directory() {
    let temp = workspace(
        r#"
[[actions]]
name = "layout"
dirs = ["made"]
"#,
    );
    fs::create_dir(temp.path().join("target")).unwrap();

    stagehand(temp.path())
        .args(["run", "-f", "stagehand.toml", "--awd", "target"])
        .assert()
        .success();

    assert!(temp.path().join("target/made").is_dir());
    assert!(!temp.path().join("made").exists());
}

#[cfg(unix)]
#[test]
fn test_commands_run_in_their_directory() {
    let temp = workspace(
        r#"
[[actions]]
name = "layout"
dirs = ["sub"]

[[actions]]
name = "touch"
cmd = [{ exec = "touch made.txt", dir = "sub" }]
"#,
    );

    stagehand(temp.path()).arg("run").assert().success();

    assert!(temp.path().join("sub/made.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_failing_command_stops_the_run() {
    let temp = workspace(
        r#"
[[actions]]
name = "fail"
cmd = ["false"]

[[actions]]
name = "after"
dirs = ["never"]
"#,
    );

    stagehand(temp.path())
        .arg("run")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("action [fail]"));
    assert!(!temp.path().join("never").exists());
}

#[test]
fn test_malformed_dotenv_is_reported_but_not_fatal() {
    let temp = workspace(LAYOUT);
    fs::write(temp.path().join(".env"), "BAD LINE WITHOUT EQUALS\n").unwrap();

    stagehand(temp.path())
        .arg("check")
        .assert()
        .success()
        .stderr(predicate::str::contains(".env not loaded"));
}

#[test]
fn test_completions_bash() {
    Command::cargo_bin("stagehand")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stagehand"));
}
