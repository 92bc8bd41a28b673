//! CLI end-to-end tests that invoke the compiled `potion-registry` binary
//! against temporary registry directories.

use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;

const SHELL_UTILS: &str = "name: shell-utils\nversion: 1.2.0\ntags: [utility]\n";
const GIT_HELPERS: &str = r#"name: git-helpers
version: 1.4.0
tags: [git, utility]
dependencies:
  - name: shell-utils
    version: ">=1.0.0"
"#;
const NEEDS_NEW_SHELL: &str = r#"name: fancy-prompt
version: 0.3.0
tags: [prompt]
dependencies:
  - name: shell-utils
    version: "^2.0.0"
"#;

fn potion() -> Command {
    Command::cargo_bin("potion-registry").unwrap()
}

/// A temp dir containing `plugins/` with the given manifests.
fn registry(manifests: &[(&str, &str)]) -> assert_fs::TempDir {
    let temp = assert_fs::TempDir::new().unwrap();
    let plugins = temp.child("plugins");
    plugins.create_dir_all().unwrap();
    for (file, content) in manifests {
        plugins.child(file).write_str(content).unwrap();
    }
    temp
}

#[test]
fn help_exits_zero() {
    potion()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("index"));
}

#[test]
fn resolve_clean_registry() {
    let temp = registry(&[("shell-utils.potion", SHELL_UTILS), ("git-helpers.potion", GIT_HELPERS)]);

    potion()
        .current_dir(temp.path())
        .arg("resolve")
        .assert()
        .success()
        .stdout(predicate::str::contains("All dependencies resolved successfully"))
        .stdout(predicate::str::contains("Total plugins: 2"))
        .stdout(predicate::str::contains("Total dependencies: 1"));
}

#[test]
fn resolve_reports_version_conflict() {
    let temp = registry(&[("shell-utils.potion", SHELL_UTILS), ("fancy-prompt.potion", NEEDS_NEW_SHELL)]);

    potion()
        .current_dir(temp.path())
        .arg("resolve")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "[fancy-prompt] dependency 'shell-utils' version '1.2.0' does not satisfy constraint '^2.0.0'",
        ));
}

#[test]
fn resolve_json_output() {
    let temp = registry(&[
        ("shell-utils.potion", SHELL_UTILS),
        ("git-helpers.potion", GIT_HELPERS),
        ("fancy-prompt.potion", NEEDS_NEW_SHELL),
    ]);

    let output = potion()
        .current_dir(temp.path())
        .args(["resolve", "--json"])
        .output()
        .unwrap();
    assert!(!output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["resolved"], false);
    assert_eq!(report["plugins"], 3);
    assert_eq!(report["dependencies"], 2);
    assert_eq!(report["errors"].as_array().unwrap().len(), 1);
}

#[test]
fn resolve_reports_cycle() {
    let temp = registry(&[
        ("a.potion", "name: a\nversion: 1.0.0\ndependencies:\n  - name: b\n"),
        ("b.potion", "name: b\nversion: 1.0.0\ndependencies:\n  - name: a\n"),
    ]);

    potion()
        .current_dir(temp.path())
        .arg("resolve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("circular dependency detected: a -> b -> a"));
}

#[test]
fn resolve_missing_plugins_dir_fails() {
    let temp = assert_fs::TempDir::new().unwrap();

    potion()
        .current_dir(temp.path())
        .arg("resolve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Plugins directory not found"));
}

#[test]
fn resolve_duplicate_names_fails() {
    let temp = registry(&[("one.potion", SHELL_UTILS), ("two.potion", SHELL_UTILS)]);

    potion()
        .current_dir(temp.path())
        .arg("resolve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate plugin name 'shell-utils'"));
}

#[test]
fn index_written_on_success() {
    let temp = registry(&[("shell-utils.potion", SHELL_UTILS), ("git-helpers.potion", GIT_HELPERS)]);

    potion()
        .current_dir(temp.path())
        .args(["index", "-o", "dist/index.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated index with 2 plugins"));

    let content = std::fs::read_to_string(temp.path().join("dist/index.json")).unwrap();
    let index: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(index["total_plugins"], 2);
    assert_eq!(index["plugins"][0]["name"], "git-helpers");
    assert_eq!(
        index["categories"]["utility"],
        serde_json::json!(["git-helpers", "shell-utils"])
    );
    assert!(index["last_updated"].as_str().unwrap().ends_with('Z'));
}

#[test]
fn index_refused_when_unresolved() {
    let temp = registry(&[("shell-utils.potion", SHELL_UTILS), ("fancy-prompt.potion", NEEDS_NEW_SHELL)]);
    temp.child("index.json").write_str("previous").unwrap();

    potion()
        .current_dir(temp.path())
        .arg("index")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Index not generated"));

    temp.child("index.json").assert("previous");
}

#[test]
fn config_file_supplies_paths() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("registry").create_dir_all().unwrap();
    temp.child("registry/shell-utils.yaml").write_str(SHELL_UTILS).unwrap();
    temp.child("potion-registry.toml")
        .write_str(
            "[registry]\nplugins_dir = \"registry\"\nmanifest_extension = \"yaml\"\n\n[index]\noutput = \"out/catalog.json\"\n",
        )
        .unwrap();

    potion().current_dir(temp.path()).arg("index").assert().success();

    temp.child("out/catalog.json").assert(predicate::str::contains("\"shell-utils\""));
}

#[test]
fn check_valid_candidate() {
    let temp = registry(&[("shell-utils.potion", SHELL_UTILS)]);
    temp.child("git-helpers.potion").write_str(GIT_HELPERS).unwrap();

    potion()
        .current_dir(temp.path())
        .args(["check", "git-helpers.potion"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All dependencies are valid"));
}

#[test]
fn check_invalid_candidate() {
    let temp = registry(&[("shell-utils.potion", SHELL_UTILS)]);
    temp.child("candidate.potion")
        .write_str("name: candidate\nversion: 1.0.0\ndependencies:\n  - name: nowhere\n    version: '>=1.0.0'\n  - name: shell-utils\n    version: 'newest'\n")
        .unwrap();

    potion()
        .current_dir(temp.path())
        .args(["check", "candidate.potion"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("dependency 'nowhere' not found in registry"))
        .stderr(predicate::str::contains("invalid version constraint 'newest'"));
}

#[test]
fn check_reports_duplicate_registry_names() {
    let temp = registry(&[("one.potion", SHELL_UTILS), ("two.potion", SHELL_UTILS)]);
    temp.child("git-helpers.potion").write_str(GIT_HELPERS).unwrap();

    potion()
        .current_dir(temp.path())
        .args(["check", "git-helpers.potion"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate plugin name 'shell-utils'"))
        .stderr(predicate::str::contains("not found in registry").not());
}

#[test]
fn check_reports_unparsable_registry_file() {
    let temp = registry(&[("shell-utils.potion", SHELL_UTILS), ("broken.potion", "name: [unclosed\n")]);
    temp.child("git-helpers.potion").write_str(GIT_HELPERS).unwrap();

    potion()
        .current_dir(temp.path())
        .args(["check", "git-helpers.potion"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.potion"));
}

#[test]
fn check_lists_dependents_of_updated_plugin() {
    let temp = registry(&[("shell-utils.potion", SHELL_UTILS), ("git-helpers.potion", GIT_HELPERS)]);
    temp.child("update.potion")
        .write_str("name: shell-utils\nversion: 1.3.0\ntags: [utility]\n")
        .unwrap();

    potion()
        .current_dir(temp.path())
        .args(["check", "update.potion"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Required by: git-helpers"));
}

#[test]
fn resolve_json_install_order() {
    let temp = registry(&[("shell-utils.potion", SHELL_UTILS), ("git-helpers.potion", GIT_HELPERS)]);

    let output = potion()
        .current_dir(temp.path())
        .args(["resolve", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["install_order"], serde_json::json!(["shell-utils", "git-helpers"]));
}
