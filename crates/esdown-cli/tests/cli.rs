//! Integration tests for the `esdown` binary.
//!
//! These tests verify:
//! - `build` prints lowered code to stdout or writes into `--outdir`
//! - `--json` output is valid JSON with `schema_version`, `ok` and `notes`
//! - syntax errors exit non-zero and carry line/column
//! - config files are read and flags override them

use std::process::{Command, Output};
use tempfile::tempdir;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-q", "-p", "esdown-cli", "--bin", "esdown", "--"]);
    cmd
}

fn run_in(dir: &std::path::Path, args: &[&str]) -> Output {
    cargo_bin()
        .args(args)
        .arg("--cwd")
        .arg(dir)
        .output()
        .expect("Failed to run esdown")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("Output should be valid JSON")
}

#[test]
fn test_version_prints_name() {
    let output = cargo_bin().arg("version").output().expect("Failed to run esdown");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("esdown "));
}

#[test]
fn test_build_to_stdout_lowers_arrows() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("app.js"), "const add = (a, b) => a + b;\n").unwrap();

    let output = run_in(dir.path(), &["build", "app.js", "--target", "es5"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("const add = function(a, b) {"), "{stdout}");
    assert!(!stdout.contains("=>"), "{stdout}");
}

#[test]
fn test_build_json_reports_each_file() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("a.js"), "let x = 2 ** 3;\n").unwrap();
    std::fs::write(dir.path().join("b.js"), "let y = z ?? 1;\n").unwrap();

    let output = run_in(dir.path(), &["build", "a.js", "b.js", "--target", "es2015", "--json"]);
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["ok"], true);
    assert_eq!(json["schema_version"], 1);
    assert_eq!(json["target"], "es2015");
    assert_eq!(json["counts"]["total"], 2);
    assert!(json["notes"].is_array(), "notes should be an array");

    let files = json["files"].as_array().unwrap();
    assert!(files[0]["input"].as_str().unwrap().ends_with("a.js"));
    assert!(files[0]["code"].as_str().unwrap().contains("Math.pow(2, 3)"));
    assert!(files[1]["code"].as_str().unwrap().contains("z != null ? z : 1"));
}

#[test]
fn test_build_syntax_error_is_reported() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("bad.js"), "let ok = 1;\nlet = = 2;\n").unwrap();

    let output = run_in(dir.path(), &["build", "bad.js", "--json"]);
    assert!(!output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["ok"], false);
    assert_eq!(json["counts"]["failed"], 1);
    let error = &json["files"][0]["errors"][0];
    assert_eq!(error["code"], "ESDOWN_SYNTAX_ERROR");
    assert_eq!(error["line"], 2);
}

#[test]
fn test_build_outdir_and_config_file() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("main.js"), "export const f = () => this;\n").unwrap();
    std::fs::write(dir.path().join("esdown.json"), r#"{"target": "es5", "outdir": "dist"}"#).unwrap();

    let output = run_in(dir.path(), &["build", "main.js", "--config", "esdown.json"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stdout.is_empty());

    let written = std::fs::read_to_string(dir.path().join("dist").join("main.js")).unwrap();
    assert!(written.contains("function()"), "{written}");
}

#[test]
fn test_flag_overrides_config_target() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("main.js"), "const f = () => 1;\n").unwrap();
    std::fs::write(dir.path().join("esdown.json"), r#"{"target": "es5"}"#).unwrap();

    let output = run_in(
        dir.path(),
        &["build", "main.js", "--config", "esdown.json", "--target", "esnext"],
    );
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("=>"));
}

#[test]
fn test_invalid_config_fails() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("main.js"), "1;\n").unwrap();
    std::fs::write(dir.path().join("esdown.json"), r#"{"target": "es3"}"#).unwrap();

    let output = run_in(dir.path(), &["build", "main.js", "--config", "esdown.json"]);
    assert!(!output.status.success());
}

#[test]
fn test_minify_shortens_locals() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("min.js"),
        "export function total(values) { let runningSum = 0; for (const value of values) runningSum += value; return runningSum; }\n",
    )
    .unwrap();

    let output = run_in(dir.path(), &["build", "min.js", "--minify"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("function total("), "{stdout}");
    assert!(!stdout.contains("runningSum"), "{stdout}");
}

#[test]
fn test_check_json_reports_redeclaration() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("good.js"), "const a = 1;\n").unwrap();
    std::fs::write(dir.path().join("dup.js"), "const a = 1;\nconst a = 2;\n").unwrap();

    let output = run_in(dir.path(), &["check", "good.js", "dup.js", "--json"]);
    assert!(!output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["ok"], false);
    assert_eq!(json["files"][0]["ok"], true);
    assert_eq!(json["files"][1]["ok"], false);
    assert_eq!(json["files"][1]["errors"][0]["line"], 2);
}

#[test]
fn test_deep_nesting_fails_cleanly() {
    let dir = tempdir().unwrap();
    let source = format!("x = {}1{};\n", "(".repeat(2000), ")".repeat(2000));
    std::fs::write(dir.path().join("deep.js"), source).unwrap();

    let output = run_in(dir.path(), &["build", "deep.js", "--json"]);
    assert_eq!(output.status.code(), Some(1));

    let json = stdout_json(&output);
    let error = &json["files"][0]["errors"][0];
    assert_eq!(error["code"], "ESDOWN_SYNTAX_ERROR");
    assert_eq!(error["message"], "Expression nested too deeply");
}
