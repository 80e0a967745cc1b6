//! End-to-end tests for the cypher-mend binary.
//!
//! Every run uses the mock executor and mock LLM, with a config path inside a
//! temporary directory so the user's own config file is never read.

use cypher_mend::repair::{RunReport, StatementOutcome};
use std::io::Write;
use std::process::{Command, Stdio};
use tempfile::TempDir;

fn run_mend(args: &[&str]) -> (i32, String, String) {
    run_mend_with_stdin(args, None)
}

fn run_mend_with_stdin(args: &[&str], stdin: Option<&str>) -> (i32, String, String) {
    run_mend_full(args, stdin, None)
}

/// Runs against a config file with `config_toml` as its contents.
fn run_mend_with_config(config_toml: &str, args: &[&str]) -> (i32, String, String) {
    run_mend_full(args, None, Some(config_toml))
}

fn run_mend_full(
    args: &[&str],
    stdin: Option<&str>,
    config_toml: Option<&str>,
) -> (i32, String, String) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = dir.path().join("config.toml");
    if let Some(contents) = config_toml {
        std::fs::write(&config, contents).expect("Failed to write config");
    }

    let mut command = Command::new(env!("CARGO_BIN_EXE_cypher-mend"));
    command
        .current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("--mock-db");
    if !args.contains(&"--llm") {
        command.args(["--llm", "mock"]);
    }

    let mut child = command
        .args(args)
        .env("RUST_LOG", "warn")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute command");

    if let Some(mut pipe) = child.stdin.take() {
        if let Some(input) = stdin {
            pipe.write_all(input.as_bytes())
                .expect("Failed to write stdin");
        }
    }

    let output = child.wait_with_output().expect("Failed to wait for command");
    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    (exit_code, stdout, stderr)
}

#[test]
fn test_repairs_and_reports_audit_trail() {
    let (code, stdout, stderr) = run_mend(&["-e", "CREATE (u:User {id:1})", "-e", "BAD SYNTAX {"]);

    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("[1] attempt 1: executing CREATE (u:User {id:1})"));
    assert!(stdout.contains("[1] ok"));
    assert!(stdout.contains("[2] failed: SyntaxError"));
    assert!(stdout.contains("[2] replaced with: BAD SYNTAX {}"));
    assert!(stdout.contains("2 statement(s): 2 executed (1 repaired), 0 gave up"));
}

#[test]
fn test_gave_up_exit_code() {
    let (code, stdout, _) = run_mend(&["--max-repair-attempts", "0", "-e", "RETURN ("]);

    assert_eq!(code, 2);
    assert!(stdout.contains("[1] gave up after 1 attempt(s)"));
}

#[test]
fn test_json_output() {
    let (code, stdout, _) = run_mend(&["--output", "json", "-e", "RETURN 1", "-e", "RETURN [1"]);

    assert_eq!(code, 0);
    let report: RunReport = serde_json::from_str(&stdout).expect("stdout should be a JSON report");
    assert_eq!(report.results.len(), 2);
    assert_eq!(report.results[1].outcome, StatementOutcome::Executed);
    assert_eq!(report.results[1].final_statement, "RETURN [1]");
    assert!(!stdout.contains("[1] ok"));
}

#[test]
fn test_script_from_stdin() {
    let (code, stdout, _) = run_mend_with_stdin(&["-"], Some("RETURN 1;\n\nRETURN 2;\n"));

    assert_eq!(code, 0);
    assert!(stdout.contains("2 statement(s): 2 executed"));
}

#[test]
fn test_script_file() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("seed.cypher");
    std::fs::write(&script, "CREATE (a:Person {name: 'Ann'});\nCREATE (b:Person {name: 'Bob'}").unwrap();
    let script = script.to_string_lossy().to_string();

    let (code, stdout, _) = run_mend(&[script.as_str()]);

    assert_eq!(code, 0);
    assert!(stdout.contains("[2] replaced with: CREATE (b:Person {name: 'Bob'})"));
}

#[test]
fn test_abort_on_give_up() {
    let (code, stdout, _) = run_mend(&[
        "--max-repair-attempts",
        "0",
        "--abort-on-give-up",
        "-e",
        "RETURN (",
        "-e",
        "RETURN 2",
    ]);

    assert_eq!(code, 2);
    assert!(!stdout.contains("[2]"));
    assert!(stdout.contains("run stopped early"));
}

#[test]
fn test_no_statements_is_fatal() {
    let (code, _, stderr) = run_mend(&[]);

    assert_eq!(code, 1);
    assert!(stderr.contains("No statements given"));
}

#[test]
fn test_unknown_llm_provider_is_fatal() {
    let (code, _, stderr) = run_mend(&["--llm", "nonexistent", "-e", "RETURN 1"]);

    assert_eq!(code, 1);
    assert!(stderr.contains("Unknown LLM provider"));
}

/// Nothing listens on port 1, so every repair request is refused.
const UNREACHABLE_OLLAMA: &str = r#"
[llm]
provider = "ollama"
base_url = "http://127.0.0.1:1"
timeout_secs = 2
"#;

#[test]
fn test_unreachable_oracle_is_fatal() {
    let (code, stdout, stderr) = run_mend_with_config(
        UNREACHABLE_OLLAMA,
        &["--llm", "ollama", "-e", "CREATE (a:Applied)", "-e", "RETURN (", "-e", "RETURN 3"],
    );

    assert_eq!(code, 1, "stdout: {stdout}");
    assert!(stderr.contains("Repair oracle unavailable while repairing statement 2"));
    assert!(stdout.contains("[1] ok"));
    assert!(!stdout.contains("[3]"));
    assert!(stdout.contains("1 statement(s): 1 executed (0 repaired), 0 gave up, run stopped early"));
}

#[test]
fn test_unreachable_oracle_json_lists_applied_statements() {
    let (code, stdout, _) = run_mend_with_config(
        UNREACHABLE_OLLAMA,
        &[
            "--llm",
            "ollama",
            "--output",
            "json",
            "-e",
            "CREATE (a:Applied)",
            "-e",
            "RETURN (",
        ],
    );

    assert_eq!(code, 1);
    let report: RunReport =
        serde_json::from_str(&stdout).expect("stdout should be the partial JSON report");
    assert!(report.stopped_early);
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].final_statement, "CREATE (a:Applied)");
    assert_eq!(report.results[0].outcome, StatementOutcome::Executed);
}
