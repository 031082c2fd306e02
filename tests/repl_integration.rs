// ABOUTME: End-to-end sessions against the spawned interpreter binary

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn interpreter() -> Command {
    Command::new(env!("CARGO_BIN_EXE_scheme-kont"))
}

/// Runs the interactive loop over piped stdin and collects the session.
fn run_session(input: &str) -> Output {
    let mut child = interpreter()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("interpreter binary spawns");
    child
        .stdin
        .as_mut()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("stdin accepts input");
    child.wait_with_output().expect("interpreter exits")
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Writes a temporary script file unique to this test
fn script_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("scheme-kont-{}-{}", std::process::id(), name));
    fs::write(&path, contents).expect("script file writes");
    path
}

// ============================================================================
// Interactive sessions
// ============================================================================

#[test]
fn test_session_echoes_results_and_says_goodbye() {
    let output = run_session("(+ 5 6)\n");
    let stdout = stdout_of(&output);
    assert!(stdout.contains("11"), "stdout: {}", stdout);
    assert!(stdout.contains("Goodbye"), "stdout: {}", stdout);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_session_scenarios() {
    let output = run_session(
        "(cons 'a (cons 'b 'c))\n\
         (list 1 2 3)\n\
         (apply + (cons 3 (cons 4 '())))\n",
    );
    let stdout = stdout_of(&output);
    assert!(stdout.contains("(a b . c)"), "stdout: {}", stdout);
    assert!(stdout.contains("(1 2 3)"), "stdout: {}", stdout);
    assert!(stdout.contains("7"), "stdout: {}", stdout);
}

#[test]
fn test_define_is_silent_then_usable() {
    let output = run_session(
        "(define fact (lambda (n) (if (= n 0) 1 (* n (fact (- n 1))))))\n\
         (fact 10)\n",
    );
    let stdout = stdout_of(&output);
    assert!(!stdout.contains("#<VOID>"), "stdout: {}", stdout);
    assert!(stdout.contains("3628800"), "stdout: {}", stdout);
}

#[test]
fn test_multiline_expression_completes() {
    let output = run_session("(+ 1\n2)\n");
    let stdout = stdout_of(&output);
    assert!(stdout.contains("3"), "stdout: {}", stdout);
}

#[test]
fn test_display_runs_before_result_echo() {
    let output = run_session(
        "((lambda (a b) (list a b)) (begin (display 1) 1) (begin (display 2) 2))\n",
    );
    let stdout = stdout_of(&output);
    let side_effects = stdout.find("12").expect("display output present");
    let echoed = stdout.find("(1 2)").expect("result echoed");
    assert!(side_effects < echoed, "stdout: {}", stdout);
}

#[test]
fn test_error_returns_to_prompt() {
    let output = run_session("(car 2)\n(+ 1 2)\n");
    assert!(
        stderr_of(&output).contains("car: expected pair"),
        "stderr: {}",
        stderr_of(&output)
    );
    assert!(stdout_of(&output).contains("3"));
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_user_error_message_format() {
    let output = run_session("(error 'bad \"news\")\n");
    assert!(
        stderr_of(&output).contains("Error: bad: \"news\""),
        "stderr: {}",
        stderr_of(&output)
    );
}

#[test]
fn test_call_cc_session() {
    let output = run_session("(+ 1 (call/cc (lambda (k) (+ 2 (k 10)))))\n");
    assert!(stdout_of(&output).contains("11"));
}

// ============================================================================
// Script mode
// ============================================================================

#[test]
fn test_script_runs_and_exits_zero() {
    let path = script_file(
        "fact.scm",
        "(define fact (lambda (n) (if (= n 0) 1 (* n (fact (- n 1))))))\n\
         (display (fact 10))\n\
         (newline)\n",
    );
    let output = interpreter().arg(&path).output().expect("script runs");
    assert_eq!(stdout_of(&output), "3628800\n");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_script_error_exits_one() {
    let path = script_file("broken.scm", "(car 42)\n");
    let output = interpreter().arg(&path).output().expect("script runs");
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).contains("car: expected pair"));
}

#[test]
fn test_missing_script_exits_one() {
    let output = interpreter()
        .arg("definitely-not-here.scm")
        .output()
        .expect("interpreter runs");
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).contains("cannot read script file"));
}

#[test]
fn test_script_then_interactive() {
    let path = script_file("prelude.scm", "(define shared 21)\n");
    let mut child = interpreter()
        .arg(&path)
        .arg("-")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("interpreter spawns");
    child
        .stdin
        .as_mut()
        .expect("stdin is piped")
        .write_all(b"(+ shared shared)\n")
        .expect("stdin accepts input");
    let output = child.wait_with_output().expect("interpreter exits");
    let stdout = stdout_of(&output);
    assert!(stdout.contains("42"), "stdout: {}", stdout);
    assert!(stdout.contains("Goodbye"), "stdout: {}", stdout);
}

#[test]
fn test_read_intrinsic_consumes_stdin() {
    let path = script_file("echo.scm", "(display (read))\n(newline)\n(display (eof-object? (read)))\n(newline)\n");
    let mut child = interpreter()
        .arg(&path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("interpreter spawns");
    child
        .stdin
        .as_mut()
        .expect("stdin is piped")
        .write_all(b"(a b c)\n")
        .expect("stdin accepts input");
    let output = child.wait_with_output().expect("interpreter exits");
    assert_eq!(stdout_of(&output), "(a b c)\n#t\n");
}
