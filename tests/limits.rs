use std::process::Command;

fn exec_path() -> String {
    env!("CARGO_BIN_EXE_pipeshell").to_string()
}

#[test]
fn test_segment_limit_enforced() {
    // Nine segments against the default limit of eight.
    let output = Command::new(exec_path())
        .args(["-c", "true | true | true | true | true | true | true | true | true"])
        .output()
        .expect("failed to run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("too many pipeline segments"), "stderr: {}", stderr);
}

#[test]
fn test_segment_limit_env_override() {
    let output = Command::new(exec_path())
        .args(["-c", "true | true | true | true | true | true | true | true | true"])
        .env("PIPESHELL_MAX_SEGMENTS", "16")
        .output()
        .expect("failed to run");

    assert!(output.status.success(), "exit: {:?}", output.status);
}

#[test]
fn test_argument_limit_enforced() {
    // Nine tokens in one segment against the default limit of eight.
    let output = Command::new(exec_path())
        .args(["-c", "echo 1 2 3 4 5 6 7 8"])
        .output()
        .expect("failed to run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("too many arguments"), "stderr: {}", stderr);
}

#[test]
fn test_argument_limit_boundary_ok() {
    let output = Command::new(exec_path())
        .args(["-c", "echo 1 2 3 4 5 6 7"])
        .output()
        .expect("failed to run");

    assert!(output.status.success());
    assert_eq!(&output.stdout[..], b"1 2 3 4 5 6 7\n");
}

#[test]
fn test_line_length_limit_enforced() {
    let long = format!("echo {}", "x".repeat(300));
    let output = Command::new(exec_path())
        .args(["-c", &long])
        .output()
        .expect("failed to run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("too many command line bytes"), "stderr: {}", stderr);
}

#[test]
fn test_line_length_env_override() {
    let long = format!("echo {}", "x".repeat(300));
    let output = Command::new(exec_path())
        .args(["-c", &long])
        .env("PIPESHELL_MAX_LINE_LEN", "1024")
        .output()
        .expect("failed to run");

    assert!(output.status.success());
}

#[test]
fn test_whitespace_only_segment_rejected() {
    let output = Command::new(exec_path())
        .args(["-c", "echo a | | echo b"])
        .output()
        .expect("failed to run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("empty command"), "stderr: {}", stderr);
}
