//! Subprocess plumbing for the external CLI tools
//!
//! Both boundary tools (`gcalcli`, `crontab`) are plain non-interactive
//! commands, so `std::process::Command` with captured output is enough.

use std::io::Write;
use std::process::{Command, Output, Stdio};

/// Check whether a tool is available on PATH.
pub fn tool_on_path(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Run a tool with captured stdout/stderr, optionally feeding stdin.
pub fn run_tool(name: &str, args: &[&str], stdin: Option<&str>) -> std::io::Result<Output> {
    let mut cmd = Command::new(name);
    cmd.args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    match stdin {
        Some(input) => {
            cmd.stdin(Stdio::piped());
            let mut child = cmd.spawn()?;
            // take() so the pipe closes before wait; crontab reads to EOF
            if let Some(mut pipe) = child.stdin.take() {
                pipe.write_all(input.as_bytes())?;
            }
            child.wait_with_output()
        }
        None => cmd.output(),
    }
}

/// Lossy stdout text of a finished command.
pub fn stdout_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Lossy, trimmed stderr text of a finished command, for error messages.
pub fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_on_path_finds_sh() {
        assert!(tool_on_path("sh"));
    }

    #[test]
    fn test_tool_on_path_rejects_nonsense() {
        assert!(!tool_on_path("definitely-not-a-real-tool-9f2c"));
    }

    #[test]
    fn test_run_tool_with_stdin() {
        let output = run_tool("cat", &[], Some("hello\n")).expect("cat runs");
        assert!(output.status.success());
        assert_eq!(stdout_text(&output), "hello\n");
    }
}
