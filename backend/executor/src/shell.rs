use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::info;

use crate::executor::Failure;

pub const INVALID_COMMAND: &str = "Invalid command";

/// Run a whitespace-split command line without a shell.
///
/// The first token is the program and the rest are passed through literally;
/// quotes and globs are not interpreted. Output is stdout followed by stderr.
pub async fn run(command_line: &str, timeout: Option<Duration>) -> Result<String, Failure> {
    let mut tokens = command_line.split_whitespace();
    let Some(program) = tokens.next() else {
        return Err(Failure::new("", INVALID_COMMAND));
    };

    let mut cmd = Command::new(program);
    cmd.args(tokens)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    info!(program = %program, "Executing shell command");

    let pending = cmd.output();
    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, pending).await {
            Ok(result) => result,
            Err(_) => {
                return Err(Failure::new(
                    "",
                    format!("command timed out after {}", describe_limit(limit)),
                ))
            }
        },
        None => pending.await,
    };
    let output = result.map_err(|e| Failure::new("", e.to_string()))?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));

    if output.status.success() {
        return Ok(text);
    }
    let error = match output.status.code() {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    };
    Err(Failure::new(text, error))
}

/// Whole seconds as `{n}s`, anything finer as `{n}ms`.
fn describe_limit(limit: Duration) -> String {
    if limit.subsec_millis() == 0 && limit.as_secs() > 0 {
        format!("{}s", limit.as_secs())
    } else {
        format!("{}ms", limit.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blank_command_is_invalid() {
        for line in ["", "   ", "\t\n"] {
            let failure = run(line, None).await.unwrap_err();
            assert_eq!(failure.error, INVALID_COMMAND);
            assert!(failure.output.is_empty());
        }
    }

    #[tokio::test]
    async fn captures_stdout() {
        let out = run("echo hello   world", None).await.unwrap();
        assert_eq!(out, "hello world\n");
    }

    #[tokio::test]
    async fn quotes_are_literal() {
        let out = run(r#"echo "a b""#, None).await.unwrap();
        assert_eq!(out, "\"a b\"\n");
    }

    #[tokio::test]
    async fn nonzero_exit_is_failure() {
        let failure = run("false", None).await.unwrap_err();
        assert_eq!(failure.error, "exit status 1");
    }

    #[tokio::test]
    async fn stderr_is_captured_on_failure() {
        let failure = run("ls /cronpilot-definitely-missing", None).await.unwrap_err();
        assert!(failure.error.starts_with("exit status"));
        assert!(failure.output.contains("cronpilot-definitely-missing"));
    }

    #[tokio::test]
    async fn missing_program_is_failure() {
        let failure = run("cronpilot-no-such-binary --flag", None).await.unwrap_err();
        assert!(!failure.error.is_empty());
        assert!(failure.output.is_empty());
    }

    #[tokio::test]
    async fn timeout_kills_long_commands() {
        let failure = run("sleep 5", Some(Duration::from_millis(100))).await.unwrap_err();
        assert_eq!(failure.error, "command timed out after 100ms");
    }

    #[test]
    fn timeout_text_keeps_precision() {
        assert_eq!(describe_limit(Duration::from_secs(30)), "30s");
        assert_eq!(describe_limit(Duration::from_millis(1500)), "1500ms");
        assert_eq!(describe_limit(Duration::from_millis(250)), "250ms");
    }
}
