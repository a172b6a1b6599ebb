//! External command execution.
//!
//! Cloud lookups shell out to vendor CLIs. [`CommandRunner`] is the seam
//! that lets tests substitute canned output for a real process.

use crate::error::{CloudError, CloudResult};
use async_trait::async_trait;

/// Captured result of a finished process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` if killed by a signal
    pub code: Option<i32>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl CommandOutput {
    /// Whether the process exited with status 0
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Exit status for messages
    pub fn status_text(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {}", code),
            None => "signal".to_string(),
        }
    }
}

/// Runs an external program to completion and captures its output
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`. Only a failure to start is an error;
    /// a non-zero exit is reported through [`CommandOutput::code`].
    async fn run(&self, program: &str, args: &[String]) -> CloudResult<CommandOutput>;
}

/// [`CommandRunner`] backed by real child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, program: &str, args: &[String]) -> CloudResult<CommandOutput> {
        log::debug!("Running: {} {}", program, args.join(" "));
        let output = tokio::process::Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(|e| CloudError::CommandSpawn {
                program: program.to_string(),
                source: e,
            })?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let result = SystemCommandRunner
            .run("schemaver-no-such-binary", &[])
            .await;
        assert!(matches!(result, Err(CloudError::CommandSpawn { .. })));
    }

    #[test]
    fn test_status_text() {
        let ok = CommandOutput {
            code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(ok.success());
        assert_eq!(ok.status_text(), "exit code 0");

        let killed = CommandOutput { code: None, ..ok };
        assert!(!killed.success());
        assert_eq!(killed.status_text(), "signal");
    }
}
