use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, trace};

use crate::ExecError;

/// Runs a command on a cluster node and returns its standard output.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, host: &str, command: &[String]) -> Result<String, ExecError>;
}

/// Quotes `arg` for the remote shell, leaving plain words untouched.
pub fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"-_./=:,@%+".contains(&b));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Runs commands as root over `ssh`.
#[derive(Debug, Clone)]
pub struct SshRunner {
    program: String,
    options: Vec<String>,
}

impl Default for SshRunner {
    fn default() -> Self {
        Self {
            program: "ssh".to_string(),
            options: vec![
                "-oEscapeChar=none".to_string(),
                "-oBatchMode=yes".to_string(),
                "-lroot".to_string(),
            ],
        }
    }
}

impl SshRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `program` in place of `ssh`.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Arguments passed to the ssh program for `command` on `host`.
    pub fn argv(&self, host: &str, command: &[String]) -> Result<Vec<String>, ExecError> {
        if host.trim().is_empty() {
            return Err(ExecError::InvalidCommand("empty host".into()));
        }
        if command.first().is_none_or(|c| c.trim().is_empty()) {
            return Err(ExecError::InvalidCommand("empty command".into()));
        }
        let remote = command
            .iter()
            .map(|arg| shell_quote(arg))
            .collect::<Vec<_>>()
            .join(" ");

        let mut argv = self.options.clone();
        argv.push(host.to_string());
        argv.push(remote);
        Ok(argv)
    }
}

#[async_trait]
impl CommandRunner for SshRunner {
    async fn run(&self, host: &str, command: &[String]) -> Result<String, ExecError> {
        let argv = self.argv(host, command)?;
        trace!(program = %self.program, ?argv, "spawning remote command");

        let output = Command::new(&self.program)
            .args(&argv)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let code = output.status.code();
            return Err(ExecError::Failed {
                host: host.to_string(),
                command: command.join(" "),
                code,
                status: code.map_or_else(|| "killed by signal".to_string(), |c| format!("exit code {c}")),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        debug!(host, command = %command.join(" "), "remote command succeeded");
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
