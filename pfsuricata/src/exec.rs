//! Transport for reload instructions.
//!
//! Instructions are fire-and-forget: they are sent once, and success means
//! only that the transport itself did not fail.

use std::io::Write;
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("failed to send instruction to {program}: {source}")]
    Io {
        program: String,
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
}

/// Something that can run an opaque instruction on the appliance.
pub trait CommandExecutor {
    fn execute(&mut self, instruction: &str) -> Result<(), ExecError>;
}

/// Pipes instructions into pfSense's developer PHP shell (`pfSsh.php`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhpShell {
    pub program: String,
    pub args: Vec<String>,
}

impl PhpShell {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Wrap `instruction` the way `pfSsh.php` expects it on stdin.
    pub fn script(instruction: &str) -> String {
        format!("global $debug;\n$debug = 1;\n{instruction}\nexec\nexit")
    }
}

impl CommandExecutor for PhpShell {
    fn execute(&mut self, instruction: &str) -> Result<(), ExecError> {
        let program = self.program.clone();
        debug!(program = %program, "starting php shell");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ExecError::Spawn {
                program: program.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(Self::script(instruction).as_bytes())
                .map_err(|source| ExecError::Io {
                    program: program.clone(),
                    source,
                })?;
        }

        let output = child.wait_with_output().map_err(|source| ExecError::Io {
            program: program.clone(),
            source,
        })?;
        if !output.status.success() {
            return Err(ExecError::Failed {
                program,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        info!(program = %program, "reload instruction executed");
        Ok(())
    }
}

/// Keeps instructions in memory instead of running them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingExecutor {
    pub executed: Vec<String>,
}

impl CommandExecutor for RecordingExecutor {
    fn execute(&mut self, instruction: &str) -> Result<(), ExecError> {
        self.executed.push(instruction.to_string());
        Ok(())
    }
}
