//! Execution failures.
//!
//! These never escape [`Sandbox::execute`](crate::Sandbox::execute); they are
//! rendered into the inline error block instead.

use std::time::Duration;

use thiserror::Error;

/// Why a snippet did not produce output.
#[derive(Error, Debug)]
pub enum ExecError {
    /// The interpreter could not be started.
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        /// Interpreter program name.
        program: String,
        /// Underlying spawn error.
        source: std::io::Error,
    },

    /// The snippet ran and reported failure.
    #[error("{}", describe_failure(.status, .stderr))]
    Failed {
        /// Exit code, if the process exited normally.
        status: Option<i32>,
        /// Whatever the snippet wrote to its error stream.
        stderr: String,
    },

    /// The snippet exceeded its wall-clock ceiling and was killed.
    #[error("execution timed out after {:.1}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// The snippet wrote more output than allowed.
    #[error("output exceeded the {0}-byte limit")]
    OutputLimit(usize),

    /// Code execution is turned off in this configuration.
    #[error("code execution is disabled")]
    Disabled,

    /// The executor itself panicked.
    #[error("executor panicked: {0}")]
    Panicked(String),

    /// I/O error while talking to the snippet.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExecError {
    /// Create a failure with an error message and no exit code.
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self::Failed {
            status: None,
            stderr: stderr.into(),
        }
    }
}

fn describe_failure(status: &Option<i32>, stderr: &str) -> String {
    let stderr = stderr.trim_end();
    match (*status, stderr.is_empty()) {
        (Some(code), true) => format!("process exited with status {code}"),
        (Some(code), false) => format!("process exited with status {code}:\n{stderr}"),
        (None, true) => "process terminated abnormally".to_string(),
        (None, false) => stderr.to_string(),
    }
}

/// Result type for executor operations.
pub type ExecResult<T> = std::result::Result<T, ExecError>;
