//! Execution result types.

use std::time::Duration;

use crate::output::AnsiInterpreter;

/// Result of command execution.
#[derive(Debug, Clone, Default)]
pub struct ExecutionResult {
    /// Raw output from the terminal.
    pub raw_output: Vec<u8>,
    /// Sanitized text output (ANSI codes stripped).
    pub text_output: String,
    /// Exit code (if command completed).
    pub exit_code: Option<i32>,
    /// Execution duration.
    pub duration: Duration,
}

impl ExecutionResult {
    /// Build a result from raw output, stripping escape sequences.
    pub fn from_raw(raw_output: Vec<u8>, duration: Duration) -> Self {
        let text_output = AnsiInterpreter::strip_ansi_bytes(&raw_output);
        Self {
            raw_output,
            text_output,
            exit_code: None,
            duration,
        }
    }

    /// Set the exit code.
    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }

    /// Check if command succeeded (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Check if command failed (non-zero exit code).
    pub fn failed(&self) -> bool {
        matches!(self.exit_code, Some(c) if c != 0)
    }

    /// Get output as string, trimmed.
    pub fn output_trimmed(&self) -> &str {
        self.text_output.trim()
    }

    /// Get output lines.
    pub fn output_lines(&self) -> impl Iterator<Item = &str> {
        self.text_output.lines()
    }
}
