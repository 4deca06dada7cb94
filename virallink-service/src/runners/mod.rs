// Runners Module
// Launches one resolved script and decides whether it failed

pub mod log;
pub mod process;

// Re-export key types
pub use log::ExecutionLog;
pub use process::ProcessRunner;

use crate::error::PipelineResult;
use crate::resolve::ResolvedCommand;

use serde::Serialize;

use std::time::Duration;

/// Text the invoked toolchain prints when a script dies on an internal error.
/// Its presence fails the step even when the exit code is zero.
pub const FAILURE_MARKER: &str = "Execution halted";

/// Callback for output lines as they arrive: `(line, is_stderr)`
pub type OutputCallback = Box<dyn Fn(&str, bool) + Send + Sync>;

/// Lifecycle of one script invocation: `Pending -> Running -> Succeeded | Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Resolved but not launched
    Pending,
    /// Passed validation and launched
    Running,
    Succeeded,
    Failed,
}

/// Outcome of one script invocation
#[derive(Debug, Clone)]
pub struct StepResult {
    pub script: String,
    pub status: StepStatus,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub duration: Duration,
}

/// Decide a step's status from its captured output
pub fn detect_failure(stdout: &str, stderr: &str) -> StepStatus {
    if stdout.contains(FAILURE_MARKER) || stderr.contains(FAILURE_MARKER) {
        StepStatus::Failed
    } else {
        StepStatus::Succeeded
    }
}

/// Trait for step runners
#[async_trait::async_trait]
pub trait StepRunner: Send + Sync {
    /// Run the command to completion, appending its output to `log`
    async fn run(
        &self,
        command: &ResolvedCommand,
        log: &ExecutionLog,
        on_output: Option<&OutputCallback>,
    ) -> PipelineResult<StepResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_fails_step() {
        assert_eq!(
            detect_failure("loading data\nError in read.table: Execution halted", ""),
            StepStatus::Failed
        );
        assert_eq!(
            detect_failure("", "Calls: main -> stop\nExecution halted\n"),
            StepStatus::Failed
        );
    }

    #[test]
    fn test_clean_output_succeeds() {
        assert_eq!(detect_failure("done", "Warning: NAs introduced"), StepStatus::Succeeded);
        assert_eq!(detect_failure("", ""), StepStatus::Succeeded);
    }

    #[test]
    fn test_marker_is_case_sensitive() {
        assert_eq!(detect_failure("execution halted", ""), StepStatus::Succeeded);
    }
}
