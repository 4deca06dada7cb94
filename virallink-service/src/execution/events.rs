// Execution Events
// Progress reporting for a pipeline run

use crate::runners::StepStatus;

use std::time::Duration;
use tokio::sync::mpsc;

/// Sender for execution progress events
pub type ProgressSender = mpsc::UnboundedSender<ExecutionEvent>;

/// Receiver for execution progress events
pub type ProgressReceiver = mpsc::UnboundedReceiver<ExecutionEvent>;

/// Create a new progress channel
pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    mpsc::unbounded_channel()
}

/// Events emitted during a pipeline run
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    /// Mandatory parameters passed; stages are about to run
    PipelineStarted {
        total_stages: usize,
        total_scripts: usize,
    },

    /// Run finished, successfully or not
    PipelineCompleted { success: bool, duration: Duration },

    /// Stage execution started
    StageStarted {
        stage_name: String,
        stage_number: String,
        label: String,
        total_stages: usize,
        total_scripts: usize,
    },

    /// Every script of the stage completed
    StageCompleted {
        stage_name: String,
        duration: Duration,
    },

    /// Script passed validation and is being launched
    ScriptStarted {
        stage_name: String,
        script: String,
        command: String,
        status: StepStatus,
    },

    /// One line of script output
    ScriptOutput {
        script: String,
        output: String,
        is_error: bool,
    },

    /// Script process exited and its output was checked
    ScriptCompleted {
        stage_name: String,
        script: String,
        status: StepStatus,
        duration: Duration,
        exit_code: Option<i32>,
    },

    /// Run aborted
    Error { message: String, exit_code: i32 },
}

/// Helper for optional event emission
#[derive(Debug, Clone, Default)]
pub struct EventSender {
    tx: Option<ProgressSender>,
}

impl EventSender {
    pub fn new(tx: Option<ProgressSender>) -> Self {
        Self { tx }
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// Send an event; a closed receiver is ignored
    pub fn send(&self, event: ExecutionEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_sender_delivers() {
        let (tx, mut rx) = progress_channel();
        let sender = EventSender::new(Some(tx));
        assert!(sender.is_enabled());

        sender.send(ExecutionEvent::PipelineStarted {
            total_stages: 6,
            total_scripts: 15,
        });

        match rx.recv().await {
            Some(ExecutionEvent::PipelineStarted {
                total_stages,
                total_scripts,
            }) => {
                assert_eq!(total_stages, 6);
                assert_eq!(total_scripts, 15);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_disabled_sender_is_noop() {
        let sender = EventSender::default();
        assert!(!sender.is_enabled());
        sender.send(ExecutionEvent::Error {
            message: "ignored".to_string(),
            exit_code: 1,
        });
    }

    #[test]
    fn test_closed_receiver_ignored() {
        let (tx, rx) = progress_channel();
        drop(rx);
        EventSender::new(Some(tx)).send(ExecutionEvent::PipelineCompleted {
            success: true,
            duration: Duration::from_secs(1),
        });
    }
}
