// Execution Module
// Sequential driver and the progress events it emits

pub mod driver;
pub mod events;

// Re-export key types
pub use driver::{PipelineDriver, PlannedScript, RunSummary};
pub use events::{progress_channel, ExecutionEvent, ProgressReceiver, ProgressSender};
