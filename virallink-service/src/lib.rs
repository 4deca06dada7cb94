// ViralLink Service Library
// Parameter resolution and fail-fast execution engine for the ViralLink pipeline

pub mod config;
pub mod error;
pub mod execution;
pub mod params;
pub mod resolve;
pub mod runners;
pub mod topology;
pub mod validation;

// Re-export commonly used types
pub use config::{InterpreterPaths, RunConfig};
pub use error::{PipelineError, PipelineResult};

// Re-export parameter types
pub use params::{ParameterFormat, ParameterStore};

// Re-export topology types
pub use topology::{
    virallink_topology, Interpreter, PipelineTopology, ScriptSpec, Stage, Token,
    MANDATORY_PARAMETERS,
};

// Re-export engine types
pub use execution::{
    progress_channel, ExecutionEvent, PipelineDriver, PlannedScript, ProgressSender, RunSummary,
};
pub use resolve::{ParameterResolver, ResolvedCommand};
pub use runners::{ExecutionLog, ProcessRunner, StepResult, StepRunner, StepStatus};
pub use validation::{PreflightReport, ValidationGate};
