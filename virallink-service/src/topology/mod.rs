// Topology Module
// Compiled, ordered description of stages, scripts and their parameter tokens

pub mod builder;
pub mod models;
pub mod virallink;

pub use builder::{ScriptSpecBuilder, StageBuilder, TopologyBuilder};
pub use models::{Interpreter, PipelineTopology, ScriptSpec, Stage, Token, LITERAL_FLAG_MAX_LEN};
pub use virallink::{virallink_topology, MANDATORY_PARAMETERS, TIEDIE_SENTINEL};
