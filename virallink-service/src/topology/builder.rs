// Topology Builder
// Assembles an immutable PipelineTopology once at startup

use crate::topology::models::{Interpreter, PipelineTopology, ScriptSpec, Stage, Token};

/// Builder for a single script
#[derive(Debug, Clone)]
pub struct ScriptSpecBuilder {
    spec: ScriptSpec,
}

impl ScriptSpecBuilder {
    pub fn new(name: impl Into<String>, interpreter: Interpreter) -> Self {
        Self {
            spec: ScriptSpec {
                name: name.into(),
                interpreter,
                tokens: Vec::new(),
                subfolder: None,
            },
        }
    }

    /// Append a literal flag
    pub fn flag(mut self, flag: impl Into<String>) -> Self {
        self.spec.tokens.push(Token::Literal(flag.into()));
        self
    }

    /// Append a global parameter reference
    pub fn global(mut self, key: impl Into<String>) -> Self {
        self.spec.tokens.push(Token::GlobalRef(key.into()));
        self
    }

    /// Append a path relative to the output directory
    pub fn path(mut self, relative: impl Into<String>) -> Self {
        self.spec.tokens.push(Token::PathTemplate(relative.into()));
        self
    }

    /// Append raw tokens, classifying each against `known_keys`
    pub fn infer<'a>(
        mut self,
        raw_tokens: impl IntoIterator<Item = &'a str>,
        known_keys: &[&str],
    ) -> Self {
        self.spec
            .tokens
            .extend(raw_tokens.into_iter().map(|raw| Token::infer(raw, known_keys)));
        self
    }

    /// Place the script in a folder below the stage's script directory
    pub fn subfolder(mut self, folder: impl Into<String>) -> Self {
        self.spec.subfolder = Some(folder.into());
        self
    }

    pub fn build(self) -> ScriptSpec {
        self.spec
    }
}

impl ScriptSpec {
    pub fn builder(name: impl Into<String>, interpreter: Interpreter) -> ScriptSpecBuilder {
        ScriptSpecBuilder::new(name, interpreter)
    }

    /// Start an R script
    pub fn rscript(name: impl Into<String>) -> ScriptSpecBuilder {
        ScriptSpecBuilder::new(name, Interpreter::Rscript)
    }

    /// Start a Python script
    pub fn python(name: impl Into<String>) -> ScriptSpecBuilder {
        ScriptSpecBuilder::new(name, Interpreter::Python)
    }
}

/// Builder for one stage
#[derive(Debug, Clone)]
pub struct StageBuilder {
    stage: Stage,
}

impl StageBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            stage: Stage {
                name: name.into(),
                scripts: Vec::new(),
            },
        }
    }

    /// Append a script; scripts run in the order they are added
    pub fn script(mut self, script: ScriptSpecBuilder) -> Self {
        self.stage.scripts.push(script.build());
        self
    }
}

/// Builder for the whole topology
#[derive(Debug, Clone, Default)]
pub struct TopologyBuilder {
    stages: Vec<Stage>,
}

impl TopologyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage; stages run in the order they are added
    pub fn stage(
        mut self,
        name: impl Into<String>,
        build: impl FnOnce(StageBuilder) -> StageBuilder,
    ) -> Self {
        self.stages.push(build(StageBuilder::new(name)).stage);
        self
    }

    pub fn build(self) -> PipelineTopology {
        PipelineTopology {
            stages: self.stages,
        }
    }
}

impl PipelineTopology {
    pub fn builder() -> TopologyBuilder {
        TopologyBuilder::new()
    }
}
