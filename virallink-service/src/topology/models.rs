// Topology Models
// Stages, scripts and the parameter tokens each script is invoked with

use serde::Serialize;

use std::fmt;

/// Tokens shorter than this many characters are treated as literal CLI flags
/// when a raw token list is classified
pub const LITERAL_FLAG_MAX_LEN: usize = 4;

/// External runtime a script is executed with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpreter {
    /// R scripts (`.R`), run with `Rscript`
    Rscript,
    /// Python scripts (`.py`), run with `python3`
    Python,
}

impl Interpreter {
    /// Pick the interpreter from a script's file extension
    pub fn from_script_name(name: &str) -> Option<Self> {
        if name.ends_with(".R") {
            Some(Interpreter::Rscript)
        } else if name.ends_with(".py") {
            Some(Interpreter::Python)
        } else {
            None
        }
    }

    /// Default executable name
    pub fn default_program(&self) -> &'static str {
        match self {
            Interpreter::Rscript => "Rscript",
            Interpreter::Python => "python3",
        }
    }
}

impl fmt::Display for Interpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_program())
    }
}

/// An unresolved parameter template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Short switch passed through unchanged (`-i`, `-o`, ...)
    Literal(String),
    /// Name of a global parameter whose value is substituted
    GlobalRef(String),
    /// Path relative to the run's output directory
    PathTemplate(String),
}

impl Token {
    /// Classify a raw token string.
    ///
    /// A token naming one of `known_keys` is always a global reference, even
    /// when it is short enough to look like a flag. Otherwise short tokens are
    /// literals and everything else is anchored under the output directory.
    pub fn infer(raw: &str, known_keys: &[&str]) -> Self {
        if known_keys.contains(&raw) {
            Token::GlobalRef(raw.to_string())
        } else if raw.chars().count() < LITERAL_FLAG_MAX_LEN {
            Token::Literal(raw.to_string())
        } else {
            Token::PathTemplate(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Token::Literal(s) | Token::GlobalRef(s) | Token::PathTemplate(s) => s,
        }
    }
}

/// Compiled description of one script invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSpec {
    pub(crate) name: String,
    pub(crate) interpreter: Interpreter,
    pub(crate) tokens: Vec<Token>,
    pub(crate) subfolder: Option<String>,
}

impl ScriptSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interpreter(&self) -> Interpreter {
        self.interpreter
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Folder inside the stage's script directory the script lives in, if not the stage root
    pub fn subfolder(&self) -> Option<&str> {
        self.subfolder.as_deref()
    }

    /// Global parameter names referenced by this script
    pub fn global_keys(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|token| match token {
            Token::GlobalRef(key) => Some(key.as_str()),
            _ => None,
        })
    }
}

/// One phase of the pipeline: an ordered group of scripts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub(crate) name: String,
    pub(crate) scripts: Vec<ScriptSpec>,
}

impl Stage {
    /// Directory-style name, e.g. `3_network_diffusion`
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scripts(&self) -> &[ScriptSpec] {
        &self.scripts
    }

    /// Leading number of the stage name (`3` for `3_network_diffusion`)
    pub fn number(&self) -> &str {
        self.name.split('_').next().unwrap_or_default()
    }

    /// Human label built from the rest of the name (`NETWORK DIFFUSION`)
    pub fn label(&self) -> String {
        self.name
            .split('_')
            .skip(1)
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase()
    }
}

/// Ordered, immutable description of every stage of the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PipelineTopology {
    pub(crate) stages: Vec<Stage>,
}

impl PipelineTopology {
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn total_scripts(&self) -> usize {
        self.stages.iter().map(|stage| stage.scripts.len()).sum()
    }

    /// Every global parameter name referenced by any script, in first-use order
    pub fn referenced_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for script in self.stages.iter().flat_map(|stage| &stage.scripts) {
            for key in script.global_keys() {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }
        keys
    }

    /// Look up a script and the stage it belongs to
    pub fn find_script(&self, name: &str) -> Option<(&Stage, &ScriptSpec)> {
        self.stages.iter().find_map(|stage| {
            stage
                .scripts
                .iter()
                .find(|script| script.name == name)
                .map(|script| (stage, script))
        })
    }
}
