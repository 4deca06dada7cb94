// Validation Gate
// Fail-fast checks before the run starts and before each script is launched

use crate::config::InterpreterPaths;
use crate::error::{PipelineError, PipelineResult};
use crate::params::ParameterStore;
use crate::resolve::{ParameterResolver, ResolvedCommand};
use crate::topology::{Interpreter, PipelineTopology, TIEDIE_SENTINEL};

use std::path::{Path, PathBuf};

/// Extensions of script files, which are never treated as input paths
pub const SCRIPT_EXTENSIONS: &[&str] = &[".R", ".py"];

/// True if `arg` looks like a filesystem path that must already exist
pub fn is_path_like(arg: &str) -> bool {
    arg.contains('/') && !SCRIPT_EXTENSIONS.iter().any(|ext| arg.ends_with(ext))
}

/// Checks parameters and input files
#[derive(Debug, Clone)]
pub struct ValidationGate {
    base_dir: PathBuf,
    sentinels: Vec<String>,
}

impl ValidationGate {
    /// Create a gate resolving relative paths against `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            sentinels: vec![TIEDIE_SENTINEL.to_string()],
        }
    }

    /// Exempt arguments whose last path component is `name`
    pub fn with_sentinel(mut self, name: impl Into<String>) -> Self {
        self.sentinels.push(name.into());
        self
    }

    /// Pre-run check: every required parameter is present
    pub fn check_parameters(
        &self,
        params: &ParameterStore,
        required: &[&str],
    ) -> PipelineResult<()> {
        params.validate_mandatory(required)
    }

    /// Pre-invocation check: every path-like argument exists on disk
    pub fn check_command(&self, command: &ResolvedCommand) -> PipelineResult<()> {
        for arg in command.argv() {
            if self.is_sentinel(arg) {
                tracing::debug!(script = %command.script, arg, "skipping sentinel path");
                continue;
            }

            if is_path_like(arg) && !self.resolve(arg).exists() {
                return Err(PipelineError::MissingInputFile(arg.to_string()));
            }
        }
        Ok(())
    }

    /// True if the argument's last `/` component is a sentinel
    pub fn is_sentinel(&self, arg: &str) -> bool {
        arg.rsplit('/')
            .next()
            .map(|last| self.sentinels.iter().any(|s| s == last))
            .unwrap_or(false)
    }

    /// Collect every problem that can be detected without running anything
    pub fn preflight(
        &self,
        topology: &PipelineTopology,
        params: &ParameterStore,
        resolver: &ParameterResolver,
        interpreters: &InterpreterPaths,
    ) -> PreflightReport {
        let mut report = PreflightReport::default();

        for key in topology.referenced_keys() {
            if let Some(value) = params.get(key) {
                if is_path_like(value)
                    && !self.is_sentinel(value)
                    && !self.resolve(value).exists()
                {
                    report.missing_inputs.push(format!("{} = {}", key, value));
                }
            }
        }

        for stage in topology.stages() {
            for script in stage.scripts() {
                let path = resolver.script_path(stage, script);
                if !self.resolve(&path.to_string_lossy()).is_file() {
                    report
                        .missing_scripts
                        .push(path.to_string_lossy().into_owned());
                }
            }
        }

        for interpreter in [Interpreter::Rscript, Interpreter::Python] {
            let program = interpreters.program(interpreter);
            let in_use = topology
                .stages()
                .iter()
                .flat_map(|stage| stage.scripts())
                .any(|script| script.interpreter() == interpreter);
            if in_use && which::which(program).is_err() {
                report.missing_interpreters.push(program.to_string());
            }
        }

        report
    }

    fn resolve(&self, arg: &str) -> PathBuf {
        let path = Path::new(arg);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

/// Problems found by a preflight check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreflightReport {
    /// User-supplied input paths (`key = value`) that do not exist
    pub missing_inputs: Vec<String>,
    /// Script files that do not exist
    pub missing_scripts: Vec<String>,
    /// Interpreter programs not found on PATH
    pub missing_interpreters: Vec<String>,
}

impl PreflightReport {
    pub fn is_clean(&self) -> bool {
        self.missing_inputs.is_empty()
            && self.missing_scripts.is_empty()
            && self.missing_interpreters.is_empty()
    }

    /// Exit code matching the most serious problem found, 0 when clean
    pub fn exit_code(&self) -> i32 {
        if !self.missing_inputs.is_empty() || !self.missing_scripts.is_empty() {
            3
        } else if !self.missing_interpreters.is_empty() {
            6
        } else {
            0
        }
    }
}
