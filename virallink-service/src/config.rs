// Run Configuration
// Locations and interpreter programs used for one pipeline run

use crate::topology::Interpreter;

use std::path::{Path, PathBuf};

/// Default execution log file name
pub const DEFAULT_LOG_FILE: &str = "virallink.out";

/// Default root of the per-stage script folders
pub const DEFAULT_SCRIPTS_DIR: &str = "scripts";

/// Executables used to run each kind of script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterPaths {
    pub rscript: String,
    pub python: String,
}

impl InterpreterPaths {
    pub fn program(&self, interpreter: Interpreter) -> &str {
        match interpreter {
            Interpreter::Rscript => &self.rscript,
            Interpreter::Python => &self.python,
        }
    }
}

impl Default for InterpreterPaths {
    fn default() -> Self {
        Self {
            rscript: Interpreter::Rscript.default_program().to_string(),
            python: Interpreter::Python.default_program().to_string(),
        }
    }
}

/// Configuration for a pipeline run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory scripts are launched from; relative paths resolve against it
    pub working_dir: PathBuf,
    /// Root holding one folder of scripts per stage
    pub scripts_dir: PathBuf,
    /// Execution log capturing every script's output
    pub log_file: PathBuf,
    /// Interpreter executables
    pub interpreters: InterpreterPaths,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            working_dir: PathBuf::from("."),
            scripts_dir: PathBuf::from(DEFAULT_SCRIPTS_DIR),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            interpreters: InterpreterPaths::default(),
        }
    }
}

impl RunConfig {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_scripts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scripts_dir = dir.into();
        self
    }

    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = path.into();
        self
    }

    pub fn with_interpreters(mut self, interpreters: InterpreterPaths) -> Self {
        self.interpreters = interpreters;
        self
    }

    /// Execution log location, resolved against the working directory
    pub fn log_path(&self) -> PathBuf {
        self.resolve_path(&self.log_file)
    }

    /// Resolve a possibly relative path against the working directory
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }
}
