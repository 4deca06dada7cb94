// Pipeline Errors
// Every failure is fatal to the run; each variant maps to a distinct exit code

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors that abort a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("There is no appropriate parameter file: {}", .0.display())]
    MissingConfigFile(PathBuf),

    #[error("A parameter is missing from the parameter file: {0}")]
    MissingRequiredParameter(String),

    #[error("One of the parameters of the script does not exist: {0}")]
    MissingInputFile(String),

    #[error(
        "There was an error while running {script}. Please check '{}' for more details.",
        log_path.display()
    )]
    ScriptExecutionFailure { script: String, log_path: PathBuf },

    #[error("Malformed record on line {line} of the parameter file: {content:?}")]
    MalformedParameterRecord { line: usize, content: String },

    #[error("Duplicate parameter '{key}' on line {line} of the parameter file")]
    DuplicateParameter { key: String, line: usize },

    #[error("Failed to launch {script}: {source}")]
    ScriptLaunchFailure {
        script: String,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl PipelineError {
    /// Process exit code for this failure class
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::MissingConfigFile(_) => 1,
            PipelineError::MissingRequiredParameter(_) => 2,
            PipelineError::MissingInputFile(_) => 3,
            PipelineError::ScriptExecutionFailure { .. } => 4,
            PipelineError::MalformedParameterRecord { .. }
            | PipelineError::DuplicateParameter { .. } => 5,
            PipelineError::ScriptLaunchFailure { .. } => 6,
            PipelineError::Io(_) => 7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let errors = [
            PipelineError::MissingConfigFile(PathBuf::from("parameters.yml")),
            PipelineError::MissingRequiredParameter("lfccutoff".to_string()),
            PipelineError::MissingInputFile("/out/2_y/missing.txt".to_string()),
            PipelineError::ScriptExecutionFailure {
                script: "tiedie.py".to_string(),
                log_path: PathBuf::from("virallink.out"),
            },
            PipelineError::MalformedParameterRecord {
                line: 3,
                content: "oops".to_string(),
            },
            PipelineError::ScriptLaunchFailure {
                script: "a.R".to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "no Rscript"),
            },
            PipelineError::Io(io::Error::new(io::ErrorKind::Other, "disk full")),
        ];

        let mut codes: Vec<i32> = errors.iter().map(|e| e.exit_code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert!(!codes.contains(&0));
    }

    #[test]
    fn test_messages_name_the_offender() {
        let err = PipelineError::MissingRequiredParameter("lfccutoff".to_string());
        assert!(err.to_string().contains("lfccutoff"));

        let err = PipelineError::MissingInputFile("/out/2_y/missing.txt".to_string());
        assert!(err.to_string().contains("/out/2_y/missing.txt"));

        let err = PipelineError::ScriptExecutionFailure {
            script: "combined_edge_node_tables.R".to_string(),
            log_path: PathBuf::from("virallink.out"),
        };
        let msg = err.to_string();
        assert!(msg.contains("combined_edge_node_tables.R"));
        assert!(msg.contains("virallink.out"));
    }
}
