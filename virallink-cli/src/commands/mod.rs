pub mod check;
pub mod plan;
pub mod run;

use crate::output;

use std::path::PathBuf;

use clap::Args;
use color_eyre::Result;

use virallink_service::{
    InterpreterPaths, ParameterFormat, ParameterStore, PipelineError, PipelineResult, RunConfig,
};

/// Default parameter file, looked up in the working directory
const DEFAULT_PARAMS_FILE: &str = "parameters.yml";

/// Exit code for invalid command-line usage
pub const USAGE_EXIT_CODE: i32 = 8;

/// Exit code for failures outside the pipeline itself (runtime, task join)
pub const INTERNAL_EXIT_CODE: i32 = 9;

/// Options shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    /// Parameter file (default: parameters.yml in the working directory)
    #[arg(long, short = 'p', value_name = "FILE")]
    pub params: Option<PathBuf>,

    /// Parameter file format: key-value or tabular (default: from the file extension)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<ParameterFormat>,

    /// Reject parameter files that define the same key twice
    #[arg(long)]
    pub strict_params: bool,

    /// Working directory scripts are launched from
    #[arg(long, short = 'w', value_name = "DIR")]
    pub working_dir: Option<PathBuf>,

    /// Root of the per-stage script folders
    #[arg(long, value_name = "DIR", default_value = virallink_service::config::DEFAULT_SCRIPTS_DIR)]
    pub scripts_dir: PathBuf,

    /// Execution log capturing every script's output
    #[arg(long, value_name = "FILE", default_value = virallink_service::config::DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Executable used for R scripts
    #[arg(long, value_name = "PROGRAM", default_value = "Rscript")]
    pub rscript: String,

    /// Executable used for Python scripts
    #[arg(long, value_name = "PROGRAM", default_value = "python3")]
    pub python: String,
}

impl PipelineArgs {
    /// Build the run configuration from the command-line options
    pub fn config(&self) -> Result<RunConfig> {
        let working_dir = match &self.working_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };

        Ok(RunConfig::new(working_dir)
            .with_scripts_dir(self.scripts_dir.clone())
            .with_log_file(self.log_file.clone())
            .with_interpreters(InterpreterPaths {
                rscript: self.rscript.clone(),
                python: self.python.clone(),
            }))
    }

    /// Parameter file location, relative paths anchored at the working directory
    pub fn params_path(&self, config: &RunConfig) -> PathBuf {
        let path = self
            .params
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PARAMS_FILE));
        config.resolve_path(&path)
    }

    /// Load the global parameter store
    pub fn try_load_params(&self, config: &RunConfig) -> PipelineResult<ParameterStore> {
        let path = self.params_path(config);
        let format = self
            .format
            .unwrap_or_else(|| ParameterFormat::from_path(&path));
        tracing::debug!(explicit = self.format.is_some(), %format, "parameter file format");

        output::status("Loading", &format!("{} ({})", path.display(), format));
        ParameterStore::load(&path, format, self.strict_params)
    }

    /// Load the global parameter store, exiting with the matching code on failure
    pub fn load_params(&self, config: &RunConfig) -> ParameterStore {
        match self.try_load_params(config) {
            Ok(params) => params,
            Err(e) => exit_with(&e),
        }
    }
}

/// Report a pipeline error and terminate with its exit code
pub fn exit_with(err: &PipelineError) -> ! {
    output::fatal(err);
    std::process::exit(err.exit_code());
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        pipeline: PipelineArgs,
    }

    #[test]
    fn test_defaults() {
        let cli = TestCli::parse_from(["virallink", "--working-dir", "/work"]);
        let config = cli.pipeline.config().unwrap();

        assert_eq!(config.working_dir, PathBuf::from("/work"));
        assert_eq!(config.log_path(), PathBuf::from("/work/virallink.out"));
        assert_eq!(config.interpreters, InterpreterPaths::default());
        assert_eq!(
            cli.pipeline.params_path(&config),
            PathBuf::from("/work/parameters.yml")
        );
        assert!(!cli.pipeline.strict_params);
    }

    #[test]
    fn test_overrides() {
        let cli = TestCli::parse_from([
            "virallink",
            "--params",
            "custom.tsv",
            "--format",
            "tabular",
            "--strict-params",
            "--rscript",
            "/opt/R/bin/Rscript",
            "--log-file",
            "run.log",
            "--working-dir",
            "/work",
        ]);

        assert_eq!(cli.pipeline.format, Some(ParameterFormat::Tabular));
        assert!(cli.pipeline.strict_params);

        let config = cli.pipeline.config().unwrap();
        assert_eq!(config.interpreters.rscript, "/opt/R/bin/Rscript");
        assert_eq!(config.log_file, PathBuf::from("run.log"));
        assert_eq!(
            cli.pipeline.params_path(&config),
            PathBuf::from("/work/custom.tsv")
        );
    }

    #[test]
    fn test_absolute_params_path_kept() {
        let cli = TestCli::parse_from([
            "virallink",
            "--working-dir",
            "/work",
            "--params",
            "/etc/virallink/parameters.yml",
        ]);
        let config = cli.pipeline.config().unwrap();
        assert_eq!(
            cli.pipeline.params_path(&config),
            PathBuf::from("/etc/virallink/parameters.yml")
        );
    }

    #[test]
    fn test_loads_default_params_from_working_dir() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(
            temp.path().join("parameters.yml"),
            "outdir: results\ncounts: data/counts.txt\n",
        )
        .unwrap();

        let dir = temp.path().to_string_lossy().to_string();
        let cli = TestCli::parse_from(["virallink", "--working-dir", dir.as_str()]);
        let config = cli.pipeline.config().unwrap();
        let params = cli.pipeline.try_load_params(&config).unwrap();

        assert_eq!(params.get("outdir"), Some("results"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_relative_tabular_params_from_working_dir() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(
            temp.path().join("custom.tsv"),
            "stage\tscript\tparameter\tvalue\n1_x\ta.R\toutdir\tresults\n",
        )
        .unwrap();

        let dir = temp.path().to_string_lossy().to_string();
        let cli = TestCli::parse_from([
            "virallink",
            "--working-dir",
            dir.as_str(),
            "--params",
            "custom.tsv",
        ]);
        let config = cli.pipeline.config().unwrap();
        let params = cli.pipeline.try_load_params(&config).unwrap();

        assert_eq!(params.get("outdir"), Some("results"));
    }

    #[test]
    fn test_missing_params_file() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().to_string_lossy().to_string();
        let cli = TestCli::parse_from(["virallink", "--working-dir", dir.as_str()]);
        let config = cli.pipeline.config().unwrap();

        let err = cli.pipeline.try_load_params(&config).unwrap_err();
        assert!(matches!(err, PipelineError::MissingConfigFile(_)));
    }

    #[test]
    fn test_cli_exit_codes_distinct_from_pipeline_codes() {
        let pipeline_codes: Vec<i32> = [
            PipelineError::MissingConfigFile(PathBuf::new()),
            PipelineError::MissingRequiredParameter(String::new()),
            PipelineError::MissingInputFile(String::new()),
            PipelineError::ScriptExecutionFailure {
                script: String::new(),
                log_path: PathBuf::new(),
            },
            PipelineError::MalformedParameterRecord {
                line: 1,
                content: String::new(),
            },
            PipelineError::ScriptLaunchFailure {
                script: String::new(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "x"),
            },
            PipelineError::Io(std::io::Error::new(std::io::ErrorKind::Other, "x")),
        ]
        .iter()
        .map(PipelineError::exit_code)
        .collect();

        for code in [USAGE_EXIT_CODE, INTERNAL_EXIT_CODE] {
            assert!(!pipeline_codes.contains(&code), "{} collides", code);
        }
        assert_ne!(USAGE_EXIT_CODE, INTERNAL_EXIT_CODE);
    }

    #[test]
    fn test_rejects_unknown_format() {
        let result = TestCli::try_parse_from(["virallink", "--format", "xml"]);
        assert!(result.is_err());
    }
}
