// Pipeline Driver
// Walks the topology in order: resolve, validate, run, and stop at the first failure

use crate::config::RunConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::execution::events::{EventSender, ExecutionEvent, ProgressSender};
use crate::params::ParameterStore;
use crate::resolve::{ParameterResolver, ResolvedCommand};
use crate::runners::{ExecutionLog, OutputCallback, ProcessRunner, StepRunner, StepStatus};
use crate::topology::{PipelineTopology, MANDATORY_PARAMETERS};
use crate::validation::{PreflightReport, ValidationGate};

use serde::Serialize;

use std::time::{Duration, Instant};

/// Totals for a run that finished without failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub stages_completed: usize,
    pub scripts_completed: usize,
    pub duration: Duration,
}

/// One resolved script, produced without executing anything
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedScript {
    pub stage: String,
    pub script: String,
    pub command: ResolvedCommand,
    /// Always `Pending`: planning never launches anything
    pub status: StepStatus,
}

/// Sequential, fail-fast pipeline driver
pub struct PipelineDriver {
    config: RunConfig,
    resolver: ParameterResolver,
    gate: ValidationGate,
    runner: Box<dyn StepRunner>,
    required: Vec<String>,
    events: EventSender,
}

impl PipelineDriver {
    /// Create a driver launching real processes
    pub fn new(config: RunConfig) -> Self {
        let resolver =
            ParameterResolver::new(config.scripts_dir.clone(), config.interpreters.clone());
        let gate = ValidationGate::new(config.working_dir.clone());
        let runner = Box::new(ProcessRunner::new(config.working_dir.clone()));

        Self {
            config,
            resolver,
            gate,
            runner,
            required: MANDATORY_PARAMETERS.iter().map(|k| k.to_string()).collect(),
            events: EventSender::default(),
        }
    }

    /// Replace the step runner
    pub fn with_runner(mut self, runner: impl StepRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    /// Replace the list of parameters that must be present before the run
    pub fn with_required_parameters(mut self, keys: &[&str]) -> Self {
        self.required = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    /// Set progress event sender
    pub fn with_progress(mut self, tx: ProgressSender) -> Self {
        self.events = EventSender::new(Some(tx));
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run every script of every stage in order.
    ///
    /// The execution log is reset first. The first missing parameter, missing
    /// input or failed script aborts the run; outputs already written are kept.
    pub async fn run(
        &self,
        topology: &PipelineTopology,
        params: &ParameterStore,
    ) -> PipelineResult<RunSummary> {
        let start = Instant::now();
        let result = self.run_stages(topology, params, start).await;

        match &result {
            Ok(summary) => {
                tracing::info!(
                    stages = summary.stages_completed,
                    scripts = summary.scripts_completed,
                    "pipeline finished successfully"
                );
                self.events.send(ExecutionEvent::PipelineCompleted {
                    success: true,
                    duration: summary.duration,
                });
            }
            Err(e) => {
                tracing::error!(error = %e, "pipeline aborted");
                self.events.send(ExecutionEvent::Error {
                    message: e.to_string(),
                    exit_code: e.exit_code(),
                });
                self.events.send(ExecutionEvent::PipelineCompleted {
                    success: false,
                    duration: start.elapsed(),
                });
            }
        }

        result
    }

    async fn run_stages(
        &self,
        topology: &PipelineTopology,
        params: &ParameterStore,
        start: Instant,
    ) -> PipelineResult<RunSummary> {
        let log = ExecutionLog::new(self.config.log_path());
        log.reset()?;

        let required: Vec<&str> = self.required.iter().map(String::as_str).collect();
        self.gate.check_parameters(params, &required)?;

        let total_stages = topology.stages().len();
        self.events.send(ExecutionEvent::PipelineStarted {
            total_stages,
            total_scripts: topology.total_scripts(),
        });

        let mut scripts_completed = 0;

        for stage in topology.stages() {
            let stage_start = Instant::now();
            tracing::info!(stage = stage.name(), "stage started");
            self.events.send(ExecutionEvent::StageStarted {
                stage_name: stage.name().to_string(),
                stage_number: stage.number().to_string(),
                label: stage.label(),
                total_stages,
                total_scripts: stage.scripts().len(),
            });

            for script in stage.scripts() {
                let command = self.resolver.resolve(stage, script, params)?;
                self.gate.check_command(&command)?;

                tracing::info!(stage = stage.name(), script = script.name(), "script started");
                self.events.send(ExecutionEvent::ScriptStarted {
                    stage_name: stage.name().to_string(),
                    script: script.name().to_string(),
                    command: command.to_string(),
                    status: StepStatus::Running,
                });

                let callback = self.output_callback(script.name());
                let result = self.runner.run(&command, &log, callback.as_ref()).await?;

                self.events.send(ExecutionEvent::ScriptCompleted {
                    stage_name: stage.name().to_string(),
                    script: script.name().to_string(),
                    status: result.status,
                    duration: result.duration,
                    exit_code: result.exit_code,
                });

                if result.status == StepStatus::Failed {
                    return Err(PipelineError::ScriptExecutionFailure {
                        script: script.name().to_string(),
                        log_path: log.path().to_path_buf(),
                    });
                }
                scripts_completed += 1;
            }

            self.events.send(ExecutionEvent::StageCompleted {
                stage_name: stage.name().to_string(),
                duration: stage_start.elapsed(),
            });
        }

        Ok(RunSummary {
            stages_completed: total_stages,
            scripts_completed,
            duration: start.elapsed(),
        })
    }

    /// Resolve every script without running anything
    pub fn plan(
        &self,
        topology: &PipelineTopology,
        params: &ParameterStore,
    ) -> PipelineResult<Vec<PlannedScript>> {
        let mut planned = Vec::with_capacity(topology.total_scripts());
        for stage in topology.stages() {
            for script in stage.scripts() {
                planned.push(PlannedScript {
                    stage: stage.name().to_string(),
                    script: script.name().to_string(),
                    command: self.resolver.resolve(stage, script, params)?,
                    status: StepStatus::Pending,
                });
            }
        }
        Ok(planned)
    }

    /// Validate parameters, then report every other problem detectable up front
    pub fn preflight(
        &self,
        topology: &PipelineTopology,
        params: &ParameterStore,
    ) -> PipelineResult<PreflightReport> {
        let required: Vec<&str> = self.required.iter().map(String::as_str).collect();
        self.gate.check_parameters(params, &required)?;
        Ok(self
            .gate
            .preflight(topology, params, &self.resolver, &self.config.interpreters))
    }

    fn output_callback(&self, script: &str) -> Option<OutputCallback> {
        if !self.events.is_enabled() {
            return None;
        }

        let events = self.events.clone();
        let script = script.to_string();
        Some(Box::new(move |line: &str, is_error: bool| {
            events.send(ExecutionEvent::ScriptOutput {
                script: script.clone(),
                output: line.to_string(),
                is_error,
            });
        }))
    }
}
