use crate::commands::{exit_with, PipelineArgs};
use crate::output;

use clap::Args;
use color_eyre::Result;

use virallink_service::execution::events::progress_channel;
use virallink_service::{virallink_topology, ExecutionEvent, PipelineDriver, StepStatus};

/// Run the ViralLink pipeline
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Echo script output to the terminal as well as the log
    #[arg(long)]
    pub stream: bool,
}

pub async fn execute(args: RunArgs) -> Result<()> {
    let config = args.pipeline.config()?;
    let params = args.pipeline.load_params(&config);
    let topology = virallink_topology();
    let log_path = config.log_path();

    output::banner("ViralLink pipeline");
    output::status(
        "Pipeline",
        &format!(
            "{} stages, {} scripts, log: {}",
            topology.stages().len(),
            topology.total_scripts(),
            log_path.display()
        ),
    );
    output::status("Checking", "input parameters...");

    let (tx, mut rx) = progress_channel();
    let driver = PipelineDriver::new(config).with_progress(tx);

    // Spawn execution in background
    let exec_handle = tokio::spawn(async move { driver.run(&topology, &params).await });

    // Process events in the foreground
    while let Some(event) = rx.recv().await {
        match &event {
            ExecutionEvent::PipelineStarted { .. } => {
                output::check("Input parameters are fine, starting...");
            }

            ExecutionEvent::StageStarted {
                stage_number,
                label,
                total_stages,
                ..
            } => output::stage_header(stage_number, *total_stages, label),

            ExecutionEvent::StageCompleted {
                stage_name,
                duration,
            } => output::stage_done(stage_name, *duration),

            ExecutionEvent::ScriptStarted { script, .. } => output::script_running(script),

            ExecutionEvent::ScriptOutput {
                output: line,
                is_error,
                ..
            } => {
                if args.stream {
                    output::script_line(line, *is_error);
                }
            }

            ExecutionEvent::ScriptCompleted {
                script,
                status,
                duration,
                exit_code,
                ..
            } => {
                if *status == StepStatus::Failed {
                    output::script_failed(script, *duration, *exit_code);
                } else {
                    output::script_finished(script, *duration, *exit_code);
                }
            }

            ExecutionEvent::PipelineCompleted { success, duration } => {
                output::run_summary(*success, *duration);
            }

            // Reported once the driver returns, with its exit code
            ExecutionEvent::Error { .. } => {}
        }
    }

    match exec_handle.await? {
        Ok(_) => Ok(()),
        Err(e) => exit_with(&e),
    }
}
