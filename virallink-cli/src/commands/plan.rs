use crate::commands::{exit_with, PipelineArgs};
use crate::output;

use clap::Args;
use color_eyre::Result;

use virallink_service::{virallink_topology, PipelineDriver};

/// Print the resolved command of every script, in execution order
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: PlanArgs) -> Result<()> {
    let config = args.pipeline.config()?;
    let params = args.pipeline.load_params(&config);
    let topology = virallink_topology();
    let driver = PipelineDriver::new(config);

    let planned = match driver.plan(&topology, &params) {
        Ok(planned) => planned,
        Err(e) => exit_with(&e),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&planned)?);
        return Ok(());
    }

    let total_stages = topology.stages().len();
    for stage in topology.stages() {
        output::stage_header(stage.number(), total_stages, &stage.label());
        for entry in planned.iter().filter(|p| p.stage == stage.name()) {
            output::plan_line(&entry.command.to_string());
        }
    }

    eprintln!();
    output::status("Resolved", &format!("{} scripts", planned.len()));

    Ok(())
}
