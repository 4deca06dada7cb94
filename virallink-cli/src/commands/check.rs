use crate::commands::{exit_with, PipelineArgs};
use crate::output;

use clap::Args;
use color_eyre::Result;

use virallink_service::{virallink_topology, PipelineDriver};

/// Check a parameter file against the pipeline without running any script
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

pub fn execute(args: CheckArgs) -> Result<()> {
    let config = args.pipeline.config()?;
    let params = args.pipeline.load_params(&config);
    output::check(&format!("{} parameters loaded", params.len()));

    let topology = virallink_topology();
    let driver = PipelineDriver::new(config);

    output::status("Checking", "mandatory parameters...");
    let report = match driver.preflight(&topology, &params) {
        Ok(report) => report,
        Err(e) => exit_with(&e),
    };
    output::check("Mandatory parameters present");

    if report.missing_inputs.is_empty() {
        output::check("Input files found");
    } else {
        output::problem(
            &format!("{} missing input(s):", report.missing_inputs.len()),
            &report.missing_inputs,
        );
    }

    if report.missing_scripts.is_empty() {
        output::check(&format!("{} scripts found", topology.total_scripts()));
    } else {
        output::problem(
            &format!("{} missing script(s):", report.missing_scripts.len()),
            &report.missing_scripts,
        );
    }

    if report.missing_interpreters.is_empty() {
        output::check("Interpreters found");
    } else {
        for program in &report.missing_interpreters {
            output::warning(&format!("Interpreter not found on PATH: {}", program));
        }
    }

    if !report.is_clean() {
        std::process::exit(report.exit_code());
    }

    output::check("Pipeline is ready to run");

    Ok(())
}
