mod commands;
mod logging;
mod output;

use clap::{Parser, Subcommand};
use color_eyre::Result;

use commands::check::CheckArgs;
use commands::plan::PlanArgs;
use commands::run::RunArgs;

#[derive(Parser)]
#[command(
    name = "virallink",
    version,
    about = "Run the ViralLink virus-host network analysis pipeline"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all six stages in order
    Run(RunArgs),
    /// Check parameters, inputs, scripts and interpreters without running anything
    Check(CheckArgs),
    /// Print every resolved command without running anything
    Plan(PlanArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // clap exits with 2 on bad usage, which is MissingRequiredParameter's code
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(if e.use_stderr() {
                commands::USAGE_EXIT_CODE
            } else {
                0
            });
        }
    };

    if let Err(report) = execute(cli).await {
        eprintln!("Error: {:?}", report);
        std::process::exit(commands::INTERNAL_EXIT_CODE);
    }
}

async fn execute(cli: Cli) -> Result<()> {
    color_eyre::install()?;

    logging::init(&cli.log_level);

    match cli.command {
        Commands::Run(args) => commands::run::execute(args).await,
        Commands::Check(args) => commands::check::execute(args),
        Commands::Plan(args) => commands::plan::execute(args),
    }
}
