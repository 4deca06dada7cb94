// Terminal output for pipeline progress
// Progress and diagnostics go to stderr; streamed script output and plans go to stdout

use std::time::Duration;

use virallink_service::PipelineError;

const BOLD: &str = "1";
const BOLD_BLUE: &str = "1;34";
const BOLD_CYAN: &str = "1;36";
const BOLD_GREEN: &str = "1;32";
const BOLD_RED: &str = "1;31";
const DIM: &str = "2";
const GREEN: &str = "32";
const RED: &str = "31";
const YELLOW: &str = "33";

fn paint(style: &str, text: &str) -> String {
    format!("\x1b[{}m{}\x1b[0m", style, text)
}

/// Current wall-clock time as `HH:MM:SS`
pub fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// Seconds with two decimals, e.g. `12.34s`
fn elapsed(duration: Duration) -> String {
    format!("{:.2}s", duration.as_secs_f64())
}

/// Suffix naming a non-zero exit code; empty for 0 or a signal
fn exit_note(exit_code: Option<i32>) -> String {
    match exit_code {
        Some(code) if code != 0 => format!(" (exit code: {})", code),
        _ => String::new(),
    }
}

/// Run title: "==> ViralLink pipeline"
pub fn banner(title: &str) {
    eprintln!("{}", paint(BOLD, &format!("==> {}", title)));
}

/// Right-aligned action word followed by a message
pub fn status(action: &str, message: &str) {
    eprintln!("{} {}", paint(BOLD_CYAN, &format!("{:>12}", action)), message);
}

/// A passed check
pub fn check(message: &str) {
    eprintln!("{} {}", paint(GREEN, "  \u{2713}"), message);
}

/// A problem found by a check, listed under a heading
pub fn problem(heading: &str, items: &[String]) {
    eprintln!("{} {}", paint(BOLD_RED, "  \u{2717}"), heading);
    for item in items {
        eprintln!("{}", paint(RED, &format!("      - {}", item)));
    }
}

/// Something worth noticing that does not stop the run
pub fn warning(message: &str) {
    eprintln!("{} {}", paint(YELLOW, "  !"), message);
}

/// Fatal pipeline error with the exit code the process is about to return
pub fn fatal(err: &PipelineError) {
    eprintln!(
        "{} {} {}",
        paint(BOLD_RED, "WARNING:"),
        err,
        paint(DIM, &format!("[exit {}]", err.exit_code()))
    );
}

/// Stage header: "Step 3/6 - NETWORK DIFFUSION"
pub fn stage_header(number: &str, total: usize, label: &str) {
    eprintln!(
        "\n{} - {}",
        paint(BOLD_BLUE, &format!("  Step {}/{}", number, total)),
        label
    );
}

/// Stage footer with its wall time
pub fn stage_done(stage_name: &str, duration: Duration) {
    eprintln!(
        "{}",
        paint(DIM, &format!("  Stage '{}' OK ({})", stage_name, elapsed(duration)))
    );
}

/// "[14:02:11] tiedie.py is running..."
pub fn script_running(script: &str) {
    eprintln!("    [{}] {} is running...", timestamp(), script);
}

pub fn script_finished(script: &str, duration: Duration, exit_code: Option<i32>) {
    eprintln!(
        "{} [{}] {} finished successfully ({}){}",
        paint(BOLD_GREEN, "  \u{2713}"),
        timestamp(),
        script,
        elapsed(duration),
        exit_note(exit_code)
    );
}

pub fn script_failed(script: &str, duration: Duration, exit_code: Option<i32>) {
    eprintln!(
        "{} [{}] {} failed ({}){}",
        paint(BOLD_RED, "  \u{2717}"),
        timestamp(),
        script,
        elapsed(duration),
        exit_note(exit_code)
    );
}

/// One line of script output, echoed with `--stream`
pub fn script_line(line: &str, is_error: bool) {
    if is_error {
        eprintln!("{}", paint(RED, &format!("        | {}", line)));
    } else {
        println!("        | {}", line);
    }
}

/// Final line of a run
pub fn run_summary(success: bool, duration: Duration) {
    eprintln!();
    if success {
        eprintln!(
            "{} ViralLink pipeline was successfully finished in {}",
            paint(BOLD_GREEN, "  \u{2713}"),
            elapsed(duration)
        );
    } else {
        eprintln!(
            "{} ViralLink pipeline failed after {}",
            paint(BOLD_RED, "  \u{2717}"),
            elapsed(duration)
        );
    }
}

/// A resolved command in a printed plan
pub fn plan_line(command: &str) {
    println!("    {}", command);
}
