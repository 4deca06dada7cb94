// Diagnostic logging
// tracing output shares stderr with the progress lines and carries no timestamps of its own

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

/// Pipeline crates log at `level`; dependencies stay at warn.
fn default_directives(level: &str) -> String {
    format!("warn,virallink={level},virallink_service={level}")
}

/// Install the subscriber. `RUST_LOG`, when set, replaces `--log-level` entirely.
pub fn init(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_scope_pipeline_crates() {
        assert_eq!(
            default_directives("debug"),
            "warn,virallink=debug,virallink_service=debug"
        );
    }
}
