// 📝 Logging - tracing subscriber for the command-line binary

use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when RUST_LOG is not set
pub fn default_filter(log_level: &str) -> String {
    format!("wage_atlas={log_level}")
}

/// Initialize the global subscriber once; diagnostics go to stderr so
/// command output on stdout stays machine-readable.
pub fn init_tracing(log_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(log_level)));

    let _ = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .try_init();
}
