/// Logging configuration.
///
/// Logs go to stderr so the snapshot written to stdout stays clean. With a
/// log directory, they are appended to `wikistats.log` there instead, one
/// separator line per run.
use anyhow::{Context, Result};
use std::path::Path;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FILE_NAME: &str = "wikistats.log";

/// Initializes the global tracing subscriber.
///
/// Default level is INFO, overridable via RUST_LOG. Calling this more than
/// once is harmless; later calls keep the first subscriber.
///
/// # Arguments
///
/// * `log_dir` - Directory for `wikistats.log`; stderr when `None`
pub fn init_logging(log_dir: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

            write_run_separator(dir);

            let file_appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
            let file_layer = fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false) // No ANSI codes in log files
                .with_target(true)
                .with_thread_ids(false)
                .with_line_number(true);

            tracing_subscriber::registry()
                .with(filter)
                .with(file_layer)
                .try_init()
                .ok(); // Ignore error if already initialized

            tracing::info!("Logging to {}", dir.join(LOG_FILE_NAME).display());
        }
        None => {
            let stderr_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false);

            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .try_init()
                .ok();
        }
    }

    Ok(())
}

fn write_run_separator(dir: &Path) {
    use std::io::Write;

    let separator = format!(
        "\n{sep}\n[{ts}] New wikistats run\n{sep}\n",
        sep = "=".repeat(80),
        ts = chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
    );

    if let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE_NAME))
    {
        let _ = writeln!(file, "{}", separator);
    }
}
