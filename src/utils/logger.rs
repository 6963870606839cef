// Logger initialization

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "robot_insight=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into())
}

/// Log to stderr, for the command-line subcommands
pub fn init_stderr_logging() -> Result<()> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("Failed to install the log subscriber")
}

/// Log to a daily-rotated file under `log_dir`, keeping the terminal clean
/// for the dashboard. Logs are flushed until the returned guard is dropped.
pub fn init_file_logging(log_dir: &Path) -> Result<WorkerGuard> {
    let (writer, guard) = tracing_appender::non_blocking(file_appender(log_dir)?);
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .context("Failed to install the log subscriber")?;
    Ok(guard)
}

fn file_appender(log_dir: &Path) -> Result<RollingFileAppender> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("robot-insight")
        .filename_suffix("log")
        .build(log_dir)
        .context("Failed to open the log file")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_file_appender_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir = temp_dir.path().join("logs").join("nested");

        let mut appender = file_appender(&log_dir).unwrap();
        appender.write_all(b"hello\n").unwrap();
        appender.flush().unwrap();

        let files: Vec<_> = std::fs::read_dir(&log_dir).unwrap().collect();
        assert_eq!(files.len(), 1);
    }
}
