use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Directory holding the rotating log files.
pub const LOGS_DIR: &str = "logs";

const LOG_FILE_PREFIX: &str = "orchestra.log";

/// Builds the filter for a level or directive string, falling back to `info`.
pub fn level_filter(log_level: &str) -> EnvFilter {
    match EnvFilter::try_new(log_level) {
        Ok(filter) => filter,
        Err(_) => {
            eprintln!("Invalid log level '{}', defaulting to 'info'", log_level);
            EnvFilter::new("info")
        }
    }
}

/// Initialize the logging system with the specified log level.
///
/// Console output goes to stderr so it stays out of the way of reports on
/// stdout. With `with_file`, records are also written to a daily rotating
/// file in [`LOGS_DIR`] through a background writer; keep the returned
/// guard alive until exit or the last records are lost.
///
/// # Arguments
///
/// * `log_level` - Level or filter directive (e.g. "info", "orchestra=debug")
/// * `with_file` - Whether to also log to a file
pub fn init_logging(log_level: &str, with_file: bool) -> Option<WorkerGuard> {
    let console_layer = fmt::layer()
        .with_line_number(true)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = if with_file {
        let appender = RollingFileAppender::new(Rotation::DAILY, LOGS_DIR, LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer()
            .with_line_number(true)
            .with_ansi(false)
            .with_writer(writer);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(level_filter(log_level))
        .with(console_layer)
        .with(file_layer)
        .init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_are_accepted_and_garbage_falls_back() {
        assert_eq!(level_filter("orchestra=debug").to_string(), "orchestra=debug");
        assert_eq!(level_filter("orchestra=verbose").to_string(), "info");
    }
}
