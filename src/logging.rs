use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::AppPaths;

/// Stem of the daily-rolling log file under `AppPaths::log_dir`.
const LOG_FILE_STEM: &str = "cramkit.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber: env-filtered stdout plus a rolling
/// file in the log directory (already created by `AppPaths`).
pub fn init(paths: &AppPaths) {
    let file_appender = tracing_appender::rolling::daily(&paths.log_dir, LOG_FILE_STEM);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_ansi(false)
        .with_writer(non_blocking);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn rolling_appender_writes_app_named_file_into_log_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = AppPaths::with_data_dir(tmp.path().to_path_buf());

        let mut appender = tracing_appender::rolling::daily(&paths.log_dir, LOG_FILE_STEM);
        appender.write_all(b"startup\n").unwrap();
        appender.flush().unwrap();

        let names: Vec<String> = std::fs::read_dir(&paths.log_dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();

        assert!(
            names.iter().any(|n| n.starts_with("cramkit.log")),
            "expected a cramkit.log.* file, got {:?}",
            names
        );
    }
}
