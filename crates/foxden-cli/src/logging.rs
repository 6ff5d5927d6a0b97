//! Subscriber setup for the CLI.
//!
//! Human output goes to stdout, so logs go to stderr. With `log.file`
//! enabled a daily rolling copy is also written under the data directory.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use foxden_core::config::{AppConfig, LogConfig};

const LOG_FILE_PREFIX: &str = "foxden.log";

/// Install the global subscriber. Keep the returned guard alive for the
/// life of the process or buffered file output is lost.
pub fn init(config: &LogConfig, verbose: bool) -> Option<WorkerGuard> {
    let filter = || {
        if verbose {
            return EnvFilter::new("foxden=debug");
        }
        EnvFilter::try_from_default_env()
            .or_else(|_| config.level.parse::<EnvFilter>())
            .unwrap_or_else(|_| EnvFilter::new("foxden=info"))
    };

    let stderr = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter());

    let (file, guard) = if config.file {
        let appender = tracing_appender::rolling::daily(AppConfig::log_dir(), LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_filter(filter());
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    // Ignore a second init (tests, embedding).
    let _ = tracing_subscriber::registry()
        .with(stderr)
        .with(file)
        .try_init();

    guard
}
