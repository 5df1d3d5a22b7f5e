//! File-based logging.
//!
//! The terminal belongs to the TUI, so tracing output goes to a daily rolling file
//! inside the configured log directory instead of stdout.

use anyhow::Result;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;

const LOG_FILE_PREFIX: &str = "itunes-search-tui";
const DEFAULT_FILTER: &str = "itunes_search_tui=debug,reqwest=info,warn";

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_logging(config: &AppConfig) -> Result<()> {
    let file_appender = RollingFileAppender::new(Rotation::DAILY, config.log_dir(), LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The writer flushes on drop; keep it for the life of the process.
    Box::leak(Box::new(guard));

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::info!(dir = %config.log_dir().display(), "logging initialized");
    Ok(())
}
