use std::fs;

use anyhow::{Context, Result, anyhow};
use tracing::Span;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};
use uuid::Uuid;

use crate::config::{LoggingConfig, LoggingRotation};

const LOG_FILE_PREFIX: &str = "qti-session.log";

/// Keeps the non-blocking writer alive; dropping it flushes pending lines.
pub struct LoggingGuard {
    _worker_guard: WorkerGuard,
    run_id: String,
}

impl LoggingGuard {
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Span wrapping one replayed session. Every JSON line written inside it
    /// carries the run and session identifiers.
    pub fn session_span(&self, session_id: &str) -> Span {
        tracing::info_span!("session", run_id = %self.run_id, session_id = %session_id)
    }
}

/// Installs rolling JSON file logging plus, when enabled, warnings
/// on stderr. `logging.dir` is expected to be resolved by `Config::load`.
pub fn init_tracing(logging_config: &LoggingConfig) -> Result<LoggingGuard> {
    let env_filter = build_env_filter(&logging_config.filter)?;
    if logging_config.dir.as_os_str().is_empty() {
        return Err(anyhow!("logging.dir cannot be empty"));
    }
    fs::create_dir_all(&logging_config.dir).with_context(|| {
        format!(
            "failed to create logging directory {}",
            logging_config.dir.display()
        )
    })?;

    let appender = match logging_config.rotation {
        LoggingRotation::Daily => rolling::daily(&logging_config.dir, LOG_FILE_PREFIX),
        LoggingRotation::Hourly => rolling::hourly(&logging_config.dir, LOG_FILE_PREFIX),
    };
    let (writer, worker_guard) = tracing_appender::non_blocking(appender);

    let file_layer = fmt::layer()
        .json()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_current_span(true)
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(env_filter);
    let stderr_layer = logging_config
        .stderr_warn_enabled
        .then(|| fmt::layer().with_writer(std::io::stderr).with_filter(LevelFilter::WARN));

    tracing_subscriber::registry()
        .with(ErrorLayer::default())
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("failed to initialize tracing subscriber")?;

    let run_id = Uuid::now_v7().to_string();
    tracing::info!(
        target: "logging",
        run_id = %run_id,
        dir = %logging_config.dir.display(),
        filter = %logging_config.filter,
        rotation = ?logging_config.rotation,
        "logging_initialized"
    );

    Ok(LoggingGuard {
        _worker_guard: worker_guard,
        run_id,
    })
}

fn build_env_filter(filter: &str) -> Result<EnvFilter> {
    if filter.trim().is_empty() {
        return Err(anyhow!("logging.filter cannot be empty"));
    }
    EnvFilter::try_new(filter)
        .with_context(|| format!("failed to parse logging.filter '{}'", filter))
}
