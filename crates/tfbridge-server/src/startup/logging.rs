//! Logging initialization
//!
//! Console logging through a `fmt` layer with an env-filter (`RUST_LOG`
//! override, `info` default), plus an optional daily-rolling file appender
//! when `logging.dir` is configured. The returned guard must be held for
//! the process lifetime so the non-blocking writer flushes on exit.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt};

use crate::model::Configuration;

const LOG_FILE_NAME: &str = "tfbridge.log";

pub fn init_logging(configuration: &Configuration) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match configuration.log_dir() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            Registry::default()
                .with(env_filter)
                .with(fmt::layer())
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .try_init()?;
            Ok(Some(guard))
        }
        None => {
            Registry::default()
                .with(env_filter)
                .with(fmt::layer())
                .try_init()?;
            Ok(None)
        }
    }
}
