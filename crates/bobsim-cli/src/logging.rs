//! # bobsim-cli::logging
//!
//! Initializes `tracing-subscriber` for the process, choosing a human or
//! JSON formatter per `--log`. Unlike the teacher's run command, there is no
//! telemetry bus feeding a TUI here, so this is a direct `fmt` layer rather
//! than a custom `FormatEvent` wired through a snapshot channel.

use crate::args::LogFormat;
use std::path::Path;
use tracing_subscriber::EnvFilter;

pub fn init(format: LogFormat, log_file: Option<&Path>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match (format, log_file) {
        (LogFormat::Json, Some(path)) => {
            let file = std::fs::File::create(path).expect("failed to create log file");
            builder.json().with_writer(file).try_init()
        }
        (LogFormat::Json, None) => builder.json().try_init(),
        (LogFormat::Human, Some(path)) => {
            let file = std::fs::File::create(path).expect("failed to create log file");
            builder.with_writer(file).try_init()
        }
        (LogFormat::Human, None) => builder.try_init(),
    };

    if result.is_err() {
        tracing::warn!("tracing subscriber already initialized");
    }
}
