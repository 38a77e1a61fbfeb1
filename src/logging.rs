use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Names a file that receives the log instead of stderr.
pub const LOG_FILE_ENV: &str = "STATEHOUSE_LOG";

/// Initialize tracing.
///
/// `RUST_LOG` takes precedence over `filter`. Output goes to stderr so
/// command output on stdout stays machine-readable, unless
/// `STATEHOUSE_LOG` names a file, which is appended to without ANSI colors.
pub fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    let layer = fmt::layer()
        .with_timer(UtcTime::rfc_3339())
        .with_target(true)
        .with_level(true);

    let log_path = std::env::var(LOG_FILE_ENV).ok().filter(|p| !p.is_empty());
    if let Some(path) = log_path {
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.with_writer(Mutex::new(file)).with_ansi(false))
                    .init();
                return;
            }
            Err(e) => eprintln!("Warning: Failed to open log file {path}: {e}"),
        }
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(layer.with_writer(std::io::stderr))
        .init();
}
