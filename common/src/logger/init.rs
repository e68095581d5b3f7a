use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Output encoding for log lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// `APP_ENV=production` switches to JSON lines.
    pub fn from_env() -> Self {
        if std::env::var("APP_ENV").unwrap_or_default() == "production" {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Installs the global subscriber once; later calls are no-ops.
///
/// Filtering follows `RUST_LOG` and falls back to `info`. Logs go to stderr;
/// stdout is left to the binary's own output.
pub fn init_logger(service_name: &'static str, format: LogFormat) {
    LOGGER_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let base = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true) // <-- shows crate/module path
            .with_thread_ids(true)
            .with_line_number(true)
            .with_file(true)
            .with_span_events(fmt::format::FmtSpan::CLOSE);

        let installed = match format {
            LogFormat::Json => tracing_subscriber::registry()
                .with(filter)
                .with(base.json())
                .try_init(),
            LogFormat::Pretty => tracing_subscriber::registry()
                .with(filter)
                .with(base.pretty())
                .try_init(),
        };

        // Another subscriber (e.g. a test harness) may already own the global slot.
        if installed.is_ok() {
            tracing::info!(service = service_name, ?format, "logger initialized");
        }
    });
}
