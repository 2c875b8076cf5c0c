//! Tracing subscriber setup.

use super::tracer;
use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Service name recorded on every exported span.
pub const SERVICE_NAME: &str = "reelsync";

/// Default trace file name inside the data directory.
pub const TRACE_FILE_NAME: &str = "reelsync-traces.jsonl";

/// Installs the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` if set, else from `config.trace_level`,
/// else `info`. Spans are exported to `config.trace_file`, or to
/// [`TRACE_FILE_NAME`] inside the data directory.
///
/// Observability is optional: if the trace directory cannot be created or a
/// global subscriber is already installed, this returns without doing anything.
///
/// # Example
///
/// ```no_run
/// use reelsync::observability::init_tracing;
/// use reelsync::Config;
///
/// let config = Config {
///     trace_level: Some("reelsync=debug".to_string()),
///     ..Config::default()
/// };
/// init_tracing(&config);
/// ```
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.trace_level.as_deref().unwrap_or("info"))
    });

    let trace_file = config
        .trace_file
        .clone()
        .unwrap_or_else(|| crate::infrastructure::get_data_dir().join(TRACE_FILE_NAME));

    if let Some(parent) = trace_file.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            return;
        }
    }

    let provider = tracer::create_tracer_provider(trace_file, SERVICE_NAME);
    let otel_layer = OpenTelemetryLayer::new(provider.tracer(SERVICE_NAME));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(otel_layer)
        .try_init();
}
