//! OpenTelemetry-based tracing with file export.
//!
//! # Architecture
//!
//! ```text
//! tracing macros → tracing-opentelemetry → OpenTelemetry SDK → FileSpanExporter → JSON lines
//! ```
//!
//! - **File export**: one JSON object per finished span, see [`span_formatter`]
//! - **Rotation**: the trace file rotates at 10 MB and keeps 3 backups
//! - **Level**: `RUST_LOG`, then `trace_level` from [`Config`](crate::Config), then `info`
//!
//! # Modules
//!
//! - [`init`]: subscriber installation
//! - [`tracer`]: tracer provider and span exporter
//! - [`span_formatter`]: span to JSON rendering
//! - [`file_writer`]: rotating line writer

mod file_writer;
mod init;
mod span_formatter;
mod tracer;

pub use init::{init_tracing, SERVICE_NAME, TRACE_FILE_NAME};
