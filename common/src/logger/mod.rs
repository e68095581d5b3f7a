pub mod init;
pub mod perf;
pub mod spans;
pub mod trace_id;

pub use init::{LogFormat, init_logger};
pub use perf::warn_if_slow;
pub use spans::{cycle_span, symbol_span};
pub use trace_id::TraceId;
