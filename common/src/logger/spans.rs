use tracing::{Span, field};

use super::TraceId;

/// Root span for one polling cycle. `universe` and `flagged` are filled in
/// once known.
pub fn cycle_span(cycle: u64, trace_id: &TraceId) -> Span {
    tracing::info_span!(
        "cycle",
        cycle,
        trace_id = %trace_id,
        universe = field::Empty,
        flagged = field::Empty
    )
}

/// Child span for a single per-symbol fetch (inherits the cycle's trace id).
pub fn symbol_span(code: &str) -> Span {
    tracing::debug_span!("symbol", code = %code)
}
