use std::future::Future;
use std::time::{Duration, Instant};

/// Awaits `fut` and emits a `performance` warning when it outlives `max`.
pub async fn warn_if_slow<F, T>(label: &'static str, max: Duration, fut: F) -> T
where
    F: Future<Output = T>,
{
    let start = Instant::now();
    let out = fut.await;
    let elapsed = start.elapsed();
    if elapsed > max {
        tracing::warn!(
            target: "performance",
            label = label,
            elapsed_ms = elapsed.as_millis() as u64,
            budget_ms = max.as_millis() as u64,
            "slow operation detected"
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_through_output() {
        let v = warn_if_slow("noop", Duration::from_secs(1), async { 42 }).await;
        assert_eq!(v, 42);
    }
}
