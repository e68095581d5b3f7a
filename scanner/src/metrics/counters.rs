use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Minimal counters for operational visibility.
#[derive(Clone, Default)]
pub struct Counters {
    pub cycles: Arc<AtomicU64>,
    pub cycles_empty: Arc<AtomicU64>,
    pub cycles_failed: Arc<AtomicU64>,

    // fan-out outcomes
    pub books_fetched: Arc<AtomicU64>,
    pub books_degraded: Arc<AtomicU64>,
    pub symbols_rejected: Arc<AtomicU64>,

    pub signals_emitted: Arc<AtomicU64>,
}

/// Point-in-time copy of [`Counters`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CountersSnapshot {
    pub cycles: u64,
    pub cycles_empty: u64,
    pub cycles_failed: u64,
    pub books_fetched: u64,
    pub books_degraded: u64,
    pub symbols_rejected: u64,
    pub signals_emitted: u64,
}

impl Counters {
    pub fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CountersSnapshot {
        fn load(c: &AtomicU64) -> u64 {
            c.load(Ordering::Relaxed)
        }

        CountersSnapshot {
            cycles: load(&self.cycles),
            cycles_empty: load(&self.cycles_empty),
            cycles_failed: load(&self.cycles_failed),
            books_fetched: load(&self.books_fetched),
            books_degraded: load(&self.books_degraded),
            symbols_rejected: load(&self.symbols_rejected),
            signals_emitted: load(&self.signals_emitted),
        }
    }
}
