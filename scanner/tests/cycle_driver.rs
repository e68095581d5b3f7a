//! Cycle cadence and failure isolation, driven on tokio's paused clock so
//! sleeps are exact and instant.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal_macros::dec;
use tokio::time::Instant;

use limitup_scanner::{
    driver::{CycleDriver, CycleReport},
    fanout::FanOut,
    market::{OrderBookSnapshot, OrderBookSource, PriceLevel, SecId, Symbol, UniverseSource},
    metrics::counters::Counters,
    report::SignalSink,
    signal::SignalFilter,
};

const INTERVAL: Duration = Duration::from_secs(2);

// -----------------------
// Mocks
// -----------------------

struct ScriptedUniverse {
    symbols: Vec<Symbol>,
    calls: Mutex<Vec<Instant>>,
    /// In-flight book fetches observed at each universe call.
    books_in_flight: Arc<AtomicUsize>,
    in_flight_at_call: Mutex<Vec<usize>>,
}

impl ScriptedUniverse {
    fn new(symbols: Vec<Symbol>, books_in_flight: Arc<AtomicUsize>) -> Self {
        Self {
            symbols,
            calls: Mutex::new(vec![]),
            books_in_flight,
            in_flight_at_call: Mutex::new(vec![]),
        }
    }
}

#[async_trait]
impl UniverseSource for ScriptedUniverse {
    async fn fetch_top_gainers(&self) -> Vec<Symbol> {
        self.calls.lock().push(Instant::now());
        self.in_flight_at_call
            .lock()
            .push(self.books_in_flight.load(Ordering::SeqCst));
        self.symbols.clone()
    }
}

/// Every book takes `delay` and shows a gap at ask 2 above the price floor.
struct SlowBooks {
    delay: Duration,
    in_flight: Arc<AtomicUsize>,
    calls: AtomicUsize,
    /// Panics on the next call when set, then disarms.
    armed: AtomicBool,
}

impl SlowBooks {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            in_flight: Arc::new(AtomicUsize::new(0)),
            calls: AtomicUsize::new(0),
            armed: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl OrderBookSource for SlowBooks {
    async fn fetch_order_book(&self, _secid: &SecId) -> OrderBookSnapshot {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.armed.swap(false, Ordering::SeqCst) {
            panic!("simulated worker loss");
        }

        OrderBookSnapshot::from_levels(
            [PriceLevel::new(dec!(10.00), 5_000)],
            [PriceLevel::new(dec!(10.01), 300)],
        )
    }
}

#[derive(Default)]
struct RecordingSink {
    reports: Mutex<Vec<CycleReport>>,
}

#[async_trait]
impl SignalSink for RecordingSink {
    async fn emit(&self, report: &CycleReport) {
        self.reports.lock().push(report.clone());
    }
}

// -----------------------
// Helpers
// -----------------------

struct Harness {
    universe: Arc<ScriptedUniverse>,
    books: Arc<SlowBooks>,
    sink: Arc<RecordingSink>,
    counters: Counters,
}

impl Harness {
    fn new(symbols: Vec<Symbol>, book_delay: Duration) -> Self {
        let books = Arc::new(SlowBooks::new(book_delay));
        let universe = Arc::new(ScriptedUniverse::new(symbols, Arc::clone(&books.in_flight)));
        Self {
            universe,
            books,
            sink: Arc::new(RecordingSink::default()),
            counters: Counters::default(),
        }
    }

    fn driver(&self) -> CycleDriver<ScriptedUniverse, SlowBooks, Arc<RecordingSink>> {
        CycleDriver::new(
            Arc::clone(&self.universe),
            FanOut::new(Arc::clone(&self.books), 20, self.counters.clone()),
            SignalFilter::new(dec!(2.00)),
            Arc::clone(&self.sink),
            INTERVAL,
            self.counters.clone(),
        )
    }

    fn call_gaps(&self) -> Vec<Duration> {
        let calls = self.universe.calls.lock();
        calls.windows(2).map(|w| w[1] - w[0]).collect()
    }
}

fn symbols(n: usize) -> Vec<Symbol> {
    (0..n)
        .map(|i| Symbol::new(format!("{:06}", 600_000 + i), format!("s{i}")))
        .collect()
}

fn assert_close(actual: Duration, expected: Duration) {
    let slack = Duration::from_millis(5);
    assert!(
        actual >= expected && actual <= expected + slack,
        "expected ~{expected:?}, got {actual:?}"
    );
}

// -----------------------
// Tests
// -----------------------

#[tokio::test(start_paused = true)]
async fn sleeps_out_the_rest_of_the_interval() {
    // Fits in one wave under the ceiling of 20.
    let h = Harness::new(symbols(20), Duration::from_millis(500));
    let start = Instant::now();

    h.driver().run(Some(3)).await;

    let gaps = h.call_gaps();
    assert_eq!(gaps.len(), 2);
    for gap in gaps {
        // 0.5s of fan-out + 1.5s of sleep
        assert_close(gap, INTERVAL);
    }

    // No sleep after the final cycle.
    assert_close(start.elapsed(), Duration::from_millis(4_500));

    let reports = h.sink.reports.lock();
    assert_eq!(reports.len(), 3);
    for r in reports.iter() {
        assert_close(r.elapsed, Duration::from_millis(500));
        assert_eq!(r.fetched.len(), 20);
        assert_eq!(r.flagged.len(), 20);
    }
}

#[tokio::test(start_paused = true)]
async fn fan_out_over_the_ceiling_runs_in_waves() {
    let h = Harness::new(symbols(30), Duration::from_millis(500));

    h.driver().run(Some(2)).await;

    // Two 0.5s waves, then 1.0s of sleep.
    assert_close(h.call_gaps()[0], INTERVAL);
    let reports = h.sink.reports.lock();
    assert_close(reports[0].elapsed, Duration::from_millis(1_000));
    assert_eq!(reports[0].fetched.len(), 30);
}

#[tokio::test(start_paused = true)]
async fn slow_cycle_starts_next_one_immediately() {
    let h = Harness::new(symbols(5), Duration::from_secs(3));

    h.driver().run(Some(2)).await;

    assert_close(h.call_gaps()[0], Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn cycles_never_overlap() {
    let h = Harness::new(symbols(60), Duration::from_millis(300));

    h.driver().run(Some(4)).await;

    assert_eq!(*h.universe.in_flight_at_call.lock(), vec![0, 0, 0, 0]);
    assert_eq!(h.books.calls.load(Ordering::SeqCst), 240);
}

#[tokio::test(start_paused = true)]
async fn empty_universe_skips_fan_out_and_sleeps_full_interval() {
    let h = Harness::new(vec![], Duration::from_millis(500));

    h.driver().run(Some(3)).await;

    for gap in h.call_gaps() {
        assert_close(gap, INTERVAL);
    }
    assert_eq!(h.books.calls.load(Ordering::SeqCst), 0);

    let reports = h.sink.reports.lock();
    assert_eq!(reports.len(), 3);
    assert!(reports.iter().all(|r| r.universe_size == 0 && r.flagged.is_empty()));
    assert_eq!(h.counters.snapshot().cycles_empty, 3);
}

#[tokio::test(start_paused = true)]
async fn failed_cycle_is_contained() {
    let h = Harness::new(symbols(1), Duration::from_millis(100));
    h.books.armed.store(true, Ordering::SeqCst);

    h.driver().run(Some(3)).await;

    let reports = h.sink.reports.lock();
    let cycles: Vec<u64> = reports.iter().map(|r| r.cycle).collect();
    assert_eq!(cycles, vec![2, 3]);

    for gap in h.call_gaps() {
        assert_close(gap, INTERVAL);
    }

    let totals = h.counters.snapshot();
    assert_eq!(totals.cycles, 3);
    assert_eq!(totals.cycles_failed, 1);
    assert_eq!(totals.signals_emitted, 2);
}
