//! Fixed-cadence polling loop.
//!
//! One cycle: fetch the universe, fan out for books, filter, emit. The
//! driver then sleeps whatever is left of the interval, so a slow cycle
//! shortens the pause instead of stacking cycles on top of each other.
//!
//! Data flow:
//! UniverseSource -> FanOut (OrderBookSource) -> SignalFilter -> SignalSink

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use common::logger::{TraceId, cycle_span, warn_if_slow};
use tokio::time::Instant;
use tracing::{Instrument, Span, debug, error, info};

use crate::error::ScanError;
use crate::fanout::FanOut;
use crate::market::source::{OrderBookSource, UniverseSource};
use crate::market::types::BookEntry;
use crate::metrics::counters::Counters;
use crate::report::SignalSink;
use crate::signal::{SignalFilter, empty_ask_rungs};

/// `Polling` from the universe fetch until the sink has the report;
/// `Sleeping` otherwise, including after `run` stops at its cycle limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    Polling,
    Sleeping,
}

/// Everything one cycle produced. Dropped once the sink has seen it.
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// 1-based.
    pub cycle: u64,
    pub trace_id: TraceId,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,

    pub universe_size: usize,
    pub rejected: usize,
    pub degraded: usize,

    /// Every non-empty book retrieved, in completion order.
    pub fetched: Vec<BookEntry>,
    /// Subset of `fetched` showing a weakening lock above the price floor.
    pub flagged: Vec<BookEntry>,
}

/// Pause before the next cycle: `max(0, interval - elapsed)`.
pub fn remaining_sleep(interval: Duration, elapsed: Duration) -> Duration {
    interval.saturating_sub(elapsed)
}

pub struct CycleDriver<U, B, K> {
    universe: Arc<U>,
    fanout: FanOut<B>,
    filter: SignalFilter,
    sink: K,
    interval: Duration,
    state: DriverState,
    cycles_run: u64,
    counters: Counters,
}

impl<U, B, K> CycleDriver<U, B, K>
where
    U: UniverseSource,
    B: OrderBookSource,
    K: SignalSink,
{
    pub fn new(
        universe: Arc<U>,
        fanout: FanOut<B>,
        filter: SignalFilter,
        sink: K,
        interval: Duration,
        counters: Counters,
    ) -> Self {
        Self {
            universe,
            fanout,
            filter,
            sink,
            interval,
            state: DriverState::Polling,
            cycles_run: 0,
            counters,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn cycles_run(&self) -> u64 {
        self.cycles_run
    }

    /// Runs a single Polling phase and returns its report without emitting
    /// or sleeping.
    pub async fn poll_once(&mut self) -> Result<CycleReport, ScanError> {
        self.state = DriverState::Polling;
        self.cycles_run += 1;
        Counters::add(&self.counters.cycles, 1);

        let cycle = self.cycles_run;
        let trace_id = TraceId::new();
        let span = cycle_span(cycle, &trace_id);

        self.collect(cycle, trace_id).instrument(span).await
    }

    async fn collect(&self, cycle: u64, trace_id: TraceId) -> Result<CycleReport, ScanError> {
        let started = Instant::now();
        let started_at = Utc::now();

        let universe = self.universe.fetch_top_gainers().await;
        Span::current().record("universe", universe.len() as u64);

        let mut report = CycleReport {
            cycle,
            trace_id,
            started_at,
            elapsed: Duration::ZERO,
            universe_size: universe.len(),
            rejected: 0,
            degraded: 0,
            fetched: Vec::new(),
            flagged: Vec::new(),
        };

        if universe.is_empty() {
            Counters::add(&self.counters.cycles_empty, 1);
            info!("empty universe; skipping fan-out");
            report.elapsed = started.elapsed();
            return Ok(report);
        }

        let outcome =
            warn_if_slow("fan_out", self.interval, self.fanout.fetch_all(&universe)).await?;

        let flagged = self.filter.select(&outcome.entries);
        for entry in &flagged {
            debug!(
                code = %entry.symbol.code,
                name = %entry.symbol.name,
                bid1 = %entry.book.best_bid().price,
                empty_asks = ?empty_ask_rungs(&entry.book.asks),
                "weakening lock"
            );
        }
        Span::current().record("flagged", flagged.len() as u64);

        report.rejected = outcome.rejected;
        report.degraded = outcome.degraded;
        report.fetched = outcome.entries;
        report.flagged = flagged;
        report.elapsed = started.elapsed();

        info!(
            fetched = report.fetched.len(),
            degraded = report.degraded,
            rejected = report.rejected,
            flagged = report.flagged.len(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "cycle complete"
        );

        Ok(report)
    }

    /// Polls forever, or until `max_cycles` cycles have run. Cycles never
    /// overlap; a failed cycle is logged and followed by the normal sleep.
    pub async fn run(&mut self, max_cycles: Option<u64>) {
        info!(
            interval_ms = self.interval.as_millis() as u64,
            concurrency = self.fanout.concurrency(),
            min_price = %self.filter.min_price(),
            ?max_cycles,
            "cycle driver started"
        );

        loop {
            let started = Instant::now();

            match self.poll_once().await {
                Ok(report) => {
                    Counters::add(&self.counters.signals_emitted, report.flagged.len() as u64);
                    self.sink.emit(&report).await;
                }
                Err(e) => {
                    Counters::add(&self.counters.cycles_failed, 1);
                    error!(
                        cycle = self.cycles_run,
                        error = %e,
                        "cycle failed; continuing after the normal sleep"
                    );
                }
            }
            self.state = DriverState::Sleeping;

            if max_cycles.is_some_and(|max| self.cycles_run >= max) {
                let totals = self.counters.snapshot();
                info!(cycles = self.cycles_run, ?totals, "cycle limit reached");
                break;
            }

            let pause = remaining_sleep(self.interval, started.elapsed());
            debug!(sleep_ms = pause.as_millis() as u64, "sleeping until next cycle");
            tokio::time::sleep(pause).await;
        }
    }
}
