//! Bounded per-symbol order-book fan-out.
//!
//! Every symbol gets its own task; a semaphore caps how many are in flight.
//! The coordinator waits for every spawned task before returning, so a cycle
//! never leaks work into the next one.

use std::sync::Arc;

use common::logger::symbol_span;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{Instrument, debug, error, warn};

use crate::error::ScanError;
use crate::market::secid::SecId;
use crate::market::source::OrderBookSource;
use crate::market::types::{BookEntry, Symbol};
use crate::metrics::counters::Counters;

/// What one fan-out pass produced.
#[derive(Debug, Default)]
pub struct FanOutOutcome {
    /// Non-empty books, in completion order.
    pub entries: Vec<BookEntry>,

    /// Symbols skipped because their code has no market mapping.
    pub rejected: usize,

    /// Fetches that came back with an all-empty book.
    pub degraded: usize,
}

pub struct FanOut<S> {
    source: Arc<S>,
    concurrency: usize,
    counters: Counters,
}

impl<S: OrderBookSource> FanOut<S> {
    /// `concurrency` of zero is treated as one.
    pub fn new(source: Arc<S>, concurrency: usize, counters: Counters) -> Self {
        Self {
            source,
            concurrency: concurrency.max(1),
            counters,
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Fetches a book for every mappable symbol in `universe`.
    ///
    /// Per-symbol failures never surface here. The only error is a fetch
    /// task that panics or is cancelled, which fails the whole pass once the
    /// remaining tasks have drained.
    pub async fn fetch_all(&self, universe: &[Symbol]) -> Result<FanOutOutcome, ScanError> {
        let permits = Arc::new(Semaphore::new(self.concurrency));
        let mut set = JoinSet::new();
        let mut outcome = FanOutOutcome::default();
        let mut failure: Option<ScanError> = None;

        for symbol in universe {
            let secid = match SecId::try_from_code(&symbol.code) {
                Ok(id) => id,
                Err(e) => {
                    warn!(code = %symbol.code, name = %symbol.name, error = %e, "skipping symbol");
                    outcome.rejected += 1;
                    continue;
                }
            };

            // Waits here while `concurrency` fetches are already running.
            // The pool is local and never closed, so acquiring cannot fail.
            let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
                continue;
            };

            let source = Arc::clone(&self.source);
            let span = symbol_span(&symbol.code);
            let symbol = symbol.clone();

            set.spawn(
                async move {
                    let book = source.fetch_order_book(&secid).await;
                    drop(permit);
                    BookEntry { symbol, book }
                }
                .instrument(span),
            );
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(entry) if entry.book.is_empty() => {
                    debug!(code = %entry.symbol.code, "empty book dropped");
                    outcome.degraded += 1;
                }
                Ok(entry) => outcome.entries.push(entry),
                Err(e) => {
                    error!(error = %e, "order book task did not complete");
                    failure.get_or_insert_with(|| {
                        ScanError::ResourceExhaustion(format!("fetch task failed: {e}"))
                    });
                }
            }
        }

        Counters::add(&self.counters.symbols_rejected, outcome.rejected as u64);
        Counters::add(&self.counters.books_degraded, outcome.degraded as u64);
        Counters::add(&self.counters.books_fetched, outcome.entries.len() as u64);

        match failure {
            Some(e) => Err(e),
            None => Ok(outcome),
        }
    }
}
