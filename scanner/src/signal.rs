//! Weakening-lock detection.
//!
//! A name pinned at limit-up with conviction shows sell orders on every one
//! of the five ask rungs. Gaps behind the best ask mean the wall is thinning
//! and the lock is more likely to break. A side with no asks at all is a
//! fully absent book, not a weakening one.
//!
//! Everything here is a pure function of an immutable snapshot.

use rust_decimal::Decimal;

use crate::market::types::{BookEntry, Ladder, OrderBookSnapshot, PriceLevel};

/// Best bid must be at least `min_price`. A missing bid (price 0) never passes.
pub fn passes_price_floor(book: &OrderBookSnapshot, min_price: Decimal) -> bool {
    let best = book.best_bid().price;
    !best.is_zero() && best >= min_price
}

/// Some ask is posted, and at least one of rungs 2..=5 is empty.
pub fn is_weakening_lock(asks: &Ladder) -> bool {
    let all_empty = asks.iter().all(PriceLevel::is_empty);
    !all_empty && asks[1..].iter().any(PriceLevel::is_empty)
}

/// 1-based indices of the empty ask rungs.
pub fn empty_ask_rungs(asks: &Ladder) -> Vec<usize> {
    asks.iter()
        .enumerate()
        .filter(|(_, level)| level.is_empty())
        .map(|(i, _)| i + 1)
        .collect()
}

#[derive(Clone, Copy, Debug)]
pub struct SignalFilter {
    min_price: Decimal,
}

impl SignalFilter {
    pub fn new(min_price: Decimal) -> Self {
        Self { min_price }
    }

    pub fn min_price(&self) -> Decimal {
        self.min_price
    }

    pub fn passes(&self, book: &OrderBookSnapshot) -> bool {
        passes_price_floor(book, self.min_price) && is_weakening_lock(&book.asks)
    }

    /// Entries that pass, in input order.
    pub fn select(&self, entries: &[BookEntry]) -> Vec<BookEntry> {
        entries
            .iter()
            .filter(|e| self.passes(&e.book))
            .cloned()
            .collect()
    }
}
