use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Number of rungs quoted on each side of the book.
pub const BOOK_DEPTH: usize = 5;

/// A listed equity as returned by the ranking endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    /// Six-digit exchange code, e.g. `600000`.
    pub code: String,
    pub name: String,
}

impl Symbol {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// One rung of an order book ladder.
///
/// `price == 0 && volume == 0` is the "nothing posted here" sentinel. A
/// genuinely quoted zero-volume rung is indistinguishable from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: Decimal,
    pub volume: u64,
}

impl PriceLevel {
    pub const EMPTY: PriceLevel = PriceLevel {
        price: Decimal::ZERO,
        volume: 0,
    };

    pub fn new(price: Decimal, volume: u64) -> Self {
        Self { price, volume }
    }

    pub fn is_empty(&self) -> bool {
        self.price.is_zero() && self.volume == 0
    }
}

/// Rung 1 (best price) first.
pub type Ladder = [PriceLevel; BOOK_DEPTH];

/// Five-level bid/ask snapshot for one symbol at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    pub bids: Ladder,
    pub asks: Ladder,
}

impl OrderBookSnapshot {
    /// All ten levels empty. Used as the degraded result of a failed fetch.
    pub fn empty() -> Self {
        Self {
            bids: [PriceLevel::EMPTY; BOOK_DEPTH],
            asks: [PriceLevel::EMPTY; BOOK_DEPTH],
        }
    }

    /// Builds a snapshot from best-first sequences, padding short sides with
    /// empty levels and ignoring anything past rung 5.
    pub fn from_levels<B, A>(bids: B, asks: A) -> Self
    where
        B: IntoIterator<Item = PriceLevel>,
        A: IntoIterator<Item = PriceLevel>,
    {
        Self {
            bids: fill_ladder(bids),
            asks: fill_ladder(asks),
        }
    }

    pub fn best_bid(&self) -> &PriceLevel {
        &self.bids[0]
    }

    pub fn best_ask(&self) -> &PriceLevel {
        &self.asks[0]
    }

    /// True when neither side has a single populated rung.
    pub fn is_empty(&self) -> bool {
        self.bids.iter().chain(self.asks.iter()).all(PriceLevel::is_empty)
    }
}

fn fill_ladder<I: IntoIterator<Item = PriceLevel>>(levels: I) -> Ladder {
    let mut ladder = [PriceLevel::EMPTY; BOOK_DEPTH];
    for (slot, level) in ladder.iter_mut().zip(levels) {
        *slot = level;
    }
    ladder
}

/// A symbol paired with the book fetched for it during a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookEntry {
    pub symbol: Symbol,
    pub book: OrderBookSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn empty_level_requires_both_zero() {
        assert!(PriceLevel::EMPTY.is_empty());
        assert!(!PriceLevel::new(dec!(0), 100).is_empty());
        assert!(!PriceLevel::new(dec!(10.05), 0).is_empty());
    }

    #[test]
    fn short_sides_are_padded() {
        let book = OrderBookSnapshot::from_levels(
            [PriceLevel::new(dec!(5.00), 1000)],
            Vec::<PriceLevel>::new(),
        );

        assert_eq!(book.bids[0], PriceLevel::new(dec!(5.00), 1000));
        assert!(book.bids[1..].iter().all(PriceLevel::is_empty));
        assert!(book.asks.iter().all(PriceLevel::is_empty));
        assert!(!book.is_empty());
    }

    #[test]
    fn extra_levels_are_dropped() {
        let levels = (1..=7).map(|i| PriceLevel::new(Decimal::from(i), i as u64));
        let book = OrderBookSnapshot::from_levels(levels.clone(), levels);

        assert_eq!(book.bids.len(), BOOK_DEPTH);
        assert_eq!(book.asks[4], PriceLevel::new(dec!(5), 5));
    }

    #[test]
    fn degraded_snapshot_is_empty() {
        assert!(OrderBookSnapshot::empty().is_empty());
        assert_eq!(OrderBookSnapshot::empty(), OrderBookSnapshot::default());
    }
}
