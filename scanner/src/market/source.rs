//! Seams between the scanner and whatever serves market data.
//!
//! Both sources are infallible from the caller's side: implementations
//! absorb transport and decoding failures and degrade to an empty universe
//! or an all-empty book.

use async_trait::async_trait;

use crate::market::secid::SecId;
use crate::market::types::{OrderBookSnapshot, Symbol};

#[async_trait]
pub trait UniverseSource: Send + Sync {
    /// Current top gainers, most gaining first. Empty on failure.
    async fn fetch_top_gainers(&self) -> Vec<Symbol>;
}

#[async_trait]
pub trait OrderBookSource: Send + Sync + 'static {
    /// Five-level snapshot for `secid`; `OrderBookSnapshot::empty()` on failure.
    async fn fetch_order_book(&self, secid: &SecId) -> OrderBookSnapshot;
}
