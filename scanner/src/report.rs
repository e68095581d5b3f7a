//! Presentation of flagged books.
//!
//! The driver hands each finished cycle to a [`SignalSink`]; the console sink
//! renders flagged names either as a bid/ask ladder or as JSON lines.

use std::sync::Arc;

use async_trait::async_trait;
use clap::ValueEnum;
use serde::Serialize;
use tracing::warn;

use crate::driver::CycleReport;
use crate::market::types::{BookEntry, Ladder, PriceLevel};

const PRICE_WIDTH: usize = 6;
const VOLUME_WIDTH: usize = 4;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable ladder.
    #[default]
    Pretty,
    /// One JSON object per flagged symbol.
    Json,
}

/// Receives every completed cycle. Failed cycles are not delivered.
#[async_trait]
pub trait SignalSink: Send + Sync {
    async fn emit(&self, report: &CycleReport);
}

#[async_trait]
impl<T: SignalSink + ?Sized> SignalSink for Arc<T> {
    async fn emit(&self, report: &CycleReport) {
        (**self).emit(report).await
    }
}

/// Wire shape of one flagged symbol.
#[derive(Debug, Clone, Serialize)]
pub struct SignalRecord<'a> {
    pub code: &'a str,
    pub name: &'a str,
    pub bid_levels: &'a Ladder,
    pub ask_levels: &'a Ladder,
}

impl<'a> From<&'a BookEntry> for SignalRecord<'a> {
    fn from(e: &'a BookEntry) -> Self {
        Self {
            code: &e.symbol.code,
            name: &e.symbol.name,
            bid_levels: &e.book.bids,
            ask_levels: &e.book.asks,
        }
    }
}

fn format_level(level: &PriceLevel) -> String {
    if level.is_empty() {
        return format!("({} / {})", " ".repeat(PRICE_WIDTH), " ".repeat(VOLUME_WIDTH));
    }
    let price = format!("{:.2}", level.price);
    format!(
        "({price:>pw$} / {vol:>vw$})",
        vol = level.volume,
        pw = PRICE_WIDTH,
        vw = VOLUME_WIDTH
    )
}

fn format_side(label: &str, ladder: &Ladder) -> String {
    ladder
        .iter()
        .enumerate()
        .map(|(i, level)| format!("{label}{}: {}", i + 1, format_level(level)))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Header, bid line, ask line and a dashed rule as wide as the widest line.
pub fn render_ladder(entry: &BookEntry) -> String {
    let header = format!("{} ({}):", entry.symbol.name, entry.symbol.code);
    let bids = format_side("Bid", &entry.book.bids);
    let asks = format_side("Ask", &entry.book.asks);

    let width = [&header, &bids, &asks]
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0);

    format!("{header}\n{bids}\n{asks}\n{}", "-".repeat(width))
}

/// Renders the flagged part of a report, one block or line per symbol.
pub fn render_report(report: &CycleReport, format: OutputFormat) -> Vec<String> {
    report
        .flagged
        .iter()
        .filter_map(|entry| match format {
            OutputFormat::Pretty => Some(render_ladder(entry)),
            OutputFormat::Json => match serde_json::to_string(&SignalRecord::from(entry)) {
                Ok(line) => Some(line),
                Err(e) => {
                    warn!(code = %entry.symbol.code, error = %e, "failed to encode record");
                    None
                }
            },
        })
        .collect()
}

/// Writes flagged symbols to stdout. Logs go to stderr, so the two never interleave.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleSink {
    format: OutputFormat,
}

impl ConsoleSink {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }
}

#[async_trait]
impl SignalSink for ConsoleSink {
    async fn emit(&self, report: &CycleReport) {
        for block in render_report(report, self.format) {
            println!("{block}");
        }
    }
}
