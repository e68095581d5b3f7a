use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use tracing::{debug, instrument, warn};

use crate::config::AppConfig;
use crate::market::eastmoney::decode::{SNAPSHOT_FIELDS, snapshot_from_fields};
use crate::market::eastmoney::errors::EastmoneyError;
use crate::market::eastmoney::types::{
    Envelope, RankedList, RankedQuote, RankingData, SnapshotFields,
};
use crate::market::secid::SecId;
use crate::market::source::{OrderBookSource, UniverseSource};
use crate::market::types::{OrderBookSnapshot, Symbol};

const USER_AGENT: &str = "Mozilla/5.0";
const REFERER: &str = "https://quote.eastmoney.com/";

/// A-share boards included in the ranking: SH main, SZ main, SME, SH STAR, ChiNext.
const MARKET_FILTER: &str = "m:1+t:2,m:0+t:6,m:0+t:13,m:1+t:23,m:0+t:80";

#[derive(Clone)]
pub struct EastmoneyClient {
    http: Client,
    universe_url: String,
    order_book_url: String,
    universe_size: usize,
}

impl EastmoneyClient {
    pub fn new(cfg: &AppConfig) -> Result<Self, EastmoneyError> {
        let http = Client::builder()
            .timeout(cfg.request_timeout)
            .user_agent(USER_AGENT)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            universe_url: cfg.universe_url.clone(),
            order_book_url: cfg.order_book_url.clone(),
            universe_size: cfg.universe_size,
        })
    }

    /// One page of symbols sorted by percentage gain, best first.
    #[instrument(
        skip(self),
        fields(universe_size = self.universe_size),
        level = "debug"
    )]
    pub async fn try_fetch_top_gainers(&self) -> Result<Vec<Symbol>, EastmoneyError> {
        let page_size = self.universe_size.to_string();

        let resp = self
            .http
            .get(&self.universe_url)
            .header(header::REFERER, REFERER)
            .query(&[
                ("pn", "1"),
                ("pz", page_size.as_str()),
                ("po", "1"),
                ("np", "1"),
                ("fltt", "2"),
                ("fid", "f3"),
                ("fs", MARKET_FILTER),
                ("fields", "f12,f14"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body = resp.bytes().await?;
        let envelope: Envelope<RankingData> = serde_json::from_slice(&body)?;

        let symbols: Vec<Symbol> = envelope
            .data
            .and_then(|d| d.diff)
            .map(RankedList::into_ranked)
            .unwrap_or_default()
            .into_iter()
            .filter_map(RankedQuote::into_symbol)
            .collect();

        debug!(count = symbols.len(), "top gainers fetched");

        Ok(symbols)
    }

    #[instrument(skip(self, secid), fields(secid = %secid), level = "debug")]
    pub async fn try_fetch_order_book(
        &self,
        secid: &SecId,
    ) -> Result<OrderBookSnapshot, EastmoneyError> {
        let secid = secid.to_string();

        let resp = self
            .http
            .get(&self.order_book_url)
            .query(&[("secid", secid.as_str()), ("fields", SNAPSHOT_FIELDS)])
            .send()
            .await?
            .error_for_status()?;

        let body = resp.bytes().await?;
        let envelope: Envelope<SnapshotFields> = serde_json::from_slice(&body)?;
        let fields = envelope.data.ok_or(EastmoneyError::MissingData)?;

        Ok(snapshot_from_fields(&fields))
    }
}

#[async_trait]
impl UniverseSource for EastmoneyClient {
    async fn fetch_top_gainers(&self) -> Vec<Symbol> {
        match self.try_fetch_top_gainers().await {
            Ok(symbols) => symbols,
            Err(e) => {
                warn!(error = %e, "top gainers fetch failed; no universe this cycle");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl OrderBookSource for EastmoneyClient {
    async fn fetch_order_book(&self, secid: &SecId) -> OrderBookSnapshot {
        match self.try_fetch_order_book(secid).await {
            Ok(book) => book,
            Err(e) => {
                warn!(%secid, error = %e, "order book fetch failed; degrading to empty book");
                OrderBookSnapshot::empty()
            }
        }
    }
}
