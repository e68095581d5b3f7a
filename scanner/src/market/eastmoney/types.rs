use serde::Deserialize;
use serde_json::{Map, Value};

use crate::market::types::Symbol;

/// Every quote-service payload sits under `data`, which is `null` when the
/// request matched nothing.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
}

/// Raw per-symbol snapshot: `f11`..`f40` keyed numeric fields.
pub type SnapshotFields = Map<String, Value>;

/// `data` of the ranking (`clist/get`) endpoint.
#[derive(Debug, Deserialize)]
pub struct RankingData {
    #[serde(default)]
    pub diff: Option<RankedList>,
}

/// The ranking arrives as an array, or as an object keyed by rank index
/// depending on the request flags. Entries stay raw until `into_ranked` so
/// one malformed element never sinks the whole list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RankedList {
    Seq(Vec<Value>),
    Keyed(Map<String, Value>),
}

impl RankedList {
    /// Entries in rank order. Keyed entries are ordered by numeric index.
    /// In either shape, elements that do not look like quotes are dropped.
    pub fn into_ranked(self) -> Vec<RankedQuote> {
        let raw: Vec<Value> = match self {
            RankedList::Seq(v) => v,
            RankedList::Keyed(map) => {
                let mut keyed: Vec<(u64, String, Value)> = map
                    .into_iter()
                    .map(|(k, v)| (k.parse::<u64>().unwrap_or(u64::MAX), k, v))
                    .collect();
                keyed.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
                keyed.into_iter().map(|(_, _, v)| v).collect()
            }
        };

        raw.into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct RankedQuote {
    #[serde(rename = "f12", default)]
    pub code: Value,

    #[serde(rename = "f14", default)]
    pub name: Value,
}

impl RankedQuote {
    /// `None` when the entry carries no usable code.
    pub fn into_symbol(self) -> Option<Symbol> {
        let code = match self.code {
            Value::String(s) => {
                let s = s.trim();
                if s.is_empty() || s == "-" {
                    return None;
                }
                s.to_string()
            }
            Value::Number(n) => format!("{:06}", n.as_u64()?),
            _ => return None,
        };

        let name = match self.name {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => String::new(),
        };

        Some(Symbol { code, name })
    }
}
