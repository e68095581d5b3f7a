//! Normalises the snapshot endpoint's numeric fields.
//!
//! Prices arrive as integers scaled by 100, but the same field may also be a
//! float, a numeric string, the placeholder `"-"`, `null`, or simply absent.
//! Anything unreadable decodes to zero, which lines up with the empty-level
//! sentinel.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

use super::types::SnapshotFields;
use crate::market::types::{OrderBookSnapshot, PriceLevel};

/// (price, volume) field names for bid rungs 1..5.
const BID_FIELDS: [(&str, &str); 5] = [
    ("f19", "f20"),
    ("f17", "f18"),
    ("f15", "f16"),
    ("f13", "f14"),
    ("f11", "f12"),
];

/// (price, volume) field names for ask rungs 1..5.
const ASK_FIELDS: [(&str, &str); 5] = [
    ("f39", "f40"),
    ("f37", "f38"),
    ("f35", "f36"),
    ("f33", "f34"),
    ("f31", "f32"),
];

/// Field selector sent with every snapshot request.
pub const SNAPSHOT_FIELDS: &str =
    "f11,f12,f13,f14,f15,f16,f17,f18,f19,f20,f31,f32,f33,f34,f35,f36,f37,f38,f39,f40";

fn raw_decimal(v: &Value) -> Option<Decimal> {
    match v {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Some(Decimal::from(u))
            } else {
                n.as_f64().and_then(|f| Decimal::try_from(f).ok())
            }
        }
        Value::String(s) => s.trim().parse::<Decimal>().ok(),
        _ => None,
    }
}

/// Integer-scaled price to a two-decimal amount: `1050` -> `10.50`.
pub fn decode_price(raw: Option<&Value>) -> Decimal {
    let Some(d) = raw.and_then(raw_decimal) else {
        return Decimal::new(0, 2);
    };
    if d.is_sign_negative() {
        return Decimal::new(0, 2);
    }

    let mut price =
        (d / Decimal::ONE_HUNDRED).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    price.rescale(2);
    price
}

/// Share volume; negative or unreadable values clamp to zero.
pub fn decode_volume(raw: Option<&Value>) -> u64 {
    raw.and_then(raw_decimal)
        .filter(|d| !d.is_sign_negative())
        .and_then(|d| d.round().to_u64())
        .unwrap_or(0)
}

fn decode_side(fields: &SnapshotFields, names: [(&str, &str); 5]) -> [PriceLevel; 5] {
    names.map(|(p, v)| PriceLevel::new(decode_price(fields.get(p)), decode_volume(fields.get(v))))
}

pub fn snapshot_from_fields(fields: &SnapshotFields) -> OrderBookSnapshot {
    OrderBookSnapshot {
        bids: decode_side(fields, BID_FIELDS),
        asks: decode_side(fields, ASK_FIELDS),
    }
}
