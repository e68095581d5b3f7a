//! Maps a six-digit exchange code onto the quote service's market namespace.
//!
//! Codes starting with `6` live on the Shanghai board (`1.`); every other
//! well-formed code, Shenzhen and Beijing alike, is queried under `0.`.

use std::fmt;

use crate::error::ScanError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Market {
    /// Market id `1`.
    Shanghai,
    /// Market id `0`. Also hosts Beijing-listed codes.
    Shenzhen,
}

impl Market {
    pub fn id(self) -> u8 {
        match self {
            Market::Shanghai => 1,
            Market::Shenzhen => 0,
        }
    }
}

/// Market-qualified security id, rendered as `<market>.<code>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecId {
    market: Market,
    code: String,
}

impl SecId {
    pub fn try_from_code(code: &str) -> Result<Self, ScanError> {
        if code.len() != 6 || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ScanError::UnrecognizedSymbol {
                code: code.to_string(),
            });
        }

        let market = if code.starts_with('6') {
            Market::Shanghai
        } else {
            Market::Shenzhen
        };

        Ok(Self {
            market,
            code: code.to_string(),
        })
    }

    pub fn market(&self) -> Market {
        self.market
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for SecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.market.id(), self.code)
    }
}
