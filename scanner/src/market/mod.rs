pub mod eastmoney;
pub mod secid;
pub mod source;
pub mod types;

pub use secid::{Market, SecId};
pub use source::{OrderBookSource, UniverseSource};
pub use types::*;
