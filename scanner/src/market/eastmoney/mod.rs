//! Client for the quote service's ranking and per-symbol snapshot endpoints.

pub mod client;
pub mod decode;
pub mod errors;
pub mod types;

pub use client::EastmoneyClient;
pub use errors::EastmoneyError;
