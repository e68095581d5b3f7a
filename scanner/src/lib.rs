pub mod cli;
pub mod config;
pub mod driver;
pub mod fanout;
pub mod market;
pub mod metrics;
pub mod report;
pub mod signal;

pub mod error;
