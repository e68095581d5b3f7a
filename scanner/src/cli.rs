use clap::Parser;
use rust_decimal::Decimal;
use std::time::Duration;

use crate::config::AppConfig;
use crate::report::OutputFormat;

/// Flags override `SCANNER_*` environment variables, which override defaults.
#[derive(Debug, Parser)]
#[clap(name = "limitup-scanner", version)]
pub struct Cli {
    /// Polling interval in seconds [default: 2]
    #[clap(long)]
    pub interval_secs: Option<u64>,

    /// Maximum concurrent order-book requests [default: 20]
    #[clap(long)]
    pub concurrency: Option<usize>,

    /// Per-request timeout in seconds [default: 5]
    #[clap(long)]
    pub timeout_secs: Option<u64>,

    /// Minimum best-bid price [default: 2.00]
    #[clap(long)]
    pub min_price: Option<Decimal>,

    /// Number of top gainers scanned per cycle [default: 100]
    #[clap(long)]
    pub universe_size: Option<usize>,

    /// Ranking endpoint
    #[clap(long)]
    pub universe_url: Option<String>,

    /// Per-symbol snapshot endpoint
    #[clap(long)]
    pub order_book_url: Option<String>,

    /// How flagged symbols are printed
    #[clap(long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    /// Stop after this many cycles
    #[clap(long)]
    pub cycles: Option<u64>,
}

impl Cli {
    pub fn apply(self, mut cfg: AppConfig) -> AppConfig {
        if let Some(secs) = self.interval_secs {
            cfg.interval = Duration::from_secs(secs);
        }
        if let Some(n) = self.concurrency {
            cfg.concurrency = n;
        }
        if let Some(secs) = self.timeout_secs {
            cfg.request_timeout = Duration::from_secs(secs);
        }
        if let Some(p) = self.min_price {
            cfg.min_price = p;
        }
        if let Some(n) = self.universe_size {
            cfg.universe_size = n;
        }
        if let Some(url) = self.universe_url {
            cfg.universe_url = url;
        }
        if let Some(url) = self.order_book_url {
            cfg.order_book_url = url;
        }
        cfg.output = self.output;
        cfg.max_cycles = self.cycles.or(cfg.max_cycles);
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn no_flags_keeps_config() {
        let cli = Cli::try_parse_from(["limitup-scanner"]).unwrap();
        let cfg = cli.apply(AppConfig::default());
        assert_eq!(cfg.interval, Duration::from_secs(2));
        assert_eq!(cfg.concurrency, 20);
        assert_eq!(cfg.output, OutputFormat::Pretty);
        assert_eq!(cfg.max_cycles, None);
    }

    #[test]
    fn flags_override() {
        let cli = Cli::try_parse_from([
            "limitup-scanner",
            "--interval-secs",
            "5",
            "--concurrency",
            "32",
            "--min-price",
            "2.50",
            "--output",
            "json",
            "--cycles",
            "3",
        ])
        .unwrap();
        let cfg = cli.apply(AppConfig::default());

        assert_eq!(cfg.interval, Duration::from_secs(5));
        assert_eq!(cfg.concurrency, 32);
        assert_eq!(cfg.min_price, dec!(2.50));
        assert_eq!(cfg.output, OutputFormat::Json);
        assert_eq!(cfg.max_cycles, Some(3));
    }

    #[test]
    fn bad_price_is_a_parse_error() {
        assert!(Cli::try_parse_from(["limitup-scanner", "--min-price", "cheap"]).is_err());
    }
}
