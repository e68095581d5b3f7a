use std::sync::Arc;

use clap::Parser;
use common::logger::{LogFormat, init_logger};
use limitup_scanner::{
    cli::Cli,
    config::AppConfig,
    driver::CycleDriver,
    fanout::FanOut,
    market::eastmoney::EastmoneyClient,
    metrics::counters::Counters,
    report::ConsoleSink,
    signal::SignalFilter,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logger("limitup-scanner", LogFormat::from_env());

    let cfg = cli.apply(AppConfig::from_env()?);
    cfg.validate()?;

    tracing::info!(
        universe_url = %cfg.universe_url,
        order_book_url = %cfg.order_book_url,
        universe_size = cfg.universe_size,
        timeout_ms = cfg.request_timeout.as_millis() as u64,
        "Starting limit-up scanner..."
    );

    let client = Arc::new(EastmoneyClient::new(&cfg)?);
    let counters = Counters::default();

    let mut driver = CycleDriver::new(
        Arc::clone(&client),
        FanOut::new(client, cfg.concurrency, counters.clone()),
        SignalFilter::new(cfg.min_price),
        ConsoleSink::new(cfg.output),
        cfg.interval,
        counters,
    );

    tokio::select! {
        _ = driver.run(cfg.max_cycles) => {}
        res = tokio::signal::ctrl_c() => {
            res?;
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
