//! sitewatch — Binary entrypoint.
//! Runs exactly one monitoring pass over the configured URLs and exits,
//! cron-style; an external scheduler provides the periodic invocation.
//!
//! Per-URL failures surface in the logs and the closing summary, never as a
//! non-zero exit that would mask the URLs that did process cleanly.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sitewatch::config::Config;
use sitewatch::fetch::HttpFetcher;
use sitewatch::history::HistoryStore;
use sitewatch::{notify, run_tick};

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sitewatch=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = Config::from_env()?;
    if cfg.urls.is_empty() {
        tracing::error!("no URLs to monitor; set MONITOR_URLS");
        return Ok(());
    }

    let fetcher = HttpFetcher::new(cfg.fetch_timeout)?;
    let store = HistoryStore::new(&cfg.history_dir);
    let notifier = notify::from_config(&cfg)?;

    let summary = run_tick(&cfg, &fetcher, &store, notifier.as_ref()).await;

    tracing::info!(
        checked = summary.checked,
        first_seen = summary.first_seen,
        unchanged = summary.unchanged,
        changed = summary.changed,
        fetch_failures = summary.fetch_failures,
        storage_failures = summary.storage_failures,
        notify_failures = summary.notify_failures,
        "tick complete"
    );

    Ok(())
}
