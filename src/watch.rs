// src/watch.rs
//! One monitoring pass over the configured URLs.
//!
//! URLs are independent: any failure is logged and scoped to its URL, never
//! to the tick. A changed page writes its snapshot before the notification
//! goes out, so a delivery failure cannot lose the observation.

use anyhow::Result;
use chrono::Utc;

use crate::config::Config;
use crate::detect::{detect, ComparisonResult};
use crate::fetch::PageFetcher;
use crate::history::{slug_for, HistoryStore};
use crate::normalize::normalize;
use crate::notify::{ChangeNotification, Notifier};

/// What happened to a single URL during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlOutcome {
    FirstSeen,
    Unchanged,
    Changed { notified: bool },
    FetchFailed,
    StorageFailed,
}

/// Per-tick counters, for the closing log line and for tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub checked: usize,
    pub first_seen: usize,
    pub unchanged: usize,
    pub changed: usize,
    pub fetch_failures: usize,
    pub storage_failures: usize,
    pub notify_failures: usize,
}

/// Run one monitoring pass: fetch, normalize, compare, persist, notify.
/// This is the single externally callable operation; an external scheduler
/// invokes it once per interval.
pub async fn run_tick(
    cfg: &Config,
    fetcher: &dyn PageFetcher,
    store: &HistoryStore,
    notifier: &dyn Notifier,
) -> TickSummary {
    let mut summary = TickSummary::default();

    for url in &cfg.urls {
        summary.checked += 1;
        match check_url(cfg, fetcher, store, notifier, url).await {
            UrlOutcome::FirstSeen => summary.first_seen += 1,
            UrlOutcome::Unchanged => summary.unchanged += 1,
            UrlOutcome::Changed { notified } => {
                summary.changed += 1;
                if !notified {
                    summary.notify_failures += 1;
                }
            }
            UrlOutcome::FetchFailed => summary.fetch_failures += 1,
            UrlOutcome::StorageFailed => summary.storage_failures += 1,
        }
    }

    summary
}

async fn check_url(
    cfg: &Config,
    fetcher: &dyn PageFetcher,
    store: &HistoryStore,
    notifier: &dyn Notifier,
    url: &str,
) -> UrlOutcome {
    tracing::info!(url = %url, "checking");

    let raw = match fetcher.fetch(url).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(url = %url, error = ?e, "fetch failed; skipping until next tick");
            return UrlOutcome::FetchFailed;
        }
    };

    let text = normalize(&raw);
    let slug = slug_for(url);

    match run_detection(store, &slug, &text) {
        Ok(ComparisonResult::NoPriorHistory) => {
            tracing::info!(url = %url, slug = %slug, "first observation; saving baseline");
            UrlOutcome::FirstSeen
        }
        Ok(ComparisonResult::Unchanged) => {
            tracing::debug!(url = %url, slug = %slug, "no change");
            UrlOutcome::Unchanged
        }
        Ok(ComparisonResult::Changed { .. }) => {
            tracing::info!(url = %url, slug = %slug, "change detected");
            let notification = ChangeNotification::for_url(cfg, url);
            let notified = match notifier.send(&notification).await {
                Ok(()) => true,
                Err(e) => {
                    // History is already updated; detection succeeded.
                    tracing::warn!(url = %url, error = ?e, "notification failed");
                    false
                }
            };
            UrlOutcome::Changed { notified }
        }
        Err(e) => {
            // An unrecorded change could be silently lost, so storage
            // trouble fails this URL for the tick.
            tracing::error!(url = %url, slug = %slug, error = ?e, "history storage failed");
            UrlOutcome::StorageFailed
        }
    }
}

/// Compare against stored history and persist the snapshot the result calls
/// for. Unchanged content writes nothing.
fn run_detection(store: &HistoryStore, slug: &str, text: &str) -> Result<ComparisonResult> {
    let result = detect(store, slug, text)?;
    match &result {
        ComparisonResult::NoPriorHistory | ComparisonResult::Changed { .. } => {
            store.append(slug, text, Utc::now())?;
        }
        ComparisonResult::Unchanged => {}
    }
    Ok(result)
}
