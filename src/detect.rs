// src/detect.rs
use anyhow::Result;

use crate::history::HistoryStore;

/// Outcome of comparing freshly normalized text against the stored baseline.
/// Computed per tick, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComparisonResult {
    /// No stored snapshot for this slug yet. The caller persists the first
    /// snapshot but must not notify.
    NoPriorHistory,
    /// Exact match with the newest snapshot. No write, no notification.
    Unchanged,
    /// Content differs from the baseline. Caller appends a snapshot and
    /// notifies.
    Changed { previous: String, current: String },
}

/// Compare `current` (already normalized) against the newest snapshot for
/// `slug`. Comparison is exact string equality; all markup noise has been
/// removed upstream.
pub fn detect(store: &HistoryStore, slug: &str, current: &str) -> Result<ComparisonResult> {
    match store.latest(slug)? {
        None => Ok(ComparisonResult::NoPriorHistory),
        Some(prev) if prev.text == current => Ok(ComparisonResult::Unchanged),
        Some(prev) => Ok(ComparisonResult::Changed {
            previous: prev.text,
            current: current.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn first_observation_has_no_prior_history() {
        let tmp = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(tmp.path());
        let result = detect(&store, "fresh", "Hello").unwrap();
        assert_eq!(result, ComparisonResult::NoPriorHistory);
    }

    #[test]
    fn identical_text_is_unchanged() {
        let tmp = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(tmp.path());
        store.append("s", "Hello", Utc::now()).unwrap();
        assert_eq!(
            detect(&store, "s", "Hello").unwrap(),
            ComparisonResult::Unchanged
        );
    }

    #[test]
    fn different_text_reports_both_versions() {
        let tmp = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(tmp.path());
        store.append("s", "Hello", Utc::now()).unwrap();
        let result = detect(&store, "s", "Hello World").unwrap();
        assert_eq!(
            result,
            ComparisonResult::Changed {
                previous: "Hello".into(),
                current: "Hello World".into(),
            }
        );
    }
}
