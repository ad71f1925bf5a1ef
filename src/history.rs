// src/history.rs
//! Append-only snapshot history, one directory per monitored URL.
//!
//! Layout: `<root>/<slug>/<epoch_millis>.md`, each file holding one snapshot
//! with an RFC 3339 header line followed by the normalized text. `append`
//! never rewrites prior entries; `latest` is a filename max-scan.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

const SLUG_PREFIX_MAX: usize = 48;
const SLUG_HASH_LEN: usize = 12;

/// One timestamped record of a URL's normalized content. Immutable once
/// written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub slug: String,
    pub recorded_at: DateTime<Utc>,
    pub text: String,
}

/// Derive the storage key for a URL: a sanitized readable prefix plus a
/// truncated SHA-256 of the full URL. The hash part guarantees two distinct
/// URLs never share a slug even when the sanitizer folds their characters to
/// the same substitute; the prefix only keeps the on-disk layout browsable.
pub fn slug_for(url: &str) -> String {
    let trimmed = url
        .trim_start_matches("https://")
        .trim_start_matches("http://");

    let mut prefix = String::new();
    for c in trimmed.chars().flat_map(char::to_lowercase) {
        if prefix.len() >= SLUG_PREFIX_MAX {
            break;
        }
        if c.is_ascii_alphanumeric() {
            prefix.push(c);
        } else if !prefix.is_empty() && !prefix.ends_with('-') {
            prefix.push('-');
        }
    }
    let prefix = prefix.trim_end_matches('-');

    let digest = Sha256::digest(url.as_bytes());
    let mut short = String::with_capacity(SLUG_HASH_LEN);
    for b in digest.iter().take(SLUG_HASH_LEN / 2) {
        let _ = write!(short, "{b:02x}");
    }

    if prefix.is_empty() {
        short
    } else {
        format!("{prefix}-{short}")
    }
}

pub struct HistoryStore {
    root: PathBuf,
}

impl HistoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn slug_dir(&self, slug: &str) -> PathBuf {
        self.root.join(slug)
    }

    /// Newest stored snapshot for a slug, or `None` when the slug has never
    /// been observed.
    pub fn latest(&self, slug: &str) -> Result<Option<Snapshot>> {
        let dir = self.slug_dir(slug);
        let Some(newest) = newest_entry(&dir)? else {
            return Ok(None);
        };
        let (millis, path) = newest;

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("reading snapshot {}", path.display()))?;
        let fallback = DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now);
        let (recorded_at, text) = parse_record(&contents, fallback);

        Ok(Some(Snapshot {
            slug: slug.to_string(),
            recorded_at,
            text,
        }))
    }

    /// Write a new snapshot. Pure add: prior entries are never touched. If
    /// `at` does not land after the current newest entry (same-millisecond
    /// ticks), the stamp is bumped to keep per-slug timestamps strictly
    /// increasing.
    pub fn append(&self, slug: &str, text: &str, at: DateTime<Utc>) -> Result<Snapshot> {
        let dir = self.slug_dir(slug);
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating history dir {}", dir.display()))?;

        let mut millis = at.timestamp_millis();
        if let Some((latest_millis, _)) = newest_entry(&dir)? {
            if millis <= latest_millis {
                millis = latest_millis + 1;
            }
        }
        let recorded_at = DateTime::from_timestamp_millis(millis).unwrap_or(at);

        let path = dir.join(format!("{millis}.md"));
        let record = format!("# {}\n\n{}\n", recorded_at.to_rfc3339(), text);
        fs::write(&path, record)
            .with_context(|| format!("writing snapshot {}", path.display()))?;

        Ok(Snapshot {
            slug: slug.to_string(),
            recorded_at,
            text: text.to_string(),
        })
    }

    /// Maintenance operation for external retention policies: drop all but
    /// the newest `keep` snapshots for a slug. Never called by the tick
    /// itself. Returns the number of files removed.
    pub fn prune_keeping(&self, slug: &str, keep: usize) -> Result<usize> {
        let dir = self.slug_dir(slug);
        let mut entries = list_entries(&dir)?;
        if entries.len() <= keep {
            return Ok(0);
        }
        entries.sort_by_key(|(millis, _)| *millis);

        let excess = entries.len() - keep;
        let mut removed = 0;
        for (_, path) in entries.into_iter().take(excess) {
            fs::remove_file(&path)
                .with_context(|| format!("pruning snapshot {}", path.display()))?;
            removed += 1;
        }
        Ok(removed)
    }
}

/// All `<millis>.md` entries in a slug directory. Missing dir reads as empty.
fn list_entries(dir: &Path) -> Result<Vec<(i64, PathBuf)>> {
    let iter = match fs::read_dir(dir) {
        Ok(iter) => iter,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(e).with_context(|| format!("listing history dir {}", dir.display()))
        }
    };

    let mut out = Vec::new();
    for entry in iter {
        let entry =
            entry.with_context(|| format!("listing history dir {}", dir.display()))?;
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("md") {
            continue;
        }
        let Some(millis) = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<i64>().ok())
        else {
            continue;
        };
        out.push((millis, path));
    }
    Ok(out)
}

fn newest_entry(dir: &Path) -> Result<Option<(i64, PathBuf)>> {
    let entries = list_entries(dir)?;
    Ok(entries.into_iter().max_by_key(|(millis, _)| *millis))
}

fn parse_record(contents: &str, fallback: DateTime<Utc>) -> (DateTime<Utc>, String) {
    if let Some(rest) = contents.strip_prefix("# ") {
        if let Some((header, body)) = rest.split_once('\n') {
            let recorded_at = DateTime::parse_from_rfc3339(header.trim())
                .map(|d| d.with_timezone(&Utc))
                .unwrap_or(fallback);
            return (recorded_at, body.trim().to_string());
        }
    }
    (fallback, contents.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn store() -> (tempfile::TempDir, HistoryStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(tmp.path());
        (tmp, store)
    }

    #[test]
    fn slug_is_deterministic_and_filesystem_safe() {
        let url = "https://example.com/path?q=1";
        let a = slug_for(url);
        let b = slug_for(url);
        assert_eq!(a, b);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-'));
        assert!(a.starts_with("example-com-path-q-1-"));
    }

    #[test]
    fn urls_folding_to_same_prefix_get_distinct_slugs() {
        // Sanitizer maps both '/' and ':' to '-'; the hash keeps them apart.
        let a = slug_for("http://example.com/a:b");
        let b = slug_for("http://example.com/a/b");
        assert_ne!(a, b);
    }

    #[test]
    fn latest_is_none_for_unseen_slug() {
        let (_tmp, store) = store();
        assert!(store.latest("nothing-here").unwrap().is_none());
    }

    #[test]
    fn append_then_latest_round_trips() {
        let (_tmp, store) = store();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let written = store.append("s", "Hello World", at).unwrap();
        let read = store.latest("s").unwrap().unwrap();
        assert_eq!(read.text, "Hello World");
        assert_eq!(read.recorded_at, written.recorded_at);
    }

    #[test]
    fn latest_returns_newest_of_many() {
        let (_tmp, store) = store();
        let t1 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap();
        store.append("s", "first", t1).unwrap();
        store.append("s", "second", t2).unwrap();
        assert_eq!(store.latest("s").unwrap().unwrap().text, "second");
    }

    #[test]
    fn append_never_rewrites_prior_entries() {
        let (tmp, store) = store();
        let t1 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap();
        let first = store.append("s", "first", t1).unwrap();
        store.append("s", "second", t2).unwrap();

        let first_path = tmp
            .path()
            .join("s")
            .join(format!("{}.md", first.recorded_at.timestamp_millis()));
        let contents = fs::read_to_string(first_path).unwrap();
        assert!(contents.contains("first"));
    }

    #[test]
    fn same_millisecond_appends_stay_strictly_increasing() {
        let (_tmp, store) = store();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let a = store.append("s", "one", at).unwrap();
        let b = store.append("s", "two", at).unwrap();
        assert!(b.recorded_at > a.recorded_at);
        assert_eq!(store.latest("s").unwrap().unwrap().text, "two");
    }

    #[test]
    fn prune_keeps_newest_n() {
        let (_tmp, store) = store();
        for i in 0..5 {
            let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, i, 0).unwrap();
            store.append("s", &format!("v{i}"), at).unwrap();
        }
        let removed = store.prune_keeping("s", 2).unwrap();
        assert_eq!(removed, 3);
        assert_eq!(store.latest("s").unwrap().unwrap().text, "v4");
        assert_eq!(store.prune_keeping("s", 2).unwrap(), 0);
    }

    #[test]
    fn prune_on_unseen_slug_is_a_noop() {
        let (_tmp, store) = store();
        assert_eq!(store.prune_keeping("ghost", 3).unwrap(), 0);
    }
}
