// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod config;
pub mod detect;
pub mod fetch;
pub mod history;
pub mod normalize;
pub mod notify;
pub mod watch;

// ---- Re-exports for stable public API ----
pub use crate::config::Config;
pub use crate::detect::ComparisonResult;
pub use crate::history::{HistoryStore, Snapshot};
pub use crate::notify::{ChangeNotification, Notifier};
pub use crate::watch::{run_tick, TickSummary};
