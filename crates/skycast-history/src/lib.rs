//! Per-user weather search history.
//!
//! One consolidated row store: every successfully served lookup is appended
//! here by the calling handler, and read back most-recent-first.

mod store;

pub use store::{HistoryStore, SearchRecord};
