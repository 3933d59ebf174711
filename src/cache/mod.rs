//! Cache module for memoizing API responses in memory
//!
//! This module provides a refreshing cache that serves the latest known response
//! for a request key while bounding how often the network is hit. Entries expire
//! after a TTL; a failed re-fetch is reported as a typed error that still carries
//! the stale entry, so the UI can decide whether to show old data.

mod manager;

pub use manager::{CachedData, FetchError, RefreshingCache, DEFAULT_TTL_SECS};
