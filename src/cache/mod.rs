//! Vetrina product cache.
//!
//! A stale-while-revalidate table of product list pages keyed by the
//! canonical filter set. Reads never wait on the backend once a page is
//! cached; stale pages schedule at most one background refresh per key.
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! enabled = true
//! duration_seconds = 300
//! ```

mod clock;
mod config;
mod keys;
mod lock;
mod store;
mod swr;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use keys::CacheKey;
pub use store::{CacheEntry, CacheTable, Lookup};
pub use swr::{CacheRead, CacheStatus, CachedPage, ProductCache, Refreshed};
