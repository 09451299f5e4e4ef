//! # lrulab
//!
//! Fixed-capacity LRU cache with O(1) `get` and `put`.
//!
//! ## Architecture
//! - **HashMap**: AHash-keyed index from key to arena slot
//! - **Recency list**: doubly-linked through the arena by index, bounded by
//!   two sentinel slots; head side is most recently used
//! - **IntCache**: integer contract, `get` answers [`NOT_FOUND`] on a miss
//! - **SharedCache**: the same cache behind one `parking_lot::Mutex`, with
//!   hit/miss statistics
//!
//! ```
//! use lrulab::{IntCache, NOT_FOUND};
//!
//! let mut cache = IntCache::new(2)?;
//! cache.put(1, 1);
//! cache.put(2, 2);
//! assert_eq!(cache.get(1), 1);
//! cache.put(3, 3);
//! assert_eq!(cache.get(2), NOT_FOUND);
//! assert_eq!(cache.to_string(), "{3:3, 1:1}");
//! # Ok::<(), lrulab::Error>(())
//! ```

#![warn(missing_docs)]

mod cache;
mod error;
mod lru;
mod shared;
mod stats;

pub use cache::{IntCache, Snapshot, SnapshotEntry, NOT_FOUND};
pub use error::{Error, Result};
pub use lru::{Iter, LruCache, PutOutcome};
pub use shared::SharedCache;
pub use stats::CacheStats;
