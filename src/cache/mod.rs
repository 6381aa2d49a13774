//! Content-addressable response cache.
//!
//! Diagnosis results are keyed by a SHA-256 digest of the request's image
//! content plus a disambiguating context string, so identical requests hit
//! the same entry while semantically distinct ones never collide.
//!
//! The store is bounded: when full it evicts the single oldest-*inserted*
//! entry (FIFO, not LRU — read recency is irrelevant to survival), and
//! entries expire after a fixed TTL, purged lazily on lookup.
//!
//! ## Example
//!
//! ```rust
//! use agrodiag::cache::{CacheConfig, DiagnosisCache};
//! use std::time::Duration;
//!
//! let cache = DiagnosisCache::new(CacheConfig {
//!     ttl: Duration::from_secs(3600),
//!     max_entries: 100,
//! });
//! assert_eq!(cache.stats().size, 0);
//! ```

mod key;
mod store;

pub use key::CacheKey;
pub use store::{CacheConfig, CacheStats, DiagnosisCache};
