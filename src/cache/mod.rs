//! Content-addressed fragment cache
//!
//! A unit's coverage fragment is keyed by the unit identifier and the
//! SHA-256 of every byte under its source directory. Same bytes = same
//! fragment, so the verification command can be skipped.
//!
//! # File States
//!
//! | File | Meaning |
//! |------|---------|
//! | `<key>.profile.<sum>` | Committed, reused while `<sum>` matches |
//! | `<key>.profile.<sum>.partial` | Written by a run that has not succeeded yet |
//! | `<key>.profile.<old>` | Stale, evicted after the next successful run |

pub mod checksum;
pub mod entry;
pub mod store;

pub use checksum::{checksum_dir, Checksum, DirHasher};
pub use entry::{CacheEntry, CacheFile, UnitKey};
pub use store::CacheStore;
