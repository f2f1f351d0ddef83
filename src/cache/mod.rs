//! Cache module for storing API responses to disk
//!
//! This module provides the on-disk store behind the client's force-cache
//! requests: once a response has been stored it is returned in place of a
//! network round-trip until the cache is cleared.

mod manager;

pub use manager::{CacheManager, CachedData};
