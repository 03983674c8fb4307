// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Time-windowed metadata cache
//!
//! Two tables keyed by case-folded canonical path: single items and folder
//! listings. Negative results ("not found") are cached too. The whole cache
//! is dropped once the refresh window has elapsed since the last clear, or
//! when [`MetadataCache::reset`] is called; there are no per-entry updates.

use crate::error::Result;
use crate::metadata::ItemMetadata;
use crate::path::{cache_key, normalize};
use crate::remote::RemoteResult;
use crate::translate::read_outcome;
use diagnostics::*;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_REFRESH_WINDOW: Duration = Duration::from_secs(300);

/// Cache policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Age after which every cached entry is considered absent
    pub refresh_window: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            refresh_window: DEFAULT_REFRESH_WINDOW,
        }
    }
}

/// Counters for tests and debug output
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub resets: u64,
    pub expirations: u64,
}

pub struct MetadataCache {
    config: CacheConfig,
    last_refresh: Instant,
    items: HashMap<String, Option<ItemMetadata>>,
    listings: HashMap<String, Option<Vec<ItemMetadata>>>,
    stats: CacheStats,
}

impl MetadataCache {
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            last_refresh: Instant::now(),
            items: HashMap::new(),
            listings: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    #[must_use]
    pub fn config(&self) -> CacheConfig {
        self.config
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Number of cached single-item entries, negative ones included
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn listing_count(&self) -> usize {
        self.listings.len()
    }

    /// Unconditionally clear both tables and restart the refresh window
    pub fn reset(&mut self) {
        self.clear();
        self.stats.resets += 1;
        debug!("MetadataCache: reset");
    }

    fn clear(&mut self) {
        self.items.clear();
        self.listings.clear();
        self.last_refresh = Instant::now();
    }

    /// Drop everything if the refresh window has elapsed
    fn revitalize(&mut self) {
        if self.last_refresh.elapsed() > self.config.refresh_window {
            self.clear();
            self.stats.expirations += 1;
            debug!("MetadataCache: refresh window elapsed, cache cleared");
        }
    }

    /// Metadata for one canonical path, fetching on a miss
    ///
    /// Not-found (and tombstoned items) come back as `None` and are
    /// remembered as such. Other remote failures are returned and nothing
    /// is cached.
    pub async fn get_item<F, Fut>(&mut self, path: &str, fetch: F) -> Result<Option<ItemMetadata>>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = RemoteResult<ItemMetadata>>,
    {
        self.revitalize();

        let key = cache_key(path);
        if let Some(cached) = self.items.get(&key) {
            self.stats.hits += 1;
            debug!("MetadataCache: item HIT for {path}", path: path);
            return Ok(cached.clone());
        }

        self.stats.misses += 1;
        debug!("MetadataCache: item MISS for {path}", path: path);

        let fetched = read_outcome(fetch(path.to_string()).await)?.filter(|item| !item.is_deleted);
        _ = self.items.insert(key, fetched.clone());
        Ok(fetched)
    }

    /// Children of one canonical folder path, fetching on a miss
    ///
    /// Tombstones are removed before the listing is cached or returned.
    /// Each listed child is also remembered in the item table under its own
    /// canonical path.
    pub async fn get_children<F, Fut>(
        &mut self,
        path: &str,
        fetch: F,
    ) -> Result<Option<Vec<ItemMetadata>>>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = RemoteResult<Vec<ItemMetadata>>>,
    {
        self.revitalize();

        let key = cache_key(path);
        if let Some(cached) = self.listings.get(&key) {
            self.stats.hits += 1;
            debug!("MetadataCache: listing HIT for {path}", path: path);
            return Ok(cached.clone());
        }

        self.stats.misses += 1;
        debug!("MetadataCache: listing MISS for {path}", path: path);

        let listing = read_outcome(fetch(path.to_string()).await)?.map(|entries| {
            entries
                .into_iter()
                .filter(|item| !item.is_deleted)
                .collect::<Vec<_>>()
        });

        if let Some(children) = &listing {
            for child in children {
                match self.items.entry(cache_key(&normalize(&child.path))) {
                    Entry::Vacant(slot) => {
                        _ = slot.insert(Some(child.clone()));
                    }
                    Entry::Occupied(mut slot) if slot.get().is_none() => {
                        _ = slot.insert(Some(child.clone()));
                    }
                    Entry::Occupied(_) => {}
                }
            }
        }

        _ = self.listings.insert(key, listing.clone());
        Ok(listing)
    }
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
