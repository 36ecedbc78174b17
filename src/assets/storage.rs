//! Keyed, reference-counted asset store.
//!
//! Every decoded texture lives here behind an `Arc`, addressed by a slotmap
//! handle. Loads are keyed by their source ([`ImageSource::cache_key`]), so a
//! cover image used by many spreads is decoded and stored once. Each user of
//! a keyed asset holds one reference; the asset and its key go away with the
//! last [`release`](AssetStorage::release).
//!
//! [`ImageSource::cache_key`]: crate::assets::ImageSource::cache_key

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use slotmap::{Key, SlotMap};

struct Entry<T> {
    asset: Arc<T>,
    key: Option<String>,
    refs: usize,
}

struct Slots<H: Key, T> {
    assets: SlotMap<H, Entry<T>>,
    by_key: FxHashMap<String, H>,
}

/// Thread-safe asset container shared between loader threads and the frame loop.
pub struct AssetStorage<H: Key, T> {
    slots: RwLock<Slots<H, T>>,
}

impl<H: Key, T> Default for AssetStorage<H, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Key, T> AssetStorage<H, T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(Slots {
                assets: SlotMap::default(),
                by_key: FxHashMap::default(),
            }),
        }
    }

    /// Stores an unkeyed asset with one reference.
    pub fn add(&self, asset: impl Into<T>) -> H {
        self.slots.write().assets.insert(Entry {
            asset: Arc::new(asset.into()),
            key: None,
            refs: 1,
        })
    }

    /// Stores `asset` under `key` and takes a reference to it. If the key is
    /// already present the first asset wins: its count goes up and `asset`
    /// is dropped.
    pub fn add_with_key(&self, key: &str, asset: impl Into<T>) -> H {
        let mut slots = self.slots.write();
        if let Some(&handle) = slots.by_key.get(key) {
            if let Some(entry) = slots.assets.get_mut(handle) {
                entry.refs += 1;
            }
            return handle;
        }
        let handle = slots.assets.insert(Entry {
            asset: Arc::new(asset.into()),
            key: Some(key.to_string()),
            refs: 1,
        });
        slots.by_key.insert(key.to_string(), handle);
        handle
    }

    /// Takes a reference to the asset stored under `key`, if any.
    pub fn acquire_by_key(&self, key: &str) -> Option<H> {
        let mut slots = self.slots.write();
        let handle = *slots.by_key.get(key)?;
        slots.assets.get_mut(handle)?.refs += 1;
        Some(handle)
    }

    /// Takes another reference to `handle`. Returns `false` if it is gone.
    pub fn retain(&self, handle: H) -> bool {
        match self.slots.write().assets.get_mut(handle) {
            Some(entry) => {
                entry.refs += 1;
                true
            }
            None => false,
        }
    }

    /// Drops one reference. Returns `true` if that was the last one and the
    /// asset was removed.
    pub fn release(&self, handle: H) -> bool {
        let mut slots = self.slots.write();
        let Some(entry) = slots.assets.get_mut(handle) else {
            return false;
        };
        entry.refs = entry.refs.saturating_sub(1);
        if entry.refs > 0 {
            return false;
        }
        if let Some(key) = slots.assets.remove(handle).and_then(|e| e.key) {
            slots.by_key.remove(&key);
        }
        true
    }

    pub fn get(&self, handle: H) -> Option<Arc<T>> {
        self.slots.read().assets.get(handle).map(|e| Arc::clone(&e.asset))
    }

    pub fn get_handle_by_key(&self, key: &str) -> Option<H> {
        self.slots.read().by_key.get(key).copied()
    }

    /// Current reference count of `handle`, 0 if it is not stored.
    pub fn ref_count(&self, handle: H) -> usize {
        self.slots.read().assets.get(handle).map_or(0, |e| e.refs)
    }

    /// Removes an asset regardless of its references.
    pub fn remove(&self, handle: H) -> Option<Arc<T>> {
        let mut slots = self.slots.write();
        let entry = slots.assets.remove(handle)?;
        if let Some(key) = &entry.key {
            slots.by_key.remove(key);
        }
        Some(entry.asset)
    }

    pub fn len(&self) -> usize {
        self.slots.read().assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
