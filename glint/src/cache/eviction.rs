use crate::{
    cache::{CacheError, CacheSize, ResourceLoader},
    util::typedefs::FastHashMap,
};

pub(super) struct Entry<V> {
    pub(super) value: V,
    pub(super) weight: u64,
    /// Stamp of the last access. Strictly monotonic across the cache, so
    /// recency ordering is total and ties cannot occur.
    pub(super) last_used: u64,
    /// Outstanding borrows. Nonzero means the entry is never evictable.
    pub(super) locks: u32,
}

/// Bounded key→value store with least-recently-used eviction.
///
/// `get` loads absent values through the [`ResourceLoader`] and evicts
/// least-recently-accessed entries until the configured weight capacity is
/// respected. After any completed operation the sum of entry weights is at
/// most the capacity.
///
/// Not safe for concurrent mutation from multiple threads; callers must
/// serialize access.
pub struct EvictionCache<L: ResourceLoader> {
    loader: L,
    entries: FastHashMap<L::Key, Entry<L::Value>>,
    total_weight: u64,
    capacity: u64,
    clock: u64,
}

impl<L: ResourceLoader> EvictionCache<L> {
    pub fn new(loader: L, capacity: u64) -> Self {
        Self {
            loader,
            entries: FastHashMap::default(),
            total_weight: 0,
            capacity,
            clock: 0,
        }
    }

    /// Returns the cached value, loading it on miss. Always refreshes
    /// recency. A failed load or a value that cannot fit leaves the cache
    /// exactly as it was; the loaded value is closed before returning the
    /// capacity error.
    pub fn get(&mut self, key: &L::Key) -> Result<&L::Value, CacheError<L::Error>> {
        self.clock += 1;
        let clock = self.clock;

        if let Some(entry) = self.entries.get_mut(key) {
            entry.last_used = clock;
        } else {
            profiling::scope!("EvictionCache::fill");

            let value = self.loader.load(key).map_err(CacheError::Load)?;
            let weight = self.loader.weight(key, &value);

            if let Err(err) = self.make_room(weight) {
                self.loader.close(value);
                return Err(err);
            }

            self.total_weight += weight;
            self.entries.insert(
                key.clone(),
                Entry {
                    value,
                    weight,
                    last_used: clock,
                    locks: 0,
                },
            );
        }

        Ok(&self.entries[key].value)
    }

    /// Shared access without refreshing recency. Used by the borrow layer to
    /// expose locked entries.
    pub fn peek(&self, key: &L::Key) -> Option<&L::Value> {
        self.entries.get(key).map(|entry| &entry.value)
    }

    pub fn contains(&self, key: &L::Key) -> bool {
        self.entries.contains_key(key)
    }

    /// Explicitly removes and closes an entry. Returns whether the key was
    /// present. Removing a borrowed entry is a programming error.
    pub fn remove(&mut self, key: &L::Key) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                assert_eq!(entry.locks, 0, "explicitly removed an entry with outstanding borrows");
                self.total_weight -= entry.weight;
                self.loader.close(entry.value);
                true
            }
            None => false,
        }
    }

    /// Removes and closes every unlocked entry.
    pub fn clear(&mut self) {
        let locked: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.locks != 0)
            .map(|(key, _)| key.clone())
            .collect();
        debug_assert!(locked.is_empty(), "cleared a cache with outstanding borrows");

        let retained = std::mem::take(&mut self.entries);
        self.total_weight = 0;
        for (key, entry) in retained {
            if entry.locks != 0 {
                self.total_weight += entry.weight;
                self.entries.insert(key, entry);
            } else {
                self.loader.close(entry.value);
            }
        }
    }

    pub fn size(&self) -> CacheSize {
        CacheSize {
            entries: self.entries.len(),
            weight: self.total_weight,
        }
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Evicts least-recently-used unlocked entries until `incoming` more
    /// weight fits. Checks feasibility up front: on failure nothing has been
    /// evicted.
    fn make_room(&mut self, incoming: u64) -> Result<(), CacheError<L::Error>> {
        let locked_weight: u64 = self
            .entries
            .values()
            .filter(|entry| entry.locks != 0)
            .map(|entry| entry.weight)
            .sum();
        let evictable = self.capacity - locked_weight;

        if locked_weight + incoming > self.capacity {
            return Err(CacheError::Capacity {
                weight: incoming,
                evictable,
                capacity: self.capacity,
            });
        }

        while self.total_weight + incoming > self.capacity {
            let victim = self
                .entries
                .iter()
                .filter(|(_, entry)| entry.locks == 0)
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| key.clone());

            // Feasibility was checked above, so an unlocked entry exists.
            let Some(victim) = victim else { unreachable!("over capacity with no evictable entry") };
            let entry = self.entries.remove(&victim).unwrap();
            self.total_weight -= entry.weight;
            log::debug!("evicting entry of weight {} (last used {})", entry.weight, entry.last_used);
            self.loader.close(entry.value);
        }

        Ok(())
    }

    /// Pins an entry against eviction. The entry must exist.
    pub(super) fn lock(&mut self, key: &L::Key) {
        let entry = self
            .entries
            .get_mut(key)
            .expect("locked a key that is not resident");
        entry.locks += 1;
    }

    /// Releases one pin, returning the remaining lock count. Unlocking an
    /// entry with no outstanding locks is a double release.
    pub(super) fn unlock(&mut self, key: &L::Key) -> u32 {
        let entry = self
            .entries
            .get_mut(key)
            .expect("released a key that is not resident");
        assert_ne!(entry.locks, 0, "release without a matching outstanding borrow");
        entry.locks -= 1;
        entry.locks
    }

    /// Total outstanding locks across all entries.
    pub(super) fn total_locks(&self) -> u64 {
        self.entries.values().map(|entry| u64::from(entry.locks)).sum()
    }

    #[cfg(test)]
    pub(super) fn lock_count(&self, key: &L::Key) -> u32 {
        self.entries.get(key).map_or(0, |entry| entry.locks)
    }
}

impl<L: ResourceLoader> Drop for EvictionCache<L> {
    fn drop(&mut self) {
        for (_, entry) in self.entries.drain() {
            if entry.locks != 0 {
                log::warn!("tearing down cache entry with {} outstanding borrows", entry.locks);
            }
            self.loader.close(entry.value);
        }
    }
}
