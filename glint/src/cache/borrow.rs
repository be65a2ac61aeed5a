use crate::cache::{CacheError, CacheSize, EvictionCache, ResourceLoader};

/// Proof of one outstanding borrow of one cache entry.
///
/// Deliberately neither `Clone` nor `Copy`: the only way to settle a ticket
/// is to hand it back to [`BorrowCache::release`], so lock counts track
/// outstanding borrows one-to-one.
#[must_use = "a borrow pins its entry against eviction until released"]
#[derive(Debug)]
pub struct BorrowTicket<K> {
    key: K,
}

impl<K> BorrowTicket<K> {
    pub fn key(&self) -> &K {
        &self.key
    }
}

/// An [`EvictionCache`] with checkout/release semantics layered on top.
///
/// `borrow` loads the entry through the delegate and pins it; a pinned entry
/// is never selected for eviction, no matter how much pressure the cache is
/// under. Borrowing the same key again pins it again; the entry becomes
/// evictable only once every outstanding ticket has been released.
///
/// Used for resources that must survive exactly the duration of one render
/// pass, like a variance framebuffer borrowed for a shadow pass.
pub struct BorrowCache<L: ResourceLoader> {
    inner: EvictionCache<L>,
}

impl<L: ResourceLoader> BorrowCache<L> {
    pub fn new(loader: L, capacity: u64) -> Self {
        Self {
            inner: EvictionCache::new(loader, capacity),
        }
    }

    /// Fetches the entry through the delegate (loading on miss) and pins it.
    ///
    /// Failure is the delegate's failure: the load failed, or nothing
    /// unlocked could be evicted to make room. Either way no pin was taken.
    pub fn borrow(&mut self, key: &L::Key) -> Result<BorrowTicket<L::Key>, CacheError<L::Error>> {
        self.inner.get(key)?;
        self.inner.lock(key);
        Ok(BorrowTicket { key: key.clone() })
    }

    /// Shared access to a borrowed value. Does not refresh recency; the pin
    /// already protects the entry.
    pub fn peek(&self, ticket: &BorrowTicket<L::Key>) -> &L::Value {
        self.inner
            .peek(&ticket.key)
            .expect("borrowed entry missing from delegate cache")
    }

    /// Settles one borrow. Releasing more times than `borrow` was called is
    /// a double release and panics; it indicates a defect, not a runtime
    /// condition.
    pub fn release(&mut self, ticket: BorrowTicket<L::Key>) {
        self.inner.unlock(&ticket.key);
    }

    /// Plain recency-refreshing access for callers that do not need a pin.
    pub fn get(&mut self, key: &L::Key) -> Result<&L::Value, CacheError<L::Error>> {
        self.inner.get(key)
    }

    pub fn size(&self) -> CacheSize {
        self.inner.size()
    }

    pub fn capacity(&self) -> u64 {
        self.inner.capacity()
    }

    /// Number of borrows taken and not yet released, summed over all
    /// entries. Zero means every entry is evictable again.
    pub fn outstanding_borrows(&self) -> u64 {
        self.inner.total_locks()
    }

    #[cfg(test)]
    pub(crate) fn lock_count(&self, key: &L::Key) -> u32 {
        self.inner.lock_count(key)
    }
}

#[cfg(test)]
mod tests {
    use super::BorrowCache;
    use crate::cache::{eviction::tests::TestLoader, CacheError};

    #[test]
    fn borrowed_entries_survive_pressure() {
        let loader = TestLoader::new();
        let closed = loader.closed.clone();
        let mut cache = BorrowCache::new(loader, 2);

        let ticket = cache.borrow(&"a").unwrap();
        cache.get(&"b").unwrap();
        // a is oldest but pinned, so c's insertion must evict b.
        cache.get(&"c").unwrap();

        assert_eq!(*closed.borrow(), ["b"]);
        assert_eq!(cache.peek(&ticket), "a");
        cache.release(ticket);
    }

    #[test]
    fn nested_borrows_release_one_by_one() {
        let loader = TestLoader::new();
        let mut cache = BorrowCache::new(loader, 2);

        let first = cache.borrow(&"a").unwrap();
        let second = cache.borrow(&"a").unwrap();
        assert_eq!(cache.lock_count(&"a"), 2);

        cache.release(first);
        assert_eq!(cache.lock_count(&"a"), 1);

        // With both entries pinned there is nothing left to evict.
        let b = cache.borrow(&"b").unwrap();
        let err = cache.get(&"c").unwrap_err();
        assert!(matches!(err, CacheError::Capacity { .. }));

        // One pin on a remains, so c must displace b, not a.
        cache.release(b);
        cache.get(&"c").unwrap();
        assert!(cache.get(&"a").is_ok());
        assert_eq!(cache.lock_count(&"a"), 1);

        cache.release(second);
        assert_eq!(cache.lock_count(&"a"), 0);
    }

    #[test]
    fn fully_locked_cache_fails_capacity_without_corruption() {
        let loader = TestLoader::new();
        let closed = loader.closed.clone();
        let mut cache = BorrowCache::new(loader, 2);

        let a = cache.borrow(&"a").unwrap();
        let b = cache.borrow(&"b").unwrap();

        let err = cache.get(&"c").unwrap_err();
        assert!(matches!(
            err,
            CacheError::Capacity {
                weight: 1,
                evictable: 0,
                capacity: 2
            }
        ));

        // The refused value was closed, the pinned entries were not.
        assert_eq!(*closed.borrow(), ["c"]);
        assert_eq!(cache.size().entries, 2);
        assert_eq!(cache.peek(&a), "a");
        assert_eq!(cache.peek(&b), "b");

        cache.release(a);
        cache.release(b);
    }

    #[test]
    #[should_panic(expected = "release without a matching outstanding borrow")]
    fn double_release_panics() {
        let loader = TestLoader::new();
        let mut cache = BorrowCache::new(loader, 2);

        let ticket = cache.borrow(&"a").unwrap();
        // Forge a second ticket for the same key to simulate a bookkeeping
        // defect in the caller.
        let forged = super::BorrowTicket { key: "a" };
        cache.release(ticket);
        cache.release(forged);
    }

    #[test]
    fn bookkeeping_matches_outstanding_borrows() {
        let loader = TestLoader::new();
        let mut cache = BorrowCache::new(loader, 4);

        let mut tickets = Vec::new();
        for _ in 0..3 {
            tickets.push(cache.borrow(&"a").unwrap());
        }
        tickets.push(cache.borrow(&"b").unwrap());
        assert_eq!(cache.lock_count(&"a"), 3);
        assert_eq!(cache.lock_count(&"b"), 1);

        for ticket in tickets {
            cache.release(ticket);
        }
        assert_eq!(cache.lock_count(&"a"), 0);
        assert_eq!(cache.lock_count(&"b"), 0);
    }
}
