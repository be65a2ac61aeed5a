use thiserror::Error;

/// Reason a cache lookup failed.
///
/// Both variants are recoverable by the immediate caller (retry or skip) and
/// both guarantee the cache is exactly as it was before the call.
#[derive(Debug, Error)]
pub enum CacheError<E: std::error::Error + 'static> {
    /// The loader failed to produce a resource.
    #[error("loader failed to produce the requested resource")]
    Load(#[source] E),
    /// A single entry cannot fit in the evictable portion of the cache, even
    /// after every unlocked entry is removed. Fatal to this insertion only.
    #[error("entry of weight {weight} cannot fit: {evictable} evictable of {capacity} capacity")]
    Capacity {
        /// Weight of the entry that could not be inserted.
        weight: u64,
        /// Capacity not pinned down by borrowed entries.
        evictable: u64,
        /// Configured capacity ceiling.
        capacity: u64,
    },
}
