//! The two cache disciplines.
//!
//! [`EvictionCache`] is a bounded least-recently-used store with a pluggable
//! loader. [`BorrowCache`] layers checkout/release semantics on top of it so
//! resources in active use are immune to eviction for exactly as long as a
//! render pass holds them.

use std::hash::Hash;

mod borrow;
mod error;
mod eviction;
mod mesh_bounds;

pub use borrow::*;
pub use error::*;
pub use eviction::*;
pub use mesh_bounds::*;

/// Loads, weighs, and releases the concrete resource kind a cache holds.
///
/// Supplied by the external rendering layer per cache instance: shader
/// compilation, framebuffer allocation, and bounds computation all hide
/// behind this seam. `load` is synchronous and fast-but-fallible; `close`
/// must synchronously release the underlying GPU resource.
pub trait ResourceLoader {
    type Key: Eq + Hash + Clone;
    type Value;
    type Error: std::error::Error + 'static;

    /// Produce the value for a key. Failure propagates to the cache caller
    /// and leaves the cache unchanged.
    fn load(&mut self, key: &Self::Key) -> Result<Self::Value, Self::Error>;

    /// Size weight of a loaded value. Domain specific (1 per bounds entry,
    /// VRAM footprint for framebuffers) and never inferred.
    fn weight(&self, key: &Self::Key, value: &Self::Value) -> u64;

    /// Release the underlying resource. Runs on every eviction, explicit
    /// removal, and whole-cache teardown.
    fn close(&mut self, value: Self::Value);
}

/// Exact current occupancy of a cache.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CacheSize {
    /// Number of live entries.
    pub entries: usize,
    /// Sum of all live entry weights.
    pub weight: u64,
}
