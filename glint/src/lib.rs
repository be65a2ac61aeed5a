#![warn(unsafe_op_in_unsafe_fn)]

//! Bounded caches for expensive GPU-backed resources.
//!
//! Rendering a frame touches the same compiled shaders, render targets, and
//! mesh bounds over and over. This crate keeps those artifacts alive in
//! bounded pools: an eviction ([`EvictionCache`]) discipline for resources
//! that can be dropped and rebuilt at will, and a borrow ([`BorrowCache`])
//! discipline for resources that must survive exactly as long as a render
//! pass is using them.
//!
//! All caches are single-threaded by design: every operation runs on the one
//! thread that owns the graphics context, and callers serialize access. No
//! component here takes an internal lock.

mod cache;
pub mod util;

pub use cache::*;

/// Reexport of the types crate.
pub use glint_types as types;
