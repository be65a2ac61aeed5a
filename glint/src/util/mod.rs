//! Various utilities.

pub mod bounds;
pub mod typedefs;
