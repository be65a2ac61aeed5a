//! Shader-label classification and shadow-map dispatch for glint.
//!
//! The [`material::MaterialFeatureSet`] describes what an instance's surface
//! can do; the [`label`] deciders collapse that continuous space into the
//! small closed set of labels that pick a precompiled shader variant and key
//! batching. The typed [`caches`] keep the selected programs and render
//! targets alive, and [`shadow::ShadowRoutine`] builds the per-frame shadow
//! map set before the main batches consume it.

pub mod caches;
pub mod label;
pub mod material;
pub mod shaders;
pub mod shadow;
