#![warn(unsafe_op_in_unsafe_fn)]

//! Type declarations for the glint resource-caching and shader-classification
//! layer.
//!
//! This is reexported in the glint crate proper and includes all the "surface"
//! api arguments shared between the core caches and the render routines.

use std::{fmt::Debug, hash::Hash, marker::PhantomData};

/// Reexport of the glam version glint is using.
pub use glam;
use glam::{Mat4, Vec3};

/// Non-owning resource handle.
///
/// Identifies a resource owned by an external collaborator (scene batcher,
/// geometry loader, light manager). Equality and hashing are structural over
/// the index and stable for the resource's lifetime, which is what makes these
/// usable as cache keys.
pub struct RawResourceHandle<T> {
    /// Underlying value of the handle.
    pub idx: usize,
    _phantom: PhantomData<T>,
}

impl<T> RawResourceHandle<T> {
    /// Creates a new handle with the given value
    pub const fn new(idx: usize) -> Self {
        Self {
            idx,
            _phantom: PhantomData,
        }
    }
}

// Need Debug/Copy/Clone/Eq/Hash impls that don't require T: Trait.
impl<T> Debug for RawResourceHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawResourceHandle").field("idx", &self.idx).finish()
    }
}

impl<T> Copy for RawResourceHandle<T> {}

impl<T> Clone for RawResourceHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for RawResourceHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.idx == other.idx
    }
}

impl<T> Eq for RawResourceHandle<T> {}

impl<T> Hash for RawResourceHandle<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.idx.hash(state);
    }
}

macro_rules! declare_handle {
    ($($name:ident, $tag:ident);* $(;)?) => {$(
        #[doc = concat!("Tag type for [`", stringify!($name), "`].")]
        pub struct $tag;

        #[doc = concat!("Handle to a ", stringify!($tag), "-tagged resource.")]
        pub type $name = RawResourceHandle<$tag>;
    )*};
}

declare_handle! {
    MeshHandle, MeshTag;
    TextureHandle, TextureTag;
    MaterialHandle, MaterialTag;
    LightHandle, LightTag;
}

/// The observer of the scene: the camera whose view the frame is rendered
/// from. Matrices are provided by the external transform layer once per frame.
#[derive(Debug, Copy, Clone)]
pub struct Observer {
    pub view: Mat4,
    pub projection: Mat4,
}

impl Observer {
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// Floating point precision of a render target's texel storage.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TexelPrecision {
    Half,
    Single,
}

impl TexelPrecision {
    /// Bytes per texel per stored plane.
    pub fn texel_size(self) -> u64 {
        match self {
            Self::Half => 2,
            Self::Single => 4,
        }
    }
}

impl Default for TexelPrecision {
    fn default() -> Self {
        Self::Single
    }
}

/// Which representation a light's shadow map uses.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ShadowVariant {
    /// Plain depth. One plane.
    Basic,
    /// Depth and depth-squared, for variance-based soft shadowing. Two planes.
    Variance,
}

impl ShadowVariant {
    pub fn plane_count(self) -> u64 {
        match self {
            Self::Basic => 1,
            Self::Variance => 2,
        }
    }
}

/// Complete description of one shadow map render target, keyed by the owning
/// light. Value-equal, so identical descriptions reuse the same cached target.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ShadowMapDescriptor {
    pub light: LightHandle,
    /// Edge length in pixels. Shadow maps are square.
    pub resolution: u32,
    pub precision: TexelPrecision,
    pub variant: ShadowVariant,
}

impl ShadowMapDescriptor {
    /// VRAM footprint of the described target in bytes.
    pub fn vram_footprint(&self) -> u64 {
        u64::from(self.resolution) * u64::from(self.resolution)
            * self.precision.texel_size()
            * self.variant.plane_count()
    }
}

/// Description of a general offscreen render target (postprocessing chains,
/// refraction capture). Value-equal, so identical descriptions share one
/// cached framebuffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RenderTargetDescriptor {
    pub width: u32,
    pub height: u32,
    pub precision: TexelPrecision,
    /// Color planes attached to the target.
    pub planes: u32,
}

impl RenderTargetDescriptor {
    /// VRAM footprint of the described target in bytes.
    pub fn vram_footprint(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
            * self.precision.texel_size()
            * u64::from(self.planes)
    }
}

/// A light that contributes to the per-frame shadow map set.
#[derive(Debug, Copy, Clone)]
pub struct ShadowCastingLight {
    pub handle: LightHandle,
    /// Direction the light points in.
    pub direction: Vec3,
    /// Resolution of the shadow map (in px).
    pub resolution: u32,
    pub precision: TexelPrecision,
    pub variant: ShadowVariant,
}

impl ShadowCastingLight {
    pub fn shadow_map_descriptor(&self) -> ShadowMapDescriptor {
        ShadowMapDescriptor {
            light: self.handle,
            resolution: self.resolution,
            precision: self.precision,
            variant: self.variant,
        }
    }
}
