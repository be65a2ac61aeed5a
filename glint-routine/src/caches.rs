//! Typed specializations of the generic cache primitives.
//!
//! Each fixes the key/value types and supplies the loader, weight, and close
//! functions for one concrete resource kind; the cache contract itself is
//! inherited verbatim from [`glint`].

use std::hash::Hash;

use glint::{
    types::{RenderTargetDescriptor, ShadowMapDescriptor},
    BorrowCache, EvictionCache, ResourceLoader,
};

use crate::shaders::ShaderPath;

/// Identity of one compiled shader variant: the virtual path of its category
/// plus the label's code string.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ShaderKey {
    pub path: ShaderPath,
    pub code: &'static str,
}

/// Compiles and links shader programs. Implemented by the external shader
/// loading layer against the actual graphics api.
pub trait ShaderCompiler {
    type Program;
    type Error: std::error::Error + 'static;

    fn compile(&mut self, path: ShaderPath, code: &str) -> Result<Self::Program, Self::Error>;
    fn destroy(&mut self, program: Self::Program);
}

/// Loader adapter from [`ShaderCompiler`] to the cache seam. Programs weigh
/// 1 each; the capacity is a program count, not a byte budget.
pub struct ShaderProgramLoader<C> {
    compiler: C,
}

impl<C: ShaderCompiler> ResourceLoader for ShaderProgramLoader<C> {
    type Key = ShaderKey;
    type Value = C::Program;
    type Error = C::Error;

    fn load(&mut self, key: &ShaderKey) -> Result<C::Program, C::Error> {
        log::debug!("compiling shader {}/{}", key.path.virtual_path(), key.code);
        self.compiler.compile(key.path, key.code)
    }

    fn weight(&self, _key: &ShaderKey, _value: &C::Program) -> u64 {
        1
    }

    fn close(&mut self, program: C::Program) {
        self.compiler.destroy(program);
    }
}

/// Eviction cache of compiled shader programs, keyed by [`ShaderKey`].
pub type ShaderProgramCache<C> = EvictionCache<ShaderProgramLoader<C>>;

pub fn shader_program_cache<C: ShaderCompiler>(compiler: C, max_programs: u64) -> ShaderProgramCache<C> {
    EvictionCache::new(ShaderProgramLoader { compiler }, max_programs)
}

/// A render-target description the allocator understands and whose VRAM cost
/// is known up front.
pub trait TargetDescriptor: Eq + Hash + Clone {
    fn vram_footprint(&self) -> u64;
}

impl TargetDescriptor for ShadowMapDescriptor {
    fn vram_footprint(&self) -> u64 {
        ShadowMapDescriptor::vram_footprint(self)
    }
}

impl TargetDescriptor for RenderTargetDescriptor {
    fn vram_footprint(&self) -> u64 {
        RenderTargetDescriptor::vram_footprint(self)
    }
}

/// Allocates and frees GPU-side render targets per a description.
pub trait TargetAllocator<D: TargetDescriptor> {
    type Target;
    type Error: std::error::Error + 'static;

    fn allocate(&mut self, descriptor: &D) -> Result<Self::Target, Self::Error>;
    fn free(&mut self, target: Self::Target);
}

/// Loader adapter from [`TargetAllocator`] to the cache seam. The weight is
/// the descriptor's VRAM footprint, so cache capacity is a VRAM budget.
pub struct TargetLoader<A, D> {
    allocator: A,
    _descriptor: std::marker::PhantomData<D>,
}

impl<A, D> TargetLoader<A, D> {
    pub fn new(allocator: A) -> Self {
        Self {
            allocator,
            _descriptor: std::marker::PhantomData,
        }
    }
}

impl<A: TargetAllocator<D>, D: TargetDescriptor> ResourceLoader for TargetLoader<A, D> {
    type Key = D;
    type Value = A::Target;
    type Error = A::Error;

    fn load(&mut self, key: &D) -> Result<A::Target, A::Error> {
        self.allocator.allocate(key)
    }

    fn weight(&self, key: &D, _value: &A::Target) -> u64 {
        key.vram_footprint()
    }

    fn close(&mut self, target: A::Target) {
        self.allocator.free(target);
    }
}

/// Eviction cache of general offscreen framebuffers.
pub type RenderTargetCache<A> = EvictionCache<TargetLoader<A, RenderTargetDescriptor>>;

/// Borrow cache of shadow-map framebuffers. Shadow targets stay pinned for
/// the duration of the pass rendering into them.
pub type ShadowTargetCache<A> = BorrowCache<TargetLoader<A, ShadowMapDescriptor>>;

pub fn render_target_cache<A>(allocator: A, vram_budget: u64) -> RenderTargetCache<A>
where
    A: TargetAllocator<RenderTargetDescriptor>,
{
    EvictionCache::new(TargetLoader::new(allocator), vram_budget)
}

pub fn shadow_target_cache<A>(allocator: A, vram_budget: u64) -> ShadowTargetCache<A>
where
    A: TargetAllocator<ShadowMapDescriptor>,
{
    BorrowCache::new(TargetLoader::new(allocator), vram_budget)
}
