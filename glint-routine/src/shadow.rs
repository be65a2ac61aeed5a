//! Per-frame shadow-map dispatch.
//!
//! Runs once per frame, before any main batch consumes its output: every
//! shadow-casting light gets its map borrowed from the target cache and
//! rendered, the full light→map association is exposed to a continuation,
//! and every borrow is released before `evaluate` returns, success or not.

use glint::{
    types::{LightHandle, Observer, ShadowCastingLight, ShadowMapDescriptor, ShadowVariant},
    BorrowTicket, CacheError,
};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    caches::{ShadowTargetCache, TargetAllocator, TargetLoader},
    shaders::ShaderPath,
};

/// Renders the shadow pass for one light into a borrowed target. Implemented
/// by the external render layer; the dispatch only sequences these calls.
pub trait ShadowPassRenderer<T> {
    type Error: std::error::Error + 'static;

    fn render_shadow_pass(
        &mut self,
        observer: &Observer,
        light: &ShadowCastingLight,
        path: ShaderPath,
        target: &T,
    ) -> Result<(), Self::Error>;
}

/// Reason a whole `evaluate` call failed. There is no partial success: any
/// single light's failure aborts the frame's shadow set.
#[derive(Debug, Error)]
pub enum ShadowPassError<AE, RE, CE>
where
    AE: std::error::Error + 'static,
    RE: std::error::Error + 'static,
    CE: std::error::Error + 'static,
{
    /// The map for a light could not be borrowed (allocation failed or the
    /// VRAM budget is exhausted by pinned maps).
    #[error("could not obtain the shadow map for light {light:?}")]
    TargetUnavailable {
        light: LightHandle,
        #[source]
        source: CacheError<AE>,
    },
    /// A light's shadow render failed.
    #[error("shadow render failed for light {light:?}")]
    RenderFailed {
        light: LightHandle,
        #[source]
        source: RE,
    },
    /// The continuation itself failed; the shadow maps were all rendered.
    #[error("shadow continuation failed")]
    Continuation(#[source] CE),
}

/// The per-frame light→shadow-map association handed to the continuation.
/// Maps stay borrowed for exactly as long as this set is alive.
pub struct ShadowMapSet<'pass, T> {
    maps: Vec<(LightHandle, &'pass T)>,
}

impl<'pass, T> ShadowMapSet<'pass, T> {
    pub fn get(&self, light: LightHandle) -> Option<&'pass T> {
        self.maps
            .iter()
            .find_map(|&(handle, target)| (handle == light).then_some(target))
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LightHandle, &'pass T)> + '_ {
        self.maps.iter().copied()
    }
}

/// Where in the per-frame state machine the dispatch currently is.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ShadowPhase {
    /// Between frames.
    Idle,
    /// Gathering the frame's shadow casters.
    Collecting,
    /// Rendering the given light's map.
    Rendering(usize),
    /// All maps rendered; the continuation is running.
    Exposed,
}

/// Owns the shadow target cache and drives the per-frame dispatch.
pub struct ShadowRoutine<A: TargetAllocator<ShadowMapDescriptor>> {
    targets: ShadowTargetCache<A>,
    phase: ShadowPhase,
}

impl<A: TargetAllocator<ShadowMapDescriptor>> ShadowRoutine<A> {
    pub fn new(allocator: A, vram_budget: u64) -> Self {
        Self {
            targets: ShadowTargetCache::new(TargetLoader::new(allocator), vram_budget),
            phase: ShadowPhase::Idle,
        }
    }

    pub fn phase(&self) -> ShadowPhase {
        self.phase
    }

    pub fn target_cache(&self) -> &ShadowTargetCache<A> {
        &self.targets
    }

    /// Builds the frame's shadow map set and hands it to `continuation`.
    ///
    /// Each shadow caster's map is borrowed (basic or variance per the
    /// light's variant) and rendered in order. If any single light fails,
    /// the error propagates, the continuation never runs, and every
    /// already-taken borrow is released, returning lock counts to their
    /// pre-call values. On success the continuation's own result is passed
    /// through after the same unconditional release.
    pub fn evaluate<P, C, R, CE>(
        &mut self,
        observer: &Observer,
        shadow_casters: &[ShadowCastingLight],
        pass: &mut P,
        continuation: C,
    ) -> Result<R, ShadowPassError<A::Error, P::Error, CE>>
    where
        P: ShadowPassRenderer<A::Target>,
        C: FnOnce(&ShadowMapSet<'_, A::Target>) -> Result<R, CE>,
        CE: std::error::Error + 'static,
    {
        profiling::scope!("ShadowRoutine::evaluate");
        debug_assert_eq!(self.phase, ShadowPhase::Idle, "evaluate reentered mid-frame");
        self.phase = ShadowPhase::Collecting;

        let mut tickets: SmallVec<[BorrowTicket<ShadowMapDescriptor>; 4]> = SmallVec::new();
        let mut failure = None;

        for (index, light) in shadow_casters.iter().enumerate() {
            self.phase = ShadowPhase::Rendering(index);

            let descriptor = light.shadow_map_descriptor();
            let ticket = match self.targets.borrow(&descriptor) {
                Ok(ticket) => ticket,
                Err(source) => {
                    failure = Some(ShadowPassError::TargetUnavailable {
                        light: light.handle,
                        source,
                    });
                    break;
                }
            };

            let path = match light.variant {
                ShadowVariant::Basic => ShaderPath::Depth,
                ShadowVariant::Variance => ShaderPath::DepthVariance,
            };
            let rendered = pass.render_shadow_pass(observer, light, path, self.targets.peek(&ticket));
            tickets.push(ticket);

            if let Err(source) = rendered {
                failure = Some(ShadowPassError::RenderFailed {
                    light: light.handle,
                    source,
                });
                break;
            }
        }

        let result = match failure {
            Some(error) => Err(error),
            None => {
                self.phase = ShadowPhase::Exposed;
                let set = ShadowMapSet {
                    maps: tickets
                        .iter()
                        .map(|ticket| (ticket.key().light, self.targets.peek(ticket)))
                        .collect(),
                };
                continuation(&set).map_err(ShadowPassError::Continuation)
            }
        };

        // Unconditional release: lock counts return to their pre-call
        // values on every exit path.
        for ticket in tickets {
            self.targets.release(ticket);
        }
        self.phase = ShadowPhase::Idle;

        result
    }
}
