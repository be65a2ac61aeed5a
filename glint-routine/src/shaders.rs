//! The fixed virtual-path namespace shader programs are resolved under.
//!
//! The external shader loader turns a path plus a label's code string into an
//! actual compiled program; nothing here touches shader source text.

/// Logical shader category. One per distinct code path of the renderer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderPath {
    ForwardOpaqueLit,
    ForwardOpaqueUnlit,
    ForwardTranslucentLit,
    ForwardTranslucentUnlit,
    Depth,
    DepthVariance,
    Postprocessing,
}

impl ShaderPath {
    /// The logical path the shader loader resolves this category under.
    pub fn virtual_path(self) -> &'static str {
        match self {
            Self::ForwardOpaqueLit => "forward/opaque-lit",
            Self::ForwardOpaqueUnlit => "forward/opaque-unlit",
            Self::ForwardTranslucentLit => "forward/translucent-lit",
            Self::ForwardTranslucentUnlit => "forward/translucent-unlit",
            Self::Depth => "depth/basic",
            Self::DepthVariance => "depth/variance",
            Self::Postprocessing => "postprocessing",
        }
    }
}
