//! Types which make up the material feature set examined by the label
//! deciders.

use glint::types::TextureHandle;

bitflags::bitflags! {
    /// Flags which shaders use to determine properties of a material
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
    pub struct MaterialFlags : u32 {
        const SPECULAR_ACTIVE =      0b0000_0000_0001;
        const SPECULAR_FROM_MAP =    0b0000_0000_0010;
        const ENVIRONMENT_ACTIVE =   0b0000_0000_0100;
        const ENVIRONMENT_MAPPED =   0b0000_0000_1000;
        const NORMAL_MAPPED =        0b0000_0001_0000;
        const ALPHA_CONSTANT =       0b0000_0010_0000;
        const ALPHA_MAPPED =         0b0000_0100_0000;
        const ALPHA_UNIFORM =        0b0000_1000_0000;
        const REFRACTIVE =           0b0001_0000_0000;
        const SPECULAR_ONLY =        0b0010_0000_0000;
        const UNLIT =                0b0100_0000_0000;
    }
}

/// Generic container for a component of a material that could either be from
/// a texture or a fixed value.
#[derive(Debug, Clone)]
pub enum MaterialComponent<T> {
    None,
    Value(T),
    Texture(TextureHandle),
    TextureValue { texture: TextureHandle, value: T },
}

impl<T> Default for MaterialComponent<T> {
    fn default() -> Self {
        Self::None
    }
}

impl<T: Copy> MaterialComponent<T> {
    pub fn to_value(&self, default: T) -> T {
        match *self {
            Self::Value(value) | Self::TextureValue { value, .. } => value,
            Self::None | Self::Texture(_) => default,
        }
    }

    pub fn is_texture(&self) -> bool {
        matches!(*self, Self::Texture(..) | Self::TextureValue { .. })
    }

    pub fn to_texture(&self) -> Option<&TextureHandle> {
        match *self {
            Self::None | Self::Value(_) => None,
            Self::Texture(ref texture) | Self::TextureValue { ref texture, .. } => Some(texture),
        }
    }
}

/// Where the environment reflection's mix weight is read from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EnvironmentMixSource {
    /// The fixed mix value alone.
    Constant,
    /// The specular map modulates the mix per texel. Needs a bound specular
    /// map to take effect.
    SpecularMap,
}

impl Default for EnvironmentMixSource {
    fn default() -> Self {
        Self::Constant
    }
}

/// How environment reflection contributes to the surface.
#[derive(Debug, Clone)]
pub enum EnvironmentComponent {
    /// No environment texture bound.
    None,
    /// Environment texture bound, blended in with the given weight.
    Texture {
        texture: TextureHandle,
        /// Blend weight. A weight of zero disables reflection entirely.
        mix: f32,
        mix_source: EnvironmentMixSource,
    },
}

impl Default for EnvironmentComponent {
    fn default() -> Self {
        Self::None
    }
}

impl EnvironmentComponent {
    pub fn to_texture(&self) -> Option<&TextureHandle> {
        match *self {
            Self::None => None,
            Self::Texture { ref texture, .. } => Some(texture),
        }
    }

    /// Whether reflection actually contributes: a texture is bound and its
    /// mix weight is strictly positive.
    pub fn is_active(&self) -> bool {
        match *self {
            Self::None => false,
            Self::Texture { mix, .. } => mix > 0.0,
        }
    }
}

/// How normals should be derived.
#[derive(Debug, Clone)]
pub enum NormalSource {
    /// No normals at all. Rules out anything that needs one, environment
    /// reflection included.
    None,
    /// Interpolated vertex normals.
    Vertex,
    /// Normals read from a texture.
    Mapped(TextureHandle),
}

impl Default for NormalSource {
    fn default() -> Self {
        Self::Vertex
    }
}

impl NormalSource {
    pub fn to_texture(&self) -> Option<&TextureHandle> {
        match *self {
            Self::None | Self::Vertex => None,
            Self::Mapped(ref texture) => Some(texture),
        }
    }
}

/// How transparency should be handled in a material.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Transparency {
    /// Alpha is completely ignored.
    Opaque,
    /// Alpha is the given constant.
    Constant { alpha: f32 },
    /// Alpha is read from the given texture.
    Mapped(TextureHandle),
    /// Alpha comes from a per-draw uniform.
    Uniform,
}

impl Default for Transparency {
    fn default() -> Self {
        Self::Opaque
    }
}

impl Transparency {
    pub fn to_debug_str(self) -> &'static str {
        match self {
            Transparency::Opaque => "opaque",
            Transparency::Constant { .. } => "constant",
            Transparency::Mapped(_) => "mapped",
            Transparency::Uniform => "uniform",
        }
    }
}

/// The fully-resolved surface description of one instance, as the label
/// deciders see it. Pure data; building one performs no graphics work.
#[derive(Debug, Clone, Default)]
pub struct MaterialFeatureSet {
    pub specular: MaterialComponent<f32>,
    pub environment: EnvironmentComponent,
    pub normal: NormalSource,
    pub transparency: Transparency,
    /// Refraction sampling behind the surface.
    pub refractive: bool,
    /// Translucent surface that only shows specular highlights.
    pub specular_only: bool,
    /// Material opts out of lighting regardless of the light set.
    pub unlit: bool,
}

impl MaterialFeatureSet {
    /// The flag word handed to shaders alongside the chosen labels.
    pub fn to_flags(&self) -> MaterialFlags {
        let mut flags = MaterialFlags::empty();

        match self.specular {
            MaterialComponent::None => {}
            MaterialComponent::Value(_) => flags |= MaterialFlags::SPECULAR_ACTIVE,
            MaterialComponent::Texture(_) | MaterialComponent::TextureValue { .. } => {
                flags |= MaterialFlags::SPECULAR_ACTIVE | MaterialFlags::SPECULAR_FROM_MAP
            }
        }

        if self.environment.is_active() {
            flags |= MaterialFlags::ENVIRONMENT_ACTIVE;
            if let EnvironmentComponent::Texture {
                mix_source: EnvironmentMixSource::SpecularMap,
                ..
            } = self.environment
            {
                flags |= MaterialFlags::ENVIRONMENT_MAPPED;
            }
        }

        if matches!(self.normal, NormalSource::Mapped(_)) {
            flags |= MaterialFlags::NORMAL_MAPPED;
        }

        match self.transparency {
            Transparency::Opaque => {}
            Transparency::Constant { .. } => flags |= MaterialFlags::ALPHA_CONSTANT,
            Transparency::Mapped(_) => flags |= MaterialFlags::ALPHA_MAPPED,
            Transparency::Uniform => flags |= MaterialFlags::ALPHA_UNIFORM,
        }

        flags.set(MaterialFlags::REFRACTIVE, self.refractive);
        flags.set(MaterialFlags::SPECULAR_ONLY, self.specular_only);
        flags.set(MaterialFlags::UNLIT, self.unlit);

        flags
    }
}
