//! The label deciders.
//!
//! Each decider is a pure, total function from the declared input space to a
//! closed enumeration: every feature combination produces exactly one label,
//! enforced by exhaustive matching. Labels are derived data, recomputed per
//! instance per frame; the typed caches downstream absorb the cost of acting
//! on them.

use glint::types::ShadowVariant;

use crate::{
    material::{EnvironmentComponent, EnvironmentMixSource, MaterialFeatureSet, NormalSource, Transparency},
    shaders::ShaderPath,
};

/// Which forward shading variant an instance renders with.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RenderLabel {
    /// Opaque surface shaded by the light set.
    ForwardLit,
    /// Opaque surface ignoring all lights.
    ForwardUnlit,
    /// Plain alpha-blended surface.
    TranslucentRegular,
    /// Translucent surface sampling the scene behind it.
    TranslucentRefractive,
    /// Translucent surface showing only specular highlights.
    TranslucentSpecularOnly,
}

impl RenderLabel {
    /// Classifies an instance. `lit` is whether any light affects the
    /// instance; the material's own unlit flag overrides it.
    pub fn decide(features: &MaterialFeatureSet, lit: bool) -> Self {
        let lit = lit && !features.unlit;
        match features.transparency {
            Transparency::Opaque => {
                if lit {
                    Self::ForwardLit
                } else {
                    Self::ForwardUnlit
                }
            }
            Transparency::Constant { .. } | Transparency::Mapped(_) | Transparency::Uniform => {
                // Refraction is the most specific translucency, then the
                // specular-only restriction, then the plain blend.
                if features.refractive {
                    Self::TranslucentRefractive
                } else if features.specular_only {
                    Self::TranslucentSpecularOnly
                } else {
                    Self::TranslucentRegular
                }
            }
        }
    }

    /// Fixed shader-selection code of this variant.
    pub fn code(self) -> &'static str {
        match self {
            Self::ForwardLit => "forward_lit",
            Self::ForwardUnlit => "forward_unlit",
            Self::TranslucentRegular => "translucent_regular",
            Self::TranslucentRefractive => "translucent_refractive",
            Self::TranslucentSpecularOnly => "translucent_specular_only",
        }
    }

    /// Fixed number of texture units the variant's program binds.
    pub fn texture_units(self) -> u32 {
        match self {
            Self::ForwardLit => 4,
            Self::ForwardUnlit => 2,
            Self::TranslucentRegular => 4,
            Self::TranslucentRefractive => 5,
            Self::TranslucentSpecularOnly => 3,
        }
    }

    pub fn is_translucent(self) -> bool {
        matches!(
            self,
            Self::TranslucentRegular | Self::TranslucentRefractive | Self::TranslucentSpecularOnly
        )
    }
}

/// Whether and how environment reflection is applied.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EnvironmentLabel {
    /// No reflection contribution.
    None,
    /// Reflection blended with the constant mix weight.
    Reflective,
    /// Reflection with the mix weight modulated by the specular map.
    ReflectiveMapped,
}

impl EnvironmentLabel {
    /// Classifies the environment contribution of an instance.
    ///
    /// Reflection needs a normal, so a normal source of `None` forces the
    /// label off regardless of every other setting. It also needs an actual
    /// contribution: a bound environment texture with a strictly positive
    /// mix weight. The mapped sub-variant additionally needs a bound
    /// specular map configured as the mix source.
    pub fn decide(features: &MaterialFeatureSet) -> Self {
        if matches!(features.normal, NormalSource::None) {
            return Self::None;
        }

        match features.environment {
            EnvironmentComponent::None => Self::None,
            EnvironmentComponent::Texture { mix, mix_source, .. } => {
                // Written so a NaN mix also lands here.
                if !(mix > 0.0) {
                    Self::None
                } else if mix_source == EnvironmentMixSource::SpecularMap && features.specular.is_texture() {
                    Self::ReflectiveMapped
                } else {
                    Self::Reflective
                }
            }
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::None => "env_none",
            Self::Reflective => "env_reflective",
            Self::ReflectiveMapped => "env_reflective_mapped",
        }
    }

    pub fn texture_units(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Reflective => 1,
            Self::ReflectiveMapped => 2,
        }
    }
}

/// How the depth prepass reads an instance's alpha.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DepthLabel {
    /// Alpha is constant (or the material is opaque).
    Constant,
    /// Alpha is read from the material's alpha texture.
    Mapped,
    /// Alpha comes from a per-draw uniform.
    Uniform,
}

impl DepthLabel {
    /// Mirrors the parent material's depth mode.
    pub fn decide(features: &MaterialFeatureSet) -> Self {
        match features.transparency {
            Transparency::Opaque | Transparency::Constant { .. } => Self::Constant,
            Transparency::Mapped(_) => Self::Mapped,
            Transparency::Uniform => Self::Uniform,
        }
    }

    /// The 1:1 substitution into the variance-depth label set. Exhaustive by
    /// construction: a depth label without a variance counterpart does not
    /// compile.
    pub fn to_variance(self) -> DepthVarianceLabel {
        match self {
            Self::Constant => DepthVarianceLabel::Constant,
            Self::Mapped => DepthVarianceLabel::Mapped,
            Self::Uniform => DepthVarianceLabel::Uniform,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Constant => "depth_constant",
            Self::Mapped => "depth_mapped",
            Self::Uniform => "depth_uniform",
        }
    }

    pub fn texture_units(self) -> u32 {
        match self {
            Self::Constant => 0,
            Self::Mapped => 1,
            Self::Uniform => 0,
        }
    }
}

/// Depth labels for variance shadow maps, storing depth and depth squared.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DepthVarianceLabel {
    Constant,
    Mapped,
    Uniform,
}

impl DepthVarianceLabel {
    pub fn code(self) -> &'static str {
        match self {
            Self::Constant => "depth_variance_constant",
            Self::Mapped => "depth_variance_mapped",
            Self::Uniform => "depth_variance_uniform",
        }
    }

    pub fn texture_units(self) -> u32 {
        match self {
            Self::Constant => 0,
            Self::Mapped => 1,
            Self::Uniform => 0,
        }
    }
}

/// The complete classification of one instance: the per-axis labels plus
/// lit-ness. Hashable and cheap to copy, so batching keys on it directly.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct InstanceLabels {
    pub render: RenderLabel,
    pub environment: EnvironmentLabel,
    pub depth: DepthLabel,
    pub lit: bool,
}

impl InstanceLabels {
    /// Runs every axis decider. Pure; safe to call per instance per frame.
    pub fn decide(features: &MaterialFeatureSet, lights_present: bool) -> Self {
        let lit = lights_present && !features.unlit;
        Self {
            render: RenderLabel::decide(features, lights_present),
            environment: EnvironmentLabel::decide(features),
            depth: DepthLabel::decide(features),
            lit,
        }
    }

    /// The virtual path the instance's forward program is resolved under.
    pub fn shader_path(&self) -> ShaderPath {
        match (self.render.is_translucent(), self.lit) {
            (false, true) => ShaderPath::ForwardOpaqueLit,
            (false, false) => ShaderPath::ForwardOpaqueUnlit,
            (true, true) => ShaderPath::ForwardTranslucentLit,
            (true, false) => ShaderPath::ForwardTranslucentUnlit,
        }
    }

    /// Texture units the complete variant binds: forward variant plus the
    /// environment contribution.
    pub fn texture_units(&self) -> u32 {
        self.render.texture_units() + self.environment.texture_units()
    }
}

/// Selects the code path for one light's shadow pass. Basic maps reuse the
/// parent depth label; variance maps substitute it through
/// [`DepthLabel::to_variance`].
pub fn shadow_depth_selection(variant: ShadowVariant, parent: DepthLabel) -> (ShaderPath, &'static str) {
    match variant {
        ShadowVariant::Basic => (ShaderPath::Depth, parent.code()),
        ShadowVariant::Variance => (ShaderPath::DepthVariance, parent.to_variance().code()),
    }
}

#[cfg(test)]
mod tests {
    use glint::types::{ShadowVariant, TextureHandle};

    use super::{shadow_depth_selection, DepthLabel, DepthVarianceLabel, EnvironmentLabel, InstanceLabels, RenderLabel};
    use crate::{
        material::{
            EnvironmentComponent, EnvironmentMixSource, MaterialComponent, MaterialFeatureSet, NormalSource,
            Transparency,
        },
        shaders::ShaderPath,
    };

    fn texture(idx: usize) -> TextureHandle {
        TextureHandle::new(idx)
    }

    /// Every combination along the declared input axes. Values that the
    /// deciders treat as thresholds (mix weight) get one sample on each side.
    fn feature_space() -> Vec<MaterialFeatureSet> {
        let speculars = [
            MaterialComponent::None,
            MaterialComponent::Value(0.8),
            MaterialComponent::Texture(texture(0)),
        ];
        let environments = [
            EnvironmentComponent::None,
            EnvironmentComponent::Texture {
                texture: texture(1),
                mix: 0.0,
                mix_source: EnvironmentMixSource::Constant,
            },
            EnvironmentComponent::Texture {
                texture: texture(1),
                mix: 0.6,
                mix_source: EnvironmentMixSource::Constant,
            },
            EnvironmentComponent::Texture {
                texture: texture(1),
                mix: 0.6,
                mix_source: EnvironmentMixSource::SpecularMap,
            },
        ];
        let normals = [NormalSource::None, NormalSource::Vertex, NormalSource::Mapped(texture(2))];
        let transparencies = [
            Transparency::Opaque,
            Transparency::Constant { alpha: 0.5 },
            Transparency::Mapped(texture(3)),
            Transparency::Uniform,
        ];
        let bools = [false, true];

        let mut space = Vec::new();
        for specular in &speculars {
            for environment in &environments {
                for normal in &normals {
                    for transparency in &transparencies {
                        for &refractive in &bools {
                            for &specular_only in &bools {
                                for &unlit in &bools {
                                    space.push(MaterialFeatureSet {
                                        specular: specular.clone(),
                                        environment: environment.clone(),
                                        normal: normal.clone(),
                                        transparency: *transparency,
                                        refractive,
                                        specular_only,
                                        unlit,
                                    });
                                }
                            }
                        }
                    }
                }
            }
        }
        space
    }

    #[test]
    fn deciders_are_total() {
        // Exhaustive sweep: every input combination yields exactly one label
        // per axis, and the combined key agrees with the per-axis deciders.
        let space = feature_space();
        assert_eq!(space.len(), 3 * 4 * 3 * 4 * 2 * 2 * 2);

        for features in &space {
            for lights_present in [false, true] {
                let labels = InstanceLabels::decide(features, lights_present);
                assert_eq!(labels.render, RenderLabel::decide(features, lights_present));
                assert_eq!(labels.environment, EnvironmentLabel::decide(features));
                assert_eq!(labels.depth, DepthLabel::decide(features));
                assert_eq!(labels.lit, lights_present && !features.unlit);
                assert!(!labels.render.code().is_empty());
                assert!(!labels.environment.code().is_empty());
                assert!(!labels.depth.code().is_empty());
            }
        }
    }

    #[test]
    fn unlit_path_wins_over_everything() {
        let space = feature_space();
        for features in &space {
            // No lights at all.
            let no_lights = InstanceLabels::decide(features, false);
            assert!(!no_lights.lit);
            if !no_lights.render.is_translucent() {
                assert_eq!(no_lights.render, RenderLabel::ForwardUnlit);
            }

            // Material-forced unlit under a full light set.
            if features.unlit {
                let labels = InstanceLabels::decide(features, true);
                assert!(!labels.lit);
            }
        }
    }

    fn reflective_mapped_material() -> MaterialFeatureSet {
        MaterialFeatureSet {
            specular: MaterialComponent::Texture(texture(0)),
            environment: EnvironmentComponent::Texture {
                texture: texture(1),
                mix: 0.6,
                mix_source: EnvironmentMixSource::SpecularMap,
            },
            normal: NormalSource::Mapped(texture(2)),
            ..Default::default()
        }
    }

    #[test]
    fn environment_mapped_scenario() {
        let features = reflective_mapped_material();
        assert_eq!(EnvironmentLabel::decide(&features), EnvironmentLabel::ReflectiveMapped);
    }

    #[test]
    fn environment_zero_mix_disables_reflection() {
        let mut features = reflective_mapped_material();
        features.environment = EnvironmentComponent::Texture {
            texture: texture(1),
            mix: 0.0,
            mix_source: EnvironmentMixSource::SpecularMap,
        };
        assert_eq!(EnvironmentLabel::decide(&features), EnvironmentLabel::None);

        // A NaN mix weight is not a positive contribution either.
        features.environment = EnvironmentComponent::Texture {
            texture: texture(1),
            mix: f32::NAN,
            mix_source: EnvironmentMixSource::SpecularMap,
        };
        assert_eq!(EnvironmentLabel::decide(&features), EnvironmentLabel::None);
    }

    #[test]
    fn environment_needs_a_normal() {
        let mut features = reflective_mapped_material();
        features.normal = NormalSource::None;
        assert_eq!(EnvironmentLabel::decide(&features), EnvironmentLabel::None);
    }

    #[test]
    fn environment_plain_without_specular_map() {
        // Mix reads from the specular map, but no specular map is bound:
        // fall back to the plain reflective variant.
        let mut features = reflective_mapped_material();
        features.specular = MaterialComponent::Value(0.8);
        assert_eq!(EnvironmentLabel::decide(&features), EnvironmentLabel::Reflective);

        // Specular map bound but mix reads the constant: also plain.
        let mut features = reflective_mapped_material();
        features.environment = EnvironmentComponent::Texture {
            texture: texture(1),
            mix: 0.6,
            mix_source: EnvironmentMixSource::Constant,
        };
        assert_eq!(EnvironmentLabel::decide(&features), EnvironmentLabel::Reflective);
    }

    #[test]
    fn depth_variance_substitution_is_fixed() {
        assert_eq!(DepthLabel::Constant.to_variance(), DepthVarianceLabel::Constant);
        assert_eq!(DepthLabel::Mapped.to_variance(), DepthVarianceLabel::Mapped);
        assert_eq!(DepthLabel::Uniform.to_variance(), DepthVarianceLabel::Uniform);
    }

    #[test]
    fn translucency_priority() {
        let mut features = MaterialFeatureSet {
            transparency: Transparency::Uniform,
            refractive: true,
            specular_only: true,
            ..Default::default()
        };
        assert_eq!(
            RenderLabel::decide(&features, true),
            RenderLabel::TranslucentRefractive
        );

        features.refractive = false;
        assert_eq!(
            RenderLabel::decide(&features, true),
            RenderLabel::TranslucentSpecularOnly
        );

        features.specular_only = false;
        assert_eq!(RenderLabel::decide(&features, true), RenderLabel::TranslucentRegular);
    }

    #[test]
    fn shader_path_tracks_family_and_litness() {
        let opaque = MaterialFeatureSet::default();
        assert_eq!(
            InstanceLabels::decide(&opaque, true).shader_path(),
            ShaderPath::ForwardOpaqueLit
        );
        assert_eq!(
            InstanceLabels::decide(&opaque, false).shader_path(),
            ShaderPath::ForwardOpaqueUnlit
        );

        let translucent = MaterialFeatureSet {
            transparency: Transparency::Uniform,
            ..Default::default()
        };
        assert_eq!(
            InstanceLabels::decide(&translucent, true).shader_path(),
            ShaderPath::ForwardTranslucentLit
        );
        assert_eq!(
            InstanceLabels::decide(&translucent, false).shader_path(),
            ShaderPath::ForwardTranslucentUnlit
        );
    }

    #[test]
    fn shadow_selection_substitutes_for_variance() {
        assert_eq!(
            shadow_depth_selection(ShadowVariant::Basic, DepthLabel::Mapped),
            (ShaderPath::Depth, "depth_mapped")
        );
        assert_eq!(
            shadow_depth_selection(ShadowVariant::Variance, DepthLabel::Mapped),
            (ShaderPath::DepthVariance, "depth_variance_mapped")
        );
        assert_eq!(
            shadow_depth_selection(ShadowVariant::Variance, DepthLabel::Constant),
            (ShaderPath::DepthVariance, "depth_variance_constant")
        );
    }
}
