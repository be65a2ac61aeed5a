//! Axis-aligned bounds and bounding spheres computed from mesh geometry.

use glam::{Mat4, Vec3, Vec3A, Vec4Swizzles};

/// Axis-aligned bounding box of a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub fn from_positions(positions: &[Vec3]) -> Self {
        let first = if let Some(first) = positions.first() {
            Vec3A::from(*first)
        } else {
            return Self {
                min: Vec3::ZERO,
                max: Vec3::ZERO,
            };
        };

        let mut max = first;
        let mut min = max;

        for pos in positions.iter().skip(1) {
            let pos = Vec3A::from(*pos);
            max = max.max(pos);
            min = min.min(pos);
        }

        Self {
            min: Vec3::from(min),
            max: Vec3::from(max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.max + self.min) / 2.0
    }

    pub fn half_extent(&self) -> Vec3 {
        (self.max - self.min) / 2.0
    }
}

/// Represents a point in space and a radius from that point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    pub fn from_positions(positions: &[Vec3]) -> Self {
        let center = Vec3A::from(BoundingBox::from_positions(positions).center());
        let radius = find_bounding_sphere_radius(center, positions);

        Self {
            center: Vec3::from(center),
            radius,
        }
    }

    pub fn apply_transform(self, model_view: Mat4) -> Self {
        let max_scale = model_view
            .x_axis
            .xyz()
            .length_squared()
            .max(
                model_view
                    .y_axis
                    .xyz()
                    .length_squared()
                    .max(model_view.z_axis.xyz().length_squared()),
            )
            .sqrt();
        let center = model_view * self.center.extend(1.0);

        Self {
            center: center.truncate(),
            radius: max_scale * self.radius,
        }
    }
}

fn find_bounding_sphere_radius(center: Vec3A, positions: &[Vec3]) -> f32 {
    positions.iter().fold(0.0, |distance, pos| {
        distance.max((Vec3A::from(*pos) - center).length())
    })
}

/// Precomputed bounds of one mesh, cached per mesh identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshBounds {
    pub aabb: BoundingBox,
    pub sphere: BoundingSphere,
}

impl MeshBounds {
    pub fn from_positions(positions: &[Vec3]) -> Self {
        Self {
            aabb: BoundingBox::from_positions(positions),
            sphere: BoundingSphere::from_positions(positions),
        }
    }
}
