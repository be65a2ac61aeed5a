use glam::Vec3;
use glint_types::MeshHandle;

use crate::{
    cache::{EvictionCache, ResourceLoader},
    util::bounds::MeshBounds,
};

/// Provides the position stream of a mesh. Implemented by the external
/// geometry layer; the cache never touches vertex data except through this.
pub trait MeshSource {
    type Error: std::error::Error + 'static;

    fn positions(&mut self, mesh: MeshHandle) -> Result<Vec<Vec3>, Self::Error>;
}

/// Loader computing [`MeshBounds`] from a [`MeshSource`]'s geometry.
///
/// Bounds are plain cpu-side data, so every entry weighs 1 and the close
/// hook has nothing to release.
pub struct MeshBoundsLoader<S> {
    source: S,
}

impl<S> MeshBoundsLoader<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

impl<S: MeshSource> ResourceLoader for MeshBoundsLoader<S> {
    type Key = MeshHandle;
    type Value = MeshBounds;
    type Error = S::Error;

    fn load(&mut self, key: &MeshHandle) -> Result<MeshBounds, S::Error> {
        let positions = self.source.positions(*key)?;
        Ok(MeshBounds::from_positions(&positions))
    }

    fn weight(&self, _key: &MeshHandle, _value: &MeshBounds) -> u64 {
        1
    }

    fn close(&mut self, _value: MeshBounds) {}
}

/// Eviction cache over precomputed mesh bounds, capacity counted in entries.
pub type MeshBoundsCache<S> = EvictionCache<MeshBoundsLoader<S>>;

pub fn mesh_bounds_cache<S: MeshSource>(source: S, max_entries: u64) -> MeshBoundsCache<S> {
    EvictionCache::new(MeshBoundsLoader::new(source), max_entries)
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use glam::Vec3;
    use glint_types::MeshHandle;
    use thiserror::Error;

    use super::{mesh_bounds_cache, MeshSource};

    #[derive(Debug, Error)]
    #[error("no such mesh")]
    struct NoSuchMesh;

    struct FixedMeshes {
        fetches: Rc<Cell<usize>>,
    }

    impl MeshSource for FixedMeshes {
        type Error = NoSuchMesh;

        fn positions(&mut self, mesh: MeshHandle) -> Result<Vec<Vec3>, NoSuchMesh> {
            self.fetches.set(self.fetches.get() + 1);
            match mesh.idx {
                0 => Ok(vec![Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 2.0, 0.0)]),
                _ => Err(NoSuchMesh),
            }
        }
    }

    #[test]
    fn bounds_computed_once_per_mesh() {
        let fetches = Rc::new(Cell::new(0));
        let mut cache = mesh_bounds_cache(
            FixedMeshes {
                fetches: fetches.clone(),
            },
            16,
        );

        let bounds = *cache.get(&MeshHandle::new(0)).unwrap();
        assert_eq!(bounds.aabb.min, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(bounds.aabb.max, Vec3::new(1.0, 2.0, 0.0));

        let again = *cache.get(&MeshHandle::new(0)).unwrap();
        assert_eq!(bounds, again);
        assert_eq!(fetches.get(), 1);
    }

    #[test]
    fn missing_geometry_propagates() {
        let mut cache = mesh_bounds_cache(
            FixedMeshes {
                fetches: Rc::default(),
            },
            16,
        );
        assert!(cache.get(&MeshHandle::new(9)).is_err());
        assert_eq!(cache.size().entries, 0);
    }
}
