//! World coordinates to normalized texture (STR) coordinates.

use log::debug;

use crate::math::{Transform, Vec3};
use crate::volume::VolumeGeometry;

/// Texel-center default returned by an invalid mapper.
pub const DEFAULT_STR: Vec3 = Vec3::new(0.5, 0.5, 0.5);

/// Maps world XYZ to voxel index space and to `[0,1]^3` texture space.
///
/// Built once per volume. The affine index-to-world mapping is recovered
/// from the volume's origin and its three unit index steps.
#[derive(Debug, Clone)]
pub struct TextureCoordinateMapper {
    world_to_index: Option<Transform>,
    dims: [f64; 3],
}

impl TextureCoordinateMapper {
    pub fn new(volume: &dyn VolumeGeometry) -> Self {
        let dimensions = volume.dimensions();
        if dimensions.len() < 3 || dimensions[..3].iter().any(|&d| d < 1) {
            debug!("Texture mapper for volume with dimensions {dimensions:?} is invalid");
            return Self::invalid();
        }

        let index_to_world = index_to_world_transform(volume);
        let world_to_index = index_to_world.inverse();
        if world_to_index.is_none() {
            debug!("Volume index to world transform is singular, texture mapper invalid");
        }

        Self {
            world_to_index,
            dims: [
                dimensions[0] as f64,
                dimensions[1] as f64,
                dimensions[2] as f64,
            ],
        }
    }

    fn invalid() -> Self {
        Self {
            world_to_index: None,
            dims: [0.0; 3],
        }
    }

    pub fn is_valid(&self) -> bool {
        self.world_to_index.is_some()
    }

    /// Continuous voxel index of a world coordinate.
    pub fn world_to_index(&self, xyz: &Vec3) -> Option<Vec3> {
        self.world_to_index.map(|m| m.apply_point(xyz))
    }

    /// True when `xyz` falls inside a voxel of the volume.
    pub fn contains(&self, xyz: &Vec3) -> bool {
        match self.world_to_index(xyz) {
            Some(ijk) => (0..3).all(|a| {
                let index = ijk[a].round();
                index >= 0.0 && index < self.dims[a]
            }),
            None => false,
        }
    }

    /// Texture coordinate of `xyz`; voxel `i` maps to `(i + 0.5) / n`.
    pub fn map_xyz_to_str(&self, xyz: &Vec3) -> Vec3 {
        match self.world_to_index(xyz) {
            Some(ijk) => Vec3::from_fn(|a, _| ((ijk[a] + 0.5) / self.dims[a]).clamp(0.0, 1.0)),
            None => DEFAULT_STR,
        }
    }
}

/// Affine index-to-world transform of a volume, rebuilt from the world
/// position of index origin and of one step along each index axis.
pub fn index_to_world_transform(volume: &dyn VolumeGeometry) -> Transform {
    let origin = volume.index_to_world(0.0, 0.0, 0.0);
    let di = volume.index_to_world(1.0, 0.0, 0.0) - origin;
    let dj = volume.index_to_world(0.0, 1.0, 0.0) - origin;
    let dk = volume.index_to_world(0.0, 0.0, 1.0) - origin;

    let mut transform = Transform::translation(&origin);
    transform.matrix.fixed_view_mut::<3, 1>(0, 0).copy_from(&di);
    transform.matrix.fixed_view_mut::<3, 1>(0, 1).copy_from(&dj);
    transform.matrix.fixed_view_mut::<3, 1>(0, 2).copy_from(&dk);
    transform
}
