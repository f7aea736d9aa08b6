//! Fixed-size vertex output for drawing a slice.
//!
//! The renderer always receives the same number of vertices: a fan of 8
//! or 6 independent triangles (18 vertices). Missing geometry is padded.

use bytemuck::{Pod, Zeroable};
use log::{error, warn};

use crate::box_geometry::VolumeBoxGeometry;
use crate::intersection::{
    IntersectionPolygon, MAX_POLYGON_VERTICES, PlaneVolumeIntersector, intersect_box_with_plane,
};
use crate::math::Vec3;
use crate::plane::Plane;
use crate::slice_view::{IntersectionMapping, VirtualSliceView};
use crate::texture::TextureCoordinateMapper;
use crate::volume::VolumeGeometry;

/// Vertices in a triangle fan: centroid, six vertices and the closing one.
pub const FAN_VERTEX_COUNT: usize = MAX_POLYGON_VERTICES + 2;

/// Vertices in the independent triangle list.
pub const TRIANGLES_VERTEX_COUNT: usize = MAX_POLYGON_VERTICES * 3;

/// One vertex as uploaded to the renderer.
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SliceVertex {
    pub xyz: [f32; 3],
    pub str: [f32; 3],
}

/// Coordinates for one slice primitive.
///
/// The three vectors have the same length and are indexed together.
#[derive(Debug, Clone, PartialEq)]
pub struct SlicePrimitive {
    /// World (stereotaxic) coordinates.
    pub stereotaxic_xyz: Vec<Vec3>,
    /// Coordinates in the view's drawing space.
    pub vertex_xyz: Vec<Vec3>,
    /// Normalized texture coordinates of the world points.
    pub texture_str: Vec<Vec3>,
    /// Plane through the first three world vertices, invalid unless `valid`.
    pub layers_drawing_plane: Plane,
    /// False when fewer than three real vertices were found.
    pub valid: bool,
}

impl SlicePrimitive {
    pub fn len(&self) -> usize {
        self.vertex_xyz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_xyz.is_empty()
    }

    /// Interleaved view coordinates and texture coordinates.
    pub fn vertices(&self) -> Vec<SliceVertex> {
        self.vertex_xyz
            .iter()
            .zip(&self.texture_str)
            .map(|(xyz, str)| SliceVertex {
                xyz: to_f32(xyz),
                str: to_f32(str),
            })
            .collect()
    }
}

fn to_f32(v: &Vec3) -> [f32; 3] {
    [v.x as f32, v.y as f32, v.z as f32]
}

/// A polygon position to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Centroid,
    Vertex(usize),
    /// Padding, zero in every space.
    Zero,
}

/// The same polygon in both spaces, vertex for vertex.
struct MappedPolygon {
    world: IntersectionPolygon,
    view: IntersectionPolygon,
}

impl VirtualSliceView {
    /// Slice polygon as a closed fan of exactly [`FAN_VERTEX_COUNT`] vertices.
    pub fn get_triangle_fan_coordinates(&self, volume: &dyn VolumeGeometry) -> SlicePrimitive {
        self.get_triangle_fan_coordinates_with_mapper(volume, &TextureCoordinateMapper::new(volume))
    }

    /// As [`Self::get_triangle_fan_coordinates`], with a mapper the caller
    /// keeps for the volume.
    pub fn get_triangle_fan_coordinates_with_mapper(
        &self,
        volume: &dyn VolumeGeometry,
        mapper: &TextureCoordinateMapper,
    ) -> SlicePrimitive {
        let polygon = self.slice_polygon(volume);
        let count = polygon.as_ref().map_or(0, |p| p.view.len());

        let mut slots = Vec::with_capacity(FAN_VERTEX_COUNT);
        slots.push(Slot::Centroid);
        slots.extend((0..count).map(Slot::Vertex));
        let first = if count > 0 { Slot::Vertex(0) } else { Slot::Zero };
        slots.resize(FAN_VERTEX_COUNT, first);

        emit(mapper, polygon.as_ref(), &slots, count)
    }

    /// Slice polygon as exactly [`MAX_POLYGON_VERTICES`] independent
    /// triangles around the centroid. Unused triangles are zero-area.
    pub fn get_triangles_coordinates(&self, volume: &dyn VolumeGeometry) -> SlicePrimitive {
        self.get_triangles_coordinates_with_mapper(volume, &TextureCoordinateMapper::new(volume))
    }

    /// As [`Self::get_triangles_coordinates`], with a mapper the caller
    /// keeps for the volume.
    pub fn get_triangles_coordinates_with_mapper(
        &self,
        volume: &dyn VolumeGeometry,
        mapper: &TextureCoordinateMapper,
    ) -> SlicePrimitive {
        let polygon = self.slice_polygon(volume);
        let count = polygon.as_ref().map_or(0, |p| p.view.len());

        let mut slots = Vec::with_capacity(TRIANGLES_VERTEX_COUNT);
        if count >= 3 {
            for i in 0..count {
                slots.extend([Slot::Centroid, Slot::Vertex(i), Slot::Vertex((i + 1) % count)]);
            }
        }
        slots.resize(TRIANGLES_VERTEX_COUNT, Slot::Zero);

        emit(mapper, polygon.as_ref(), &slots, count)
    }

    /// Intersection polygon in world and view space, truncated to
    /// [`MAX_POLYGON_VERTICES`]. `None` when intersection fails.
    fn slice_polygon(&self, volume: &dyn VolumeGeometry) -> Option<MappedPolygon> {
        let transform = self.transformation_matrix();
        let result = match self.mapping {
            IntersectionMapping::Identity => PlaneVolumeIntersector::new(volume, None)
                .intersect_with_plane(&self.intersection_plane)
                .map(|world| MappedPolygon {
                    view: world.clone(),
                    world,
                }),
            IntersectionMapping::WorldToView => PlaneVolumeIntersector::new(volume, None)
                .intersect_with_plane(&self.intersection_plane)
                .map(|world| MappedPolygon {
                    view: world.mapped(transform),
                    world,
                }),
            IntersectionMapping::IntersectorInverse => {
                PlaneVolumeIntersector::new(volume, Some(transform))
                    .intersect_with_plane(&self.intersection_plane)
                    .map(|world| MappedPolygon {
                        view: world.mapped(transform),
                        world,
                    })
            }
            IntersectionMapping::ViewInverse => {
                let geometry = VolumeBoxGeometry::with_transform(volume, transform);
                intersect_box_with_plane(&geometry, &self.intersection_plane).map(|view| {
                    MappedPolygon {
                        world: self.polygon_to_world(&view),
                        view,
                    }
                })
            }
        };

        let mut polygon = match result {
            Ok(polygon) => polygon,
            Err(e) => {
                warn!("Slice intersection failed: {e}");
                return None;
            }
        };

        let count = polygon.view.len();
        match count {
            0 => {}
            1 | 2 => warn!("Slice intersection has {count} vertices, at least 3 are needed"),
            3..=MAX_POLYGON_VERTICES => {}
            _ => {
                error!(
                    "Slice intersection has {count} vertices, truncating to {MAX_POLYGON_VERTICES}"
                );
                polygon.view.vertices.truncate(MAX_POLYGON_VERTICES);
                polygon.world.vertices.truncate(MAX_POLYGON_VERTICES);
            }
        }
        Some(polygon)
    }

    fn polygon_to_world(&self, view: &IntersectionPolygon) -> IntersectionPolygon {
        IntersectionPolygon {
            centroid: self.view_to_world(&view.centroid),
            vertices: view.vertices.iter().map(|v| self.view_to_world(v)).collect(),
        }
    }

    /// Map a view-space point back to world space.
    pub fn view_to_world(&self, xyz: &Vec3) -> Vec3 {
        match self.mapping {
            IntersectionMapping::Identity => *xyz,
            _ => match self.transformation_matrix().inverse() {
                Some(inverse) => inverse.apply_point(xyz),
                None => {
                    warn!(
                        "Slice transformation matrix is singular, using view coordinates as world"
                    );
                    *xyz
                }
            },
        }
    }

    /// Map a world point into view space.
    pub fn world_to_view(&self, xyz: &Vec3) -> Vec3 {
        match self.mapping {
            IntersectionMapping::Identity => *xyz,
            _ => self.transformation_matrix().apply_point(xyz),
        }
    }
}

/// Materialize `slots` in view, world and texture space. Padding slots are
/// zero in all three.
fn emit(
    mapper: &TextureCoordinateMapper,
    polygon: Option<&MappedPolygon>,
    slots: &[Slot],
    count: usize,
) -> SlicePrimitive {
    let resolve = |slot: Slot, p: &IntersectionPolygon| match slot {
        Slot::Centroid => p.centroid,
        Slot::Vertex(i) => p.vertices[i],
        Slot::Zero => Vec3::zeros(),
    };

    let mut vertex_xyz = Vec::with_capacity(slots.len());
    let mut stereotaxic_xyz = Vec::with_capacity(slots.len());
    let mut texture_str = Vec::with_capacity(slots.len());
    for &slot in slots {
        match (slot, polygon) {
            (Slot::Zero, _) | (_, None) => {
                vertex_xyz.push(Vec3::zeros());
                stereotaxic_xyz.push(Vec3::zeros());
                texture_str.push(Vec3::zeros());
            }
            (slot, Some(p)) => {
                let world = resolve(slot, &p.world);
                vertex_xyz.push(resolve(slot, &p.view));
                texture_str.push(mapper.map_xyz_to_str(&world));
                stereotaxic_xyz.push(world);
            }
        }
    }

    let valid = count >= 3;
    let layers_drawing_plane = if valid {
        Plane::from_points(&stereotaxic_xyz[0], &stereotaxic_xyz[1], &stereotaxic_xyz[2])
    } else {
        Plane::default()
    };

    SlicePrimitive {
        stereotaxic_xyz,
        vertex_xyz,
        texture_str,
        layers_drawing_plane,
        valid,
    }
}
