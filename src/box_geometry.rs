//! Corners, edges and faces of a volume's bounding box.

use log::debug;

use crate::math::{Transform, Vec3};
use crate::plane::Plane;
use crate::volume::VolumeGeometry;

/// Box edge as indices into [`VolumeBoxGeometry::vertices`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub v1: usize,
    pub v2: usize,
}

/// Box face as a cyclic quad of vertex indices plus the plane through its
/// first three vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    pub v1: usize,
    pub v2: usize,
    pub v3: usize,
    pub v4: usize,
    pub plane: Plane,
}

impl Face {
    pub fn indices(&self) -> [usize; 4] {
        [self.v1, self.v2, self.v3, self.v4]
    }
}

/*
 * Corner layout, index space:
 *
 *        7--------6
 *       /|       /|       k
 *      4--------5 |       |  j
 *      | 3------|-2       | /
 *      |/       |/        |/
 *      0--------1         +----- i
 */
const EDGES: [(usize, usize); 12] = [
    // bottom
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    // top
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    // vertical
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

// Winding gives outward normals for a right-handed index-to-world mapping.
const FACES: [[usize; 4]; 6] = [
    [0, 3, 2, 1], // k = 0
    [4, 5, 6, 7], // k = max
    [0, 1, 5, 4], // j = 0
    [3, 7, 6, 2], // j = max
    [0, 4, 7, 3], // i = 0
    [1, 2, 6, 5], // i = max
];

/// Immutable box geometry of one volume, optionally in a transformed frame.
///
/// A volume with fewer than three dimensions, or one below 2 voxels, gives a
/// permanently invalid geometry whose accessors return empty slices.
#[derive(Debug, Clone)]
pub struct VolumeBoxGeometry {
    vertices: Vec<Vec3>,
    edges: Vec<Edge>,
    faces: Vec<Face>,
}

impl VolumeBoxGeometry {
    pub fn new(volume: &dyn VolumeGeometry) -> Self {
        Self::build(volume, None)
    }

    pub fn with_transform(volume: &dyn VolumeGeometry, transform: &Transform) -> Self {
        Self::build(volume, Some(transform))
    }

    /// Corners are the volume's index corners mapped to world, then through
    /// `transform` when given. Edges and faces are built from those corners.
    pub fn build(volume: &dyn VolumeGeometry, transform: Option<&Transform>) -> Self {
        let dims = volume.dimensions();
        if dims.len() < 3 || dims[..3].iter().any(|&d| d < 2) {
            debug!("Box geometry for volume with dimensions {dims:?} is invalid");
            return Self::invalid();
        }

        let (imax, jmax, kmax) = (
            (dims[0] - 1) as f64,
            (dims[1] - 1) as f64,
            (dims[2] - 1) as f64,
        );
        let corners = [
            (0.0, 0.0, 0.0),
            (imax, 0.0, 0.0),
            (imax, jmax, 0.0),
            (0.0, jmax, 0.0),
            (0.0, 0.0, kmax),
            (imax, 0.0, kmax),
            (imax, jmax, kmax),
            (0.0, jmax, kmax),
        ];
        let vertices: Vec<Vec3> = corners
            .iter()
            .map(|&(i, j, k)| {
                let xyz = volume.index_to_world(i, j, k);
                match transform {
                    Some(t) => t.apply_point(&xyz),
                    None => xyz,
                }
            })
            .collect();

        let edges = EDGES.iter().map(|&(v1, v2)| Edge { v1, v2 }).collect();
        let faces = FACES
            .iter()
            .map(|&[v1, v2, v3, v4]| Face {
                v1,
                v2,
                v3,
                v4,
                plane: Plane::from_points(&vertices[v1], &vertices[v2], &vertices[v3]),
            })
            .collect();

        Self {
            vertices,
            edges,
            faces,
        }
    }

    fn invalid() -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.vertices.is_empty()
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// End points of an edge.
    pub fn edge_points(&self, edge: &Edge) -> (Vec3, Vec3) {
        (self.vertices[edge.v1], self.vertices[edge.v2])
    }

    /// Corner points of a face in winding order.
    pub fn face_points(&self, face: &Face) -> [Vec3; 4] {
        face.indices().map(|v| self.vertices[v])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::Volume;
    use approx::assert_relative_eq;
    use ndarray::Array3;

    fn unit_cube() -> Volume {
        Volume::new(Array3::zeros((2, 2, 2)), (1.0, 1.0, 1.0))
    }

    #[test]
    fn unit_cube_topology() {
        let geometry = VolumeBoxGeometry::new(&unit_cube());
        assert!(geometry.is_valid());
        assert_eq!(geometry.vertices().len(), 8);
        assert_eq!(geometry.edges().len(), 12);
        assert_eq!(geometry.faces().len(), 6);
        assert_relative_eq!(geometry.vertices()[6], Vec3::new(1.0, 1.0, 1.0));

        for edge in geometry.edges() {
            let (a, b) = geometry.edge_points(edge);
            assert_relative_eq!((b - a).norm(), 1.0);
        }
    }

    #[test]
    fn face_normals_point_outward() {
        let geometry = VolumeBoxGeometry::new(&unit_cube());
        let center = Vec3::new(0.5, 0.5, 0.5);
        for face in geometry.faces() {
            assert!(face.plane.is_valid());
            assert!(face.plane.signed_distance(&center) < 0.0);
            for p in geometry.face_points(face) {
                assert_relative_eq!(face.plane.signed_distance(&p), 0.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn thin_volume_is_invalid() {
        let volume = Volume::new(Array3::zeros((1, 4, 4)), (1.0, 1.0, 1.0));
        let geometry = VolumeBoxGeometry::new(&volume);
        assert!(!geometry.is_valid());
        assert!(geometry.vertices().is_empty());
        assert!(geometry.edges().is_empty());
        assert!(geometry.faces().is_empty());
    }

    #[test]
    fn transform_applied_to_corners() {
        let shift = Transform::translation(&Vec3::new(10.0, 0.0, 0.0));
        let geometry = VolumeBoxGeometry::with_transform(&unit_cube(), &shift);
        assert_relative_eq!(geometry.vertices()[0], Vec3::new(10.0, 0.0, 0.0));
        assert_relative_eq!(geometry.faces()[4].plane.point().x, 10.0);
    }
}
