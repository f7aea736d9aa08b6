//! Plane and ray intersection with a volume's bounding box.

use std::f64::consts::TAU;

use log::{error, warn};

use crate::box_geometry::VolumeBoxGeometry;
use crate::error::{MprError, Result};
use crate::math::{Transform, Vec3, format_vec, try_normalize};
use crate::plane::Plane;
use crate::volume::VolumeGeometry;

/// A plane crosses at most six edges of a box.
pub const MAX_POLYGON_VERTICES: usize = 6;

/// Minimum |cos| between polygon winding normal and plane normal.
pub const ORIENTATION_CONSISTENCY: f64 = 0.9;

/// Slack on the signed areas of the point-in-face test.
pub const POINT_IN_FACE_TOLERANCE: f64 = 1e-4;

/// Edge crossings closer than this are one point (plane through a corner).
pub const DUPLICATE_POINT_TOLERANCE: f64 = 1e-4;

/// Where a plane cuts a box.
///
/// Holds 0 (miss), 1 (corner touch), 2 (edge touch) or 3 to 6 vertices.
/// With three or more, vertices run counter-clockwise about the
/// intersecting plane's normal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntersectionPolygon {
    pub centroid: Vec3,
    pub vertices: Vec<Vec3>,
}

impl IntersectionPolygon {
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// True when there are enough vertices to draw a slice.
    pub fn is_drawable(&self) -> bool {
        self.vertices.len() >= 3
    }

    pub(crate) fn mapped(&self, transform: &Transform) -> Self {
        Self {
            centroid: transform.apply_point(&self.centroid),
            vertices: self
                .vertices
                .iter()
                .map(|v| transform.apply_point(v))
                .collect(),
        }
    }
}

/// A ray hit on a box face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub xyz: Vec3,
    pub distance: f64,
}

/// Intersect `plane` with the box edges of `geometry`, in the geometry's
/// own frame. No mapping back through any transform is done here.
pub fn intersect_box_with_plane(
    geometry: &VolumeBoxGeometry,
    plane: &Plane,
) -> Result<IntersectionPolygon> {
    if !geometry.is_valid() {
        return Err(MprError::InvalidGeometry);
    }
    if !plane.is_valid() {
        return Err(MprError::InvalidPlane(plane.describe()));
    }

    let mut points: Vec<Vec3> = Vec::with_capacity(MAX_POLYGON_VERTICES);
    for edge in geometry.edges() {
        let (a, b) = geometry.edge_points(edge);
        if let Some(p) = plane.intersect_segment(&a, &b) {
            if !points
                .iter()
                .any(|q| (q - p).norm() < DUPLICATE_POINT_TOLERANCE)
            {
                points.push(p);
            }
        }
    }

    if points.is_empty() {
        return Ok(IntersectionPolygon::default());
    }

    let centroid = points.iter().sum::<Vec3>() / points.len() as f64;
    if points.len() < 3 {
        return Ok(IntersectionPolygon {
            centroid,
            vertices: points,
        });
    }

    let normal = plane.normal();
    sort_by_angle(&mut points, &centroid, &normal);
    orient_to_normal(&mut points, &centroid, &normal);

    if points.len() > MAX_POLYGON_VERTICES {
        error!(
            "Plane intersected box in {} points, there should never be more than {}",
            points.len(),
            MAX_POLYGON_VERTICES
        );
        points.truncate(MAX_POLYGON_VERTICES);
    }

    Ok(IntersectionPolygon {
        centroid,
        vertices: points,
    })
}

/// Sort by signed angle about `normal`, measured from the first point.
fn sort_by_angle(points: &mut [Vec3], centroid: &Vec3, normal: &Vec3) {
    let reference = points[0] - centroid;
    let angle = |p: &Vec3| -> f64 {
        let v = p - centroid;
        let a = normal.dot(&reference.cross(&v)).atan2(reference.dot(&v));
        if a < 0.0 { a + TAU } else { a }
    };
    points.sort_by(|a, b| {
        angle(a)
            .partial_cmp(&angle(b))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Reverse the points when their winding opposes `normal`.
fn orient_to_normal(points: &mut [Vec3], centroid: &Vec3, normal: &Vec3) {
    let winding = try_normalize(&(points[0] - centroid).cross(&(points[1] - centroid)));
    let dot = winding.map_or(0.0, |w| w.dot(normal));
    if dot < -ORIENTATION_CONSISTENCY {
        points.reverse();
    } else if dot <= ORIENTATION_CONSISTENCY {
        error!(
            "Intersection polygon winding is inconsistent with plane normal {} (dot={dot:.4})",
            format_vec(normal)
        );
    }
}

/// Point-in-triangle by the signs of the three sub-triangle areas.
fn point_in_triangle(p: &Vec3, a: &Vec3, b: &Vec3, c: &Vec3, normal: &Vec3) -> bool {
    let areas = [
        normal.dot(&(b - a).cross(&(p - a))),
        normal.dot(&(c - b).cross(&(p - b))),
        normal.dot(&(a - c).cross(&(p - c))),
    ];
    areas.iter().all(|&s| s >= -POINT_IN_FACE_TOLERANCE)
        || areas.iter().all(|&s| s <= POINT_IN_FACE_TOLERANCE)
}

/// Intersects planes and rays with the bounding box of one volume.
///
/// With a transform the box is intersected in the transformed frame and
/// every output point is mapped back through the inverse transform.
#[derive(Debug, Clone)]
pub struct PlaneVolumeIntersector {
    geometry: VolumeBoxGeometry,
    inverse: Option<Transform>,
}

impl PlaneVolumeIntersector {
    pub fn new(volume: &dyn VolumeGeometry, transform: Option<&Transform>) -> Self {
        let inverse = transform.and_then(|t| {
            let inverse = t.inverse();
            if inverse.is_none() {
                warn!("Intersection transform is singular, output stays in transformed space");
            }
            inverse
        });
        Self {
            geometry: VolumeBoxGeometry::build(volume, transform),
            inverse,
        }
    }

    pub fn geometry(&self) -> &VolumeBoxGeometry {
        &self.geometry
    }

    pub fn intersect_with_plane(&self, plane: &Plane) -> Result<IntersectionPolygon> {
        let polygon = intersect_box_with_plane(&self.geometry, plane)?;
        Ok(match &self.inverse {
            Some(inverse) => polygon.mapped(inverse),
            None => polygon,
        })
    }

    /// Hits of the ray on the box faces, nearest first.
    pub fn intersect_with_ray(&self, origin: &Vec3, direction: &Vec3) -> Vec<RayHit> {
        if !self.geometry.is_valid() {
            return Vec::new();
        }

        let mut hits: Vec<RayHit> = Vec::with_capacity(2);
        for face in self.geometry.faces() {
            let Some((xyz, distance)) = face.plane.intersect_ray(origin, direction) else {
                continue;
            };
            let [p1, p2, p3, p4] = self.geometry.face_points(face);
            let normal = face.plane.normal();
            let inside = point_in_triangle(&xyz, &p1, &p2, &p3, &normal)
                || point_in_triangle(&xyz, &p1, &p3, &p4, &normal);
            if inside {
                hits.push(RayHit { xyz, distance });
            }
        }

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        // Edge and corner hits are found on every face sharing them
        hits.dedup_by(|b, a| (b.distance - a.distance).abs() < DUPLICATE_POINT_TOLERANCE);

        if let Some(inverse) = &self.inverse {
            for hit in &mut hits {
                hit.xyz = inverse.apply_point(&hit.xyz);
            }
        }
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::Volume;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use ndarray::Array3;

    fn unit_cube() -> Volume {
        Volume::new(Array3::zeros((2, 2, 2)), (1.0, 1.0, 1.0))
    }

    fn contains(points: &[Vec3], p: Vec3) -> bool {
        points.iter().any(|q| (q - p).norm() < 1e-9)
    }

    /// Signed areas of consecutive triples, projected onto `normal`.
    fn turn_signs(polygon: &IntersectionPolygon, normal: &Vec3) -> Vec<f64> {
        let v = &polygon.vertices;
        let n = v.len();
        (0..n)
            .map(|i| {
                let a = v[i];
                let b = v[(i + 1) % n];
                let c = v[(i + 2) % n];
                normal.dot(&(b - a).cross(&(c - b)))
            })
            .collect()
    }

    #[test]
    fn horizontal_plane_through_center() {
        let intersector = PlaneVolumeIntersector::new(&unit_cube(), None);
        let plane = Plane::new(&Vec3::z(), &Vec3::new(0.5, 0.5, 0.5));
        let polygon = intersector.intersect_with_plane(&plane).unwrap();

        assert_eq!(polygon.len(), 4);
        assert_relative_eq!(polygon.centroid, Vec3::new(0.5, 0.5, 0.5));
        for p in [
            Vec3::new(0.0, 0.0, 0.5),
            Vec3::new(1.0, 0.0, 0.5),
            Vec3::new(1.0, 1.0, 0.5),
            Vec3::new(0.0, 1.0, 0.5),
        ] {
            assert!(contains(&polygon.vertices, p));
        }
        assert!(turn_signs(&polygon, &Vec3::z()).iter().all(|&s| s > 0.0));
    }

    #[test]
    fn plane_above_box_misses() {
        let intersector = PlaneVolumeIntersector::new(&unit_cube(), None);
        let plane = Plane::new(&Vec3::z(), &Vec3::new(0.5, 0.5, 2.0));
        let polygon = intersector.intersect_with_plane(&plane).unwrap();
        assert!(polygon.is_empty());
    }

    #[test]
    fn corner_touch_is_one_point() {
        let intersector = PlaneVolumeIntersector::new(&unit_cube(), None);
        let plane = Plane::new(&Vec3::new(1.0, 1.0, 1.0), &Vec3::new(1.0, 1.0, 1.0));
        let polygon = intersector.intersect_with_plane(&plane).unwrap();
        assert_eq!(polygon.len(), 1);
        assert_relative_eq!(polygon.vertices[0], Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn edge_touch_is_two_points() {
        let intersector = PlaneVolumeIntersector::new(&unit_cube(), None);
        let plane = Plane::new(&Vec3::new(1.0, 1.0, 0.0), &Vec3::new(1.0, 1.0, 0.0));
        let polygon = intersector.intersect_with_plane(&plane).unwrap();
        assert_eq!(polygon.len(), 2);
        assert!(!polygon.is_drawable());
    }

    #[test]
    fn diagonal_plane_gives_hexagon() {
        let intersector = PlaneVolumeIntersector::new(&unit_cube(), None);
        let normal = Vec3::new(1.0, 1.0, 1.0);
        let plane = Plane::new(&normal, &Vec3::new(0.5, 0.5, 0.5));
        let polygon = intersector.intersect_with_plane(&plane).unwrap();
        assert_eq!(polygon.len(), 6);
        assert!(turn_signs(&polygon, &normal).iter().all(|&s| s > 0.0));
    }

    #[test]
    fn reversed_normal_reverses_winding() {
        let intersector = PlaneVolumeIntersector::new(&unit_cube(), None);
        let normal = Vec3::new(-1.0, -1.0, -1.0);
        let plane = Plane::new(&normal, &Vec3::new(0.5, 0.5, 0.5));
        let polygon = intersector.intersect_with_plane(&plane).unwrap();
        assert_eq!(polygon.len(), 6);
        assert!(turn_signs(&polygon, &normal).iter().all(|&s| s > 0.0));
    }

    #[test]
    fn corner_cut_gives_triangle() {
        let intersector = PlaneVolumeIntersector::new(&unit_cube(), None);
        let plane = Plane::new(&Vec3::new(1.0, 1.0, 1.0), &Vec3::new(0.2, 0.0, 0.0));
        let polygon = intersector.intersect_with_plane(&plane).unwrap();
        assert_eq!(polygon.len(), 3);
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let intersector = PlaneVolumeIntersector::new(&unit_cube(), None);
        assert!(matches!(
            intersector.intersect_with_plane(&Plane::default()),
            Err(MprError::InvalidPlane(_))
        ));

        let flat = Volume::new(Array3::zeros((1, 2, 2)), (1.0, 1.0, 1.0));
        let intersector = PlaneVolumeIntersector::new(&flat, None);
        let plane = Plane::new(&Vec3::z(), &Vec3::zeros());
        assert!(matches!(
            intersector.intersect_with_plane(&plane),
            Err(MprError::InvalidGeometry)
        ));
        assert!(intersector.intersect_with_ray(&Vec3::zeros(), &Vec3::z()).is_empty());
    }

    #[test]
    fn transformed_box_maps_back() {
        let volume = Volume::new(Array3::zeros((4, 3, 5)), (1.0, 2.0, 0.5));
        let pivot = Vec3::new(2.0, 2.0, 0.75);
        let transform = Transform::about_pivot(
            &pivot,
            &Transform::rotation_about_axis(&Vec3::new(0.3, 1.0, 0.2), 0.6),
        );
        let plane = Plane::new(&Vec3::new(0.2, -0.4, 1.0), &pivot);

        // Same plane, expressed in the transformed frame
        let rotated = PlaneVolumeIntersector::new(&volume, Some(&transform));
        let moved_plane = plane.transformed(&transform);
        let from_rotated = rotated.intersect_with_plane(&moved_plane).unwrap();

        let direct = PlaneVolumeIntersector::new(&volume, None)
            .intersect_with_plane(&plane)
            .unwrap();

        assert_eq!(from_rotated.len(), direct.len());
        assert_abs_diff_eq!(from_rotated.centroid, direct.centroid, epsilon = 1e-4);
        for p in &from_rotated.vertices {
            assert!(direct.vertices.iter().any(|q| (q - p).norm() < 1e-4));
        }
    }

    #[test]
    fn singular_transform_keeps_transformed_space() {
        // Flattens the box onto z = 0
        let mut flatten = Transform::identity();
        flatten.matrix[(2, 2)] = 0.0;
        let intersector = PlaneVolumeIntersector::new(&unit_cube(), Some(&flatten));

        let plane = Plane::new(&Vec3::x(), &Vec3::new(0.5, 0.0, 0.0));
        let polygon = intersector.intersect_with_plane(&plane).unwrap();
        assert_eq!(polygon.len(), 2);
        assert!(contains(&polygon.vertices, Vec3::new(0.5, 0.0, 0.0)));
        assert!(contains(&polygon.vertices, Vec3::new(0.5, 1.0, 0.0)));
    }

    #[test]
    fn transformed_ray_hits_map_back() {
        let transform = Transform::translation(&Vec3::new(10.0, 0.0, 0.0)).compose(
            &Transform::about_pivot(
                &Vec3::new(0.5, 0.5, 0.5),
                &Transform::rotation_z(std::f64::consts::FRAC_PI_2),
            ),
        );
        let intersector = PlaneVolumeIntersector::new(&unit_cube(), Some(&transform));

        let hits = intersector
            .intersect_with_ray(&Vec3::new(10.5, 0.5, 5.0), &Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(hits.len(), 2);
        assert_abs_diff_eq!(hits[0].xyz, Vec3::new(0.5, 0.5, 1.0), epsilon = 1e-9);
        assert_abs_diff_eq!(hits[1].xyz, Vec3::new(0.5, 0.5, 0.0), epsilon = 1e-9);
        assert_abs_diff_eq!(hits[0].distance, 4.0, epsilon = 1e-9);
        assert!(hits[0].distance < hits[1].distance);
    }

    #[test]
    fn ray_hits_nearest_first() {
        let intersector = PlaneVolumeIntersector::new(&unit_cube(), None);
        let hits = intersector
            .intersect_with_ray(&Vec3::new(0.5, 0.5, 5.0), &Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(hits.len(), 2);
        assert_relative_eq!(hits[0].xyz, Vec3::new(0.5, 0.5, 1.0));
        assert_relative_eq!(hits[1].xyz, Vec3::new(0.5, 0.5, 0.0));
        assert!(hits[0].distance < hits[1].distance);
    }

    #[test]
    fn ray_missing_box() {
        let intersector = PlaneVolumeIntersector::new(&unit_cube(), None);
        let hits = intersector
            .intersect_with_ray(&Vec3::new(3.0, 0.5, 5.0), &Vec3::new(0.0, 0.0, -1.0));
        assert!(hits.is_empty());
    }

    #[test]
    fn ray_through_edge_is_not_duplicated() {
        let intersector = PlaneVolumeIntersector::new(&unit_cube(), None);
        // Enters on the top/right edge, leaves on the bottom/left edge
        let hits = intersector
            .intersect_with_ray(&Vec3::new(2.0, 0.5, 2.0), &Vec3::new(-1.0, 0.0, -1.0));
        assert_eq!(hits.len(), 2);
        assert_abs_diff_eq!(hits[0].xyz, Vec3::new(1.0, 0.5, 1.0), epsilon = 1e-9);
        assert_abs_diff_eq!(hits[1].xyz, Vec3::new(0.0, 0.5, 0.0), epsilon = 1e-9);
    }
}
