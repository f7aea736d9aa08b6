//! Plane in 3D space, stored as unit normal and a reference point.

use crate::math::{LENGTH_EPSILON, Transform, Vec3, format_vec, try_normalize};

/// Signed distances within this of zero count as lying on the plane.
pub const PLANE_EPSILON: f64 = 1e-6;

/// A plane `normal · x = offset`.
///
/// Built from a zero (or near zero) normal the plane is invalid: every query
/// on it returns `None` or zero instead of dividing by the degenerate normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    normal: Vec3,
    point: Vec3,
    offset: f64,
    valid: bool,
}

impl Plane {
    /// Plane with `normal` through `point`. The normal is normalized.
    pub fn new(normal: &Vec3, point: &Vec3) -> Self {
        match try_normalize(normal) {
            Some(normal) => Self {
                normal,
                point: *point,
                offset: normal.dot(point),
                valid: true,
            },
            None => Self {
                normal: Vec3::zeros(),
                point: *point,
                offset: 0.0,
                valid: false,
            },
        }
    }

    /// Plane through three points, normal `(b - a) × (c - a)`.
    /// Collinear points give an invalid plane.
    pub fn from_points(a: &Vec3, b: &Vec3, c: &Vec3) -> Self {
        Self::new(&(b - a).cross(&(c - a)), a)
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Unit normal, zero for an invalid plane.
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn point(&self) -> Vec3 {
        self.point
    }

    pub fn signed_distance(&self, p: &Vec3) -> f64 {
        if !self.valid {
            return 0.0;
        }
        self.normal.dot(p) - self.offset
    }

    /// Closest point on the plane. An invalid plane returns `p` unchanged.
    pub fn project_point(&self, p: &Vec3) -> Vec3 {
        p - self.normal * self.signed_distance(p)
    }

    pub fn flipped(&self) -> Self {
        Self::new(&-self.normal, &self.point)
    }

    /// Plane mapped through an affine transform.
    pub fn transformed(&self, transform: &Transform) -> Self {
        if !self.valid {
            return *self;
        }
        let point = transform.apply_point(&self.point);
        let normal = match transform.without_translation().inverse() {
            Some(inv) => inv.matrix.transpose().fixed_view::<3, 3>(0, 0) * self.normal,
            None => Vec3::zeros(),
        };
        Self::new(&normal, &point)
    }

    /// Point where the segment `a`-`b` crosses the plane.
    ///
    /// An endpoint lying on the plane counts as a crossing. A segment lying
    /// entirely in the plane returns `None`; its endpoints are found through
    /// the neighbouring segments that touch the plane.
    pub fn intersect_segment(&self, a: &Vec3, b: &Vec3) -> Option<Vec3> {
        if !self.valid {
            return None;
        }
        let da = self.signed_distance(a);
        let db = self.signed_distance(b);
        let a_on = da.abs() <= PLANE_EPSILON;
        let b_on = db.abs() <= PLANE_EPSILON;

        match (a_on, b_on) {
            (true, true) => None,
            (true, false) => Some(*a),
            (false, true) => Some(*b),
            (false, false) => {
                if (da > 0.0) == (db > 0.0) {
                    return None;
                }
                let t = da / (da - db);
                Some(a + (b - a) * t)
            }
        }
    }

    /// Intersection of the ray `origin + t * direction`, `t >= 0`, with the
    /// plane. Returns the hit point and its distance from `origin`.
    pub fn intersect_ray(&self, origin: &Vec3, direction: &Vec3) -> Option<(Vec3, f64)> {
        if !self.valid {
            return None;
        }
        let direction = try_normalize(direction)?;
        let denom = self.normal.dot(&direction);
        if denom.abs() < LENGTH_EPSILON {
            return None;
        }
        let t = (self.offset - self.normal.dot(origin)) / denom;
        if t < -PLANE_EPSILON {
            return None;
        }
        let t = t.max(0.0);
        Some((origin + direction * t, t))
    }

    pub fn describe(&self) -> String {
        if self.valid {
            format!(
                "normal={} point={}",
                format_vec(&self.normal),
                format_vec(&self.point)
            )
        } else {
            "invalid".to_string()
        }
    }
}

impl Default for Plane {
    /// An invalid plane.
    fn default() -> Self {
        Self::new(&Vec3::zeros(), &Vec3::zeros())
    }
}
