//! Vector and affine transform types.
//!
//! Thin wrappers around nalgebra. Points and directions share [`Vec3`];
//! whether translation applies is decided by the [`Transform`] method used.

use std::fmt;

use nalgebra::{Matrix4, Vector3, Vector4};

/// A point or direction in 3D space.
pub type Vec3 = Vector3<f64>;

/// Lengths below this are treated as zero when normalizing.
pub const LENGTH_EPSILON: f64 = 1e-10;

/// Normalize `v`, or return `None` when it has (near) zero length.
pub fn try_normalize(v: &Vec3) -> Option<Vec3> {
    v.try_normalize(LENGTH_EPSILON)
}

/// A 4x4 affine transformation matrix, column-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub matrix: Matrix4<f64>,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    pub fn from_matrix(matrix: Matrix4<f64>) -> Self {
        Self { matrix }
    }

    /// Translation by `t`.
    pub fn translation(t: &Vec3) -> Self {
        Self {
            matrix: Matrix4::new_translation(t),
        }
    }

    /// Rotation about the X axis by `angle` radians.
    pub fn rotation_x(angle: f64) -> Self {
        Self::rotation_about_axis(&Vec3::x(), angle)
    }

    /// Rotation about the Y axis by `angle` radians.
    pub fn rotation_y(angle: f64) -> Self {
        Self::rotation_about_axis(&Vec3::y(), angle)
    }

    /// Rotation about the Z axis by `angle` radians.
    pub fn rotation_z(angle: f64) -> Self {
        Self::rotation_about_axis(&Vec3::z(), angle)
    }

    /// Rotation about an axis through the origin by `angle` radians.
    /// A zero axis gives the identity.
    pub fn rotation_about_axis(axis: &Vec3, angle: f64) -> Self {
        match try_normalize(axis) {
            Some(axis) => Self {
                matrix: Matrix4::new_rotation(axis * angle),
            },
            None => Self::identity(),
        }
    }

    /// `rotation` applied about `pivot`: move the pivot to the origin,
    /// rotate, move back.
    pub fn about_pivot(pivot: &Vec3, rotation: &Transform) -> Self {
        Self::translation(pivot)
            .compose(rotation)
            .compose(&Self::translation(&-pivot))
    }

    /// `self * other`: `other` is applied first.
    pub fn compose(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    pub fn apply_point(&self, p: &Vec3) -> Vec3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Vec3::new(v.x, v.y, v.z)
    }

    /// Transform a direction (translation ignored).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        self.matrix.fixed_view::<3, 3>(0, 0) * v
    }

    /// Inverse of this transform, `None` when singular.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }

    pub fn translation_part(&self) -> Vec3 {
        Vec3::new(
            self.matrix[(0, 3)],
            self.matrix[(1, 3)],
            self.matrix[(2, 3)],
        )
    }

    /// Same transform with its translation replaced by zero.
    pub fn without_translation(&self) -> Self {
        let mut matrix = self.matrix;
        matrix[(0, 3)] = 0.0;
        matrix[(1, 3)] = 0.0;
        matrix[(2, 3)] = 0.0;
        Self { matrix }
    }

    pub fn is_identity(&self, epsilon: f64) -> bool {
        (self.matrix - Matrix4::identity()).amax() <= epsilon
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..4 {
            writeln!(
                f,
                "[{:10.4} {:10.4} {:10.4} {:10.4}]",
                self.matrix[(row, 0)],
                self.matrix[(row, 1)],
                self.matrix[(row, 2)],
                self.matrix[(row, 3)]
            )?;
        }
        Ok(())
    }
}

/// `(x, y, z)` with fixed precision, for log and debug output.
pub fn format_vec(v: &Vec3) -> String {
    format!("({:.3}, {:.3}, {:.3})", v.x, v.y, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn rotation_z_quarter_turn() {
        let t = Transform::rotation_z(FRAC_PI_2);
        let p = t.apply_point(&Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn about_pivot_keeps_pivot_fixed() {
        let pivot = Vec3::new(10.0, -4.0, 3.0);
        let t = Transform::about_pivot(&pivot, &Transform::rotation_x(0.7));
        assert_relative_eq!(t.apply_point(&pivot), pivot, epsilon = 1e-12);

        let p = pivot + Vec3::new(0.0, 1.0, 0.0);
        let q = t.apply_point(&p);
        assert_relative_eq!((q - pivot).norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn apply_vec_ignores_translation() {
        let t = Transform::translation(&Vec3::new(5.0, 6.0, 7.0));
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(t.apply_vec(&v), v);
        assert_eq!(t.apply_point(&v), Vec3::new(6.0, 8.0, 10.0));
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        let t = Transform::from_matrix(Matrix4::zeros());
        assert!(t.inverse().is_none());
    }

    #[test]
    fn inverse_round_trips() {
        let t = Transform::about_pivot(
            &Vec3::new(1.0, 2.0, 3.0),
            &Transform::rotation_about_axis(&Vec3::new(1.0, 1.0, 0.0), 0.4),
        );
        let inv = t.inverse().unwrap();
        let p = Vec3::new(-3.0, 8.5, 0.25);
        assert_relative_eq!(inv.apply_point(&t.apply_point(&p)), p, epsilon = 1e-12);
    }

    #[test]
    fn zero_axis_rotation_is_identity() {
        let t = Transform::rotation_about_axis(&Vec3::zeros(), 1.0);
        assert!(t.is_identity(1e-12));
    }
}
