use crate::enums::Interpolation;
use crate::math::Vec3;
use crate::volume::Volume;

pub(crate) struct Interpolator;

impl Interpolator {
    /// Sample the volume at a continuous voxel index, `None` outside.
    pub(crate) fn sample(volume: &Volume, ijk: &Vec3, interpolation: Interpolation) -> Option<f32> {
        match interpolation {
            Interpolation::None => Self::nearest(volume, ijk),
            Interpolation::Trilinear => Self::trilinear_interpolate(volume, ijk),
        }
    }

    #[inline]
    fn nearest(volume: &Volume, ijk: &Vec3) -> Option<f32> {
        let index = Self::to_index(ijk.x.round(), ijk.y.round(), ijk.z.round())?;
        volume.voxel(index.0, index.1, index.2).map(f32::from)
    }

    #[inline]
    fn to_index(i: f64, j: f64, k: f64) -> Option<(usize, usize, usize)> {
        if i < 0.0 || j < 0.0 || k < 0.0 {
            return None;
        }
        Some((i as usize, j as usize, k as usize))
    }

    pub(crate) fn trilinear_interpolate(volume: &Volume, ijk: &Vec3) -> Option<f32> {
        let (depth, height, width) = volume.dim();
        if depth == 0 || height == 0 || width == 0 {
            return None;
        }
        let max = [width - 1, height - 1, depth - 1];

        let mut lower = [0usize; 3];
        let mut upper = [0usize; 3];
        let mut frac = [0f32; 3];
        for axis in 0..3 {
            let c = ijk[axis];
            if c < 0.0 || c > max[axis] as f64 {
                return None;
            }
            let c0 = c.floor() as usize;
            lower[axis] = c0;
            upper[axis] = (c0 + 1).min(max[axis]);
            frac[axis] = (c - c0 as f64) as f32;
        }

        let v = |i: usize, j: usize, k: usize| -> f32 {
            volume.voxel(i, j, k).map(f32::from).unwrap_or(0.0)
        };
        let [i0, j0, k0] = lower;
        let [i1, j1, k1] = upper;
        let [dx, dy, dz] = frac;

        let c00 = v(i0, j0, k0).mul_add(1.0 - dx, v(i1, j0, k0) * dx);
        let c10 = v(i0, j1, k0).mul_add(1.0 - dx, v(i1, j1, k0) * dx);
        let c01 = v(i0, j0, k1).mul_add(1.0 - dx, v(i1, j0, k1) * dx);
        let c11 = v(i0, j1, k1).mul_add(1.0 - dx, v(i1, j1, k1) * dx);

        let c0 = c00.mul_add(1.0 - dy, c10 * dy);
        let c1 = c01.mul_add(1.0 - dy, c11 * dy);

        Some(c0.mul_add(1.0 - dz, c1 * dz))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array3;

    fn x_ramp() -> Volume {
        let data = Array3::from_shape_fn((2, 2, 3), |(_, _, i)| (i as u16) * 100);
        Volume::new(data, (1.0, 1.0, 1.0))
    }

    #[test]
    fn trilinear_between_voxels() {
        let volume = x_ramp();
        let value = Interpolator::trilinear_interpolate(&volume, &Vec3::new(1.5, 0.3, 0.9));
        assert_relative_eq!(value.unwrap(), 150.0, epsilon = 1e-3);
    }

    #[test]
    fn trilinear_at_last_voxel() {
        let volume = x_ramp();
        let value = Interpolator::trilinear_interpolate(&volume, &Vec3::new(2.0, 1.0, 1.0));
        assert_relative_eq!(value.unwrap(), 200.0);
    }

    #[test]
    fn outside_is_none() {
        let volume = x_ramp();
        assert!(
            Interpolator::sample(&volume, &Vec3::new(-0.6, 0.0, 0.0), Interpolation::None)
                .is_none()
        );
        assert!(
            Interpolator::sample(&volume, &Vec3::new(2.1, 0.0, 0.0), Interpolation::Trilinear)
                .is_none()
        );
    }

    #[test]
    fn nearest_rounds() {
        let volume = x_ramp();
        let value = Interpolator::sample(&volume, &Vec3::new(1.4, 0.0, 1.0), Interpolation::None);
        assert_eq!(value, Some(100.0));
    }
}
