use crate::enums::Interpolation;
use crate::error::{MprError, Result};
use crate::interpolator::Interpolator;
use crate::math::{Transform, Vec3};
use crate::slice_view::VirtualSliceView;
use crate::texture::TextureCoordinateMapper;

use image::ImageBuffer;
use image::Luma;
use ndarray::Array3;
use ndarray::ArrayViewMut3;
use rayon::prelude::*;

/// Read-only geometry of a volume: its dimensions and the affine mapping
/// from voxel index to world (stereotaxic) space.
///
/// Implementations are queried repeatedly per frame and possibly from
/// several threads.
pub trait VolumeGeometry {
    /// Voxel counts `(nx, ny, nz, ...)`.
    fn dimensions(&self) -> &[usize];

    /// World coordinate of the (possibly fractional) voxel index.
    fn index_to_world(&self, i: f64, j: f64, k: f64) -> Vec3;
}

/// Axis aligned world extent of a volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = *points.next()?;
        Some(points.fold(Self { min: first, max: first }, |b, p| Self {
            min: b.min.inf(p),
            max: b.max.sup(p),
        }))
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Largest of the X, Y and Z extents.
    pub fn max_difference(&self) -> f64 {
        (self.max - self.min).max()
    }
}

#[derive(Default)]
pub struct Volume {
    /// Voxels stored `(depth, height, width)`, i.e. indexed `[k, j, i]`.
    data: Array3<u16>,
    /// Voxel size along X, Y, Z.
    pub spacing: (f64, f64, f64),
    pub origin: Vec3,
    /// Explicit index-to-world affine, overrides spacing and origin.
    pub index_to_world: Option<Transform>,
    dimensions: [usize; 3],
}

impl Volume {
    pub fn new(data: Array3<u16>, spacing: (f64, f64, f64)) -> Self {
        let dimensions = Self::xyz_dimensions(&data);
        Self {
            data,
            spacing,
            origin: Vec3::zeros(),
            index_to_world: None,
            dimensions,
        }
    }

    fn xyz_dimensions(data: &Array3<u16>) -> [usize; 3] {
        let (depth, height, width) = data.dim();
        [width, height, depth]
    }

    pub fn with_origin(mut self, origin: Vec3) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_index_to_world(mut self, transform: Transform) -> Self {
        self.index_to_world = Some(transform);
        self
    }

    /// Get the dimensions of the volume (depth, height, width)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &Array3<u16> {
        &self.data
    }

    /// Get a mutable view of the underlying data. The shape stays fixed.
    pub fn data_mut(&mut self) -> ArrayViewMut3<'_, u16> {
        self.data.view_mut()
    }

    /// Replace the voxels, possibly with a different shape.
    pub fn set_data(&mut self, data: Array3<u16>) {
        self.dimensions = Self::xyz_dimensions(&data);
        self.data = data;
    }

    /// Smallest voxel size, the distance between adjacent montage slices.
    pub fn min_spacing(&self) -> f64 {
        let (sx, sy, sz) = self.spacing;
        sx.abs().min(sy.abs()).min(sz.abs())
    }

    pub fn is_valid(&self) -> bool {
        self.dimensions.iter().all(|&d| d >= 2)
    }

    /// World bounding box over the voxel centers at the volume's corners.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        if self.dimensions.iter().any(|&d| d == 0) {
            return None;
        }
        let [nx, ny, nz] = self.dimensions.map(|d| (d - 1) as f64);
        let mut corners = Vec::with_capacity(8);
        for i in [0.0, nx] {
            for j in [0.0, ny] {
                for k in [0.0, nz] {
                    corners.push(self.index_to_world(i, j, k));
                }
            }
        }
        BoundingBox::from_points(&corners)
    }

    /// Intensity of the voxel `(i, j, k)`, `None` outside the volume.
    pub fn voxel(&self, i: usize, j: usize, k: usize) -> Option<u16> {
        self.data.get([k, j, i]).copied()
    }

    #[inline]
    fn normalize_to_u8(value: f32) -> u8 {
        ((value / 65535.0) * 255.0).clamp(0.0, 255.0) as u8
    }

    /// Resample the volume across the virtual slice plane of `view`.
    ///
    /// The image covers `slice_width_height` in both directions, centered
    /// on the camera look-at projected onto the plane, with image right
    /// and up along the view's plane basis. Samples outside the volume are
    /// black.
    pub fn get_image_from_view(
        &self,
        view: &VirtualSliceView,
        width: u32,
        height: u32,
        interpolation: Interpolation,
    ) -> Result<ImageBuffer<Luma<u8>, Vec<u8>>> {
        if !self.is_valid() {
            return Err(MprError::InvalidVolume(self.dimensions.to_vec()));
        }
        if width == 0 || height == 0 {
            return Err(MprError::InvalidImageSize { width, height });
        }

        let mapper = TextureCoordinateMapper::new(self);
        let plane = view.virtual_slice_plane();
        let center = plane.project_point(&view.camera_look_at_xyz());
        let right = view.plane_right_vector();
        let up = view.plane_up_vector();
        let extent = view.slice_width_height();

        let pixel_data: Vec<u8> = (0..height)
            .into_par_iter()
            .flat_map(|y| {
                (0..width)
                    .map(|x| {
                        // Pixel centers, row 0 at the top
                        let u = ((x as f64 + 0.5) / width as f64 - 0.5) * extent;
                        let v = (0.5 - (y as f64 + 0.5) / height as f64) * extent;
                        let xyz = center + right * u + up * v;

                        let value = mapper
                            .world_to_index(&xyz)
                            .and_then(|ijk| Interpolator::sample(self, &ijk, interpolation))
                            .unwrap_or(0.0);
                        Self::normalize_to_u8(value)
                    })
                    .collect::<Vec<u8>>()
            })
            .collect();

        ImageBuffer::from_raw(width, height, pixel_data)
            .ok_or(MprError::InvalidImageSize { width, height })
    }
}

impl VolumeGeometry for Volume {
    fn dimensions(&self) -> &[usize] {
        &self.dimensions
    }

    fn index_to_world(&self, i: f64, j: f64, k: f64) -> Vec3 {
        let ijk = Vec3::new(i, j, k);
        match &self.index_to_world {
            Some(transform) => transform.apply_point(&ijk),
            None => {
                let (sx, sy, sz) = self.spacing;
                self.origin + Vec3::new(i * sx, j * sy, k * sz)
            }
        }
    }
}
