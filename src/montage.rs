//! Parallel slice positions for a montage grid.

use crate::error::{MprError, Result};
use crate::math::Vec3;
use crate::slice_view::VirtualSliceView;
use crate::texture::TextureCoordinateMapper;
use crate::volume::VolumeGeometry;

/// Layout of a montage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MontageGrid {
    pub rows: usize,
    pub columns: usize,
    /// Distance between adjacent slices, usually the smallest voxel spacing.
    pub slice_thickness: f64,
    /// Number of slices skipped between adjacent cells.
    pub slice_index_step: usize,
    /// Stack from bottom-right instead of top-left.
    pub flipped: bool,
}

impl MontageGrid {
    pub fn new(rows: usize, columns: usize, slice_thickness: f64) -> Self {
        Self {
            rows,
            columns,
            slice_thickness,
            slice_index_step: 1,
            flipped: false,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.columns == 0 {
            return Err(MprError::InvalidMontage(format!(
                "{}x{} grid has no cells",
                self.rows, self.columns
            )));
        }
        if self.slice_thickness.is_nan() || self.slice_thickness <= 0.0 {
            return Err(MprError::InvalidMontage(format!(
                "slice thickness {} must be positive",
                self.slice_thickness
            )));
        }
        if self.slice_index_step == 0 {
            return Err(MprError::InvalidMontage("slice index step is 0".to_string()));
        }
        Ok(())
    }
}

/// One montage cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MontageSlice {
    pub row: usize,
    pub column: usize,
    /// Point on this cell's slice plane.
    pub xyz: Vec3,
    /// Signed distance from the selected slice along the montage direction.
    pub offset_distance: f64,
}

impl VirtualSliceView {
    /// Slice positions for every montage cell that falls inside the volume,
    /// in row-major order.
    ///
    /// The selected coordinate is the middle cell. The top-left cell lies
    /// furthest along the montage increasing direction and each following
    /// cell steps one slice back.
    pub fn montage_slices(
        &self,
        grid: &MontageGrid,
        volume: &dyn VolumeGeometry,
    ) -> Result<Vec<MontageSlice>> {
        grid.validate()?;

        let plane = self.montage_increasing_direction_plane();
        let step = plane.normal() * (grid.slice_thickness * grid.slice_index_step as f64);
        let cell_count = grid.rows * grid.columns;
        let first = self.selected_xyz() + step * ((cell_count - 1) as f64 / 2.0);
        let mapper = TextureCoordinateMapper::new(volume);

        let mut slices = Vec::with_capacity(cell_count);
        for row in 0..grid.rows {
            for column in 0..grid.columns {
                let mut index = row * grid.columns + column;
                if grid.flipped {
                    index = cell_count - 1 - index;
                }
                let xyz = first - step * index as f64;
                if !mapper.contains(&xyz) {
                    continue;
                }
                slices.push(MontageSlice {
                    row,
                    column,
                    xyz,
                    offset_distance: plane.signed_distance(&xyz),
                });
            }
        }
        Ok(slices)
    }
}
