use thiserror::Error;

use crate::enums::ViewPlane;

#[derive(Debug, Error)]
pub enum MprError {
    #[error("View plane {0} cannot be used for a single slice view")]
    InvalidViewPlane(ViewPlane),

    #[error("Volume needs three dimensions of at least 2 voxels, got {0:?}")]
    InvalidVolume(Vec<usize>),

    #[error("Volume box geometry is invalid")]
    InvalidGeometry,

    #[error("Plane is invalid: {0}")]
    InvalidPlane(String),

    #[error("Invalid image size {width}x{height}")]
    InvalidImageSize { width: u32, height: u32 },

    #[error("Invalid montage: {0}")]
    InvalidMontage(String),
}

pub type Result<T> = std::result::Result<T, MprError>;
