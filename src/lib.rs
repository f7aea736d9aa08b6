//! # Volume MPR library
//!
//! This crate computes the geometry of multi-planar reconstruction (MPR)
//! slices through a 3D image volume

//!
//! Given a volume, a selected coordinate, an anatomical view plane and a
//! user rotation, a [`VirtualSliceView`] describes the camera, the slice
//! plane and the transforms between world, view and texture space. The
//! view then produces a fixed-size triangle fan or triangle list of the
//! polygon where the slice plane cuts the volume's bounding box, ready to
//! be uploaded to a renderer. The volume can be viewed in the three medical
//! planes:
//!  - Axial
//!  - Coronal
//!  - Parasagittal
//!
//!  Rotation can be applied to the camera, to the volume or to the slice
//!  plane alone (see [`ViewType`]). Neurological and radiological display
//!  conventions are supported.
//!
//!  Volumes are assumed to have:
//!   - An affine index to world mapping (spacing and origin, or a full
//!     4x4 matrix)
//!   - At least 2 voxels along each axis
//!
//! # Examples
//!
//! ## Drawing an axial slice
//!
//! Build a view through the center of a volume, get the fan to draw and
//! resample the slice into an image on the CPU.
//!
//! ```no_run
//! # use volume_mpr::{
//! #     Interpolation, OrientationMode, SliceViewParams, Transform, Vec3, ViewPlane, ViewType,
//! #     VirtualSliceView, Volume,
//! # };
//! # use ndarray::Array3;
//! let volume = Volume::new(Array3::zeros((64, 128, 128)), (1.0, 1.0, 2.0));
//! let params = SliceViewParams::for_volume(
//!     &volume,
//!     Vec3::new(64.0, 64.0, 64.0),
//!     ViewPlane::Axial,
//!     OrientationMode::Neurological,
//!     Transform::rotation_x(0.2),
//! )
//! .expect("volume should be valid");
//! let view = VirtualSliceView::new(&params, ViewType::for_volume_slice_view())
//!     .expect("axial is a single slice plane");
//! let fan = view.get_triangle_fan_coordinates(&volume);
//! assert_eq!(fan.len(), 8);
//! let image = volume
//!     .get_image_from_view(&view, 256, 256, Interpolation::Trilinear)
//!     .expect("should have resampled the slice");
//! image.save("result.png");
//! ```

pub mod box_geometry;
pub mod enums;
pub mod error;
pub mod intersection;
mod interpolator;
pub mod labels;
pub mod math;
pub mod montage;
pub mod plane;
pub mod primitive;
pub mod slice_view;
pub mod texture;
pub mod volume;

pub use box_geometry::VolumeBoxGeometry;
pub use enums::{Interpolation, OrientationMode, ViewPlane, ViewType};
pub use error::{MprError, Result};
pub use intersection::{IntersectionPolygon, PlaneVolumeIntersector, RayHit};
pub use labels::AxisLabels;
pub use math::{Transform, Vec3};
pub use montage::{MontageGrid, MontageSlice};
pub use plane::Plane;
pub use primitive::{SlicePrimitive, SliceVertex};
pub use slice_view::{SliceViewParams, VirtualSliceView};
pub use texture::TextureCoordinateMapper;
pub use volume::{BoundingBox, Volume, VolumeGeometry};
