use std::fmt;

/// Anatomical plane a slice view looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewPlane {
    Axial,
    Coronal,
    Parasagittal,
    /// All three planes plus a 3D view. Not a valid plane for a single view.
    All,
}

impl ViewPlane {
    pub const SLICE_PLANES: [ViewPlane; 3] =
        [ViewPlane::Axial, ViewPlane::Coronal, ViewPlane::Parasagittal];

    pub fn name(&self) -> &'static str {
        match self {
            ViewPlane::Axial => "AXIAL",
            ViewPlane::Coronal => "CORONAL",
            ViewPlane::Parasagittal => "PARASAGITTAL",
            ViewPlane::All => "ALL",
        }
    }
}

impl fmt::Display for ViewPlane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Screen convention for left/right.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrientationMode {
    /// Patient's left on the screen's left.
    #[default]
    Neurological,
    /// Patient's left on the screen's right.
    Radiological,
}

/// How a user rotation is turned into slice geometry.
///
/// Only [`ViewType::FixedCamera`] and [`ViewType::Slices`] are returned by the
/// selector functions. The other three are kept because their intersection
/// and inverse mapping differ and callers may still want to compare them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewType {
    /// Camera stays fixed, the volume box is rotated about the selected
    /// coordinate before intersection.
    FixedCamera,
    /// Camera, camera up and plane basis are rotated; the volume is not.
    RotateCameraIntersection,
    /// Only the plane basis is rotated; the camera stays fixed.
    RotateSlicePlanes,
    /// Box is rotated and intersected with the camera look plane, the view
    /// maps results back itself.
    RotateVolume,
    /// Basis vectors rotated, plane through the unrotated selected
    /// coordinate, no camera.
    Slices,
}

impl ViewType {
    pub const ALL: [ViewType; 5] = [
        ViewType::FixedCamera,
        ViewType::RotateCameraIntersection,
        ViewType::RotateSlicePlanes,
        ViewType::RotateVolume,
        ViewType::Slices,
    ];

    /// Mode used when drawing ordinary volume slice views.
    pub fn for_volume_slice_view() -> ViewType {
        ViewType::FixedCamera
    }

    /// Mode used for slices drawn inside the combined 3D ("all") view.
    pub fn for_all_view() -> ViewType {
        ViewType::Slices
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Trilinear,
    #[default]
    None,
}
