//! Camera, plane and transform description of one MPR slice view.
//!
//! A [`VirtualSliceView`] is built once per draw request by one of five
//! build functions, selected by [`ViewType`]. All of them produce the same
//! value type; they differ in whether the user's rotation is applied to the
//! camera, to the plane basis, or to the volume box, and therefore in how
//! intersection results are mapped between world and view space.

use std::fmt;

use log::warn;

use crate::box_geometry::VolumeBoxGeometry;
use crate::enums::{OrientationMode, ViewPlane, ViewType};
use crate::error::{MprError, Result};
use crate::math::{Transform, Vec3, format_vec, try_normalize};
use crate::plane::Plane;
use crate::volume::{BoundingBox, VolumeGeometry};

/// Inputs for building a view.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceViewParams {
    pub volume_center: Vec3,
    pub selected_xyz: Vec3,
    /// Largest extent of the volume; the camera sits twice this far away.
    pub slice_width_height: f64,
    pub view_plane: ViewPlane,
    pub orientation: OrientationMode,
    pub rotation: Transform,
}

impl SliceViewParams {
    /// Params with center and slice size taken from the volume's bounding box.
    pub fn for_volume(
        volume: &dyn VolumeGeometry,
        selected_xyz: Vec3,
        view_plane: ViewPlane,
        orientation: OrientationMode,
        rotation: Transform,
    ) -> Result<Self> {
        let geometry = VolumeBoxGeometry::new(volume);
        let bounds = BoundingBox::from_points(geometry.vertices())
            .ok_or_else(|| MprError::InvalidVolume(volume.dimensions().to_vec()))?;
        Ok(Self {
            volume_center: bounds.center(),
            selected_xyz,
            slice_width_height: bounds.max_difference(),
            view_plane,
            orientation,
            rotation,
        })
    }
}

/// How intersection output relates to world and view space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IntersectionMapping {
    /// Box intersected in world space; world and view coincide.
    Identity,
    /// Box intersected in world space; view = transformation * world.
    WorldToView,
    /// Intersector built with the transformation maps back to world itself;
    /// view = transformation * world.
    IntersectorInverse,
    /// Box intersected in view space; world = transformation⁻¹ * view.
    ViewInverse,
}

/// Per-plane vectors before any rotation.
#[derive(Debug, Clone, Copy)]
struct CanonicalBasis {
    camera_up: Vec3,
    right: Vec3,
    up: Vec3,
}

impl CanonicalBasis {
    fn new(view_plane: ViewPlane, orientation: OrientationMode) -> Result<Self> {
        let radiological = orientation == OrientationMode::Radiological;
        let flip = if radiological { -1.0 } else { 1.0 };
        match view_plane {
            ViewPlane::Axial => Ok(Self {
                camera_up: Vec3::y(),
                right: Vec3::x() * flip,
                up: Vec3::y(),
            }),
            ViewPlane::Coronal => Ok(Self {
                camera_up: Vec3::z(),
                right: Vec3::x() * flip,
                up: Vec3::z(),
            }),
            // Same for both orientations
            ViewPlane::Parasagittal => Ok(Self {
                camera_up: Vec3::z(),
                right: -Vec3::y(),
                up: Vec3::z(),
            }),
            ViewPlane::All => Err(MprError::InvalidViewPlane(view_plane)),
        }
    }

    fn normal(&self) -> Vec3 {
        self.right.cross(&self.up)
    }
}

/// What a build function decides; the rest is derived uniformly.
struct ModeGeometry {
    camera_xyz: Vec3,
    camera_look_at_xyz: Vec3,
    camera_up_vector: Vec3,
    plane_right_vector: Vec3,
    plane_up_vector: Vec3,
    intersection_plane: Plane,
    mapping: IntersectionMapping,
    transformation_matrix: Transform,
    pre_look_at_translation: Vec3,
}

/// Geometry for drawing one MPR slice.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualSliceView {
    view_type: ViewType,
    view_plane: ViewPlane,
    orientation: OrientationMode,
    volume_center_xyz: Vec3,
    selected_xyz: Vec3,
    slice_width_height: f64,
    rotation_matrix: Transform,

    camera_xyz: Vec3,
    camera_look_at_xyz: Vec3,
    camera_up_vector: Vec3,
    plane_right_vector: Vec3,
    plane_up_vector: Vec3,

    virtual_slice_plane: Plane,
    layers_drawing_plane: Plane,
    montage_increasing_direction_plane: Plane,
    pub(crate) intersection_plane: Plane,
    pub(crate) mapping: IntersectionMapping,

    pre_look_at_translation: Vec3,
    post_look_at_translation: Vec3,
    transformation_matrix: Transform,

    neurological: bool,
    radiological: bool,
}

impl VirtualSliceView {
    pub fn new(params: &SliceViewParams, view_type: ViewType) -> Result<Self> {
        let basis = CanonicalBasis::new(params.view_plane, params.orientation)?;
        let mode = match view_type {
            ViewType::FixedCamera => build_fixed_camera(params, &basis),
            ViewType::RotateCameraIntersection => build_rotate_camera_intersection(params, &basis),
            ViewType::RotateSlicePlanes => build_rotate_slice_planes(params, &basis),
            ViewType::RotateVolume => build_rotate_volume(params, &basis),
            ViewType::Slices => build_slices(params, &basis),
        };
        Ok(Self::assemble(params, view_type, mode))
    }

    fn assemble(params: &SliceViewParams, view_type: ViewType, mode: ModeGeometry) -> Self {
        let selected = params.selected_xyz;
        let normal = mode.plane_right_vector.cross(&mode.plane_up_vector);
        let virtual_slice_plane = Plane::new(&normal, &selected);

        let layers_drawing_plane = match mode.mapping {
            IntersectionMapping::Identity | IntersectionMapping::WorldToView => {
                mode.intersection_plane
            }
            IntersectionMapping::IntersectorInverse | IntersectionMapping::ViewInverse => {
                match mode.transformation_matrix.inverse() {
                    Some(inverse) => mode.intersection_plane.transformed(&inverse),
                    None => mode.intersection_plane,
                }
            }
        };

        // The radiological flip of plane right already reverses the normal
        // for axial and coronal; parasagittal stacks the same either way.
        let radiological = params.orientation == OrientationMode::Radiological;
        let montage_increasing_direction_plane = Plane::new(&normal, &selected);

        Self {
            view_type,
            view_plane: params.view_plane,
            orientation: params.orientation,
            volume_center_xyz: params.volume_center,
            selected_xyz: selected,
            slice_width_height: params.slice_width_height,
            rotation_matrix: params.rotation,
            camera_xyz: mode.camera_xyz,
            camera_look_at_xyz: mode.camera_look_at_xyz,
            camera_up_vector: mode.camera_up_vector,
            plane_right_vector: mode.plane_right_vector,
            plane_up_vector: mode.plane_up_vector,
            virtual_slice_plane,
            layers_drawing_plane,
            montage_increasing_direction_plane,
            intersection_plane: mode.intersection_plane,
            mapping: mode.mapping,
            pre_look_at_translation: mode.pre_look_at_translation,
            post_look_at_translation: Vec3::zeros(),
            transformation_matrix: mode.transformation_matrix,
            neurological: !radiological,
            radiological,
        }
    }

    pub fn view_type(&self) -> ViewType {
        self.view_type
    }

    pub fn view_plane(&self) -> ViewPlane {
        self.view_plane
    }

    pub fn orientation(&self) -> OrientationMode {
        self.orientation
    }

    pub fn volume_center_xyz(&self) -> Vec3 {
        self.volume_center_xyz
    }

    pub fn selected_xyz(&self) -> Vec3 {
        self.selected_xyz
    }

    pub fn slice_width_height(&self) -> f64 {
        self.slice_width_height
    }

    pub fn rotation_matrix(&self) -> &Transform {
        &self.rotation_matrix
    }

    pub fn camera_xyz(&self) -> Vec3 {
        self.camera_xyz
    }

    pub fn camera_look_at_xyz(&self) -> Vec3 {
        self.camera_look_at_xyz
    }

    pub fn camera_up_vector(&self) -> Vec3 {
        self.camera_up_vector
    }

    /// Screen right of the slice, in world space.
    pub fn plane_right_vector(&self) -> Vec3 {
        self.plane_right_vector
    }

    /// Screen up of the slice, in world space.
    pub fn plane_up_vector(&self) -> Vec3 {
        self.plane_up_vector
    }

    /// World plane of the slice, through the selected coordinate.
    pub fn virtual_slice_plane(&self) -> &Plane {
        &self.virtual_slice_plane
    }

    pub fn normal_vector(&self) -> Vec3 {
        self.virtual_slice_plane.normal()
    }

    /// World plane on which layers over the slice are drawn.
    pub fn layers_drawing_plane(&self) -> &Plane {
        &self.layers_drawing_plane
    }

    /// Normal points toward increasing montage slice coordinates.
    pub fn montage_increasing_direction_plane(&self) -> &Plane {
        &self.montage_increasing_direction_plane
    }

    pub fn pre_look_at_translation(&self) -> Vec3 {
        self.pre_look_at_translation
    }

    pub fn post_look_at_translation(&self) -> Vec3 {
        self.post_look_at_translation
    }

    pub fn transformation_matrix(&self) -> &Transform {
        &self.transformation_matrix
    }

    pub fn is_neurological(&self) -> bool {
        self.neurological
    }

    pub fn is_radiological(&self) -> bool {
        self.radiological
    }
}

impl fmt::Display for VirtualSliceView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "view_plane={} view_type={:?}", self.view_plane, self.view_type)?;
        writeln!(f, "   camera_xyz={}", format_vec(&self.camera_xyz))?;
        writeln!(f, "   camera_look_at_xyz={}", format_vec(&self.camera_look_at_xyz))?;
        writeln!(f, "   camera_up_vector={}", format_vec(&self.camera_up_vector))?;
        writeln!(f, "   volume_center_xyz={}", format_vec(&self.volume_center_xyz))?;
        writeln!(f, "   selected_xyz={}", format_vec(&self.selected_xyz))?;
        writeln!(f, "   virtual_slice_plane={}", self.virtual_slice_plane.describe())?;
        writeln!(
            f,
            "   pre_look_at_translation={}",
            format_vec(&self.pre_look_at_translation)
        )?;
        writeln!(
            f,
            "   post_look_at_translation={}",
            format_vec(&self.post_look_at_translation)
        )?;
        write!(f, "   transformation_matrix=\n{}", self.transformation_matrix)
    }
}

fn inverse_rotation(rotation: &Transform) -> Transform {
    rotation.inverse().unwrap_or_else(|| {
        warn!("Rotation matrix is singular, slice view ignores the rotation");
        Transform::identity()
    })
}

/// Rotated direction, normalized; falls back to `fallback` when degenerate.
fn rotate_direction(rotation: &Transform, v: &Vec3, fallback: &Vec3) -> Vec3 {
    try_normalize(&rotation.apply_vec(v)).unwrap_or(*fallback)
}

fn camera_offset_distance(params: &SliceViewParams) -> f64 {
    params.slice_width_height * 2.0
}

/// Camera fixed in front of the volume center, box rotated about the
/// selected coordinate before intersection.
fn build_fixed_camera(params: &SliceViewParams, basis: &CanonicalBasis) -> ModeGeometry {
    let selected = params.selected_xyz;
    let transformation_matrix = Transform::about_pivot(&selected, &params.rotation);
    let inverse = inverse_rotation(&params.rotation);
    let normal = basis.normal();

    // Keeps slices from jumping when the selected coordinate moves under rotation
    let t = transformation_matrix.translation_part();
    let pre_look_at_translation = match params.view_plane {
        ViewPlane::Axial => Vec3::new(-t.x, -t.y, 0.0),
        ViewPlane::Coronal => Vec3::new(-t.x, 0.0, -t.z),
        ViewPlane::Parasagittal => Vec3::new(0.0, t.y, -t.z),
        ViewPlane::All => Vec3::zeros(),
    };

    ModeGeometry {
        camera_xyz: params.volume_center + normal * camera_offset_distance(params),
        camera_look_at_xyz: params.volume_center,
        camera_up_vector: basis.camera_up,
        plane_right_vector: rotate_direction(&inverse, &basis.right, &basis.right),
        plane_up_vector: rotate_direction(&inverse, &basis.up, &basis.up),
        intersection_plane: Plane::new(&normal, &selected),
        mapping: IntersectionMapping::IntersectorInverse,
        transformation_matrix,
        pre_look_at_translation,
    }
}

/// Camera, camera up and plane basis rotated; volume untouched.
fn build_rotate_camera_intersection(
    params: &SliceViewParams,
    basis: &CanonicalBasis,
) -> ModeGeometry {
    let rotation = &params.rotation;
    let right = rotate_direction(rotation, &basis.right, &basis.right);
    let up = rotate_direction(rotation, &basis.up, &basis.up);
    let camera_up = rotate_direction(rotation, &basis.camera_up, &basis.camera_up);
    let normal = right.cross(&up);

    let plane = Plane::new(&normal, &params.selected_xyz);
    let look_at = plane.project_point(&params.volume_center);
    let camera = look_at + normal * camera_offset_distance(params);
    let look_from = try_normalize(&(camera - look_at)).unwrap_or(normal);

    ModeGeometry {
        camera_xyz: camera,
        camera_look_at_xyz: look_at,
        camera_up_vector: camera_up,
        plane_right_vector: right,
        plane_up_vector: up,
        intersection_plane: Plane::new(&look_from, &params.selected_xyz),
        mapping: IntersectionMapping::Identity,
        transformation_matrix: Transform::identity(),
        pre_look_at_translation: Vec3::zeros(),
    }
}

/// Only the plane basis rotated; the camera stays put, so the view maps
/// world results back by the inverse rotation to face it.
fn build_rotate_slice_planes(params: &SliceViewParams, basis: &CanonicalBasis) -> ModeGeometry {
    let rotation = &params.rotation;
    let selected = params.selected_xyz;
    let right = rotate_direction(rotation, &basis.right, &basis.right);
    let up = rotate_direction(rotation, &basis.up, &basis.up);
    let normal = right.cross(&up);

    ModeGeometry {
        camera_xyz: params.volume_center + basis.normal() * camera_offset_distance(params),
        camera_look_at_xyz: params.volume_center,
        camera_up_vector: basis.camera_up,
        plane_right_vector: right,
        plane_up_vector: up,
        intersection_plane: Plane::new(&normal, &selected),
        mapping: IntersectionMapping::WorldToView,
        transformation_matrix: Transform::about_pivot(&selected, &inverse_rotation(rotation)),
        pre_look_at_translation: Vec3::zeros(),
    }
}

/// Box rotated about the selected coordinate and cut by the camera's look
/// plane; the view itself maps results back to world.
fn build_rotate_volume(params: &SliceViewParams, basis: &CanonicalBasis) -> ModeGeometry {
    let selected = params.selected_xyz;
    let transformation_matrix = Transform::about_pivot(&selected, &params.rotation);
    let inverse = inverse_rotation(&params.rotation);
    let normal = basis.normal();

    let view_plane = Plane::new(&normal, &selected);
    let look_at = view_plane.project_point(&params.volume_center);
    let camera = look_at + normal * camera_offset_distance(params);
    let look_direction = try_normalize(&(look_at - camera)).unwrap_or(-normal);

    ModeGeometry {
        camera_xyz: camera,
        camera_look_at_xyz: look_at,
        camera_up_vector: basis.camera_up,
        plane_right_vector: rotate_direction(&inverse, &basis.right, &basis.right),
        plane_up_vector: rotate_direction(&inverse, &basis.up, &basis.up),
        intersection_plane: Plane::new(&look_direction, &selected),
        mapping: IntersectionMapping::ViewInverse,
        transformation_matrix,
        pre_look_at_translation: Vec3::zeros(),
    }
}

/// Basis rotated directly, plane through the unrotated selected coordinate.
/// There is no real camera; a nominal one faces the plane.
fn build_slices(params: &SliceViewParams, basis: &CanonicalBasis) -> ModeGeometry {
    let rotation = &params.rotation;
    let selected = params.selected_xyz;
    let center = params.volume_center;

    let v = rotation.apply_point(&center);
    let v_right = rotation.apply_point(&(center + basis.right));
    let v_up = rotation.apply_point(&(center + basis.up));
    let right = try_normalize(&(v_right - v)).unwrap_or(basis.right);
    let up = try_normalize(&(v_up - v)).unwrap_or(basis.up);
    let normal = right.cross(&up);

    let plane = Plane::new(&normal, &selected);
    let look_at = plane.project_point(&center);

    ModeGeometry {
        camera_xyz: look_at + normal * camera_offset_distance(params),
        camera_look_at_xyz: look_at,
        camera_up_vector: up,
        plane_right_vector: right,
        plane_up_vector: up,
        intersection_plane: plane,
        mapping: IntersectionMapping::Identity,
        transformation_matrix: Transform::about_pivot(&selected, rotation),
        pre_look_at_translation: Vec3::zeros(),
    }
}
