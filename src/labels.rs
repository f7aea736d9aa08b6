//! Anatomical orientation letters around the edges of a slice.

use crate::math::Vec3;
use crate::slice_view::VirtualSliceView;

/// Minimum cosine between a patient axis and a screen direction for the
/// axis letter to be shown.
pub const LABEL_ALIGNMENT: f64 = 0.95;

const PATIENT_AXES: [(&str, [f64; 3]); 6] = [
    ("L", [-1.0, 0.0, 0.0]),
    ("R", [1.0, 0.0, 0.0]),
    ("P", [0.0, -1.0, 0.0]),
    ("A", [0.0, 1.0, 0.0]),
    ("I", [0.0, 0.0, -1.0]),
    ("S", [0.0, 0.0, 1.0]),
];

/// Letters at each screen edge, `None` when no patient axis is close
/// enough to that screen direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxisLabels {
    pub left: Option<&'static str>,
    pub right: Option<&'static str>,
    pub bottom: Option<&'static str>,
    pub top: Option<&'static str>,
}

fn label_for(direction: &Vec3) -> Option<&'static str> {
    PATIENT_AXES
        .iter()
        .find(|(_, axis)| Vec3::from(*axis).dot(direction) > LABEL_ALIGNMENT)
        .map(|(label, _)| *label)
}

impl VirtualSliceView {
    /// Patient axis letters for the screen edges of this view.
    ///
    /// Screen right and up are the world plane basis, so rotation and the
    /// radiological mirror are both already in them.
    pub fn axis_labels(&self) -> AxisLabels {
        let right = self.plane_right_vector();
        let up = self.plane_up_vector();
        AxisLabels {
            left: label_for(&-right),
            right: label_for(&right),
            bottom: label_for(&-up),
            top: label_for(&up),
        }
    }
}
