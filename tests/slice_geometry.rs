use approx::assert_relative_eq;
use ndarray::Array3;
use volume_mpr::{
    OrientationMode, Plane, PlaneVolumeIntersector, SliceViewParams, Transform, Vec3, ViewPlane,
    ViewType, VirtualSliceView, Volume,
};

fn unit_cube() -> Volume {
    Volume::new(Array3::zeros((2, 2, 2)), (1.0, 1.0, 1.0))
}

fn has_point(points: &[Vec3], p: Vec3) -> bool {
    points.iter().any(|q| (q - p).norm() < 1e-9)
}

#[test]
fn unit_cube_mid_plane_is_square() {
    let intersector = PlaneVolumeIntersector::new(&unit_cube(), None);
    let plane = Plane::new(&Vec3::z(), &Vec3::new(0.5, 0.5, 0.5));
    let polygon = intersector.intersect_with_plane(&plane).unwrap();

    assert_eq!(polygon.len(), 4);
    assert_relative_eq!(polygon.centroid, Vec3::new(0.5, 0.5, 0.5), epsilon = 1e-12);
    for corner in [
        Vec3::new(0.0, 0.0, 0.5),
        Vec3::new(1.0, 0.0, 0.5),
        Vec3::new(1.0, 1.0, 0.5),
        Vec3::new(0.0, 1.0, 0.5),
    ] {
        assert!(has_point(&polygon.vertices, corner), "missing {corner:?}");
    }
}

#[test]
fn plane_above_cube_misses() {
    let intersector = PlaneVolumeIntersector::new(&unit_cube(), None);
    let plane = Plane::new(&Vec3::z(), &Vec3::new(0.5, 0.5, 2.0));
    assert!(intersector.intersect_with_plane(&plane).unwrap().is_empty());
}

#[test]
fn vertical_ray_hits_top_then_bottom() {
    let intersector = PlaneVolumeIntersector::new(&unit_cube(), None);
    let hits =
        intersector.intersect_with_ray(&Vec3::new(0.5, 0.5, 5.0), &Vec3::new(0.0, 0.0, -1.0));
    assert_eq!(hits.len(), 2);
    assert_relative_eq!(hits[0].xyz, Vec3::new(0.5, 0.5, 1.0), epsilon = 1e-12);
    assert_relative_eq!(hits[1].xyz, Vec3::new(0.5, 0.5, 0.0), epsilon = 1e-12);
    assert!(hits[0].distance < hits[1].distance);
}

#[test]
fn polygon_never_exceeds_six_vertices() {
    let volume = Volume::new(Array3::zeros((7, 5, 9)), (0.7, 1.3, 1.1));
    let intersector = PlaneVolumeIntersector::new(&volume, None);
    let normals = [
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(-0.3, 0.8, 0.1),
        Vec3::new(0.0, 1.0, 1.0),
        Vec3::new(2.0, -1.0, 0.5),
    ];
    for normal in normals {
        for step in 0..12 {
            let point = Vec3::new(0.5, 0.4, 0.6) * step as f64;
            let polygon = intersector
                .intersect_with_plane(&Plane::new(&normal, &point))
                .unwrap();
            assert!(polygon.len() <= 6);
        }
    }
}

#[test]
fn output_sizes_are_fixed_for_every_mode() {
    let volume = Volume::new(Array3::zeros((6, 6, 6)), (1.0, 1.0, 1.0));
    let selections = [
        Vec3::new(2.5, 2.5, 2.5),
        Vec3::new(2.5, 2.5, 40.0),
        Vec3::new(0.0, 0.0, 0.0),
    ];
    for view_type in ViewType::ALL {
        for plane in ViewPlane::SLICE_PLANES {
            for selected in selections {
                let params = SliceViewParams::for_volume(
                    &volume,
                    selected,
                    plane,
                    OrientationMode::Radiological,
                    Transform::rotation_y(0.2),
                )
                .unwrap();
                let view = VirtualSliceView::new(&params, view_type).unwrap();
                let fan = view.get_triangle_fan_coordinates(&volume);
                let triangles = view.get_triangles_coordinates(&volume);
                assert_eq!(fan.len(), 8);
                assert_eq!(fan.texture_str.len(), 8);
                assert_eq!(triangles.len(), 18);
                assert_eq!(triangles.stereotaxic_xyz.len(), 18);
                assert_eq!(fan.valid, triangles.valid);
            }
        }
    }
}

#[test]
fn orientation_toggle_mirrors_axial_and_coronal_only() {
    let params = |plane, orientation| SliceViewParams {
        volume_center: Vec3::new(1.0, 2.0, 3.0),
        selected_xyz: Vec3::new(1.0, 2.0, 3.0),
        slice_width_height: 10.0,
        view_plane: plane,
        orientation,
        rotation: Transform::identity(),
    };
    for plane in ViewPlane::SLICE_PLANES {
        let neuro =
            VirtualSliceView::new(&params(plane, OrientationMode::Neurological), ViewType::Slices)
                .unwrap();
        let radio =
            VirtualSliceView::new(&params(plane, OrientationMode::Radiological), ViewType::Slices)
                .unwrap();
        let sign = if plane == ViewPlane::Parasagittal { 1.0 } else { -1.0 };
        assert_relative_eq!(radio.plane_right_vector(), neuro.plane_right_vector() * sign);
        assert_relative_eq!(
            radio.montage_increasing_direction_plane().normal(),
            neuro.montage_increasing_direction_plane().normal() * sign,
            epsilon = 1e-12
        );
    }
}

#[test]
fn all_view_plane_is_not_a_slice() {
    let volume = unit_cube();
    let params = SliceViewParams::for_volume(
        &volume,
        Vec3::zeros(),
        ViewPlane::All,
        OrientationMode::Neurological,
        Transform::identity(),
    )
    .unwrap();
    assert!(VirtualSliceView::new(&params, ViewType::for_all_view()).is_err());
}
