use log::info;
use ndarray::Array3;
use volume_mpr::{
    Interpolation, MontageGrid, OrientationMode, SliceViewParams, Transform, Vec3, ViewPlane,
    ViewType, VirtualSliceView, Volume,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Synthetic sphere so the demo needs no input files
    let size = 96;
    let center = (size / 2) as f64;
    let data = Array3::from_shape_fn((size, size, size), |(k, j, i)| {
        let d = Vec3::new(i as f64, j as f64, k as f64)
            .metric_distance(&Vec3::new(center, center, center));
        if d < center * 0.8 { (65535.0 * (1.0 - d / center)) as u16 } else { 0 }
    });
    let volume = Volume::new(data, (1.0, 1.0, 1.5));

    let params = SliceViewParams::for_volume(
        &volume,
        Vec3::new(center, center, center * 1.5),
        ViewPlane::Coronal,
        OrientationMode::Neurological,
        Transform::rotation_about_axis(&Vec3::new(1.0, 0.0, 1.0), 0.3),
    )
    .expect("should have derived view params from volume");
    let view = VirtualSliceView::new(&params, ViewType::for_volume_slice_view())
        .expect("should have built a coronal view");
    info!("{view}");

    let fan = view.get_triangle_fan_coordinates(&volume);
    info!("Fan valid={} vertices={}", fan.valid, fan.len());
    info!("Labels {:?}", view.axis_labels());

    let grid = MontageGrid::new(2, 3, volume.min_spacing() * 4.0);
    let montage = view
        .montage_slices(&grid, &volume)
        .expect("should have computed montage slices");
    info!("Montage has {} slices inside the volume", montage.len());

    let image = volume
        .get_image_from_view(&view, 256, 256, Interpolation::Trilinear)
        .expect("should have returned image of the virtual slice");
    if let Err(e) = image.save("result.png") {
        log::error!("Could not save result.png: {e}");
    }
}
