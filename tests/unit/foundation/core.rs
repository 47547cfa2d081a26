use super::*;

#[test]
fn pointer_pick_rounds_to_two_decimals() {
    let fp = FocusPoint::from_pointer(123.0, 45.0, 400.0, 300.0).unwrap();
    assert_eq!(fp, FocusPoint::new(0.31, 0.15));
}

#[test]
fn pointer_pick_outside_box_is_not_clamped() {
    let fp = FocusPoint::from_pointer(-40.0, 660.0, 400.0, 300.0).unwrap();
    assert_eq!(fp, FocusPoint::new(-0.1, 2.2));
    assert!(!fp.is_inside_frame());
}

#[test]
fn pointer_pick_rejects_empty_box() {
    assert!(FocusPoint::from_pointer(1.0, 1.0, 0.0, 10.0).is_err());
}

#[test]
fn focus_to_pixels_scales_by_dimensions() {
    let dims = CanvasDimensions::new(800, 600).unwrap();
    let v = FocusPoint::new(0.25, 0.5).to_pixels(dims);
    assert_eq!(v, Vec2::new(200.0, 300.0));
}

#[test]
fn fit_keeps_intrinsic_size_without_limit() {
    let d = CanvasDimensions::fit(800, 600, None).unwrap();
    assert_eq!((d.width, d.height), (800, 600));
    let d = CanvasDimensions::fit(800, 600, Some(1024)).unwrap();
    assert_eq!((d.width, d.height), (800, 600));
}

#[test]
fn fit_preserves_aspect_ratio_when_shrinking() {
    let d = CanvasDimensions::fit(800, 600, Some(400)).unwrap();
    assert_eq!((d.width, d.height), (400, 300));

    let d = CanvasDimensions::fit(1920, 1080, Some(333)).unwrap();
    assert_eq!(d.width, 333);
    assert_eq!(d.height, 187);
    assert!((d.aspect_ratio() - 16.0 / 9.0).abs() < 0.01);
}

#[test]
fn fit_rejects_degenerate_inputs() {
    assert!(CanvasDimensions::fit(0, 10, None).is_err());
    assert!(CanvasDimensions::fit(10, 10, Some(0)).is_err());
}

#[test]
fn fps_frame_duration() {
    let fps = Fps::new(60, 1).unwrap();
    assert!((fps.frame_duration_ms() - 16.666_666).abs() < 1e-3);
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}
