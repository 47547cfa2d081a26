use super::*;

fn pts() -> [(Point, Point, Point, Point); 3] {
    [
        (
            Point::new(0.0, 0.0),
            Point::new(1.06, 0.74),
            Point::new(1.0, 1.0),
            Point::new(1.0, 1.0),
        ),
        (
            Point::new(-3.5, 12.25),
            Point::new(7.0, -1.0),
            Point::new(0.1, 0.3),
            Point::new(9.75, -4.125),
        ),
        (
            Point::new(0.3, 0.7),
            Point::new(0.3, 0.7),
            Point::new(0.3, 0.7),
            Point::new(0.3, 0.7),
        ),
    ]
}

#[test]
fn bezier_endpoints_are_exact() {
    for (p0, c1, c2, p1) in pts() {
        assert_eq!(bezier(0.0, p0, c1, c2, p1), p0);
        assert_eq!(bezier(1.0, p0, c1, c2, p1), p1);
    }
}

#[test]
fn bezier_matches_kurbo_cubic() {
    use kurbo::ParamCurve;

    for (p0, c1, c2, p1) in pts() {
        let cubic = kurbo::CubicBez::new(p0, c1, c2, p1);
        for i in 0..=10 {
            let t = f64::from(i) / 10.0;
            let ours = bezier(t, p0, c1, c2, p1);
            let theirs = cubic.eval(t);
            assert!((ours.x - theirs.x).abs() < 1e-9);
            assert!((ours.y - theirs.y).abs() < 1e-9);
        }
    }
}

#[test]
fn time_slice_is_clamped_outside_window() {
    let total = 150;
    // Slice 1 covers frames [50, 100).
    assert_eq!(time_slice(1, 0, total), 0.0);
    assert_eq!(time_slice(1, 49, total), 0.0);
    assert_eq!(time_slice(1, 100, total), 1.0);
    assert_eq!(time_slice(1, 10_000, total), 1.0);
    assert!((time_slice(1, 75, total) - 0.5).abs() < 1e-12);
}

#[test]
fn time_slice_stays_in_unit_range() {
    for total in [1, 2, 3, 7, 150, 200] {
        for slice in 0..SLICE_COUNT {
            for frame in 0..(total * 2) {
                let t = time_slice(slice, frame, total);
                assert!((0.0..=1.0).contains(&t));
            }
        }
    }
}

#[test]
fn time_slice_with_no_frames_is_finished() {
    assert_eq!(time_slice(0, 0, 0), 1.0);
}
