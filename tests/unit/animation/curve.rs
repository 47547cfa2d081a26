use super::*;

fn three_step() -> KeyframeCurve {
    let t = |scale: f64, rotation: f64| PropertyTargets {
        scale: Some(scale),
        rotation: Some(rotation),
        ..PropertyTargets::default()
    };
    KeyframeCurve::new(
        vec![
            KeyframeSegment::new(t(1.5, FRAC_PI_6), 400.0),
            KeyframeSegment::new(t(2.0, -FRAC_PI_6), 400.0),
            KeyframeSegment::new(t(3.0, 0.0), 700.0),
        ],
        Ease::Linear,
    )
}

#[test]
fn keyframe_total_duration_includes_delays() {
    assert_eq!(three_step().total_duration_ms(), 1500.0);
    assert_eq!(CurveProfile::classic().total_duration_ms(), 3500.0);
}

#[test]
fn keyframe_starts_at_initial_state() {
    assert_eq!(three_step().value_at(0.0), AnimationState::INITIAL);
    assert_eq!(three_step().value_at(-50.0), AnimationState::INITIAL);
}

#[test]
fn keyframe_interpolates_within_segment() {
    let c = three_step();
    let s = c.value_at(200.0);
    assert!((s.scale - 1.25).abs() < 1e-12);
    assert!((s.rotation - FRAC_PI_6 / 2.0).abs() < 1e-12);
    // Second segment starts from the first segment's targets.
    let s = c.value_at(600.0);
    assert!((s.scale - 1.75).abs() < 1e-12);
    assert!(s.rotation.abs() < 1e-12);
}

#[test]
fn keyframe_holds_final_values_exactly() {
    let c = three_step();
    for t in [1500.0, 1500.1, 99_999.0] {
        let s = c.value_at(t);
        assert_eq!(s.scale, 3.0);
        assert_eq!(s.rotation, 0.0);
    }
}

#[test]
fn untargeted_properties_hold() {
    let c = three_step();
    let s = c.value_at(1000.0);
    assert_eq!(s.text_x, AnimationState::INITIAL.text_x);
    assert_eq!(s.text_y, AnimationState::INITIAL.text_y);
    assert_eq!(s.text_size, AnimationState::INITIAL.text_size);
}

#[test]
fn delay_holds_previous_values() {
    let CurveProfile::Keyframes(c) = CurveProfile::classic() else {
        panic!("classic is a keyframe curve");
    };
    assert_eq!(c.value_at(50.0), AnimationState::INITIAL);
    assert_eq!(c.value_at(99.9), AnimationState::INITIAL);
    assert_ne!(c.value_at(150.0), AnimationState::INITIAL);
}

#[test]
fn segment_ease_override_is_used() {
    let mut c = three_step();
    c.segments[0].ease = Some(Ease::InQuad);
    let s = c.value_at(200.0);
    // InQuad(0.5) = 0.25
    assert!((s.scale - 1.125).abs() < 1e-12);
}

#[test]
fn zero_duration_segment_jumps() {
    let c = KeyframeCurve::new(
        vec![KeyframeSegment::new(
            PropertyTargets {
                scale: Some(4.0),
                ..PropertyTargets::default()
            },
            0.0,
        )],
        Ease::Linear,
    );
    assert_eq!(c.value_at(0.0).scale, 4.0);
}

#[test]
fn classic_final_state() {
    let c = CurveProfile::classic();
    let s = c.value_at(c.total_duration_ms());
    assert_eq!(s.scale, 3.0);
    assert_eq!(s.rotation, FRAC_PI_6);
    assert_eq!(s.text_size, 1.0);
    assert_eq!(s.text_y, 0.85);
}

#[test]
fn value_at_is_pure() {
    let c = CurveProfile::classic();
    for i in 0..200 {
        let t = f64::from(i) * 17.5;
        assert_eq!(c.value_at(t), c.value_at(t));
    }
}

#[test]
fn three_phase_compounds_to_three() {
    let z = ThreePhaseZoom::default();
    assert_eq!(z.value_at(0.0).scale, 1.0);
    assert_eq!(z.value_at(z.total_duration_ms()).scale, 3.0);
    assert_eq!(z.value_at(z.total_duration_ms() * 10.0).scale, 3.0);

    // After the first third exactly one phase has completed.
    let third = z.total_duration_ms() / 3.0 + 1.0;
    let s = z.value_at(third).scale;
    assert!(s > 1.6 && s < 1.8, "scale after first phase was {s}");
    assert_eq!(z.value_at(third).rotation, 0.0);
}

#[test]
fn three_phase_scale_never_decreases() {
    let z = ThreePhaseZoom::default();
    let mut prev = 0.0;
    for f in 0..=z.total_frames {
        let s = z.value_at(f as f64 * z.frame_ms).scale;
        assert!(s >= prev - 1e-9);
        prev = s;
    }
}

#[test]
fn validate_rejects_bad_curves() {
    let mut c = three_step();
    c.segments[1].duration_ms = -1.0;
    assert!(c.validate().is_err());

    let empty = KeyframeCurve::new(vec![], Ease::Linear);
    assert!(empty.validate().is_err());

    let z = ThreePhaseZoom {
        total_frames: 0,
        ..ThreePhaseZoom::default()
    };
    assert!(CurveProfile::ThreePhaseZoom(z).validate().is_err());

    assert!(CurveProfile::classic().validate().is_ok());
    assert!(CurveProfile::three_phase().validate().is_ok());
}

#[test]
fn profile_json_shape() {
    let json = r#"{
        "kind": "keyframes",
        "ease": "linear",
        "segments": [
            { "scale": 2.0, "duration_ms": 100.0 },
            { "rotation": 1.0, "duration_ms": 100.0, "delay_ms": 50.0, "ease": "out_quad" }
        ]
    }"#;
    let p: CurveProfile = serde_json::from_str(json).unwrap();
    assert_eq!(p.total_duration_ms(), 250.0);
    assert_eq!(p.value_at(100.0).scale, 2.0);
    assert_eq!(p.value_at(250.0).rotation, 1.0);

    let z: CurveProfile = serde_json::from_str(
        r#"{"kind":"three_phase_zoom","total_frames":150,"frame_ms":20.0,"gain":0.5,
            "c1":{"x":1.06,"y":0.74},"c2":{"x":1.0,"y":1.0}}"#,
    )
    .unwrap();
    assert_eq!(z.total_duration_ms(), 3000.0);
}
