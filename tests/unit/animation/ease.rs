use super::*;

const ALL: [Ease; 8] = [
    Ease::Linear,
    Ease::InQuad,
    Ease::OutQuad,
    Ease::InOutQuad,
    Ease::InCubic,
    Ease::OutCubic,
    Ease::InOutCubic,
    Ease::OutElastic {
        amplitude: 1.0,
        period: 0.8,
    },
];

#[test]
fn endpoints_are_stable() {
    for ease in ALL {
        assert_eq!(ease.apply(0.0), 0.0);
        assert_eq!(ease.apply(1.0), 1.0);
    }
}

#[test]
fn out_of_range_progress_is_clamped() {
    for ease in ALL {
        assert_eq!(ease.apply(-3.0), 0.0);
        assert_eq!(ease.apply(7.0), 1.0);
    }
}

#[test]
fn polynomial_eases_are_monotonic() {
    for ease in &ALL[..7] {
        let a = ease.apply(0.25);
        let b = ease.apply(0.5);
        let c = ease.apply(0.75);
        assert!(a < b);
        assert!(b < c);
    }
}

#[test]
fn elastic_overshoots_then_settles() {
    let ease = Ease::out_elastic();
    let peak = (1..100)
        .map(|i| ease.apply(f64::from(i) / 100.0))
        .fold(f64::MIN, f64::max);
    assert!(peak > 1.0, "expected overshoot, peak was {peak}");
    assert!((ease.apply(0.95) - 1.0).abs() < 0.01);
}

#[test]
fn elastic_parameters_are_clamped() {
    let wild = Ease::OutElastic {
        amplitude: 0.0,
        period: 50.0,
    };
    let clamped = Ease::OutElastic {
        amplitude: 1.0,
        period: 2.0,
    };
    for i in 0..=20 {
        let t = f64::from(i) / 20.0;
        assert_eq!(wild.apply(t), clamped.apply(t));
    }
}

#[test]
fn serde_uses_snake_case_tags() {
    let json = serde_json::to_string(&Ease::OutCubic).unwrap();
    assert_eq!(json, "\"out_cubic\"");
    let back: Ease =
        serde_json::from_str(r#"{"out_elastic":{"amplitude":1.0,"period":0.8}}"#).unwrap();
    assert_eq!(back, Ease::out_elastic());
}
