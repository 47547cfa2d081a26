use super::*;

#[test]
fn empty_object_is_all_defaults() {
    let cfg = SuperzoomConfig::from_reader("{}".as_bytes()).unwrap();
    assert_eq!(cfg, SuperzoomConfig::default());
    assert_eq!(cfg.fps, 60);
    assert_eq!(cfg.gif_sample_hz, 20.0);
    assert_eq!(cfg.export_name, "superzoom");
    assert_eq!(cfg.proxy_prefix.as_deref(), Some(DEFAULT_PROXY_PREFIX));
    assert_eq!(cfg.curve.total_duration_ms(), 3500.0);
}

#[test]
fn partial_override() {
    let json = r#"{
        "fps": 30,
        "max_width": 640,
        "background": [255, 255, 255, 255],
        "proxy_prefix": null,
        "curve": { "kind": "three_phase_zoom" }
    }"#;
    let cfg = SuperzoomConfig::from_reader(json.as_bytes()).unwrap();
    assert_eq!(cfg.fps().unwrap(), Fps::new(30, 1).unwrap());
    assert_eq!(cfg.max_width, Some(640));
    assert_eq!(cfg.render_settings().background_rgba, [255; 4]);
    assert_eq!(cfg.proxy_prefix, None);
    assert_eq!(cfg.curve, CurveProfile::three_phase());
}

#[test]
fn invalid_values_are_rejected() {
    for json in [
        r#"{"fps": 0}"#,
        r#"{"gif_sample_hz": 0}"#,
        r#"{"video_fps": -1}"#,
        r#"{"max_width": 0}"#,
        r#"{"overlay": {"text": " ", "font_path": "a.ttf"}}"#,
        r#"{"fps": "fast"}"#,
    ] {
        let err = SuperzoomConfig::from_reader(json.as_bytes()).unwrap_err();
        assert!(matches!(err, SuperzoomError::Validation(_)), "{json}");
    }
}

#[test]
fn missing_file_is_a_validation_error() {
    let err = SuperzoomConfig::from_path("target/no/such/config.json").unwrap_err();
    assert!(err.to_string().contains("open config JSON"));
}

#[test]
fn overlay_without_font_file_fails_to_load() {
    let cfg = SuperzoomConfig {
        overlay: Some(OverlayConfig {
            text: "whoa".to_string(),
            font_path: PathBuf::from("target/no/such/font.ttf"),
        }),
        ..SuperzoomConfig::default()
    };
    cfg.validate().unwrap();
    assert!(cfg.text_overlay().is_err());
    assert!(SuperzoomConfig::default().text_overlay().unwrap().is_none());
}
