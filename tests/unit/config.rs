use std::io::Cursor;

use super::*;

#[test]
fn empty_object_yields_the_default_show() {
    let cfg = ShowConfig::from_reader(Cursor::new("{}")).unwrap();
    assert_eq!(cfg, ShowConfig::default());
    cfg.validate().unwrap();
    assert_eq!(cfg.log_path, PathBuf::from("cartoon.bin"));
    assert_eq!(cfg.scenes.snowfall.count, 100);
    assert_eq!(cfg.scenes.fireworks.count, 25);
    assert!((cfg.first_scene_chance * cfg.second_scene_chance - 0.81).abs() < 1e-12);
}

#[test]
fn partial_overrides_keep_other_defaults() {
    let json = r#"{
        "canvas": { "width": 320, "height": 200 },
        "scenes": { "fireworks": { "marker": "fireworks...", "count": 3, "admission": 1.0 } }
    }"#;
    let cfg = ShowConfig::from_reader(Cursor::new(json)).unwrap();
    cfg.validate().unwrap();
    assert_eq!(cfg.canvas.fps, 60);
    assert_eq!(cfg.canvas.width, 320);
    assert_eq!(cfg.scenes.snowfall, SceneSettings::snowfall());
    assert_eq!(cfg.scenes.fireworks.count, 3);
    assert_eq!(cfg.scenes.fireworks.audio_path, None);
}

#[test]
fn unknown_fields_are_rejected() {
    let err = ShowConfig::from_reader(Cursor::new(r#"{ "colour": 1 }"#)).unwrap_err();
    assert!(err.to_string().contains("parse show config JSON"));
}

#[test]
fn validate_rejects_bad_values() {
    let mut cfg = ShowConfig::default();
    cfg.first_scene_chance = 1.5;
    assert!(cfg.validate().is_err());

    let mut cfg = ShowConfig::default();
    cfg.scenes.snowfall.marker = "short".to_string();
    assert!(cfg.validate().is_err());

    let mut cfg = ShowConfig::default();
    cfg.scenes.fireworks.marker = cfg.scenes.snowfall.marker.clone();
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("must differ"));

    let mut cfg = ShowConfig::default();
    cfg.scenes.fireworks.admission = -0.1;
    assert!(cfg.validate().is_err());

    let mut cfg = ShowConfig::default();
    cfg.canvas.height = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn missing_audio_file_reads_as_silence() {
    let mut s = SceneSettings::snowfall();
    assert!(s.read_audio().unwrap().is_empty());
    s.audio_path = Some(PathBuf::from("target/unit_config/does_not_exist.mp3"));
    assert!(s.read_audio().unwrap().is_empty());
}

#[test]
fn load_missing_config_fails_with_path() {
    let err = ShowConfig::load("target/unit_config/missing.json").unwrap_err();
    assert!(err.to_string().contains("missing.json"));
}
