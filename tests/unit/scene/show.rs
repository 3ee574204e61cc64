use std::path::PathBuf;

use super::*;
use crate::{
    audio::backend::SilentAudio,
    render::surface::RecordingSurface,
    scene_log::{codec::Marker, locator::locate},
};

fn test_config(name: &str) -> ShowConfig {
    let dir = PathBuf::from("target").join("unit_show");
    std::fs::create_dir_all(&dir).unwrap();
    let mut cfg = ShowConfig {
        log_path: dir.join(name),
        first_scene_chance: 1.0,
        second_scene_chance: 1.0,
        ..ShowConfig::default()
    };
    cfg.canvas.width = 64;
    cfg.canvas.height = 32;
    cfg.scenes.snowfall.count = 3;
    cfg.scenes.snowfall.admission = 1.0;
    cfg.scenes.fireworks.count = 2;
    cfg.scenes.fireworks.admission = 1.0;
    cfg
}

fn marker(s: &str) -> Marker {
    Marker::try_from(s).unwrap()
}

#[test]
fn certain_chances_write_both_scenes_in_order() {
    let cfg = test_config("both.bin");
    let created = create_show(&cfg, &mut Rng64::new(1)).unwrap();
    assert_eq!(
        created,
        CreatedScenes {
            snowfall: true,
            fireworks: true
        }
    );

    let first = locate(&cfg.log_path, &marker("firstscene..")).unwrap();
    let second = locate(&cfg.log_path, &marker("secondscene.")).unwrap();
    assert_eq!(first.marker_offset, 0);
    assert_eq!(
        second.marker_offset,
        (12 + 4 + 3 * DriftParticle::RECORD_SIZE) as u64
    );
}

#[test]
fn fireworks_need_the_snowfall_scene() {
    let mut cfg = test_config("none.bin");
    cfg.first_scene_chance = 0.0;
    std::fs::write(&cfg.log_path, b"stale").unwrap();

    let created = create_show(&cfg, &mut Rng64::new(2)).unwrap();
    assert_eq!(created, CreatedScenes::default());
    assert!(!cfg.log_path.exists());
}

#[test]
fn second_scene_can_be_skipped() {
    let mut cfg = test_config("first_only.bin");
    cfg.second_scene_chance = 0.0;
    let created = create_show(&cfg, &mut Rng64::new(3)).unwrap();
    assert!(created.snowfall);
    assert!(!created.fireworks);
    assert!(locate(&cfg.log_path, &marker("secondscene.")).unwrap_err().is_not_found());
}

#[test]
fn unreadable_fireworks_audio_keeps_the_snowfall_scene() {
    let mut cfg = test_config("fireworks_unreadable.bin");
    cfg.scenes.fireworks.audio_path = Some(PathBuf::from("target"));

    let created = create_show(&cfg, &mut Rng64::new(6)).unwrap();
    assert!(created.snowfall);
    assert!(!created.fireworks);
    assert!(locate(&cfg.log_path, &marker("firstscene..")).is_ok());
    assert!(locate(&cfg.log_path, &marker("secondscene.")).unwrap_err().is_not_found());
}

#[test]
fn unreadable_snowfall_audio_leaves_out_both_scenes() {
    let mut cfg = test_config("snowfall_unreadable.bin");
    cfg.scenes.snowfall.audio_path = Some(PathBuf::from("target"));

    let created = create_show(&cfg, &mut Rng64::new(7)).unwrap();
    assert_eq!(created, CreatedScenes::default());
}

#[test]
fn missing_scenes_are_skipped_within_one_frame() {
    let cfg = test_config("absent.bin");
    let _ = std::fs::remove_file(&cfg.log_path);
    let mut show = Show::from_config(&cfg, SilentAudio::factory(), &mut Rng64::new(4)).unwrap();
    let mut surface = RecordingSurface::new(64, 32);

    assert_eq!(show.current(), Some("snowfall"));
    assert_eq!(show.draw_frame(&mut surface), LoopControl::Exit);
    assert!(show.is_over());
    assert_eq!(show.current(), None);
}

#[test]
fn missing_snowfall_hands_the_frame_to_fireworks() {
    let cfg = test_config("fireworks_only.bin");
    remove_log(&cfg.log_path).unwrap();
    let fireworks = &cfg.scenes.fireworks;
    write_scene(&cfg.log_path, &marker(&fireworks.marker), b"", fireworks.count, || {
        BallisticParticle::default()
    })
    .unwrap();

    let mut show = Show::from_config(&cfg, SilentAudio::factory(), &mut Rng64::new(8)).unwrap();
    let mut surface = RecordingSurface::new(64, 32);
    assert_eq!(show.draw_frame(&mut surface), LoopControl::Continue);
    assert_eq!(show.current(), Some("fireworks"));
    assert_eq!(surface.texts(), vec!["NEW YEAR"]);
    show.shutdown();
}

#[test]
fn full_show_plays_both_scenes_to_completion() {
    let cfg = test_config("full.bin");
    let mut rng = Rng64::new(5);
    create_show(&cfg, &mut rng).unwrap();
    let mut show = Show::from_config(&cfg, SilentAudio::factory(), &mut rng).unwrap();
    let mut surface = RecordingSurface::new(64, 32);

    let mut saw_fireworks = false;
    let mut frames = 0;
    while show.draw_frame(&mut surface) == LoopControl::Continue {
        frames += 1;
        if surface.texts() == vec!["NEW YEAR"] {
            saw_fireworks = true;
        }
        assert!(frames < 10_000, "show never ended");
    }
    assert!(saw_fireworks);
    assert!(show.is_over());
    show.shutdown();
}
