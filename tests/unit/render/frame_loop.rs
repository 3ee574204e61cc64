use super::*;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::Rgba8;
use crate::render::{cpu::CpuSurface, surface::RecordingSurface};

fn small_canvas() -> CanvasConfig {
    CanvasConfig {
        width: 8,
        height: 4,
        fps: 1000,
        title: "test".to_string(),
    }
}

#[test]
fn default_canvas_matches_the_show() {
    let c = CanvasConfig::default();
    assert_eq!((c.width, c.height, c.fps), (960, 500, 60));
    assert_eq!(c.title, "New Year");
}

#[test]
fn rejects_zero_fps() {
    let canvas = CanvasConfig {
        fps: 0,
        ..small_canvas()
    };
    assert!(FrameLoop::new(canvas).is_err());
}

#[test]
fn setup_runs_once_and_draw_until_exit() {
    let fl = FrameLoop::new(small_canvas()).unwrap().realtime(false);
    let mut surface = RecordingSurface::new(8, 4);
    let mut setups = 0;
    let mut seen = Vec::new();
    let stats = fl
        .run(
            &mut surface,
            None,
            |s| {
                setups += 1;
                s.invert_y();
            },
            |_, idx| {
                seen.push(idx.0);
                if idx.0 == 4 {
                    LoopControl::Exit
                } else {
                    LoopControl::Continue
                }
            },
        )
        .unwrap();

    assert_eq!(setups, 1);
    assert!(surface.inverted);
    assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    // The exit frame is not presented.
    assert_eq!(stats.frames, 4);
    assert!(!stats.hit_frame_limit);
}

#[test]
fn frame_limit_stops_a_runaway_loop() {
    let fl = FrameLoop::new(small_canvas())
        .unwrap()
        .realtime(false)
        .max_frames(Some(3));
    let mut surface = RecordingSurface::new(8, 4);
    let stats = fl
        .run(&mut surface, None, |_| {}, |_, _| LoopControl::Continue)
        .unwrap();
    assert_eq!(stats.frames, 3);
    assert!(stats.hit_frame_limit);
}

#[test]
fn frames_reach_the_sink_in_order() {
    let fl = FrameLoop::new(small_canvas()).unwrap().realtime(false);
    let mut surface = CpuSurface::new(8, 4).unwrap();
    let mut sink = InMemorySink::new();
    fl.run(
        &mut surface,
        Some(&mut sink),
        |_| {},
        |s, idx| {
            s.clear(Rgba8::opaque(idx.0 as u8, 0, 0));
            if idx.0 == 2 {
                LoopControl::Exit
            } else {
                LoopControl::Continue
            }
        },
    )
    .unwrap();

    assert!(sink.is_ended());
    assert_eq!(sink.config().map(|c| c.fps), Some(1000));
    let reds: Vec<u8> = sink.frames().iter().map(|(_, f)| f.data[0]).collect();
    assert_eq!(reds, vec![0, 1]);
    let idxs: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idxs, vec![0, 1]);
}

#[test]
fn boxed_sink_outlives_the_loop() {
    let fl = FrameLoop::new(small_canvas()).unwrap().realtime(false);
    let mut surface = CpuSurface::new(8, 4).unwrap();
    let mut sink: Option<Box<dyn FrameSink>> = Some(Box::new(InMemorySink::new()));
    let stats = fl
        .run(
            &mut surface,
            sink.as_deref_mut(),
            |_| {},
            |_, idx| {
                if idx.0 == 3 {
                    LoopControl::Exit
                } else {
                    LoopControl::Continue
                }
            },
        )
        .unwrap();

    assert_eq!(stats.frames, 3);
    // Still usable once the loop is done with it.
    assert!(sink.take().is_some());
}

#[test]
fn exiting_on_the_first_frame_presents_nothing() {
    let fl = FrameLoop::new(small_canvas()).unwrap().realtime(false);
    let mut surface = CpuSurface::new(8, 4).unwrap();
    let mut sink = InMemorySink::new();
    let stats = fl
        .run(&mut surface, Some(&mut sink), |_| {}, |_, _| LoopControl::Exit)
        .unwrap();

    assert_eq!(stats.frames, 0);
    assert!(sink.frames().is_empty());
    assert!(sink.is_ended());
}

#[test]
fn sink_needs_a_rasterizing_surface() {
    let fl = FrameLoop::new(small_canvas()).unwrap().realtime(false);
    let mut surface = RecordingSurface::new(8, 4);
    let mut sink = InMemorySink::new();
    let err = fl
        .run(&mut surface, Some(&mut sink), |_| {}, |_, _| LoopControl::Continue)
        .unwrap_err();
    assert!(err.to_string().starts_with("render error:"));
}

#[test]
fn surface_size_must_match_canvas() {
    let fl = FrameLoop::new(small_canvas()).unwrap();
    let mut surface = RecordingSurface::new(9, 4);
    assert!(fl
        .run(&mut surface, None, |_| {}, |_, _| LoopControl::Exit)
        .is_err());
}
