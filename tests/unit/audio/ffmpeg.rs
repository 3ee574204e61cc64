use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Instant,
};

use super::*;

fn counting_callback() -> (Arc<AtomicUsize>, CompletionCallback) {
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    let cb: CompletionCallback = Box::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (fired, cb)
}

#[cfg(unix)]
fn watched(program: &str, args: &[&str]) -> (PlayerSlot, Arc<AtomicUsize>, JoinHandle<()>) {
    let mut cmd = Command::new(program);
    cmd.args(args);
    let slot: PlayerSlot = Arc::new(Mutex::new(Some(PipedChild::spawn(cmd).unwrap())));
    let (fired, cb) = counting_callback();
    let watcher = {
        let slot = Arc::clone(&slot);
        std::thread::spawn(move || watch_player(slot, cb))
    };
    (slot, fired, watcher)
}

#[cfg(unix)]
#[test]
fn player_that_exits_cleanly_completes_once() {
    let (slot, fired, watcher) = watched("true", &[]);
    watcher.join().unwrap();
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(slot.lock().unwrap().is_none());
}

#[cfg(unix)]
#[test]
fn player_that_fails_never_completes() {
    let (_slot, fired, watcher) = watched("false", &[]);
    watcher.join().unwrap();
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[cfg(unix)]
#[test]
fn stopped_player_never_completes() {
    let (slot, fired, watcher) = watched("sleep", &["30"]);
    std::thread::sleep(Duration::from_millis(30));

    let started = Instant::now();
    stop_player(&slot);
    watcher.join().unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    // Nothing left to stop.
    stop_player(&slot);
}

#[test]
fn play_needs_an_open_device() {
    let stream = DecodedAudio {
        format: StreamFormat {
            sample_rate: 48_000,
            channels: 2,
        },
        interleaved_f32: Arc::new(vec![0.0; 96]),
    };
    let (fired, cb) = counting_callback();
    let mut backend = FfmpegAudio::new();
    assert!(backend.play(&stream, cb).is_err());
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[test]
fn close_cuts_a_long_stream_short_without_completing() {
    if !is_tool_on_path("ffplay") {
        return;
    }
    let stream = DecodedAudio {
        format: StreamFormat {
            sample_rate: 48_000,
            channels: 2,
        },
        interleaved_f32: Arc::new(vec![0.0; 48_000 * 2 * 30]),
    };
    let (fired, cb) = counting_callback();
    let mut backend = FfmpegAudio::new();
    backend
        .open_device(48_000, stream.format.buffer_frames())
        .unwrap();
    backend.play(&stream, cb).unwrap();
    std::thread::sleep(Duration::from_millis(50));

    let started = Instant::now();
    backend.close();
    assert!(started.elapsed() < Duration::from_secs(5));

    // A headless ffplay may bail out before close; either way nothing fires afterwards.
    let at_close = fired.load(Ordering::SeqCst);
    assert!(at_close <= 1);
    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(fired.load(Ordering::SeqCst), at_close);

    backend.close();
    assert_eq!(fired.load(Ordering::SeqCst), at_close);
}
