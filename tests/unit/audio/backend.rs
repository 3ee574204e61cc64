use std::sync::mpsc;
use std::time::Duration;

use super::*;

#[test]
fn buffer_is_a_tenth_of_a_second() {
    let f = StreamFormat {
        sample_rate: 44_100,
        channels: 2,
    };
    assert_eq!(f.buffer_frames(), 4_410);
    let tiny = StreamFormat {
        sample_rate: 5,
        channels: 1,
    };
    assert_eq!(tiny.buffer_frames(), 1);
}

#[test]
fn duration_counts_frames_not_samples() {
    let audio = DecodedAudio {
        format: StreamFormat {
            sample_rate: 4,
            channels: 2,
        },
        interleaved_f32: Arc::new(vec![0.0; 16]),
    };
    assert_eq!(audio.frames(), 8);
    assert_eq!(audio.duration(), Duration::from_secs(2));
}

#[test]
fn silent_play_requires_open_device() {
    let mut backend = SilentAudio::new();
    let stream = backend.decode(b"anything").unwrap();
    let err = backend.play(&stream, Box::new(|| {})).unwrap_err();
    assert!(err.to_string().starts_with("audio error:"));
}

#[test]
fn silent_completes_after_hold() {
    let mut backend = SilentAudio::with_hold(Duration::from_millis(5));
    let stream = backend.decode(&[]).unwrap();
    backend.open_device(stream.format.sample_rate, stream.format.buffer_frames()).unwrap();

    let (tx, rx) = mpsc::channel();
    backend
        .play(&stream, Box::new(move || tx.send(()).unwrap()))
        .unwrap();
    rx.recv_timeout(Duration::from_secs(5)).unwrap();
    backend.close();
}

#[test]
fn silent_close_cancels_pending_completion() {
    let mut backend = SilentAudio::with_hold(Duration::from_secs(60));
    let stream = backend.decode(&[]).unwrap();
    backend.open_device(48_000, 4_800).unwrap();

    let (tx, rx) = mpsc::channel::<()>();
    backend
        .play(&stream, Box::new(move || tx.send(()).unwrap()))
        .unwrap();
    backend.close();
    // The callback (and its sender) was dropped without firing.
    assert!(rx.recv().is_err());
}
