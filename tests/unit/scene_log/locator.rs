use std::io::Cursor;
use std::path::PathBuf;

use super::*;
use crate::{
    particle::drift::DriftParticle,
    scene_log::writer::{remove_log, write_scene},
};

fn scratch_log(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_locator");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    remove_log(&path).unwrap();
    path
}

#[test]
fn scan_finds_first_occurrence() {
    let marker = Marker::new(*b"firstscene..");
    let mut bytes = vec![0u8; 5];
    bytes.extend_from_slice(marker.as_bytes());
    bytes.extend_from_slice(marker.as_bytes());
    let mut r = Cursor::new(bytes);
    assert_eq!(scan_for_marker(&mut r, &marker).unwrap(), 5);
}

#[test]
fn scan_sees_markers_straddling_chunk_boundaries() {
    let marker = Marker::new(*b"secondscene.");
    for offset in [SCAN_CHUNK - 11, SCAN_CHUNK - 1, SCAN_CHUNK, SCAN_CHUNK + 3] {
        let mut bytes = vec![b'x'; offset];
        bytes.extend_from_slice(marker.as_bytes());
        bytes.extend_from_slice(&[0u8; 7]);
        let mut r = Cursor::new(bytes);
        assert_eq!(scan_for_marker(&mut r, &marker).unwrap(), offset as u64);
    }
}

#[test]
fn scan_reports_not_found_at_end_of_input() {
    let marker = Marker::new(*b"secondscene.");
    let mut r = Cursor::new(b"firstscene..tail".to_vec());
    let err = scan_for_marker(&mut r, &marker).unwrap_err();
    assert!(matches!(err, SceneError::MarkerNotFound { .. }));

    let mut empty = Cursor::new(Vec::new());
    assert!(scan_for_marker(&mut empty, &marker).unwrap_err().is_not_found());
}

#[test]
fn scan_ignores_partial_marker_at_end() {
    let marker = Marker::new(*b"firstscene..");
    let mut r = Cursor::new(b"abcfirstscene.".to_vec());
    assert!(scan_for_marker(&mut r, &marker).is_err());
}

#[test]
fn locate_leaves_cursor_at_first_record() {
    let path = scratch_log("cursor.bin");
    let marker = Marker::new(*b"firstscene..");
    let records = [
        DriftParticle {
            x: 10.0,
            size: 2.0,
            ..DriftParticle::default()
        },
        DriftParticle {
            x: 20.0,
            size: 3.0,
            ..DriftParticle::default()
        },
    ];
    let mut it = records.iter().copied();
    write_scene(&path, &marker, b"ID3-audio", 2, || it.next().unwrap()).unwrap();

    let mut located = locate(&path, &marker).unwrap();
    assert_eq!(located.marker_offset, 0);
    assert_eq!(located.audio, b"ID3-audio");
    assert_eq!(
        located.records.next_record::<DriftParticle>().unwrap(),
        records[0]
    );
    assert_eq!(
        located.records.next_record::<DriftParticle>().unwrap(),
        records[1]
    );
    assert_eq!(located.records.records_read(), 2);
    assert!(located.records.next_record::<DriftParticle>().is_err());
}

#[test]
fn locate_missing_file_is_an_io_error() {
    let path = scratch_log("never_written.bin");
    let err = locate(&path, &Marker::new(*b"firstscene..")).unwrap_err();
    assert!(matches!(err, SceneError::Io(_)));
    assert!(err.is_not_found());
}
