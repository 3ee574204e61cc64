use std::{
    fs::File,
    io::{BufReader, Read, Seek, SeekFrom},
    path::Path,
};

use crate::{
    foundation::error::{SceneError, SceneResult},
    particle::Particle,
    scene_log::codec::{MARKER_LEN, Marker, read_length_prefixed_blob, read_marker, read_record},
};

const SCAN_CHUNK: usize = 64 * 1024;

/// A scene found in the log: its audio blob plus a cursor over its particle records.
#[derive(Debug)]
pub struct LocatedScene {
    /// Byte offset of the marker in the log.
    pub marker_offset: u64,
    pub audio: Vec<u8>,
    pub records: ParticleStream,
}

/// Read-only handle positioned inside a scene's particle-record region.
///
/// The region has no length prefix; callers bound the number of reads themselves.
#[derive(Debug)]
pub struct ParticleStream {
    reader: BufReader<File>,
    read: u64,
}

impl ParticleStream {
    pub fn next_record<P: Particle>(&mut self) -> SceneResult<P> {
        let p = read_record::<_, P>(&mut self.reader)?;
        self.read += 1;
        Ok(p)
    }

    pub fn records_read(&self) -> u64 {
        self.read
    }
}

/// Find the first byte offset at which `marker` occurs, scanning from offset 0 one byte at a
/// time. Reaching end of input without a match yields [`SceneError::MarkerNotFound`].
///
/// Input is read in chunks, keeping a `MARKER_LEN - 1` byte overlap so a marker straddling two
/// chunks is still seen at its exact offset.
pub fn scan_for_marker<R: Read + Seek>(r: &mut R, marker: &Marker) -> SceneResult<u64> {
    let needle = marker.as_bytes();
    r.seek(SeekFrom::Start(0))?;

    let mut window: Vec<u8> = Vec::with_capacity(SCAN_CHUNK + MARKER_LEN);
    let mut window_start: u64 = 0;
    let mut chunk = vec![0u8; SCAN_CHUNK];
    loop {
        let n = match r.read(&mut chunk) {
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        if n == 0 {
            return Err(SceneError::MarkerNotFound {
                marker: marker.to_string(),
            });
        }
        window.extend_from_slice(&chunk[..n]);

        if let Some(i) = window.windows(MARKER_LEN).position(|w| w == needle) {
            return Ok(window_start + i as u64);
        }

        let keep = (MARKER_LEN - 1).min(window.len());
        let consumed = window.len() - keep;
        window.drain(..consumed);
        window_start += consumed as u64;
    }
}

/// Open the log read-only, find `marker`, and read the audio blob that follows it.
///
/// On success the returned [`ParticleStream`] sits at the first particle record.
#[tracing::instrument(skip(marker), fields(marker = %marker))]
pub fn locate(path: &Path, marker: &Marker) -> SceneResult<LocatedScene> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let marker_offset = scan_for_marker(&mut reader, marker)?;
    reader.seek(SeekFrom::Start(marker_offset))?;
    let anchor = read_marker(&mut reader)?;
    if anchor != *marker {
        return Err(SceneError::validation(format!(
            "scene log changed while reading: expected '{marker}' at offset {marker_offset}, found '{anchor}'"
        )));
    }
    let audio = read_length_prefixed_blob(&mut reader)?;

    tracing::info!(
        offset = marker_offset,
        audio_len = audio.len(),
        "scene marker found"
    );

    Ok(LocatedScene {
        marker_offset,
        audio,
        records: ParticleStream { reader, read: 0 },
    })
}

#[cfg(test)]
#[path = "../../tests/unit/scene_log/locator.rs"]
mod tests;
