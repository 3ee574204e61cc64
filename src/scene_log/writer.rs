use std::{
    fs::OpenOptions,
    io::{BufWriter, Write as _},
    path::Path,
};

use crate::{
    foundation::error::SceneResult,
    particle::Particle,
    scene_log::codec::{Marker, write_length_prefixed_blob, write_marker, write_record},
};

/// Append one complete scene section to the shared log.
///
/// Writes the marker, the length-prefixed audio blob and exactly `count` records produced by
/// `factory`. The file is created when absent. Calling this twice appends the section twice.
#[tracing::instrument(skip(marker, audio, factory), fields(marker = %marker, audio_len = audio.len(), kind = P::KIND))]
pub fn write_scene<P: Particle>(
    path: &Path,
    marker: &Marker,
    audio: &[u8],
    count: usize,
    mut factory: impl FnMut() -> P,
) -> SceneResult<()> {
    let file = OpenOptions::new().append(true).create(true).open(path)?;
    let mut w = BufWriter::new(file);

    write_marker(&mut w, marker)?;
    write_length_prefixed_blob(&mut w, audio)?;
    for _ in 0..count {
        write_record(&mut w, &factory())?;
    }
    w.flush()?;

    tracing::debug!(count, "scene section appended");
    Ok(())
}

/// Remove a previous log. Returns `false` when there was nothing to remove.
pub fn remove_log(path: &Path) -> SceneResult<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
