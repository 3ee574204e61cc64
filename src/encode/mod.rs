//! Frame sinks fed by the frame loop.

/// MP4 output through the system `ffmpeg`.
pub(crate) mod ffmpeg;
/// PNG sequence output.
pub(crate) mod png;
/// Sink trait and the in-memory sink.
pub(crate) mod sink;

use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::SceneResult;

/// Ensure the parent directory of `path` exists.
pub(crate) fn ensure_parent_dir(path: &Path) -> SceneResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Convert premultiplied RGBA8 to straight alpha in place.
pub(crate) fn unpremultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}
