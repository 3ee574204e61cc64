//! The append-only scene log: per scene, a 12-byte marker, a `u32` little-endian audio length,
//! the audio bytes, then a fixed number of fixed-size particle records.

pub(crate) mod codec;
pub(crate) mod locator;
pub(crate) mod writer;
