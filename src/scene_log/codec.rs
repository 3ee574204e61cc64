//! Fixed-layout binary codec for the scene log.
//!
//! Every integer and float is little-endian. Records are encoded field by field so the on-disk
//! layout never depends on in-memory struct layout.

use std::io::{Read, Write};

use crate::{
    foundation::error::{SceneError, SceneResult},
    particle::Particle,
};

/// Byte length of a scene marker.
pub const MARKER_LEN: usize = 12;

/// Byte length of the audio length prefix.
pub const BLOB_LEN_PREFIX: usize = 4;

/// Fixed 12-byte scene identifier used as a linear-scan anchor.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Marker([u8; MARKER_LEN]);

impl Marker {
    pub const fn new(bytes: [u8; MARKER_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; MARKER_LEN] {
        &self.0
    }
}

impl TryFrom<&str> for Marker {
    type Error = SceneError;

    fn try_from(s: &str) -> SceneResult<Self> {
        let bytes: [u8; MARKER_LEN] = s.as_bytes().try_into().map_err(|_| {
            SceneError::validation(format!(
                "scene marker '{s}' must be exactly {MARKER_LEN} bytes, got {}",
                s.len()
            ))
        })?;
        Ok(Self(bytes))
    }
}

impl std::fmt::Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

impl std::fmt::Debug for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Marker({self})")
    }
}

pub fn write_marker<W: Write>(w: &mut W, marker: &Marker) -> SceneResult<()> {
    w.write_all(marker.as_bytes())?;
    Ok(())
}

/// Write a `u32` length prefix followed by the raw bytes.
pub fn write_length_prefixed_blob<W: Write>(w: &mut W, bytes: &[u8]) -> SceneResult<()> {
    let len = u32::try_from(bytes.len()).map_err(|_| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("blob of {} bytes exceeds the u32 length prefix", bytes.len()),
        )
    })?;
    w.write_all(&len.to_le_bytes())?;
    w.write_all(bytes)?;
    Ok(())
}

pub fn write_record<W: Write, P: Particle>(w: &mut W, record: &P) -> SceneResult<()> {
    let mut buf = Vec::with_capacity(P::RECORD_SIZE);
    record.encode(&mut buf);
    debug_assert_eq!(buf.len(), P::RECORD_SIZE);
    w.write_all(&buf)?;
    Ok(())
}

pub fn read_marker<R: Read>(r: &mut R) -> SceneResult<Marker> {
    let mut bytes = [0u8; MARKER_LEN];
    r.read_exact(&mut bytes)?;
    Ok(Marker(bytes))
}

pub fn read_blob_len<R: Read>(r: &mut R) -> SceneResult<u32> {
    let mut bytes = [0u8; BLOB_LEN_PREFIX];
    r.read_exact(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

/// Read exactly `len` blob bytes (the prefix has already been consumed).
pub fn read_blob<R: Read>(r: &mut R, len: u32) -> SceneResult<Vec<u8>> {
    let mut bytes = Vec::new();
    let got = r.take(u64::from(len)).read_to_end(&mut bytes)?;
    if got != len as usize {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("blob truncated: expected {len} bytes, got {got}"),
        )
        .into());
    }
    Ok(bytes)
}

pub fn read_length_prefixed_blob<R: Read>(r: &mut R) -> SceneResult<Vec<u8>> {
    let len = read_blob_len(r)?;
    read_blob(r, len)
}

pub fn read_record<R: Read, P: Particle>(r: &mut R) -> SceneResult<P> {
    let mut buf = vec![0u8; P::RECORD_SIZE];
    r.read_exact(&mut buf)?;
    P::decode(&buf)
}

/// Appends little-endian fields to a record buffer.
pub struct FieldWriter<'a> {
    out: &'a mut Vec<u8>,
}

impl<'a> FieldWriter<'a> {
    pub fn new(out: &'a mut Vec<u8>) -> Self {
        Self { out }
    }

    pub fn f64(&mut self, v: f64) -> &mut Self {
        self.out.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.out.push(v);
        self
    }

    pub fn bool(&mut self, v: bool) -> &mut Self {
        self.u8(u8::from(v))
    }
}

/// Reads little-endian fields back out of a record buffer.
pub struct FieldReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> SceneResult<&'a [u8]> {
        let end = self.pos + n;
        let Some(slice) = self.bytes.get(self.pos..end) else {
            return Err(SceneError::validation(format!(
                "record truncated at byte {} (need {n} more, have {})",
                self.pos,
                self.bytes.len().saturating_sub(self.pos)
            )));
        };
        self.pos = end;
        Ok(slice)
    }

    pub fn f64(&mut self) -> SceneResult<f64> {
        let b = self.take(8)?;
        Ok(f64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    pub fn u8(&mut self) -> SceneResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn bool(&mut self) -> SceneResult<bool> {
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(SceneError::validation(format!(
                "invalid bool byte {other} in record"
            ))),
        }
    }

    /// Fail unless every byte was consumed.
    pub fn finish(self) -> SceneResult<()> {
        if self.pos != self.bytes.len() {
            return Err(SceneError::validation(format!(
                "record has {} trailing bytes",
                self.bytes.len() - self.pos
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene_log/codec.rs"]
mod tests;
