//! Binary index artifact.
//!
//! One file holds everything needed to answer queries against a built corpus:
//! the flat index rows, the embedder descriptor used to encode them, and a
//! fingerprint of the documents the rows were built from.
//!
//! # Storage Format
//!
//! - Header (16 bytes): magic `RFIX`, version, dimension, row count (u32 LE)
//! - Descriptor: u32 LE byte length followed by the descriptor as JSON
//! - Fingerprint: 32 bytes (SHA-256 of the document list)
//! - Rows: contiguous f32 values in little-endian format
//!
//! Reading memory-maps the file and rejects any size that does not match
//! the header exactly, so a truncated or padded artifact never loads.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use memmap2::MmapOptions;

use crate::vector::{EmbedderDescriptor, FlatIndex, VectorError};

/// Current artifact format version.
pub const STORAGE_VERSION: u32 = 1;

/// Size of the fixed header in bytes.
const HEADER_SIZE: usize = 16;

/// Magic bytes identifying index artifacts.
const MAGIC_BYTES: &[u8; 4] = b"RFIX";

/// Number of bytes per f32 value.
const BYTES_PER_F32: usize = 4;

/// Length of the document fingerprint.
pub const FINGERPRINT_LEN: usize = 32;

/// Contents of a `vectors.idx` file.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexArtifact {
    pub index: FlatIndex,
    pub descriptor: EmbedderDescriptor,
    pub fingerprint: [u8; FINGERPRINT_LEN],
}

impl IndexArtifact {
    /// Serializes the artifact into `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), VectorError> {
        let dimension = to_u32(self.index.dimension(), "dimension")?;
        let rows = to_u32(self.index.size(), "row count")?;
        let descriptor = serde_json::to_vec(&self.descriptor)
            .map_err(|e| VectorError::Serialization(e.to_string()))?;
        let descriptor_len = to_u32(descriptor.len(), "descriptor length")?;

        writer.write_all(MAGIC_BYTES)?;
        writer.write_all(&STORAGE_VERSION.to_le_bytes())?;
        writer.write_all(&dimension.to_le_bytes())?;
        writer.write_all(&rows.to_le_bytes())?;

        writer.write_all(&descriptor_len.to_le_bytes())?;
        writer.write_all(&descriptor)?;
        writer.write_all(&self.fingerprint)?;

        for value in self.index.as_slice() {
            writer.write_all(&value.to_le_bytes())?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Memory-maps and decodes the artifact at `path`.
    pub fn read(path: &Path) -> Result<Self, VectorError> {
        let file = File::open(path)?;
        // The artifact is only replaced through rename, never modified in place
        let mmap = unsafe { MmapOptions::new().map(&file)? };
        Self::from_bytes(&mmap)
    }

    /// Decodes an artifact from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, VectorError> {
        if bytes.len() < HEADER_SIZE {
            return Err(VectorError::InvalidFormat(
                "File too small to contain header".to_string(),
            ));
        }

        if &bytes[0..4] != MAGIC_BYTES {
            return Err(VectorError::InvalidFormat(
                "Invalid magic bytes".to_string(),
            ));
        }

        let version = read_u32(bytes, 4);
        if version != STORAGE_VERSION {
            return Err(VectorError::VersionMismatch {
                expected: STORAGE_VERSION,
                actual: version,
            });
        }

        let dimension = read_u32(bytes, 8) as usize;
        let rows = read_u32(bytes, 12) as usize;

        let mut offset = HEADER_SIZE;
        if bytes.len() < offset + 4 {
            return Err(VectorError::InvalidFormat(
                "Missing descriptor length".to_string(),
            ));
        }
        let descriptor_len = read_u32(bytes, offset) as usize;
        offset += 4;

        let descriptor_end = offset
            .checked_add(descriptor_len)
            .filter(|end| *end <= bytes.len())
            .ok_or_else(|| VectorError::InvalidFormat("Truncated descriptor".to_string()))?;
        let descriptor: EmbedderDescriptor =
            serde_json::from_slice(&bytes[offset..descriptor_end])
                .map_err(|e| VectorError::Serialization(e.to_string()))?;
        offset = descriptor_end;

        let fingerprint: [u8; FINGERPRINT_LEN] = bytes
            .get(offset..offset + FINGERPRINT_LEN)
            .and_then(|slice| slice.try_into().ok())
            .ok_or_else(|| VectorError::InvalidFormat("Truncated fingerprint".to_string()))?;
        offset += FINGERPRINT_LEN;

        let expected_data = rows
            .checked_mul(dimension)
            .and_then(|values| values.checked_mul(BYTES_PER_F32))
            .ok_or_else(|| VectorError::InvalidFormat("Row data size overflows".to_string()))?;
        let actual_data = bytes.len() - offset;
        if actual_data != expected_data {
            return Err(VectorError::InvalidFormat(format!(
                "expected {expected_data} bytes of row data, found {actual_data}"
            )));
        }

        let data = bytes[offset..]
            .chunks_exact(BYTES_PER_F32)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();

        Ok(Self {
            index: FlatIndex::from_raw(dimension, rows, data)?,
            descriptor,
            fingerprint,
        })
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn to_u32(value: usize, what: &str) -> Result<u32, VectorError> {
    u32::try_from(value)
        .map_err(|_| VectorError::InvalidFormat(format!("{what} {value} exceeds u32")))
}
