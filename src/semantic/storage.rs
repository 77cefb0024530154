//! Snapshot persistence for a built corpus.
//!
//! A snapshot is one directory holding three artifacts:
//! - `vectors.idx`: the binary [`IndexArtifact`]
//! - `documents.json`: JSON array of document strings
//! - `metadata.json`: JSON array of metadata objects
//!
//! Every artifact is written to a temporary file in the same directory and
//! renamed into place. Loading only succeeds for a consistent triple: equal
//! document and metadata counts, a matching index row count, and an index
//! fingerprint that matches the stored documents.

use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::error::{StorageError, StorageResult};
use crate::semantic::Metadata;
use crate::vector::{EmbedderDescriptor, FINGERPRINT_LEN, FlatIndex, IndexArtifact, VectorError};

pub const INDEX_FILE: &str = "vectors.idx";
pub const DOCUMENTS_FILE: &str = "documents.json";
pub const METADATA_FILE: &str = "metadata.json";

/// Everything restored from a snapshot directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub index: FlatIndex,
    pub descriptor: EmbedderDescriptor,
    pub documents: Vec<String>,
    pub metadata: Vec<Metadata>,
}

/// SHA-256 over the length-prefixed documents, in order.
pub fn document_fingerprint(documents: &[String]) -> [u8; FINGERPRINT_LEN] {
    let mut hasher = Sha256::new();
    for document in documents {
        hasher.update((document.len() as u64).to_le_bytes());
        hasher.update(document.as_bytes());
    }
    hasher.finalize().into()
}

/// True when all three artifacts are present.
pub fn snapshot_exists(dir: &Path) -> bool {
    [INDEX_FILE, DOCUMENTS_FILE, METADATA_FILE]
        .iter()
        .all(|name| dir.join(name).is_file())
}

/// Writes a snapshot, creating `dir` when needed.
pub fn save_snapshot(
    dir: &Path,
    index: &FlatIndex,
    descriptor: &EmbedderDescriptor,
    documents: &[String],
    metadata: &[Metadata],
) -> StorageResult<()> {
    check_consistency(documents.len(), metadata.len(), index.size())?;

    std::fs::create_dir_all(dir).map_err(|source| StorageError::FileWrite {
        path: dir.to_path_buf(),
        source,
    })?;

    write_json(dir, DOCUMENTS_FILE, &documents)?;
    write_json(dir, METADATA_FILE, &metadata)?;

    // The index goes last: its fingerprint ties it to the documents above
    let artifact = IndexArtifact {
        index: index.clone(),
        descriptor: descriptor.clone(),
        fingerprint: document_fingerprint(documents),
    };
    write_atomic(dir, INDEX_FILE, |writer| {
        artifact.write_to(writer).map_err(|e| match e {
            VectorError::Storage(io) => io,
            other => std::io::Error::other(other.to_string()),
        })
    })?;

    tracing::info!(
        "Saved snapshot with {} documents to {}",
        documents.len(),
        dir.display()
    );
    Ok(())
}

/// Reads and validates a snapshot.
pub fn load_snapshot(dir: &Path) -> StorageResult<Snapshot> {
    let index_path = dir.join(INDEX_FILE);
    if !index_path.is_file() {
        return Err(StorageError::MissingArtifact { path: index_path });
    }

    let documents: Vec<String> = read_json(dir, DOCUMENTS_FILE)?;
    let metadata: Vec<Metadata> = read_json(dir, METADATA_FILE)?;

    let artifact = IndexArtifact::read(&index_path).map_err(|e| StorageError::Decode {
        path: index_path.clone(),
        reason: e.to_string(),
    })?;

    check_consistency(documents.len(), metadata.len(), artifact.index.size())?;
    if artifact.fingerprint != document_fingerprint(&documents) {
        return Err(StorageError::FingerprintMismatch);
    }

    Ok(Snapshot {
        index: artifact.index,
        descriptor: artifact.descriptor,
        documents,
        metadata,
    })
}

fn check_consistency(documents: usize, metadata: usize, rows: usize) -> StorageResult<()> {
    if documents != metadata || documents != rows {
        return Err(StorageError::Inconsistent {
            documents,
            metadata,
            rows,
        });
    }
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(dir: &Path, name: &str, value: &T) -> StorageResult<()> {
    write_atomic(dir, name, |writer| {
        serde_json::to_writer(&mut *writer, value).map_err(std::io::Error::other)
    })
}

fn read_json<T: DeserializeOwned>(dir: &Path, name: &str) -> StorageResult<T> {
    let path = dir.join(name);
    if !path.is_file() {
        return Err(StorageError::MissingArtifact { path });
    }
    let json = std::fs::read_to_string(&path).map_err(|source| StorageError::FileRead {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|e| StorageError::Decode {
        path,
        reason: e.to_string(),
    })
}

/// Writes through a temporary file in `dir`, then renames it to `name`.
fn write_atomic<F>(dir: &Path, name: &str, write: F) -> StorageResult<()>
where
    F: FnOnce(&mut BufWriter<&mut NamedTempFile>) -> std::io::Result<()>,
{
    let path = dir.join(name);
    let write_error = |source| StorageError::FileWrite {
        path: path.clone(),
        source,
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(write_error)?;
    {
        let mut writer = BufWriter::new(&mut temp);
        write(&mut writer).map_err(write_error)?;
        writer.flush().map_err(write_error)?;
    }
    temp.as_file().sync_all().map_err(write_error)?;
    temp.persist(&path).map_err(|e| write_error(e.error))?;
    Ok(())
}
