//! Persisted indexing results.
//!
//! One file per snapshot path under the configured index directory:
//! msgpack, zstd-compressed, stamped with a format version and a
//! fingerprint of the snapshot bytes it was built from.

use crate::error::{RefdocError, Result};
use crate::indexer::IndexOutput;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use xxhash_rust::xxh3::xxh3_64;

pub const INDEX_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StoredIndex {
    version: u32,
    fingerprint: u64,
    index: IndexOutput,
}

pub fn fingerprint(bytes: &[u8]) -> u64 {
    xxh3_64(bytes)
}

/// `<base_dir>/<xxh3 of the absolute snapshot path>.bin`
pub fn index_path(base_dir: &Path, snapshot: &Path) -> PathBuf {
    let abs_path = snapshot
        .canonicalize()
        .unwrap_or_else(|_| snapshot.to_path_buf());
    let hash = xxh3_64(abs_path.to_string_lossy().as_bytes());
    base_dir.join(format!("{:016x}.bin", hash))
}

fn encode(index: &IndexOutput, fingerprint: u64) -> Result<Vec<u8>> {
    let stored = StoredIndex {
        version: INDEX_VERSION,
        fingerprint,
        index: index.clone(),
    };
    let bytes = rmp_serde::to_vec(&stored)
        .map_err(|e| RefdocError::Storage(format!("MSGPACK error: {}", e)))?;
    zstd::encode_all(&bytes[..], 0)
        .map_err(|e| RefdocError::Storage(format!("Zstd compression failed: {}", e)))
}

fn decode(bytes: &[u8]) -> Result<StoredIndex> {
    let decompressed = zstd::decode_all(bytes)
        .map_err(|e| RefdocError::Storage(format!("Zstd decompression failed: {}", e)))?;
    rmp_serde::from_slice(&decompressed)
        .map_err(|e| RefdocError::Storage(format!("MSGPACK error: {}", e)))
}

/// Reads a stored index. Anything unusable is deleted and reported as
/// `Ok(None)` so the caller rebuilds.
pub fn load(path: &Path, fingerprint: u64) -> Result<Option<IndexOutput>> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = std::fs::read(path)?;
    match decode(&bytes) {
        Ok(stored) if stored.version != INDEX_VERSION => {
            tracing::warn!(
                "Index version mismatch at {} (found {}, expected {}). Will rebuild.",
                path.display(),
                stored.version,
                INDEX_VERSION
            );
            let _ = std::fs::remove_file(path);
            Ok(None)
        }
        Ok(stored) if stored.fingerprint != fingerprint => {
            tracing::warn!(
                "Index at {} was built from a different snapshot. Will rebuild.",
                path.display()
            );
            let _ = std::fs::remove_file(path);
            Ok(None)
        }
        Ok(stored) => {
            tracing::info!("Loaded index from {}", path.display());
            Ok(Some(stored.index))
        }
        Err(e) => {
            tracing::warn!(
                "Failed to parse index at {}: {}. Will rebuild.",
                path.display(),
                e
            );
            let _ = std::fs::remove_file(path);
            Ok(None)
        }
    }
}

pub fn save(path: &Path, index: &IndexOutput, fingerprint: u64) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let bytes = encode(index, fingerprint)?;

    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, bytes)?;
    std::fs::rename(temp_path, path)?;

    tracing::info!("Saved index to {}", path.display());
    Ok(())
}

/// Removes every stored index under `base_dir`.
pub fn clear_all(base_dir: &Path) -> Result<()> {
    if base_dir.exists() {
        std::fs::remove_dir_all(base_dir)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::RelationshipGraph;
    use crate::model::TypeRef;
    use refdoc_api::RelationKind;

    fn sample() -> IndexOutput {
        let mut graph = RelationshipGraph::new();
        graph.add_edge(3, RelationKind::SuperClass, 0);
        IndexOutput {
            graph,
            lookups: vec![("Foo[]".to_string(), TypeRef::array(3, 1))],
            warnings: vec!["arity".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("index.bin");
        save(&path, &sample(), 7).unwrap();
        assert_eq!(load(&path, 7).unwrap(), Some(sample()));
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_fingerprint_mismatch_discards_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.bin");
        save(&path, &sample(), 7).unwrap();
        assert_eq!(load(&path, 8).unwrap(), None);
        assert!(!path.exists());
    }

    #[test]
    fn test_garbage_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.bin");
        std::fs::write(&path, b"not an index").unwrap();
        assert_eq!(load(&path, 7).unwrap(), None);
        assert!(!path.exists());
    }

    #[test]
    fn test_index_path_is_stable() {
        let base = Path::new("/tmp/refdoc");
        let a = index_path(base, Path::new("/no/such/snapshot.json"));
        let b = index_path(base, Path::new("/no/such/snapshot.json"));
        assert_eq!(a, b);
        assert!(a.to_string_lossy().ends_with(".bin"));
        assert_ne!(a, index_path(base, Path::new("/no/such/other.json")));
    }
}
