//! Per-snapshot documentation session.
//!
//! Owns the decoded tables, the [`TypeSystem`] with its caches and, once
//! indexing finished, the [`IndexOutput`]. Graph-backed queries go through
//! [`DocumentationSession::ready`], which fails unless the session is
//! `Ready`.

pub mod storage;

use crate::config::RefdocConfig;
use crate::error::{RefdocError, Result};
use crate::indexer::{self, IndexOutput};
use crate::model::TypeId;
use crate::snapshot::{DataTables, Snapshot};
use crate::types::TypeSystem;
use refdoc_api::{IndexStats, RelationKind};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Indexing,
    Ready,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Empty => "empty",
            SessionState::Indexing => "indexing",
            SessionState::Ready => "ready",
        };
        f.write_str(s)
    }
}

/// Where a session persists its index and which snapshot bytes it
/// belongs to.
#[derive(Debug, Clone)]
struct Persistence {
    path: PathBuf,
    fingerprint: u64,
}

struct Inner {
    state: SessionState,
    /// Bumped by every reset so a stale indexing run cannot install itself.
    generation: u64,
    system: Arc<TypeSystem>,
    index: Option<Arc<IndexOutput>>,
    loaded_from_cache: bool,
}

/// A consistent view of a ready session. Cheap to clone; stays valid after
/// a concurrent reset.
#[derive(Debug, Clone)]
pub struct ReadyIndex {
    system: Arc<TypeSystem>,
    index: Arc<IndexOutput>,
    loaded_from_cache: bool,
}

impl ReadyIndex {
    pub fn system(&self) -> &TypeSystem {
        &self.system
    }

    pub fn index(&self) -> &IndexOutput {
        &self.index
    }

    pub fn relation(&self, kind: RelationKind, id: TypeId) -> Vec<TypeId> {
        self.index.graph.relation(kind, id)
    }

    pub fn relations_of(&self, id: TypeId) -> Vec<(RelationKind, Vec<TypeId>)> {
        self.index.graph.relations_of(id)
    }

    pub fn events(&self) -> &BTreeMap<String, Vec<TypeId>> {
        &self.index.events
    }

    pub fn stats(&self) -> Result<IndexStats> {
        let bindings = self.system.tables().bindings()?.len();
        let mut stats = self.index.stats(bindings);
        stats.loaded_from_cache = self.loaded_from_cache;
        Ok(stats)
    }
}

pub struct DocumentationSession {
    tables: Arc<DataTables>,
    config: Arc<RefdocConfig>,
    persistence: Option<Persistence>,
    inner: RwLock<Inner>,
}

impl fmt::Debug for DocumentationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentationSession")
            .field("types", &self.tables.type_count())
            .field("state", &self.state())
            .field("persistence", &self.persistence)
            .finish()
    }
}

impl DocumentationSession {
    /// An in-memory session; nothing is read from or written to disk.
    pub fn new(snapshot: Snapshot, config: RefdocConfig) -> Self {
        let tables = Arc::new(DataTables::new(snapshot));
        let config = Arc::new(config);
        Self {
            inner: RwLock::new(Inner {
                state: SessionState::Empty,
                generation: 0,
                system: Arc::new(TypeSystem::new(tables.clone(), config.clone())),
                index: None,
                loaded_from_cache: false,
            }),
            tables,
            config,
            persistence: None,
        }
    }

    /// Loads a snapshot file. The index for it is cached under the
    /// configured index directory.
    pub fn open(path: &Path, config: RefdocConfig) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let snapshot = Snapshot::from_slice(&bytes)?;
        let persistence = Persistence {
            path: storage::index_path(&config.index_dir(), path),
            fingerprint: storage::fingerprint(&bytes),
        };
        tracing::info!(
            "Opened snapshot {} ({} types)",
            path.display(),
            snapshot.types.len()
        );
        let mut session = Self::new(snapshot, config);
        session.persistence = Some(persistence);
        Ok(session)
    }

    pub fn config(&self) -> &RefdocConfig {
        &self.config
    }

    pub fn tables(&self) -> &DataTables {
        &self.tables
    }

    /// Path of the persisted index, when the session has one.
    pub fn index_path(&self) -> Option<&Path> {
        self.persistence.as_ref().map(|p| p.path.as_path())
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> SessionState {
        self.read().state
    }

    pub fn is_ready(&self) -> bool {
        self.state() == SessionState::Ready
    }

    /// The type system, whatever the state. Usable for rendering before
    /// indexing; graph queries need [`Self::ready`].
    pub fn system(&self) -> Arc<TypeSystem> {
        self.read().system.clone()
    }

    pub fn ready(&self) -> Result<ReadyIndex> {
        let inner = self.read();
        match (&inner.state, &inner.index) {
            (SessionState::Ready, Some(index)) => Ok(ReadyIndex {
                system: inner.system.clone(),
                index: index.clone(),
                loaded_from_cache: inner.loaded_from_cache,
            }),
            (state, _) => Err(RefdocError::NotReady(state.to_string())),
        }
    }

    /// Runs the indexing pass on the blocking pool, or restores a persisted
    /// index built from the same snapshot bytes. Calling it on a ready
    /// session only reports the stats.
    pub async fn prepare(&self) -> Result<IndexStats> {
        let (system, generation) = {
            let mut inner = self.write();
            let state = inner.state;
            match state {
                SessionState::Ready => {
                    drop(inner);
                    return self.ready()?.stats();
                }
                SessionState::Indexing => {
                    return Err(RefdocError::NotReady(SessionState::Indexing.to_string()));
                }
                SessionState::Empty => {
                    inner.state = SessionState::Indexing;
                    (inner.system.clone(), inner.generation)
                }
            }
        };

        let start = Instant::now();
        let persistence = self.persistence.clone();
        let outcome =
            tokio::task::spawn_blocking(move || build_or_restore(&system, persistence))
                .await
                .map_err(|e| RefdocError::Internal(e.to_string()))
                .and_then(|result| result);

        let mut inner = self.write();
        if inner.generation != generation {
            tracing::warn!("Session was reset while indexing; discarding the result");
            return Err(RefdocError::NotReady(inner.state.to_string()));
        }
        match outcome {
            Ok((index, loaded_from_cache)) => {
                inner.state = SessionState::Ready;
                inner.index = Some(Arc::new(index));
                inner.loaded_from_cache = loaded_from_cache;
                drop(inner);
                let stats = self.ready()?.stats()?;
                tracing::info!(
                    "Documentation ready: {} types, {} edges in {:?}{}",
                    stats.types,
                    stats.edges,
                    start.elapsed(),
                    if loaded_from_cache { " (from cache)" } else { "" }
                );
                Ok(stats)
            }
            Err(e) => {
                tracing::error!("Failed to prepare documentation: {}", e);
                inner.state = SessionState::Empty;
                inner.system = Arc::new(TypeSystem::new(self.tables.clone(), self.config.clone()));
                Err(e)
            }
        }
    }

    /// Writes the ready index to the session's index path.
    pub async fn save(&self) -> Result<()> {
        let ready = self.ready()?;
        let Some(persistence) = self.persistence.clone() else {
            return Err(RefdocError::Storage(
                "session was not opened from a snapshot file".to_string(),
            ));
        };
        tokio::task::spawn_blocking(move || {
            storage::save(&persistence.path, ready.index(), persistence.fingerprint)
        })
        .await
        .map_err(|e| RefdocError::Internal(e.to_string()))?
    }

    /// Drops the index and every derived cache in one step. The decoded
    /// tables are kept.
    pub fn reset(&self) {
        let mut inner = self.write();
        inner.generation += 1;
        inner.state = SessionState::Empty;
        inner.index = None;
        inner.loaded_from_cache = false;
        inner.system = Arc::new(TypeSystem::new(self.tables.clone(), self.config.clone()));
        tracing::info!("Session reset");
    }

    /// Resets and deletes the persisted index for this snapshot.
    pub async fn clear_saved_index(&self) -> Result<()> {
        self.reset();
        if let Some(persistence) = &self.persistence
            && persistence.path.exists()
        {
            tokio::fs::remove_file(&persistence.path).await?;
        }
        Ok(())
    }
}

fn build_or_restore(
    system: &TypeSystem,
    persistence: Option<Persistence>,
) -> Result<(IndexOutput, bool)> {
    if let Some(persistence) = &persistence
        && let Some(index) = storage::load(&persistence.path, persistence.fingerprint)?
    {
        if !system.install_partitions(Arc::new(index.partitions.clone())) {
            tracing::warn!("Stored partitions arrived after a rebuild; keeping the built ones");
        }
        for (name, found) in &index.lookups {
            system.cache_lookup(name, *found);
        }
        return Ok((index, true));
    }
    Ok((indexer::index(system)?, false))
}
