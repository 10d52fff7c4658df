//! The backend contract shared by every store implementation.
//!
//! Callers only ever see [`VectorStore`]. The in-memory [`InMemoryStore`] is
//! the reference backend; any other backend must return hits in the same
//! `{id, score, metadata}` shape, ordered by descending score with earlier
//! insertions first on ties.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::db::InMemoryStore;
use crate::error::StoreError;

/// Opaque payload stored next to a vector and returned unmodified.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A stored (identifier, vector, metadata) tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub vector: Vec<f32>,
    #[serde(default)]
    pub metadata: Metadata,
}

/// One ranked result of a top-k query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryHit {
    pub id: String,
    pub score: f32,
    pub metadata: Metadata,
}

pub trait VectorStore: Send + Sync {
    /// Stores a record. Fails with `DimensionMismatch` when the vector length
    /// differs from the dimension established by earlier records.
    fn upsert(&self, id: String, vector: Vec<f32>, metadata: Metadata) -> Result<(), StoreError>;

    /// Returns at most `top_k` hits, best first, ties in insertion order.
    fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<QueryHit>, StoreError>;

    /// Number of stored records.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What `upsert` does when the id is already present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertMode {
    /// Always append a new record, duplicates included.
    #[default]
    Append,
    /// Overwrite the first record with the same id in its original slot.
    Replace,
}

impl std::str::FromStr for UpsertMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "append" => Ok(UpsertMode::Append),
            "replace" => Ok(UpsertMode::Replace),
            other => Err(format!("unknown upsert mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub upsert_mode: UpsertMode,
    /// Record count from which a query scores records on the rayon pool.
    pub parallel_threshold: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            upsert_mode: UpsertMode::Append,
            parallel_threshold: 10_000,
        }
    }
}

impl StoreConfig {
    /// Builds the backend once; the returned handle is shared for the
    /// lifetime of the process.
    pub fn build(&self) -> Arc<dyn VectorStore> {
        tracing::debug!(
            upsert_mode = ?self.upsert_mode,
            parallel_threshold = self.parallel_threshold,
            "building in-memory vector store"
        );
        Arc::new(InMemoryStore::with_config(self.clone()))
    }
}
