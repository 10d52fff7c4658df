//! The database module
//! Provide the in-memory reference backend: append-ordered records and
//! exact top-k cosine search over a linear scan

use crate::backend::{Metadata, QueryHit, Record, StoreConfig, UpsertMode, VectorStore};
use crate::error::StoreError;
use crate::vector::cosine_similarity;
use parking_lot::RwLock;
use rayon::prelude::*;

/// Flat storage, guarded as one unit so a reader never sees a torn append.
///
/// Vectors are stored contiguously as `[v1_d1, v1_d2, ..., v2_d1, ...]`;
/// record `i` owns `ids[i]`, `metadata[i]` and the i-th `dimension` slice.
#[derive(Default)]
struct Records {
    ids: Vec<String>,
    vectors: Vec<f32>,
    metadata: Vec<Metadata>,
    dimension: Option<usize>,
}

impl Records {
    fn count(&self) -> usize {
        self.ids.len()
    }

    /// Panics if the index is out of bounds.
    fn get_vector(&self, index: usize) -> &[f32] {
        let dim = self.dimension.unwrap_or(0);
        let start = index * dim;
        &self.vectors[start..start + dim]
    }

    fn hit(&self, index: usize, score: f32) -> QueryHit {
        QueryHit {
            id: self.ids[index].clone(),
            score,
            metadata: self.metadata[index].clone(),
        }
    }
}

pub struct InMemoryStore {
    records: RwLock<Records>,
    config: StoreConfig,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Creates a new empty store with append-only upserts.
    ///
    /// The store starts with no dimension constraint. The dimension will be
    /// set automatically on the first upsert.
    ///
    /// # Examples
    ///
    /// ```
    /// use ragvec::InMemoryStore;
    ///
    /// let store = InMemoryStore::new();
    /// assert_eq!(store.len(), 0);
    /// ```
    pub fn new() -> InMemoryStore {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> InMemoryStore {
        InMemoryStore { records: RwLock::new(Records::default()), config }
    }

    /// Stores a record.
    ///
    /// With [`UpsertMode::Append`] the record is always appended, even when
    /// the id is already present. With [`UpsertMode::Replace`] the first
    /// record with the same id is overwritten in place and keeps its
    /// insertion position. The first record fixes the store's dimension.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the vector length differs from the established
    /// dimension. The store is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use ragvec::{InMemoryStore, Metadata};
    ///
    /// let store = InMemoryStore::new();
    /// store.upsert("vec1".to_string(), vec![3.0, 4.0], Metadata::new()).unwrap();
    ///
    /// // Dimension mismatch error
    /// let result = store.upsert("vec2".to_string(), vec![1.0, 2.0, 3.0], Metadata::new());
    /// assert!(result.is_err());
    /// assert_eq!(store.len(), 1);
    /// ```
    pub fn upsert(&self, id: String, vector: Vec<f32>, metadata: Metadata) -> Result<(), StoreError> {
        let mut records = self.records.write();

        let dim = vector.len();
        let established = records.dimension;
        match established {
            None => records.dimension = Some(dim),
            Some(expected) if expected != dim => {
                return Err(StoreError::DimensionMismatch { expected, actual: dim });
            }
            Some(_) => {}
        }

        if self.config.upsert_mode == UpsertMode::Replace {
            if let Some(index) = records.ids.iter().position(|x| x == &id) {
                let start = index * dim;
                records.vectors[start..start + dim].copy_from_slice(&vector);
                records.metadata[index] = metadata;
                tracing::debug!(%id, index, "replaced record");
                return Ok(());
            }
        }

        records.ids.push(id);
        records.vectors.extend(vector);
        records.metadata.push(metadata);
        tracing::debug!(count = records.count(), dimension = dim, "appended record");

        Ok(())
    }

    /// Returns the `top_k` records most similar to `query`.
    ///
    /// Every record is scored with cosine similarity, results come back in
    /// descending score order, and records with equal scores keep their
    /// insertion order. An empty store answers every query with no hits;
    /// `top_k` larger than the record count returns all records.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the store holds records of another dimension.
    ///
    /// # Examples
    ///
    /// ```
    /// use ragvec::{InMemoryStore, Metadata};
    ///
    /// let store = InMemoryStore::new();
    /// store.upsert("vec1".to_string(), vec![1.0, 0.0, 0.0], Metadata::new()).unwrap();
    /// store.upsert("vec2".to_string(), vec![0.0, 1.0, 0.0], Metadata::new()).unwrap();
    /// store.upsert("vec3".to_string(), vec![0.7, 0.7, 0.0], Metadata::new()).unwrap();
    ///
    /// let results = store.query(&[1.0, 0.0, 0.0], 2).unwrap();
    /// assert_eq!(results.len(), 2);
    /// assert_eq!(results[0].id, "vec1"); // Most similar
    /// assert!((results[0].score - 1.0).abs() < 1e-6);
    /// ```
    pub fn query(&self, query: &[f32], top_k: usize) -> Result<Vec<QueryHit>, StoreError> {
        let records = self.records.read();

        let Some(dim) = records.dimension else {
            return Ok(Vec::new());
        };
        if query.len() != dim {
            return Err(StoreError::DimensionMismatch { expected: dim, actual: query.len() });
        }
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let scores = self.score_all(&records, query)?;
        let best = select_top_k(&scores, top_k);

        tracing::debug!(scanned = scores.len(), returned = best.len(), top_k, "query complete");

        Ok(best.into_iter().map(|(i, score)| records.hit(i, score)).collect())
    }

    /// Scores in insertion order; the parallel path keeps that order too.
    fn score_all(&self, records: &Records, query: &[f32]) -> Result<Vec<f32>, StoreError> {
        let count = records.count();
        if count >= self.config.parallel_threshold {
            (0..count)
                .into_par_iter()
                .map(|i| cosine_similarity(query, records.get_vector(i)))
                .collect()
        } else {
            (0..count)
                .map(|i| cosine_similarity(query, records.get_vector(i)))
                .collect()
        }
    }

    /// Returns the first record stored under `id`, if any.
    pub fn get(&self, id: &str) -> Option<Record> {
        let records = self.records.read();
        let index = records.ids.iter().position(|x| x == id)?;

        Some(Record {
            id: records.ids[index].clone(),
            vector: records.get_vector(index).to_vec(),
            metadata: records.metadata[index].clone(),
        })
    }

    /// All ids in insertion order, duplicates included.
    pub fn ids(&self) -> Vec<String> {
        self.records.read().ids.clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The dimension fixed by the first upsert.
    pub fn dimension(&self) -> Option<usize> {
        self.records.read().dimension
    }
}

/// Largest `top_k` served by the insertion buffer; beyond it a full sort wins.
const BUFFERED_TOP_K: usize = 32;

/// Best `top_k` of `(index, score)`, best first, lower index first on ties.
///
/// Small `top_k` uses a bounded insertion buffer: a candidate goes after
/// every buffered entry scoring greater than or equal to it. Otherwise all
/// entries are stable-sorted, which keeps the same tie order in O(n log n).
fn select_top_k(scores: &[f32], top_k: usize) -> Vec<(usize, f32)> {
    if top_k > BUFFERED_TOP_K || top_k >= scores.len() {
        let mut all: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
        all.sort_by(|a, b| b.1.total_cmp(&a.1));
        all.truncate(top_k);
        return all;
    }

    let mut best: Vec<(usize, f32)> = Vec::with_capacity(top_k.min(scores.len()) + 1);

    for (i, &score) in scores.iter().enumerate() {
        if best.len() == top_k
            && best.last().is_some_and(|&(_, worst)| worst.total_cmp(&score).is_ge())
        {
            continue;
        }
        let insert_index = best.partition_point(|&(_, s)| s.total_cmp(&score).is_ge());
        best.insert(insert_index, (i, score));
        best.truncate(top_k);
    }

    best
}

impl VectorStore for InMemoryStore {
    fn upsert(&self, id: String, vector: Vec<f32>, metadata: Metadata) -> Result<(), StoreError> {
        InMemoryStore::upsert(self, id, vector, metadata)
    }

    fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<QueryHit>, StoreError> {
        InMemoryStore::query(self, vector, top_k)
    }

    fn len(&self) -> usize {
        InMemoryStore::len(self)
    }
}
