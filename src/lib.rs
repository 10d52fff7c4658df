//! # ragvec - An In-Memory Similarity Search Store
//!
//! ragvec stores documents as (id, embedding, metadata) records and answers
//! exact top-k nearest-neighbor queries by cosine similarity over a linear
//! scan. Results are ordered by descending score; records with equal scores
//! come back in insertion order.
//!
//! ## Example
//!
//! ```
//! use ragvec::{InMemoryStore, Metadata};
//! use serde_json::json;
//!
//! let store = InMemoryStore::new();
//!
//! let mut hello = Metadata::new();
//! hello.insert("text".to_string(), json!("hello"));
//!
//! store.upsert("d1".to_string(), vec![1.0, 0.0, 0.0], hello).unwrap();
//! store.upsert("d2".to_string(), vec![0.0, 1.0, 0.0], Metadata::new()).unwrap();
//!
//! let results = store.query(&[0.9, 0.1, 0.0], 1).unwrap();
//! assert_eq!(results[0].id, "d1"); // Most similar record
//! assert_eq!(results[0].metadata["text"], "hello");
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod server;
pub mod vector;
mod db;

pub use backend::{Metadata, QueryHit, Record, StoreConfig, UpsertMode, VectorStore};
pub use config::Config;
pub use db::InMemoryStore;
pub use error::{ConfigError, StoreError};
