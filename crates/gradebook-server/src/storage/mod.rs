//! Storage layer
//!
//! Two backends honor the same [`StudentStore`] contract: an in-memory store
//! for transient runs and a SQLite table (embedded, no external server) for
//! persistent ones. The backend is picked once at startup.

pub mod db;
pub mod memory;

pub use db::Database;
pub use memory::MemoryStore;

use async_trait::async_trait;
use gradebook_types::{Student, StudentPayload};
use thiserror::Error;

/// Outcome of a storage operation that did not produce a record.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record exists for the requested id.
    #[error("student not found")]
    NotFound,

    /// The store holds no records at all (topper on an empty store).
    #[error("no students")]
    Empty,

    /// The storage medium itself failed.
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Contract shared by both storage backends.
///
/// Ids are assigned by the backend, strictly increasing over its lifetime.
/// `list` returns ascending-id order; `topper` breaks score ties toward the
/// lowest id. Both backends must agree on these.
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Persist a new record and return it with its assigned id.
    async fn create(&self, payload: StudentPayload) -> Result<Student, StoreError>;

    /// All records, ascending by id.
    async fn list(&self) -> Result<Vec<Student>, StoreError>;

    /// The record with the given id.
    async fn get(&self, id: i64) -> Result<Student, StoreError>;

    /// Replace every field except `id`; returns the new state.
    async fn update(&self, id: i64, payload: StudentPayload) -> Result<Student, StoreError>;

    /// Remove the record with the given id.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;

    /// The record with the maximum score, lowest id on ties.
    async fn topper(&self) -> Result<Student, StoreError>;
}
