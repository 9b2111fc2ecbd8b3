//! In-memory storage backend (transient, per-process)

use std::sync::Mutex;

use async_trait::async_trait;
use gradebook_types::{Student, StudentPayload};

use super::{StoreError, StudentStore};

/// Owned in-memory store: a record list in insertion order plus a monotonic
/// id counter, both behind one mutex.
///
/// Insertion order and ascending-id order coincide because ids only grow, so
/// `list` can return the vec as-is.
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

struct Inner {
    students: Vec<Student>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                students: Vec::new(),
                next_id: 1,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Recover the guard if a previous holder panicked.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StudentStore for MemoryStore {
    async fn create(&self, payload: StudentPayload) -> Result<Student, StoreError> {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        let student = payload.into_student(id);
        inner.students.push(student.clone());
        Ok(student)
    }

    async fn list(&self) -> Result<Vec<Student>, StoreError> {
        Ok(self.lock().students.clone())
    }

    async fn get(&self, id: i64) -> Result<Student, StoreError> {
        self.lock()
            .students
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, id: i64, payload: StudentPayload) -> Result<Student, StoreError> {
        let mut inner = self.lock();
        let slot = inner
            .students
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StoreError::NotFound)?;
        *slot = payload.into_student(id);
        Ok(slot.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let idx = inner
            .students
            .iter()
            .position(|s| s.id == id)
            .ok_or(StoreError::NotFound)?;
        inner.students.remove(idx);
        Ok(())
    }

    async fn topper(&self) -> Result<Student, StoreError> {
        let inner = self.lock();
        // Strict '>' keeps the first maximum, which is the lowest id since
        // the vec is id-ordered.
        inner
            .students
            .iter()
            .reduce(|best, s| if s.score > best.score { s } else { best })
            .cloned()
            .ok_or(StoreError::Empty)
    }
}
