//! Student record types and payload validation

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest score a student can hold.
pub const SCORE_MIN: f64 = 0.0;
/// Highest score a student can hold.
pub const SCORE_MAX: f64 = 100.0;

/// A stored student record.
///
/// The `id` is assigned by the storage backend on creation and is never
/// accepted from a client payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub age: i32,
    pub course: String,
    pub score: f64,
}

/// Body of a create or update request.
///
/// Updates are a full replace: every field here overwrites the stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentPayload {
    pub name: String,
    pub age: i32,
    pub course: String,
    pub score: f64,
}

impl StudentPayload {
    /// Check the payload against the record constraints.
    ///
    /// Must pass before the storage backend is touched.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("name"));
        }
        if self.course.trim().is_empty() {
            return Err(ValidationError::EmptyField("course"));
        }
        // NaN fails both range comparisons below, but reject it with the
        // range error text rather than letting it slip through.
        if !self.score.is_finite() || self.score < SCORE_MIN || self.score > SCORE_MAX {
            return Err(ValidationError::ScoreOutOfRange(self.score));
        }
        Ok(())
    }

    /// Materialize a full record with a backend-assigned id.
    pub fn into_student(self, id: i64) -> Student {
        Student {
            id,
            name: self.name,
            age: self.age,
            course: self.course,
            score: self.score,
        }
    }
}

/// Payload rejection reasons
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("score {0} is outside the range {SCORE_MIN} to {SCORE_MAX}")]
    ScoreOutOfRange(f64),

    #[error("{0} must not be empty")]
    EmptyField(&'static str),
}
