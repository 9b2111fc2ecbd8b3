//! Gradebook Types - Pure type definitions
//!
//! This crate contains only pure data types with no async runtime
//! dependencies, shared between the server and any future clients.

pub mod student;

pub use student::*;
