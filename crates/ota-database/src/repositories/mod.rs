//! Concrete repository implementations.

pub mod firmware;
