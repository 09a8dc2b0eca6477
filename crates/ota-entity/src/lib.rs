//! # ota-entity
//!
//! Domain entity models for the firmware catalog. Every struct here is
//! either a catalog row or a value object derived from one.

pub mod firmware;
