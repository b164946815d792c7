//! Business logic and port definitions for Mnemo.
//!
//! This crate resolves request configurations against the process-wide
//! settings and defines the "ports" (embedder and vector index traits) that
//! the infrastructure layer implements. It depends only on `mnemo-types` --
//! never on `mnemo-infra` or any network/model crate.

pub mod config;
pub mod memory;
