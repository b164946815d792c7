//! Shared domain types for Mnemo.
//!
//! This crate contains the types shared by the memory access layer:
//! process-wide settings, request/resolved configuration, vector index
//! records, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, secrecy, thiserror.

pub mod config;
pub mod error;
pub mod index;
pub mod settings;
