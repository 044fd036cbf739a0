//! Common library for the Campus Credits application
//!
//! This crate provides shared infrastructure used by the service crates:
//! PostgreSQL connection pooling, schema migrations, and the shared
//! database error types.

pub mod database;
pub mod error;
