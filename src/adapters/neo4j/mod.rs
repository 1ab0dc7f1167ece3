//! Neo4j adapter
//!
//! Reads concepts over the Neo4j HTTP API.

pub mod client;
pub mod models;
pub mod queries;

pub use client::Neo4jClient;
