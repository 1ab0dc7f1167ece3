//! Export RW S3 adapter
//!
//! Publishes finished CSV files through the S3 writer service.

pub mod client;

pub use client::S3WriterClient;
