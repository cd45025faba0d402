//! Reconciliation: bring the metadata documents in line with the source
//! recordings on disk.
//!
//! A run has two passes. The forward pass walks the sources and creates or
//! refreshes one document per recording. The sweep then walks the documents
//! and deletes those with neither a source nor a cache artifact left.

mod engine;
mod timestamp;
mod walk;

pub use engine::{Reconciler, ScanReport};
