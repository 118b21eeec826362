//! # xvfs-gen
//!
//! Build-time generator for xvfs embedded filesystems.
//!
//! Walks a directory, collects one record per file and directory, indexes the
//! records into checksum-selected hash buckets, and emits Rust source that
//! `xvfs-core` serves at run time.
//!
//! - [`Generator`] - directory walk and index construction
//! - [`emit_source`] - Rust source for a [`GeneratedTable`]
//! - [`build::embed_directory`] - one call from a `build.rs`
//!
//! The bucket count is `min(records, bucket_cap)`. Past the cap, lookups
//! degrade to longer linear chains within each bucket.

pub mod build;
pub mod config;
pub mod emit;
pub mod error;
pub mod generate;

pub use config::{CONFIG_ENV, GeneratorConfig};
pub use emit::emit_source;
pub use error::{GenError, GenResult};
pub use generate::{GeneratedPayload, GeneratedRecord, GeneratedTable, Generator};
