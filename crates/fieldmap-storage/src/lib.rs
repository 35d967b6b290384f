//! File storage for fieldmap documents.
//!
//! This crate turns [`Document`](fieldmap_core::Document)s into text and
//! back, and reads and writes them as files:
//!
//! - [`DocumentFormat`] - supported on-disk formats (JSON, YAML)
//! - [`DocumentCodec`] - text encoding of a document ([`JsonCodec`], [`YamlCodec`])
//! - [`StorageConfig`] - format and file handling options
//! - [`FileStorage`] - load and save documents on the local filesystem

pub mod codec;
pub mod config;
pub mod filesystem;

pub use codec::{DocumentCodec, DocumentFormat, JsonCodec, YamlCodec};
pub use config::StorageConfig;
pub use filesystem::FileStorage;
