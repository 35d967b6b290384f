//! Storage configuration.

use serde::{Deserialize, Serialize};

use crate::codec::DocumentFormat;

/// Configuration for [`FileStorage`](crate::FileStorage).
///
/// Deserializable so it can be embedded in an application's own config file;
/// missing keys take their default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Format used when the file extension does not name one.
    pub format: DocumentFormat,

    /// Whether JSON output is indented.
    pub pretty: bool,

    /// Whether loading a missing file creates it (and its parent
    /// directories) and returns an empty document.
    ///
    /// When `false`, loading a missing file is an error.
    pub create_missing: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            format: DocumentFormat::Json,
            pretty: true,
            create_missing: true,
        }
    }
}

impl StorageConfig {
    /// Create a storage config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretty-printed JSON.
    pub fn json() -> Self {
        Self::default()
    }

    /// Block-style YAML.
    pub fn yaml() -> Self {
        Self {
            format: DocumentFormat::Yaml,
            ..Self::default()
        }
    }

    /// Fail instead of creating missing files on load.
    pub fn require_existing(mut self) -> Self {
        self.create_missing = false;
        self
    }
}
