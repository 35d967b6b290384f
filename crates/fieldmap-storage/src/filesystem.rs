//! Filesystem-based document storage.

use std::path::Path;

use anyhow::{Context, Result};
use fieldmap_core::Document;

use crate::codec::{DocumentCodec, DocumentFormat};
use crate::config::StorageConfig;

/// Loads and saves documents as UTF-8 files.
///
/// The format is taken from the file extension, falling back to
/// [`StorageConfig::format`].
#[derive(Debug, Clone, Default)]
pub struct FileStorage {
    config: StorageConfig,
}

impl FileStorage {
    /// Create a new FileStorage with the given configuration.
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Format used for `path`.
    pub fn format_for(&self, path: &Path) -> DocumentFormat {
        DocumentFormat::from_path(path).unwrap_or(self.config.format)
    }

    fn codec_for(&self, path: &Path) -> Box<dyn DocumentCodec> {
        self.format_for(path).codec(self.config.pretty)
    }

    /// Read the document stored at `path`.
    ///
    /// A missing file is created empty (together with its parent
    /// directories) when `create_missing` is set.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Document> {
        let path = path.as_ref();

        if !path.exists() {
            if !self.config.create_missing {
                anyhow::bail!("Document file {} does not exist", path.display());
            }
            create_parent_dirs(path)?;
            std::fs::write(path, "")
                .with_context(|| format!("Failed to create {}", path.display()))?;
            tracing::debug!("Created empty document file {}", path.display());
            return Ok(Document::new());
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let doc = self
            .codec_for(path)
            .decode(&text)
            .with_context(|| format!("Failed to decode {}", path.display()))?;

        tracing::debug!("Loaded {} keys from {}", doc.len(), path.display());
        Ok(doc)
    }

    /// Write `doc` to `path`, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>, doc: &Document) -> Result<()> {
        let path = path.as_ref();
        create_parent_dirs(path)?;

        let text = self.codec_for(path).encode(doc)?;
        std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Stored document to {}", path.display());
        Ok(())
    }
}

fn create_parent_dirs(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display())),
        _ => Ok(()),
    }
}
