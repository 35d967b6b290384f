//! fieldmap
//!
//! A library for saving objects to ordered JSON/YAML documents and loading
//! them back, field by field, with pluggable converters for non-primitive
//! types.
//!
//! # Crates
//!
//! - `fieldmap_core` - schemas, the converter registry and the field/object converters
//! - `fieldmap_storage` - JSON/YAML codecs and file storage
//!
//! This crate ties them together: a type implements [`Mappable`] and a
//! [`Mapper`] saves and loads it.
//!
//! # Example
//!
//! ```rust,no_run
//! use fieldmap::{
//!     ConvertError, FieldAccess, FieldDescriptor, FromValue, Mappable, Mapper, Schema,
//!     StorageConfig, TypeShape, Value,
//! };
//! use std::time::Duration;
//!
//! struct Settings {
//!     retries: u32,
//!     timeout: Duration,
//! }
//!
//! impl FieldAccess for Settings {
//!     fn get(&self, field: &str) -> Option<Value> {
//!         match field {
//!             "retries" => Some(self.retries.into()),
//!             "timeout" => Some(Value::object(self.timeout)),
//!             _ => None,
//!         }
//!     }
//!
//!     fn set(&mut self, field: &str, value: Value) -> Result<(), ConvertError> {
//!         match field {
//!             "retries" => {
//!                 self.retries = u32::from_value(value)
//!                     .ok_or_else(|| ConvertError::field_access(field, "expected u32"))?;
//!             }
//!             "timeout" => {
//!                 self.timeout = value
//!                     .into_object()
//!                     .map_err(|_| ConvertError::field_access(field, "expected Duration"))?;
//!             }
//!             _ => return Err(ConvertError::UnknownField(field.to_string())),
//!         }
//!         Ok(())
//!     }
//! }
//!
//! impl Mappable for Settings {
//!     fn schema() -> Schema {
//!         Schema::default()
//!             .field(FieldDescriptor::new("retries", TypeShape::scalar::<u32>()))
//!             .field(FieldDescriptor::new("timeout", TypeShape::scalar::<Duration>()))
//!     }
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! let mapper = Mapper::new(StorageConfig::yaml());
//! let mut settings = Settings { retries: 3, timeout: Duration::from_secs(30) };
//!
//! mapper.save_file("config/settings.yml", &settings)?;
//! let report = mapper.load_file("config/settings.yml", &mut settings)?;
//! assert!(report.is_applied("timeout"));
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use anyhow::{Context, Result};

pub use fieldmap_core::{
    AnyConverter, ClassConverter, ConvertError, ConverterError, ConverterRegistry,
    DateTimeConverter, Document, DocumentValue, DurationConverter, FieldAccess,
    FieldDescriptor, FieldOutcome, FieldStatus, FromValue, LoadReport, Lookup, MappingKind,
    Number, Primitive, Probe, Schema, SchemaError, SequenceKind, SkipReason, TypeKey,
    TypeShape, UuidConverter, Value, ValueConverter,
};
pub use fieldmap_storage::{
    DocumentCodec, DocumentFormat, FileStorage, JsonCodec, StorageConfig, YamlCodec,
};

/// A type that describes its own fields.
pub trait Mappable: FieldAccess {
    /// Field schema in declaration order.
    fn schema() -> Schema;
}

/// Saves and loads [`Mappable`] values using a converter registry and a
/// file store.
#[derive(Debug, Clone)]
pub struct Mapper {
    registry: ConverterRegistry,
    storage: FileStorage,
}

impl Default for Mapper {
    fn default() -> Self {
        Self::new(StorageConfig::default())
    }
}

impl Mapper {
    /// Create a mapper with the builtin converters.
    pub fn new(config: StorageConfig) -> Self {
        Self::with_registry(ConverterRegistry::with_defaults(), config)
    }

    /// Create a mapper with a caller-built registry.
    pub fn with_registry(registry: ConverterRegistry, config: StorageConfig) -> Self {
        Self {
            registry,
            storage: FileStorage::new(config),
        }
    }

    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    /// Mutable access for registering or removing converters.
    pub fn registry_mut(&mut self) -> &mut ConverterRegistry {
        &mut self.registry
    }

    pub fn storage(&self) -> &FileStorage {
        &self.storage
    }

    /// Save `value` to an in-memory document.
    pub fn to_document<T: Mappable>(&self, value: &T) -> Result<Document, ConvertError> {
        ClassConverter::new(&self.registry).save(&T::schema(), value)
    }

    /// Overwrite the fields of `target` from `doc`.
    pub fn from_document<T: Mappable>(
        &self,
        doc: &Document,
        target: &mut T,
    ) -> Result<LoadReport, ConvertError> {
        ClassConverter::new(&self.registry).load(&T::schema(), doc, target)
    }

    /// Save `value` to the file at `path`.
    pub fn save_file<T: Mappable>(&self, path: impl AsRef<Path>, value: &T) -> Result<()> {
        let path = path.as_ref();
        let doc = self
            .to_document(value)
            .with_context(|| format!("Failed to convert value for {}", path.display()))?;
        self.storage.save(path, &doc)
    }

    /// Load the file at `path` into `target`.
    ///
    /// A missing file is handled according to the storage configuration; with
    /// the defaults it is created and `target` is left untouched.
    pub fn load_file<T: Mappable>(&self, path: impl AsRef<Path>, target: &mut T) -> Result<LoadReport> {
        let path = path.as_ref();
        let doc = self.storage.load(path)?;
        self.from_document(&doc, target)
            .with_context(|| format!("Failed to apply {} to value", path.display()))
    }
}
