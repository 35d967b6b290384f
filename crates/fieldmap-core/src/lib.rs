//! Core of the fieldmap object/document mapper.
//!
//! This crate converts the fields of live objects into ordered documents and
//! back, driven by a precomputed field schema:
//!
//! - [`Schema`] / [`FieldDescriptor`] - ordered field list with declared type shapes
//! - [`FieldAccess`] - how the mapper reads and writes live fields
//! - [`Value`] - dynamic live field value
//! - [`Document`] / [`DocumentValue`] - ordered document tree
//! - [`ValueConverter`] - pluggable text converter for one concrete type
//! - [`ConverterRegistry`] - ordered, first-match collection of converters
//! - [`FieldConverter`] / [`ClassConverter`] - per-field and whole-object conversion
//!
//! # Architecture
//!
//! ```text
//! fieldmap-core (this crate)
//!    │
//!    ├─── fieldmap-storage  (JSON/YAML codecs and file storage for Documents)
//!    │
//!    └─── fieldmap          (facade: Mappable types, Mapper)
//! ```
//!
//! # Example
//!
//! ```rust
//! use fieldmap_core::{
//!     ClassConverter, ConvertError, ConverterRegistry, DocumentValue, FieldAccess,
//!     FieldDescriptor, FromValue, Schema, TypeShape, Value,
//! };
//! use uuid::Uuid;
//!
//! struct User {
//!     id: Uuid,
//!     name: String,
//! }
//!
//! impl FieldAccess for User {
//!     fn get(&self, field: &str) -> Option<Value> {
//!         match field {
//!             "id" => Some(Value::object(self.id)),
//!             "name" => Some(self.name.clone().into()),
//!             _ => None,
//!         }
//!     }
//!
//!     fn set(&mut self, field: &str, value: Value) -> Result<(), ConvertError> {
//!         match field {
//!             "id" => {
//!                 self.id = value
//!                     .into_object()
//!                     .map_err(|_| ConvertError::field_access(field, "expected Uuid"))?;
//!             }
//!             "name" => {
//!                 self.name = String::from_value(value)
//!                     .ok_or_else(|| ConvertError::field_access(field, "expected text"))?;
//!             }
//!             _ => return Err(ConvertError::UnknownField(field.to_string())),
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let schema = Schema::default()
//!     .field(FieldDescriptor::new("id", TypeShape::scalar::<Uuid>()))
//!     .field(FieldDescriptor::new("name", TypeShape::scalar::<String>()).with_key("display_name"));
//!
//! let registry = ConverterRegistry::with_defaults();
//! let converter = ClassConverter::new(&registry);
//!
//! let user = User { id: Uuid::new_v4(), name: "Ada".to_string() };
//! let doc = converter.save(&schema, &user).unwrap();
//! assert_eq!(doc.get("display_name"), Some(&DocumentValue::from("Ada")));
//!
//! let mut copy = User { id: Uuid::nil(), name: String::new() };
//! converter.load(&schema, &doc, &mut copy).unwrap();
//! assert_eq!(copy.id, user.id);
//! ```

pub mod class;
pub mod converter;
pub mod converters;
pub mod document;
pub mod error;
pub mod field;
pub mod registry;
pub mod schema;
pub mod types;
pub mod values;

// Re-exports for convenience
pub use class::{ClassConverter, FieldStatus, LoadReport};
pub use converter::{AnyConverter, Probe, ValueConverter};
pub use converters::{DateTimeConverter, DurationConverter, UuidConverter};
pub use document::{Document, DocumentValue, Number};
pub use error::{ConvertError, ConverterError};
pub use field::{FieldConverter, FieldOutcome, SkipReason};
pub use registry::{ConverterRegistry, Lookup};
pub use schema::{FieldAccess, FieldDescriptor, Schema, SchemaError};
pub use types::{Primitive, TypeKey, TypeShape};
pub use values::{FromValue, MappingKind, ObjectValue, SequenceKind, Value};
