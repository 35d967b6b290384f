//! Field schemas and instance access.
//!
//! A [`Schema`] is the precomputed description of an object type: its fields
//! in declaration order, each with a document key and a declared
//! [`TypeShape`]. The schema provider (hand-written code or a code
//! generator) also implements [`FieldAccess`] so the converters can read and
//! write the live fields.

use std::collections::{HashMap, HashSet};

use crate::error::ConvertError;
use crate::types::TypeShape;
use crate::values::Value;

// ============================================================================
// Error Types
// ============================================================================

/// Error type for schema validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Two descriptors share a field name
    #[error("duplicate field name: {0}")]
    DuplicateField(String),

    /// Two non-excluded descriptors write to the same document key
    #[error("fields '{first}' and '{second}' both map to document key '{key}'")]
    DuplicateKey {
        key: String,
        first: String,
        second: String,
    },

    /// Field name or key override is empty
    #[error("field at position {0} has an empty name or key")]
    EmptyName(usize),
}

// ============================================================================
// Descriptors
// ============================================================================

/// Static description of one object field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field name, as understood by [`FieldAccess`]
    pub name: String,

    /// Document key override; the field name is used when absent
    pub key: Option<String>,

    /// Excluded fields are neither saved nor loaded
    pub excluded: bool,

    /// Declared type shape
    pub shape: TypeShape,
}

impl FieldDescriptor {
    /// Create a new descriptor.
    pub fn new(name: impl Into<String>, shape: TypeShape) -> Self {
        Self {
            name: name.into(),
            key: None,
            excluded: false,
            shape,
        }
    }

    /// Write this field under a different document key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Exclude this field from saving and loading.
    pub fn excluded(mut self) -> Self {
        self.excluded = true;
        self
    }

    /// Key under which this field appears in documents.
    pub fn document_key(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.name)
    }
}

/// Ordered list of field descriptors for one object type.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<FieldDescriptor>,

    /// Cached field lookup by name
    field_map: HashMap<String, usize>,
}

impl Schema {
    /// Create a schema from descriptors in declaration order.
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        let mut schema = Self {
            fields,
            field_map: HashMap::new(),
        };
        schema.build_field_map();
        schema
    }

    fn build_field_map(&mut self) {
        self.field_map = self
            .fields
            .iter()
            .enumerate()
            .map(|(idx, field)| (field.name.clone(), idx))
            .collect();
    }

    /// Append a descriptor (builder style).
    pub fn field(mut self, descriptor: FieldDescriptor) -> Self {
        self.push(descriptor);
        self
    }

    /// Append a descriptor.
    pub fn push(&mut self, descriptor: FieldDescriptor) {
        self.field_map
            .entry(descriptor.name.clone())
            .or_insert(self.fields.len());
        self.fields.push(descriptor);
    }

    /// All descriptors in declaration order, excluded ones included.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Descriptors that take part in conversion, in declaration order.
    pub fn active_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| !f.excluded)
    }

    /// Look up a descriptor by field name.
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.field_map.get(name).and_then(|&idx| self.fields.get(idx))
    }

    /// Number of descriptors.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check whether the schema has no descriptors.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Check that names are unique and non-empty, and that no two active
    /// fields share a document key.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut names: HashSet<&str> = HashSet::new();
        let mut keys: HashMap<&str, &str> = HashMap::new();

        for (pos, field) in self.fields.iter().enumerate() {
            if field.name.is_empty() || field.key.as_deref() == Some("") {
                return Err(SchemaError::EmptyName(pos));
            }
            if !names.insert(&field.name) {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
            if field.excluded {
                continue;
            }
            let key = field.document_key();
            if let Some(first) = keys.insert(key, &field.name) {
                return Err(SchemaError::DuplicateKey {
                    key: key.to_string(),
                    first: first.to_string(),
                    second: field.name.clone(),
                });
            }
        }
        Ok(())
    }
}

impl FromIterator<FieldDescriptor> for Schema {
    fn from_iter<I: IntoIterator<Item = FieldDescriptor>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ============================================================================
// Instance access
// ============================================================================

/// Read/write access to the live fields of an object.
///
/// # Example
///
/// ```rust
/// use fieldmap_core::{ConvertError, FieldAccess, FromValue, Value};
///
/// struct Counter {
///     count: i32,
/// }
///
/// impl FieldAccess for Counter {
///     fn get(&self, field: &str) -> Option<Value> {
///         match field {
///             "count" => Some(self.count.into()),
///             _ => None,
///         }
///     }
///
///     fn set(&mut self, field: &str, value: Value) -> Result<(), ConvertError> {
///         match field {
///             "count" => {
///                 self.count = i32::from_value(value)
///                     .ok_or_else(|| ConvertError::field_access(field, "expected i32"))?;
///                 Ok(())
///             }
///             _ => Err(ConvertError::UnknownField(field.to_string())),
///         }
///     }
/// }
/// ```
pub trait FieldAccess {
    /// Current value of `field`, or `None` if the object has no such field.
    fn get(&self, field: &str) -> Option<Value>;

    /// Overwrite `field` with `value`.
    fn set(&mut self, field: &str, value: Value) -> Result<(), ConvertError>;
}
