//! Per-field conversion.
//!
//! [`FieldConverter`] converts one field between its live [`Value`] and its
//! [`DocumentValue`]. The strategy is chosen from the declared
//! [`TypeShape`]:
//!
//! - **Mapping** `(K, V)`: keys and values are converted separately. Each side
//!   needs a registered converter or must be a builtin primitive.
//! - **Sequence** `E`: primitive elements pass through; any other element type
//!   needs a registered converter.
//! - **Scalar**: a converter for the runtime type if one is registered, else
//!   primitive passthrough.
//!
//! Benign outcomes are reported as [`FieldOutcome::Skipped`]; only converter
//! failures are errors.

use std::fmt;

use crate::converter::{AnyConverter, Probe};
use crate::document::{Document, DocumentValue, Number};
use crate::error::ConvertError;
use crate::registry::ConverterRegistry;
use crate::schema::FieldDescriptor;
use crate::types::{Primitive, TypeKey, TypeShape};
use crate::values::{MappingKind, SequenceKind, Value};

// ============================================================================
// Outcomes
// ============================================================================

/// Why a field produced no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// No document key on load, or a null live value on save
    Missing,
    /// No converter and not a builtin primitive
    Unconvertible,
    /// Raw value has the wrong shape or does not parse
    Malformed,
}

impl SkipReason {
    /// Lowercase name used in logs and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Unconvertible => "unconvertible",
            Self::Malformed => "malformed",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of converting one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOutcome<T> {
    /// The field produced a value
    Converted(T),
    /// The field produced no value; the key is omitted on save and the live
    /// field is left untouched on load
    Skipped(SkipReason),
}

impl<T> FieldOutcome<T> {
    /// Check whether a value was produced.
    pub fn is_converted(&self) -> bool {
        matches!(self, Self::Converted(_))
    }

    /// The produced value, if any.
    pub fn converted(self) -> Option<T> {
        match self {
            Self::Converted(v) => Some(v),
            Self::Skipped(_) => None,
        }
    }

    /// The skip reason, if no value was produced.
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Self::Converted(_) => None,
            Self::Skipped(reason) => Some(*reason),
        }
    }
}

// ============================================================================
// Field converter
// ============================================================================

/// Converts single fields using the converters of a registry.
#[derive(Debug, Clone, Copy)]
pub struct FieldConverter<'r> {
    registry: &'r ConverterRegistry,
}

/// Per-side codec of a mapping field.
#[derive(Clone, Copy)]
enum Side<'r> {
    Converter(&'r dyn AnyConverter),
    Primitive(Primitive, TypeKey),
}

impl<'r> FieldConverter<'r> {
    pub fn new(registry: &'r ConverterRegistry) -> Self {
        Self { registry }
    }

    /// Convert the live `value` of `field` into its document form.
    pub fn serialize(
        &self,
        field: &FieldDescriptor,
        value: &Value,
    ) -> Result<FieldOutcome<DocumentValue>, ConvertError> {
        if value.is_null() {
            return Ok(skipped(field, SkipReason::Missing));
        }

        match field.shape {
            TypeShape::Mapping { key, value: val } => {
                self.serialize_mapping(field, key, val, value)
            }
            TypeShape::Sequence { element } => self.serialize_sequence(field, element, value),
            TypeShape::Scalar(_) => self.serialize_scalar(field, value),
        }
    }

    /// Convert the raw document value of `field` into a live value.
    ///
    /// `current` is the live value before loading; it supplies the container
    /// kind of collections and the type hint of scalars. A null `current`
    /// falls back to the declared type.
    pub fn deserialize(
        &self,
        field: &FieldDescriptor,
        current: &Value,
        raw: Option<&DocumentValue>,
    ) -> Result<FieldOutcome<Value>, ConvertError> {
        let raw = match raw {
            Some(raw) if !raw.is_null() => raw,
            _ => return Ok(skipped(field, SkipReason::Missing)),
        };

        match field.shape {
            TypeShape::Mapping { key, value } => {
                self.deserialize_mapping(field, key, value, current, raw)
            }
            TypeShape::Sequence { element } => {
                self.deserialize_sequence(field, element, current, raw)
            }
            TypeShape::Scalar(declared) => self.deserialize_scalar(field, declared, current, raw),
        }
    }

    fn side(&self, key: TypeKey) -> Option<Side<'r>> {
        if let Some(conv) = self.registry.get(Probe::Type(key)) {
            return Some(Side::Converter(&**conv));
        }
        key.primitive().map(|prim| Side::Primitive(prim, key))
    }

    // ------------------------------------------------------------------------
    // Mapping strategy
    // ------------------------------------------------------------------------

    fn serialize_mapping(
        &self,
        field: &FieldDescriptor,
        key: TypeKey,
        val: TypeKey,
        value: &Value,
    ) -> Result<FieldOutcome<DocumentValue>, ConvertError> {
        let (Some(key_side), Some(val_side)) = (self.side(key), self.side(val)) else {
            return Ok(skipped(field, SkipReason::Unconvertible));
        };
        let Some(entries) = value.as_mapping() else {
            return Ok(skipped(field, SkipReason::Unconvertible));
        };

        let mut doc = Document::new();
        for (k, v) in entries {
            let key_text = match key_side {
                Side::Converter(conv) => conv
                    .serialize_value(k)
                    .map_err(|e| ConvertError::converter(&field.name, e))?,
                Side::Primitive(..) => match primitive_key_string(k) {
                    Some(s) => s,
                    None => return Ok(skipped(field, SkipReason::Unconvertible)),
                },
            };

            let doc_value = if v.is_null() {
                DocumentValue::Null
            } else {
                match val_side {
                    Side::Converter(conv) => DocumentValue::Text(
                        conv.serialize_value(v)
                            .map_err(|e| ConvertError::converter(&field.name, e))?,
                    ),
                    Side::Primitive(..) => match primitive_document(v) {
                        Some(d) => d,
                        None => return Ok(skipped(field, SkipReason::Unconvertible)),
                    },
                }
            };

            doc.insert(key_text, doc_value);
        }

        Ok(FieldOutcome::Converted(DocumentValue::Mapping(doc)))
    }

    fn deserialize_mapping(
        &self,
        field: &FieldDescriptor,
        key: TypeKey,
        val: TypeKey,
        current: &Value,
        raw: &DocumentValue,
    ) -> Result<FieldOutcome<Value>, ConvertError> {
        let (Some(key_side), Some(val_side)) = (self.side(key), self.side(val)) else {
            return Ok(skipped(field, SkipReason::Unconvertible));
        };
        let Some(doc) = raw.as_mapping() else {
            return Ok(skipped(field, SkipReason::Malformed));
        };

        let kind = match current {
            Value::Mapping { kind, .. } => *kind,
            _ => MappingKind::HashMap,
        };

        let mut entries = Vec::with_capacity(doc.len());
        for (key_text, raw_value) in doc.iter() {
            let k = match key_side {
                Side::Converter(conv) => conv
                    .deserialize_value(key_text)
                    .map_err(|e| ConvertError::converter(&field.name, e))?,
                Side::Primitive(prim, ty) => {
                    match parse_declared(prim, ty, &DocumentValue::Text(key_text.to_string())) {
                        Some(k) => k,
                        None => return Ok(skipped(field, SkipReason::Malformed)),
                    }
                }
            };

            let v = if raw_value.is_null() {
                Value::Null
            } else {
                match val_side {
                    Side::Converter(conv) => {
                        let Some(text) = raw_value.scalar_string() else {
                            return Ok(skipped(field, SkipReason::Malformed));
                        };
                        conv.deserialize_value(&text)
                            .map_err(|e| ConvertError::converter(&field.name, e))?
                    }
                    Side::Primitive(prim, ty) => match parse_declared(prim, ty, raw_value) {
                        Some(v) => v,
                        None => return Ok(skipped(field, SkipReason::Malformed)),
                    },
                }
            };

            entries.push((k, v));
        }

        Ok(FieldOutcome::Converted(Value::Mapping { kind, entries }))
    }

    // ------------------------------------------------------------------------
    // Sequence strategy
    // ------------------------------------------------------------------------

    fn serialize_sequence(
        &self,
        field: &FieldDescriptor,
        element: TypeKey,
        value: &Value,
    ) -> Result<FieldOutcome<DocumentValue>, ConvertError> {
        let Some(items) = value.as_sequence() else {
            return Ok(skipped(field, SkipReason::Unconvertible));
        };

        if element.is_primitive() {
            let docs: Option<Vec<_>> = items.iter().map(primitive_document).collect();
            return Ok(match docs {
                Some(docs) => FieldOutcome::Converted(DocumentValue::Sequence(docs)),
                None => skipped(field, SkipReason::Unconvertible),
            });
        }

        let Some(conv) = self.registry.get(Probe::Type(element)) else {
            return Ok(skipped(field, SkipReason::Unconvertible));
        };

        let mut docs = Vec::with_capacity(items.len());
        for item in items {
            let text = conv
                .serialize_value(item)
                .map_err(|e| ConvertError::converter(&field.name, e))?;
            docs.push(DocumentValue::Text(text));
        }
        Ok(FieldOutcome::Converted(DocumentValue::Sequence(docs)))
    }

    fn deserialize_sequence(
        &self,
        field: &FieldDescriptor,
        element: TypeKey,
        current: &Value,
        raw: &DocumentValue,
    ) -> Result<FieldOutcome<Value>, ConvertError> {
        let kind = match current {
            Value::Sequence { kind, .. } => *kind,
            _ => SequenceKind::Vec,
        };

        if let Some(prim) = element.primitive() {
            let Some(raw_items) = raw.as_sequence() else {
                return Ok(skipped(field, SkipReason::Malformed));
            };
            let items: Option<Vec<_>> = raw_items
                .iter()
                .map(|item| parse_declared(prim, element, item))
                .collect();
            return Ok(match items {
                Some(items) => FieldOutcome::Converted(Value::Sequence { kind, items }),
                None => skipped(field, SkipReason::Malformed),
            });
        }

        let Some(conv) = self.registry.get(Probe::Type(element)) else {
            return Ok(skipped(field, SkipReason::Unconvertible));
        };
        let Some(raw_items) = raw.as_sequence() else {
            return Ok(skipped(field, SkipReason::Malformed));
        };

        let mut items = Vec::with_capacity(raw_items.len());
        for raw_item in raw_items {
            let Some(text) = raw_item.scalar_string() else {
                return Ok(skipped(field, SkipReason::Malformed));
            };
            let item = conv
                .deserialize_value(&text)
                .map_err(|e| ConvertError::converter(&field.name, e))?;
            items.push(item);
        }
        Ok(FieldOutcome::Converted(Value::Sequence { kind, items }))
    }

    // ------------------------------------------------------------------------
    // Scalar strategy
    // ------------------------------------------------------------------------

    fn serialize_scalar(
        &self,
        field: &FieldDescriptor,
        value: &Value,
    ) -> Result<FieldOutcome<DocumentValue>, ConvertError> {
        if let Some(conv) = self.registry.get(Probe::Value(value)) {
            let text = conv
                .serialize_value(value)
                .map_err(|e| ConvertError::converter(&field.name, e))?;
            return Ok(FieldOutcome::Converted(DocumentValue::Text(text)));
        }

        Ok(match primitive_document(value) {
            Some(doc) => FieldOutcome::Converted(doc),
            None => skipped(field, SkipReason::Unconvertible),
        })
    }

    fn deserialize_scalar(
        &self,
        field: &FieldDescriptor,
        declared: TypeKey,
        current: &Value,
        raw: &DocumentValue,
    ) -> Result<FieldOutcome<Value>, ConvertError> {
        let primitive = if current.is_null() {
            declared.primitive()
        } else {
            current.primitive()
        };
        if let Some(prim) = primitive {
            return Ok(match parse_declared(prim, declared, raw) {
                Some(v) => FieldOutcome::Converted(v),
                None => skipped(field, SkipReason::Malformed),
            });
        }

        let probe = if current.is_null() {
            Probe::Type(declared)
        } else {
            Probe::Value(current)
        };
        let Some(conv) = self.registry.get(probe) else {
            return Ok(skipped(field, SkipReason::Unconvertible));
        };
        let Some(text) = raw.scalar_string() else {
            return Ok(skipped(field, SkipReason::Malformed));
        };

        conv.deserialize_value(&text)
            .map(FieldOutcome::Converted)
            .map_err(|e| ConvertError::converter(&field.name, e))
    }
}

fn skipped<T>(field: &FieldDescriptor, reason: SkipReason) -> FieldOutcome<T> {
    tracing::debug!("Skipping field '{}': {}", field.name, reason);
    FieldOutcome::Skipped(reason)
}

// ============================================================================
// Primitive helpers
// ============================================================================

/// Document scalar for a primitive live value.
fn primitive_document(value: &Value) -> Option<DocumentValue> {
    match value {
        Value::Text(s) => Some(DocumentValue::Text(s.clone())),
        Value::Integer(i) => Some(DocumentValue::Number(Number::Integer(*i))),
        Value::Float(f) => Some(DocumentValue::Number(Number::Float(*f))),
        Value::Boolean(b) => Some(DocumentValue::Bool(*b)),
        _ => None,
    }
}

/// Canonical string form of a primitive mapping key.
fn primitive_key_string(value: &Value) -> Option<String> {
    match value {
        Value::Text(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Parse a raw scalar as `prim`, then reject values outside the range of
/// the declared type `ty` (e.g. 300 for a `u8`).
fn parse_declared(prim: Primitive, ty: TypeKey, raw: &DocumentValue) -> Option<Value> {
    parse_primitive(prim, raw).filter(|value| fits_width(ty, value))
}

/// Check that a parsed primitive is representable in `ty`.
///
/// Types that are not numeric primitives accept every value.
fn fits_width(ty: TypeKey, value: &Value) -> bool {
    macro_rules! integer_fits {
        ($i:expr; $($t:ty),*) => {
            $(
                if ty.is::<$t>() {
                    return <$t>::try_from($i).is_ok();
                }
            )*
        };
    }

    match value {
        Value::Integer(i) => {
            integer_fits!(*i; i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
            true
        }
        Value::Float(f) if ty.is::<f32>() => !f.is_finite() || f.abs() <= f32::MAX as f64,
        _ => true,
    }
}

/// Best-effort parse of a raw scalar into a primitive.
fn parse_primitive(prim: Primitive, raw: &DocumentValue) -> Option<Value> {
    match prim {
        Primitive::Text => raw.scalar_string().map(Value::Text),
        Primitive::Integer => match raw {
            DocumentValue::Number(n) => n.as_i128(),
            DocumentValue::Text(s) => s.trim().parse::<i128>().ok(),
            _ => None,
        }
        .map(Value::Integer),
        Primitive::Float => match raw {
            DocumentValue::Number(n) => Some(n.as_f64()),
            DocumentValue::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .map(Value::Float),
        Primitive::Boolean => match raw {
            DocumentValue::Bool(b) => Some(*b),
            DocumentValue::Text(s) if s.eq_ignore_ascii_case("true") => Some(true),
            DocumentValue::Text(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
        .map(Value::Boolean),
    }
}
