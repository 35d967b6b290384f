//! Whole-object save and load.

use crate::document::Document;
use crate::error::ConvertError;
use crate::field::{FieldConverter, FieldOutcome, SkipReason};
use crate::registry::ConverterRegistry;
use crate::schema::{FieldAccess, Schema};

/// Per-field result of a load, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldStatus {
    /// Field name
    pub field: String,
    /// Reason the field was left untouched; `None` if it was overwritten
    pub skipped: Option<SkipReason>,
}

/// Summary of a [`ClassConverter::load`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    fields: Vec<FieldStatus>,
}

impl LoadReport {
    fn push(&mut self, field: &str, skipped: Option<SkipReason>) {
        self.fields.push(FieldStatus {
            field: field.to_string(),
            skipped,
        });
    }

    /// Names of the fields that were overwritten.
    pub fn applied(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|s| s.skipped.is_none())
            .map(|s| s.field.as_str())
    }

    /// Names and reasons of the fields that were left untouched.
    pub fn skipped(&self) -> impl Iterator<Item = (&str, SkipReason)> {
        self.fields
            .iter()
            .filter_map(|s| s.skipped.map(|reason| (s.field.as_str(), reason)))
    }

    /// Check whether `field` was overwritten.
    pub fn is_applied(&self, field: &str) -> bool {
        self.fields
            .iter()
            .any(|s| s.field == field && s.skipped.is_none())
    }

    /// Skip reason of `field`, if it was processed and skipped.
    pub fn skip_reason(&self, field: &str) -> Option<SkipReason> {
        self.fields
            .iter()
            .find(|s| s.field == field)
            .and_then(|s| s.skipped)
    }

    /// All processed fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldStatus> {
        self.fields.iter()
    }

    /// Number of processed fields, applied or skipped.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check whether no field was processed.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Saves objects to documents and loads documents into objects, field by
/// field, following a [`Schema`].
///
/// Loading is not transactional: if a converter fails part way, the fields
/// before it stay overwritten.
#[derive(Debug, Clone, Copy)]
pub struct ClassConverter<'r> {
    fields: FieldConverter<'r>,
}

impl<'r> ClassConverter<'r> {
    pub fn new(registry: &'r ConverterRegistry) -> Self {
        Self {
            fields: FieldConverter::new(registry),
        }
    }

    /// Build a document from the non-excluded fields of `instance`.
    ///
    /// Fields that produce no value are omitted, never written as null.
    pub fn save<T>(&self, schema: &Schema, instance: &T) -> Result<Document, ConvertError>
    where
        T: FieldAccess + ?Sized,
    {
        schema.validate()?;

        let mut doc = Document::new();
        for field in schema.active_fields() {
            let value = instance
                .get(&field.name)
                .ok_or_else(|| ConvertError::UnknownField(field.name.clone()))?;

            match self.fields.serialize(field, &value)? {
                FieldOutcome::Converted(raw) => {
                    tracing::trace!("Saved field '{}' as '{}'", field.name, field.document_key());
                    doc.insert(field.document_key(), raw);
                }
                FieldOutcome::Skipped(reason) => {
                    tracing::trace!("Omitted field '{}' ({})", field.name, reason);
                }
            }
        }

        Ok(doc)
    }

    /// Overwrite the non-excluded fields of `instance` from `document`.
    ///
    /// Fields whose key is missing, or that produce no value, keep their
    /// current value.
    pub fn load<T>(
        &self,
        schema: &Schema,
        document: &Document,
        instance: &mut T,
    ) -> Result<LoadReport, ConvertError>
    where
        T: FieldAccess + ?Sized,
    {
        schema.validate()?;

        let mut report = LoadReport::default();
        for field in schema.active_fields() {
            let current = instance
                .get(&field.name)
                .ok_or_else(|| ConvertError::UnknownField(field.name.clone()))?;
            let raw = document.get(field.document_key());

            match self.fields.deserialize(field, &current, raw)? {
                FieldOutcome::Converted(value) => {
                    instance.set(&field.name, value)?;
                    tracing::trace!("Loaded field '{}' from '{}'", field.name, field.document_key());
                    report.push(&field.name, None);
                }
                FieldOutcome::Skipped(reason) => {
                    tracing::trace!("Kept field '{}' ({})", field.name, reason);
                    report.push(&field.name, Some(reason));
                }
            }
        }

        Ok(report)
    }
}
