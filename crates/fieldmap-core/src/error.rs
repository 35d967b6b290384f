//! Error types for conversion operations.
//!
//! Benign outcomes (a field that cannot be converted, a primitive that does
//! not parse, a missing key) are not errors; they are reported as
//! [`SkipReason`](crate::field::SkipReason)s. Everything here aborts the
//! current save or load call.

use crate::schema::SchemaError;

/// Failure reported by a value converter.
#[derive(Debug, thiserror::Error)]
pub enum ConverterError {
    /// Input text is not a valid representation of the target type
    #[error("cannot parse {input:?} as {type_name}: {reason}")]
    Malformed {
        type_name: &'static str,
        input: String,
        reason: String,
    },

    /// Value handed to the converter does not have the converter's type
    #[error("converter for {expected} was given a value of another type")]
    TypeMismatch { expected: &'static str },

    /// Any other converter-specific failure
    #[error("{0}")]
    Custom(String),
}

impl ConverterError {
    /// Build a [`ConverterError::Malformed`] for target type `T`.
    pub fn malformed<T: ?Sized>(input: impl Into<String>, reason: impl ToString) -> Self {
        Self::Malformed {
            type_name: std::any::type_name::<T>(),
            input: input.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`ConverterError::Custom`].
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }
}

/// Error that aborts a whole-object save or load.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// A registered converter failed on this field
    #[error("converter failed on field '{field}': {source}")]
    Converter {
        field: String,
        #[source]
        source: ConverterError,
    },

    /// The schema names a field the instance does not expose
    #[error("field '{0}' is declared in the schema but not exposed by the instance")]
    UnknownField(String),

    /// The instance rejected a converted value
    #[error("cannot assign field '{field}': {reason}")]
    FieldAccess { field: String, reason: String },

    /// The schema itself is invalid
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl ConvertError {
    /// Build a [`ConvertError::FieldAccess`].
    pub fn field_access(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FieldAccess {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Attach a field name to a converter failure.
    pub fn converter(field: impl Into<String>, source: ConverterError) -> Self {
        Self::Converter {
            field: field.into(),
            source,
        }
    }
}
