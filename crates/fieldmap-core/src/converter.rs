//! Pluggable value converters.
//!
//! A converter is bound to exactly one concrete type and turns values of that
//! type into text and back. Implementors write the typed [`ValueConverter`]
//! trait; the registry stores them behind the object-safe [`AnyConverter`]
//! trait, which every `ValueConverter` gets through a blanket impl.
//!
//! # Example
//!
//! ```rust
//! use fieldmap_core::{ConverterError, ValueConverter};
//! use std::net::Ipv4Addr;
//!
//! struct Ipv4Converter;
//!
//! impl ValueConverter for Ipv4Converter {
//!     type Target = Ipv4Addr;
//!
//!     fn serialize(&self, value: &Ipv4Addr) -> Result<String, ConverterError> {
//!         Ok(value.to_string())
//!     }
//!
//!     fn deserialize(&self, text: &str) -> Result<Ipv4Addr, ConverterError> {
//!         text.parse()
//!             .map_err(|e| ConverterError::malformed::<Ipv4Addr>(text, e))
//!     }
//! }
//! ```

use std::any::Any;
use std::fmt;

use crate::error::ConverterError;
use crate::types::TypeKey;
use crate::values::Value;

/// Typed converter between `Target` and its text form.
///
/// `deserialize(serialize(v))` must give back a value equal to `v` for every
/// legal `v`, and `deserialize` must return an error on malformed input
/// instead of guessing.
///
/// Primitive live values carry a widened runtime type: every integer is an
/// `i128`, every float an `f64`. A converter whose `Target` is a narrower
/// primitive such as `u32` or `f32` still matches type probes, but never a
/// live [`Value`], so it is not consulted when saving scalar fields.
pub trait ValueConverter: Send + Sync + 'static {
    /// The one type this converter handles.
    type Target: Any + Clone + fmt::Debug + Send + Sync;

    /// Render a value as text.
    fn serialize(&self, value: &Self::Target) -> Result<String, ConverterError>;

    /// Parse text produced by [`ValueConverter::serialize`].
    fn deserialize(&self, text: &str) -> Result<Self::Target, ConverterError>;

    /// Human readable converter name for log output.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Capability query: a type token or a live value.
#[derive(Debug, Clone, Copy)]
pub enum Probe<'a> {
    /// Does the converter handle this declared type?
    Type(TypeKey),
    /// Does the converter handle the runtime type of this value?
    Value(&'a Value),
}

impl Probe<'_> {
    /// The type being asked about, if it has one.
    pub fn type_key(&self) -> Option<TypeKey> {
        match self {
            Self::Type(key) => Some(*key),
            Self::Value(value) => value.type_key(),
        }
    }
}

impl From<TypeKey> for Probe<'_> {
    fn from(key: TypeKey) -> Self {
        Self::Type(key)
    }
}

impl<'a> From<&'a Value> for Probe<'a> {
    fn from(value: &'a Value) -> Self {
        Self::Value(value)
    }
}

/// Type-erased converter, as stored in the registry.
pub trait AnyConverter: Send + Sync {
    /// Type this converter is bound to.
    fn target(&self) -> TypeKey;

    /// Human readable converter name.
    fn name(&self) -> &'static str;

    /// Allows downcasting to the concrete converter type.
    fn as_any(&self) -> &dyn Any;

    /// True if the probe names the target type, or holds a value whose
    /// runtime type is the target type.
    fn can_handle(&self, probe: Probe<'_>) -> bool {
        probe.type_key() == Some(self.target())
    }

    /// Render a live value as text.
    fn serialize_value(&self, value: &Value) -> Result<String, ConverterError>;

    /// Parse text into a live value of the target type.
    fn deserialize_value(&self, text: &str) -> Result<Value, ConverterError>;
}

impl<C: ValueConverter> AnyConverter for C {
    fn target(&self) -> TypeKey {
        TypeKey::of::<C::Target>()
    }

    fn name(&self) -> &'static str {
        ValueConverter::name(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn serialize_value(&self, value: &Value) -> Result<String, ConverterError> {
        let typed = value
            .as_native()
            .and_then(|any| any.downcast_ref::<C::Target>())
            .ok_or(ConverterError::TypeMismatch {
                expected: std::any::type_name::<C::Target>(),
            })?;
        self.serialize(typed)
    }

    fn deserialize_value(&self, text: &str) -> Result<Value, ConverterError> {
        self.deserialize(text).map(Value::from_native)
    }
}

impl fmt::Debug for dyn AnyConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyConverter")
            .field("name", &self.name())
            .field("target", &self.target())
            .finish()
    }
}
