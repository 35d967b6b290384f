//! Type tokens and declared field shapes.
//!
//! Rust has no runtime reflection, so the type arguments of a field are
//! captured explicitly when a schema is declared, using [`TypeKey::of`].

use std::any::{Any, TypeId};
use std::fmt;

/// Token identifying one concrete Rust type.
///
/// Equality is decided by the [`TypeId`]; the type name is only kept for
/// diagnostics and log output.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Create the token for `T`.
    pub fn of<T: Any + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The underlying [`TypeId`].
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name, as reported by `std::any::type_name`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Check whether this token names `T`.
    pub fn is<T: Any + ?Sized>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// The builtin primitive this type belongs to, if any.
    ///
    /// Every integer width except `u128` maps to [`Primitive::Integer`] and
    /// both float widths map to [`Primitive::Float`]. `u128` does not fit
    /// the widened integer representation and needs a converter.
    pub fn primitive(&self) -> Option<Primitive> {
        let id = self.id;
        if id == TypeId::of::<String>() {
            Some(Primitive::Text)
        } else if id == TypeId::of::<bool>() {
            Some(Primitive::Boolean)
        } else if id == TypeId::of::<f64>() || id == TypeId::of::<f32>() {
            Some(Primitive::Float)
        } else if is_integer(id) {
            Some(Primitive::Integer)
        } else {
            None
        }
    }

    /// Check whether this type is a builtin primitive.
    pub fn is_primitive(&self) -> bool {
        self.primitive().is_some()
    }
}

fn is_integer(id: TypeId) -> bool {
    [
        TypeId::of::<i8>(),
        TypeId::of::<i16>(),
        TypeId::of::<i32>(),
        TypeId::of::<i64>(),
        TypeId::of::<i128>(),
        TypeId::of::<isize>(),
        TypeId::of::<u8>(),
        TypeId::of::<u16>(),
        TypeId::of::<u32>(),
        TypeId::of::<u64>(),
        TypeId::of::<usize>(),
    ]
    .contains(&id)
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl std::hash::Hash for TypeKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// The closed set of builtin primitives.
///
/// Values of these kinds are written to documents as-is and never need a
/// registered converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// UTF-8 text
    Text,
    /// Signed or unsigned integer of any width
    Integer,
    /// Floating point number
    Float,
    /// Boolean value
    Boolean,
}

impl Primitive {
    /// Lowercase name used in log output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared shape of a field.
///
/// The shape selects the conversion strategy: mapping fields convert keys
/// and values separately, sequence fields convert per element, everything
/// else is a scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeShape {
    /// A single value of the given type
    Scalar(TypeKey),
    /// An ordered collection of elements
    Sequence {
        /// Element type
        element: TypeKey,
    },
    /// A key/value collection
    Mapping {
        /// Key type
        key: TypeKey,
        /// Value type
        value: TypeKey,
    },
}

impl TypeShape {
    /// Scalar field of type `T`.
    pub fn scalar<T: Any>() -> Self {
        Self::Scalar(TypeKey::of::<T>())
    }

    /// Sequence field with elements of type `E`.
    pub fn sequence<E: Any>() -> Self {
        Self::Sequence {
            element: TypeKey::of::<E>(),
        }
    }

    /// Mapping field from `K` to `V`.
    pub fn mapping<K: Any, V: Any>() -> Self {
        Self::Mapping {
            key: TypeKey::of::<K>(),
            value: TypeKey::of::<V>(),
        }
    }
}
