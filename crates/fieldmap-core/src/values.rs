//! Live field values.
//!
//! `Value` is the dynamic representation of a field read from, or written
//! back to, an object. Primitives are held directly; any other type is kept
//! as an opaque boxed [`ObjectValue`] that converters can downcast.

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::hash::Hash;

use crate::types::{Primitive, TypeKey};

/// Object-safe view of a boxed custom value.
///
/// Implemented for every `Clone + Debug + Send + Sync + 'static` type, so
/// callers never implement it by hand. The blanket impl also covers
/// `Box<dyn ObjectValue>` itself, so call sites deref the box explicitly.
pub trait ObjectValue: Any + fmt::Debug + Send + Sync {
    /// Type token of the boxed value.
    fn object_type(&self) -> TypeKey;

    /// Clone into a new box.
    fn clone_object(&self) -> Box<dyn ObjectValue>;

    /// Borrow as `Any` for downcasting.
    fn as_any_object(&self) -> &dyn Any;

    /// Convert into `Box<dyn Any>` for downcasting by value.
    fn into_any_object(self: Box<Self>) -> Box<dyn Any>;
}

impl<T> ObjectValue for T
where
    T: Any + Clone + fmt::Debug + Send + Sync,
{
    fn object_type(&self) -> TypeKey {
        TypeKey::of::<T>()
    }

    fn clone_object(&self) -> Box<dyn ObjectValue> {
        Box::new(self.clone())
    }

    fn as_any_object(&self) -> &dyn Any {
        self
    }

    fn into_any_object(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl Clone for Box<dyn ObjectValue> {
    fn clone(&self) -> Self {
        (**self).clone_object()
    }
}

/// Concrete container type of a sequence field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceKind {
    /// `Vec<T>`
    Vec,
    /// `VecDeque<T>`
    VecDeque,
    /// `BTreeSet<T>`
    BTreeSet,
    /// `HashSet<T>`
    HashSet,
}

/// Concrete container type of a mapping field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappingKind {
    /// `HashMap<K, V>`
    HashMap,
    /// `BTreeMap<K, V>`
    BTreeMap,
}

/// Dynamic live value of one field.
#[derive(Debug, Clone)]
pub enum Value {
    /// Absent value (e.g. an empty `Option`)
    Null,

    /// Text
    Text(String),

    /// Integer of any width up to 64 bits (signed or unsigned) or `i128`,
    /// widened to 128 bits
    Integer(i128),

    /// Floating point number
    Float(f64),

    /// Boolean
    Boolean(bool),

    /// Any other type, boxed
    Object(Box<dyn ObjectValue>),

    /// Ordered collection tagged with its container kind
    Sequence {
        /// Concrete container type of the field
        kind: SequenceKind,
        /// Elements in iteration order
        items: Vec<Value>,
    },

    /// Key/value collection tagged with its container kind
    Mapping {
        /// Concrete container type of the field
        kind: MappingKind,
        /// Entries in iteration order
        entries: Vec<(Value, Value)>,
    },
}

impl Value {
    /// Box an arbitrary value.
    pub fn object<T>(value: T) -> Self
    where
        T: Any + Clone + fmt::Debug + Send + Sync,
    {
        Self::Object(Box::new(value))
    }

    /// Wrap a native value, using the primitive variants where the runtime
    /// type is `String`, `i128`, `f64` or `bool`.
    pub fn from_native<T>(value: T) -> Self
    where
        T: Any + Clone + fmt::Debug + Send + Sync,
    {
        let any: &dyn Any = &value;
        if let Some(s) = any.downcast_ref::<String>() {
            Self::Text(s.clone())
        } else if let Some(i) = any.downcast_ref::<i128>() {
            Self::Integer(*i)
        } else if let Some(f) = any.downcast_ref::<f64>() {
            Self::Float(*f)
        } else if let Some(b) = any.downcast_ref::<bool>() {
            Self::Boolean(*b)
        } else {
            Self::object(value)
        }
    }

    /// Borrow the payload of a scalar value as `Any`.
    ///
    /// This is the inverse of [`Value::from_native`]: primitives expose
    /// their `String`/`i128`/`f64`/`bool`, objects expose the boxed value.
    pub fn as_native(&self) -> Option<&dyn Any> {
        match self {
            Self::Text(s) => Some(s as &dyn Any),
            Self::Integer(i) => Some(i as &dyn Any),
            Self::Float(f) => Some(f as &dyn Any),
            Self::Boolean(b) => Some(b as &dyn Any),
            Self::Object(obj) => Some((**obj).as_any_object()),
            Self::Null | Self::Sequence { .. } | Self::Mapping { .. } => None,
        }
    }

    /// Create an empty sequence of the given kind.
    pub fn empty_sequence(kind: SequenceKind) -> Self {
        Self::Sequence {
            kind,
            items: Vec::new(),
        }
    }

    /// Create an empty mapping of the given kind.
    pub fn empty_mapping(kind: MappingKind) -> Self {
        Self::Mapping {
            kind,
            entries: Vec::new(),
        }
    }

    /// Build a sequence value from any iterator of items convertible to `Value`.
    pub fn sequence<I>(kind: SequenceKind, items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Self::Sequence {
            kind,
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a sequence of boxed objects.
    pub fn object_sequence<I, T>(kind: SequenceKind, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Any + Clone + fmt::Debug + Send + Sync,
    {
        Self::Sequence {
            kind,
            items: items.into_iter().map(Value::object).collect(),
        }
    }

    /// Build a mapping value from `(key, value)` pairs.
    pub fn mapping<I, K, V>(kind: MappingKind, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        Self::Mapping {
            kind,
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Runtime type of this value, used for value-level converter lookup.
    ///
    /// Containers and `Null` have no runtime type.
    pub fn type_key(&self) -> Option<TypeKey> {
        match self {
            Self::Text(_) => Some(TypeKey::of::<String>()),
            Self::Integer(_) => Some(TypeKey::of::<i128>()),
            Self::Float(_) => Some(TypeKey::of::<f64>()),
            Self::Boolean(_) => Some(TypeKey::of::<bool>()),
            Self::Object(obj) => Some((**obj).object_type()),
            Self::Null | Self::Sequence { .. } | Self::Mapping { .. } => None,
        }
    }

    /// The builtin primitive held by this value, if any.
    pub fn primitive(&self) -> Option<Primitive> {
        match self {
            Self::Text(_) => Some(Primitive::Text),
            Self::Integer(_) => Some(Primitive::Integer),
            Self::Float(_) => Some(Primitive::Float),
            Self::Boolean(_) => Some(Primitive::Boolean),
            _ => None,
        }
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as an i64.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_i128().and_then(|i| i64::try_from(i).ok())
    }

    /// Try to get this value as an i128.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get this value as an f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow the boxed object as `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Object(obj) => (**obj).as_any_object().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Take the boxed object as `T`, giving the value back on mismatch.
    pub fn into_object<T: Any>(self) -> Result<T, Value> {
        match self {
            Self::Object(obj) => {
                if (*obj).as_any_object().is::<T>() {
                    match obj.into_any_object().downcast::<T>() {
                        Ok(t) => Ok(*t),
                        Err(_) => unreachable!("type checked above"),
                    }
                } else {
                    Err(Self::Object(obj))
                }
            }
            other => Err(other),
        }
    }

    /// Try to get the items of a sequence value.
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::Sequence { items, .. } => Some(items),
            _ => None,
        }
    }

    /// Try to get the entries of a mapping value.
    pub fn as_mapping(&self) -> Option<&[(Value, Value)]> {
        match self {
            Self::Mapping { entries, .. } => Some(entries),
            _ => None,
        }
    }

    /// Convert a sequence into any collection of `T`, using `extract` per item.
    ///
    /// Returns `None` if this is not a sequence or any item is rejected.
    pub fn collect_sequence<C, T, F>(self, extract: F) -> Option<C>
    where
        C: FromIterator<T>,
        F: FnMut(Value) -> Option<T>,
    {
        match self {
            Self::Sequence { items, .. } => items.into_iter().map(extract).collect(),
            _ => None,
        }
    }

    /// Convert a mapping into any collection of `(K, V)`.
    ///
    /// Returns `None` if this is not a mapping or any entry is rejected.
    pub fn collect_mapping<C, K, V, FK, FV>(self, mut key: FK, mut value: FV) -> Option<C>
    where
        C: FromIterator<(K, V)>,
        FK: FnMut(Value) -> Option<K>,
        FV: FnMut(Value) -> Option<V>,
    {
        match self {
            Self::Mapping { entries, .. } => entries
                .into_iter()
                .map(|(k, v)| Some((key(k)?, value(v)?)))
                .collect(),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    /// Structural equality; boxed objects compare equal only by their
    /// `Debug` rendering and type, which is enough for diagnostics and tests.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => {
                (**a).object_type() == (**b).object_type() && format!("{a:?}") == format!("{b:?}")
            }
            (
                Self::Sequence { kind: ka, items: a },
                Self::Sequence { kind: kb, items: b },
            ) => ka == kb && a == b,
            (
                Self::Mapping {
                    kind: ka,
                    entries: a,
                },
                Self::Mapping {
                    kind: kb,
                    entries: b,
                },
            ) => ka == kb && a == b,
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// From impls: native Rust values -> Value
// ---------------------------------------------------------------------------

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Self::Float(f as f64)
    }
}

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(i: $t) -> Self {
                    Self::Integer(i as i128)
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Self::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::sequence(SequenceKind::Vec, items)
    }
}

impl<T: Into<Value>> From<VecDeque<T>> for Value {
    fn from(items: VecDeque<T>) -> Self {
        Self::sequence(SequenceKind::VecDeque, items)
    }
}

impl<T: Into<Value>> From<BTreeSet<T>> for Value {
    fn from(items: BTreeSet<T>) -> Self {
        Self::sequence(SequenceKind::BTreeSet, items)
    }
}

impl<T: Into<Value>> From<HashSet<T>> for Value {
    fn from(items: HashSet<T>) -> Self {
        Self::sequence(SequenceKind::HashSet, items)
    }
}

impl<K: Into<Value>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
    fn from(map: BTreeMap<K, V>) -> Self {
        Self::mapping(MappingKind::BTreeMap, map)
    }
}

impl<K: Into<Value> + Eq + Hash, V: Into<Value>> From<HashMap<K, V>> for Value {
    fn from(map: HashMap<K, V>) -> Self {
        Self::mapping(MappingKind::HashMap, map)
    }
}

// ---------------------------------------------------------------------------
// Extraction helpers: Value -> native Rust values
// ---------------------------------------------------------------------------

/// Conversion from a dynamic [`Value`] back into a native field type.
///
/// Implemented for the primitive types; custom types go through
/// [`Value::into_object`].
pub trait FromValue: Sized {
    /// Extract `Self`, or `None` if the value has the wrong shape or range.
    fn from_value(value: Value) -> Option<Self>;
}

impl FromValue for String {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Option<Self> {
        value.as_f64()
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Option<Self> {
        value
            .as_f64()
            .filter(|f| !f.is_finite() || f.abs() <= f32::MAX as f64)
            .map(|f| f as f32)
    }
}

macro_rules! impl_from_value_integer {
    ($($t:ty),*) => {
        $(
            impl FromValue for $t {
                fn from_value(value: Value) -> Option<Self> {
                    value.as_i128().and_then(|i| <$t>::try_from(i).ok())
                }
            }
        )*
    };
}

impl_from_value_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}
