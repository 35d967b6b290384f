//! The generic document tree exchanged with format backends.
//!
//! A [`Document`] is an insertion-ordered string map. Order is part of the
//! contract: saved documents list keys in field declaration order and codecs
//! must keep that order when writing and reading text.
//!
//! ```text
//! Document
//!    └── key ──► DocumentValue
//!                  ├── Null | Bool | Number | Text
//!                  ├── Sequence(Vec<DocumentValue>)
//!                  └── Mapping(Document)
//! ```

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Numeric document scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Integral number; wide enough for every `i64` and `u64`
    Integer(i128),
    /// Floating point number
    Float(f64),
}

impl Number {
    /// Value as f64 (integers are widened).
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Integer(i) => *i as f64,
            Self::Float(f) => *f,
        }
    }

    /// Value as i128, if it is integral and in range.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Float(f) if f.is_finite() && f.fract() == 0.0 => {
                if *f >= i128::MIN as f64 && *f < i128::MAX as f64 {
                    Some(*f as i128)
                } else {
                    None
                }
            }
            Self::Float(_) => None,
        }
    }

    /// Value as i64, if it is integral and in range.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_i128().and_then(|i| i64::try_from(i).ok())
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
        }
    }
}

/// One value in a document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentValue {
    /// Null scalar
    Null,
    /// Boolean scalar
    Bool(bool),
    /// Numeric scalar
    Number(Number),
    /// Text scalar
    Text(String),
    /// Ordered list
    Sequence(Vec<DocumentValue>),
    /// Ordered string-keyed map
    Mapping(Document),
}

impl DocumentValue {
    /// Check whether this is a scalar (null, bool, number or text).
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Self::Sequence(_) | Self::Mapping(_))
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

    /// Try to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get this value as a number.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get this value as a list.
    pub fn as_sequence(&self) -> Option<&[DocumentValue]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Try to get this value as a nested map.
    pub fn as_mapping(&self) -> Option<&Document> {
        match self {
            Self::Mapping(doc) => Some(doc),
            _ => None,
        }
    }

    /// String form of a scalar, as handed to converters.
    ///
    /// Text is returned as-is, numbers and booleans in their canonical form.
    /// Null and containers have no string form.
    pub fn scalar_string(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Number(n) => Some(n.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Null | Self::Sequence(_) | Self::Mapping(_) => None,
        }
    }
}

impl From<String> for DocumentValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for DocumentValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<bool> for DocumentValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for DocumentValue {
    fn from(i: i64) -> Self {
        Self::Number(Number::Integer(i.into()))
    }
}

impl From<u64> for DocumentValue {
    fn from(u: u64) -> Self {
        Self::Number(Number::Integer(u.into()))
    }
}

impl From<f64> for DocumentValue {
    fn from(f: f64) -> Self {
        Self::Number(Number::Float(f))
    }
}

impl From<Document> for DocumentValue {
    fn from(doc: Document) -> Self {
        Self::Mapping(doc)
    }
}

impl<T: Into<DocumentValue>> From<Vec<T>> for DocumentValue {
    fn from(items: Vec<T>) -> Self {
        Self::Sequence(items.into_iter().map(Into::into).collect())
    }
}

/// Insertion-ordered string map of [`DocumentValue`]s.
#[derive(Debug, Clone, Default)]
pub struct Document {
    entries: Vec<(String, DocumentValue)>,

    /// Key lookup into `entries`
    index: HashMap<String, usize>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the document has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a value, returning the previous value for the key.
    ///
    /// A replaced key keeps its original position.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<DocumentValue>,
    ) -> Option<DocumentValue> {
        let key = key.into();
        let value = value.into();
        match self.index.get(&key) {
            Some(&idx) => Some(std::mem::replace(&mut self.entries[idx].1, value)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&DocumentValue> {
        self.index.get(key).map(|&idx| &self.entries[idx].1)
    }

    /// Check whether a key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Remove a key, shifting later entries up by one.
    pub fn remove(&mut self, key: &str) -> Option<DocumentValue> {
        let idx = self.index.remove(key)?;
        let (_, value) = self.entries.remove(idx);
        for slot in self.index.values_mut() {
            if *slot > idx {
                *slot -= 1;
            }
        }
        Some(value)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DocumentValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl PartialEq for Document {
    /// Documents are equal when they hold the same entries in the same order.
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Into<String>, V: Into<DocumentValue>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut doc = Document::new();
        for (k, v) in iter {
            doc.insert(k, v);
        }
        doc
    }
}

impl IntoIterator for Document {
    type Item = (String, DocumentValue);
    type IntoIter = std::vec::IntoIter<(String, DocumentValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// ---------------------------------------------------------------------------
// serde: entries are written and read in document order
// ---------------------------------------------------------------------------

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for DocumentValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(Number::Integer(i)) => {
                if let Ok(i) = i64::try_from(*i) {
                    serializer.serialize_i64(i)
                } else if let Ok(u) = u64::try_from(*i) {
                    serializer.serialize_u64(u)
                } else {
                    serializer.serialize_i128(*i)
                }
            }
            Self::Number(Number::Float(f)) => serializer.serialize_f64(*f),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Mapping(doc) => doc.serialize(serializer),
        }
    }
}

struct DocumentVisitor;

impl<'de> Visitor<'de> for DocumentVisitor {
    type Value = Document;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map with string keys")
    }

    fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut doc = Document::new();
        while let Some(key) = map.next_key::<String>()? {
            let value: DocumentValue = map.next_value()?;
            doc.insert(key, value);
        }
        Ok(doc)
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(DocumentVisitor)
    }
}

impl<'de> Deserialize<'de> for DocumentValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DocumentValueVisitor;

        impl<'de> Visitor<'de> for DocumentValueVisitor {
            type Value = DocumentValue;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a scalar, list or map")
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(DocumentValue::Null)
            }

            fn visit_none<E>(self) -> Result<Self::Value, E> {
                Ok(DocumentValue::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                DocumentValue::deserialize(deserializer)
            }

            fn visit_bool<E>(self, b: bool) -> Result<Self::Value, E> {
                Ok(DocumentValue::Bool(b))
            }

            fn visit_i64<E>(self, i: i64) -> Result<Self::Value, E> {
                Ok(DocumentValue::Number(Number::Integer(i.into())))
            }

            fn visit_u64<E>(self, u: u64) -> Result<Self::Value, E> {
                Ok(DocumentValue::Number(Number::Integer(u.into())))
            }

            fn visit_i128<E>(self, i: i128) -> Result<Self::Value, E> {
                Ok(DocumentValue::Number(Number::Integer(i)))
            }

            // Integers beyond i128 degrade to floats rather than failing.
            fn visit_u128<E>(self, u: u128) -> Result<Self::Value, E> {
                Ok(match i128::try_from(u) {
                    Ok(i) => DocumentValue::Number(Number::Integer(i)),
                    Err(_) => DocumentValue::Number(Number::Float(u as f64)),
                })
            }

            fn visit_f64<E>(self, f: f64) -> Result<Self::Value, E> {
                Ok(DocumentValue::Number(Number::Float(f)))
            }

            fn visit_str<E>(self, s: &str) -> Result<Self::Value, E> {
                Ok(DocumentValue::Text(s.to_string()))
            }

            fn visit_string<E>(self, s: String) -> Result<Self::Value, E> {
                Ok(DocumentValue::Text(s))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(DocumentValue::Sequence(items))
            }

            fn visit_map<M>(self, map: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                DocumentVisitor.visit_map(map).map(DocumentValue::Mapping)
            }

            fn visit_bytes<E>(self, _: &[u8]) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Err(E::custom("binary values are not supported in documents"))
            }
        }

        deserializer.deserialize_any(DocumentValueVisitor)
    }
}
