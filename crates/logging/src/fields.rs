//! Ordered log field collections with precedence-aware merging.

use serde_json::Value;
use std::borrow::Cow;
use std::fmt::{self, Display};

/// A single log field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(Cow<'static, str>),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Structured payload content produced by a `Serializable` message.
    Json(Value),
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(x) => write!(f, "{}", x),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Json(v) => write!(f, "{}", v),
        }
    }
}

impl From<&'static str> for FieldValue {
    fn from(s: &'static str) -> Self {
        FieldValue::Str(Cow::Borrowed(s))
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(Cow::Owned(s))
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<f64> for FieldValue {
    fn from(x: f64) -> Self {
        FieldValue::Float(x)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<Value> for FieldValue {
    fn from(v: Value) -> Self {
        FieldValue::Json(v)
    }
}

impl FieldValue {
    fn to_json(&self) -> Value {
        match self {
            FieldValue::Str(s) => Value::String(s.to_string()),
            FieldValue::Int(i) => Value::from(*i),
            FieldValue::Float(x) => Value::from(*x),
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Json(v) => v.clone(),
        }
    }
}

/// An ordered collection of log fields.
///
/// Keys need not be unique within a collection; the merge operations resolve
/// duplicates with first-seen-wins precedence while preserving insertion
/// order. Merges never mutate their operands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(Vec<(Cow<'static, str>, FieldValue)>);

impl Fields {
    /// Create an empty field collection.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a field, regardless of whether the key is already present.
    pub fn push(&mut self, key: impl Into<Cow<'static, str>>, value: impl Into<FieldValue>) {
        self.0.push((key.into(), value.into()));
    }

    /// Builder form of [`Fields::push`].
    pub fn with(mut self, key: impl Into<Cow<'static, str>>, value: impl Into<FieldValue>) -> Self {
        self.push(key, value);
        self
    }

    /// Whether any field with the given key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    /// First value recorded for the given key, if any.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// New collection holding `self` followed by the fields of `other` whose
    /// keys are not already present. Existing keys win.
    ///
    /// # Examples
    ///
    /// ```
    /// use callwatch_logging::Fields;
    ///
    /// let base = Fields::new().with("grpc.service", "Echo");
    /// let other = Fields::new().with("grpc.service", "Other").with("region", "eu");
    ///
    /// let merged = base.with_unique(&other);
    /// assert_eq!(merged.get("grpc.service").unwrap().to_string(), "Echo");
    /// assert_eq!(merged.get("region").unwrap().to_string(), "eu");
    /// ```
    pub fn with_unique(&self, other: &Fields) -> Fields {
        let mut merged = self.clone();
        for (key, value) in &other.0 {
            if !merged.contains_key(key) {
                merged.0.push((key.clone(), value.clone()));
            }
        }
        merged
    }

    /// Consuming form of [`Fields::with_unique`], used when accumulating
    /// event-specific fields onto a base set. Duplicate keys inside `other`
    /// collapse against the growing result.
    pub fn append_unique(mut self, other: Fields) -> Fields {
        for (key, value) in other.0 {
            if !self.contains_key(&key) {
                self.0.push((key, value));
            }
        }
        self
    }

    /// Remove every field with the given key.
    pub fn delete(&mut self, key: &str) {
        self.0.retain(|(k, _)| k != key);
    }

    /// Number of fields, counting duplicate keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_ref(), v))
    }

    /// Render the collection as a JSON object. When a key occurs more than
    /// once, the first occurrence wins, matching merge precedence.
    pub fn to_json(&self) -> Value {
        let mut object = serde_json::Map::new();
        for (key, value) in &self.0 {
            object
                .entry(key.to_string())
                .or_insert_with(|| value.to_json());
        }
        Value::Object(object)
    }
}

impl IntoIterator for Fields {
    type Item = (Cow<'static, str>, FieldValue);
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(Cow<'static, str>, FieldValue)> for Fields {
    fn from_iter<I: IntoIterator<Item = (Cow<'static, str>, FieldValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
