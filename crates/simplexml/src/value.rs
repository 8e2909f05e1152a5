//! Decoded values.

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::Serialize;

/// Tag name to value. Keeps first-occurrence order; equality ignores order.
pub type Map = IndexMap<String, Value>;

/// A decoded element value.
///
/// `List` only ever appears as a value inside a [`Map`], and only when the
/// tag repeated among siblings; list items are never lists themselves.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// No text at all, or text that converted to nothing.
    Null,

    Integer(i64),

    Float(f64),

    String(String),

    /// Serialized content of a mixed element, text and child markup together.
    Markup(String),

    Map(Map),

    List(Vec<Value>),
}

/// The result of decoding one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Tag of the root element.
    pub root: String,

    /// Value of the root element's content.
    pub value: Value,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_markup(&self) -> bool {
        matches!(self, Value::Markup(_))
    }

    /// Text of a `String` or `Markup` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Markup(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value as a float; integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a key, if this is a map.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Every occurrence stored under `key`: the list items for a repeated tag,
    /// the single value otherwise, nothing for a missing key.
    pub fn get_all(&self, key: &str) -> &[Value] {
        match self.get(key) {
            Some(Value::List(items)) => items,
            Some(value) => std::slice::from_ref(value),
            None => &[],
        }
    }

    /// Short name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Markup(_) => "markup",
            Value::Map(_) => "map",
            Value::List(_) => "list",
        }
    }
}

/// Fold one child value into its parent's map.
///
/// The first occurrence of a tag is stored as is; the second turns the entry
/// into a two-element list; later occurrences append.
pub fn insert_repeated(map: &mut Map, key: String, value: Value) {
    match map.entry(key) {
        Entry::Vacant(entry) => {
            entry.insert(value);
        }
        Entry::Occupied(mut entry) => match entry.get_mut() {
            Value::List(items) => items.push(value),
            existing => {
                let first = std::mem::replace(existing, Value::Null);
                *existing = Value::List(vec![first, value]);
            }
        },
    }
}

impl Document {
    /// The document as a one-entry map from the root tag to its value.
    pub fn into_keyed(self) -> Value {
        let mut map = Map::new();
        map.insert(self.root, self.value);
        Value::Map(map)
    }

    /// Look up a key in the root's map.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.value.get(key)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(map)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// JSON has no markup leaf, so strings always become `String`. Booleans,
/// which simple content cannot express, become the strings `"true"`/`"false"`.
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::String(b.to_string()),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}
