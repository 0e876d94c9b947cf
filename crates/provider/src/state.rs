//! Resource State Values
//!
//! Typed attribute values with Terraform's null/unknown distinction, and the
//! dotted-path JSON helpers serializers use to move fields in and out of FMC
//! payloads.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// A single attribute value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attr<T> {
    Null,
    /// Computed by the backend, not resolved yet
    Unknown,
    Known(T),
}

impl<T> Default for Attr<T> {
    fn default() -> Self {
        Attr::Null
    }
}

impl<T> Attr<T> {
    pub fn known(value: impl Into<T>) -> Self {
        Attr::Known(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Attr::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Attr::Unknown)
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Attr::Known(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Attr::Known(v) => Some(v),
            _ => None,
        }
    }

    /// Turn a null into unknown, leaving known values alone
    pub fn mark_unknown(&mut self) {
        if self.is_null() {
            *self = Attr::Unknown;
        }
    }

    /// Replace the value unless it is null locally
    pub fn set_partial(&mut self, value: Attr<T>) {
        if !self.is_null() {
            *self = value;
        }
    }

    /// Replace the value only while it is unknown
    pub fn set_unknown(&mut self, value: Attr<T>) {
        if self.is_unknown() {
            *self = value;
        }
    }
}

impl Attr<String> {
    pub fn as_str(&self) -> Option<&str> {
        self.value().map(String::as_str)
    }
}

impl<T> From<Option<T>> for Attr<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Attr::Null, Attr::Known)
    }
}

impl<T: Clone> Attr<T> {
    /// Copy `prior` over this value when this one is not known
    pub fn adopt(&mut self, prior: &Attr<T>) {
        if !self.is_known() && prior.is_known() {
            *self = prior.clone();
        }
    }
}

impl<T: FromJson> Attr<T> {
    /// Read the value at `path`, null when absent
    pub fn from_json_at(body: &Value, path: &str) -> Self {
        json_at(body, path).and_then(T::from_json).into()
    }

    /// Overwrite unconditionally
    pub fn read_full(&mut self, body: &Value, path: &str) {
        *self = Self::from_json_at(body, path);
    }

    /// Overwrite only when the local value is not null
    pub fn read_partial(&mut self, body: &Value, path: &str) {
        self.set_partial(Self::from_json_at(body, path));
    }

    /// Overwrite only when the local value is unknown
    pub fn read_unknown(&mut self, body: &Value, path: &str) {
        self.set_unknown(Self::from_json_at(body, path));
    }
}

impl<T: Serialize> Serialize for Attr<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Attr::Known(v) => v.serialize(serializer),
            Attr::Null | Attr::Unknown => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Attr<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Attr::from)
    }
}

/// Conversion from a JSON leaf, lenient about FMC's habit of quoting numbers
pub trait FromJson: Sized {
    fn from_json(value: &Value) -> Option<Self>;
}

impl FromJson for String {
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl FromJson for i64 {
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl FromJson for bool {
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

/// Look up a dotted path; JSON null counts as absent
pub fn json_at<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for key in path.split('.') {
        current = current.as_object()?.get(key)?;
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

/// Set a dotted path, creating intermediate objects
pub fn set_json_at(target: &mut Value, path: &str, new: Value) {
    let keys: Vec<&str> = path.split('.').collect();
    let Some((last, parents)) = keys.split_last() else {
        return;
    };

    let mut current = target;
    for key in parents {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        current = match current {
            Value::Object(map) => map
                .entry(key.to_string())
                .or_insert_with(|| Value::Object(Map::new())),
            _ => return,
        };
    }

    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    if let Value::Object(map) = current {
        map.insert(last.to_string(), new);
    }
}

/// Write a known attribute into `body`; null and unknown are skipped
pub fn put_attr<T: Serialize>(body: &mut Value, path: &str, attr: &Attr<T>) {
    if let Attr::Known(v) = attr {
        if let Ok(json) = serde_json::to_value(v) {
            set_json_at(body, path, json);
        }
    }
}

/// Map the array at `path` element-wise; null when absent
pub fn list_at<T, F>(body: &Value, path: &str, parse: F) -> Attr<Vec<T>>
where
    F: Fn(&Value) -> T,
{
    json_at(body, path)
        .and_then(Value::as_array)
        .map(|items| items.iter().map(parse).collect())
        .into()
}

/// The object list of a collection response (`{"items": [...]}` or a bare array)
pub fn items_of(response: &Value) -> &[Value] {
    match response {
        Value::Array(items) => items,
        other => other
            .get("items")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default(),
    }
}

/// First object whose string field `field` equals `expected`
pub fn find_by_field<'a>(items: &'a [Value], field: &str, expected: &str) -> Option<&'a Value> {
    items
        .iter()
        .find(|item| json_at(item, field).and_then(Value::as_str) == Some(expected))
}

/// Decode a state value, treating JSON null as the type's default
pub fn decode_state<T: DeserializeOwned + Default>(value: &Value) -> serde_json::Result<T> {
    if value.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(value.clone())
}

/// Encode a state value
pub fn encode_state<T: Serialize>(state: &T) -> serde_json::Result<Value> {
    serde_json::to_value(state)
}
