use serde_json::{Map, Value};

use super::{Document, DocumentKind};

/// Members of a `serde_json` object, in insertion order.
pub struct JsonMembers<'a>(serde_json::map::Iter<'a>);

impl<'a> Iterator for JsonMembers<'a> {
    type Item = (&'a str, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(key, value)| (key.as_str(), value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl Document for Value {
    type Members<'a> = JsonMembers<'a>;

    fn kind(&self) -> DocumentKind {
        match self {
            Value::Object(_) => DocumentKind::Object,
            Value::Array(_) => DocumentKind::Array,
            Value::String(_) => DocumentKind::String,
            Value::Null | Value::Bool(_) | Value::Number(_) => DocumentKind::Scalar,
        }
    }

    fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    fn members(&self) -> Option<JsonMembers<'_>> {
        self.as_object().map(|map: &Map<String, Value>| JsonMembers(map.iter()))
    }

    fn find(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    fn as_str(&self) -> Option<&str> {
        Value::as_str(self)
    }

    fn as_index(&self) -> Option<usize> {
        self.as_u64().and_then(|n| usize::try_from(n).ok())
    }

    fn from_size(size: usize) -> Self {
        Value::from(size)
    }

    fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => !map.is_empty(),
        }
    }

    fn size(&self) -> usize {
        match self {
            Value::Array(items) => items.len(),
            Value::Object(map) => map.len(),
            _ => 0,
        }
    }
}
