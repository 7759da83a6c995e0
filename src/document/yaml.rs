use serde_yaml::{Mapping, Value};

use super::{Document, DocumentKind};

/// Members of a YAML mapping, in document order.
///
/// Only string keys are addressable by a path; entries with other key types
/// (numbers, sequences, ...) are skipped.
pub struct YamlMembers<'a>(serde_yaml::mapping::Iter<'a>);

impl<'a> Iterator for YamlMembers<'a> {
    type Item = (&'a str, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        for (key, value) in self.0.by_ref() {
            if let Some(key) = key.as_str() {
                return Some((key, untagged(value)));
            }
        }
        None
    }
}

/// Looks through `!tag` wrappers to the tagged value.
fn untagged(mut value: &Value) -> &Value {
    while let Value::Tagged(tagged) = value {
        value = &tagged.value;
    }
    value
}

impl Document for Value {
    type Members<'a> = YamlMembers<'a>;

    fn kind(&self) -> DocumentKind {
        match untagged(self) {
            Value::Mapping(_) => DocumentKind::Object,
            Value::Sequence(_) => DocumentKind::Array,
            Value::String(_) => DocumentKind::String,
            _ => DocumentKind::Scalar,
        }
    }

    fn as_array(&self) -> Option<&[Value]> {
        match untagged(self) {
            Value::Sequence(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    fn members(&self) -> Option<YamlMembers<'_>> {
        match untagged(self) {
            Value::Mapping(map) => Some(YamlMembers(map.iter())),
            _ => None,
        }
    }

    fn find(&self, key: &str) -> Option<&Value> {
        match untagged(self) {
            Value::Mapping(map) => map.get(key).map(untagged),
            _ => None,
        }
    }

    fn as_str(&self) -> Option<&str> {
        untagged(self).as_str()
    }

    fn as_index(&self) -> Option<usize> {
        untagged(self)
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
    }

    fn content(&self) -> &Value {
        untagged(self)
    }

    fn from_size(size: usize) -> Self {
        Value::Number((size as u64).into())
    }

    fn is_truthy(&self) -> bool {
        match untagged(self) {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Sequence(items) => !items.is_empty(),
            Value::Mapping(map) => !Mapping::is_empty(map),
            // Unreachable: untagged() never returns a tagged value.
            Value::Tagged(_) => true,
        }
    }
}
