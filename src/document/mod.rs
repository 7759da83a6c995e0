//! Document capability set consumed by the query engine.
//!
//! The evaluator never owns or mutates the document it walks. It only needs to
//! discriminate node types, iterate arrays and objects in order, look up
//! children by index or key, and fabricate a handful of scalar values (the
//! `length` pseudo-property). The [`Document`] trait captures exactly that, so
//! any tree type can be queried.
//!
//! Implementations are provided for `serde_json::Value` and `serde_yaml::Value`.
//!
//! # Example
//!
//! ```
//! use pathquill::document::{Document, DocumentKind};
//! use serde_json::json;
//!
//! let doc = json!({"name": "pathquill", "tags": ["a", "b"]});
//! assert_eq!(doc.kind(), DocumentKind::Object);
//! assert_eq!(doc.find("tags").map(|t| t.size()), Some(2));
//! ```

mod json;
mod yaml;

pub use json::JsonMembers;
pub use yaml::YamlMembers;

/// The coarse type of a document node, as far as selectors care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// A keyed container whose members iterate in document order
    Object,
    /// An ordered container
    Array,
    /// A string scalar
    String,
    /// Any other scalar (number, boolean, null)
    Scalar,
}

/// Read-only view of a JSON-like document tree.
pub trait Document: Sized {
    /// Iterator over the `(key, value)` members of an object node.
    type Members<'a>: Iterator<Item = (&'a str, &'a Self)>
    where
        Self: 'a;

    /// Returns the kind of this node.
    fn kind(&self) -> DocumentKind;

    /// Returns the elements if this node is an array.
    fn as_array(&self) -> Option<&[Self]>;

    /// Returns the members, in document-defined order, if this node is an object.
    fn members(&self) -> Option<Self::Members<'_>>;

    /// Looks up a member by key. Returns `None` for missing keys and non-objects.
    fn find(&self, key: &str) -> Option<&Self>;

    /// Returns the string contents if this node is a string.
    fn as_str(&self) -> Option<&str>;

    /// Returns the value if this node is an unsigned integer that fits `usize`.
    fn as_index(&self) -> Option<usize>;

    /// Fabricates an unsigned integer node.
    fn from_size(size: usize) -> Self;

    /// Truthiness used by filter admission.
    ///
    /// Empty arrays, empty objects, empty strings, `false`, numeric zero and
    /// null are falsy; everything else is truthy.
    fn is_truthy(&self) -> bool;

    /// Returns true if this node is an object.
    fn is_object(&self) -> bool {
        self.kind() == DocumentKind::Object
    }

    /// Returns true if this node is an array.
    fn is_array(&self) -> bool {
        self.kind() == DocumentKind::Array
    }

    /// Returns true if this node is a string.
    fn is_string(&self) -> bool {
        self.kind() == DocumentKind::String
    }

    /// Returns true if this node is neither a container nor a string.
    fn is_scalar(&self) -> bool {
        self.kind() == DocumentKind::Scalar
    }

    /// Number of elements or members; zero for scalars and strings.
    fn size(&self) -> usize {
        if let Some(items) = self.as_array() {
            items.len()
        } else if let Some(members) = self.members() {
            members.count()
        } else {
            0
        }
    }

    /// The node as selectors see it.
    ///
    /// Array elements are passed through this before selection, so wrapper
    /// nodes (YAML `!tag`s) are looked through the same way `members` and
    /// `find` already do for object members.
    fn content(&self) -> &Self {
        self
    }

    /// Indexed access into an array node.
    fn at(&self, index: usize) -> Option<&Self> {
        self.as_array()
            .and_then(|items| items.get(index))
            .map(Self::content)
    }
}
