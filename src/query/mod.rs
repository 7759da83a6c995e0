//! JSONPath selector-chain evaluation.
//!
//! This module evaluates compiled path expressions against any tree that
//! implements [`Document`](crate::document::Document). Turning a path string
//! into a chain is left to the caller; chains are assembled from
//! [`Selector`] constructors and a [`ChainBuilder`].
//!
//! # Supported Selectors
//!
//! - `$` - Root node, memoized once per query
//! - `@` - Current node
//! - `^` - Parent (ancestor) of the current node
//! - `.name` / `['name']` - Member access, numeric access and `length` on arrays
//! - `[index]` - Array index (supports negative indices)
//! - `[*]` - All children (wildcard)
//! - `..` - Recursive descent
//! - `[start:stop:step]` - Array slicing
//! - `[a,b]` - Union of sub-paths
//! - `[?(expr)]`, `[(expr)]`, `[fn(...)]` - Filters, computed indices and
//!   function calls via the [`Expression`] seam
//!
//! # Examples
//!
//! ```
//! use pathquill::config::Options;
//! use pathquill::query::{ChainBuilder, JsonPath, Selector, Slice};
//! use serde_json::json;
//!
//! // $.a[1:4:2]
//! let mut builder = ChainBuilder::new();
//! let path = JsonPath::new(
//!     builder
//!         .root()
//!         .then(Selector::identifier("a"))
//!         .then(Selector::slice(Slice::new(Some(1), Some(4), 2).unwrap())),
//! );
//! let doc = json!({"a": [0, 1, 2, 3, 4, 5]});
//! let values = path.query(&doc, &Options::default()).into_values();
//! assert_eq!(values, vec![json!(1), json!(3)]);
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod expression;
pub mod jsonpath;
pub mod path;
pub mod resources;
pub mod slice;

pub use ast::{ChainBuilder, PathExpression, Selector, SelectorKind};
pub use error::{ExpressionError, SelectorError};
pub use expression::Expression;
pub use jsonpath::{JsonPath, Located, QueryOutput};
pub use path::{NormalizedPath, PathNode, PathStep};
pub use resources::{NodeKind, NodeSet, PathValue, Resources, SelectorId};
pub use slice::Slice;
