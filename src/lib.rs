//! PathQuill - JSONPath selector-chain evaluation over JSON and YAML trees.
//!
//! - [`document`] - the read-only capability set a queryable tree provides
//! - [`query`] - selector chains, execution resources and the evaluator
//! - [`config`] - evaluation options, loadable from TOML

pub mod config;
pub mod document;
pub mod query;

pub use config::{Options, ResultShape};
pub use document::{Document, DocumentKind};
pub use query::{JsonPath, NodeKind, NodeSet, QueryOutput, Resources, Selector};
