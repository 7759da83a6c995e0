//! The seam to the scalar sub-language used by filters, computed indices and
//! function calls.
//!
//! The selector engine does not know how `@.price < 10` or `length(@.items)`
//! are evaluated. It hands the current node to an [`Expression`] and reads back
//! a value; errors are never propagated past the selector that asked.

use crate::config::Options;
use crate::document::Document;

use super::error::ExpressionError;
use super::resources::Resources;

/// A scalar or boolean sub-expression embedded in a selector.
///
/// Implementations may evaluate nested selector chains (e.g. `$.threshold`)
/// through [`PathExpression::evaluate`](super::PathExpression::evaluate) with
/// the same `resources`, so root-anchored paths are memoized per query.
pub trait Expression<D: Document>: Send + Sync {
    /// Evaluates the expression with `current` bound to `@`.
    fn evaluate_single<'a>(
        &self,
        resources: &'a Resources<'a, D>,
        root: &'a D,
        current: &'a D,
        options: &Options,
    ) -> Result<D, ExpressionError>;

    /// Short text form used when rendering a selector chain.
    fn describe(&self) -> String {
        "expr".to_string()
    }
}
