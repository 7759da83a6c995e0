//! Selector chain types.
//!
//! A compiled path expression is a singly-linked chain of [`Selector`]s. Each
//! selector owns at most one tail; appending walks to the end of the chain.
//! Chains are built once and shared read-only by any number of evaluations.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::document::Document;

use super::expression::Expression;
use super::resources::SelectorId;
use super::slice::Slice;

/// The operation a selector performs.
pub enum SelectorKind<D: Document> {
    /// Member access (`.name`); also numeric access and `length` on arrays
    Identifier(String),
    /// Re-anchor at the document root (`$`), memoized per query
    Root(SelectorId),
    /// The current node (`@`)
    Current,
    /// The n-th ancestor of the current node (`^`)
    Parent(usize),
    /// Array index (`[2]`, `[-1]`)
    Index(i64),
    /// All children (`*`)
    Wildcard,
    /// Recursive descent (`..`)
    Recursive,
    /// Array slice (`[start:stop:step]`)
    Slice(Slice),
    /// Union of independent paths (`[a,b]`)
    Union(Vec<PathExpression<D>>),
    /// Filter predicate (`[?(expr)]`)
    Filter(Box<dyn Expression<D>>),
    /// Computed index or key (`[(expr)]`)
    IndexExpression(Box<dyn Expression<D>>),
    /// Function call producing a new value (`[fn(...)]`)
    Function(Box<dyn Expression<D>>),
}

/// One step of a selector chain plus its continuation.
pub struct Selector<D: Document> {
    pub(crate) kind: SelectorKind<D>,
    pub(crate) tail: Option<Box<Selector<D>>>,
}

impl<D: Document> Selector<D> {
    fn new(kind: SelectorKind<D>) -> Self {
        Self { kind, tail: None }
    }

    pub fn identifier(name: impl Into<String>) -> Self {
        Self::new(SelectorKind::Identifier(name.into()))
    }

    pub fn current() -> Self {
        Self::new(SelectorKind::Current)
    }

    /// Selects the ancestor `levels` steps above the current node.
    pub fn parent(levels: usize) -> Self {
        Self::new(SelectorKind::Parent(levels))
    }

    pub fn index(index: i64) -> Self {
        Self::new(SelectorKind::Index(index))
    }

    pub fn wildcard() -> Self {
        Self::new(SelectorKind::Wildcard)
    }

    pub fn recursive() -> Self {
        Self::new(SelectorKind::Recursive)
    }

    pub fn slice(slice: Slice) -> Self {
        Self::new(SelectorKind::Slice(slice))
    }

    pub fn union(branches: Vec<PathExpression<D>>) -> Self {
        Self::new(SelectorKind::Union(branches))
    }

    pub fn filter(expr: impl Expression<D> + 'static) -> Self {
        Self::new(SelectorKind::Filter(Box::new(expr)))
    }

    pub fn index_expression(expr: impl Expression<D> + 'static) -> Self {
        Self::new(SelectorKind::IndexExpression(Box::new(expr)))
    }

    pub fn function(expr: impl Expression<D> + 'static) -> Self {
        Self::new(SelectorKind::Function(Box::new(expr)))
    }

    pub fn kind(&self) -> &SelectorKind<D> {
        &self.kind
    }

    pub fn tail(&self) -> Option<&Selector<D>> {
        self.tail.as_deref()
    }

    /// Appends `next` at the end of this chain.
    pub fn append(&mut self, next: Selector<D>) {
        match self.tail {
            Some(ref mut tail) => tail.append(next),
            None => self.tail = Some(Box::new(next)),
        }
    }

    /// Builder form of [`Selector::append`].
    pub fn then(mut self, next: Selector<D>) -> Self {
        self.append(next);
        self
    }

    /// Number of selectors in this chain, this one included.
    pub fn chain_len(&self) -> usize {
        let mut len = 1;
        let mut node = self;
        while let Some(tail) = node.tail() {
            len += 1;
            node = tail;
        }
        len
    }

    /// Writes this selector alone, without brackets for bracketed kinds.
    fn fmt_bare(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SelectorKind::Identifier(name) => write_quoted(f, name),
            SelectorKind::Root(_) => write!(f, "$"),
            SelectorKind::Current => write!(f, "@"),
            SelectorKind::Parent(levels) => write!(f, "{}", "^".repeat(*levels)),
            SelectorKind::Index(index) => write!(f, "{}", index),
            SelectorKind::Wildcard => write!(f, "*"),
            SelectorKind::Recursive => write!(f, ".."),
            SelectorKind::Slice(slice) => {
                if let Some(start) = slice.start() {
                    write!(f, "{}", start)?;
                }
                write!(f, ":")?;
                if let Some(stop) = slice.stop() {
                    write!(f, "{}", stop)?;
                }
                if slice.step() != 1 {
                    write!(f, ":{}", slice.step())?;
                }
                Ok(())
            }
            SelectorKind::Union(branches) => {
                for (i, branch) in branches.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    branch.head.fmt_bare(f)?;
                    if let Some(tail) = branch.head.tail() {
                        write!(f, "{}", tail)?;
                    }
                }
                Ok(())
            }
            SelectorKind::Filter(expr) => write!(f, "?({})", expr.describe()),
            SelectorKind::IndexExpression(expr) => write!(f, "({})", expr.describe()),
            SelectorKind::Function(expr) => write!(f, "{}", expr.describe()),
        }
    }

    fn is_bracketed(&self) -> bool {
        !matches!(
            self.kind,
            SelectorKind::Root(_)
                | SelectorKind::Current
                | SelectorKind::Parent(_)
                | SelectorKind::Recursive
        )
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    write!(f, "'{}'", name.replace('\'', "\\'"))
}

impl<D: Document> fmt::Display for Selector<D> {
    /// Renders the chain from this selector on, e.g. `$['a'][*]..[1:4:2]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut node = Some(self);
        while let Some(selector) = node {
            if selector.is_bracketed() {
                write!(f, "[")?;
                selector.fmt_bare(f)?;
                write!(f, "]")?;
            } else {
                selector.fmt_bare(f)?;
            }
            node = selector.tail();
        }
        Ok(())
    }
}

impl<D: Document> fmt::Debug for Selector<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selector({})", self)
    }
}

/// A selector chain evaluated as a unit, e.g. one branch of a union.
pub struct PathExpression<D: Document> {
    pub(crate) head: Selector<D>,
}

impl<D: Document> PathExpression<D> {
    pub fn new(head: Selector<D>) -> Self {
        Self { head }
    }

    pub fn head(&self) -> &Selector<D> {
        &self.head
    }
}

impl<D: Document> From<Selector<D>> for PathExpression<D> {
    fn from(head: Selector<D>) -> Self {
        Self::new(head)
    }
}

impl<D: Document> fmt::Display for PathExpression<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.head, f)
    }
}

impl<D: Document> fmt::Debug for PathExpression<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PathExpression({})", self.head)
    }
}

/// Source of selector ids. Ids are unique for the life of the process, so
/// roots drawn from different builders never share a cache entry.
static NEXT_SELECTOR_ID: AtomicUsize = AtomicUsize::new(0);

/// Hands out selector ids while a chain (and its nested sub-paths) is built.
#[derive(Debug, Default)]
pub struct ChainBuilder {
    issued: usize,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a root selector (`$`) with a fresh id.
    pub fn root<D: Document>(&mut self) -> Selector<D> {
        let id = SelectorId(NEXT_SELECTOR_ID.fetch_add(1, Ordering::Relaxed));
        self.issued += 1;
        Selector::new(SelectorKind::Root(id))
    }

    /// Number of ids this builder has handed out.
    pub fn issued(&self) -> usize {
        self.issued
    }
}
