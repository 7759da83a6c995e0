//! Per-query execution state.
//!
//! A [`Resources`] instance backs exactly one evaluation. It owns the values
//! fabricated during the query (the `length` pseudo-property, function call
//! results) and memoizes root-anchored sub-evaluations so that a `$...` path
//! referenced from inside a per-element filter is walked once per query.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use typed_arena::Arena;

use super::path::{NormalizedPath, PathNode};

/// Whether a result set is inherently singular or potentially plural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeKind {
    /// Produced only by one-to-one selectors
    #[default]
    Single,
    /// Produced by at least one selector that can fan out
    Multi,
}

impl NodeKind {
    /// Combines the kind of a downstream selector into this one.
    ///
    /// `Multi` is sticky: once a chain fans out, later one-to-one steps do not
    /// make it singular again.
    pub fn merge(&mut self, other: NodeKind) {
        if other == NodeKind::Multi {
            *self = NodeKind::Multi;
        }
    }

    pub fn is_multi(self) -> bool {
        self == NodeKind::Multi
    }
}

/// Identity of a memoizable selector, assigned when the chain is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelectorId(pub(crate) usize);

impl SelectorId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SelectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A selected value together with the path it was found at.
///
/// The value is never copied: it points either into the caller's document or
/// into the [`Resources`] arena, so it lives as long as both of those.
pub struct PathValue<'a, D> {
    pub path: Rc<PathNode>,
    pub value: &'a D,
}

impl<'a, D> PathValue<'a, D> {
    pub fn new(path: Rc<PathNode>, value: &'a D) -> Self {
        Self { path, value }
    }

    /// The canonical path of this match.
    pub fn normalized_path(&self) -> NormalizedPath {
        self.path.to_normalized()
    }
}

impl<D> Clone for PathValue<'_, D> {
    fn clone(&self) -> Self {
        Self {
            path: Rc::clone(&self.path),
            value: self.value,
        }
    }
}

impl<D: fmt::Debug> fmt::Debug for PathValue<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathValue")
            .field("path", &self.path.to_string())
            .field("value", self.value)
            .finish()
    }
}

/// The output of a selection: matched values plus the combined node-kind.
pub struct NodeSet<'a, D> {
    pub nodes: Vec<PathValue<'a, D>>,
    pub kind: NodeKind,
}

impl<'a, D> NodeSet<'a, D> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            kind: NodeKind::Single,
        }
    }

    pub fn push(&mut self, path: Rc<PathNode>, value: &'a D) {
        self.nodes.push(PathValue::new(path, value));
    }

    /// Records that a fan-out selector contributed to this set.
    pub fn mark_multi(&mut self) {
        self.kind = NodeKind::Multi;
    }

    /// Moves every node of `other` to the end of this set.
    pub fn append(&mut self, other: NodeSet<'a, D>) {
        self.nodes.extend(other.nodes);
        self.kind.merge(other.kind);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The matched values in selection order.
    pub fn values(&self) -> impl Iterator<Item = &'a D> + '_ {
        self.nodes.iter().map(|node| node.value)
    }
}

impl<D> Default for NodeSet<'_, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Clone for NodeSet<'_, D> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            kind: self.kind,
        }
    }
}

impl<D: fmt::Debug> fmt::Debug for NodeSet<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeSet")
            .field("nodes", &self.nodes)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Mutable context shared by every selector during one query.
///
/// Not reusable across queries: create a fresh instance per evaluation.
pub struct Resources<'a, D> {
    arena: Arena<D>,
    cache: RefCell<HashMap<SelectorId, NodeSet<'a, D>>>,
    cache_hits: Cell<usize>,
    depth_cutoffs: Cell<usize>,
}

impl<D> Default for Resources<'_, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, D> Resources<'a, D> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            cache: RefCell::new(HashMap::new()),
            cache_hits: Cell::new(0),
            depth_cutoffs: Cell::new(0),
        }
    }

    /// Moves a fabricated value into the arena and returns a reference that
    /// stays valid for the rest of the query.
    pub fn create(&'a self, value: D) -> &'a D {
        self.arena.alloc(value)
    }

    /// Number of values fabricated so far.
    pub fn synthetic_count(&self) -> usize {
        self.arena.len()
    }

    pub fn is_cached(&self, id: SelectorId) -> bool {
        self.cache.borrow().contains_key(&id)
    }

    /// Stores the result of a memoized selector. The first entry for an id wins.
    pub fn add_to_cache(&self, id: SelectorId, nodes: &NodeSet<'a, D>) {
        self.cache
            .borrow_mut()
            .entry(id)
            .or_insert_with(|| nodes.clone());
    }

    /// Appends the cached result for `id` to `out`. Returns false if nothing
    /// is cached for `id` yet.
    pub fn retrieve_from_cache(&self, id: SelectorId, out: &mut NodeSet<'a, D>) -> bool {
        let cache = self.cache.borrow();
        let Some(cached) = cache.get(&id) else {
            return false;
        };
        out.nodes.extend(cached.nodes.iter().cloned());
        out.kind.merge(cached.kind);
        self.cache_hits.set(self.cache_hits.get() + 1);
        true
    }

    /// Number of times a memoized result was reused.
    pub fn cache_hits(&self) -> usize {
        self.cache_hits.get()
    }

    /// Counts a recursive descent cut short by `max_depth`. Returns true for
    /// the first cut-off of the query only.
    pub(crate) fn record_depth_cutoff(&self) -> bool {
        let seen = self.depth_cutoffs.get();
        self.depth_cutoffs.set(seen + 1);
        seen == 0
    }

    /// Number of non-empty nodes whose children were skipped by `max_depth`.
    pub fn depth_cutoffs(&self) -> usize {
        self.depth_cutoffs.get()
    }
}
