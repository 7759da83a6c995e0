//! Top-level query entry point and result shaping.

use std::fmt;

use log::debug;

use crate::config::{Options, ResultShape};
use crate::document::Document;

use super::ast::{PathExpression, Selector, SelectorKind};
use super::path::{NormalizedPath, PathNode};
use super::resources::{NodeSet, Resources};

/// A compiled path expression, ready to be evaluated against any number of
/// documents.
pub struct JsonPath<D: Document> {
    expression: PathExpression<D>,
}

impl<D: Document> JsonPath<D> {
    /// Wraps the head of a selector chain, normally a root selector.
    pub fn new(head: Selector<D>) -> Self {
        Self {
            expression: PathExpression::new(head),
        }
    }

    pub fn expression(&self) -> &PathExpression<D> {
        &self.expression
    }

    /// Evaluates against `root`, borrowing every match.
    ///
    /// `resources` must be fresh for each call; the returned nodes reference
    /// both the document and the values fabricated in `resources`.
    pub fn evaluate<'a>(
        &self,
        resources: &'a Resources<'a, D>,
        root: &'a D,
        options: &Options,
    ) -> NodeSet<'a, D> {
        debug!("Evaluating {}", self.expression);
        let head = self.expression.head();
        let nodes = match (head.kind(), head.tail()) {
            // The head root runs once per query; its result is never cached.
            (SelectorKind::Root(_), Some(tail)) => {
                let mut nodes = NodeSet::new();
                tail.select(resources, &PathNode::root(), root, root, &mut nodes, options);
                nodes
            }
            (SelectorKind::Root(_), None) => {
                let mut nodes = NodeSet::new();
                nodes.push(PathNode::root(), root);
                nodes
            }
            _ => self.expression.evaluate(resources, root, root, options),
        };
        debug!(
            "{} matched {} node(s) ({:?}, {} cache hit(s))",
            self.expression,
            nodes.len(),
            nodes.kind,
            resources.cache_hits()
        );
        nodes
    }

    /// Evaluates against `root` and copies the matches out in the shape
    /// requested by `options.result`.
    pub fn query(&self, root: &D, options: &Options) -> QueryOutput<D>
    where
        D: Clone,
    {
        let resources = Resources::new();
        let nodes = self.evaluate(&resources, root, options);
        QueryOutput::from_nodes(&nodes, options.result)
    }
}

impl<D: Document> fmt::Display for JsonPath<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.expression, f)
    }
}

impl<D: Document> fmt::Debug for JsonPath<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsonPath({})", self.expression)
    }
}

/// A match with its location, owned.
#[derive(Debug, Clone, PartialEq)]
pub struct Located<D> {
    pub path: NormalizedPath,
    pub value: D,
}

/// Owned query results.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput<D> {
    Values(Vec<D>),
    Paths(Vec<NormalizedPath>),
    Both(Vec<Located<D>>),
}

impl<D: Clone> QueryOutput<D> {
    fn from_nodes(nodes: &NodeSet<'_, D>, shape: ResultShape) -> Self {
        match shape {
            ResultShape::Values => QueryOutput::Values(nodes.values().cloned().collect()),
            ResultShape::Paths => QueryOutput::Paths(
                nodes
                    .nodes
                    .iter()
                    .map(|node| node.normalized_path())
                    .collect(),
            ),
            ResultShape::Both => QueryOutput::Both(
                nodes
                    .nodes
                    .iter()
                    .map(|node| Located {
                        path: node.normalized_path(),
                        value: node.value.clone(),
                    })
                    .collect(),
            ),
        }
    }
}

impl<D> QueryOutput<D> {
    pub fn len(&self) -> usize {
        match self {
            QueryOutput::Values(values) => values.len(),
            QueryOutput::Paths(paths) => paths.len(),
            QueryOutput::Both(located) => located.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The matched values. Empty when only paths were requested.
    pub fn into_values(self) -> Vec<D> {
        match self {
            QueryOutput::Values(values) => values,
            QueryOutput::Paths(_) => Vec::new(),
            QueryOutput::Both(located) => located.into_iter().map(|l| l.value).collect(),
        }
    }

    /// The normalized paths. Empty when only values were requested.
    pub fn into_paths(self) -> Vec<NormalizedPath> {
        match self {
            QueryOutput::Values(_) => Vec::new(),
            QueryOutput::Paths(paths) => paths,
            QueryOutput::Both(located) => located.into_iter().map(|l| l.path).collect(),
        }
    }
}
