//! Path breadcrumbs and normalized paths.
//!
//! Every selected value carries a [`PathNode`]: the last step taken to reach it
//! plus a shared pointer to its parent's node. The chain is only materialized
//! into a [`NormalizedPath`] when a caller asks for it.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::document::Document;

/// One step from a parent to a child.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// The document root (`$`)
    Root,
    /// An array element
    Index(usize),
    /// An object member (or a pseudo-property such as `length`)
    Key(String),
}

impl PathStep {
    fn rank(&self) -> u8 {
        match self {
            PathStep::Root => 0,
            PathStep::Index(_) => 1,
            PathStep::Key(_) => 2,
        }
    }
}

impl PartialOrd for PathStep {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PathStep {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (PathStep::Index(a), PathStep::Index(b)) => a.cmp(b),
            (PathStep::Key(a), PathStep::Key(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// An immutable link in a path chain.
#[derive(Debug)]
pub struct PathNode {
    parent: Option<Rc<PathNode>>,
    step: PathStep,
}

impl PathNode {
    /// Creates the root node `$`.
    pub fn root() -> Rc<PathNode> {
        Rc::new(PathNode {
            parent: None,
            step: PathStep::Root,
        })
    }

    /// Extends `parent` by an array index.
    pub fn index(parent: &Rc<PathNode>, index: usize) -> Rc<PathNode> {
        Rc::new(PathNode {
            parent: Some(Rc::clone(parent)),
            step: PathStep::Index(index),
        })
    }

    /// Extends `parent` by an object key.
    pub fn key(parent: &Rc<PathNode>, key: &str) -> Rc<PathNode> {
        Rc::new(PathNode {
            parent: Some(Rc::clone(parent)),
            step: PathStep::Key(key.to_string()),
        })
    }

    pub fn parent(&self) -> Option<&Rc<PathNode>> {
        self.parent.as_ref()
    }

    pub fn step(&self) -> &PathStep {
        &self.step
    }

    /// Number of steps below the root.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut node = self;
        while let Some(parent) = &node.parent {
            depth += 1;
            node = parent;
        }
        depth
    }

    /// Walks up `levels` ancestors. `None` when that would pass the root.
    pub fn ancestor(self: &Rc<Self>, levels: usize) -> Option<Rc<PathNode>> {
        let mut node = Rc::clone(self);
        for _ in 0..levels {
            node = Rc::clone(node.parent.as_ref()?);
        }
        Some(node)
    }

    /// Materializes the chain root-first.
    pub fn to_normalized(&self) -> NormalizedPath {
        let mut steps = Vec::with_capacity(self.depth() + 1);
        let mut node = Some(self);
        while let Some(current) = node {
            steps.push(current.step.clone());
            node = current.parent.as_deref();
        }
        steps.reverse();
        NormalizedPath { steps }
    }
}

impl fmt::Display for PathNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_normalized(), f)
    }
}

/// A fully materialized path, root first.
///
/// Renders as `$['store']['book'][0]`. Keys are single-quoted with embedded
/// quotes escaped as `\'`.
#[derive(Debug, Clone)]
pub struct NormalizedPath {
    steps: Vec<PathStep>,
}

impl NormalizedPath {
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Resolves this path against `root`, returning the addressed value if it
    /// exists in the document.
    ///
    /// Pseudo-properties such as a fabricated `length` do not resolve.
    pub fn resolve<'a, D: Document>(&self, root: &'a D) -> Option<&'a D> {
        let mut current = root;
        for step in &self.steps {
            current = match step {
                PathStep::Root => root,
                PathStep::Index(index) => current.at(*index)?,
                PathStep::Key(key) => current.find(key)?,
            };
        }
        Some(current)
    }
}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            match step {
                PathStep::Root => write!(f, "$")?,
                PathStep::Index(index) => write!(f, "[{}]", index)?,
                PathStep::Key(key) => {
                    write!(f, "['")?;
                    for c in key.chars() {
                        if c == '\'' {
                            write!(f, "\\'")?;
                        } else {
                            write!(f, "{}", c)?;
                        }
                    }
                    write!(f, "']")?;
                }
            }
        }
        Ok(())
    }
}

impl PartialEq for NormalizedPath {
    fn eq(&self, other: &Self) -> bool {
        self.steps == other.steps
    }
}

impl Eq for NormalizedPath {}

impl Hash for NormalizedPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.steps.hash(state);
    }
}

impl PartialOrd for NormalizedPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NormalizedPath {
    /// Step by step, then shorter paths first.
    fn cmp(&self, other: &Self) -> Ordering {
        self.steps.cmp(&other.steps)
    }
}
