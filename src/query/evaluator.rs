//! Selector chain evaluation.
//!
//! Every selector picks its own children from the current node and hands each
//! of them to its tail; the last selector in a chain records the match. All
//! matches of one query land in a single [`NodeSet`].

use std::rc::Rc;

use log::{debug, trace, warn};

use crate::config::Options;
use crate::document::{Document, DocumentKind};

use super::ast::{PathExpression, Selector, SelectorKind};
use super::expression::Expression;
use super::path::PathNode;
use super::resources::{NodeSet, Resources, SelectorId};
use super::slice::Slice;

impl<D: Document> Selector<D> {
    /// Applies this chain to `current`, appending every match to `out`.
    ///
    /// `path` is the location of `current`. Type mismatches, missing keys and
    /// out-of-range indices select nothing.
    pub fn select<'a>(
        &self,
        resources: &'a Resources<'a, D>,
        path: &Rc<PathNode>,
        root: &'a D,
        current: &'a D,
        out: &mut NodeSet<'a, D>,
        options: &Options,
    ) {
        let walk = Walk {
            resources,
            root,
            options,
        };
        walk.select(self, path, current, out);
    }
}

impl<D: Document> PathExpression<D> {
    /// See [`Selector::select`].
    pub fn select<'a>(
        &self,
        resources: &'a Resources<'a, D>,
        path: &Rc<PathNode>,
        root: &'a D,
        current: &'a D,
        out: &mut NodeSet<'a, D>,
        options: &Options,
    ) {
        self.head.select(resources, path, root, current, out, options);
    }

    /// Evaluates this expression against `current` with paths rooted at `$`.
    ///
    /// This is the entry point for sub-expressions that embed a path such as
    /// `$.threshold` or `@.price`.
    pub fn evaluate<'a>(
        &self,
        resources: &'a Resources<'a, D>,
        root: &'a D,
        current: &'a D,
        options: &Options,
    ) -> NodeSet<'a, D> {
        let mut out = NodeSet::new();
        self.select(resources, &PathNode::root(), root, current, &mut out, options);
        out
    }
}

/// The state that stays fixed while one chain is applied.
struct Walk<'o, 'a, D> {
    resources: &'a Resources<'a, D>,
    root: &'a D,
    options: &'o Options,
}

impl<'a, D: Document> Walk<'_, 'a, D> {
    fn select(
        &self,
        selector: &Selector<D>,
        path: &Rc<PathNode>,
        current: &'a D,
        out: &mut NodeSet<'a, D>,
    ) {
        match selector.kind() {
            SelectorKind::Identifier(name) => self.identifier(selector, name, path, current, out),
            SelectorKind::Root(id) => self.root(selector, *id, out),
            SelectorKind::Current => self.tail(selector, path, current, out),
            SelectorKind::Parent(levels) => self.parent(selector, *levels, path, out),
            SelectorKind::Index(index) => {
                if let Some((i, item)) = current.as_array().and_then(|items| element(items, *index)) {
                    self.tail(selector, &PathNode::index(path, i), item.content(), out);
                }
            }
            SelectorKind::Wildcard => self.wildcard(selector, path, current, out),
            SelectorKind::Recursive => self.recursive(selector, path, current, out, 0),
            SelectorKind::Slice(slice) => self.slice(selector, slice, path, current, out),
            SelectorKind::Union(branches) => self.union(selector, branches, path, current, out),
            SelectorKind::Filter(expr) => self.filter(selector, &**expr, path, current, out),
            SelectorKind::IndexExpression(expr) => {
                self.index_expression(selector, &**expr, path, current, out)
            }
            SelectorKind::Function(expr) => self.function(selector, &**expr, path, current, out),
        }
    }

    /// Continues with the tail of `selector`, or records the match.
    fn tail(
        &self,
        selector: &Selector<D>,
        path: &Rc<PathNode>,
        value: &'a D,
        out: &mut NodeSet<'a, D>,
    ) {
        match selector.tail() {
            Some(tail) => self.select(tail, path, value, out),
            None => out.push(Rc::clone(path), value),
        }
    }

    fn identifier(
        &self,
        selector: &Selector<D>,
        name: &str,
        path: &Rc<PathNode>,
        current: &'a D,
        out: &mut NodeSet<'a, D>,
    ) {
        match current.kind() {
            DocumentKind::Object => {
                if let Some(value) = current.find(name) {
                    self.tail(selector, &PathNode::key(path, name), value, out);
                }
            }
            DocumentKind::Array => {
                let Some(items) = current.as_array() else {
                    return;
                };
                if items.is_empty() {
                    return;
                }
                if let Some(index) = parse_index(name) {
                    if let Some((i, item)) = element(items, index) {
                        self.tail(selector, &PathNode::index(path, i), item.content(), out);
                    }
                } else if name == "length" {
                    let length = self.resources.create(D::from_size(items.len()));
                    self.tail(selector, &PathNode::key(path, name), length, out);
                }
            }
            DocumentKind::String => {
                if name != "length" {
                    return;
                }
                if let Some(text) = current.as_str() {
                    let length = self.resources.create(D::from_size(text.chars().count()));
                    self.tail(selector, &PathNode::key(path, name), length, out);
                }
            }
            DocumentKind::Scalar => {}
        }
    }

    fn root(&self, selector: &Selector<D>, id: SelectorId, out: &mut NodeSet<'a, D>) {
        let path = PathNode::root();
        if !self.options.memoize {
            self.tail(selector, &path, self.root, out);
            return;
        }

        if self.resources.retrieve_from_cache(id, out) {
            debug!("Root selector {} served from cache", id);
            return;
        }

        let mut nodes = NodeSet::new();
        self.tail(selector, &path, self.root, &mut nodes);
        debug!("Root selector {} evaluated: {} node(s)", id, nodes.len());
        self.resources.add_to_cache(id, &nodes);
        out.append(nodes);
    }

    fn parent(
        &self,
        selector: &Selector<D>,
        levels: usize,
        path: &Rc<PathNode>,
        out: &mut NodeSet<'a, D>,
    ) {
        let Some(ancestor) = path.ancestor(levels) else {
            return;
        };
        if let Some(value) = ancestor.to_normalized().resolve(self.root) {
            self.tail(selector, &ancestor, value, out);
        }
    }

    fn wildcard(
        &self,
        selector: &Selector<D>,
        path: &Rc<PathNode>,
        current: &'a D,
        out: &mut NodeSet<'a, D>,
    ) {
        if let Some(items) = current.as_array() {
            for (i, item) in items.iter().enumerate() {
                self.tail(selector, &PathNode::index(path, i), item.content(), out);
            }
        } else if let Some(members) = current.members() {
            for (key, value) in members {
                self.tail(selector, &PathNode::key(path, key), value, out);
            }
        }
        out.mark_multi();
    }

    /// Pre-order descent: the tail is tried on `current` before its children.
    fn recursive(
        &self,
        selector: &Selector<D>,
        path: &Rc<PathNode>,
        current: &'a D,
        out: &mut NodeSet<'a, D>,
        depth: usize,
    ) {
        out.mark_multi();
        if !current.is_array() && !current.is_object() {
            return;
        }

        self.tail(selector, path, current, out);

        if depth >= self.options.max_depth {
            if current.size() > 0 && self.resources.record_depth_cutoff() {
                warn!(
                    "Recursive descent stopped at {} (max_depth {})",
                    path, self.options.max_depth
                );
            }
            return;
        }

        if let Some(items) = current.as_array() {
            for (i, item) in items.iter().enumerate() {
                let item = item.content();
                self.recursive(selector, &PathNode::index(path, i), item, out, depth + 1);
            }
        } else if let Some(members) = current.members() {
            for (key, value) in members {
                self.recursive(selector, &PathNode::key(path, key), value, out, depth + 1);
            }
        }
    }

    fn slice(
        &self,
        selector: &Selector<D>,
        slice: &Slice,
        path: &Rc<PathNode>,
        current: &'a D,
        out: &mut NodeSet<'a, D>,
    ) {
        if let Some(items) = current.as_array() {
            for i in slice.indices(items.len()) {
                if let Some(item) = items.get(i) {
                    self.tail(selector, &PathNode::index(path, i), item.content(), out);
                }
            }
        }
        out.mark_multi();
    }

    fn union(
        &self,
        selector: &Selector<D>,
        branches: &[PathExpression<D>],
        path: &Rc<PathNode>,
        current: &'a D,
        out: &mut NodeSet<'a, D>,
    ) {
        for branch in branches {
            let mut found = NodeSet::new();
            self.select(&branch.head, path, current, &mut found);
            for node in found.nodes {
                self.tail(selector, &node.path, node.value, out);
            }
        }
        out.mark_multi();
    }

    fn filter(
        &self,
        selector: &Selector<D>,
        expr: &dyn Expression<D>,
        path: &Rc<PathNode>,
        current: &'a D,
        out: &mut NodeSet<'a, D>,
    ) {
        if let Some(items) = current.as_array() {
            for (i, item) in items.iter().enumerate() {
                let item = item.content();
                if self.admits(expr, item) {
                    self.tail(selector, &PathNode::index(path, i), item, out);
                }
            }
        } else if let Some(members) = current.members() {
            for (key, value) in members {
                if self.admits(expr, value) {
                    self.tail(selector, &PathNode::key(path, key), value, out);
                }
            }
        }
        out.mark_multi();
    }

    /// A candidate passes when the predicate evaluates without error to a
    /// truthy value.
    fn admits(&self, expr: &dyn Expression<D>, candidate: &'a D) -> bool {
        match expr.evaluate_single(self.resources, self.root, candidate, self.options) {
            Ok(value) => value.is_truthy(),
            Err(err) => {
                trace!("Filter ?({}) rejected a candidate: {}", expr.describe(), err);
                false
            }
        }
    }

    fn index_expression(
        &self,
        selector: &Selector<D>,
        expr: &dyn Expression<D>,
        path: &Rc<PathNode>,
        current: &'a D,
        out: &mut NodeSet<'a, D>,
    ) {
        let value = match expr.evaluate_single(self.resources, self.root, current, self.options) {
            Ok(value) => value,
            Err(err) => {
                trace!("Index expression ({}) selected nothing: {}", expr.describe(), err);
                return;
            }
        };

        if let Some(items) = current.as_array() {
            let Some(index) = value.as_index() else {
                return;
            };
            if let Some(item) = items.get(index) {
                self.tail(selector, &PathNode::index(path, index), item.content(), out);
            }
        } else if current.is_object() {
            let Some(key) = value.as_str() else {
                return;
            };
            if let Some(member) = current.find(key) {
                self.tail(selector, &PathNode::key(path, key), member, out);
            }
        }
    }

    fn function(
        &self,
        selector: &Selector<D>,
        expr: &dyn Expression<D>,
        path: &Rc<PathNode>,
        current: &'a D,
        out: &mut NodeSet<'a, D>,
    ) {
        match expr.evaluate_single(self.resources, self.root, current, self.options) {
            Ok(value) => {
                let value = self.resources.create(value);
                self.tail(selector, path, value, out);
            }
            Err(err) => trace!("Function {} selected nothing: {}", expr.describe(), err),
        }
    }
}

/// Resolves a possibly negative index against `items`.
fn element<D>(items: &[D], index: i64) -> Option<(usize, &D)> {
    let index = if index >= 0 {
        index
    } else {
        (items.len() as i64).checked_add(index)?
    };
    let index = usize::try_from(index).ok()?;
    items.get(index).map(|item| (index, item))
}

/// Parses an identifier made of an optional `-` and decimal digits only.
fn parse_index(name: &str) -> Option<i64> {
    let digits = name.strip_prefix('-').unwrap_or(name);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ast::ChainBuilder;
    use crate::query::error::ExpressionError;
    use crate::query::resources::NodeKind;
    use serde_json::{json, Value};

    /// Wraps a plain function as a sub-expression.
    struct Func(fn(&Value) -> Result<Value, ExpressionError>);

    impl Expression<Value> for Func {
        fn evaluate_single<'a>(
            &self,
            _resources: &'a Resources<'a, Value>,
            _root: &'a Value,
            current: &'a Value,
            _options: &Options,
        ) -> Result<Value, ExpressionError> {
            (self.0)(current)
        }
    }

    fn run(chain: &Selector<Value>, doc: &Value) -> (Vec<Value>, Vec<String>, NodeKind) {
        let resources = Resources::new();
        let mut out = NodeSet::new();
        chain.select(
            &resources,
            &PathNode::root(),
            doc,
            doc,
            &mut out,
            &Options::default(),
        );
        let values = out.values().cloned().collect();
        let paths = out.nodes.iter().map(|n| n.path.to_string()).collect();
        (values, paths, out.kind)
    }

    fn rooted(next: Selector<Value>) -> Selector<Value> {
        ChainBuilder::new().root().then(next)
    }

    #[test]
    fn test_identifier_on_object() {
        let doc = json!({"a": {"b": 1}});
        let chain = rooted(Selector::identifier("a")).then(Selector::identifier("b"));
        let (values, paths, kind) = run(&chain, &doc);
        assert_eq!(values, vec![json!(1)]);
        assert_eq!(paths, vec!["$['a']['b']"]);
        assert_eq!(kind, NodeKind::Single);

        let missing = rooted(Selector::identifier("zzz"));
        assert!(run(&missing, &doc).0.is_empty());
    }

    #[test]
    fn test_identifier_numeric_on_array() {
        let doc = json!(["x", "y", "z"]);
        assert_eq!(run(&rooted(Selector::identifier("1")), &doc).0, vec![json!("y")]);
        assert_eq!(run(&rooted(Selector::identifier("-1")), &doc).0, vec![json!("z")]);
        assert!(run(&rooted(Selector::identifier("3")), &doc).0.is_empty());
        assert!(run(&rooted(Selector::identifier("+1")), &doc).0.is_empty());
    }

    #[test]
    fn test_length_pseudo_property() {
        let doc = json!({"list": [1, 2, 3], "empty": [], "name": "héllo"});
        let (values, paths, _) = run(
            &rooted(Selector::identifier("list")).then(Selector::identifier("length")),
            &doc,
        );
        assert_eq!(values, vec![json!(3)]);
        assert_eq!(paths, vec!["$['list']['length']"]);

        let empty = rooted(Selector::identifier("empty")).then(Selector::identifier("length"));
        assert!(run(&empty, &doc).0.is_empty());

        let name = rooted(Selector::identifier("name")).then(Selector::identifier("length"));
        assert_eq!(run(&name, &doc).0, vec![json!(5)]);
    }

    #[test]
    fn test_index_on_non_array_selects_nothing() {
        let doc = json!({"0": "zero"});
        assert!(run(&rooted(Selector::index(0)), &doc).0.is_empty());
    }

    #[test]
    fn test_wildcard_object_order() {
        let doc = json!({"b": 1, "a": 2, "c": 3});
        let (values, paths, kind) = run(&rooted(Selector::wildcard()), &doc);
        assert_eq!(values, vec![json!(1), json!(2), json!(3)]);
        assert_eq!(paths, vec!["$['b']", "$['a']", "$['c']"]);
        assert_eq!(kind, NodeKind::Multi);
    }

    #[test]
    fn test_wildcard_on_scalar_is_multi() {
        let (values, _, kind) = run(&rooted(Selector::wildcard()), &json!(7));
        assert!(values.is_empty());
        assert_eq!(kind, NodeKind::Multi);
    }

    #[test]
    fn test_current_passes_through() {
        let doc = json!({"a": 1});
        let chain = rooted(Selector::current()).then(Selector::identifier("a"));
        assert_eq!(run(&chain, &doc).0, vec![json!(1)]);
    }

    #[test]
    fn test_parent_selector() {
        let doc = json!({"a": {"b": {"c": 1}}});
        let chain = rooted(Selector::identifier("a"))
            .then(Selector::identifier("b"))
            .then(Selector::identifier("c"))
            .then(Selector::parent(2));
        let (values, paths, _) = run(&chain, &doc);
        assert_eq!(values, vec![json!({"b": {"c": 1}})]);
        assert_eq!(paths, vec!["$['a']"]);

        let past_root = rooted(Selector::identifier("a")).then(Selector::parent(2));
        assert!(run(&past_root, &doc).0.is_empty());
    }

    #[test]
    fn test_filter_on_object_members() {
        let doc = json!({"x": 1, "y": 0, "z": 5});
        let chain = rooted(Selector::filter(Func(|v| Ok(json!(v.as_i64() > Some(0))))));
        let (values, paths, kind) = run(&chain, &doc);
        assert_eq!(values, vec![json!(1), json!(5)]);
        assert_eq!(paths, vec!["$['x']", "$['z']"]);
        assert_eq!(kind, NodeKind::Multi);
    }

    #[test]
    fn test_filter_uses_truthiness() {
        let doc = json!([0, 1, "", "s", [], [1], null, true]);
        let chain = rooted(Selector::filter(Func(|v| Ok(v.clone()))));
        assert_eq!(
            run(&chain, &doc).0,
            vec![json!(1), json!("s"), json!([1]), json!(true)]
        );
    }

    #[test]
    fn test_index_expression() {
        let doc = json!({"list": ["a", "b", "c"], "obj": {"k": 1}});
        let last = rooted(Selector::identifier("list"))
            .then(Selector::index_expression(Func(|v| Ok(json!(v.size() - 1)))));
        let (values, paths, _) = run(&last, &doc);
        assert_eq!(values, vec![json!("c")]);
        assert_eq!(paths, vec!["$['list'][2]"]);

        let key = rooted(Selector::identifier("obj"))
            .then(Selector::index_expression(Func(|_| Ok(json!("k")))));
        assert_eq!(run(&key, &doc).0, vec![json!(1)]);

        let mismatch = rooted(Selector::identifier("obj"))
            .then(Selector::index_expression(Func(|_| Ok(json!(0)))));
        assert!(run(&mismatch, &doc).0.is_empty());

        let out_of_range = rooted(Selector::identifier("list"))
            .then(Selector::index_expression(Func(|_| Ok(json!(9)))));
        assert!(run(&out_of_range, &doc).0.is_empty());

        let failing = rooted(Selector::identifier("list")).then(Selector::index_expression(
            Func(|_| Err(ExpressionError::Evaluation("boom".to_string()))),
        ));
        assert!(run(&failing, &doc).0.is_empty());
    }

    #[test]
    fn test_function_result_continues_chain() {
        let doc = json!({"a": [1, 2, 3]});
        let chain = rooted(Selector::identifier("a"))
            .then(Selector::function(Func(|v| {
                Ok(json!({"sum": v.as_array().map_or(0, |a| a.len())}))
            })))
            .then(Selector::identifier("sum"));
        let (values, paths, kind) = run(&chain, &doc);
        assert_eq!(values, vec![json!(3)]);
        assert_eq!(paths, vec!["$['a']['sum']"]);
        assert_eq!(kind, NodeKind::Single);

        let failing = rooted(Selector::function(Func(|_| {
            Err(ExpressionError::UnknownFunction("nope".to_string()))
        })));
        assert!(run(&failing, &doc).0.is_empty());
    }

    #[test]
    fn test_fabricated_values_live_in_arena() {
        let doc = json!([[1], [1, 2]]);
        let chain = rooted(Selector::wildcard()).then(Selector::identifier("length"));
        let resources = Resources::new();
        let mut out = NodeSet::new();
        chain.select(
            &resources,
            &PathNode::root(),
            &doc,
            &doc,
            &mut out,
            &Options::default(),
        );
        assert_eq!(out.values().cloned().collect::<Vec<_>>(), vec![json!(1), json!(2)]);
        assert_eq!(resources.synthetic_count(), 2);
    }

    #[test]
    fn test_depth_limit_stops_descent() {
        let doc = json!({"a": {"a": {"a": 3}, "v": 2}, "v": 1});
        let chain = rooted(Selector::recursive()).then(Selector::identifier("v"));
        let resources = Resources::new();
        let mut out = NodeSet::new();
        let options = Options {
            max_depth: 1,
            ..Options::default()
        };
        chain.select(&resources, &PathNode::root(), &doc, &doc, &mut out, &options);
        assert_eq!(out.values().cloned().collect::<Vec<_>>(), vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_depth_cutoffs_counted_per_node() {
        let doc = json!({"a": {"x": 1}, "b": {"y": 2}, "c": {"z": 3}, "d": []});
        let chain = rooted(Selector::recursive()).then(Selector::wildcard());
        let resources = Resources::new();
        let mut out = NodeSet::new();
        let options = Options {
            max_depth: 1,
            ..Options::default()
        };
        chain.select(&resources, &PathNode::root(), &doc, &doc, &mut out, &options);
        // The empty array has nothing to skip.
        assert_eq!(resources.depth_cutoffs(), 3);
        assert_eq!(out.len(), 4 + 3);
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("12"), Some(12));
        assert_eq!(parse_index("-3"), Some(-3));
        assert_eq!(parse_index("-"), None);
        assert_eq!(parse_index("1a"), None);
        assert_eq!(parse_index(""), None);
    }

    #[test]
    fn test_element() {
        let items = [10, 20, 30];
        assert_eq!(element(&items, -1), Some((2, &30)));
        assert_eq!(element(&items, 3), None);
        assert_eq!(element(&items, -4), None);
        assert_eq!(element(&items, i64::MIN), None);
    }
}
