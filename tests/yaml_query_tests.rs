//! Integration tests for querying YAML documents.

use pathquill::config::{Options, ResultShape};
use pathquill::query::{ChainBuilder, JsonPath, PathExpression, QueryOutput, Selector, Slice};
use serde_yaml::Value;

const INVENTORY: &str = r#"
name: inventory
servers:
  - name: alpha
    port: 8080
    tags: [web, edge]
  - name: beta
    port: 9090
    tags: []
  - name: gamma
    port: 7070
    tags: !labels [db]
"#;

fn parse(src: &str) -> Value {
    serde_yaml::from_str(src).expect("Failed to parse YAML")
}

fn render(value: &Value) -> String {
    match (value.as_str(), value.as_u64()) {
        (Some(s), _) => s.to_string(),
        (None, Some(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Test wildcard then member access over a sequence of mappings.
#[test]
fn test_server_names() {
    let doc = parse(INVENTORY);
    let mut builder = ChainBuilder::new();
    let path = JsonPath::new(
        builder
            .root()
            .then(Selector::identifier("servers"))
            .then(Selector::wildcard())
            .then(Selector::identifier("name")),
    );
    let values = path.query(&doc, &Options::default()).into_values();
    let names: Vec<String> = values.iter().map(render).collect();
    assert_eq!(names, vec!["alpha", "beta", "gamma"]);
}

/// Test recursive descent over YAML, reporting paths.
#[test]
fn test_all_ports_paths() {
    let doc = parse(INVENTORY);
    let mut builder = ChainBuilder::new();
    let path = JsonPath::new(
        builder
            .root()
            .then(Selector::recursive())
            .then(Selector::identifier("port")),
    );
    let options = Options {
        result: ResultShape::Paths,
        ..Options::default()
    };
    let paths: Vec<String> = path
        .query(&doc, &options)
        .into_paths()
        .iter()
        .map(|p| p.to_string())
        .collect();
    assert_eq!(
        paths,
        vec![
            "$['servers'][0]['port']",
            "$['servers'][1]['port']",
            "$['servers'][2]['port']",
        ]
    );
}

/// Test that tagged sequences behave like plain ones.
#[test]
fn test_tagged_sequence_length() {
    let doc = parse(INVENTORY);
    let mut builder = ChainBuilder::new();
    let path = JsonPath::new(
        builder
            .root()
            .then(Selector::identifier("servers"))
            .then(Selector::wildcard())
            .then(Selector::identifier("tags"))
            .then(Selector::identifier("length")),
    );
    let values = path.query(&doc, &Options::default()).into_values();
    // The empty sequence has no `length`.
    assert_eq!(values, vec![Value::from(2u64), Value::from(1u64)]);
}

/// Test a reversed slice combined with a union, returning both shapes.
#[test]
fn test_slice_and_union_both() {
    let doc = parse(INVENTORY);
    let mut builder = ChainBuilder::new();
    let path = JsonPath::new(
        builder
            .root()
            .then(Selector::identifier("servers"))
            .then(Selector::slice(Slice::new(None, None, -2).expect("non-zero step")))
            .then(Selector::union(vec![
                PathExpression::new(Selector::identifier("name")),
                PathExpression::new(Selector::identifier("port")),
            ])),
    );
    let options = Options {
        result: ResultShape::Both,
        ..Options::default()
    };
    let QueryOutput::Both(located) = path.query(&doc, &options) else {
        panic!("expected path/value pairs");
    };
    let rendered: Vec<String> = located
        .iter()
        .map(|l| format!("{} = {}", l.path, render(&l.value)))
        .collect();
    assert_eq!(
        rendered,
        vec![
            "$['servers'][2]['name'] = gamma",
            "$['servers'][2]['port'] = 7070",
            "$['servers'][0]['name'] = alpha",
            "$['servers'][0]['port'] = 8080",
        ]
    );
}

/// Test that tagged sequence elements come back like tagged mapping members.
#[test]
fn test_tagged_elements_match_tagged_members() {
    let doc = parse("arr: [!t {a: 1}]\nobj: {k: !t {a: 1}}\n");
    let mut builder = ChainBuilder::new();
    let element = JsonPath::new(
        builder
            .root()
            .then(Selector::identifier("arr"))
            .then(Selector::index(0)),
    );
    let member = JsonPath::new(
        builder
            .root()
            .then(Selector::identifier("obj"))
            .then(Selector::identifier("k")),
    );
    let element = element.query(&doc, &Options::default()).into_values();
    let member = member.query(&doc, &Options::default()).into_values();
    assert_eq!(element.len(), 1);
    assert_eq!(element, member);
    assert!(element[0].is_mapping());

    // Every array route looks through the tag.
    let routes = [
        Selector::wildcard(),
        Selector::slice(Slice::default()),
        Selector::identifier("0"),
    ];
    for route in routes {
        let label = format!("{}", route);
        let path = JsonPath::new(
            builder
                .root()
                .then(Selector::identifier("arr"))
                .then(route)
                .then(Selector::identifier("a")),
        );
        let values = path.query(&doc, &Options::default()).into_values();
        assert_eq!(values, vec![Value::from(1u64)], "route {}", label);
    }
}
