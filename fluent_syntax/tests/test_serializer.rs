use fluent_syntax::{
    ast::*,
    parser::{parse, FluentParser},
    serializer::{serialize, serialize_expression, FluentSerializer},
};

const CANONICAL: &str = include_str!("canonical.ftl");
const JUNK: &str = include_str!("junk.ftl");

fn pretty(source: &str) -> String {
    serialize(&parse(source))
}

#[test]
fn test_canonical_round_trip() {
    assert_eq!(pretty(CANONICAL), CANONICAL);
}

#[test]
fn test_reparse_is_equal() {
    let source = "foo =   Foo  \n\n\n-t =\n  { $x ->\n *[a] A\n [b]   B\n}\n    .attr = { 1 }\n";
    let resource = parse(source);
    let reparsed = parse(&serialize(&resource));
    assert!(resource.equals_ignoring_spans(&reparsed));
    assert!(!resource.equals(&reparsed, &[]));
}

#[test]
fn test_simple_messages() {
    assert_eq!(pretty("foo = Foo\n"), "foo = Foo\n");
    assert_eq!(pretty("foo =   Foo   \n"), "foo = Foo\n");
    assert_eq!(pretty("-term = Term\n"), "-term = Term\n");
    assert_eq!(pretty("foo =\n    .attr = Attr\n"), "foo =\n    .attr = Attr\n");
}

#[test]
fn test_multiline_text_starts_on_new_line() {
    assert_eq!(pretty("foo = a\n    b\n"), "foo =\n    a\n    b\n");
}

#[test]
fn test_select_expression() {
    let source = "foo = { $n ->\n    [one] One\n   *[other] Other\n}\n";
    let expected = "foo =\n    { $n ->\n        [one] One\n       *[other] Other\n    }\n";
    assert_eq!(pretty(source), expected);
}

#[test]
fn test_nested_placeable() {
    assert_eq!(pretty("foo = {{ $bar }}\n"), "foo = {{ $bar }}\n");
}

#[test]
fn test_comments() {
    assert_eq!(pretty("# Comment\nfoo = Foo\n"), "# Comment\nfoo = Foo\n");
    assert_eq!(
        pretty("foo = Foo\n\n# Standalone\n\nbar = Bar\n"),
        "foo = Foo\n\n# Standalone\n\nbar = Bar\n"
    );
    assert_eq!(pretty("## Group\n##\n## Lines\n"), "## Group\n##\n## Lines\n\n");
}

#[test]
fn test_junk_is_optional() {
    let resource = parse("foo = Foo\nbroken\nbar = Bar\n");
    assert_eq!(serialize(&resource), "foo = Foo\nbar = Bar\n");
    assert_eq!(
        FluentSerializer::with_junk().serialize(&resource),
        "foo = Foo\nbroken\nbar = Bar\n"
    );
}

#[test]
fn test_serialize_expression() {
    let resource = FluentParser::without_spans()
        .parse("foo = { FUN(1, \"a\", key: -2.50) }\nbar = { -t(case: \"gen\") }\n");
    let expressions: Vec<String> = resource
        .body
        .iter()
        .map(|entry| match entry {
            Entry::Message(Message {
                value: Some(pattern),
                ..
            }) => match &pattern.elements[0] {
                PatternElement::Placeable(placeable) => {
                    serialize_expression(&placeable.expression)
                }
                other => panic!("unexpected element {:?}", other),
            },
            other => panic!("unexpected entry {:?}", other),
        })
        .collect();
    assert_eq!(
        expressions,
        vec!["FUN(1, \"a\", key: -2.50)", "-t(case: \"gen\")"]
    );
}
