use fluent_syntax::{
    ast::*,
    parser::{parse, FluentParser},
};

const CANONICAL: &str = include_str!("canonical.ftl");
const JUNK: &str = include_str!("junk.ftl");

fn text(value: &str) -> PatternElement {
    PatternElement::TextElement(TextElement {
        value: value.to_string(),
        span: None,
    })
}

fn message<'a>(resource: &'a Resource, id: &str) -> &'a Message {
    resource
        .body
        .iter()
        .find_map(|entry| match entry {
            Entry::Message(m) if m.id.name == id => Some(m),
            _ => None,
        })
        .unwrap_or_else(|| panic!("message {} not found", id))
}

fn single_expression(message: &Message) -> &Expression {
    match &message.value.as_ref().unwrap().elements[..] {
        [PatternElement::Placeable(placeable)] => &placeable.expression,
        other => panic!("expected single placeable, found {:?}", other),
    }
}

fn junk_codes(source: &str) -> Vec<String> {
    parse(source)
        .body
        .iter()
        .filter_map(|entry| match entry {
            Entry::Junk(junk) => Some(junk.annotations[0].code.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_simple_message() {
    let resource = parse("foo = Foo\n");
    assert_eq!(resource.span, Some(Span::new(0, 10)));
    assert_eq!(resource.body.len(), 1);

    let foo = message(&resource, "foo");
    assert_eq!(foo.span, Some(Span::new(0, 9)));
    assert_eq!(foo.id.span, Some(Span::new(0, 3)));
    let value = foo.value.as_ref().unwrap();
    assert_eq!(value.elements.len(), 1);
    match &value.elements[0] {
        PatternElement::TextElement(t) => {
            assert_eq!(t.value, "Foo");
            assert_eq!(t.span, Some(Span::new(6, 9)));
        }
        other => panic!("unexpected element {:?}", other),
    }
}

#[test]
fn test_without_spans() {
    let resource = FluentParser::without_spans().parse("foo = { $bar }\n    .attr = Baz\n");
    assert_eq!(resource.span, None);
    let foo = message(&resource, "foo");
    assert_eq!(foo.span, None);
    assert_eq!(foo.id.span, None);
    assert_eq!(foo.attributes[0].span, None);
    match single_expression(foo) {
        Expression::VariableReference(r) => {
            assert_eq!(r.span, None);
            assert_eq!(r.id.span, None);
        }
        other => panic!("unexpected expression {:?}", other),
    }
}

#[test]
fn test_canonical_fixture_has_no_junk() {
    let resource = parse(CANONICAL);
    for entry in &resource.body {
        assert!(!matches!(entry, Entry::Junk(_)), "junk in fixture: {:?}", entry);
    }
    assert!(matches!(resource.body[0], Entry::ResourceComment(_)));
    assert!(matches!(resource.body[3], Entry::GroupComment(_)));
}

#[test]
fn test_attached_comments() {
    let resource = parse("# Attached\nfoo = Foo\n");
    assert_eq!(resource.body.len(), 1);
    let foo = message(&resource, "foo");
    assert_eq!(foo.comment.as_ref().unwrap().content, "Attached");
    assert_eq!(foo.span.unwrap().start, 0);

    let resource = parse("# Standalone\n\nfoo = Foo\n");
    assert_eq!(resource.body.len(), 2);
    assert!(matches!(resource.body[0], Entry::Comment(_)));
    assert!(message(&resource, "foo").comment.is_none());

    // Group comments never attach.
    let resource = parse("## Group\nfoo = Foo\n");
    assert_eq!(resource.body.len(), 2);
    assert!(matches!(resource.body[0], Entry::GroupComment(_)));

    // Comments stay standalone in front of junk.
    let resource = parse("# Comment\nfoo\n");
    assert_eq!(resource.body.len(), 2);
    assert!(matches!(resource.body[0], Entry::Comment(_)));
    assert!(matches!(resource.body[1], Entry::Junk(_)));
}

#[test]
fn test_multiline_comment() {
    let resource = parse("# line one\n#\n# line three\n\n");
    match &resource.body[..] {
        [Entry::Comment(c)] => assert_eq!(c.content, "line one\n\nline three"),
        other => panic!("unexpected body {:?}", other),
    }
}

#[test]
fn test_junk_recovery() {
    let resource = parse("foo = { \nbar = Bar\n");
    assert_eq!(resource.body.len(), 2);
    match &resource.body[0] {
        Entry::Junk(junk) => {
            assert_eq!(junk.content, "foo = { \n");
            assert_eq!(junk.span, Some(Span::new(0, 9)));
            let annotation = &junk.annotations[0];
            assert_eq!(annotation.code, "E0003");
            assert_eq!(annotation.args, vec!["}".to_string()]);
            assert_eq!(annotation.message, "Expected token: \"}\"");
            assert_eq!(annotation.span, Some(Span::new(9, 9)));
        }
        other => panic!("expected junk, found {:?}", other),
    }
    assert_eq!(message(&resource, "bar").id.name, "bar");
}

#[test]
fn test_junk_fixture() {
    let resource = parse(JUNK);
    let kinds: Vec<&str> = resource
        .body
        .iter()
        .map(|entry| match entry {
            Entry::Message(_) => "message",
            Entry::Term(_) => "term",
            Entry::Comment(_) => "comment",
            Entry::GroupComment(_) => "group",
            Entry::ResourceComment(_) => "resource",
            Entry::Junk(_) => "junk",
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["comment", "junk", "message", "junk", "junk", "message"]
    );

    let codes: Vec<&str> = resource
        .body
        .iter()
        .filter_map(|entry| match entry {
            Entry::Junk(junk) => Some(junk.annotations[0].code.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(codes, vec!["E0010", "E0006", "E0005"]);

    let ok = message(&resource, "ok");
    assert_eq!(ok.attributes[0].id.name, "attr");
}

#[test]
fn test_error_codes() {
    assert_eq!(junk_codes("foo\n"), vec!["E0003"]);
    assert_eq!(junk_codes("= foo\n"), vec!["E0002"]);
    assert_eq!(junk_codes("foo =\n"), vec!["E0005"]);
    assert_eq!(junk_codes("-foo =\n"), vec!["E0006"]);
    assert_eq!(junk_codes("foo = { lower() }\n"), vec!["E0008"]);
    assert_eq!(junk_codes("foo = { FUN(\"a\": 1) }\n"), vec!["E0009"]);
    assert_eq!(junk_codes("foo = { $x ->\n    [a] A\n}\n"), vec!["E0010"]);
    assert_eq!(junk_codes("foo = { $x ->\n}\n"), vec!["E0011"]);
    assert_eq!(junk_codes("foo = Foo\n    .attr =\n"), vec!["E0012"]);
    assert_eq!(junk_codes("foo = { $x ->\n   *[a] A\n   *[b] B\n}\n"), vec!["E0015"]);
    assert_eq!(junk_codes("foo = { bar ->\n   *[a] A\n}\n"), vec!["E0016"]);
    assert_eq!(junk_codes("foo = { -bar ->\n   *[a] A\n}\n"), vec!["E0017"]);
    assert_eq!(junk_codes("foo = { bar.baz ->\n   *[a] A\n}\n"), vec!["E0018"]);
    assert_eq!(junk_codes("foo = { -bar.baz }\n"), vec!["E0019"]);
    assert_eq!(junk_codes("foo = { \"abc\n }\n"), vec!["E0020"]);
    assert_eq!(junk_codes("foo = { FUN(a: 1, 2) }\n"), vec!["E0021"]);
    assert_eq!(junk_codes("foo = { FUN(a: 1, a: 2) }\n"), vec!["E0022"]);
    assert_eq!(junk_codes("foo = { \"\\a\" }\n"), vec!["E0025"]);
    assert_eq!(junk_codes("foo = { \"\\u00\" }\n"), vec!["E0026"]);
    assert_eq!(junk_codes("foo = }\n"), vec!["E0027"]);
    assert_eq!(junk_codes("foo = { ! }\n"), vec!["E0028"]);
}

#[test]
fn test_term_attribute_as_selector() {
    let source = "foo = { -brand.status(version: \"v2\") ->\n   *[a] A\n}\n";
    assert!(junk_codes(source).is_empty());
    let resource = parse(source);
    match single_expression(message(&resource, "foo")) {
        Expression::SelectExpression(select) => match &*select.selector {
            Expression::CallExpression(call) => {
                assert!(matches!(call.callee, Callee::TermAttribute(_)));
                assert_eq!(call.named[0].name.name, "version");
            }
            other => panic!("unexpected selector {:?}", other),
        },
        other => panic!("unexpected expression {:?}", other),
    }
}

#[test]
fn test_select_expression() {
    let resource = parse(
        "foo = { $n ->\n    [one] One\n    [2] Two\n   *[other] { $n } items\n}\n",
    );
    match single_expression(message(&resource, "foo")) {
        Expression::SelectExpression(select) => {
            assert_eq!(select.variants.len(), 3);
            assert_eq!(select.variants[0].key.name(), "one");
            assert!(matches!(select.variants[1].key, VariantKey::NumberLiteral(_)));
            assert!(select.variants[2].default);
            assert_eq!(select.variants[2].value.elements.len(), 2);
        }
        other => panic!("unexpected expression {:?}", other),
    }
}

#[test]
fn test_number_literals_keep_raw_text() {
    let resource = parse("foo = { 01.50 }\nbar = { -3 }\n");
    match single_expression(message(&resource, "foo")) {
        Expression::NumberLiteral(n) => {
            assert_eq!(n.value, "01.50");
            assert_eq!(n.as_f64(), 1.5);
            assert_eq!(n.fraction_digits(), 2);
        }
        other => panic!("unexpected expression {:?}", other),
    }
    match single_expression(message(&resource, "bar")) {
        Expression::NumberLiteral(n) => assert_eq!(n.value, "-3"),
        other => panic!("unexpected expression {:?}", other),
    }
}

#[test]
fn test_string_escapes() {
    let resource = parse("foo = { \"\\u0041\\\"\\\\\\{\\U01F602\" }\n");
    match single_expression(message(&resource, "foo")) {
        Expression::StringLiteral(s) => {
            assert_eq!(s.raw, "\\u0041\\\"\\\\\\{\\U01F602");
            assert_eq!(s.value, "A\"\\{\u{1F602}");
        }
        other => panic!("unexpected expression {:?}", other),
    }
}

#[test]
fn test_multiline_pattern_dedent() {
    let resource = FluentParser::without_spans().parse("foo =\n    a\n      b\n\n    c   \n");
    let foo = message(&resource, "foo");
    assert_eq!(foo.value.as_ref().unwrap().elements, vec![text("a\n  b\n\nc")]);

    let resource = FluentParser::without_spans().parse("foo = a\n  b\n");
    let foo = message(&resource, "foo");
    assert_eq!(foo.value.as_ref().unwrap().elements, vec![text("a\nb")]);
}

#[test]
fn test_trailing_whitespace_trimmed() {
    let resource = FluentParser::without_spans().parse("foo = Foo   \n");
    assert_eq!(message(&resource, "foo").value.as_ref().unwrap().elements, vec![text("Foo")]);
}

#[test]
fn test_crlf_line_endings() {
    let resource = FluentParser::without_spans().parse("foo =\r\n    a\r\n    b\r\nbar = Bar\r\n");
    assert_eq!(
        message(&resource, "foo").value.as_ref().unwrap().elements,
        vec![text("a\nb")]
    );
    assert_eq!(message(&resource, "bar").id.name, "bar");
}

#[test]
fn test_variant_list_term() {
    let resource = parse("-t =\n    {\n       *[a] A\n        [b] B\n    }\n");
    match &resource.body[0] {
        Entry::Term(term) => match &term.value {
            Value::VariantList(list) => {
                assert_eq!(list.variants.len(), 2);
                assert!(list.variants[0].default);
            }
            other => panic!("unexpected value {:?}", other),
        },
        other => panic!("unexpected entry {:?}", other),
    }
}

#[test]
fn test_parse_entry() {
    let parser = FluentParser::new();
    match parser.parse_entry("# comment\nfoo = Foo\n") {
        Entry::Message(m) => assert_eq!(m.id.name, "foo"),
        other => panic!("unexpected entry {:?}", other),
    }
    assert!(matches!(parser.parse_entry("foo\n"), Entry::Junk(_)));
}
