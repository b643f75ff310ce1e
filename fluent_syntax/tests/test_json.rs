use fluent_syntax::{
    ast::*,
    errors::JsonError,
    json::{from_json_str, to_json_string, FromJson, ToJson},
    parser::{parse, FluentParser},
};
use serde_json::json;

const CANONICAL: &str = include_str!("canonical.ftl");
const JUNK: &str = include_str!("junk.ftl");

#[test]
fn test_resource_round_trip() {
    for source in [CANONICAL, JUNK] {
        let resource = parse(source);
        let text = to_json_string(&resource);
        let restored: Resource = from_json_str(&text).unwrap();
        assert_eq!(restored, resource);
    }
}

#[test]
fn test_message_shape() {
    let resource = FluentParser::without_spans().parse("foo = { $bar }\n");
    let value = resource.body[0].to_json();
    assert_eq!(
        value,
        json!({
            "type": "Message",
            "id": { "type": "Identifier", "name": "foo", "span": null },
            "value": {
                "type": "Pattern",
                "elements": [{
                    "type": "Placeable",
                    "expression": {
                        "type": "VariableReference",
                        "id": { "type": "Identifier", "name": "bar", "span": null },
                        "span": null
                    },
                    "span": null
                }],
                "span": null
            },
            "attributes": [],
            "comment": null,
            "span": null
        })
    );
}

#[test]
fn test_span_shape() {
    let resource = parse("foo = Foo\n");
    let value = resource.to_json();
    assert_eq!(value["span"], json!({ "type": "Span", "start": 0, "end": 10 }));
}

#[test]
fn test_unknown_type_rejected() {
    let err = Resource::from_json(&json!({ "type": "Nonsense", "body": [] })).unwrap_err();
    assert!(matches!(err, JsonError::UnknownType(name) if name == "Nonsense"));
}

#[test]
fn test_wrong_type_rejected() {
    let err = Resource::from_json(&json!({ "type": "Message", "body": [] })).unwrap_err();
    assert!(matches!(err, JsonError::UnexpectedType { .. }));
}

#[test]
fn test_missing_field_rejected() {
    let err = Identifier::from_json(&json!({ "type": "Identifier" })).unwrap_err();
    assert!(matches!(err, JsonError::MissingField { .. }));
}

#[test]
fn test_malformed_json() {
    let err = from_json_str::<Resource>("{ not json").unwrap_err();
    assert!(matches!(err, JsonError::Serde(_)));
}
