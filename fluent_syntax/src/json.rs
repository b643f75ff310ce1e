//! JSON interchange form of the AST.
//!
//! Every node serializes to an object tagged with `"type": <NodeName>`.
//! Reading back is strict: unknown or misplaced tags are errors.
use crate::{ast::*, errors::JsonError};
use serde_json::{json, Map, Value as Json};

pub type JsonResult<T> = std::result::Result<T, JsonError>;

pub trait ToJson {
    fn to_json(&self) -> Json;
}

pub trait FromJson: Sized {
    fn from_json(value: &Json) -> JsonResult<Self>;
}

/// Serializes a node into a JSON string.
pub fn to_json_string<T: ToJson>(node: &T) -> String {
    node.to_json().to_string()
}

/// Parses a JSON string into a node.
pub fn from_json_str<T: FromJson>(source: &str) -> JsonResult<T> {
    let value: Json = serde_json::from_str(source)?;
    T::from_json(&value)
}

impl<T: ToJson> ToJson for Option<T> {
    fn to_json(&self) -> Json {
        match self {
            Some(node) => node.to_json(),
            None => Json::Null,
        }
    }
}

impl<T: ToJson> ToJson for Vec<T> {
    fn to_json(&self) -> Json {
        Json::Array(self.iter().map(ToJson::to_json).collect())
    }
}

impl<T: ToJson> ToJson for Box<T> {
    fn to_json(&self) -> Json {
        (**self).to_json()
    }
}

impl ToJson for Span {
    fn to_json(&self) -> Json {
        json!({ "type": "Span", "start": self.start, "end": self.end })
    }
}

impl ToJson for Resource {
    fn to_json(&self) -> Json {
        json!({ "type": "Resource", "body": self.body.to_json(), "span": self.span.to_json() })
    }
}

impl ToJson for Entry {
    fn to_json(&self) -> Json {
        match self {
            Entry::Message(node) => node.to_json(),
            Entry::Term(node) => node.to_json(),
            Entry::Comment(node) => comment_json("Comment", node),
            Entry::GroupComment(node) => comment_json("GroupComment", node),
            Entry::ResourceComment(node) => comment_json("ResourceComment", node),
            Entry::Junk(node) => node.to_json(),
        }
    }
}

fn comment_json(type_name: &str, node: &Comment) -> Json {
    json!({ "type": type_name, "content": node.content, "span": node.span.to_json() })
}

impl ToJson for Comment {
    fn to_json(&self) -> Json {
        comment_json("Comment", self)
    }
}

impl ToJson for Message {
    fn to_json(&self) -> Json {
        json!({
            "type": "Message",
            "id": self.id.to_json(),
            "value": self.value.to_json(),
            "attributes": self.attributes.to_json(),
            "comment": self.comment.to_json(),
            "span": self.span.to_json(),
        })
    }
}

impl ToJson for Term {
    fn to_json(&self) -> Json {
        json!({
            "type": "Term",
            "id": self.id.to_json(),
            "value": self.value.to_json(),
            "attributes": self.attributes.to_json(),
            "comment": self.comment.to_json(),
            "span": self.span.to_json(),
        })
    }
}

impl ToJson for Value {
    fn to_json(&self) -> Json {
        match self {
            Value::Pattern(node) => node.to_json(),
            Value::VariantList(node) => node.to_json(),
        }
    }
}

impl ToJson for VariantList {
    fn to_json(&self) -> Json {
        json!({ "type": "VariantList", "variants": self.variants.to_json(), "span": self.span.to_json() })
    }
}

impl ToJson for Pattern {
    fn to_json(&self) -> Json {
        json!({ "type": "Pattern", "elements": self.elements.to_json(), "span": self.span.to_json() })
    }
}

impl ToJson for PatternElement {
    fn to_json(&self) -> Json {
        match self {
            PatternElement::TextElement(node) => node.to_json(),
            PatternElement::Placeable(node) => node.to_json(),
        }
    }
}

impl ToJson for TextElement {
    fn to_json(&self) -> Json {
        json!({ "type": "TextElement", "value": self.value, "span": self.span.to_json() })
    }
}

impl ToJson for Placeable {
    fn to_json(&self) -> Json {
        json!({ "type": "Placeable", "expression": self.expression.to_json(), "span": self.span.to_json() })
    }
}

impl ToJson for Expression {
    fn to_json(&self) -> Json {
        use Expression as E;
        match self {
            E::StringLiteral(node) => node.to_json(),
            E::NumberLiteral(node) => node.to_json(),
            E::MessageReference(node) => node.to_json(),
            E::TermReference(node) => node.to_json(),
            E::VariableReference(node) => node.to_json(),
            E::FunctionReference(node) => node.to_json(),
            E::AttributeExpression(node) => node.to_json(),
            E::VariantExpression(node) => node.to_json(),
            E::CallExpression(node) => node.to_json(),
            E::SelectExpression(node) => node.to_json(),
            E::Placeable(node) => node.to_json(),
        }
    }
}

impl ToJson for StringLiteral {
    fn to_json(&self) -> Json {
        json!({ "type": "StringLiteral", "raw": self.raw, "value": self.value, "span": self.span.to_json() })
    }
}

impl ToJson for NumberLiteral {
    fn to_json(&self) -> Json {
        json!({ "type": "NumberLiteral", "value": self.value, "span": self.span.to_json() })
    }
}

macro_rules! impl_reference_json {
    ($($ty:ident),*) => {
        $(
            impl ToJson for $ty {
                fn to_json(&self) -> Json {
                    json!({ "type": stringify!($ty), "id": self.id.to_json(), "span": self.span.to_json() })
                }
            }
        )*
    };
}

impl_reference_json!(MessageReference, TermReference, VariableReference, FunctionReference);

impl ToJson for EntryReference {
    fn to_json(&self) -> Json {
        match self {
            EntryReference::Message(node) => node.to_json(),
            EntryReference::Term(node) => node.to_json(),
        }
    }
}

impl ToJson for AttributeExpression {
    fn to_json(&self) -> Json {
        json!({
            "type": "AttributeExpression",
            "ref": self.reference.to_json(),
            "name": self.name.to_json(),
            "span": self.span.to_json(),
        })
    }
}

impl ToJson for VariantExpression {
    fn to_json(&self) -> Json {
        json!({
            "type": "VariantExpression",
            "ref": self.reference.to_json(),
            "key": self.key.to_json(),
            "span": self.span.to_json(),
        })
    }
}

impl ToJson for Callee {
    fn to_json(&self) -> Json {
        match self {
            Callee::Function(node) => node.to_json(),
            Callee::Term(node) => node.to_json(),
            Callee::TermAttribute(node) => node.to_json(),
        }
    }
}

impl ToJson for CallExpression {
    fn to_json(&self) -> Json {
        json!({
            "type": "CallExpression",
            "callee": self.callee.to_json(),
            "positional": self.positional.to_json(),
            "named": self.named.to_json(),
            "span": self.span.to_json(),
        })
    }
}

impl ToJson for NamedArgument {
    fn to_json(&self) -> Json {
        json!({
            "type": "NamedArgument",
            "name": self.name.to_json(),
            "value": self.value.to_json(),
            "span": self.span.to_json(),
        })
    }
}

impl ToJson for Literal {
    fn to_json(&self) -> Json {
        match self {
            Literal::String(node) => node.to_json(),
            Literal::Number(node) => node.to_json(),
        }
    }
}

impl ToJson for SelectExpression {
    fn to_json(&self) -> Json {
        json!({
            "type": "SelectExpression",
            "selector": self.selector.to_json(),
            "variants": self.variants.to_json(),
            "span": self.span.to_json(),
        })
    }
}

impl ToJson for Variant {
    fn to_json(&self) -> Json {
        json!({
            "type": "Variant",
            "key": self.key.to_json(),
            "value": self.value.to_json(),
            "default": self.default,
            "span": self.span.to_json(),
        })
    }
}

impl ToJson for VariantKey {
    fn to_json(&self) -> Json {
        match self {
            VariantKey::Identifier(node) => node.to_json(),
            VariantKey::NumberLiteral(node) => node.to_json(),
        }
    }
}

impl ToJson for Attribute {
    fn to_json(&self) -> Json {
        json!({
            "type": "Attribute",
            "id": self.id.to_json(),
            "value": self.value.to_json(),
            "span": self.span.to_json(),
        })
    }
}

impl ToJson for Identifier {
    fn to_json(&self) -> Json {
        json!({ "type": "Identifier", "name": self.name.as_str(), "span": self.span.to_json() })
    }
}

impl ToJson for Junk {
    fn to_json(&self) -> Json {
        json!({
            "type": "Junk",
            "content": self.content,
            "annotations": self.annotations.to_json(),
            "span": self.span.to_json(),
        })
    }
}

impl ToJson for Annotation {
    fn to_json(&self) -> Json {
        json!({
            "type": "Annotation",
            "code": self.code,
            "args": self.args,
            "message": self.message,
            "span": self.span.to_json(),
        })
    }
}

// ---------------------------------------------------------------------------
// Reading

/// Object fields of a node, together with its type tag.
struct Fields<'a> {
    node: &'static str,
    map: &'a Map<String, Json>,
}

impl<'a> Fields<'a> {
    fn get(&self, field: &'static str) -> JsonResult<&'a Json> {
        self.map.get(field).ok_or(JsonError::MissingField {
            node: self.node,
            field,
        })
    }

    fn node<T: FromJson>(&self, field: &'static str) -> JsonResult<T> {
        T::from_json(self.get(field)?)
    }

    fn optional<T: FromJson>(&self, field: &'static str) -> JsonResult<Option<T>> {
        match self.map.get(field) {
            None | Some(Json::Null) => Ok(None),
            Some(value) => T::from_json(value).map(Some),
        }
    }

    fn list<T: FromJson>(&self, field: &'static str) -> JsonResult<Vec<T>> {
        match self.get(field)? {
            Json::Array(items) => items.iter().map(T::from_json).collect(),
            _ => Err(self.invalid(field)),
        }
    }

    fn string(&self, field: &'static str) -> JsonResult<String> {
        self.get(field)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.invalid(field))
    }

    fn boolean(&self, field: &'static str) -> JsonResult<bool> {
        self.get(field)?.as_bool().ok_or_else(|| self.invalid(field))
    }

    fn span(&self) -> JsonResult<Option<Span>> {
        self.optional("span")
    }

    fn invalid(&self, field: &'static str) -> JsonError {
        JsonError::InvalidField {
            node: self.node,
            field,
        }
    }
}

const KNOWN_TYPES: &[&str] = &[
    "Resource",
    "Message",
    "Term",
    "Comment",
    "GroupComment",
    "ResourceComment",
    "Junk",
    "Annotation",
    "Attribute",
    "Pattern",
    "TextElement",
    "Placeable",
    "StringLiteral",
    "NumberLiteral",
    "MessageReference",
    "TermReference",
    "VariableReference",
    "FunctionReference",
    "AttributeExpression",
    "VariantExpression",
    "CallExpression",
    "NamedArgument",
    "SelectExpression",
    "Variant",
    "VariantList",
    "Identifier",
    "Span",
];

/// Reads the type tag of a JSON node, rejecting tags that name no node.
fn type_tag(value: &Json) -> JsonResult<&str> {
    let tag = value
        .get("type")
        .and_then(Json::as_str)
        .ok_or_else(|| JsonError::UnknownType(String::new()))?;
    if KNOWN_TYPES.contains(&tag) {
        Ok(tag)
    } else {
        Err(JsonError::UnknownType(tag.to_string()))
    }
}

fn unexpected(expected: &'static str, found: &str) -> JsonError {
    JsonError::UnexpectedType {
        expected,
        found: found.to_string(),
    }
}

/// Checks the tag against one expected node name.
fn expect<'a>(value: &'a Json, name: &'static str) -> JsonResult<Fields<'a>> {
    let tag = type_tag(value)?;
    if tag != name {
        return Err(unexpected(name, tag));
    }
    fields(value, name)
}

fn fields<'a>(value: &'a Json, name: &'static str) -> JsonResult<Fields<'a>> {
    match value.as_object() {
        Some(map) => Ok(Fields { node: name, map }),
        None => Err(JsonError::UnknownType(name.to_string())),
    }
}

impl FromJson for Span {
    fn from_json(value: &Json) -> JsonResult<Self> {
        let f = expect(value, "Span")?;
        let read = |field: &'static str| -> JsonResult<usize> {
            f.get(field)?
                .as_u64()
                .map(|n| n as usize)
                .ok_or_else(|| f.invalid(field))
        };
        Ok(Span::new(read("start")?, read("end")?))
    }
}

impl FromJson for Resource {
    fn from_json(value: &Json) -> JsonResult<Self> {
        let f = expect(value, "Resource")?;
        Ok(Resource {
            body: f.list("body")?,
            span: f.span()?,
        })
    }
}

impl FromJson for Entry {
    fn from_json(value: &Json) -> JsonResult<Self> {
        match type_tag(value)? {
            "Message" => Message::from_json(value).map(Entry::Message),
            "Term" => Term::from_json(value).map(Entry::Term),
            "Comment" => read_comment(value, "Comment").map(Entry::Comment),
            "GroupComment" => read_comment(value, "GroupComment").map(Entry::GroupComment),
            "ResourceComment" => {
                read_comment(value, "ResourceComment").map(Entry::ResourceComment)
            }
            "Junk" => Junk::from_json(value).map(Entry::Junk),
            other => Err(unexpected("Entry", other)),
        }
    }
}

fn read_comment(value: &Json, name: &'static str) -> JsonResult<Comment> {
    let f = expect(value, name)?;
    Ok(Comment {
        content: f.string("content")?,
        span: f.span()?,
    })
}

impl FromJson for Comment {
    fn from_json(value: &Json) -> JsonResult<Self> {
        read_comment(value, "Comment")
    }
}

impl FromJson for Message {
    fn from_json(value: &Json) -> JsonResult<Self> {
        let f = expect(value, "Message")?;
        Ok(Message {
            id: f.node("id")?,
            value: f.optional("value")?,
            attributes: f.list("attributes")?,
            comment: f.optional("comment")?,
            span: f.span()?,
        })
    }
}

impl FromJson for Term {
    fn from_json(value: &Json) -> JsonResult<Self> {
        let f = expect(value, "Term")?;
        Ok(Term {
            id: f.node("id")?,
            value: f.node("value")?,
            attributes: f.list("attributes")?,
            comment: f.optional("comment")?,
            span: f.span()?,
        })
    }
}

impl FromJson for Value {
    fn from_json(value: &Json) -> JsonResult<Self> {
        match type_tag(value)? {
            "Pattern" => Pattern::from_json(value).map(Value::Pattern),
            "VariantList" => VariantList::from_json(value).map(Value::VariantList),
            other => Err(unexpected("Pattern or VariantList", other)),
        }
    }
}

impl FromJson for VariantList {
    fn from_json(value: &Json) -> JsonResult<Self> {
        let f = expect(value, "VariantList")?;
        Ok(VariantList {
            variants: f.list("variants")?,
            span: f.span()?,
        })
    }
}

impl FromJson for Pattern {
    fn from_json(value: &Json) -> JsonResult<Self> {
        let f = expect(value, "Pattern")?;
        Ok(Pattern {
            elements: f.list("elements")?,
            span: f.span()?,
        })
    }
}

impl FromJson for PatternElement {
    fn from_json(value: &Json) -> JsonResult<Self> {
        match type_tag(value)? {
            "TextElement" => TextElement::from_json(value).map(PatternElement::TextElement),
            "Placeable" => Placeable::from_json(value).map(PatternElement::Placeable),
            other => Err(unexpected("PatternElement", other)),
        }
    }
}

impl FromJson for TextElement {
    fn from_json(value: &Json) -> JsonResult<Self> {
        let f = expect(value, "TextElement")?;
        Ok(TextElement {
            value: f.string("value")?,
            span: f.span()?,
        })
    }
}

impl FromJson for Placeable {
    fn from_json(value: &Json) -> JsonResult<Self> {
        let f = expect(value, "Placeable")?;
        Ok(Placeable {
            expression: Box::new(f.node("expression")?),
            span: f.span()?,
        })
    }
}

impl FromJson for Expression {
    fn from_json(value: &Json) -> JsonResult<Self> {
        use Expression as E;
        Ok(match type_tag(value)? {
            "StringLiteral" => E::StringLiteral(FromJson::from_json(value)?),
            "NumberLiteral" => E::NumberLiteral(FromJson::from_json(value)?),
            "MessageReference" => E::MessageReference(FromJson::from_json(value)?),
            "TermReference" => E::TermReference(FromJson::from_json(value)?),
            "VariableReference" => E::VariableReference(FromJson::from_json(value)?),
            "FunctionReference" => E::FunctionReference(FromJson::from_json(value)?),
            "AttributeExpression" => E::AttributeExpression(FromJson::from_json(value)?),
            "VariantExpression" => E::VariantExpression(FromJson::from_json(value)?),
            "CallExpression" => E::CallExpression(FromJson::from_json(value)?),
            "SelectExpression" => E::SelectExpression(FromJson::from_json(value)?),
            "Placeable" => E::Placeable(FromJson::from_json(value)?),
            other => return Err(unexpected("Expression", other)),
        })
    }
}

impl FromJson for StringLiteral {
    fn from_json(value: &Json) -> JsonResult<Self> {
        let f = expect(value, "StringLiteral")?;
        Ok(StringLiteral {
            raw: f.string("raw")?,
            value: f.string("value")?,
            span: f.span()?,
        })
    }
}

impl FromJson for NumberLiteral {
    fn from_json(value: &Json) -> JsonResult<Self> {
        let f = expect(value, "NumberLiteral")?;
        Ok(NumberLiteral {
            value: f.string("value")?,
            span: f.span()?,
        })
    }
}

macro_rules! impl_reference_from_json {
    ($($ty:ident),*) => {
        $(
            impl FromJson for $ty {
                fn from_json(value: &Json) -> JsonResult<Self> {
                    let f = expect(value, stringify!($ty))?;
                    Ok($ty { id: f.node("id")?, span: f.span()? })
                }
            }
        )*
    };
}

impl_reference_from_json!(MessageReference, TermReference, VariableReference, FunctionReference);

impl FromJson for EntryReference {
    fn from_json(value: &Json) -> JsonResult<Self> {
        match type_tag(value)? {
            "MessageReference" => MessageReference::from_json(value).map(EntryReference::Message),
            "TermReference" => TermReference::from_json(value).map(EntryReference::Term),
            other => Err(unexpected("MessageReference or TermReference", other)),
        }
    }
}

impl FromJson for AttributeExpression {
    fn from_json(value: &Json) -> JsonResult<Self> {
        let f = expect(value, "AttributeExpression")?;
        Ok(AttributeExpression {
            reference: f.node("ref")?,
            name: f.node("name")?,
            span: f.span()?,
        })
    }
}

impl FromJson for VariantExpression {
    fn from_json(value: &Json) -> JsonResult<Self> {
        let f = expect(value, "VariantExpression")?;
        Ok(VariantExpression {
            reference: f.node("ref")?,
            key: f.node("key")?,
            span: f.span()?,
        })
    }
}

impl FromJson for Callee {
    fn from_json(value: &Json) -> JsonResult<Self> {
        match type_tag(value)? {
            "FunctionReference" => FunctionReference::from_json(value).map(Callee::Function),
            "TermReference" => TermReference::from_json(value).map(Callee::Term),
            "AttributeExpression" => {
                let attr = AttributeExpression::from_json(value)?;
                if !attr.reference.is_term() {
                    return Err(unexpected("term attribute", "MessageReference"));
                }
                Ok(Callee::TermAttribute(attr))
            }
            other => Err(unexpected("Callee", other)),
        }
    }
}

impl FromJson for CallExpression {
    fn from_json(value: &Json) -> JsonResult<Self> {
        let f = expect(value, "CallExpression")?;
        Ok(CallExpression {
            callee: f.node("callee")?,
            positional: f.list("positional")?,
            named: f.list("named")?,
            span: f.span()?,
        })
    }
}

impl FromJson for NamedArgument {
    fn from_json(value: &Json) -> JsonResult<Self> {
        let f = expect(value, "NamedArgument")?;
        Ok(NamedArgument {
            name: f.node("name")?,
            value: f.node("value")?,
            span: f.span()?,
        })
    }
}

impl FromJson for Literal {
    fn from_json(value: &Json) -> JsonResult<Self> {
        match type_tag(value)? {
            "StringLiteral" => StringLiteral::from_json(value).map(Literal::String),
            "NumberLiteral" => NumberLiteral::from_json(value).map(Literal::Number),
            other => Err(unexpected("Literal", other)),
        }
    }
}

impl FromJson for SelectExpression {
    fn from_json(value: &Json) -> JsonResult<Self> {
        let f = expect(value, "SelectExpression")?;
        Ok(SelectExpression {
            selector: Box::new(f.node("selector")?),
            variants: f.list("variants")?,
            span: f.span()?,
        })
    }
}

impl FromJson for Variant {
    fn from_json(value: &Json) -> JsonResult<Self> {
        let f = expect(value, "Variant")?;
        Ok(Variant {
            key: f.node("key")?,
            value: f.node("value")?,
            default: f.boolean("default")?,
            span: f.span()?,
        })
    }
}

impl FromJson for VariantKey {
    fn from_json(value: &Json) -> JsonResult<Self> {
        match type_tag(value)? {
            "Identifier" => Identifier::from_json(value).map(VariantKey::Identifier),
            "NumberLiteral" => NumberLiteral::from_json(value).map(VariantKey::NumberLiteral),
            other => Err(unexpected("VariantKey", other)),
        }
    }
}

impl FromJson for Attribute {
    fn from_json(value: &Json) -> JsonResult<Self> {
        let f = expect(value, "Attribute")?;
        Ok(Attribute {
            id: f.node("id")?,
            value: f.node("value")?,
            span: f.span()?,
        })
    }
}

impl FromJson for Identifier {
    fn from_json(value: &Json) -> JsonResult<Self> {
        let f = expect(value, "Identifier")?;
        Ok(Identifier {
            name: f.string("name")?.into(),
            span: f.span()?,
        })
    }
}

impl FromJson for Junk {
    fn from_json(value: &Json) -> JsonResult<Self> {
        let f = expect(value, "Junk")?;
        Ok(Junk {
            content: f.string("content")?,
            annotations: f.list("annotations")?,
            span: f.span()?,
        })
    }
}

impl FromJson for Annotation {
    fn from_json(value: &Json) -> JsonResult<Self> {
        let f = expect(value, "Annotation")?;
        let args = match f.get("args")? {
            Json::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string).ok_or_else(|| f.invalid("args")))
                .collect::<JsonResult<Vec<_>>>()?,
            _ => return Err(f.invalid("args")),
        };
        Ok(Annotation {
            code: f.string("code")?,
            args,
            message: f.string("message")?,
            span: f.span()?,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_identifier_json() {
        let id = Identifier {
            name: "foo".into(),
            span: Some(Span::new(0, 3)),
        };
        assert_eq!(
            id.to_json(),
            json!({
                "type": "Identifier",
                "name": "foo",
                "span": { "type": "Span", "start": 0, "end": 3 },
            })
        );
        assert_eq!(Identifier::from_json(&id.to_json()).unwrap(), id);
    }

    #[test]
    fn test_rejects_unknown_type() {
        let value = json!({ "type": "Bogus", "name": "foo" });
        match Identifier::from_json(&value) {
            Err(JsonError::UnknownType(name)) => assert_eq!(name, "Bogus"),
            other => panic!("unexpected result {:?}", other),
        }

        let value = json!({ "type": "TextElement", "value": "x", "span": null });
        assert!(matches!(
            Expression::from_json(&value),
            Err(JsonError::UnexpectedType { .. })
        ));
    }

    #[test]
    fn test_missing_field() {
        let value = json!({ "type": "TextElement" });
        assert!(matches!(
            TextElement::from_json(&value),
            Err(JsonError::MissingField { node: "TextElement", field: "value" })
        ));
    }
}
