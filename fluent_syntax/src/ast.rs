//! Abstract syntax tree of a Fluent resource.
//!
//! Nodes are plain owned data. They are created by the parser or by
//! `from_json`, and are never mutated by the runtime.
use crate::json::ToJson;
use serde_json::Value as Json;
use smol_str::SmolStr;

/// Byte range of a node in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[inline]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub body: Vec<Entry>,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Message(Message),
    Term(Term),
    Comment(Comment),
    GroupComment(Comment),
    ResourceComment(Comment),
    Junk(Junk),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: Identifier,
    pub value: Option<Pattern>,
    pub attributes: Vec<Attribute>,
    pub comment: Option<Comment>,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub id: Identifier,
    pub value: Value,
    pub attributes: Vec<Attribute>,
    pub comment: Option<Comment>,
    pub span: Option<Span>,
}

/// Value of a term.
///
/// Messages and attributes always hold patterns. Terms may also hold a
/// variant list, the older way of declaring term variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Pattern(Pattern),
    VariantList(VariantList),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantList {
    pub variants: Vec<Variant>,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub elements: Vec<PatternElement>,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PatternElement {
    TextElement(TextElement),
    Placeable(Placeable),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    pub value: String,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Placeable {
    pub expression: Box<Expression>,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    StringLiteral(StringLiteral),
    NumberLiteral(NumberLiteral),
    MessageReference(MessageReference),
    TermReference(TermReference),
    VariableReference(VariableReference),
    FunctionReference(FunctionReference),
    AttributeExpression(AttributeExpression),
    VariantExpression(VariantExpression),
    CallExpression(CallExpression),
    SelectExpression(SelectExpression),
    Placeable(Placeable),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    /// Text between the quotes, escape sequences untouched.
    pub raw: String,
    /// Text with escape sequences decoded.
    pub value: String,
    pub span: Option<Span>,
}

/// Number literal, kept as written so precision survives serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberLiteral {
    pub value: String,
    pub span: Option<Span>,
}

impl NumberLiteral {
    /// Numeric value of the literal.
    ///
    /// The grammar guarantees the raw text is `-?[0-9]+(\.[0-9]+)?`,
    /// a literal built by hand that is not a number yields `NaN`.
    pub fn as_f64(&self) -> f64 {
        self.value.parse().unwrap_or(f64::NAN)
    }

    /// Count of digits written after the decimal point.
    pub fn fraction_digits(&self) -> usize {
        match self.value.find('.') {
            Some(pos) => self.value.len() - pos - 1,
            None => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageReference {
    pub id: Identifier,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TermReference {
    pub id: Identifier,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableReference {
    pub id: Identifier,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionReference {
    pub id: Identifier,
    pub span: Option<Span>,
}

/// Target of an attribute access.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryReference {
    Message(MessageReference),
    Term(TermReference),
}

impl EntryReference {
    /// Registry key of the referenced entry. Terms carry their `-` sigil.
    pub fn key(&self) -> String {
        match self {
            EntryReference::Message(r) => r.id.name.to_string(),
            EntryReference::Term(r) => format!("-{}", r.id.name),
        }
    }

    #[inline]
    pub fn is_term(&self) -> bool {
        matches!(self, EntryReference::Term(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeExpression {
    pub reference: EntryReference,
    pub name: Identifier,
    pub span: Option<Span>,
}

/// `-term[key]`, selecting one variant of a term holding a variant list.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantExpression {
    pub reference: TermReference,
    pub key: VariantKey,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Callee {
    Function(FunctionReference),
    Term(TermReference),
    TermAttribute(AttributeExpression),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    pub callee: Callee,
    pub positional: Vec<Expression>,
    pub named: Vec<NamedArgument>,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedArgument {
    pub name: Identifier,
    pub value: Literal,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(StringLiteral),
    Number(NumberLiteral),
}

impl From<Literal> for Expression {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::String(s) => Expression::StringLiteral(s),
            Literal::Number(n) => Expression::NumberLiteral(n),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectExpression {
    pub selector: Box<Expression>,
    pub variants: Vec<Variant>,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub key: VariantKey,
    pub value: Pattern,
    pub default: bool,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VariantKey {
    Identifier(Identifier),
    NumberLiteral(NumberLiteral),
}

impl VariantKey {
    /// Text of the key as written in the source.
    pub fn name(&self) -> &str {
        match self {
            VariantKey::Identifier(id) => id.name.as_str(),
            VariantKey::NumberLiteral(n) => n.value.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub id: Identifier,
    pub value: Pattern,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: SmolStr,
    pub span: Option<Span>,
}

impl Identifier {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            span: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub content: String,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Junk {
    pub content: String,
    pub annotations: Vec<Annotation>,
    pub span: Option<Span>,
}

/// Diagnostic attached to a `Junk` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub code: String,
    pub args: Vec<String>,
    pub message: String,
    pub span: Option<Span>,
}

impl Message {
    pub fn get_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.id.name == name)
    }
}

impl Term {
    pub fn get_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.id.name == name)
    }
}

/// Capabilities shared by every syntax node.
pub trait Node: ToJson {
    fn span(&self) -> Option<Span>;

    /// Structural comparison of two nodes.
    ///
    /// Fields named in `ignored_fields` are left out at every depth.
    /// Attributes and variants compare regardless of their order.
    fn equals(&self, other: &Self, ignored_fields: &[&str]) -> bool
    where
        Self: Sized,
    {
        let a = normalize(self.to_json(), ignored_fields);
        let b = normalize(other.to_json(), ignored_fields);
        a == b
    }

    /// Comparison ignoring spans.
    fn equals_ignoring_spans(&self, other: &Self) -> bool
    where
        Self: Sized,
    {
        self.equals(other, &["span"])
    }
}

/// Strips ignored fields, and sorts the order-insensitive lists.
fn normalize(value: Json, ignored_fields: &[&str]) -> Json {
    match value {
        Json::Object(map) => {
            let mut out = serde_json::Map::new();
            for (key, value) in map {
                if ignored_fields.contains(&key.as_str()) {
                    continue;
                }
                let mut value = normalize(value, ignored_fields);
                if key == "attributes" || key == "variants" {
                    if let Json::Array(items) = &mut value {
                        items.sort_by_key(sorting_key);
                    }
                }
                out.insert(key, value);
            }
            Json::Object(out)
        }
        Json::Array(items) => Json::Array(
            items
                .into_iter()
                .map(|item| normalize(item, ignored_fields))
                .collect(),
        ),
        other => other,
    }
}

/// Attribute name, or variant key text.
fn sorting_key(node: &Json) -> String {
    let named = node.get("id").or_else(|| node.get("key"));
    match named {
        Some(key) => key
            .get("name")
            .or_else(|| key.get("value"))
            .and_then(Json::as_str)
            .unwrap_or_default()
            .to_string(),
        None => String::new(),
    }
}

macro_rules! impl_node {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Node for $ty {
                #[inline]
                fn span(&self) -> Option<Span> {
                    self.span
                }
            }
        )*
    };
}

impl_node!(
    Resource,
    Message,
    Term,
    VariantList,
    Pattern,
    TextElement,
    Placeable,
    StringLiteral,
    NumberLiteral,
    MessageReference,
    TermReference,
    VariableReference,
    FunctionReference,
    AttributeExpression,
    VariantExpression,
    CallExpression,
    NamedArgument,
    SelectExpression,
    Variant,
    Attribute,
    Identifier,
    Comment,
    Junk,
    Annotation,
);

impl Node for Entry {
    fn span(&self) -> Option<Span> {
        match self {
            Entry::Message(node) => node.span,
            Entry::Term(node) => node.span,
            Entry::Comment(node) | Entry::GroupComment(node) | Entry::ResourceComment(node) => {
                node.span
            }
            Entry::Junk(node) => node.span,
        }
    }
}

impl Node for Expression {
    fn span(&self) -> Option<Span> {
        use Expression as E;
        match self {
            E::StringLiteral(node) => node.span,
            E::NumberLiteral(node) => node.span,
            E::MessageReference(node) => node.span,
            E::TermReference(node) => node.span,
            E::VariableReference(node) => node.span,
            E::FunctionReference(node) => node.span,
            E::AttributeExpression(node) => node.span,
            E::VariantExpression(node) => node.span,
            E::CallExpression(node) => node.span,
            E::SelectExpression(node) => node.span,
            E::Placeable(node) => node.span,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn attribute(name: &str, text: &str) -> Attribute {
        Attribute {
            id: Identifier::new(name),
            value: Pattern {
                elements: vec![PatternElement::TextElement(TextElement {
                    value: text.to_string(),
                    span: None,
                })],
                span: None,
            },
            span: None,
        }
    }

    #[test]
    fn test_number_literal_value() {
        let n = NumberLiteral {
            value: "-01.250".to_string(),
            span: None,
        };
        assert_eq!(n.as_f64(), -1.25);
        assert_eq!(n.fraction_digits(), 3);
    }

    #[test]
    fn test_equals_attribute_order() {
        let a = Message {
            id: Identifier::new("foo"),
            value: None,
            attributes: vec![attribute("a", "A"), attribute("b", "B")],
            comment: None,
            span: Some(Span::new(0, 10)),
        };
        let mut b = a.clone();
        b.attributes.reverse();
        b.span = Some(Span::new(5, 15));

        assert!(a.equals_ignoring_spans(&b));
        assert!(!a.equals(&b, &[]));

        b.attributes[0].value.elements.clear();
        assert!(!a.equals_ignoring_spans(&b));
    }
}
