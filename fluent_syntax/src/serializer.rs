//! Serializes an AST back into Fluent source text.
//!
//! Output round-trips through the parser: parsing the serialized form of
//! a resource yields an equal resource, spans aside.
use crate::ast::*;
use std::fmt::Write;

#[derive(Debug, Clone, Default)]
pub struct FluentSerializer {
    with_junk: bool,
}

impl FluentSerializer {
    #[inline]
    pub fn new() -> Self {
        Self { with_junk: false }
    }

    /// Serializer that writes `Junk` entries back out verbatim.
    #[inline]
    pub fn with_junk() -> Self {
        Self { with_junk: true }
    }

    pub fn serialize(&self, resource: &Resource) -> String {
        let mut out = String::new();
        let mut has_entries = false;

        for entry in &resource.body {
            if matches!(entry, Entry::Junk(_)) && !self.with_junk {
                continue;
            }
            out.push_str(&self.serialize_entry(entry, has_entries));
            has_entries = true;
        }

        out
    }

    /// Serializes one entry. Standalone comments get a blank line before
    /// them when other entries precede them.
    pub fn serialize_entry(&self, entry: &Entry, has_entries: bool) -> String {
        match entry {
            Entry::Message(message) => serialize_message(message),
            Entry::Term(term) => serialize_term(term),
            Entry::Comment(comment) => standalone_comment(comment, "#", has_entries),
            Entry::GroupComment(comment) => standalone_comment(comment, "##", has_entries),
            Entry::ResourceComment(comment) => standalone_comment(comment, "###", has_entries),
            Entry::Junk(junk) => junk.content.clone(),
        }
    }
}

/// Serializes a resource, leaving junk out.
#[inline]
pub fn serialize(resource: &Resource) -> String {
    FluentSerializer::new().serialize(resource)
}

/// Prefixes every line after the first with four spaces.
fn indent(content: &str) -> String {
    content.split_inclusive('\n').collect::<Vec<_>>().join("    ")
}

fn standalone_comment(comment: &Comment, prefix: &str, has_entries: bool) -> String {
    if has_entries {
        format!("\n{}\n", serialize_comment(comment, prefix))
    } else {
        format!("{}\n", serialize_comment(comment, prefix))
    }
}

fn serialize_comment(comment: &Comment, prefix: &str) -> String {
    let mut out = comment
        .content
        .split('\n')
        .map(|line| {
            if line.is_empty() {
                prefix.to_string()
            } else {
                format!("{} {}", prefix, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    out.push('\n');
    out
}

fn serialize_message(message: &Message) -> String {
    let mut out = String::new();

    if let Some(comment) = &message.comment {
        out.push_str(&serialize_comment(comment, "#"));
    }

    let _ = write!(out, "{} =", message.id.name);

    if let Some(value) = &message.value {
        out.push_str(&serialize_pattern(value));
    }

    for attribute in &message.attributes {
        out.push_str(&serialize_attribute(attribute));
    }

    out.push('\n');
    out
}

fn serialize_term(term: &Term) -> String {
    let mut out = String::new();

    if let Some(comment) = &term.comment {
        out.push_str(&serialize_comment(comment, "#"));
    }

    let _ = write!(out, "-{} =", term.id.name);

    match &term.value {
        Value::Pattern(pattern) => out.push_str(&serialize_pattern(pattern)),
        Value::VariantList(list) => out.push_str(&serialize_variant_list(list)),
    }

    for attribute in &term.attributes {
        out.push_str(&serialize_attribute(attribute));
    }

    out.push('\n');
    out
}

fn serialize_attribute(attribute: &Attribute) -> String {
    format!(
        "\n    .{} ={}",
        attribute.id.name,
        indent(&serialize_pattern(&attribute.value))
    )
}

/// Serializes a pattern, including the whitespace separating it from
/// the `=` or the variant key that precedes it.
pub fn serialize_pattern(pattern: &Pattern) -> String {
    let content: String = pattern.elements.iter().map(serialize_element).collect();
    let content = indent(&content);

    let start_on_new_line = pattern.elements.iter().any(|element| match element {
        PatternElement::TextElement(text) => text.value.contains('\n'),
        PatternElement::Placeable(placeable) => {
            matches!(*placeable.expression, Expression::SelectExpression(_))
        }
    });

    if start_on_new_line {
        format!("\n    {}", content)
    } else {
        format!(" {}", content)
    }
}

fn serialize_variant_list(list: &VariantList) -> String {
    let content: String = list.variants.iter().map(serialize_variant).collect();
    format!("\n    {{{}\n    }}", indent(&content))
}

fn serialize_variant(variant: &Variant) -> String {
    format!(
        "\n{}[{}]{}",
        if variant.default { "   *" } else { "    " },
        variant.key.name(),
        indent(&serialize_pattern(&variant.value))
    )
}

fn serialize_element(element: &PatternElement) -> String {
    match element {
        PatternElement::TextElement(text) => text.value.clone(),
        PatternElement::Placeable(placeable) => serialize_placeable(placeable),
    }
}

fn serialize_placeable(placeable: &Placeable) -> String {
    match &*placeable.expression {
        Expression::Placeable(inner) => format!("{{{}}}", serialize_placeable(inner)),
        // Select expressions control the whitespace before the closing brace.
        Expression::SelectExpression(select) => {
            format!("{{ {}}}", serialize_select_expression(select))
        }
        expr => format!("{{ {} }}", serialize_expression(expr)),
    }
}

pub fn serialize_expression(expression: &Expression) -> String {
    use Expression as E;
    match expression {
        E::StringLiteral(literal) => format!("\"{}\"", literal.raw),
        E::NumberLiteral(literal) => literal.value.clone(),
        E::MessageReference(reference) => reference.id.name.to_string(),
        E::FunctionReference(reference) => reference.id.name.to_string(),
        E::TermReference(reference) => format!("-{}", reference.id.name),
        E::VariableReference(reference) => format!("${}", reference.id.name),
        E::AttributeExpression(attr) => serialize_attribute_expression(attr),
        E::VariantExpression(expr) => {
            format!("-{}[{}]", expr.reference.id.name, expr.key.name())
        }
        E::CallExpression(call) => serialize_call_expression(call),
        E::SelectExpression(select) => serialize_select_expression(select),
        E::Placeable(placeable) => serialize_placeable(placeable),
    }
}

fn serialize_attribute_expression(attr: &AttributeExpression) -> String {
    match &attr.reference {
        EntryReference::Message(r) => format!("{}.{}", r.id.name, attr.name.name),
        EntryReference::Term(r) => format!("-{}.{}", r.id.name, attr.name.name),
    }
}

fn serialize_call_expression(call: &CallExpression) -> String {
    let callee = match &call.callee {
        Callee::Function(r) => r.id.name.to_string(),
        Callee::Term(r) => format!("-{}", r.id.name),
        Callee::TermAttribute(attr) => serialize_attribute_expression(attr),
    };

    let args: Vec<String> = call
        .positional
        .iter()
        .map(serialize_expression)
        .chain(call.named.iter().map(|arg| {
            let value = match &arg.value {
                Literal::String(s) => format!("\"{}\"", s.raw),
                Literal::Number(n) => n.value.clone(),
            };
            format!("{}: {}", arg.name.name, value)
        }))
        .collect();

    format!("{}({})", callee, args.join(", "))
}

fn serialize_select_expression(select: &SelectExpression) -> String {
    let mut out = format!("{} ->", serialize_expression(&select.selector));
    for variant in &select.variants {
        out.push_str(&serialize_variant(variant));
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_indent() {
        assert_eq!(indent("a\nb\nc"), "a\n    b\n    c");
        assert_eq!(indent("a\n"), "a\n");
        assert_eq!(indent(""), "");
    }

    #[test]
    fn test_comment_lines() {
        let comment = Comment {
            content: "one\n\ntwo".to_string(),
            span: None,
        };
        assert_eq!(serialize_comment(&comment, "##"), "## one\n##\n## two\n");
    }
}
