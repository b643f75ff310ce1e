//! Read only walking and rebuilding traversal of the AST.
use crate::ast::*;

/// Read only visitor.
///
/// Every method defaults to walking the node's children, so an
/// implementation overrides only the nodes it is interested in and
/// calls the matching `walk_*` function to keep descending.
pub trait Visitor {
    #[inline]
    fn visit_resource(&mut self, node: &Resource) {
        walk_resource(self, node)
    }

    #[inline]
    fn visit_entry(&mut self, node: &Entry) {
        walk_entry(self, node)
    }

    #[inline]
    fn visit_message(&mut self, node: &Message) {
        walk_message(self, node)
    }

    #[inline]
    fn visit_term(&mut self, node: &Term) {
        walk_term(self, node)
    }

    #[inline]
    fn visit_attribute(&mut self, node: &Attribute) {
        self.visit_pattern(&node.value)
    }

    #[inline]
    fn visit_comment(&mut self, _node: &Comment) {}

    #[inline]
    fn visit_junk(&mut self, _node: &Junk) {}

    #[inline]
    fn visit_variant_list(&mut self, node: &VariantList) {
        for variant in &node.variants {
            self.visit_variant(variant);
        }
    }

    #[inline]
    fn visit_pattern(&mut self, node: &Pattern) {
        walk_pattern(self, node)
    }

    #[inline]
    fn visit_text_element(&mut self, _node: &TextElement) {}

    #[inline]
    fn visit_placeable(&mut self, node: &Placeable) {
        self.visit_expression(&node.expression)
    }

    #[inline]
    fn visit_expression(&mut self, node: &Expression) {
        walk_expression(self, node)
    }

    #[inline]
    fn visit_message_reference(&mut self, _node: &MessageReference) {}

    #[inline]
    fn visit_term_reference(&mut self, _node: &TermReference) {}

    #[inline]
    fn visit_variable_reference(&mut self, _node: &VariableReference) {}

    #[inline]
    fn visit_attribute_expression(&mut self, node: &AttributeExpression) {
        match &node.reference {
            EntryReference::Message(r) => self.visit_message_reference(r),
            EntryReference::Term(r) => self.visit_term_reference(r),
        }
    }

    #[inline]
    fn visit_variant_expression(&mut self, node: &VariantExpression) {
        self.visit_term_reference(&node.reference)
    }

    #[inline]
    fn visit_call_expression(&mut self, node: &CallExpression) {
        walk_call_expression(self, node)
    }

    #[inline]
    fn visit_select_expression(&mut self, node: &SelectExpression) {
        self.visit_expression(&node.selector);
        for variant in &node.variants {
            self.visit_variant(variant);
        }
    }

    #[inline]
    fn visit_variant(&mut self, node: &Variant) {
        self.visit_pattern(&node.value)
    }
}

pub fn walk_resource<V: Visitor + ?Sized>(visitor: &mut V, node: &Resource) {
    for entry in &node.body {
        visitor.visit_entry(entry);
    }
}

pub fn walk_entry<V: Visitor + ?Sized>(visitor: &mut V, node: &Entry) {
    match node {
        Entry::Message(message) => visitor.visit_message(message),
        Entry::Term(term) => visitor.visit_term(term),
        Entry::Comment(comment) | Entry::GroupComment(comment) | Entry::ResourceComment(comment) => {
            visitor.visit_comment(comment)
        }
        Entry::Junk(junk) => visitor.visit_junk(junk),
    }
}

pub fn walk_message<V: Visitor + ?Sized>(visitor: &mut V, node: &Message) {
    if let Some(value) = &node.value {
        visitor.visit_pattern(value);
    }
    for attribute in &node.attributes {
        visitor.visit_attribute(attribute);
    }
}

pub fn walk_term<V: Visitor + ?Sized>(visitor: &mut V, node: &Term) {
    match &node.value {
        Value::Pattern(pattern) => visitor.visit_pattern(pattern),
        Value::VariantList(list) => visitor.visit_variant_list(list),
    }
    for attribute in &node.attributes {
        visitor.visit_attribute(attribute);
    }
}

pub fn walk_pattern<V: Visitor + ?Sized>(visitor: &mut V, node: &Pattern) {
    for element in &node.elements {
        match element {
            PatternElement::TextElement(text) => visitor.visit_text_element(text),
            PatternElement::Placeable(placeable) => visitor.visit_placeable(placeable),
        }
    }
}

pub fn walk_expression<V: Visitor + ?Sized>(visitor: &mut V, node: &Expression) {
    use Expression as E;
    match node {
        E::StringLiteral(_) | E::NumberLiteral(_) | E::FunctionReference(_) => {}
        E::MessageReference(r) => visitor.visit_message_reference(r),
        E::TermReference(r) => visitor.visit_term_reference(r),
        E::VariableReference(r) => visitor.visit_variable_reference(r),
        E::AttributeExpression(expr) => visitor.visit_attribute_expression(expr),
        E::VariantExpression(expr) => visitor.visit_variant_expression(expr),
        E::CallExpression(expr) => visitor.visit_call_expression(expr),
        E::SelectExpression(expr) => visitor.visit_select_expression(expr),
        E::Placeable(placeable) => visitor.visit_placeable(placeable),
    }
}

pub fn walk_call_expression<V: Visitor + ?Sized>(visitor: &mut V, node: &CallExpression) {
    match &node.callee {
        Callee::Function(_) => {}
        Callee::Term(r) => visitor.visit_term_reference(r),
        Callee::TermAttribute(attr) => visitor.visit_attribute_expression(attr),
    }
    for arg in &node.positional {
        visitor.visit_expression(arg);
    }
}

/// Rebuilding postorder transform.
///
/// Each hook receives a node whose children have already been rebuilt,
/// and returns the node that takes its place. Spans and annotations are
/// carried over untouched.
pub trait Fold {
    fn fold_resource(&mut self, node: Resource) -> Resource {
        node
    }

    fn fold_entry(&mut self, node: Entry) -> Entry {
        node
    }

    fn fold_message(&mut self, node: Message) -> Message {
        node
    }

    fn fold_term(&mut self, node: Term) -> Term {
        node
    }

    fn fold_attribute(&mut self, node: Attribute) -> Attribute {
        node
    }

    fn fold_comment(&mut self, node: Comment) -> Comment {
        node
    }

    fn fold_junk(&mut self, node: Junk) -> Junk {
        node
    }

    fn fold_variant_list(&mut self, node: VariantList) -> VariantList {
        node
    }

    fn fold_pattern(&mut self, node: Pattern) -> Pattern {
        node
    }

    fn fold_pattern_element(&mut self, node: PatternElement) -> PatternElement {
        node
    }

    fn fold_expression(&mut self, node: Expression) -> Expression {
        node
    }

    fn fold_variant(&mut self, node: Variant) -> Variant {
        node
    }

    fn fold_named_argument(&mut self, node: NamedArgument) -> NamedArgument {
        node
    }

    fn fold_identifier(&mut self, node: Identifier) -> Identifier {
        node
    }
}

/// Nodes that can be rebuilt by a `Fold`.
pub trait Traverse: Sized {
    fn traverse<F: Fold + ?Sized>(self, folder: &mut F) -> Self;
}

impl<T: Traverse> Traverse for Vec<T> {
    fn traverse<F: Fold + ?Sized>(self, folder: &mut F) -> Self {
        self.into_iter().map(|node| node.traverse(folder)).collect()
    }
}

impl<T: Traverse> Traverse for Option<T> {
    fn traverse<F: Fold + ?Sized>(self, folder: &mut F) -> Self {
        self.map(|node| node.traverse(folder))
    }
}

impl<T: Traverse> Traverse for Box<T> {
    fn traverse<F: Fold + ?Sized>(self, folder: &mut F) -> Self {
        Box::new((*self).traverse(folder))
    }
}

impl Traverse for Resource {
    fn traverse<F: Fold + ?Sized>(self, folder: &mut F) -> Self {
        let node = Resource {
            body: self.body.traverse(folder),
            span: self.span,
        };
        folder.fold_resource(node)
    }
}

impl Traverse for Entry {
    fn traverse<F: Fold + ?Sized>(self, folder: &mut F) -> Self {
        let node = match self {
            Entry::Message(node) => Entry::Message(node.traverse(folder)),
            Entry::Term(node) => Entry::Term(node.traverse(folder)),
            Entry::Comment(node) => Entry::Comment(node.traverse(folder)),
            Entry::GroupComment(node) => Entry::GroupComment(node.traverse(folder)),
            Entry::ResourceComment(node) => Entry::ResourceComment(node.traverse(folder)),
            Entry::Junk(node) => Entry::Junk(folder.fold_junk(node)),
        };
        folder.fold_entry(node)
    }
}

impl Traverse for Message {
    fn traverse<F: Fold + ?Sized>(self, folder: &mut F) -> Self {
        let node = Message {
            id: self.id.traverse(folder),
            value: self.value.traverse(folder),
            attributes: self.attributes.traverse(folder),
            comment: self.comment.traverse(folder),
            span: self.span,
        };
        folder.fold_message(node)
    }
}

impl Traverse for Term {
    fn traverse<F: Fold + ?Sized>(self, folder: &mut F) -> Self {
        let value = match self.value {
            Value::Pattern(pattern) => Value::Pattern(pattern.traverse(folder)),
            Value::VariantList(list) => Value::VariantList(list.traverse(folder)),
        };
        let node = Term {
            id: self.id.traverse(folder),
            value,
            attributes: self.attributes.traverse(folder),
            comment: self.comment.traverse(folder),
            span: self.span,
        };
        folder.fold_term(node)
    }
}

impl Traverse for Attribute {
    fn traverse<F: Fold + ?Sized>(self, folder: &mut F) -> Self {
        let node = Attribute {
            id: self.id.traverse(folder),
            value: self.value.traverse(folder),
            span: self.span,
        };
        folder.fold_attribute(node)
    }
}

impl Traverse for Comment {
    #[inline]
    fn traverse<F: Fold + ?Sized>(self, folder: &mut F) -> Self {
        folder.fold_comment(self)
    }
}

impl Traverse for VariantList {
    fn traverse<F: Fold + ?Sized>(self, folder: &mut F) -> Self {
        let node = VariantList {
            variants: self.variants.traverse(folder),
            span: self.span,
        };
        folder.fold_variant_list(node)
    }
}

impl Traverse for Pattern {
    fn traverse<F: Fold + ?Sized>(self, folder: &mut F) -> Self {
        let node = Pattern {
            elements: self.elements.traverse(folder),
            span: self.span,
        };
        folder.fold_pattern(node)
    }
}

impl Traverse for PatternElement {
    fn traverse<F: Fold + ?Sized>(self, folder: &mut F) -> Self {
        let node = match self {
            PatternElement::TextElement(text) => PatternElement::TextElement(text),
            PatternElement::Placeable(placeable) => {
                PatternElement::Placeable(placeable.traverse(folder))
            }
        };
        folder.fold_pattern_element(node)
    }
}

impl Traverse for Placeable {
    fn traverse<F: Fold + ?Sized>(self, folder: &mut F) -> Self {
        Placeable {
            expression: self.expression.traverse(folder),
            span: self.span,
        }
    }
}

impl Traverse for Expression {
    fn traverse<F: Fold + ?Sized>(self, folder: &mut F) -> Self {
        use Expression as E;
        let node = match self {
            literal @ (E::StringLiteral(_) | E::NumberLiteral(_)) => literal,
            E::MessageReference(r) => E::MessageReference(MessageReference {
                id: r.id.traverse(folder),
                span: r.span,
            }),
            E::TermReference(r) => E::TermReference(r.traverse(folder)),
            E::VariableReference(r) => E::VariableReference(VariableReference {
                id: r.id.traverse(folder),
                span: r.span,
            }),
            E::FunctionReference(r) => E::FunctionReference(r.traverse(folder)),
            E::AttributeExpression(expr) => E::AttributeExpression(expr.traverse(folder)),
            E::VariantExpression(expr) => E::VariantExpression(VariantExpression {
                reference: expr.reference.traverse(folder),
                key: expr.key.traverse(folder),
                span: expr.span,
            }),
            E::CallExpression(expr) => E::CallExpression(CallExpression {
                callee: match expr.callee {
                    Callee::Function(r) => Callee::Function(r.traverse(folder)),
                    Callee::Term(r) => Callee::Term(r.traverse(folder)),
                    Callee::TermAttribute(attr) => Callee::TermAttribute(attr.traverse(folder)),
                },
                positional: expr.positional.traverse(folder),
                named: expr.named.traverse(folder),
                span: expr.span,
            }),
            E::SelectExpression(expr) => E::SelectExpression(SelectExpression {
                selector: expr.selector.traverse(folder),
                variants: expr.variants.traverse(folder),
                span: expr.span,
            }),
            E::Placeable(placeable) => E::Placeable(placeable.traverse(folder)),
        };
        folder.fold_expression(node)
    }
}

impl Traverse for TermReference {
    fn traverse<F: Fold + ?Sized>(self, folder: &mut F) -> Self {
        TermReference {
            id: self.id.traverse(folder),
            span: self.span,
        }
    }
}

impl Traverse for FunctionReference {
    fn traverse<F: Fold + ?Sized>(self, folder: &mut F) -> Self {
        FunctionReference {
            id: self.id.traverse(folder),
            span: self.span,
        }
    }
}

impl Traverse for AttributeExpression {
    fn traverse<F: Fold + ?Sized>(self, folder: &mut F) -> Self {
        let reference = match self.reference {
            EntryReference::Message(r) => EntryReference::Message(MessageReference {
                id: r.id.traverse(folder),
                span: r.span,
            }),
            EntryReference::Term(r) => EntryReference::Term(r.traverse(folder)),
        };
        AttributeExpression {
            reference,
            name: self.name.traverse(folder),
            span: self.span,
        }
    }
}

impl Traverse for NamedArgument {
    fn traverse<F: Fold + ?Sized>(self, folder: &mut F) -> Self {
        let node = NamedArgument {
            name: self.name.traverse(folder),
            value: self.value,
            span: self.span,
        };
        folder.fold_named_argument(node)
    }
}

impl Traverse for Variant {
    fn traverse<F: Fold + ?Sized>(self, folder: &mut F) -> Self {
        let node = Variant {
            key: self.key.traverse(folder),
            value: self.value.traverse(folder),
            default: self.default,
            span: self.span,
        };
        folder.fold_variant(node)
    }
}

impl Traverse for VariantKey {
    fn traverse<F: Fold + ?Sized>(self, folder: &mut F) -> Self {
        match self {
            VariantKey::Identifier(id) => VariantKey::Identifier(id.traverse(folder)),
            key => key,
        }
    }
}

impl Traverse for Identifier {
    #[inline]
    fn traverse<F: Fold + ?Sized>(self, folder: &mut F) -> Self {
        folder.fold_identifier(self)
    }
}

/// Fold that clears every span in a tree, annotations included.
pub struct StripSpans;

impl StripSpans {
    fn pattern(mut pattern: Pattern) -> Pattern {
        pattern.span = None;
        for element in pattern.elements.iter_mut() {
            match element {
                PatternElement::TextElement(text) => text.span = None,
                PatternElement::Placeable(placeable) => placeable.span = None,
            }
        }
        pattern
    }
}

impl Fold for StripSpans {
    fn fold_resource(&mut self, mut node: Resource) -> Resource {
        node.span = None;
        node
    }

    fn fold_message(&mut self, mut node: Message) -> Message {
        node.span = None;
        node
    }

    fn fold_term(&mut self, mut node: Term) -> Term {
        node.span = None;
        node
    }

    fn fold_attribute(&mut self, mut node: Attribute) -> Attribute {
        node.span = None;
        node
    }

    fn fold_comment(&mut self, mut node: Comment) -> Comment {
        node.span = None;
        node
    }

    fn fold_junk(&mut self, mut node: Junk) -> Junk {
        node.span = None;
        for annotation in node.annotations.iter_mut() {
            annotation.span = None;
        }
        node
    }

    fn fold_variant_list(&mut self, mut node: VariantList) -> VariantList {
        node.span = None;
        node
    }

    fn fold_pattern(&mut self, node: Pattern) -> Pattern {
        StripSpans::pattern(node)
    }

    fn fold_expression(&mut self, node: Expression) -> Expression {
        use Expression as E;
        match node {
            E::StringLiteral(mut n) => {
                n.span = None;
                E::StringLiteral(n)
            }
            E::NumberLiteral(mut n) => {
                n.span = None;
                E::NumberLiteral(n)
            }
            E::MessageReference(mut n) => {
                n.span = None;
                E::MessageReference(n)
            }
            E::TermReference(mut n) => {
                n.span = None;
                E::TermReference(n)
            }
            E::VariableReference(mut n) => {
                n.span = None;
                E::VariableReference(n)
            }
            E::FunctionReference(mut n) => {
                n.span = None;
                E::FunctionReference(n)
            }
            E::AttributeExpression(mut n) => {
                n.span = None;
                strip_reference(&mut n.reference);
                E::AttributeExpression(n)
            }
            E::VariantExpression(mut n) => {
                n.span = None;
                n.reference.span = None;
                strip_key(&mut n.key);
                E::VariantExpression(n)
            }
            E::CallExpression(mut n) => {
                n.span = None;
                match &mut n.callee {
                    Callee::Function(r) => r.span = None,
                    Callee::Term(r) => r.span = None,
                    Callee::TermAttribute(attr) => {
                        attr.span = None;
                        strip_reference(&mut attr.reference);
                    }
                }
                E::CallExpression(n)
            }
            E::SelectExpression(mut n) => {
                n.span = None;
                E::SelectExpression(n)
            }
            E::Placeable(mut n) => {
                n.span = None;
                E::Placeable(n)
            }
        }
    }

    fn fold_variant(&mut self, mut node: Variant) -> Variant {
        node.span = None;
        strip_key(&mut node.key);
        node
    }

    fn fold_named_argument(&mut self, mut node: NamedArgument) -> NamedArgument {
        node.span = None;
        match &mut node.value {
            Literal::String(s) => s.span = None,
            Literal::Number(n) => n.span = None,
        }
        node
    }

    fn fold_identifier(&mut self, mut node: Identifier) -> Identifier {
        node.span = None;
        node
    }
}

fn strip_reference(reference: &mut EntryReference) {
    match reference {
        EntryReference::Message(r) => r.span = None,
        EntryReference::Term(r) => r.span = None,
    }
}

fn strip_key(key: &mut VariantKey) {
    if let VariantKey::NumberLiteral(n) = key {
        n.span = None;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Default)]
    struct CountReferences {
        messages: Vec<String>,
        terms: Vec<String>,
    }

    impl Visitor for CountReferences {
        fn visit_message_reference(&mut self, node: &MessageReference) {
            self.messages.push(node.id.name.to_string());
        }

        fn visit_term_reference(&mut self, node: &TermReference) {
            self.terms.push(node.id.name.to_string());
        }
    }

    fn placeable(expression: Expression) -> PatternElement {
        PatternElement::Placeable(Placeable {
            expression: Box::new(expression),
            span: None,
        })
    }

    fn message(elements: Vec<PatternElement>) -> Message {
        Message {
            id: Identifier::new("foo"),
            value: Some(Pattern {
                elements,
                span: None,
            }),
            attributes: vec![],
            comment: None,
            span: None,
        }
    }

    #[test]
    fn test_visitor_collects_references() {
        let msg = message(vec![
            placeable(Expression::MessageReference(MessageReference {
                id: Identifier::new("bar"),
                span: None,
            })),
            placeable(Expression::AttributeExpression(AttributeExpression {
                reference: EntryReference::Term(TermReference {
                    id: Identifier::new("brand"),
                    span: None,
                }),
                name: Identifier::new("gender"),
                span: None,
            })),
        ]);
        let mut visitor = CountReferences::default();
        visitor.visit_message(&msg);
        assert_eq!(visitor.messages, vec!["bar"]);
        assert_eq!(visitor.terms, vec!["brand"]);
    }

    struct Shout;

    impl Fold for Shout {
        fn fold_pattern_element(&mut self, node: PatternElement) -> PatternElement {
            match node {
                PatternElement::TextElement(text) => PatternElement::TextElement(TextElement {
                    value: text.value.to_uppercase(),
                    span: text.span,
                }),
                other => other,
            }
        }

        fn fold_identifier(&mut self, node: Identifier) -> Identifier {
            Identifier {
                name: format!("{}_x", node.name).into(),
                span: node.span,
            }
        }
    }

    #[test]
    fn test_fold_rewrites_postorder() {
        let msg = message(vec![PatternElement::TextElement(TextElement {
            value: "hello".to_string(),
            span: None,
        })]);
        let folded = msg.traverse(&mut Shout);
        assert_eq!(folded.id.name, "foo_x");
        let value = folded.value.unwrap();
        assert_eq!(
            value.elements[0],
            PatternElement::TextElement(TextElement {
                value: "HELLO".to_string(),
                span: None,
            })
        );
    }
}
