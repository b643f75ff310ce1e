//! Reference cycle detection over the whole registry.
//!
//! Every reference is followed, select branches included, so two messages
//! referring to each other from branches that can never both be taken are
//! still reported.
use crate::context::Context;
use fluent_syntax::{
    ast::*,
    visitor::{walk_pattern, Visitor},
};
use std::collections::HashSet;

/// Finds entries that can reach themselves.
pub struct CycleChecker<'c> {
    ctx: &'c Context,
    /// Key being checked.
    target: String,
    visited: HashSet<String>,
    found: bool,
}

impl<'c> CycleChecker<'c> {
    pub fn new(ctx: &'c Context) -> Self {
        Self {
            ctx,
            target: String::new(),
            visited: HashSet::new(),
            found: false,
        }
    }

    /// Whether formatting `key` can lead back to `key`.
    ///
    /// Keys are `id` and `id.attr` for messages, `-id` and `-id.attr`
    /// for terms. Entries that only reach a cycle elsewhere are not cyclic
    /// themselves.
    pub fn is_cyclic(&mut self, key: &str) -> bool {
        self.target = self.canonical(key);
        self.visited.clear();
        self.found = false;
        let target = self.target.clone();
        self.visit_entry(&target);
        self.found
    }

    /// A missing attribute falls back to the entry's value.
    fn canonical(&self, key: &str) -> String {
        let (id, attr) = match key.split_once('.') {
            Some((id, attr)) => (id, attr),
            None => return key.to_string(),
        };
        let exists = match id.strip_prefix('-') {
            Some(term_id) => self
                .ctx
                .term(term_id)
                .map_or(false, |term| term.get_attribute(attr).is_some()),
            None => self
                .ctx
                .message(id)
                .map_or(false, |message| message.get_attribute(attr).is_some()),
        };
        if exists {
            key.to_string()
        } else {
            id.to_string()
        }
    }

    fn visit_key(&mut self, key: &str) {
        if self.found {
            return;
        }

        let key = self.canonical(key);
        if key == self.target {
            log::debug!("reference cycle through {}", key);
            self.found = true;
            return;
        }

        if self.visited.insert(key.clone()) {
            self.visit_entry(&key);
        }
    }

    fn visit_entry(&mut self, key: &str) {
        let ctx = self.ctx;
        let (id, attr) = match key.split_once('.') {
            Some((id, attr)) => (id, Some(attr)),
            None => (key, None),
        };

        match id.strip_prefix('-') {
            Some(term_id) => {
                if let Some(term) = ctx.term(term_id) {
                    match attr.and_then(|name| term.get_attribute(name)) {
                        Some(attribute) => self.visit_pattern(&attribute.value),
                        None => match &term.value {
                            Value::Pattern(pattern) => self.visit_pattern(pattern),
                            Value::VariantList(list) => self.visit_variant_list(list),
                        },
                    }
                }
            }
            None => {
                if let Some(message) = ctx.message(id) {
                    match attr.and_then(|name| message.get_attribute(name)) {
                        Some(attribute) => self.visit_pattern(&attribute.value),
                        None => {
                            if let Some(value) = &message.value {
                                self.visit_pattern(value)
                            }
                        }
                    }
                }
            }
        }
    }
}

impl<'c> Visitor for CycleChecker<'c> {
    fn visit_pattern(&mut self, node: &Pattern) {
        if !self.found {
            walk_pattern(self, node)
        }
    }

    fn visit_message_reference(&mut self, node: &MessageReference) {
        self.visit_key(&node.id.name)
    }

    fn visit_term_reference(&mut self, node: &TermReference) {
        self.visit_key(&format!("-{}", node.id.name))
    }

    fn visit_attribute_expression(&mut self, node: &AttributeExpression) {
        self.visit_key(&format!("{}.{}", node.reference.key(), node.name.name))
    }

    fn visit_variant_expression(&mut self, node: &VariantExpression) {
        self.visit_term_reference(&node.reference)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{builtins::FunctionTable, config::BundleConfig, locale::Locale};
    use fluent_syntax::parser::parse;

    fn context(source: &str) -> Context {
        let mut ctx = Context::new(
            Locale::resolve(&["en"]),
            FunctionTable::new(),
            BundleConfig::default(),
        );
        for entry in parse(source).body {
            match entry {
                Entry::Message(m) => {
                    ctx.messages.insert(m.id.name.clone(), m);
                }
                Entry::Term(t) => {
                    ctx.terms.insert(t.id.name.clone(), t);
                }
                _ => {}
            }
        }
        ctx
    }

    #[test]
    fn test_direct_cycle() {
        let ctx = context("foo = { bar }\nbar = { foo }\nbaz = Baz { bar }\nok = { other }\nother = Other\n");
        let mut checker = CycleChecker::new(&ctx);
        assert!(checker.is_cyclic("foo"));
        assert!(checker.is_cyclic("bar"));
        // Reaching a cycle is not being part of one.
        assert!(!checker.is_cyclic("baz"));
        assert!(!checker.is_cyclic("ok"));
        assert!(!checker.is_cyclic("other"));
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let ctx = context("top = { left } { right }\nleft = { bottom }\nright = { bottom }\nbottom = B\n");
        let mut checker = CycleChecker::new(&ctx);
        assert!(!checker.is_cyclic("top"));
    }

    #[test]
    fn test_term_loops_are_left_to_inlining() {
        let ctx = context("-a = { -b }\n-b = { -a }\nfoo = Foo { -a }\n");
        let mut checker = CycleChecker::new(&ctx);
        assert!(!checker.is_cyclic("foo"));
        assert!(checker.is_cyclic("-a"));
    }

    #[test]
    fn test_through_terms_and_attributes() {
        let ctx = context(
            "foo = { -term }\n-term = { foo.attr }\n    .x = X\nbar = { -term.x ->\n   *[X] Bar\n}\n",
        );
        let mut checker = CycleChecker::new(&ctx);
        // foo.attr does not exist, so it falls back to foo's value.
        assert!(checker.is_cyclic("foo"));
        assert!(!checker.is_cyclic("bar"));
    }

    #[test]
    fn test_exclusive_branches_are_flagged() {
        let ctx = context(
            "a = { $x ->\n    [one] { b }\n   *[other] A\n}\nb = { $x ->\n    [one] B\n   *[other] { a }\n}\n",
        );
        let mut checker = CycleChecker::new(&ctx);
        assert!(checker.is_cyclic("a"));
    }
}
