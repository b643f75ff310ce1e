//! Tree walking formatter.
//!
//! Every call walks the syntax tree of the message. Errors are collected
//! next to a best effort result; only the two expansion ceilings abort.
use crate::{
    context::{default_variant, term_value, Context},
    errors::{Exhausted, FluentError, FluentResult, ReferenceKind},
    escapers::{check_markup, escapers_compatible, incompatible, incompatible_fallback, Escaper},
    types::{match_variant_key, FluentArgs, FluentNone, FluentNumber, FluentValue},
};
use fluent_syntax::ast::*;
use std::ptr;

/// First strong isolate.
pub const FSI: char = '\u{2068}';
/// Pop directional isolate.
pub const PDI: char = '\u{2069}';

/// Output of a format call that was aborted.
pub const ABORTED: &str = "{???}";

/// Formats a pattern.
///
/// `id` is the key of the message or attribute owning the pattern, it picks
/// the escaper. A bare pattern has none.
pub fn resolve(
    ctx: &Context,
    pattern: &Pattern,
    id: Option<&str>,
    args: &FluentArgs,
) -> (String, Vec<FluentError>) {
    let mut resolver = Resolver::new(ctx);
    let escaper = id.and_then(|id| ctx.escaper_for(id));
    let scope = Scope {
        args,
        external: args,
        in_term: false,
        escaper,
        id,
    };

    match resolver.pattern(pattern, &scope) {
        Ok(value) => {
            let text = match value {
                FluentValue::Markup { text, .. } => text,
                other => other.format(&ctx.locale),
            };
            (text, resolver.errors)
        }
        Err(err) => {
            let mut errors = resolver.errors;
            errors.push(err);
            (ABORTED.to_string(), errors)
        }
    }
}

/// Bindings visible to an expression.
///
/// Copied, never mutated, when entering a message or term.
#[derive(Clone, Copy)]
struct Scope<'s> {
    /// External arguments, or the arguments of the term call.
    args: &'s FluentArgs,
    /// External arguments of the format call.
    external: &'s FluentArgs,
    in_term: bool,
    escaper: Option<&'s dyn Escaper>,
    /// Key of the entry being formatted.
    id: Option<&'s str>,
}

struct Resolver<'c> {
    ctx: &'c Context,
    /// Patterns being formatted, for cycle detection.
    active: Vec<*const Pattern>,
    part_count: usize,
    errors: Vec<FluentError>,
}

impl<'c> Resolver<'c> {
    fn new(ctx: &'c Context) -> Self {
        Self {
            ctx,
            active: Vec::new(),
            part_count: 0,
            errors: Vec::new(),
        }
    }

    #[inline]
    fn error(&mut self, err: impl Into<FluentError>) {
        self.errors.push(err.into());
    }

    fn pattern(&mut self, pattern: &Pattern, scope: &Scope) -> FluentResult<FluentValue> {
        let key = pattern as *const Pattern;
        if self.active.iter().any(|active| ptr::eq(*active, key)) {
            self.error(FluentError::cyclic(scope.id.unwrap_or("???")));
            return Ok(FluentValue::None(FluentNone::default()));
        }

        let ctx = self.ctx;
        let config = &ctx.config;
        let elements = pattern.elements.len();
        if elements > config.max_parts.saturating_sub(self.part_count) {
            return Err(Exhausted::TooManyParts {
                max: config.max_parts,
            }
            .into());
        }
        self.part_count += elements;

        let isolate = elements > 1 && ctx.use_isolating(scope.escaper);
        let mut parts = Vec::with_capacity(elements);

        self.active.push(key);
        for element in &pattern.elements {
            match element {
                PatternElement::TextElement(text) => match scope.escaper {
                    Some(escaper) => parts.push(escaper.mark_escaped(&text.value)),
                    None => parts.push(text.value.clone()),
                },
                PatternElement::Placeable(placeable) => {
                    let value = self.expression(&placeable.expression, scope)?;
                    let text = self.finish(value, scope.escaper);

                    let len = text.chars().count();
                    if len > config.max_part_length {
                        return Err(Exhausted::TooManyCharacters {
                            len,
                            max: config.max_part_length,
                        }
                        .into());
                    }

                    if isolate {
                        parts.push(mark(FSI, scope.escaper));
                        parts.push(text);
                        parts.push(mark(PDI, scope.escaper));
                    } else {
                        parts.push(text);
                    }
                }
            }
        }
        self.active.pop();

        Ok(match scope.escaper {
            Some(escaper) => FluentValue::Markup {
                escaper: escaper.name().into(),
                text: escaper.join(&parts),
            },
            None => FluentValue::String(parts.concat()),
        })
    }

    /// Text of a placeable value under the escaper.
    fn finish(&self, value: FluentValue, escaper: Option<&dyn Escaper>) -> String {
        match (escaper, value) {
            (None, value) => value.format(&self.ctx.locale),
            (Some(escaper), FluentValue::Markup { escaper: from, text })
                if from.as_str() == escaper.name() =>
            {
                text
            }
            (Some(escaper), value) => escaper.escape(&value.format(&self.ctx.locale)),
        }
    }

    fn expression(&mut self, expr: &Expression, scope: &Scope) -> FluentResult<FluentValue> {
        use Expression as E;

        match expr {
            E::StringLiteral(s) => Ok(FluentValue::String(s.value.clone())),
            E::NumberLiteral(n) => Ok(FluentValue::Number(FluentNumber::from_literal(n))),
            E::VariableReference(var) => Ok(self.variable(&var.id.name, scope)),
            E::MessageReference(r) => self.message(&r.id.name, None, scope),
            E::TermReference(r) => self.term(&r.id.name, None, FluentArgs::new(), scope),
            E::FunctionReference(r) => {
                self.error(FluentError::format_error(format!(
                    "Function {} must be called",
                    r.id.name
                )));
                Ok(FluentValue::None(FluentNone::new(format!("{}()", r.id.name))))
            }
            E::AttributeExpression(attr) => match &attr.reference {
                EntryReference::Message(r) => self.message(&r.id.name, Some(&attr.name.name), scope),
                EntryReference::Term(r) => {
                    self.term(&r.id.name, Some(&attr.name.name), FluentArgs::new(), scope)
                }
            },
            E::VariantExpression(expr) => self.variant(expr, scope),
            E::CallExpression(call) => self.call(call, scope),
            E::SelectExpression(select) => self.select(select, scope),
            E::Placeable(placeable) => self.expression(&placeable.expression, scope),
        }
    }

    fn variable(&mut self, name: &str, scope: &Scope) -> FluentValue {
        match scope.args.get(name) {
            Some(value) => match check_markup(value.clone(), name, scope.escaper) {
                Ok(value) => value,
                Err(err) => {
                    self.error(err);
                    FluentValue::None(FluentNone::new(name))
                }
            },
            None => {
                // Terms only see what the call passes them.
                if !scope.in_term {
                    self.error(ReferenceKind::External(name.to_string()));
                }
                FluentValue::None(FluentNone::new(name))
            }
        }
    }

    fn message(&mut self, id: &str, attr: Option<&str>, scope: &Scope) -> FluentResult<FluentValue> {
        let ctx = self.ctx;
        let message = match ctx.message(id) {
            Some(message) => message,
            None => {
                self.error(ReferenceKind::Message(id.to_string()));
                return Ok(FluentValue::None(FluentNone::new(id)));
            }
        };

        let attribute = attr.and_then(|name| message.get_attribute(name));
        if let (Some(name), None) = (attr, attribute) {
            self.error(ReferenceKind::Attribute {
                id: id.to_string(),
                name: name.to_string(),
            });
        }

        let (key, pattern) = match (attribute, &message.value) {
            (Some(attribute), _) => (format!("{}.{}", id, attribute.id.name), &attribute.value),
            (None, Some(value)) => (id.to_string(), value),
            (None, None) => {
                self.error(ReferenceKind::NoValue(id.to_string()));
                return Ok(FluentValue::None(FluentNone::new(id)));
            }
        };

        let escaper = ctx.escaper_for(&key);
        if !escapers_compatible(scope.escaper, escaper) {
            self.error(incompatible(&key, scope.escaper, escaper));
            return Ok(incompatible_fallback(&key));
        }

        let inner = Scope {
            args: scope.external,
            external: scope.external,
            in_term: false,
            escaper,
            id: Some(&key),
        };
        self.pattern(pattern, &inner)
    }

    fn term(
        &mut self,
        id: &str,
        attr: Option<&str>,
        args: FluentArgs,
        scope: &Scope,
    ) -> FluentResult<FluentValue> {
        let ctx = self.ctx;
        let term = match ctx.term(id) {
            Some(term) => term,
            None => {
                self.error(ReferenceKind::Term(format!("-{}", id)));
                return Ok(FluentValue::None(FluentNone::new(format!("-{}", id))));
            }
        };

        let attribute = attr.and_then(|name| term.get_attribute(name));
        if let (Some(name), None) = (attr, attribute) {
            self.error(ReferenceKind::Attribute {
                id: format!("-{}", id),
                name: name.to_string(),
            });
        }

        let (key, pattern) = match attribute {
            Some(attribute) => (format!("-{}.{}", id, attribute.id.name), &attribute.value),
            None => match term_value(term) {
                Some(pattern) => (format!("-{}", id), pattern),
                None => return Ok(FluentValue::None(FluentNone::new(format!("-{}", id)))),
            },
        };

        let inner = Scope {
            args: &args,
            in_term: true,
            id: Some(&key),
            ..*scope
        };
        self.pattern(pattern, &inner)
    }

    /// `-term[key]`
    fn variant(&mut self, expr: &VariantExpression, scope: &Scope) -> FluentResult<FluentValue> {
        let ctx = self.ctx;
        let id = &expr.reference.id.name;
        let term = match ctx.term(id) {
            Some(term) => term,
            None => {
                self.error(ReferenceKind::Term(format!("-{}", id)));
                return Ok(FluentValue::None(FluentNone::new(format!("-{}", id))));
            }
        };

        let unknown = || ReferenceKind::Variant {
            term: format!("-{}", id),
            key: expr.key.name().to_string(),
        };

        let pattern = match &term.value {
            Value::VariantList(list) => {
                let found = list
                    .variants
                    .iter()
                    .find(|variant| variant.key.name() == expr.key.name());
                match found.or_else(|| default_variant(&list.variants)) {
                    Some(variant) => {
                        if found.is_none() {
                            self.error(unknown());
                        }
                        &variant.value
                    }
                    None => {
                        self.error(unknown());
                        return Ok(FluentValue::None(FluentNone::new(format!("-{}", id))));
                    }
                }
            }
            Value::Pattern(pattern) => {
                self.error(unknown());
                pattern
            }
        };

        let args = FluentArgs::new();
        let key = format!("-{}", id);
        let inner = Scope {
            args: &args,
            in_term: true,
            id: Some(&key),
            ..*scope
        };
        self.pattern(pattern, &inner)
    }

    fn select(&mut self, select: &SelectExpression, scope: &Scope) -> FluentResult<FluentValue> {
        let selector = self.expression(&select.selector, scope)?;
        let locale = &self.ctx.locale;

        let variant = select
            .variants
            .iter()
            .find(|variant| match_variant_key(&selector, &variant.key, locale))
            .or_else(|| default_variant(&select.variants));

        match variant {
            Some(variant) => self.pattern(&variant.value, scope),
            None => Ok(FluentValue::None(FluentNone::default())),
        }
    }

    fn call(&mut self, call: &CallExpression, scope: &Scope) -> FluentResult<FluentValue> {
        match &call.callee {
            Callee::Function(func) => self.function(&func.id.name, call, scope),
            Callee::Term(r) => {
                let args = self.term_args(&r.id.name, call);
                self.term(&r.id.name, None, args, scope)
            }
            Callee::TermAttribute(attr) => {
                let id = match &attr.reference {
                    EntryReference::Term(r) => &r.id.name,
                    EntryReference::Message(r) => &r.id.name,
                };
                let args = self.term_args(id, call);
                self.term(id, Some(&attr.name.name), args, scope)
            }
        }
    }

    /// Only named arguments reach a term.
    fn term_args(&mut self, id: &str, call: &CallExpression) -> FluentArgs {
        if !call.positional.is_empty() {
            self.error(FluentError::format_error(format!(
                "Ignored positional arguments passed to term '-{}'",
                id
            )));
        }
        call.named
            .iter()
            .map(|arg| (arg.name.name.clone(), literal(&arg.value)))
            .collect()
    }

    fn function(&mut self, name: &str, call: &CallExpression, scope: &Scope) -> FluentResult<FluentValue> {
        let ctx = self.ctx;
        let function = match ctx.functions.get(name) {
            Some(function) => function,
            None => {
                self.error(ReferenceKind::Function(name.to_string()));
                return Ok(FluentValue::None(FluentNone::new(format!("{}()", name))));
            }
        };

        let mut positional = Vec::with_capacity(call.positional.len());
        for arg in &call.positional {
            positional.push(self.expression(arg, scope)?);
        }
        let named: FluentArgs = call
            .named
            .iter()
            .map(|arg| (arg.name.name.clone(), literal(&arg.value)))
            .collect();

        match function.call(name, &positional, &named) {
            Ok(value) => Ok(value),
            Err(err) => {
                self.error(err);
                Ok(FluentValue::None(FluentNone::new(format!("{}()", name))))
            }
        }
    }
}

fn literal(literal: &Literal) -> FluentValue {
    match literal {
        Literal::String(s) => FluentValue::String(s.value.clone()),
        Literal::Number(n) => FluentValue::Number(FluentNumber::from_literal(n)),
    }
}

/// Isolation mark, marked safe under an escaper.
fn mark(ch: char, escaper: Option<&dyn Escaper>) -> String {
    let mut buf = [0; 4];
    let text = ch.encode_utf8(&mut buf);
    match escaper {
        Some(escaper) => escaper.mark_escaped(text),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{builtins::FunctionTable, config::BundleConfig, locale::Locale};
    use fluent_syntax::parser::parse;

    fn context(source: &str, use_isolating: bool) -> Context {
        let config = BundleConfig {
            use_isolating,
            ..BundleConfig::default()
        };
        let mut ctx = Context::new(Locale::resolve(&["en-US"]), FunctionTable::new(), config);
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

    fn format(ctx: &Context, id: &str, args: &FluentArgs) -> (String, Vec<FluentError>) {
        let pattern = ctx.message(id).and_then(|m| m.value.as_ref()).unwrap();
        resolve(ctx, pattern, Some(id), args)
    }

    #[test]
    fn test_isolation() {
        let ctx = context("foo = Foo { $arg }\nbar = { $arg }\n", true);
        let args = FluentArgs::new().with("arg", "X");
        assert_eq!(format(&ctx, "foo", &args).0, "Foo \u{2068}X\u{2069}");
        assert_eq!(format(&ctx, "bar", &args).0, "X");
    }

    #[test]
    fn test_cycle() {
        let ctx = context("foo = { bar }\nbar = { foo }\n", false);
        let (text, errors) = format(&ctx, "foo", &FluentArgs::new());
        assert_eq!(text, "???");
        assert_eq!(errors, vec![FluentError::cyclic("foo")]);
    }

    #[test]
    fn test_term_cycle() {
        let ctx = context("-a = { -a }\nfoo = Foo { -a }\n", false);
        let (text, errors) = format(&ctx, "foo", &FluentArgs::new());
        assert_eq!(text, "Foo ???");
        assert_eq!(errors, vec![FluentError::cyclic("-a")]);
    }

    #[test]
    fn test_term_scope() {
        let ctx = context(
            "-thing = { $article } thing\nfoo = { -thing(article: \"the\") }\nbar = { -thing }\n",
            false,
        );
        let args = FluentArgs::new().with("article", "a");
        assert_eq!(format(&ctx, "foo", &args), ("the thing".to_string(), vec![]));
        assert_eq!(format(&ctx, "bar", &args), ("article thing".to_string(), vec![]));
    }

    #[test]
    fn test_too_many_characters() {
        let ctx = context("foo = { $arg }\n", false);
        let args = FluentArgs::new().with("arg", "x".repeat(2501));
        let (text, errors) = format(&ctx, "foo", &args);
        assert_eq!(text, ABORTED);
        assert_eq!(
            errors,
            vec![FluentError::from(Exhausted::TooManyCharacters { len: 2501, max: 2500 })]
        );
    }
}
