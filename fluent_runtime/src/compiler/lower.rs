//! Syntax tree to IR.
//!
//! Terms are inlined at the call site with their literal arguments bound
//! in place, so compiled terms never see external arguments. References to
//! messages become calls to the referenced message's function.
use super::{
    ir::{self, Block, EscaperRef, Expr, ExprType, Function, Name, Stmt},
    scope::{is_valid_identifier, Property, ScopeId, Scopes},
    simplify::simplify_expr,
};
use crate::{
    context::{default_variant, term_value, Context},
    errors::{FluentError, ReferenceKind},
    escapers::{escapers_compatible, incompatible, Escaper},
    locale::is_plural_category,
    resolver::{FSI, PDI},
    types::{match_variant_key, FluentNone, FluentNumber, FluentValue},
};
use fluent_syntax::ast::*;
use smol_str::SmolStr;
use std::collections::HashMap;

/// Names every generated function can rely on.
#[rustfmt::skip]
pub const RESERVED: &[&str] = &[
    "args", "errors", "locale", "format",
    "lookup_argument", "plural_category", "record_error",
];

/// Literal arguments of an inlined term call.
type TermArgs = [(SmolStr, Expr)];

#[derive(Clone, Copy)]
struct Env<'e> {
    scope: ScopeId,
    /// Set while inlining a term.
    term_args: Option<&'e TermArgs>,
}

pub struct Lowering<'a> {
    ctx: &'a Context,
    scopes: &'a mut Scopes,
    /// Function name of every message and attribute key.
    functions: &'a HashMap<String, String>,
    escaper: Option<EscaperRef>,
    scope: ScopeId,
    /// Argument locals, by owning scope and name.
    arguments: HashMap<(ScopeId, String), Name>,
    slots: usize,
    parts: usize,
    /// Depth of select branches being lowered.
    conditional: usize,
    errors: Vec<FluentError>,
    /// Keys of the terms being inlined, innermost last.
    inlining: Vec<String>,
}

impl<'a> Lowering<'a> {
    pub fn new(ctx: &'a Context, scopes: &'a mut Scopes, functions: &'a HashMap<String, String>) -> Self {
        let scope = scopes.child(scopes.root());
        Self {
            ctx,
            scopes,
            functions,
            escaper: None,
            scope,
            arguments: HashMap::new(),
            slots: 0,
            parts: 0,
            conditional: 0,
            errors: Vec::new(),
            inlining: Vec::new(),
        }
    }

    /// Lowers the pattern of a message or attribute.
    pub fn lower(mut self, name: &str, key: &str, pattern: &Pattern) -> Function {
        let ctx = self.ctx;
        self.escaper = ctx
            .escapers
            .iter()
            .position(|escaper| escaper.select(key))
            .map(|index| EscaperRef {
                index,
                name: ctx.escapers[index].name().into(),
            });

        let env = Env {
            scope: self.scope,
            term_args: None,
        };
        let mut body = Block::new(self.scope);
        let value = self.pattern(pattern, env, &mut body.stmts);
        body.stmts.push(Stmt::Return(value));

        Function {
            name: name.to_string(),
            key: key.to_string(),
            escaper: self.escaper,
            body,
            slots: self.slots,
            parts: self.parts,
            errors: self.errors,
        }
    }

    fn escaper_obj(&self) -> Option<&'a dyn Escaper> {
        let ctx = self.ctx;
        self.escaper
            .as_ref()
            .map(|escaper| ctx.escapers[escaper.index].as_ref())
    }

    /// Errors fire when the block runs, and are reported by `check_messages`.
    fn record(&mut self, block: &mut Vec<Stmt>, err: impl Into<FluentError>) {
        let err = err.into();
        self.errors.push(err.clone());
        block.push(Stmt::RecordError(err));
    }

    fn local(&mut self, scope: ScopeId, requested: &str, ty: ExprType, properties: Vec<Property>) -> Name {
        let mut properties = properties;
        properties.push(Property::ExprType(ty));
        let text = self.scopes.reserve_name(scope, requested, properties);
        let name = Name {
            text,
            slot: self.slots,
            ty,
        };
        self.slots += 1;
        name
    }

    fn assign(&mut self, scope: ScopeId, block: &mut Vec<Stmt>, name: &Name, value: Expr) {
        self.scopes.register_assignment(scope, &name.text);
        block.push(Stmt::Assign {
            name: name.clone(),
            value,
        });
    }

    fn text(&self, text: &str) -> Expr {
        match &self.escaper {
            Some(escaper) => Expr::MarkEscaped {
                escaper: escaper.clone(),
                text: text.to_string(),
            },
            None => Expr::String(text.to_string()),
        }
    }

    fn join(&self, parts: Vec<Expr>) -> Expr {
        match &self.escaper {
            Some(escaper) => Expr::EscaperJoin {
                escaper: escaper.clone(),
                parts,
            },
            None => Expr::StringJoin(parts),
        }
    }

    /// Placeable output, checked against the part length ceiling at runtime.
    fn finish(&self, expr: Expr) -> Expr {
        match &self.escaper {
            Some(escaper) => Expr::Escape {
                escaper: escaper.clone(),
                expr: Box::new(expr),
            },
            None => Expr::Format(Box::new(expr)),
        }
    }

    /// Patterns that always run are charged on entry to the function,
    /// patterns in a branch when the branch is taken.
    fn pattern(&mut self, pattern: &Pattern, env: Env, block: &mut Vec<Stmt>) -> Expr {
        let elements = pattern.elements.len();
        if self.conditional == 0 {
            self.parts += elements;
        } else if elements > 0 {
            block.push(Stmt::ChargeParts(elements));
        }
        let isolate = elements > 1 && self.ctx.use_isolating(self.escaper_obj());

        let mut parts = Vec::with_capacity(elements);
        for element in &pattern.elements {
            match element {
                PatternElement::TextElement(text) => parts.push(self.text(&text.value)),
                PatternElement::Placeable(placeable) => {
                    let expr = self.expression(&placeable.expression, env, block);
                    let expr = self.finish(expr);
                    if isolate {
                        parts.push(self.text(&FSI.to_string()));
                        parts.push(expr);
                        parts.push(self.text(&PDI.to_string()));
                    } else {
                        parts.push(expr);
                    }
                }
            }
        }
        self.join(parts)
    }

    fn expression(&mut self, expr: &Expression, env: Env, block: &mut Vec<Stmt>) -> Expr {
        use Expression as E;

        match expr {
            E::StringLiteral(s) => Expr::String(s.value.clone()),
            E::NumberLiteral(n) => Expr::Number(FluentNumber::from_literal(n)),
            E::VariableReference(var) => self.variable(&var.id.name, env, block),
            E::MessageReference(r) => self.message(&r.id.name, None, block),
            E::TermReference(r) => self.term(&r.id.name, None, &[], env, block),
            E::FunctionReference(r) => {
                self.record(
                    block,
                    FluentError::format_error(format!("Function {} must be called", r.id.name)),
                );
                Expr::NoneValue(Some(format!("{}()", r.id.name)))
            }
            E::AttributeExpression(attr) => match &attr.reference {
                EntryReference::Message(r) => self.message(&r.id.name, Some(&attr.name.name), block),
                EntryReference::Term(r) => self.term(&r.id.name, Some(&attr.name.name), &[], env, block),
            },
            E::VariantExpression(expr) => self.variant(expr, env, block),
            E::CallExpression(call) => self.call(call, env, block),
            E::SelectExpression(select) => self.select(select, env, block),
            E::Placeable(placeable) => self.expression(&placeable.expression, env, block),
        }
    }

    /// Arguments are looked up in the block that first needs them and
    /// reused by every block nested in it.
    fn variable(&mut self, name: &str, env: Env, block: &mut Vec<Stmt>) -> Expr {
        if let Some(args) = env.term_args {
            return args
                .iter()
                .find(|(key, _)| key.as_str() == name)
                .map(|(_, value)| value.clone())
                .unwrap_or_else(|| Expr::NoneValue(Some(name.to_string())));
        }

        let scope = env.scope;
        let wanted = Property::ExternalArg(name.into());
        let scopes = &*self.scopes;
        let bound = scopes
            .find_names_by_property(scope, |p| *p == wanted)
            .into_iter()
            .filter(|text| scopes.has_assignment(scope, text))
            .find_map(|text| {
                let owner = scopes.owner(scope, text)?;
                self.arguments.get(&(owner, text.to_string())).cloned()
            });
        if let Some(found) = bound {
            return Expr::Name(found);
        }

        let local = self.local(
            scope,
            &format!("arg_{}", name),
            ExprType::Unknown,
            vec![Property::ExternalArg(name.into())],
        );
        self.scopes.register_assignment(scope, &local.text);
        self.arguments.insert((scope, local.text.clone()), local.clone());
        block.push(Stmt::TryLookup {
            name: local.clone(),
            arg: name.into(),
            escaper: self.escaper.clone(),
        });
        Expr::Name(local)
    }

    fn message(&mut self, id: &str, attr: Option<&str>, block: &mut Vec<Stmt>) -> Expr {
        let ctx = self.ctx;
        let message = match ctx.message(id) {
            Some(message) => message,
            None => {
                self.record(block, ReferenceKind::Message(id.to_string()));
                return Expr::NoneValue(Some(id.to_string()));
            }
        };

        let attribute = attr.and_then(|name| message.get_attribute(name));
        if let (Some(name), None) = (attr, attribute) {
            self.record(
                block,
                ReferenceKind::Attribute {
                    id: id.to_string(),
                    name: name.to_string(),
                },
            );
        }

        let key = match (attribute, &message.value) {
            (Some(attribute), _) => format!("{}.{}", id, attribute.id.name),
            (None, Some(_)) => id.to_string(),
            (None, None) => {
                self.record(block, ReferenceKind::NoValue(id.to_string()));
                return Expr::NoneValue(Some(id.to_string()));
            }
        };

        let outer = self.escaper_obj();
        let inner = ctx.escaper_for(&key);
        if !escapers_compatible(outer, inner) {
            let err = incompatible(&key, outer, inner);
            self.record(block, err);
            return Expr::NoneValue(Some(key));
        }

        match self.functions.get(&key) {
            Some(function) => Expr::MessageCall {
                function: function.clone(),
                ty: if inner.is_some() {
                    ExprType::Escaped
                } else {
                    ExprType::Text
                },
                key,
            },
            None => Expr::NoneValue(Some(key)),
        }
    }

    fn term(&mut self, id: &str, attr: Option<&str>, args: &TermArgs, env: Env, block: &mut Vec<Stmt>) -> Expr {
        let ctx = self.ctx;
        let term = match ctx.term(id) {
            Some(term) => term,
            None => {
                self.record(block, ReferenceKind::Term(format!("-{}", id)));
                return Expr::NoneValue(Some(format!("-{}", id)));
            }
        };

        let attribute = attr.and_then(|name| term.get_attribute(name));
        if let (Some(name), None) = (attr, attribute) {
            self.record(
                block,
                ReferenceKind::Attribute {
                    id: format!("-{}", id),
                    name: name.to_string(),
                },
            );
        }

        let (key, pattern) = match attribute {
            Some(attribute) => (format!("-{}.{}", id, attribute.id.name), &attribute.value),
            None => match term_value(term) {
                Some(pattern) => (format!("-{}", id), pattern),
                None => return Expr::NoneValue(Some(format!("-{}", id))),
            },
        };
        self.inline(&key, pattern, args, env, block)
    }

    fn inline(&mut self, key: &str, pattern: &Pattern, args: &TermArgs, env: Env, block: &mut Vec<Stmt>) -> Expr {
        if self.inlining.iter().any(|active| active == key) {
            self.record(block, FluentError::cyclic(key));
            return Expr::NoneValue(None);
        }

        self.inlining.push(key.to_string());
        let inner = Env {
            scope: env.scope,
            term_args: Some(args),
        };
        let expr = self.pattern(pattern, inner, block);
        self.inlining.pop();
        expr
    }

    /// `-term[key]`
    fn variant(&mut self, expr: &VariantExpression, env: Env, block: &mut Vec<Stmt>) -> Expr {
        let ctx = self.ctx;
        let id = &expr.reference.id.name;
        let term = match ctx.term(id) {
            Some(term) => term,
            None => {
                self.record(block, ReferenceKind::Term(format!("-{}", id)));
                return Expr::NoneValue(Some(format!("-{}", id)));
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
                            self.record(block, unknown());
                        }
                        &variant.value
                    }
                    None => {
                        self.record(block, unknown());
                        return Expr::NoneValue(Some(format!("-{}", id)));
                    }
                }
            }
            Value::Pattern(pattern) => {
                self.record(block, unknown());
                pattern
            }
        };

        self.inline(&format!("-{}", id), pattern, &[], env, block)
    }

    fn select(&mut self, select: &SelectExpression, env: Env, block: &mut Vec<Stmt>) -> Expr {
        let selector = simplify_expr(self.expression(&select.selector, env, block));

        // Pick the variant now when the selector is known.
        if let Some(value) = static_value(&selector) {
            let locale = &self.ctx.locale;
            let variant = select
                .variants
                .iter()
                .find(|variant| match_variant_key(&value, &variant.key, locale))
                .or_else(|| default_variant(&select.variants));
            return match variant {
                Some(variant) => self.pattern(&variant.value, env, block),
                None => Expr::NoneValue(None),
            };
        }

        let scope = env.scope;
        let key = self.local(scope, "_key", selector.ty(), vec![]);
        self.assign(scope, block, &key, selector);

        let needs_plural = key.ty != ExprType::Text
            && select.variants.iter().any(|variant| match &variant.key {
                VariantKey::Identifier(id) => is_plural_category(&id.name),
                VariantKey::NumberLiteral(_) => false,
            });
        let plural = if needs_plural {
            let plural = self.local(scope, "_plural_form", ExprType::Text, vec![]);
            let value = Expr::FunctionCall {
                callee: ir::Callee::PluralCategory,
                args: vec![Expr::Name(key.clone())],
                kwargs: vec![],
                splat: false,
                ty: ExprType::Text,
            };
            self.assign(scope, block, &plural, value);
            Some(plural)
        } else {
            None
        };

        let ret_ty = if self.escaper.is_some() {
            ExprType::Escaped
        } else {
            ExprType::Text
        };
        let ret = self.local(scope, "_ret", ret_ty, vec![]);

        let last = select.variants.len().saturating_sub(1);
        let mut branches = Vec::with_capacity(select.variants.len());
        let mut else_block = None;
        for (index, variant) in select.variants.iter().enumerate() {
            let child = self.scopes.child(scope);
            let mut stmts = Vec::new();
            let inner = Env { scope: child, ..env };
            self.conditional += 1;
            let value = self.pattern(&variant.value, inner, &mut stmts);
            self.conditional -= 1;
            self.assign(child, &mut stmts, &ret, value);
            let branch = Block { scope: child, stmts };

            if variant.default {
                // Earlier keys still win over a default that is not last.
                if index != last {
                    branches.push((condition(&key, plural.as_ref(), &variant.key), branch.clone()));
                }
                else_block = Some(branch);
            } else {
                branches.push((condition(&key, plural.as_ref(), &variant.key), branch));
            }
        }

        let else_block = match else_block {
            Some(block) => block,
            None => {
                let child = self.scopes.child(scope);
                let mut stmts = Vec::new();
                self.assign(child, &mut stmts, &ret, Expr::NoneValue(None));
                Block { scope: child, stmts }
            }
        };
        block.push(Stmt::If { branches, else_block });
        Expr::Name(ret)
    }

    fn call(&mut self, call: &CallExpression, env: Env, block: &mut Vec<Stmt>) -> Expr {
        match &call.callee {
            Callee::Function(func) => self.function(&func.id.name, call, env, block),
            Callee::Term(r) => {
                let args = self.term_args(&r.id.name, call, block);
                self.term(&r.id.name, None, &args, env, block)
            }
            Callee::TermAttribute(attr) => {
                let id = match &attr.reference {
                    EntryReference::Term(r) => &r.id.name,
                    EntryReference::Message(r) => &r.id.name,
                };
                let args = self.term_args(id, call, block);
                self.term(id, Some(&attr.name.name), &args, env, block)
            }
        }
    }

    fn term_args(&mut self, id: &str, call: &CallExpression, block: &mut Vec<Stmt>) -> Vec<(SmolStr, Expr)> {
        if !call.positional.is_empty() {
            self.record(
                block,
                FluentError::format_error(format!("Ignored positional arguments passed to term '-{}'", id)),
            );
        }
        call.named
            .iter()
            .map(|arg| (arg.name.name.clone(), literal(&arg.value)))
            .collect()
    }

    fn function(&mut self, name: &str, call: &CallExpression, env: Env, block: &mut Vec<Stmt>) -> Expr {
        let ctx = self.ctx;
        let function = match ctx.functions.get(name) {
            Some(function) => function,
            None => {
                self.record(block, ReferenceKind::Function(name.to_string()));
                return Expr::NoneValue(Some(format!("{}()", name)));
            }
        };

        // Arity and keywords are known now, the values are not.
        let keywords = call.named.iter().map(|arg| arg.name.name.as_str());
        if let Err(err) = function.spec.check(name, call.positional.len(), keywords) {
            self.record(block, err);
            return Expr::NoneValue(Some(format!("{}()", name)));
        }

        let mut args = Vec::with_capacity(call.positional.len());
        for arg in &call.positional {
            args.push(self.expression(arg, env, block));
        }
        let kwargs: Vec<(SmolStr, Expr)> = call
            .named
            .iter()
            .map(|arg| (arg.name.name.clone(), literal(&arg.value)))
            .collect();
        let splat = kwargs.iter().any(|(key, _)| !is_valid_identifier(key));

        let builtin = function.is_builtin();
        let ty = match (builtin, name) {
            (true, "NUMBER") => ExprType::Number,
            (true, "DATETIME") => ExprType::DateTime,
            _ => ExprType::Unknown,
        };

        Expr::FunctionCall {
            callee: ir::Callee::Function {
                name: name.into(),
                builtin,
            },
            args,
            kwargs,
            splat,
            ty,
        }
    }
}

/// Function for a message caught in a reference cycle.
pub fn cyclic_stub(scopes: &mut Scopes, name: &str, key: &str) -> Function {
    let scope = scopes.child(scopes.root());
    Function {
        name: name.to_string(),
        key: key.to_string(),
        escaper: None,
        body: Block {
            scope,
            stmts: vec![
                Stmt::RecordError(FluentError::cyclic(key)),
                Stmt::Return(Expr::NoneValue(None)),
            ],
        },
        slots: 0,
        parts: 0,
        errors: vec![FluentError::cyclic(key)],
    }
}

fn condition(key: &Name, plural: Option<&Name>, variant: &VariantKey) -> Expr {
    let equals = |name: &Name, value: Expr| Expr::Equals(Box::new(Expr::Name(name.clone())), Box::new(value));

    match variant {
        VariantKey::NumberLiteral(n) => equals(key, Expr::Number(FluentNumber::from_literal(n))),
        VariantKey::Identifier(id) => {
            let exact = equals(key, Expr::String(id.name.to_string()));
            match plural {
                Some(plural) if is_plural_category(&id.name) => {
                    Expr::Or(vec![exact, equals(plural, Expr::String(id.name.to_string()))])
                }
                _ => exact,
            }
        }
    }
}

fn static_value(expr: &Expr) -> Option<FluentValue> {
    match expr {
        Expr::String(s) => Some(FluentValue::String(s.clone())),
        Expr::Number(n) => Some(FluentValue::Number(n.clone())),
        Expr::NoneValue(name) => Some(FluentValue::None(FluentNone { name: name.clone() })),
        _ => None,
    }
}

fn literal(literal: &Literal) -> Expr {
    match literal {
        Literal::String(s) => Expr::String(s.value.clone()),
        Literal::Number(n) => Expr::Number(FluentNumber::from_literal(n)),
    }
}
