//! Ahead of time compilation of a whole bundle.
//!
//! Every message and attribute is lowered to a small IR, simplified, and
//! turned into a tree of closures. Compiled messages produce the same text
//! and error kinds as the resolver. A missing argument is reported once per
//! message rather than once per use, and reference cycles are detected
//! across all branches.
mod cycles;
mod finalize;
pub mod ir;
mod lower;
pub mod scope;
mod simplify;

pub use self::finalize::State;

use self::{
    cycles::CycleChecker,
    finalize::{finalize, run, Flow, Frame, StmtFn},
    ir::{ExprType, Function},
    lower::{cyclic_stub, Lowering, RESERVED},
    scope::{Property, Scopes},
    simplify::simplify,
};
use crate::{
    context::Context,
    errors::{FluentError, FluentResult},
    types::{FluentArgs, FluentValue},
};
use fluent_syntax::ast::Pattern;
use itertools::Itertools;
use std::{collections::HashMap, fmt};

/// Compiled messages of a bundle, by key.
#[derive(Debug, Default)]
pub struct Program {
    messages: HashMap<String, CompiledMessage>,
}

impl Program {
    /// Message by `id` or attribute by `id.attr`.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&CompiledMessage> {
        self.messages.get(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Keys in a stable order.
    pub fn keys(&self) -> Vec<&str> {
        self.messages.keys().map(String::as_str).sorted_unstable().collect()
    }
}

pub struct CompiledMessage {
    pub key: String,
    /// Name of the generated function.
    pub name: String,
    /// Pattern elements charged when the message is called.
    pub parts: usize,
    pub slots: usize,
    /// Errors found while compiling.
    pub errors: Vec<FluentError>,
    source: String,
    body: Vec<StmtFn>,
}

impl CompiledMessage {
    /// Pseudo code of the simplified function.
    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Runs the message, charging its parts against the shared budget.
    pub(crate) fn call(
        &self,
        program: &Program,
        ctx: &Context,
        args: &FluentArgs,
        state: &mut State,
    ) -> FluentResult<FluentValue> {
        state.charge(self.parts, ctx.config.max_parts)?;

        let mut frame = Frame {
            program,
            ctx,
            args,
            locals: Vec::with_capacity(self.slots),
            state,
        };
        match run(&self.body, &mut frame)? {
            Flow::Return(value) => Ok(value),
            Flow::Next => Ok(FluentValue::String(String::new())),
        }
    }
}

impl fmt::Debug for CompiledMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CompiledMessage")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("parts", &self.parts)
            .field("slots", &self.slots)
            .field("errors", &self.errors)
            .finish()
    }
}

/// Compiles every message and attribute in the registry.
pub fn compile_messages(ctx: &Context) -> Program {
    let functions = lower_messages(ctx);
    let messages = functions
        .iter()
        .map(|function| (function.key.clone(), finalize(function, ctx)))
        .collect::<HashMap<_, _>>();
    log::debug!("compiled {} messages and attributes", messages.len());
    Program { messages }
}

/// Lowers and simplifies every message and attribute.
pub fn lower_messages(ctx: &Context) -> Vec<Function> {
    let mut scopes = Scopes::new();
    let root = scopes.root();
    for name in RESERVED {
        scopes.reserve_exact(root, name);
    }

    let mut entries: Vec<(String, &Pattern)> = Vec::new();
    for id in ctx.message_ids() {
        if let Some(message) = ctx.message(id) {
            if let Some(value) = &message.value {
                entries.push((id.to_string(), value));
            }
            for attribute in &message.attributes {
                entries.push((format!("{}.{}", id, attribute.id.name), &attribute.value));
            }
        }
    }

    // Names first, so messages can call each other in any order.
    let mut names = HashMap::with_capacity(entries.len());
    for (key, _) in &entries {
        let ty = match ctx.escaper_for(key) {
            Some(_) => ExprType::Escaped,
            None => ExprType::Text,
        };
        let name = scopes.reserve_name(root, key, vec![Property::ReturnType(ty)]);
        names.insert(key.clone(), name);
    }

    let mut checker = CycleChecker::new(ctx);
    let mut functions = Vec::with_capacity(entries.len());
    for (key, pattern) in &entries {
        let name = names.get(key).cloned().unwrap_or_default();
        let mut function = if checker.is_cyclic(key) {
            log::debug!("{} is part of a reference cycle", key);
            cyclic_stub(&mut scopes, &name, key)
        } else {
            Lowering::new(ctx, &mut scopes, &names).lower(&name, key, pattern)
        };
        simplify(&mut function);
        log::trace!("{}", function);
        functions.push(function);
    }
    functions
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{builtins::FunctionTable, config::BundleConfig, locale::Locale};
    use fluent_syntax::{ast::Entry, parser::parse};

    fn context(source: &str) -> Context {
        let config = BundleConfig {
            use_isolating: false,
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

    fn format(ctx: &Context, program: &Program, key: &str, args: &FluentArgs) -> (String, Vec<FluentError>) {
        let mut state = State::default();
        let value = program.get(key).unwrap().call(program, ctx, args, &mut state).unwrap();
        (value.format(&ctx.locale), state.errors)
    }

    #[test]
    fn test_function_names() {
        let ctx = context("args = A\nfoo = F\n    .attr = Attr\nfoo_attr = G\n");
        let program = compile_messages(&ctx);
        assert_eq!(program.keys(), vec!["args", "foo", "foo.attr", "foo_attr"]);
        assert_eq!(program.get("args").unwrap().name, "args2");
        assert_eq!(program.get("foo.attr").unwrap().name, "foo_attr");
        assert_eq!(program.get("foo_attr").unwrap().name, "foo_attr2");
    }

    #[test]
    fn test_static_message() {
        let ctx = context("foo = Foo\nbar = { foo } Bar\n");
        let program = compile_messages(&ctx);
        assert_eq!(program.get("foo").unwrap().source(), "fn foo(args, errors) {\n    return \"Foo\";\n}");
        assert_eq!(format(&ctx, &program, "bar", &FluentArgs::new()), ("Foo Bar".to_string(), vec![]));
    }

    #[test]
    fn test_static_select() {
        let ctx = context("foo = { 1 ->\n    [one] One\n   *[other] Other\n}\n");
        let program = compile_messages(&ctx);
        let source = program.get("foo").unwrap().source();
        assert!(!source.contains("if "));
        assert_eq!(format(&ctx, &program, "foo", &FluentArgs::new()).0, "One");
    }

    #[test]
    fn test_runtime_select() {
        let ctx = context("foo = { $n ->\n    [0] Zero\n    [one] One\n   *[other] { $n } items\n}\n");
        let program = compile_messages(&ctx);
        let format_n = |n: f64| format(&ctx, &program, "foo", &FluentArgs::new().with("n", n)).0;
        assert_eq!(format_n(0.0), "Zero");
        assert_eq!(format_n(1.0), "One");
        assert_eq!(format_n(5.0), "5 items");

        let (text, errors) = format(&ctx, &program, "foo", &FluentArgs::new());
        assert_eq!(text, "n items");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_cycle_stub() {
        let ctx = context("foo = { bar }\nbar = { foo }\n");
        let program = compile_messages(&ctx);
        assert_eq!(
            format(&ctx, &program, "foo", &FluentArgs::new()),
            ("???".to_string(), vec![FluentError::cyclic("foo")])
        );
    }
}
