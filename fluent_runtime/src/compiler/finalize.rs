//! IR to closures.
//!
//! Each node becomes a boxed closure over a `Frame`. Escapers and functions
//! are looked up once, here, and captured by the closures.
use super::{
    ir::{Block, Callee, Expr, Function, Stmt},
    CompiledMessage, Program,
};
use crate::{
    context::Context,
    errors::{Exhausted, FluentError, FluentResult, ReferenceKind},
    escapers::{check_markup, Escaper},
    types::{FluentArgs, FluentNone, FluentValue},
};
use smol_str::SmolStr;
use std::sync::Arc;

type ValueFn = Box<dyn Fn(&mut Frame) -> FluentResult<FluentValue> + Send + Sync>;
type CondFn = Box<dyn Fn(&mut Frame) -> FluentResult<bool> + Send + Sync>;
pub(crate) type StmtFn = Box<dyn Fn(&mut Frame) -> FluentResult<Flow> + Send + Sync>;

pub(crate) enum Flow {
    Next,
    Return(FluentValue),
}

/// State shared by every message a format call reaches.
#[derive(Debug, Default)]
pub struct State {
    pub errors: Vec<FluentError>,
    pub part_count: usize,
}

impl State {
    /// Adds pattern elements to the count, failing past `max`.
    pub fn charge(&mut self, parts: usize, max: usize) -> FluentResult<()> {
        if parts > max.saturating_sub(self.part_count) {
            return Err(Exhausted::TooManyParts { max }.into());
        }
        self.part_count += parts;
        Ok(())
    }
}

/// Locals of one running message.
pub(crate) struct Frame<'a> {
    pub program: &'a Program,
    pub ctx: &'a Context,
    pub args: &'a FluentArgs,
    pub locals: Vec<FluentValue>,
    pub state: &'a mut State,
}

impl<'a> Frame<'a> {
    fn local(&self, slot: usize) -> FluentValue {
        self.locals
            .get(slot)
            .cloned()
            .unwrap_or_else(|| FluentValue::None(FluentNone::default()))
    }

    fn set_local(&mut self, slot: usize, value: FluentValue) {
        if slot >= self.locals.len() {
            self.locals
                .resize(slot + 1, FluentValue::None(FluentNone::default()));
        }
        self.locals[slot] = value;
    }

    fn check_length(&self, text: &str) -> FluentResult<()> {
        let max = self.ctx.config.max_part_length;
        let len = text.chars().count();
        if len > max {
            return Err(Exhausted::TooManyCharacters { len, max }.into());
        }
        Ok(())
    }
}

/// Runs statements until one returns.
pub(crate) fn run(stmts: &[StmtFn], frame: &mut Frame) -> FluentResult<Flow> {
    for stmt in stmts {
        if let Flow::Return(value) = stmt(frame)? {
            return Ok(Flow::Return(value));
        }
    }
    Ok(Flow::Next)
}

pub fn finalize(function: &Function, ctx: &Context) -> CompiledMessage {
    let body = block(&function.body, ctx);

    CompiledMessage {
        key: function.key.clone(),
        name: function.name.clone(),
        parts: function.parts,
        slots: function.slots,
        errors: function.errors.clone(),
        source: function.to_string(),
        body,
    }
}

fn escaper(ctx: &Context, index: usize) -> Option<Arc<dyn Escaper>> {
    ctx.escapers.get(index).cloned()
}

fn block(block: &Block, ctx: &Context) -> Vec<StmtFn> {
    block.stmts.iter().map(|s| stmt(s, ctx)).collect()
}

fn stmt(stmt: &Stmt, ctx: &Context) -> StmtFn {
    match stmt {
        Stmt::Assign { name, value } => {
            let slot = name.slot;
            let value = expr(value, ctx);
            Box::new(move |frame: &mut Frame| {
                let value = value(frame)?;
                frame.set_local(slot, value);
                Ok(Flow::Next)
            })
        }
        Stmt::If {
            branches,
            else_block,
        } => {
            let branches: Vec<(CondFn, Vec<StmtFn>)> = branches
                .iter()
                .map(|(c, b)| (cond(c, ctx), block(b, ctx)))
                .collect();
            let otherwise = block(else_block, ctx);
            Box::new(move |frame: &mut Frame| {
                for (test, body) in &branches {
                    if test(frame)? {
                        return run(body, frame);
                    }
                }
                run(&otherwise, frame)
            })
        }
        Stmt::TryLookup { name, arg, escaper: e } => {
            let slot = name.slot;
            let arg = arg.clone();
            let esc = e.as_ref().and_then(|e| escaper(ctx, e.index));
            Box::new(move |frame: &mut Frame| {
                let value = match frame.args.get(&arg) {
                    Some(value) => match check_markup(value.clone(), &arg, esc.as_deref()) {
                        Ok(value) => value,
                        Err(err) => {
                            frame.state.errors.push(err);
                            FluentValue::None(FluentNone::new(arg.as_str()))
                        }
                    },
                    None => {
                        frame
                            .state
                            .errors
                            .push(ReferenceKind::External(arg.to_string()).into());
                        FluentValue::None(FluentNone::new(arg.as_str()))
                    }
                };
                frame.set_local(slot, value);
                Ok(Flow::Next)
            })
        }
        Stmt::Return(value) => {
            let value = expr(value, ctx);
            Box::new(move |frame: &mut Frame| Ok(Flow::Return(value(frame)?)))
        }
        Stmt::RecordError(err) => {
            let err = err.clone();
            Box::new(move |frame: &mut Frame| {
                frame.state.errors.push(err.clone());
                Ok(Flow::Next)
            })
        }
        Stmt::ChargeParts(count) => {
            let count = *count;
            Box::new(move |frame: &mut Frame| {
                let max = frame.ctx.config.max_parts;
                frame.state.charge(count, max)?;
                Ok(Flow::Next)
            })
        }
    }
}

fn cond(e: &Expr, ctx: &Context) -> CondFn {
    match e {
        Expr::Equals(a, b) => {
            let a = expr(a, ctx);
            let b = expr(b, ctx);
            Box::new(move |frame: &mut Frame| {
                let a = a(frame)?;
                let b = b(frame)?;
                Ok(a.matches(&b))
            })
        }
        Expr::Or(parts) => {
            let parts: Vec<CondFn> = parts.iter().map(|p| cond(p, ctx)).collect();
            Box::new(move |frame: &mut Frame| {
                for part in &parts {
                    if part(frame)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            })
        }
        // Values are never conditions on their own.
        _ => Box::new(|_: &mut Frame| Ok(false)),
    }
}

fn constant(value: FluentValue) -> ValueFn {
    Box::new(move |_: &mut Frame| Ok(value.clone()))
}

fn text_of(value: FluentValue, frame: &Frame) -> String {
    match value {
        FluentValue::Markup { text, .. } => text,
        other => other.format(&frame.ctx.locale),
    }
}

fn expr(e: &Expr, ctx: &Context) -> ValueFn {
    use Expr as E;

    match e {
        E::String(s) => constant(FluentValue::String(s.clone())),
        E::Number(n) => constant(FluentValue::Number(n.clone())),
        E::NoneValue(name) => constant(FluentValue::None(FluentNone { name: name.clone() })),
        E::Name(name) => {
            let slot = name.slot;
            Box::new(move |frame: &mut Frame| Ok(frame.local(slot)))
        }

        E::FunctionCall {
            callee: Callee::PluralCategory,
            args,
            ..
        } => {
            let arg = match args.first() {
                Some(arg) => expr(arg, ctx),
                None => return constant(FluentValue::None(FluentNone::default())),
            };
            Box::new(move |frame: &mut Frame| {
                let value = arg(frame)?;
                let category = value
                    .as_number()
                    .and_then(|n| frame.ctx.locale.plural_category(&n.plural_operand()));
                Ok(match category {
                    Some(category) => FluentValue::String(category.to_string()),
                    None => FluentValue::None(FluentNone::default()),
                })
            })
        }

        E::FunctionCall {
            callee: Callee::Function { name, .. },
            args,
            kwargs,
            ..
        } => {
            let name = name.clone();
            let function = ctx.functions.get(&name).cloned();
            let args: Vec<ValueFn> = args.iter().map(|a| expr(a, ctx)).collect();
            let kwargs: Vec<(SmolStr, ValueFn)> = kwargs
                .iter()
                .map(|(key, value)| (key.clone(), expr(value, ctx)))
                .collect();

            Box::new(move |frame: &mut Frame| {
                let fallback = || FluentValue::None(FluentNone::new(format!("{}()", name)));
                let function = match &function {
                    Some(function) => function,
                    None => {
                        frame
                            .state
                            .errors
                            .push(ReferenceKind::Function(name.to_string()).into());
                        return Ok(fallback());
                    }
                };

                let mut positional = Vec::with_capacity(args.len());
                for arg in &args {
                    positional.push(arg(frame)?);
                }
                let mut named = FluentArgs::new();
                for (key, value) in &kwargs {
                    named.set(key.clone(), value(frame)?);
                }

                match function.call(&name, &positional, &named) {
                    Ok(value) => Ok(value),
                    Err(err) => {
                        frame.state.errors.push(err);
                        Ok(fallback())
                    }
                }
            })
        }

        E::MessageCall { key, .. } => {
            let key = key.clone();
            Box::new(move |frame: &mut Frame| match frame.program.get(&key) {
                Some(message) => message.call(frame.program, frame.ctx, frame.args, &mut *frame.state),
                None => Ok(FluentValue::None(FluentNone::new(key.as_str()))),
            })
        }

        E::StringJoin(parts) => {
            let parts: Vec<ValueFn> = parts.iter().map(|p| expr(p, ctx)).collect();
            Box::new(move |frame: &mut Frame| {
                let mut out = String::new();
                for part in &parts {
                    let value = part(frame)?;
                    out.push_str(&text_of(value, frame));
                }
                Ok(FluentValue::String(out))
            })
        }

        E::EscaperJoin { escaper: e, parts } => {
            let esc = escaper(ctx, e.index);
            let name = e.name.clone();
            let parts: Vec<ValueFn> = parts.iter().map(|p| expr(p, ctx)).collect();
            Box::new(move |frame: &mut Frame| {
                let mut texts = Vec::with_capacity(parts.len());
                for part in &parts {
                    let value = part(frame)?;
                    texts.push(text_of(value, frame));
                }
                let text = match &esc {
                    Some(esc) => esc.join(&texts),
                    None => texts.concat(),
                };
                Ok(FluentValue::Markup {
                    escaper: name.clone(),
                    text,
                })
            })
        }

        E::Equals(_, _) | E::Or(_) => {
            let test = cond(e, ctx);
            Box::new(move |frame: &mut Frame| Ok(FluentValue::String(test(frame)?.to_string())))
        }

        E::Format(inner) => {
            let inner = expr(inner, ctx);
            Box::new(move |frame: &mut Frame| {
                let value = inner(frame)?;
                let text = text_of(value, frame);
                frame.check_length(&text)?;
                Ok(FluentValue::String(text))
            })
        }

        E::Escape { escaper: e, expr: inner } => {
            let esc = escaper(ctx, e.index);
            let name = e.name.clone();
            let inner = expr(inner, ctx);
            Box::new(move |frame: &mut Frame| {
                let text = match inner(frame)? {
                    FluentValue::Markup { escaper: from, text } if from == name => text,
                    other => {
                        let text = other.format(&frame.ctx.locale);
                        match &esc {
                            Some(esc) => esc.escape(&text),
                            None => text,
                        }
                    }
                };
                frame.check_length(&text)?;
                Ok(FluentValue::Markup {
                    escaper: name.clone(),
                    text,
                })
            })
        }

        E::MarkEscaped { escaper: e, text } => {
            let text = match escaper(ctx, e.index) {
                Some(esc) => esc.mark_escaped(text),
                None => text.clone(),
            };
            constant(FluentValue::Markup {
                escaper: e.name.clone(),
                text,
            })
        }
    }
}
