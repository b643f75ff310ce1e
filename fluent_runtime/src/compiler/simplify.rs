//! Rewrites run over the IR until nothing changes.
//!
//! Every rule shrinks the tree, so the loop terminates.
//!
//! A `Format` around a value that is not a literal is kept even when the
//! value is already text, because it carries the part length check.
//!
//! Joins of a single part are replaced by the part. For escaper joins this
//! assumes that joining one part returns it unchanged.
use super::ir::{Block, Callee, Expr, ExprType, Function, Stmt};
use smol_str::SmolStr;

/// Simplifies a function in place.
pub fn simplify(function: &mut Function) {
    let mut pass = 0;
    loop {
        pass += 1;
        let changed = simplify_block(&mut function.body);
        log::trace!("{}: simplify pass {} changed={}", function.key, pass, changed);
        if !changed {
            break;
        }
    }
}

/// Simplifies a lone expression until nothing changes.
pub fn simplify_expr(mut expr: Expr) -> Expr {
    loop {
        let mut changed = false;
        expr = rewrite(expr, &mut changed);
        if !changed {
            return expr;
        }
    }
}

fn simplify_block(block: &mut Block) -> bool {
    let mut changed = false;
    let stmts = std::mem::take(&mut block.stmts);

    for stmt in stmts {
        match stmt {
            // Nothing to choose from, the else block always runs.
            Stmt::If {
                branches,
                else_block,
            } if branches.is_empty() => {
                block.stmts.extend(else_block.stmts);
                changed = true;
            }
            Stmt::If {
                branches,
                mut else_block,
            } => {
                let branches = branches
                    .into_iter()
                    .map(|(cond, mut body)| {
                        let cond = rewrite(cond, &mut changed);
                        changed |= simplify_block(&mut body);
                        (cond, body)
                    })
                    .collect();
                changed |= simplify_block(&mut else_block);
                block.stmts.push(Stmt::If {
                    branches,
                    else_block,
                });
            }
            Stmt::Assign { name, value } => {
                let value = rewrite(value, &mut changed);
                block.stmts.push(Stmt::Assign { name, value });
            }
            Stmt::Return(value) => {
                let value = rewrite(value, &mut changed);
                block.stmts.push(Stmt::Return(value));
            }
            other => block.stmts.push(other),
        }
    }

    changed
}

/// Rewrites children first, then the node itself.
fn rewrite(expr: Expr, changed: &mut bool) -> Expr {
    use Expr as E;

    let expr = match expr {
        E::FunctionCall {
            callee,
            args,
            kwargs,
            splat,
            ty,
        } => E::FunctionCall {
            callee,
            args: all(args, changed),
            kwargs: kwargs
                .into_iter()
                .map(|(key, value)| (key, rewrite(value, changed)))
                .collect(),
            splat,
            ty,
        },
        E::StringJoin(parts) => E::StringJoin(all(parts, changed)),
        E::EscaperJoin { escaper, parts } => E::EscaperJoin {
            escaper,
            parts: all(parts, changed),
        },
        E::Equals(a, b) => E::Equals(Box::new(rewrite(*a, changed)), Box::new(rewrite(*b, changed))),
        E::Or(parts) => E::Or(all(parts, changed)),
        E::Format(inner) => E::Format(Box::new(rewrite(*inner, changed))),
        E::Escape { escaper, expr } => E::Escape {
            escaper,
            expr: Box::new(rewrite(*expr, changed)),
        },
        other => other,
    };

    apply(expr, changed)
}

fn all(exprs: Vec<Expr>, changed: &mut bool) -> Vec<Expr> {
    exprs.into_iter().map(|e| rewrite(e, changed)).collect()
}

fn apply(expr: Expr, changed: &mut bool) -> Expr {
    use Expr as E;

    match expr {
        E::FunctionCall {
            callee,
            args,
            kwargs,
            splat,
            ty,
        } => number_call(callee, args, kwargs, splat, ty, changed),

        E::Equals(a, b) => E::Equals(
            Box::new(unwrap_number(*a, changed)),
            Box::new(unwrap_number(*b, changed)),
        ),

        E::Format(inner) => match *inner {
            E::NoneValue(name) => {
                *changed = true;
                E::String(name.unwrap_or_else(|| "???".to_string()))
            }
            E::String(s) => {
                *changed = true;
                E::String(s)
            }
            inner => E::Format(Box::new(inner)),
        },

        E::Escape { escaper, expr } => match *expr {
            E::MarkEscaped { escaper: from, text } if from == escaper => {
                *changed = true;
                E::MarkEscaped { escaper, text }
            }
            expr => E::Escape {
                escaper,
                expr: Box::new(expr),
            },
        },

        E::StringJoin(parts) => {
            let before = parts.len();
            let mut flat: Vec<Expr> = Vec::with_capacity(before);
            let mut merged = false;
            for part in parts {
                match part {
                    E::StringJoin(inner) => {
                        merged = true;
                        flat.extend(inner);
                    }
                    E::String(s) if s.is_empty() => merged = true,
                    E::String(s) => match flat.last_mut() {
                        Some(E::String(prev)) => {
                            merged = true;
                            prev.push_str(&s);
                        }
                        _ => flat.push(E::String(s)),
                    },
                    part => flat.push(part),
                }
            }
            if merged {
                *changed = true;
            }
            match flat.len() {
                0 => {
                    *changed = true;
                    E::String(String::new())
                }
                1 if flat[0].ty() == ExprType::Text => {
                    *changed = true;
                    flat.remove(0)
                }
                _ => E::StringJoin(flat),
            }
        }

        E::EscaperJoin { escaper, parts } => {
            let mut flat: Vec<Expr> = Vec::with_capacity(parts.len());
            let mut merged = false;
            for part in parts {
                match part {
                    E::MarkEscaped { escaper: from, text } if from == escaper => {
                        if text.is_empty() {
                            merged = true;
                            continue;
                        }
                        match flat.last_mut() {
                            Some(E::MarkEscaped { text: prev, .. }) => {
                                merged = true;
                                prev.push_str(&text);
                            }
                            _ => flat.push(E::MarkEscaped { escaper: from, text }),
                        }
                    }
                    part => flat.push(part),
                }
            }
            if merged {
                *changed = true;
            }
            match flat.len() {
                0 => {
                    *changed = true;
                    E::MarkEscaped {
                        escaper,
                        text: String::new(),
                    }
                }
                1 if flat[0].ty() == ExprType::Escaped => {
                    *changed = true;
                    flat.remove(0)
                }
                _ => E::EscaperJoin { escaper, parts: flat },
            }
        }

        E::Or(mut parts) if parts.len() == 1 => {
            *changed = true;
            parts.remove(0)
        }

        other => other,
    }
}

fn is_builtin(callee: &Callee, wanted: &str) -> bool {
    matches!(callee, Callee::Function { name, builtin: true } if name.as_str() == wanted)
}

/// `NUMBER(x)` with no options, where `x` is already a number.
fn is_bare_number(expr: &Expr) -> bool {
    match expr {
        Expr::FunctionCall {
            callee, args, kwargs, ..
        } => is_builtin(callee, "NUMBER") && kwargs.is_empty() && args.len() == 1 && args[0].ty() == ExprType::Number,
        _ => false,
    }
}

fn unwrap_number(expr: Expr, changed: &mut bool) -> Expr {
    if !is_bare_number(&expr) {
        return expr;
    }
    match expr {
        Expr::FunctionCall { mut args, .. } => {
            *changed = true;
            args.remove(0)
        }
        other => other,
    }
}

/// Collapses `NUMBER(NUMBER(x, ..), ..)` and drops redundant `NUMBER`
/// calls from builtin options.
fn number_call(
    callee: Callee,
    mut args: Vec<Expr>,
    kwargs: Vec<(SmolStr, Expr)>,
    splat: bool,
    ty: ExprType,
    changed: &mut bool,
) -> Expr {
    let builtin = is_builtin(&callee, "NUMBER") || is_builtin(&callee, "DATETIME");
    let kwargs: Vec<(SmolStr, Expr)> = if builtin {
        kwargs
            .into_iter()
            .map(|(key, value)| (key, unwrap_number(value, changed)))
            .collect()
    } else {
        kwargs
    };

    let nested = is_builtin(&callee, "NUMBER")
        && args.len() == 1
        && matches!(&args[0], Expr::FunctionCall { callee, args, .. } if is_builtin(callee, "NUMBER") && args.len() == 1);
    if !nested {
        return Expr::FunctionCall {
            callee,
            args,
            kwargs,
            splat,
            ty,
        };
    }

    match args.remove(0) {
        Expr::FunctionCall {
            args: inner_args,
            kwargs: inner_kwargs,
            splat: inner_splat,
            ..
        } => {
            *changed = true;
            // Options of the outer call win.
            let mut merged = inner_kwargs;
            for (key, value) in kwargs {
                match merged.iter_mut().find(|(k, _)| *k == key) {
                    Some(slot) => slot.1 = value,
                    None => merged.push((key, value)),
                }
            }
            Expr::FunctionCall {
                callee,
                args: inner_args,
                kwargs: merged,
                splat: splat || inner_splat,
                ty,
            }
        }
        other => Expr::FunctionCall {
            callee,
            args: vec![other],
            kwargs,
            splat,
            ty,
        },
    }
}
