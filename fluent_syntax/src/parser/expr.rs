use super::{get_variants, Parse};
use crate::{
    ast::*,
    errors::{ErrorKind, ParseError, SyntaxResult},
    stream::ParserStream,
};

/// Inline expression, or a select expression when `->` follows.
pub fn get_expression(ps: &mut ParserStream) -> SyntaxResult<Expression> {
    let start = ps.index();
    let selector = get_inline_expression(ps)?;
    ps.skip_blank();

    if ps.current() == Some('-') {
        if ps.peek() != Some('>') {
            ps.reset_peek(0);
            return Ok(selector);
        }

        check_selector(&selector)?;

        ps.next();
        ps.next();

        ps.skip_blank_inline();
        ps.expect_line_end()?;

        let variants = get_variants(ps)?;
        return Ok(Expression::SelectExpression(SelectExpression {
            selector: Box::new(selector),
            variants,
            span: Some(Span::new(start, ps.index())),
        }));
    }

    match &selector {
        Expression::AttributeExpression(attr) if attr.reference.is_term() => {
            Err(ParseError::new(ErrorKind::TermAttributeAsPlaceable))
        }
        Expression::CallExpression(CallExpression {
            callee: Callee::TermAttribute(_),
            ..
        }) => Err(ParseError::new(ErrorKind::TermAttributeAsPlaceable)),
        _ => Ok(selector),
    }
}

fn check_selector(selector: &Expression) -> SyntaxResult<()> {
    use Expression as E;
    let kind = match selector {
        E::MessageReference(_) => ErrorKind::MessageReferenceAsSelector,
        E::AttributeExpression(attr) if !attr.reference.is_term() => {
            ErrorKind::MessageAttributeAsSelector
        }
        E::TermReference(_) | E::VariantExpression(_) => ErrorKind::TermReferenceAsSelector,
        E::CallExpression(CallExpression {
            callee: Callee::Term(_),
            ..
        }) => ErrorKind::TermReferenceAsSelector,
        _ => return Ok(()),
    };
    Err(ParseError::new(kind))
}

pub fn get_inline_expression(ps: &mut ParserStream) -> SyntaxResult<Expression> {
    if ps.current() == Some('{') {
        return Placeable::parse(ps).map(Expression::Placeable);
    }

    let start = ps.index();
    let expr = get_simple_expression(ps)?;

    match expr {
        Expression::NumberLiteral(_)
        | Expression::StringLiteral(_)
        | Expression::VariableReference(_) => Ok(expr),
        Expression::MessageReference(reference) => match ps.current() {
            Some('.') => {
                ps.next();
                let name = Identifier::parse(ps)?;
                Ok(Expression::AttributeExpression(AttributeExpression {
                    reference: EntryReference::Message(reference),
                    name,
                    span: Some(Span::new(start, ps.index())),
                }))
            }
            Some('(') => {
                // Functions must be named in upper case.
                if !is_function_name(&reference.id.name) {
                    return Err(ParseError::new(ErrorKind::ForbiddenCallee));
                }
                let callee = Callee::Function(FunctionReference {
                    id: reference.id,
                    span: reference.span,
                });
                let (positional, named) = get_call_arguments(ps)?;
                Ok(Expression::CallExpression(CallExpression {
                    callee,
                    positional,
                    named,
                    span: Some(Span::new(start, ps.index())),
                }))
            }
            _ => Ok(Expression::MessageReference(reference)),
        },
        Expression::TermReference(reference) => {
            if ps.current() == Some('[') {
                ps.next();
                let key = VariantKey::parse(ps)?;
                ps.expect_char(']')?;
                return Ok(Expression::VariantExpression(VariantExpression {
                    reference,
                    key,
                    span: Some(Span::new(start, ps.index())),
                }));
            }

            let expr = if ps.current() == Some('.') {
                ps.next();
                let name = Identifier::parse(ps)?;
                Expression::AttributeExpression(AttributeExpression {
                    reference: EntryReference::Term(reference),
                    name,
                    span: Some(Span::new(start, ps.index())),
                })
            } else {
                Expression::TermReference(reference)
            };

            if ps.current() == Some('(') {
                let callee = match expr {
                    Expression::TermReference(reference) => Callee::Term(reference),
                    Expression::AttributeExpression(attr) => Callee::TermAttribute(attr),
                    _ => return Err(ParseError::new(ErrorKind::ForbiddenCallee)),
                };
                let (positional, named) = get_call_arguments(ps)?;
                return Ok(Expression::CallExpression(CallExpression {
                    callee,
                    positional,
                    named,
                    span: Some(Span::new(start, ps.index())),
                }));
            }

            Ok(expr)
        }
        _ => Err(ParseError::new(ErrorKind::ExpectedInlineExpression)),
    }
}

/// `[A-Z][A-Z0-9_-]*`
fn is_function_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(ch) if ch.is_ascii_uppercase() => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit() || ch == '_' || ch == '-')
}

pub fn get_simple_expression(ps: &mut ParserStream) -> SyntaxResult<Expression> {
    let start = ps.index();

    if ps.is_number_start() {
        return NumberLiteral::parse(ps).map(Expression::NumberLiteral);
    }

    match ps.current() {
        Some('"') => StringLiteral::parse(ps).map(Expression::StringLiteral),
        Some('$') => {
            ps.next();
            let id = Identifier::parse(ps)?;
            Ok(Expression::VariableReference(VariableReference {
                id,
                span: Some(Span::new(start, ps.index())),
            }))
        }
        Some('-') => {
            ps.next();
            let id = Identifier::parse(ps)?;
            Ok(Expression::TermReference(TermReference {
                id,
                span: Some(Span::new(start, ps.index())),
            }))
        }
        _ if ps.is_identifier_start() => {
            let id = Identifier::parse(ps)?;
            Ok(Expression::MessageReference(MessageReference {
                id,
                span: Some(Span::new(start, ps.index())),
            }))
        }
        _ => Err(ParseError::new(ErrorKind::ExpectedInlineExpression)),
    }
}

enum CallArgument {
    Positional(Expression),
    Named(NamedArgument),
}

fn get_call_argument(ps: &mut ParserStream) -> SyntaxResult<CallArgument> {
    let start = ps.index();
    let expr = get_inline_expression(ps)?;

    ps.skip_blank();

    if ps.current() != Some(':') {
        return Ok(CallArgument::Positional(expr));
    }

    match expr {
        Expression::MessageReference(reference) => {
            ps.next();
            ps.skip_blank();
            let value = Literal::parse(ps)?;
            Ok(CallArgument::Named(NamedArgument {
                name: reference.id,
                value,
                span: Some(Span::new(start, ps.index())),
            }))
        }
        _ => Err(ParseError::new(ErrorKind::ForbiddenKey)),
    }
}

pub fn get_call_arguments(
    ps: &mut ParserStream,
) -> SyntaxResult<(Vec<Expression>, Vec<NamedArgument>)> {
    let mut positional = vec![];
    let mut named: Vec<NamedArgument> = vec![];

    ps.expect_char('(')?;
    ps.skip_blank();

    loop {
        if ps.current() == Some(')') {
            break;
        }

        match get_call_argument(ps)? {
            CallArgument::Named(arg) => {
                if named.iter().any(|other| other.name.name == arg.name.name) {
                    return Err(ParseError::new(ErrorKind::DuplicatedNamedArgument));
                }
                named.push(arg);
            }
            CallArgument::Positional(_) if !named.is_empty() => {
                return Err(ParseError::new(ErrorKind::PositionalArgumentFollowsNamed));
            }
            CallArgument::Positional(expr) => positional.push(expr),
        }

        ps.skip_blank();

        if ps.current() == Some(',') {
            ps.next();
            ps.skip_blank();
            continue;
        }

        break;
    }

    ps.expect_char(')')?;
    Ok((positional, named))
}
