use super::{maybe_get_pattern, Parse};
use crate::{
    ast::*,
    errors::{ErrorKind, ParseError, SyntaxResult},
    stream::{ParserStream, EOL},
};

pub fn get_entry(ps: &mut ParserStream) -> SyntaxResult<Entry> {
    match ps.current() {
        Some('#') => get_comment(ps),
        Some('-') => Term::parse(ps).map(Entry::Term),
        _ if ps.is_identifier_start() => Message::parse(ps).map(Entry::Message),
        _ => Err(ParseError::new(ErrorKind::ExpectedEntry)),
    }
}

/// Comment of any level, spanning consecutive lines of the same level.
pub fn get_comment(ps: &mut ParserStream) -> SyntaxResult<Entry> {
    let start = ps.index();
    // 0 - comment, 1 - group comment, 2 - resource comment
    let mut level: Option<usize> = None;
    let mut content = String::new();

    loop {
        let mut i: isize = -1;
        let max = level.map(|l| l as isize).unwrap_or(2);
        while ps.current() == Some('#') && i < max {
            ps.next();
            i += 1;
        }

        if level.is_none() {
            level = Some(i.max(0) as usize);
        }

        if !matches!(ps.current(), Some(EOL) | None) {
            ps.expect_char(' ')?;
            while let Some(ch) = ps.take_char(|ch| ch != EOL) {
                content.push(ch);
            }
        }

        if ps.is_next_line_comment(level) {
            content.push(EOL);
            ps.next();
        } else {
            break;
        }
    }

    let comment = Comment {
        content,
        span: Some(Span::new(start, ps.index())),
    };

    Ok(match level {
        Some(2) => Entry::ResourceComment(comment),
        Some(1) => Entry::GroupComment(comment),
        _ => Entry::Comment(comment),
    })
}

impl Parse for Message {
    fn parse(ps: &mut ParserStream) -> SyntaxResult<Self> {
        let start = ps.index();
        let id = Identifier::parse(ps)?;

        ps.skip_blank_inline();
        ps.expect_char('=')?;

        let value = maybe_get_pattern(ps)?;
        let attributes = get_attributes(ps)?;

        if value.is_none() && attributes.is_empty() {
            return Err(ParseError::new(ErrorKind::ExpectedMessageField(
                id.name.to_string(),
            )));
        }

        Ok(Message {
            id,
            value,
            attributes,
            comment: None,
            span: Some(Span::new(start, ps.index())),
        })
    }
}

impl Parse for Term {
    fn parse(ps: &mut ParserStream) -> SyntaxResult<Self> {
        let start = ps.index();
        ps.expect_char('-')?;
        let id = Identifier::parse(ps)?;

        ps.skip_blank_inline();
        ps.expect_char('=')?;

        // Variant lists are only allowed as the values of terms.
        let value = match maybe_get_variant_list(ps)? {
            Some(list) => Value::VariantList(list),
            None => match maybe_get_pattern(ps)? {
                Some(pattern) => Value::Pattern(pattern),
                None => {
                    return Err(ParseError::new(ErrorKind::ExpectedTermField(
                        id.name.to_string(),
                    )))
                }
            },
        };

        let attributes = get_attributes(ps)?;

        Ok(Term {
            id,
            value,
            attributes,
            comment: None,
            span: Some(Span::new(start, ps.index())),
        })
    }
}

impl Parse for Attribute {
    fn parse(ps: &mut ParserStream) -> SyntaxResult<Self> {
        let start = ps.index();
        ps.expect_char('.')?;
        let id = Identifier::parse(ps)?;

        ps.skip_blank_inline();
        ps.expect_char('=')?;

        let value = maybe_get_pattern(ps)?.ok_or_else(|| ParseError::new(ErrorKind::MissingValue))?;

        Ok(Attribute {
            id,
            value,
            span: Some(Span::new(start, ps.index())),
        })
    }
}

pub fn get_attributes(ps: &mut ParserStream) -> SyntaxResult<Vec<Attribute>> {
    let mut attributes = vec![];
    ps.peek_blank();
    while ps.is_attribute_start() {
        ps.skip_to_peek();
        attributes.push(Attribute::parse(ps)?);
        ps.peek_blank();
    }
    Ok(attributes)
}

impl Parse for Identifier {
    fn parse(ps: &mut ParserStream) -> SyntaxResult<Self> {
        let start = ps.index();
        let mut name = String::new();
        name.push(ps.take_id_start()?);
        while let Some(ch) = ps.take_id_char() {
            name.push(ch);
        }
        Ok(Identifier {
            name: name.into(),
            span: Some(Span::new(start, ps.index())),
        })
    }
}

impl Parse for VariantKey {
    fn parse(ps: &mut ParserStream) -> SyntaxResult<Self> {
        match ps.current() {
            None => Err(ParseError::new(ErrorKind::MissingVariantKey)),
            Some('0'..='9') | Some('-') => NumberLiteral::parse(ps).map(VariantKey::NumberLiteral),
            Some(_) => Identifier::parse(ps).map(VariantKey::Identifier),
        }
    }
}

pub fn get_variant(ps: &mut ParserStream, has_default: bool) -> SyntaxResult<Variant> {
    let start = ps.index();
    let mut default = false;

    if ps.current() == Some('*') {
        if has_default {
            return Err(ParseError::new(ErrorKind::MultipleDefaultVariants));
        }
        ps.next();
        default = true;
    }

    ps.expect_char('[')?;
    ps.skip_blank();
    let key = VariantKey::parse(ps)?;
    ps.skip_blank();
    ps.expect_char(']')?;

    let value = maybe_get_pattern(ps)?.ok_or_else(|| ParseError::new(ErrorKind::MissingValue))?;

    Ok(Variant {
        key,
        value,
        default,
        span: Some(Span::new(start, ps.index())),
    })
}

/// One or more variants, exactly one of them the default.
pub fn get_variants(ps: &mut ParserStream) -> SyntaxResult<Vec<Variant>> {
    let mut variants = vec![];
    let mut has_default = false;

    ps.skip_blank();
    while ps.is_variant_start() {
        let variant = get_variant(ps, has_default)?;
        has_default |= variant.default;
        variants.push(variant);
        ps.expect_line_end()?;
        ps.skip_blank();
    }

    if variants.is_empty() {
        return Err(ParseError::new(ErrorKind::MissingVariants));
    }

    if !has_default {
        return Err(ParseError::new(ErrorKind::MissingDefaultVariant));
    }

    Ok(variants)
}

/// Variant list value of a term, if one starts under the peek cursor.
pub fn maybe_get_variant_list(ps: &mut ParserStream) -> SyntaxResult<Option<VariantList>> {
    ps.peek_blank();
    if ps.current_peek() == Some('{') {
        let start = ps.peek_offset();
        ps.peek();
        ps.peek_blank_inline();
        if ps.current_peek() == Some(EOL) {
            ps.peek_blank();
            if ps.is_variant_start() {
                ps.reset_peek(start);
                ps.skip_to_peek();
                return VariantList::parse(ps).map(Some);
            }
        }
    }

    ps.reset_peek(0);
    Ok(None)
}

impl Parse for VariantList {
    fn parse(ps: &mut ParserStream) -> SyntaxResult<Self> {
        let start = ps.index();
        ps.expect_char('{')?;
        let variants = get_variants(ps)?;
        ps.expect_char('}')?;
        Ok(VariantList {
            variants,
            span: Some(Span::new(start, ps.index())),
        })
    }
}
