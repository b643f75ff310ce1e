use super::Parse;
use crate::{
    ast::*,
    errors::{ErrorKind, ParseError, SyntaxResult},
    stream::{ParserStream, EOL},
};

fn get_digits(ps: &mut ParserStream, buf: &mut String) -> SyntaxResult<()> {
    let start = buf.len();
    while let Some(ch) = ps.take_digit() {
        buf.push(ch);
    }
    if buf.len() == start {
        return Err(ParseError::new(ErrorKind::ExpectedCharRange("0-9".to_string())));
    }
    Ok(())
}

impl Parse for NumberLiteral {
    fn parse(ps: &mut ParserStream) -> SyntaxResult<Self> {
        let start = ps.index();
        let mut value = String::new();

        if ps.current() == Some('-') {
            value.push('-');
            ps.next();
        }

        get_digits(ps, &mut value)?;

        if ps.current() == Some('.') {
            value.push('.');
            ps.next();
            get_digits(ps, &mut value)?;
        }

        Ok(NumberLiteral {
            value,
            span: Some(Span::new(start, ps.index())),
        })
    }
}

impl Parse for StringLiteral {
    fn parse(ps: &mut ParserStream) -> SyntaxResult<Self> {
        let start = ps.index();
        let mut raw = String::new();
        let mut value = String::new();

        ps.expect_char('"')?;

        while let Some(ch) = ps.take_char(|ch| ch != '"' && ch != EOL) {
            if ch == '\\' {
                let (sequence, decoded) = get_escape_sequence(ps)?;
                raw.push('\\');
                raw.push_str(&sequence);
                value.push(decoded);
            } else {
                raw.push(ch);
                value.push(ch);
            }
        }

        if ps.current() == Some(EOL) {
            return Err(ParseError::new(ErrorKind::UnterminatedStringExpression));
        }

        ps.expect_char('"')?;

        Ok(StringLiteral {
            raw,
            value,
            span: Some(Span::new(start, ps.index())),
        })
    }
}

/// Reads the escape sequence following a backslash.
///
/// Returns the sequence as written (without the backslash) and the
/// character it stands for.
fn get_escape_sequence(ps: &mut ParserStream) -> SyntaxResult<(String, char)> {
    match ps.current() {
        Some(ch @ ('\\' | '"' | '{')) => {
            ps.next();
            Ok((ch.to_string(), ch))
        }
        Some('u') => get_unicode_escape_sequence(ps, 'u', 4),
        Some('U') => get_unicode_escape_sequence(ps, 'U', 6),
        other => Err(ParseError::new(ErrorKind::UnknownEscapeSequence(
            other.map(String::from).unwrap_or_default(),
        ))),
    }
}

fn get_unicode_escape_sequence(
    ps: &mut ParserStream,
    u: char,
    digits: usize,
) -> SyntaxResult<(String, char)> {
    ps.expect_char(u)?;

    let mut sequence = String::with_capacity(digits);
    for _ in 0..digits {
        match ps.take_hex_digit() {
            Some(ch) => sequence.push(ch),
            None => {
                let found = ps.current().map(String::from).unwrap_or_default();
                return Err(ParseError::new(ErrorKind::InvalidUnicodeEscapeSequence(
                    format!("\\{}{}{}", u, sequence, found),
                )));
            }
        }
    }

    // Code points outside of the unicode range, and lone surrogates,
    // decode to the replacement character.
    let decoded = u32::from_str_radix(&sequence, 16)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER);

    Ok((format!("{}{}", u, sequence), decoded))
}

impl Parse for Literal {
    fn parse(ps: &mut ParserStream) -> SyntaxResult<Self> {
        if ps.is_number_start() {
            return NumberLiteral::parse(ps).map(Literal::Number);
        }
        if ps.current() == Some('"') {
            return StringLiteral::parse(ps).map(Literal::String);
        }
        Err(ParseError::new(ErrorKind::MissingLiteral))
    }
}
