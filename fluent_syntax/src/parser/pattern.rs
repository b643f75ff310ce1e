use super::{get_expression, Parse};
use crate::{
    ast::*,
    errors::{ErrorKind, ParseError, SyntaxResult},
    stream::{ParserStream, EOL},
};

/// Intermediate pattern pieces, before indentation is removed.
enum PatternPart {
    Element(PatternElement),
    /// Line break(s) plus the indentation of a continuation line.
    Indent { value: String, span: Span },
}

/// Parses an inline or a block pattern, if one follows.
///
/// Inline patterns start on the same line as the identifier, block
/// patterns on the next line. The indent of the first line of a block
/// pattern counts towards the common indent removed from all lines.
pub fn maybe_get_pattern(ps: &mut ParserStream) -> SyntaxResult<Option<Pattern>> {
    ps.peek_blank_inline();
    if ps.is_value_start() {
        ps.skip_to_peek();
        return get_pattern(ps, false).map(Some);
    }

    ps.peek_blank_block();
    if ps.is_value_continuation() {
        ps.skip_to_peek();
        return get_pattern(ps, true).map(Some);
    }

    Ok(None)
}

pub fn get_pattern(ps: &mut ParserStream, is_block: bool) -> SyntaxResult<Pattern> {
    let start = ps.index();
    let mut parts = vec![];

    let mut common_indent = if is_block {
        let blank_start = ps.index();
        let first_indent = ps.skip_blank_inline();
        parts.push(PatternPart::Indent {
            value: first_indent.to_string(),
            span: Span::new(blank_start, ps.index()),
        });
        first_indent.len()
    } else {
        usize::MAX
    };

    while let Some(ch) = ps.current() {
        match ch {
            EOL => {
                let blank_start = ps.index();
                let blank_lines = ps.peek_blank_block();
                if ps.is_value_continuation() {
                    ps.skip_to_peek();
                    let indent = ps.skip_blank_inline();
                    common_indent = common_indent.min(indent.len());
                    parts.push(PatternPart::Indent {
                        value: blank_lines + indent,
                        span: Span::new(blank_start, ps.index()),
                    });
                    continue;
                }

                // A line end not followed by a continuation ends the pattern.
                ps.reset_peek(0);
                break;
            }
            '}' => return Err(ParseError::new(ErrorKind::UnbalancedClosingBrace)),
            '{' => {
                let placeable = Placeable::parse(ps)?;
                parts.push(PatternPart::Element(PatternElement::Placeable(placeable)));
            }
            _ => {
                let text = get_text_element(ps);
                parts.push(PatternPart::Element(PatternElement::TextElement(text)));
            }
        }
    }

    Ok(Pattern {
        elements: dedent(parts, common_indent),
        span: Some(Span::new(start, ps.index())),
    })
}

/// Removes the common indent from the start of text lines, joins adjacent
/// text, and trims trailing whitespace from the end of the pattern.
fn dedent(parts: Vec<PatternPart>, common_indent: usize) -> Vec<PatternElement> {
    let mut trimmed: Vec<PatternElement> = Vec::with_capacity(parts.len());

    for part in parts {
        let (value, span) = match part {
            PatternPart::Element(PatternElement::Placeable(placeable)) => {
                trimmed.push(PatternElement::Placeable(placeable));
                continue;
            }
            PatternPart::Element(PatternElement::TextElement(text)) => (text.value, text.span),
            PatternPart::Indent { mut value, span } => {
                value.truncate(value.len().saturating_sub(common_indent));
                if value.is_empty() {
                    continue;
                }
                (value, Some(span))
            }
        };

        if let Some(PatternElement::TextElement(prev)) = trimmed.last_mut() {
            prev.value.push_str(&value);
            if let (Some(prev_span), Some(span)) = (prev.span.as_mut(), span) {
                prev_span.end = span.end;
            }
            continue;
        }

        trimmed.push(PatternElement::TextElement(TextElement { value, span }));
    }

    if let Some(PatternElement::TextElement(last)) = trimmed.last_mut() {
        let len = last
            .value
            .trim_end_matches(|ch| matches!(ch, ' ' | '\t' | '\n' | '\r'))
            .len();
        last.value.truncate(len);
        if last.value.is_empty() {
            trimmed.pop();
        }
    }

    trimmed
}

pub fn get_text_element(ps: &mut ParserStream) -> TextElement {
    let start = ps.index();
    let mut value = String::new();

    while let Some(ch) = ps.current() {
        if ch == '{' || ch == '}' || ch == EOL {
            break;
        }
        value.push(ch);
        ps.next();
    }

    TextElement {
        value,
        span: Some(Span::new(start, ps.index())),
    }
}

impl Parse for Placeable {
    fn parse(ps: &mut ParserStream) -> SyntaxResult<Self> {
        let start = ps.index();
        ps.expect_char('{')?;
        ps.skip_blank();
        let expression = get_expression(ps)?;
        ps.expect_char('}')?;
        Ok(Placeable {
            expression: Box::new(expression),
            span: Some(Span::new(start, ps.index())),
        })
    }
}
