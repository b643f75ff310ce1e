//! Cursor over Fluent source text.
use crate::errors::{ErrorKind, ParseError, SyntaxResult};
use itertools::{multipeek, MultiPeek};
use std::{iter::Peekable, str::CharIndices};

pub const EOL: char = '\n';

/// Characters which cannot start a pattern continuation line.
const SPECIAL_LINE_START_CHARS: [char; 4] = ['}', '.', '[', '*'];

/// Characters of the source, with byte offsets into the original text.
///
/// A `\r\n` pair is yielded once, as `\n` at the offset of the `\r`,
/// so the parser only ever deals with one line ending.
#[derive(Clone)]
pub struct SourceChars<'a> {
    chars: Peekable<CharIndices<'a>>,
    base: usize,
}

impl<'a> SourceChars<'a> {
    fn new(source: &'a str, base: usize) -> Self {
        Self {
            chars: source[base..].char_indices().peekable(),
            base,
        }
    }
}

impl<'a> Iterator for SourceChars<'a> {
    type Item = (usize, char);

    fn next(&mut self) -> Option<Self::Item> {
        let (index, ch) = self.chars.next()?;
        if ch == '\r' && matches!(self.chars.peek(), Some((_, EOL))) {
            self.chars.next();
            return Some((self.base + index, EOL));
        }
        Some((self.base + index, ch))
    }
}

/// Source cursor with one committed position and one speculative peek cursor.
///
/// The peek semantics build on `MultiPeek`. Calling `peek()` is not
/// idempotent; each call advances the peek cursor by one character.
/// The cursor can be reset with `reset_peek`, committed with `skip_to_peek`,
/// or implicitly reset by `next`.
///
/// Past the end of the source both cursors report `None`.
pub struct ParserStream<'a> {
    source: &'a str,
    chars: MultiPeek<SourceChars<'a>>,
    current: Option<(usize, char)>,
    peeked: Option<(usize, char)>,
    peek_offset: usize,
}

impl<'a> ParserStream<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut chars = multipeek(SourceChars::new(source, 0));
        let current = chars.next();
        Self {
            source,
            chars,
            current,
            peeked: current,
            peek_offset: 0,
        }
    }

    #[inline]
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Byte offset of the committed cursor.
    #[inline]
    pub fn index(&self) -> usize {
        self.current.map(|(i, _)| i).unwrap_or(self.source.len())
    }

    /// Byte offset of the peek cursor.
    #[inline]
    pub fn peek_index(&self) -> usize {
        self.peeked.map(|(i, _)| i).unwrap_or(self.source.len())
    }

    /// Number of characters the peek cursor is ahead of the committed cursor.
    #[inline]
    pub fn peek_offset(&self) -> usize {
        self.peek_offset
    }

    #[inline]
    pub fn current(&self) -> Option<char> {
        self.current.map(|(_, ch)| ch)
    }

    #[inline]
    pub fn current_peek(&self) -> Option<char> {
        self.peeked.map(|(_, ch)| ch)
    }

    #[inline]
    pub fn at_end(&self) -> bool {
        self.current.is_none()
    }

    /// Advances the committed cursor by one character and resets the peek.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<char> {
        self.current = self.chars.next();
        self.peeked = self.current;
        self.peek_offset = 0;
        self.current()
    }

    /// Advances the peek cursor by one character.
    pub fn peek(&mut self) -> Option<char> {
        self.peek_offset += 1;
        self.peeked = match self.peeked {
            Some(_) => self.chars.peek().copied(),
            None => None,
        };
        self.current_peek()
    }

    /// Moves the peek cursor to `offset` characters past the committed cursor.
    pub fn reset_peek(&mut self, offset: usize) {
        self.chars.reset_peek();
        self.peeked = self.current;
        self.peek_offset = 0;
        for _ in 0..offset {
            self.peek();
        }
    }

    /// Commits the peek cursor.
    pub fn skip_to_peek(&mut self) {
        for _ in 0..self.peek_offset {
            self.next();
        }
    }

    /// Repositions the committed cursor at a byte offset.
    ///
    /// The offset must lie on a character boundary.
    fn seek(&mut self, index: usize) {
        self.chars = multipeek(SourceChars::new(self.source, index));
        self.next();
    }

    pub fn peek_blank_inline(&mut self) -> &'a str {
        let start = self.peek_index();
        while self.current_peek() == Some(' ') {
            self.peek();
        }
        &self.source[start..self.peek_index()]
    }

    pub fn skip_blank_inline(&mut self) -> &'a str {
        let blank = self.peek_blank_inline();
        self.skip_to_peek();
        blank
    }

    /// Peeks over blank lines, leaving the peek cursor at the start of the
    /// first line with content. Returns one `\n` per blank line.
    pub fn peek_blank_block(&mut self) -> String {
        let mut blank = String::new();
        loop {
            let line_start = self.peek_offset;
            self.peek_blank_inline();
            match self.current_peek() {
                Some(EOL) => {
                    blank.push(EOL);
                    self.peek();
                }
                // Blank line at the end of the source counts as blank block.
                None => return blank,
                Some(_) => {
                    self.reset_peek(line_start);
                    return blank;
                }
            }
        }
    }

    pub fn skip_blank_block(&mut self) -> String {
        let blank = self.peek_blank_block();
        self.skip_to_peek();
        blank
    }

    pub fn peek_blank(&mut self) {
        while let Some(' ') | Some(EOL) = self.current_peek() {
            self.peek();
        }
    }

    pub fn skip_blank(&mut self) {
        self.peek_blank();
        self.skip_to_peek();
    }

    pub fn expect_char(&mut self, ch: char) -> SyntaxResult<()> {
        if self.current() == Some(ch) {
            self.next();
            Ok(())
        } else {
            Err(ParseError::new(ErrorKind::ExpectedToken(ch)))
        }
    }

    /// End of source counts as a line end.
    pub fn expect_line_end(&mut self) -> SyntaxResult<()> {
        match self.current() {
            None => Ok(()),
            Some(EOL) => {
                self.next();
                Ok(())
            }
            // U+2424 SYMBOL FOR NEWLINE
            Some(_) => Err(ParseError::new(ErrorKind::ExpectedToken('\u{2424}'))),
        }
    }

    /// Consumes the current character if it satisfies the predicate.
    pub fn take_char<F>(&mut self, f: F) -> Option<char>
    where
        F: Fn(char) -> bool,
    {
        match self.current() {
            Some(ch) if f(ch) => {
                self.next();
                Some(ch)
            }
            _ => None,
        }
    }

    #[inline]
    pub fn is_identifier_start(&self) -> bool {
        is_char_id_start(self.current_peek())
    }

    /// Either a digit, or a minus sign followed by a digit.
    pub fn is_number_start(&mut self) -> bool {
        let ch = if self.current() == Some('-') {
            self.peek()
        } else {
            self.current()
        };
        self.reset_peek(0);
        matches!(ch, Some('0'..='9'))
    }

    /// Inline patterns may start with any character except a line end.
    #[inline]
    pub fn is_value_start(&self) -> bool {
        !matches!(self.current_peek(), Some(EOL) | None)
    }

    /// Whether the line under the peek cursor continues the current pattern.
    ///
    /// The peek cursor is restored to the start of the line when it does.
    pub fn is_value_continuation(&mut self) -> bool {
        let column1 = self.peek_offset;
        self.peek_blank_inline();

        if self.current_peek() == Some('{') {
            self.reset_peek(column1);
            return true;
        }

        if self.peek_offset - column1 == 0 {
            return false;
        }

        if is_char_pattern_continuation(self.current_peek()) {
            self.reset_peek(column1);
            return true;
        }

        false
    }

    /// Whether the next line is a comment of the given level.
    ///
    /// `None` accepts any level; otherwise 0, 1 and 2 stand for `#`, `##` and `###`.
    pub fn is_next_line_comment(&mut self, level: Option<usize>) -> bool {
        if self.current() != Some(EOL) {
            return false;
        }

        let mut i = 0;
        loop {
            let within = match level {
                Some(level) => i <= level,
                None => i < 3,
            };
            if !within {
                break;
            }
            if self.peek() != Some('#') {
                if level.map_or(false, |level| i <= level) {
                    self.reset_peek(0);
                    return false;
                }
                break;
            }
            i += 1;
        }

        // The first character after `#`, `##` or `###`.
        let ch = self.peek();
        self.reset_peek(0);
        matches!(ch, Some(' ') | Some(EOL))
    }

    pub fn is_variant_start(&mut self) -> bool {
        let offset = self.peek_offset;
        if self.current_peek() == Some('*') {
            self.peek();
        }
        let is_start = self.current_peek() == Some('[') && self.peek() != Some('[');
        self.reset_peek(offset);
        is_start
    }

    #[inline]
    pub fn is_attribute_start(&self) -> bool {
        self.current_peek() == Some('.')
    }

    /// Scans forward to the next line that looks like the start of an entry.
    pub fn skip_to_next_entry_start(&mut self, junk_start: usize) {
        if let Some(last_newline) = self.source[..self.index()].rfind(EOL) {
            // Rewinding is only safe when the newline lies after the junk start,
            // otherwise the same broken entry would be parsed again.
            if junk_start < last_newline {
                self.seek(last_newline);
            }
        }

        while let Some(ch) = self.current() {
            // Only the beginnings of lines are of interest.
            if ch != EOL {
                self.next();
                continue;
            }

            let first = self.next();
            if is_char_id_start(first) || first == Some('-') || first == Some('#') {
                break;
            }
        }
    }

    pub fn take_id_start(&mut self) -> SyntaxResult<char> {
        match self.current() {
            Some(ch) if is_char_id_start(Some(ch)) => {
                self.next();
                Ok(ch)
            }
            _ => Err(ParseError::new(ErrorKind::ExpectedCharRange(
                "a-zA-Z".to_string(),
            ))),
        }
    }

    #[inline]
    pub fn take_id_char(&mut self) -> Option<char> {
        self.take_char(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
    }

    #[inline]
    pub fn take_digit(&mut self) -> Option<char> {
        self.take_char(|ch| ch.is_ascii_digit())
    }

    #[inline]
    pub fn take_hex_digit(&mut self) -> Option<char> {
        self.take_char(|ch| ch.is_ascii_hexdigit())
    }
}

#[inline]
pub fn is_char_id_start(ch: Option<char>) -> bool {
    matches!(ch, Some('a'..='z') | Some('A'..='Z'))
}

#[inline]
fn is_char_pattern_continuation(ch: Option<char>) -> bool {
    match ch {
        Some(ch) => !SPECIAL_LINE_START_CHARS.contains(&ch),
        None => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_next_and_peek() {
        let mut ps = ParserStream::new("abcd");
        assert_eq!(ps.current(), Some('a'));
        assert_eq!(ps.index(), 0);

        assert_eq!(ps.next(), Some('b'));
        assert_eq!(ps.current(), Some('b'));
        assert_eq!(ps.index(), 1);

        assert_eq!(ps.peek(), Some('c'));
        assert_eq!(ps.current_peek(), Some('c'));
        assert_eq!(ps.peek(), Some('d'));
        assert_eq!(ps.peek(), None);
        assert_eq!(ps.peek(), None);
        assert_eq!(ps.current(), Some('b'));

        ps.reset_peek(1);
        assert_eq!(ps.current_peek(), Some('c'));
        assert_eq!(ps.peek_offset(), 1);

        ps.skip_to_peek();
        assert_eq!(ps.current(), Some('c'));
        assert_eq!(ps.current_peek(), Some('c'));
        assert_eq!(ps.peek_offset(), 0);

        assert_eq!(ps.next(), Some('d'));
        assert_eq!(ps.next(), None);
        assert_eq!(ps.index(), 4);
        assert_eq!(ps.next(), None);
    }

    #[test]
    fn test_unicode_codepoints() {
        let mut ps = ParserStream::new("añ😀z");
        assert_eq!(ps.next(), Some('ñ'));
        assert_eq!(ps.index(), 1);
        assert_eq!(ps.next(), Some('😀'));
        assert_eq!(ps.index(), 3);
        assert_eq!(ps.peek(), Some('z'));
        assert_eq!(ps.peek_index(), 7);
    }

    #[test]
    fn test_crlf_reads_as_single_line_end() {
        let mut ps = ParserStream::new("a\r\nb");
        assert_eq!(ps.next(), Some(EOL));
        assert_eq!(ps.index(), 1);
        assert_eq!(ps.next(), Some('b'));
        assert_eq!(ps.index(), 3);
    }

    #[test]
    fn test_blank_block() {
        let mut ps = ParserStream::new("\n  \n   x");
        assert_eq!(ps.peek_blank_block(), "\n\n");
        assert_eq!(ps.current_peek(), Some(' '));
        assert_eq!(ps.skip_blank_block(), "\n\n");
        assert_eq!(ps.skip_blank_inline(), "   ");
        assert_eq!(ps.current(), Some('x'));
    }

    #[test]
    fn test_value_continuation() {
        let mut ps = ParserStream::new("\n    more");
        ps.peek();
        assert!(ps.is_value_continuation());

        let mut ps = ParserStream::new("\n    .attr");
        ps.peek();
        assert!(!ps.is_value_continuation());

        let mut ps = ParserStream::new("\nnext = 1");
        ps.peek();
        assert!(!ps.is_value_continuation());

        let mut ps = ParserStream::new("\n{ $x }");
        ps.peek();
        assert!(ps.is_value_continuation());
    }

    #[test]
    fn test_skip_to_next_entry_start() {
        let mut ps = ParserStream::new("broken {\n  still\nnext = 1");
        ps.next();
        ps.skip_to_next_entry_start(0);
        assert_eq!(ps.current(), Some('n'));
        assert_eq!(ps.index(), 17);
    }
}
