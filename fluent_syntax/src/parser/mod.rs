//! Recursive descent parser producing a `Resource`.
//!
//! Each production either returns its node or a `ParseError` describing
//! the first deviation from the grammar. Errors only surface at the entry
//! level, where the broken entry is turned into `Junk` and parsing resumes
//! at the next line that looks like the start of an entry.
mod entry;
mod expr;
mod literal;
mod pattern;

pub use entry::*;
pub use expr::*;
pub use pattern::*;

use crate::{
    ast::{Annotation, Comment, Entry, Junk, Resource, Span},
    errors::SyntaxResult,
    stream::ParserStream,
    visitor::{StripSpans, Traverse},
};
use log::debug;

pub trait Parse: Sized {
    fn parse(input: &mut ParserStream) -> SyntaxResult<Self>;
}

#[derive(Debug, Clone)]
pub struct FluentParser {
    with_spans: bool,
}

impl Default for FluentParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FluentParser {
    #[inline]
    pub fn new() -> Self {
        Self { with_spans: true }
    }

    /// Parser that leaves every `span` empty.
    #[inline]
    pub fn without_spans() -> Self {
        Self { with_spans: false }
    }

    pub fn parse(&self, source: &str) -> Resource {
        let mut ps = ParserStream::new(source);
        ps.skip_blank_block();

        let mut entries = vec![];
        let mut last_comment: Option<Comment> = None;

        while !ps.at_end() {
            let entry = self.parse_entry_or_junk(&mut ps);
            let blank_lines = ps.skip_blank_block();

            // A comment directly followed by a message or term belongs to it.
            // That is only known once the next entry parsed successfully, so
            // the comment is held back for one iteration.
            let entry = match entry {
                Entry::Comment(comment) if blank_lines.is_empty() && !ps.at_end() => {
                    if let Some(previous) = last_comment.replace(comment) {
                        entries.push(Entry::Comment(previous));
                    }
                    continue;
                }
                entry => entry,
            };

            let entry = match (entry, last_comment.take()) {
                (Entry::Message(mut message), Some(comment)) => {
                    if let (Some(span), Some(comment_span)) = (message.span.as_mut(), comment.span) {
                        span.start = comment_span.start;
                    }
                    message.comment = Some(comment);
                    Entry::Message(message)
                }
                (Entry::Term(mut term), Some(comment)) => {
                    if let (Some(span), Some(comment_span)) = (term.span.as_mut(), comment.span) {
                        span.start = comment_span.start;
                    }
                    term.comment = Some(comment);
                    Entry::Term(term)
                }
                (entry, Some(comment)) => {
                    entries.push(Entry::Comment(comment));
                    entry
                }
                (entry, None) => entry,
            };

            entries.push(entry);
        }

        let resource = Resource {
            body: entries,
            span: Some(Span::new(0, ps.index())),
        };

        if self.with_spans {
            resource
        } else {
            resource.traverse(&mut StripSpans)
        }
    }

    /// Parses a single message or term, returning `Junk` when it is broken.
    pub fn parse_entry(&self, source: &str) -> Entry {
        let mut ps = ParserStream::new(source);
        ps.skip_blank_block();

        while ps.current() == Some('#') {
            let skipped = self.parse_entry_or_junk(&mut ps);
            if let Entry::Junk(junk) = skipped {
                return Entry::Junk(junk);
            }
            ps.skip_blank_block();
        }

        let entry = self.parse_entry_or_junk(&mut ps);
        if self.with_spans {
            entry
        } else {
            entry.traverse(&mut StripSpans)
        }
    }

    fn parse_entry_or_junk(&self, ps: &mut ParserStream) -> Entry {
        let entry_start = ps.index();

        let result = get_entry(ps).and_then(|entry| {
            ps.expect_line_end()?;
            Ok(entry)
        });

        match result {
            Ok(entry) => entry,
            Err(err) => {
                let mut error_index = ps.index();
                ps.skip_to_next_entry_start(entry_start);
                let next_entry_start = ps.index();
                // The error must be located inside the span of the junk.
                if next_entry_start < error_index {
                    error_index = next_entry_start;
                }

                let content = ps.source()[entry_start..next_entry_start].to_string();
                debug!(
                    "junk at {}..{}: {}",
                    entry_start, next_entry_start, err
                );

                Entry::Junk(Junk {
                    content,
                    annotations: vec![Annotation {
                        code: err.code().to_string(),
                        args: err.args(),
                        message: err.message(),
                        span: Some(Span::new(error_index, error_index)),
                    }],
                    span: Some(Span::new(entry_start, next_entry_start)),
                })
            }
        }
    }
}

/// Parses Fluent source text into a `Resource`, with spans.
#[inline]
pub fn parse(source: &str) -> Resource {
    FluentParser::new().parse(source)
}
