//! Output escaping for markup messages.
//!
//! Messages without an escaper produce plain text. An escaper claims
//! messages by id, escapes every interpolated value, and marks the
//! message's own text as already safe.
use crate::{
    errors::{FluentError, FluentResult},
    types::{FluentNone, FluentValue},
};
use std::sync::Arc;

pub trait Escaper: Send + Sync {
    /// Unique within a bundle.
    fn name(&self) -> &str;

    /// Whether this escaper applies to the message.
    fn select(&self, message_id: &str) -> bool;

    /// Escapes an interpolated value.
    fn escape(&self, text: &str) -> String;

    /// Marks text from the message itself as safe.
    fn mark_escaped(&self, text: &str) -> String {
        text.to_string()
    }

    fn join(&self, parts: &[String]) -> String {
        parts.concat()
    }

    /// Overrides the bundle's isolation setting for selected messages.
    fn use_isolating(&self) -> Option<bool> {
        None
    }
}

/// First escaper selecting the message, if any.
pub fn escaper_for_message<'a>(
    escapers: &'a [Arc<dyn Escaper>],
    message_id: &str,
) -> Option<&'a dyn Escaper> {
    escapers
        .iter()
        .find(|escaper| escaper.select(message_id))
        .map(|escaper| escaper.as_ref())
}

/// Messages without an escaper can be used from anywhere. Otherwise both
/// sides must use the same one.
pub fn escapers_compatible(outer: Option<&dyn Escaper>, inner: Option<&dyn Escaper>) -> bool {
    match (outer, inner) {
        (_, None) => true,
        (Some(outer), Some(inner)) => outer.name() == inner.name(),
        (None, Some(_)) => false,
    }
}

/// Error returned when a message is used under a different escaper.
pub fn incompatible(
    id: &str,
    outer: Option<&dyn Escaper>,
    inner: Option<&dyn Escaper>,
) -> FluentError {
    let name = |escaper: Option<&dyn Escaper>| {
        escaper
            .map(|e| e.name().to_string())
            .unwrap_or_else(|| "null_escaper".to_string())
    };
    FluentError::type_error(format!(
        "Escaper {} for message {} cannot be used from calling context with {} escaper",
        name(inner),
        id,
        name(outer)
    ))
}

/// Markup arguments must come from the escaper of the message using them.
pub fn check_markup(
    value: FluentValue,
    name: &str,
    escaper: Option<&dyn Escaper>,
) -> FluentResult<FluentValue> {
    match &value {
        FluentValue::Markup { escaper: from, .. } => match escaper {
            Some(escaper) if escaper.name() == from.as_str() => Ok(value),
            _ => Err(FluentError::type_error(format!(
                "Unsupported external type: markup from escaper '{}' passed as ${}",
                from, name
            ))),
        },
        _ => Ok(value),
    }
}

/// Fallback for an escaper mismatch.
pub fn incompatible_fallback(id: &str) -> FluentValue {
    FluentValue::None(FluentNone::new(id))
}

/// Escapes `&`, `<`, `>`, `"` and `'` in messages whose id ends in `-html`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlEscaper;

impl Escaper for HtmlEscaper {
    fn name(&self) -> &str {
        "html"
    }

    fn select(&self, message_id: &str) -> bool {
        let id = message_id.split('.').next().unwrap_or(message_id);
        id.ends_with("-html")
    }

    fn escape(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            match ch {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#x27;"),
                _ => out.push(ch),
            }
        }
        out
    }

    fn use_isolating(&self) -> Option<bool> {
        Some(false)
    }
}
