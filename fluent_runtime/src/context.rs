//! Everything a format call reads: entries, functions, locale and settings.
use crate::{
    builtins::FunctionTable,
    config::BundleConfig,
    escapers::{escaper_for_message, Escaper},
    locale::Locale,
};
use fluent_syntax::ast::{Message, Pattern, Term, Value, Variant};
use itertools::Itertools;
use smol_str::SmolStr;
use std::{collections::HashMap, sync::Arc};

/// Registry shared by the resolver and the compiler.
///
/// Terms are stored without their `-` sigil.
pub struct Context {
    pub(crate) messages: HashMap<SmolStr, Message>,
    pub(crate) terms: HashMap<SmolStr, Term>,
    pub(crate) functions: FunctionTable,
    pub(crate) locale: Locale,
    pub(crate) escapers: Vec<Arc<dyn Escaper>>,
    pub(crate) config: BundleConfig,
}

impl Context {
    pub fn new(locale: Locale, functions: FunctionTable, config: BundleConfig) -> Self {
        Self {
            messages: HashMap::new(),
            terms: HashMap::new(),
            functions,
            locale,
            escapers: Vec::new(),
            config,
        }
    }

    #[inline]
    pub fn message(&self, id: &str) -> Option<&Message> {
        self.messages.get(id)
    }

    /// Term by id, without the sigil.
    #[inline]
    pub fn term(&self, id: &str) -> Option<&Term> {
        self.terms.get(id)
    }

    #[inline]
    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    #[inline]
    pub fn config(&self) -> &BundleConfig {
        &self.config
    }

    #[inline]
    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    /// Escaper selecting the message or attribute key.
    #[inline]
    pub fn escaper_for(&self, key: &str) -> Option<&dyn Escaper> {
        escaper_for_message(&self.escapers, key)
    }

    /// An escaper can override the bundle's isolation setting.
    pub fn use_isolating(&self, escaper: Option<&dyn Escaper>) -> bool {
        escaper
            .and_then(|escaper| escaper.use_isolating())
            .unwrap_or(self.config.use_isolating)
    }

    /// Message ids in a stable order.
    pub fn message_ids(&self) -> Vec<&str> {
        self.messages.keys().map(SmolStr::as_str).sorted_unstable().collect()
    }
}

/// Pattern a plain reference to the term formats.
///
/// A variant list formats its default variant.
pub fn term_value(term: &Term) -> Option<&Pattern> {
    match &term.value {
        Value::Pattern(pattern) => Some(pattern),
        Value::VariantList(list) => default_variant(&list.variants).map(|v| &v.value),
    }
}

#[inline]
pub fn default_variant(variants: &[Variant]) -> Option<&Variant> {
    variants.iter().find(|variant| variant.default)
}
