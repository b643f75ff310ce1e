//! Message registry of one locale.
use crate::{
    builtins::FunctionTable,
    compiler::{compile_messages, Program, State},
    config::{BundleConfig, Strategy},
    context::Context,
    errors::{ConfigError, FluentError, LookupError, ReferenceKind},
    escapers::Escaper,
    locale::Locale,
    resolver::{resolve, ABORTED},
    types::{FluentArgs, FluentValue},
};
use fluent_syntax::{
    ast::{Entry, Junk, Message, Pattern, Resource},
    parser::parse,
};
use std::sync::{Arc, RwLock};

/// Messages, terms and functions of one locale, formatted on demand.
///
/// All messages are compiled together the first time one is formatted with
/// the `Compile` strategy. Adding resources drops the compiled program.
pub struct FluentBundle {
    context: Context,
    compiled: RwLock<Option<Arc<Program>>>,
}

impl FluentBundle {
    /// Bundle for the first locale of `locales` with plural rules.
    pub fn new<S: AsRef<str>>(locales: &[S], functions: FunctionTable, use_isolating: bool) -> Self {
        let config = BundleConfig {
            use_isolating,
            ..BundleConfig::default()
        };
        Self::with_config(locales, functions, config)
    }

    pub fn with_config<S: AsRef<str>>(locales: &[S], functions: FunctionTable, config: BundleConfig) -> Self {
        Self {
            context: Context::new(Locale::resolve(locales), functions, config),
            compiled: RwLock::new(None),
        }
    }

    /// Registers an escaper. Names must be unique.
    pub fn add_escaper(&mut self, escaper: Arc<dyn Escaper>) -> Result<(), ConfigError> {
        let name = escaper.name();
        if self.context.escapers.iter().any(|e| e.name() == name) {
            return Err(ConfigError::DuplicateEscaper(name.to_string()));
        }
        self.context.escapers.push(escaper);
        self.invalidate();
        Ok(())
    }

    /// Adds the messages and terms of a resource.
    ///
    /// Without `allow_overrides` the first registration of an id wins.
    pub fn add_resource(&mut self, resource: &Resource, allow_overrides: bool) {
        for entry in &resource.body {
            match entry {
                Entry::Message(message) => {
                    let id = message.id.name.clone();
                    if self.context.messages.contains_key(&id) && !allow_overrides {
                        log::warn!("duplicate message '{}' ignored", id);
                        continue;
                    }
                    self.context.messages.insert(id, message.clone());
                }
                Entry::Term(term) => {
                    let id = term.id.name.clone();
                    if self.context.terms.contains_key(&id) && !allow_overrides {
                        log::warn!("duplicate term '-{}' ignored", id);
                        continue;
                    }
                    self.context.terms.insert(id, term.clone());
                }
                _ => {}
            }
        }
        self.invalidate();
    }

    /// Parses `source` and adds it. Returns the entries that failed to parse.
    pub fn add_messages(&mut self, source: &str) -> Vec<Junk> {
        let resource = parse(source);
        self.add_resource(&resource, false);
        resource
            .body
            .into_iter()
            .filter_map(|entry| match entry {
                Entry::Junk(junk) => Some(junk),
                _ => None,
            })
            .collect()
    }

    /// Terms are not messages: `has_message("-brand")` is always false.
    pub fn has_message(&self, id: &str) -> bool {
        !id.starts_with('-') && self.context.messages.contains_key(id)
    }

    pub fn get_message(&self, id: &str) -> Result<&Message, LookupError> {
        if id.starts_with('-') {
            return Err(LookupError::TermLookup(id.to_string()));
        }
        self.context
            .message(id)
            .ok_or_else(|| LookupError::UnknownMessage(id.to_string()))
    }

    #[inline]
    pub fn locale(&self) -> &Locale {
        self.context.locale()
    }

    #[inline]
    pub fn config(&self) -> &BundleConfig {
        self.context.config()
    }

    #[inline]
    pub fn functions(&self) -> &FunctionTable {
        self.context.functions()
    }

    /// Formats an arbitrary pattern, always with the resolver.
    pub fn format_pattern(&self, pattern: &Pattern, args: &FluentArgs) -> (String, Vec<FluentError>) {
        resolve(&self.context, pattern, None, args)
    }

    /// Formats a message, or one of its attributes.
    ///
    /// Missing messages and attributes format to their id.
    pub fn format(&self, id: &str, attr: Option<&str>, args: &FluentArgs) -> (String, Vec<FluentError>) {
        let message = match self.get_message(id) {
            Ok(message) => message,
            Err(_) => {
                return (
                    id.to_string(),
                    vec![ReferenceKind::Message(id.to_string()).into()],
                )
            }
        };

        let (key, pattern) = match attr {
            Some(name) => match message.get_attribute(name) {
                Some(attribute) => (format!("{}.{}", id, name), &attribute.value),
                None => {
                    let key = format!("{}.{}", id, name);
                    let err = ReferenceKind::Attribute {
                        id: id.to_string(),
                        name: name.to_string(),
                    };
                    return (key, vec![err.into()]);
                }
            },
            None => match &message.value {
                Some(value) => (id.to_string(), value),
                None => return (id.to_string(), vec![ReferenceKind::NoValue(id.to_string()).into()]),
            },
        };

        match self.context.config.strategy {
            Strategy::Interpret => resolve(&self.context, pattern, Some(&key), args),
            Strategy::Compile => self.format_compiled(&key, pattern, args),
        }
    }

    fn format_compiled(&self, key: &str, pattern: &Pattern, args: &FluentArgs) -> (String, Vec<FluentError>) {
        let program = self.program();
        let message = match program.get(key) {
            Some(message) => message,
            None => return resolve(&self.context, pattern, Some(key), args),
        };

        let mut state = State::default();
        match message.call(&program, &self.context, args, &mut state) {
            Ok(value) => {
                let text = match value {
                    FluentValue::Markup { text, .. } => text,
                    other => other.format(&self.context.locale),
                };
                (text, state.errors)
            }
            Err(err) => {
                state.errors.push(err);
                (ABORTED.to_string(), state.errors)
            }
        }
    }

    /// Compile time errors of every message and attribute, by key.
    pub fn check_messages(&self) -> Vec<(String, FluentError)> {
        let program = self.program();
        program
            .keys()
            .into_iter()
            .filter_map(|key| program.get(key))
            .flat_map(|message| {
                message
                    .errors
                    .iter()
                    .map(move |err| (message.key.clone(), err.clone()))
            })
            .collect()
    }

    /// Pseudo code the message or attribute was compiled to.
    pub fn compiled_source(&self, key: &str) -> Option<String> {
        self.program().get(key).map(|message| message.source().to_string())
    }

    /// The compiled program, built on first use.
    fn program(&self) -> Arc<Program> {
        if let Some(program) = self.read_cache() {
            return program;
        }

        let program = Arc::new(compile_messages(&self.context));
        log::debug!("compiled bundle for {}", self.context.locale);
        let mut cache = self.compiled.write().unwrap_or_else(|e| e.into_inner());
        // Another thread may have won the race with an identical program.
        cache.get_or_insert(program).clone()
    }

    fn read_cache(&self) -> Option<Arc<Program>> {
        self.compiled
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .cloned()
    }

    fn invalidate(&mut self) {
        *self.compiled.get_mut().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::escapers::HtmlEscaper;

    fn bundle(source: &str) -> FluentBundle {
        let mut bundle = FluentBundle::new(&["en-US"], FunctionTable::new(), false);
        assert!(bundle.add_messages(source).is_empty());
        bundle
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_send_sync() {
        assert_send_sync::<FluentBundle>();
    }

    #[test]
    fn test_first_registration_wins() {
        let mut bundle = bundle("foo = First\n");
        bundle.add_messages("foo = Second\n");
        assert_eq!(bundle.format("foo", None, &FluentArgs::new()).0, "First");

        bundle.add_resource(&parse("foo = Third\n"), true);
        assert_eq!(bundle.format("foo", None, &FluentArgs::new()).0, "Third");
    }

    #[test]
    fn test_terms_are_private() {
        let bundle = bundle("-brand = Firefox\nfoo = { -brand }\n");
        assert!(!bundle.has_message("-brand"));
        assert!(!bundle.has_message("brand"));
        assert!(bundle.has_message("foo"));
        assert_eq!(
            bundle.get_message("-brand"),
            Err(LookupError::TermLookup("-brand".to_string()))
        );
    }

    #[test]
    fn test_missing_lookups() {
        let bundle = bundle("foo = Foo\n    .title = Title\nbar =\n    .title = Bar\n");
        let args = FluentArgs::new();
        assert_eq!(
            bundle.format("nope", None, &args),
            ("nope".to_string(), vec![ReferenceKind::Message("nope".to_string()).into()])
        );
        assert_eq!(bundle.format("foo", Some("title"), &args).0, "Title");
        assert_eq!(
            bundle.format("foo", Some("other"), &args),
            (
                "foo.other".to_string(),
                vec![ReferenceKind::Attribute {
                    id: "foo".to_string(),
                    name: "other".to_string()
                }
                .into()]
            )
        );
        assert_eq!(
            bundle.format("bar", None, &args),
            ("bar".to_string(), vec![ReferenceKind::NoValue("bar".to_string()).into()])
        );
    }

    #[test]
    fn test_cache_is_dropped_on_add() {
        let mut bundle = bundle("foo = { bar }\n");
        let (_, errors) = bundle.format("foo", None, &FluentArgs::new());
        assert_eq!(errors.len(), 1);

        bundle.add_messages("bar = Bar\n");
        assert_eq!(bundle.format("foo", None, &FluentArgs::new()), ("Bar".to_string(), vec![]));
    }

    #[test]
    fn test_duplicate_escaper() {
        let mut bundle = bundle("");
        assert!(bundle.add_escaper(Arc::new(HtmlEscaper)).is_ok());
        assert!(matches!(
            bundle.add_escaper(Arc::new(HtmlEscaper)),
            Err(ConfigError::DuplicateEscaper(name)) if name == "html"
        ));
    }
}
