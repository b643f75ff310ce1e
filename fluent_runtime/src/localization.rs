//! Formatting with fallback across locales and resource locations.
use crate::{
    builtins::FunctionTable,
    bundle::FluentBundle,
    config::BundleConfig,
    types::FluentArgs,
};
use fluent_syntax::{ast::Resource, parser::parse};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::OnceLock,
};

/// Source of parsed resources for one locale.
pub trait ResourceLoader {
    /// One list of resources per location holding any of `resource_ids`
    /// for `locale`, in preference order. Lists are never empty.
    fn resources(&self, locale: &str, resource_ids: &[String]) -> Vec<Vec<Resource>>;
}

/// Reads `.ftl` files below one or more roots.
///
/// `{locale}` in a root or resource id is replaced by the locale code, so
/// `locales/{locale}` and `main.ftl` read `locales/fr/main.ftl` for `fr`.
#[derive(Debug, Clone)]
pub struct FileResourceLoader {
    roots: Vec<PathBuf>,
}

impl FileResourceLoader {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            roots: vec![root.into()],
        }
    }

    pub fn with_roots<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    fn localize(path: &Path, locale: &str) -> PathBuf {
        PathBuf::from(path.to_string_lossy().replace("{locale}", locale))
    }
}

impl ResourceLoader for FileResourceLoader {
    fn resources(&self, locale: &str, resource_ids: &[String]) -> Vec<Vec<Resource>> {
        let mut found = Vec::new();
        for root in &self.roots {
            let mut resources = Vec::new();
            for id in resource_ids {
                let path = Self::localize(&root.join(id), locale);
                if !path.is_file() {
                    continue;
                }
                match fs::read_to_string(&path) {
                    Ok(source) => resources.push(parse(&source)),
                    Err(err) => log::warn!("cannot read {}: {}", path.display(), err),
                }
            }
            if !resources.is_empty() {
                found.push(resources);
            }
        }
        found
    }
}

/// Formats messages from the first bundle that has them.
///
/// Each locale of the fallback chain gets one bundle per location the loader
/// returns. Bundles of a locale are loaded the first time formatting reaches
/// it.
pub struct FluentLocalization<L> {
    locales: Vec<String>,
    resource_ids: Vec<String>,
    loader: L,
    functions: FunctionTable,
    config: BundleConfig,
    bundles: Vec<OnceLock<Vec<FluentBundle>>>,
}

impl<L: ResourceLoader> FluentLocalization<L> {
    /// Isolation is off unless a config turns it on.
    pub fn new<S, R>(locales: &[S], resource_ids: &[R], loader: L) -> Self
    where
        S: AsRef<str>,
        R: AsRef<str>,
    {
        let locales: Vec<String> = locales.iter().map(|l| l.as_ref().to_string()).collect();
        let bundles = locales.iter().map(|_| OnceLock::new()).collect();
        Self {
            locales,
            resource_ids: resource_ids.iter().map(|r| r.as_ref().to_string()).collect(),
            loader,
            functions: FunctionTable::new(),
            config: BundleConfig {
                use_isolating: false,
                ..BundleConfig::default()
            },
            bundles,
        }
    }

    pub fn with_functions(mut self, functions: FunctionTable) -> Self {
        self.functions = functions;
        self
    }

    pub fn with_config(mut self, config: BundleConfig) -> Self {
        self.config = config;
        self
    }

    #[inline]
    pub fn locales(&self) -> &[String] {
        &self.locales
    }

    /// Value of message `id` from the first bundle with one, or `id` itself.
    ///
    /// Formatting errors are logged and otherwise dropped.
    pub fn format_value(&self, id: &str, args: &FluentArgs) -> String {
        for bundle in self.bundles() {
            let has_value = bundle
                .get_message(id)
                .map_or(false, |message| message.value.is_some());
            if !has_value {
                continue;
            }
            let (text, errors) = bundle.format(id, None, args);
            if !errors.is_empty() {
                log::debug!("{} formatted with {} errors: {:?}", id, errors.len(), errors);
            }
            return text;
        }
        log::debug!("no bundle has a value for {}", id);
        id.to_string()
    }

    /// Bundles in fallback order, loading them as the walk reaches them.
    pub fn bundles(&self) -> impl Iterator<Item = &FluentBundle> {
        (0..self.locales.len()).flat_map(move |index| self.bundles_for(index).iter())
    }

    fn bundles_for(&self, index: usize) -> &[FluentBundle] {
        self.bundles[index].get_or_init(|| {
            let locales = &self.locales[index..];
            let locations = self.loader.resources(&locales[0], &self.resource_ids);
            log::debug!("loaded {} locations for {}", locations.len(), locales[0]);
            locations
                .into_iter()
                .map(|resources| {
                    let mut bundle =
                        FluentBundle::with_config(locales, self.functions.clone(), self.config.clone());
                    for resource in &resources {
                        bundle.add_resource(resource, false);
                    }
                    bundle
                })
                .collect()
        })
    }
}
