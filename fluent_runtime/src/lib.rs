//! Formatting of Fluent messages, by tree walking or ahead of time
//! compilation.
pub mod builtins;
mod bundle;
pub mod compiler;
pub mod config;
pub mod context;
pub mod errors;
pub mod escapers;
pub mod locale;
pub mod localization;
pub mod resolver;
pub mod types;

pub use self::bundle::FluentBundle;

pub mod prelude {
    pub use crate::{
        builtins::{FluentFunction, FunctionSpec, FunctionTable, Keywords},
        bundle::FluentBundle,
        config::{BundleConfig, Strategy},
        errors::{ConfigError, Exhausted, FluentError, FluentResult, LookupError, ReferenceKind},
        escapers::{Escaper, HtmlEscaper},
        locale::Locale,
        localization::{FileResourceLoader, FluentLocalization, ResourceLoader},
        types::{
            FluentArgs, FluentDateTime, FluentNone, FluentNumber, FluentValue, NumberFormatOptions,
        },
    };
}
