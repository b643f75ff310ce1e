//! Result and errors.
use std::{error, fmt, io};

pub type FluentResult<T> = std::result::Result<T, FluentError>;

/// Error recorded while formatting a message.
///
/// Apart from `ResourceExhausted`, every error is recovered where it
/// happens: the failing expression is replaced by a fallback value and the
/// error is appended to the list returned alongside the formatted text.
#[derive(Debug, Clone, PartialEq)]
pub enum FluentError {
    Reference(ReferenceKind),
    CyclicReference(String),
    /// Argument or option misuse that is not a type mismatch.
    Format(String),
    Type(String),
    /// One of the two formatting ceilings was exceeded. Aborts the whole call.
    ResourceExhausted(Exhausted),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceKind {
    Message(String),
    Term(String),
    Attribute { id: String, name: String },
    External(String),
    Function(String),
    Variant { term: String, key: String },
    /// Message exists, but has only attributes.
    NoValue(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exhausted {
    TooManyParts { max: usize },
    TooManyCharacters { len: usize, max: usize },
}

impl FluentError {
    #[inline]
    pub fn reference(kind: ReferenceKind) -> Self {
        FluentError::Reference(kind)
    }

    #[inline]
    pub fn type_error(msg: impl Into<String>) -> Self {
        FluentError::Type(msg.into())
    }

    #[inline]
    pub fn format_error(msg: impl Into<String>) -> Self {
        FluentError::Format(msg.into())
    }

    #[inline]
    pub fn cyclic(id: impl fmt::Display) -> Self {
        FluentError::CyclicReference(format!("Cyclic reference in {}", id))
    }

    /// Whether this error aborts formatting.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, FluentError::ResourceExhausted(_))
    }

    /// Errors of the same category compare equal under this key, regardless
    /// of the details they carry.
    pub fn category(&self) -> &'static str {
        use FluentError as E;
        match self {
            E::Reference(_) => "reference",
            E::CyclicReference(_) => "cyclic",
            E::Format(_) => "format",
            E::Type(_) => "type",
            E::ResourceExhausted(_) => "exhausted",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ReferenceKind as R;
        match self {
            R::Message(id) => write!(f, "Unknown message: {}", id),
            R::Term(id) => write!(f, "Unknown term: {}", id),
            R::Attribute { id, name } => write!(f, "Unknown attribute: {}.{}", id, name),
            R::External(name) => write!(f, "Unknown external: {}", name),
            R::Function(name) => write!(f, "Unknown function: {}", name),
            R::Variant { term, key } => write!(f, "Unknown variant: {}[{}]", term, key),
            R::NoValue(id) => write!(f, "No value: {}", id),
        }
    }
}

impl fmt::Display for Exhausted {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Exhausted::TooManyParts { max } => {
                write!(f, "Too many parts in message (> {}), aborting.", max)
            }
            Exhausted::TooManyCharacters { len, max } => write!(
                f,
                "Too many characters in part, ({}, max allowed is {})",
                len, max
            ),
        }
    }
}

impl fmt::Display for FluentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use FluentError as E;
        match self {
            E::Reference(kind) => write!(f, "{}", kind),
            E::CyclicReference(msg) | E::Format(msg) | E::Type(msg) => write!(f, "{}", msg),
            E::ResourceExhausted(kind) => write!(f, "{}", kind),
        }
    }
}

impl error::Error for FluentError {}

impl From<ReferenceKind> for FluentError {
    fn from(kind: ReferenceKind) -> Self {
        FluentError::Reference(kind)
    }
}

impl From<Exhausted> for FluentError {
    fn from(kind: Exhausted) -> Self {
        FluentError::ResourceExhausted(kind)
    }
}

/// Failure of a direct registry lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    UnknownMessage(String),
    /// Terms are private to the bundle.
    TermLookup(String),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LookupError::UnknownMessage(id) => write!(f, "unknown message '{}'", id),
            LookupError::TermLookup(id) => write!(f, "terms cannot be looked up: '{}'", id),
        }
    }
}

impl error::Error for LookupError {}

/// Invalid bundle configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Yaml(serde_yaml::Error),
    Invalid(&'static str),
    DuplicateEscaper(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "config: {}", err),
            ConfigError::Yaml(err) => write!(f, "config: {}", err),
            ConfigError::Invalid(msg) => write!(f, "config: {}", msg),
            ConfigError::DuplicateEscaper(name) => {
                write!(f, "escaper '{}' is already registered", name)
            }
        }
    }
}

impl error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Yaml(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Yaml(err)
    }
}
