//! Syntax errors raised while parsing, and errors raised while reading AST JSON.
use std::{error, fmt};

pub type SyntaxResult<T> = std::result::Result<T, ParseError>;

/// Structural syntax violations.
///
/// Each kind maps onto a stable error code, which is what tooling
/// inspecting `Junk` annotations keys on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Generic,
    ExpectedEntry,
    ExpectedToken(char),
    ExpectedCharRange(String),
    ExpectedMessageField(String),
    ExpectedTermField(String),
    ForbiddenWhitespace,
    ForbiddenCallee,
    ForbiddenKey,
    MissingDefaultVariant,
    MissingVariants,
    MissingValue,
    MissingVariantKey,
    MissingLiteral,
    MultipleDefaultVariants,
    MessageReferenceAsSelector,
    TermReferenceAsSelector,
    MessageAttributeAsSelector,
    TermAttributeAsPlaceable,
    UnterminatedStringExpression,
    PositionalArgumentFollowsNamed,
    DuplicatedNamedArgument,
    ForbiddenVariantAccessor,
    UnknownEscapeSequence(String),
    InvalidUnicodeEscapeSequence(String),
    UnbalancedClosingBrace,
    ExpectedInlineExpression,
}

impl ErrorKind {
    #[rustfmt::skip]
    pub fn code(&self) -> &'static str {
        use ErrorKind as K;
        match self {
            K::Generic                          => "E0001",
            K::ExpectedEntry                    => "E0002",
            K::ExpectedToken(_)                 => "E0003",
            K::ExpectedCharRange(_)             => "E0004",
            K::ExpectedMessageField(_)          => "E0005",
            K::ExpectedTermField(_)             => "E0006",
            K::ForbiddenWhitespace              => "E0007",
            K::ForbiddenCallee                  => "E0008",
            K::ForbiddenKey                     => "E0009",
            K::MissingDefaultVariant            => "E0010",
            K::MissingVariants                  => "E0011",
            K::MissingValue                     => "E0012",
            K::MissingVariantKey                => "E0013",
            K::MissingLiteral                   => "E0014",
            K::MultipleDefaultVariants          => "E0015",
            K::MessageReferenceAsSelector       => "E0016",
            K::TermReferenceAsSelector          => "E0017",
            K::MessageAttributeAsSelector       => "E0018",
            K::TermAttributeAsPlaceable         => "E0019",
            K::UnterminatedStringExpression     => "E0020",
            K::PositionalArgumentFollowsNamed   => "E0021",
            K::DuplicatedNamedArgument          => "E0022",
            K::ForbiddenVariantAccessor         => "E0024",
            K::UnknownEscapeSequence(_)         => "E0025",
            K::InvalidUnicodeEscapeSequence(_)  => "E0026",
            K::UnbalancedClosingBrace           => "E0027",
            K::ExpectedInlineExpression         => "E0028",
        }
    }

    /// Positional arguments used to build the human readable message.
    pub fn args(&self) -> Vec<String> {
        use ErrorKind as K;
        match self {
            K::ExpectedToken(ch) => vec![ch.to_string()],
            K::ExpectedCharRange(arg)
            | K::ExpectedMessageField(arg)
            | K::ExpectedTermField(arg)
            | K::UnknownEscapeSequence(arg)
            | K::InvalidUnicodeEscapeSequence(arg) => vec![arg.clone()],
            _ => vec![],
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ErrorKind as K;
        match self {
            K::Generic => write!(f, "Generic error"),
            K::ExpectedEntry => write!(f, "Expected an entry start"),
            K::ExpectedToken(ch) => write!(f, "Expected token: \"{}\"", ch),
            K::ExpectedCharRange(range) => {
                write!(f, "Expected a character from range: \"{}\"", range)
            }
            K::ExpectedMessageField(id) => {
                write!(f, "Expected message \"{}\" to have a value or attributes", id)
            }
            K::ExpectedTermField(id) => write!(f, "Expected term \"-{}\" to have a value", id),
            K::ForbiddenWhitespace => write!(f, "Keyword cannot end with a whitespace"),
            K::ForbiddenCallee => {
                write!(f, "The callee has to be an upper-case identifier or a term")
            }
            K::ForbiddenKey => write!(f, "The argument name has to be a simple identifier"),
            K::MissingDefaultVariant => {
                write!(f, "Expected one of the variants to be marked as default (*)")
            }
            K::MissingVariants => write!(f, "Expected at least one variant after \"->\""),
            K::MissingValue => write!(f, "Expected value"),
            K::MissingVariantKey => write!(f, "Expected variant key"),
            K::MissingLiteral => write!(f, "Expected literal"),
            K::MultipleDefaultVariants => {
                write!(f, "Only one variant can be marked as default (*)")
            }
            K::MessageReferenceAsSelector => {
                write!(f, "Message references cannot be used as selectors")
            }
            K::TermReferenceAsSelector => write!(f, "Terms cannot be used as selectors"),
            K::MessageAttributeAsSelector => {
                write!(f, "Attributes of messages cannot be used as selectors")
            }
            K::TermAttributeAsPlaceable => {
                write!(f, "Attributes of terms cannot be used as placeables")
            }
            K::UnterminatedStringExpression => write!(f, "Unterminated string expression"),
            K::PositionalArgumentFollowsNamed => {
                write!(f, "Positional arguments must not follow named arguments")
            }
            K::DuplicatedNamedArgument => write!(f, "Named arguments must be unique"),
            K::ForbiddenVariantAccessor => write!(f, "Cannot access variants of a message."),
            K::UnknownEscapeSequence(seq) => write!(f, "Unknown escape sequence: \\{}.", seq),
            K::InvalidUnicodeEscapeSequence(seq) => {
                write!(f, "Invalid Unicode escape sequence: {}.", seq)
            }
            K::UnbalancedClosingBrace => write!(f, "Unbalanced closing brace in TextElement."),
            K::ExpectedInlineExpression => write!(f, "Expected an inline expression"),
        }
    }
}

/// Error raised by a grammar production.
///
/// Only the entry level loop of the parser catches these; everything
/// below it propagates with `?`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ErrorKind,
}

impl ParseError {
    #[inline]
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind }
    }

    #[inline]
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[inline]
    pub fn args(&self) -> Vec<String> {
        self.kind.args()
    }

    #[inline]
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl error::Error for ParseError {}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.kind)
    }
}

impl From<ErrorKind> for ParseError {
    fn from(kind: ErrorKind) -> Self {
        ParseError::new(kind)
    }
}

/// Failure while rebuilding an AST from its JSON form.
#[derive(Debug)]
pub enum JsonError {
    /// The `type` tag names no known node.
    UnknownType(String),
    /// A node was found where another kind was required.
    UnexpectedType { expected: &'static str, found: String },
    MissingField { node: &'static str, field: &'static str },
    InvalidField { node: &'static str, field: &'static str },
    Serde(serde_json::Error),
}

impl error::Error for JsonError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            JsonError::Serde(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use JsonError as E;
        match self {
            E::UnknownType(name) => write!(f, "unknown node type '{}'", name),
            E::UnexpectedType { expected, found } => {
                write!(f, "expected node of type {}, found '{}'", expected, found)
            }
            E::MissingField { node, field } => write!(f, "{} is missing field '{}'", node, field),
            E::InvalidField { node, field } => {
                write!(f, "{} has an invalid value in field '{}'", node, field)
            }
            E::Serde(err) => write!(f, "malformed json: {}", err),
        }
    }
}

impl From<serde_json::Error> for JsonError {
    fn from(err: serde_json::Error) -> Self {
        JsonError::Serde(err)
    }
}
