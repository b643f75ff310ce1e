//! Parser, AST and serializer for the Fluent localization syntax.
pub mod ast;
pub mod errors;
pub mod json;
pub mod parser;
pub mod serializer;
pub mod stream;
pub mod visitor;

pub mod prelude {
    pub use crate::{
        ast::{Entry, Node, Resource},
        errors::{ErrorKind, JsonError, ParseError, SyntaxResult},
        json::{FromJson, ToJson},
        parser::{parse, FluentParser},
        serializer::{serialize, FluentSerializer},
        visitor::{Fold, Traverse, Visitor},
    };
}
