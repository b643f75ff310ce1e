//! Intermediate representation of a compiled message.
//!
//! Printed as Rust flavoured pseudo code, which is what
//! `FluentBundle::compiled_source` shows.
use super::scope::ScopeId;
use crate::{errors::FluentError, types::FluentNumber};
use smol_str::SmolStr;
use std::fmt::{self, Write};

/// Static type of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprType {
    Text,
    Number,
    DateTime,
    None,
    /// Output of an escaper.
    Escaped,
    Bool,
    Unknown,
}

/// Escaper of a message, by position in the bundle's escaper list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscaperRef {
    pub index: usize,
    pub name: SmolStr,
}

/// Local variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    pub text: String,
    pub slot: usize,
    pub ty: ExprType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Callee {
    Function { name: SmolStr, builtin: bool },
    /// Plural category of a number, `None` for anything else.
    PluralCategory,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    String(String),
    Number(FluentNumber),
    Name(Name),
    FunctionCall {
        callee: Callee,
        args: Vec<Expr>,
        kwargs: Vec<(SmolStr, Expr)>,
        /// Some keyword is not a valid identifier, so all are passed as a map.
        splat: bool,
        ty: ExprType,
    },
    /// Call to another compiled message or attribute.
    MessageCall {
        key: String,
        function: String,
        ty: ExprType,
    },
    StringJoin(Vec<Expr>),
    EscaperJoin {
        escaper: EscaperRef,
        parts: Vec<Expr>,
    },
    Equals(Box<Expr>, Box<Expr>),
    Or(Vec<Expr>),
    NoneValue(Option<String>),
    /// Value to text in the bundle's locale.
    Format(Box<Expr>),
    Escape {
        escaper: EscaperRef,
        expr: Box<Expr>,
    },
    /// Message text, safe under the escaper.
    MarkEscaped {
        escaper: EscaperRef,
        text: String,
    },
}

impl Expr {
    pub fn ty(&self) -> ExprType {
        use Expr as E;
        match self {
            E::String(_) | E::StringJoin(_) | E::Format(_) => ExprType::Text,
            E::Number(_) => ExprType::Number,
            E::Name(name) => name.ty,
            E::FunctionCall { ty, .. } | E::MessageCall { ty, .. } => *ty,
            E::EscaperJoin { .. } | E::Escape { .. } | E::MarkEscaped { .. } => ExprType::Escaped,
            E::Equals(_, _) | E::Or(_) => ExprType::Bool,
            E::NoneValue(_) => ExprType::None,
        }
    }

    /// Literal value known while compiling.
    #[inline]
    pub fn is_static(&self) -> bool {
        matches!(self, Expr::String(_) | Expr::Number(_) | Expr::NoneValue(_))
    }

    /// Count of nodes, for the simplifier's progress checks.
    pub fn size(&self) -> usize {
        use Expr as E;
        1 + match self {
            E::String(_) | E::Number(_) | E::Name(_) | E::MessageCall { .. } => 0,
            E::NoneValue(_) | E::MarkEscaped { .. } => 0,
            E::FunctionCall { args, kwargs, .. } => {
                args.iter().map(Expr::size).sum::<usize>()
                    + kwargs.iter().map(|(_, e)| e.size()).sum::<usize>()
            }
            E::StringJoin(parts) | E::Or(parts) | E::EscaperJoin { parts, .. } => {
                parts.iter().map(Expr::size).sum()
            }
            E::Equals(a, b) => a.size() + b.size(),
            E::Format(expr) | E::Escape { expr, .. } => expr.size(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assign {
        name: Name,
        value: Expr,
    },
    If {
        branches: Vec<(Expr, Block)>,
        else_block: Block,
    },
    /// Binds an external argument, recording an error when it is missing.
    TryLookup {
        name: Name,
        arg: SmolStr,
        escaper: Option<EscaperRef>,
    },
    Return(Expr),
    RecordError(FluentError),
    /// Charges a taken branch's pattern elements against the part budget.
    ChargeParts(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub scope: ScopeId,
    pub stmts: Vec<Stmt>,
}

impl Block {
    #[inline]
    pub fn new(scope: ScopeId) -> Self {
        Self {
            scope,
            stmts: Vec::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.stmts.iter().map(Stmt::size).sum()
    }
}

impl Stmt {
    pub fn size(&self) -> usize {
        1 + match self {
            Stmt::Assign { value, .. } | Stmt::Return(value) => value.size(),
            Stmt::If {
                branches,
                else_block,
            } => {
                branches
                    .iter()
                    .map(|(cond, block)| cond.size() + block.size())
                    .sum::<usize>()
                    + else_block.size()
            }
            Stmt::TryLookup { .. } | Stmt::RecordError(_) | Stmt::ChargeParts(_) => 0,
        }
    }
}

/// One message or attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    /// `id` or `id.attr`.
    pub key: String,
    pub escaper: Option<EscaperRef>,
    pub body: Block,
    /// Count of local variables.
    pub slots: usize,
    /// Pattern elements charged on every call. Branches charge their own.
    pub parts: usize,
    /// Errors found while compiling.
    pub errors: Vec<FluentError>,
}

// ----------------------------------------------------------------------------
// Display

impl fmt::Display for ExprType {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExprType::Text     => write!(f, "String"),
            ExprType::Number   => write!(f, "FluentNumber"),
            ExprType::DateTime => write!(f, "FluentDateTime"),
            ExprType::None     => write!(f, "FluentNone"),
            ExprType::Escaped  => write!(f, "Markup"),
            ExprType::Bool     => write!(f, "bool"),
            ExprType::Unknown  => write!(f, "FluentValue"),
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

fn write_list(f: &mut fmt::Formatter, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Expr as E;
        match self {
            E::String(s) => write!(f, "{:?}", s),
            E::Number(n) => write!(f, "{}", n),
            E::Name(name) => write!(f, "{}", name),
            E::FunctionCall {
                callee,
                args,
                kwargs,
                splat,
                ..
            } => {
                match callee {
                    Callee::Function { name, .. } => write!(f, "{}(", name)?,
                    Callee::PluralCategory => write!(f, "plural_category(")?,
                }
                write_list(f, args)?;
                if !kwargs.is_empty() {
                    if !args.is_empty() {
                        write!(f, ", ")?;
                    }
                    if *splat {
                        write!(f, "**{{")?;
                        for (i, (key, value)) in kwargs.iter().enumerate() {
                            if i > 0 {
                                write!(f, ", ")?;
                            }
                            write!(f, "{:?}: {}", key.as_str(), value)?;
                        }
                        write!(f, "}}")?;
                    } else {
                        for (i, (key, value)) in kwargs.iter().enumerate() {
                            if i > 0 {
                                write!(f, ", ")?;
                            }
                            write!(f, "{}={}", key, value)?;
                        }
                    }
                }
                write!(f, ")")
            }
            E::MessageCall { function, .. } => write!(f, "{}(args, errors)", function),
            E::StringJoin(parts) => {
                write!(f, "[")?;
                write_list(f, parts)?;
                write!(f, "].concat()")
            }
            E::EscaperJoin { escaper, parts } => {
                write!(f, "{}.join([", escaper.name)?;
                write_list(f, parts)?;
                write!(f, "])")
            }
            E::Equals(a, b) => write!(f, "{} == {}", a, b),
            E::Or(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, " || ")?;
                    }
                    write!(f, "{}", part)?;
                }
                Ok(())
            }
            E::NoneValue(Some(name)) => write!(f, "FluentNone({:?})", name),
            E::NoneValue(None) => write!(f, "FluentNone()"),
            E::Format(expr) => write!(f, "format({})", expr),
            E::Escape { escaper, expr } => write!(f, "{}.escape({})", escaper.name, expr),
            E::MarkEscaped { escaper, text } => {
                write!(f, "{}.mark_escaped({:?})", escaper.name, text)
            }
        }
    }
}

const INDENT: &str = "    ";

fn write_stmt(out: &mut String, stmt: &Stmt, depth: usize) -> fmt::Result {
    let pad = INDENT.repeat(depth);
    match stmt {
        Stmt::Assign { name, value } => writeln!(out, "{}let {}: {} = {};", pad, name, name.ty, value),
        Stmt::TryLookup { name, arg, .. } => writeln!(
            out,
            "{}let {} = lookup_argument(args, {:?}, errors);",
            pad,
            name,
            arg.as_str()
        ),
        Stmt::Return(expr) => writeln!(out, "{}return {};", pad, expr),
        Stmt::RecordError(err) => writeln!(out, "{}errors.push({:?});", pad, err.to_string()),
        Stmt::ChargeParts(count) => writeln!(out, "{}charge_parts({});", pad, count),
        Stmt::If {
            branches,
            else_block,
        } => {
            for (i, (cond, block)) in branches.iter().enumerate() {
                if i == 0 {
                    writeln!(out, "{}if {} {{", pad, cond)?;
                } else {
                    writeln!(out, "{}}} else if {} {{", pad, cond)?;
                }
                write_block(out, block, depth + 1)?;
            }
            if branches.is_empty() {
                writeln!(out, "{}{{", pad)?;
            } else {
                writeln!(out, "{}}} else {{", pad)?;
            }
            write_block(out, else_block, depth + 1)?;
            writeln!(out, "{}}}", pad)
        }
    }
}

fn write_block(out: &mut String, block: &Block, depth: usize) -> fmt::Result {
    for stmt in &block.stmts {
        write_stmt(out, stmt, depth)?;
    }
    Ok(())
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut out = String::new();
        writeln!(out, "fn {}(args, errors) {{", self.name)?;
        write_block(&mut out, &self.body, 1)?;
        write!(out, "}}")?;
        f.write_str(&out)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_display() {
        let name = Name {
            text: "arg_count".to_string(),
            slot: 0,
            ty: ExprType::Unknown,
        };
        let function = Function {
            name: "emails".to_string(),
            key: "emails".to_string(),
            escaper: None,
            body: Block {
                scope: 1,
                stmts: vec![
                    Stmt::TryLookup {
                        name: name.clone(),
                        arg: "count".into(),
                        escaper: None,
                    },
                    Stmt::Return(Expr::StringJoin(vec![
                        Expr::String("You have ".to_string()),
                        Expr::Format(Box::new(Expr::Name(name))),
                    ])),
                ],
            },
            slots: 1,
            parts: 2,
            errors: vec![],
        };

        assert_eq!(
            function.to_string(),
            "fn emails(args, errors) {\n    \
             let arg_count = lookup_argument(args, \"count\", errors);\n    \
             return [\"You have \", format(arg_count)].concat();\n\
             }"
        );
    }

    #[test]
    fn test_types() {
        assert_eq!(Expr::String(String::new()).ty(), ExprType::Text);
        assert_eq!(Expr::NoneValue(None).ty(), ExprType::None);
        assert_eq!(
            Expr::Equals(
                Box::new(Expr::String("a".into())),
                Box::new(Expr::String("b".into()))
            )
            .ty(),
            ExprType::Bool
        );
    }
}
