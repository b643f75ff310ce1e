//! Functions callable from messages.
use crate::{
    errors::{FluentError, FluentResult},
    types::{FluentArgs, FluentNumber, FluentValue, DATETIME_OPTIONS, NUMBER_OPTIONS},
};
use smol_str::SmolStr;
use std::{collections::HashMap, fmt, sync::Arc};

pub type FunctionImpl =
    dyn Fn(&[FluentValue], &FluentArgs) -> FluentResult<FluentValue> + Send + Sync;

/// Keywords a function accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keywords {
    Any,
    Only(Vec<SmolStr>),
}

/// Shape of a function's arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSpec {
    pub positional: usize,
    pub keywords: Keywords,
}

impl FunctionSpec {
    pub fn new(positional: usize, keywords: Keywords) -> Self {
        Self {
            positional,
            keywords,
        }
    }

    pub fn with_keywords(positional: usize, keywords: &[&str]) -> Self {
        Self::new(
            positional,
            Keywords::Only(keywords.iter().map(|k| SmolStr::from(*k)).collect()),
        )
    }

    /// Validates a call against the spec.
    ///
    /// Run once while compiling and again on every call, so both paths
    /// report the same errors.
    pub fn check<'a>(
        &self,
        name: &str,
        positional: usize,
        keywords: impl IntoIterator<Item = &'a str>,
    ) -> FluentResult<()> {
        if positional != self.positional {
            return Err(FluentError::type_error(format!(
                "{}() takes {} positional arguments but {} were given",
                name, self.positional, positional
            )));
        }

        if let Keywords::Only(allowed) = &self.keywords {
            for keyword in keywords {
                if allowed.iter().any(|k| k == keyword) {
                    continue;
                }
                if !is_keyword_name(keyword) {
                    return Err(FluentError::format_error(format!(
                        "{}() has invalid keyword argument name '{}'",
                        name, keyword
                    )));
                }
                return Err(FluentError::type_error(format!(
                    "{}() got an unexpected keyword argument '{}'",
                    name, keyword
                )));
            }
        }

        Ok(())
    }
}

/// Keyword names a native function can declare: ASCII letters, digits and
/// underscores. Fluent also allows hyphens.
fn is_keyword_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

/// Callable with its argument spec.
#[derive(Clone)]
pub struct FluentFunction {
    pub spec: FunctionSpec,
    func: Arc<FunctionImpl>,
    builtin: bool,
}

impl FluentFunction {
    pub fn new<F>(spec: FunctionSpec, func: F) -> Self
    where
        F: Fn(&[FluentValue], &FluentArgs) -> FluentResult<FluentValue> + Send + Sync + 'static,
    {
        Self {
            spec,
            func: Arc::new(func),
            builtin: false,
        }
    }

    fn builtin<F>(spec: FunctionSpec, func: F) -> Self
    where
        F: Fn(&[FluentValue], &FluentArgs) -> FluentResult<FluentValue> + Send + Sync + 'static,
    {
        Self {
            builtin: true,
            ..Self::new(spec, func)
        }
    }

    /// Whether this is one of the functions every bundle starts with.
    #[inline]
    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    /// Checks the arguments, then calls the function.
    pub fn call(
        &self,
        name: &str,
        positional: &[FluentValue],
        named: &FluentArgs,
    ) -> FluentResult<FluentValue> {
        self.spec.check(name, positional.len(), named.keys())?;
        (self.func)(positional, named)
    }
}

impl fmt::Debug for FluentFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("FluentFunction")
            .field("spec", &self.spec)
            .field("builtin", &self.builtin)
            .finish()
    }
}

/// Functions available to one bundle, builtins included.
#[derive(Debug, Clone)]
pub struct FunctionTable {
    functions: HashMap<SmolStr, FluentFunction>,
}

impl FunctionTable {
    /// Table with only the builtins.
    pub fn new() -> Self {
        let mut functions = HashMap::new();
        functions.insert(
            SmolStr::from("NUMBER"),
            FluentFunction::builtin(FunctionSpec::with_keywords(1, NUMBER_OPTIONS), number),
        );
        functions.insert(
            SmolStr::from("DATETIME"),
            FluentFunction::builtin(FunctionSpec::with_keywords(1, DATETIME_OPTIONS), datetime),
        );
        Self { functions }
    }

    /// Adds a function, replacing any builtin of the same name.
    pub fn insert(&mut self, name: impl Into<SmolStr>, function: FluentFunction) {
        self.functions.insert(name.into(), function);
    }

    /// Builder form of `insert`.
    pub fn with(mut self, name: impl Into<SmolStr>, function: FluentFunction) -> Self {
        self.insert(name, function);
        self
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&FluentFunction> {
        self.functions.get(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }
}

impl Default for FunctionTable {
    #[inline]
    fn default() -> Self {
        FunctionTable::new()
    }
}

/// `NUMBER(value, ...options)`
pub fn number(positional: &[FluentValue], named: &FluentArgs) -> FluentResult<FluentValue> {
    let mut number = match positional.first() {
        Some(FluentValue::Number(n)) => n.clone(),
        Some(FluentValue::String(s)) => match s.trim().parse::<f64>() {
            Ok(value) => FluentNumber::new(value),
            Err(_) => {
                return Err(FluentError::type_error(format!(
                    "NUMBER() argument must be a number, not '{}'",
                    s
                )))
            }
        },
        Some(FluentValue::None(none)) => return Ok(FluentValue::None(none.clone())),
        Some(_) | None => {
            return Err(FluentError::type_error("NUMBER() argument must be a number"))
        }
    };

    number.options.merge(named)?;
    number.options.validate()?;
    Ok(FluentValue::Number(number))
}

/// `DATETIME(value, ...options)`
pub fn datetime(positional: &[FluentValue], named: &FluentArgs) -> FluentResult<FluentValue> {
    match positional.first() {
        Some(FluentValue::DateTime(d)) => {
            let mut d = d.clone();
            d.options.merge(named, d.has_time)?;
            Ok(FluentValue::DateTime(d))
        }
        Some(FluentValue::None(none)) => Ok(FluentValue::None(none.clone())),
        Some(_) | None => Err(FluentError::type_error(
            "DATETIME() argument must be a date or datetime",
        )),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::NumberStyle;

    #[test]
    fn test_check() {
        let spec = FunctionSpec::with_keywords(1, &["style"]);
        assert!(spec.check("F", 1, ["style"]).is_ok());
        assert_eq!(
            spec.check("F", 2, []),
            Err(FluentError::type_error(
                "F() takes 1 positional arguments but 2 were given"
            ))
        );
        assert_eq!(
            spec.check("F", 1, ["other"]),
            Err(FluentError::type_error(
                "F() got an unexpected keyword argument 'other'"
            ))
        );
        assert_eq!(
            spec.check("F", 1, ["bad-name"]),
            Err(FluentError::format_error(
                "F() has invalid keyword argument name 'bad-name'"
            ))
        );

        let any = FunctionSpec::new(0, Keywords::Any);
        assert!(any.check("G", 0, ["bad-name", "x"]).is_ok());
    }

    #[test]
    fn test_number_merges_options() {
        let first = number(
            &[1.5.into()],
            &FluentArgs::new().with("minimumFractionDigits", 2),
        )
        .unwrap();
        let second = number(&[first], &FluentArgs::new().with("style", "percent")).unwrap();
        let n = second.as_number().unwrap();
        assert_eq!(n.options.style, NumberStyle::Percent);
        assert_eq!(n.options.minimum_fraction_digits, Some(2));

        let third = number(
            &[second.clone()],
            &FluentArgs::new().with("minimumFractionDigits", 0),
        )
        .unwrap();
        assert_eq!(third.as_number().unwrap().options.minimum_fraction_digits, Some(0));
    }

    #[test]
    fn test_number_rejects_text() {
        assert!(matches!(
            number(&["abc".into()], &FluentArgs::new()),
            Err(FluentError::Type(_))
        ));
        assert!(number(&["42".into()], &FluentArgs::new()).is_ok());
    }

    #[test]
    fn test_custom_override() {
        let table = FunctionTable::new().with(
            "NUMBER",
            FluentFunction::new(FunctionSpec::new(1, Keywords::Any), |_, _| {
                Ok(FluentValue::from("custom"))
            }),
        );
        let func = table.get("NUMBER").unwrap();
        assert!(!func.is_builtin());
        assert!(table.get("DATETIME").unwrap().is_builtin());
        assert_eq!(
            func.call("NUMBER", &[1.into()], &FluentArgs::new()),
            Ok(FluentValue::from("custom"))
        );
        assert!(table.contains("DATETIME"));
    }
}
