//! Values flowing through formatting.
use crate::{
    errors::{FluentError, FluentResult},
    locale::{Locale, Symbols},
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use fluent_syntax::ast::{NumberLiteral, VariantKey};
use smol_str::SmolStr;
use std::{collections::HashMap, fmt};

/// Runtime value of an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum FluentValue {
    String(String),
    Number(FluentNumber),
    DateTime(FluentDateTime),
    None(FluentNone),
    /// Text already escaped by the named escaper.
    Markup { escaper: SmolStr, text: String },
}

impl FluentValue {
    /// Formats the value for display in the given locale.
    pub fn format(&self, locale: &Locale) -> String {
        match self {
            FluentValue::String(s) => s.clone(),
            FluentValue::Number(n) => n.format(locale),
            FluentValue::DateTime(d) => d.format(locale),
            FluentValue::None(none) => none.format(),
            FluentValue::Markup { text, .. } => text.clone(),
        }
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, FluentValue::None(_))
    }

    #[inline]
    pub fn as_number(&self) -> Option<&FluentNumber> {
        match self {
            FluentValue::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Plain equality used to pick variants. `None` equals nothing.
    pub fn matches(&self, other: &FluentValue) -> bool {
        use FluentValue as V;
        match (self, other) {
            (V::String(a), V::String(b)) => a == b,
            (V::Number(a), V::Number(b)) => a.value == b.value,
            (V::Markup { text, .. }, V::String(s)) | (V::String(s), V::Markup { text, .. }) => {
                text == s
            }
            _ => false,
        }
    }

    /// Value a variant key stands for.
    pub fn from_key(key: &VariantKey) -> Self {
        match key {
            VariantKey::Identifier(id) => FluentValue::String(id.name.to_string()),
            VariantKey::NumberLiteral(n) => FluentValue::Number(FluentNumber::from_literal(n)),
        }
    }
}

/// Whether a selector value picks the variant with this key.
///
/// Keys match by plain equality, or, for numeric selectors, by the plural
/// category of the number in the locale. The plural path only runs from a
/// number to a category name; a string selector never matches a numeric key.
pub fn match_variant_key(selector: &FluentValue, key: &VariantKey, locale: &Locale) -> bool {
    match (selector, key) {
        (FluentValue::None(_), _) => false,
        (FluentValue::Number(n), VariantKey::Identifier(id)) => {
            locale.plural_category(&n.plural_operand()) == Some(id.name.as_str())
        }
        (selector, key) => selector.matches(&FluentValue::from_key(key)),
    }
}

impl From<String> for FluentValue {
    fn from(value: String) -> Self {
        FluentValue::String(value)
    }
}

impl From<&str> for FluentValue {
    fn from(value: &str) -> Self {
        FluentValue::String(value.to_string())
    }
}

macro_rules! impl_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for FluentValue {
                #[inline]
                fn from(value: $ty) -> Self {
                    FluentValue::Number(FluentNumber::new(value as f64))
                }
            }
        )*
    };
}

impl_from_number!(i8, i16, i32, i64, u8, u16, u32, u64, isize, usize, f32, f64);

impl From<FluentNumber> for FluentValue {
    fn from(value: FluentNumber) -> Self {
        FluentValue::Number(value)
    }
}

impl From<NaiveDate> for FluentValue {
    fn from(value: NaiveDate) -> Self {
        FluentValue::DateTime(FluentDateTime::from_date(value))
    }
}

impl From<NaiveDateTime> for FluentValue {
    fn from(value: NaiveDateTime) -> Self {
        FluentValue::DateTime(FluentDateTime::from_datetime(value))
    }
}

impl From<FluentDateTime> for FluentValue {
    fn from(value: FluentDateTime) -> Self {
        FluentValue::DateTime(value)
    }
}

impl From<FluentNone> for FluentValue {
    fn from(value: FluentNone) -> Self {
        FluentValue::None(value)
    }
}

/// Placeholder for a value that could not be resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FluentNone {
    pub name: Option<String>,
}

impl FluentNone {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    /// The fallback name, or `???` without one.
    pub fn format(&self) -> String {
        self.name.clone().unwrap_or_else(|| "???".to_string())
    }
}

/// Named arguments, either the external arguments of a format call, the
/// arguments of a term call, or the keyword arguments of a function.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FluentArgs(HashMap<SmolStr, FluentValue>);

impl FluentArgs {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<SmolStr>,
        V: Into<FluentValue>,
    {
        self.0.insert(key.into(), value.into());
    }

    /// Builder form of `set`.
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<SmolStr>,
        V: Into<FluentValue>,
    {
        self.set(key, value);
        self
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&FluentValue> {
        self.0.get(key)
    }

    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FluentValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(SmolStr::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for FluentArgs
where
    K: Into<SmolStr>,
    V: Into<FluentValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut args = FluentArgs::new();
        for (k, v) in iter {
            args.set(k, v);
        }
        args
    }
}

// ----------------------------------------------------------------------------
// Numbers

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberStyle {
    Decimal,
    Currency,
    Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencyDisplay {
    Symbol,
    Code,
    Name,
}

/// Formatting options of a number, named after the `NUMBER` keywords.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberFormatOptions {
    pub style: NumberStyle,
    pub currency: Option<SmolStr>,
    pub currency_display: CurrencyDisplay,
    pub use_grouping: bool,
    pub minimum_integer_digits: Option<usize>,
    pub minimum_fraction_digits: Option<usize>,
    pub maximum_fraction_digits: Option<usize>,
    pub minimum_significant_digits: Option<usize>,
    pub maximum_significant_digits: Option<usize>,
}

impl Default for NumberFormatOptions {
    fn default() -> Self {
        Self {
            style: NumberStyle::Decimal,
            currency: None,
            currency_display: CurrencyDisplay::Symbol,
            use_grouping: true,
            minimum_integer_digits: None,
            minimum_fraction_digits: None,
            maximum_fraction_digits: None,
            minimum_significant_digits: None,
            maximum_significant_digits: None,
        }
    }
}

/// Keywords `NUMBER` understands.
pub const NUMBER_OPTIONS: &[&str] = &[
    "style",
    "currency",
    "currencyDisplay",
    "useGrouping",
    "minimumIntegerDigits",
    "minimumFractionDigits",
    "maximumFractionDigits",
    "minimumSignificantDigits",
    "maximumSignificantDigits",
];

impl NumberFormatOptions {
    /// Overlays keyword arguments. Options not named keep their value.
    pub fn merge(&mut self, named: &FluentArgs) -> FluentResult<()> {
        for (key, value) in named.iter() {
            match key {
                "style" => {
                    self.style = match option_str(key, value)? {
                        "decimal" => NumberStyle::Decimal,
                        "currency" => NumberStyle::Currency,
                        "percent" => NumberStyle::Percent,
                        other => return Err(invalid_option(key, other)),
                    }
                }
                "currency" => self.currency = Some(option_str(key, value)?.into()),
                "currencyDisplay" => {
                    self.currency_display = match option_str(key, value)? {
                        "symbol" => CurrencyDisplay::Symbol,
                        "code" => CurrencyDisplay::Code,
                        "name" => CurrencyDisplay::Name,
                        other => return Err(invalid_option(key, other)),
                    }
                }
                "useGrouping" => self.use_grouping = option_bool(key, value)?,
                "minimumIntegerDigits" => self.minimum_integer_digits = Some(option_usize(key, value)?),
                "minimumFractionDigits" => self.minimum_fraction_digits = Some(option_usize(key, value)?),
                "maximumFractionDigits" => self.maximum_fraction_digits = Some(option_usize(key, value)?),
                "minimumSignificantDigits" => {
                    self.minimum_significant_digits = Some(option_usize(key, value)?)
                }
                "maximumSignificantDigits" => {
                    self.maximum_significant_digits = Some(option_usize(key, value)?)
                }
                _ => {
                    return Err(FluentError::type_error(format!(
                        "NUMBER() got an unexpected keyword argument '{}'",
                        key
                    )))
                }
            }
        }
        Ok(())
    }

    /// A currency style needs a currency.
    pub fn validate(&self) -> FluentResult<()> {
        if self.style == NumberStyle::Currency && self.currency.is_none() {
            return Err(FluentError::type_error("currency must be provided"));
        }
        Ok(())
    }
}

fn option_str<'a>(key: &str, value: &'a FluentValue) -> FluentResult<&'a str> {
    match value {
        FluentValue::String(s) => Ok(s.as_str()),
        _ => Err(FluentError::type_error(format!("option '{}' must be a string", key))),
    }
}

fn option_bool(key: &str, value: &FluentValue) -> FluentResult<bool> {
    match value {
        FluentValue::Number(n) => Ok(n.value != 0.0),
        FluentValue::String(s) if s == "true" => Ok(true),
        FluentValue::String(s) if s == "false" => Ok(false),
        _ => Err(FluentError::type_error(format!("option '{}' must be a boolean", key))),
    }
}

fn option_usize(key: &str, value: &FluentValue) -> FluentResult<usize> {
    match value {
        FluentValue::Number(n) if n.value >= 0.0 && n.value.fract() == 0.0 && n.value <= 100.0 => {
            Ok(n.value as usize)
        }
        _ => Err(FluentError::type_error(format!(
            "option '{}' must be a whole number",
            key
        ))),
    }
}

fn invalid_option(key: &str, value: &str) -> FluentError {
    FluentError::type_error(format!("invalid value '{}' for option '{}'", value, key))
}

/// Number with the options it is formatted with.
#[derive(Debug, Clone, PartialEq)]
pub struct FluentNumber {
    pub value: f64,
    pub options: NumberFormatOptions,
}

impl FluentNumber {
    #[inline]
    pub fn new(value: f64) -> Self {
        Self {
            value,
            options: NumberFormatOptions::default(),
        }
    }

    #[inline]
    pub fn with_options(value: f64, options: NumberFormatOptions) -> Self {
        Self { value, options }
    }

    /// Number literal, keeping the precision it was written with.
    pub fn from_literal(literal: &NumberLiteral) -> Self {
        let mut number = FluentNumber::new(literal.as_f64());
        let digits = literal.fraction_digits();
        if digits > 0 {
            number.options.minimum_fraction_digits = Some(digits);
        }
        number
    }

    /// Decimal notation of the number as the plural rules see it.
    pub fn plural_operand(&self) -> String {
        match self.options.minimum_fraction_digits {
            Some(digits) if digits > 0 => format!("{:.*}", digits, self.value),
            _ => format!("{}", self.value),
        }
    }

    pub fn format(&self, locale: &Locale) -> String {
        let symbols = locale.symbols();
        let opts = &self.options;

        if !self.value.is_finite() {
            return format!("{}", self.value);
        }

        let value = match opts.style {
            NumberStyle::Percent => self.value * 100.0,
            _ => self.value,
        };

        let digits = match (opts.minimum_significant_digits, opts.maximum_significant_digits) {
            (None, None) => {
                let (default_min, default_max) = match opts.style {
                    NumberStyle::Decimal => (0, 3),
                    NumberStyle::Percent => (0, 0),
                    NumberStyle::Currency => {
                        let digits = currency_digits(opts.currency.as_deref());
                        (digits, digits)
                    }
                };
                let min_frac = opts.minimum_fraction_digits.unwrap_or(default_min);
                let max_frac = opts
                    .maximum_fraction_digits
                    .unwrap_or(default_max)
                    .max(min_frac);
                fixed_digits(value.abs(), min_frac, max_frac)
            }
            (min, max) => {
                let min = min.unwrap_or(1).max(1);
                let max = max.unwrap_or(min).max(min);
                significant_digits(value.abs(), min, max)
            }
        };

        let (int_part, frac_part) = match digits.split_once('.') {
            Some((int_part, frac_part)) => (int_part.to_string(), frac_part),
            None => (digits.clone(), ""),
        };

        let min_int = opts.minimum_integer_digits.unwrap_or(1);
        let int_part = if int_part.len() < min_int {
            format!("{}{}", "0".repeat(min_int - int_part.len()), int_part)
        } else {
            int_part
        };

        let mut out = String::new();
        let is_zero = digits.chars().all(|ch| ch == '0' || ch == '.');
        if value < 0.0 && !is_zero {
            out.push('-');
        }
        if opts.use_grouping {
            out.push_str(&group(&int_part, symbols.group));
        } else {
            out.push_str(&int_part);
        }
        if !frac_part.is_empty() {
            out.push_str(symbols.decimal);
            out.push_str(frac_part);
        }

        match opts.style {
            NumberStyle::Decimal => out,
            NumberStyle::Percent => format!("{}{}%", out, symbols.percent_spacing),
            NumberStyle::Currency => with_currency(out, opts, symbols),
        }
    }
}

/// Digits of `value` with between `min` and `max` fraction digits.
fn fixed_digits(value: f64, min: usize, max: usize) -> String {
    let mut s = format!("{:.*}", max, value);
    if let Some(point) = s.find('.') {
        let keep = point + 1 + min;
        while s.len() > keep && s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    s
}

/// Digits of `value` rounded to `max` significant digits, keeping at least `min`.
fn significant_digits(value: f64, min: usize, max: usize) -> String {
    if value == 0.0 {
        return if min > 1 {
            format!("0.{}", "0".repeat(min - 1))
        } else {
            "0".to_string()
        };
    }

    let scientific = format!("{:.*e}", max - 1, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some(parts) => parts,
        None => return scientific,
    };
    let exponent: i64 = exponent.parse().unwrap_or(0);

    let mut digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    while digits.len() > min && digits.ends_with('0') {
        digits.pop();
    }

    let point = exponent + 1;
    if point <= 0 {
        format!("0.{}{}", "0".repeat(point.unsigned_abs() as usize), digits)
    } else if point as usize >= digits.len() {
        let zeros = point as usize - digits.len();
        format!("{}{}", digits, "0".repeat(zeros))
    } else {
        let (int_part, frac_part) = digits.split_at(point as usize);
        format!("{}.{}", int_part, frac_part)
    }
}

/// Inserts the group separator every three integer digits.
fn group(int_part: &str, separator: &str) -> String {
    let len = int_part.len();
    let mut out = String::with_capacity(len + len / 3 * separator.len());
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}

#[rustfmt::skip]
static CURRENCIES: &[(&str, &str, usize)] = &[
    ("USD", "$",  2),
    ("EUR", "€",  2),
    ("GBP", "£",  2),
    ("JPY", "¥",  0),
    ("CHF", "CHF", 2),
];

fn currency_digits(code: Option<&str>) -> usize {
    CURRENCIES
        .iter()
        .find(|(c, _, _)| Some(*c) == code)
        .map(|(_, _, digits)| *digits)
        .unwrap_or(2)
}

fn with_currency(number: String, opts: &NumberFormatOptions, symbols: &Symbols) -> String {
    let code = opts.currency.as_deref().unwrap_or_default();
    let (sign, number) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest.to_string()),
        None => ("", number),
    };

    let (symbol, spacing) = match opts.currency_display {
        CurrencyDisplay::Code => (code, "\u{a0}"),
        // Display names are not part of the locale data; they fall back to the symbol.
        CurrencyDisplay::Symbol | CurrencyDisplay::Name => {
            let symbol = CURRENCIES
                .iter()
                .find(|(c, _, _)| *c == code)
                .map(|(_, symbol, _)| *symbol)
                .unwrap_or(code);
            (symbol, symbols.currency_spacing)
        }
    };

    if symbols.currency_prefix {
        format!("{}{}{}{}", sign, symbol, spacing, number)
    } else {
        format!("{}{}{}{}", sign, number, spacing, symbol)
    }
}

impl fmt::Display for FluentNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.plural_operand())
    }
}

// ----------------------------------------------------------------------------
// Dates

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    Full,
    Long,
    Medium,
    Short,
}

impl DateStyle {
    fn parse(key: &str, value: &FluentValue) -> FluentResult<Self> {
        match option_str(key, value)? {
            "full" => Ok(DateStyle::Full),
            "long" => Ok(DateStyle::Long),
            "medium" => Ok(DateStyle::Medium),
            "short" => Ok(DateStyle::Short),
            other => Err(invalid_option(key, other)),
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateFormatOptions {
    pub date_style: Option<DateStyle>,
    pub time_style: Option<DateStyle>,
    /// `UTC`, or a fixed offset like `+02:00`.
    pub time_zone: Option<SmolStr>,
}

/// Keywords `DATETIME` accepts.
pub const DATETIME_OPTIONS: &[&str] = &[
    "dateStyle",
    "timeStyle",
    "timeZone",
    "hour12",
    "weekday",
    "era",
    "year",
    "month",
    "day",
    "hour",
    "minute",
    "second",
    "timeZoneName",
];

impl DateFormatOptions {
    /// Overlays keyword arguments.
    ///
    /// Only the style and zone options affect the output, the rest are
    /// accepted and ignored.
    pub fn merge(&mut self, named: &FluentArgs, has_time: bool) -> FluentResult<()> {
        for (key, value) in named.iter() {
            match key {
                "dateStyle" => self.date_style = Some(DateStyle::parse(key, value)?),
                "timeStyle" => {
                    if !has_time {
                        return Err(FluentError::type_error(
                            "timeStyle option can only be specified for datetime instances, not date instance",
                        ));
                    }
                    self.time_style = Some(DateStyle::parse(key, value)?);
                }
                "timeZone" => {
                    let zone = option_str(key, value)?;
                    if zone_offset(zone).is_none() {
                        return Err(FluentError::type_error(format!("unknown time zone '{}'", zone)));
                    }
                    self.time_zone = Some(zone.into());
                }
                other if DATETIME_OPTIONS.contains(&other) => {
                    log::debug!("DATETIME option {} is not supported", other);
                }
                other => {
                    return Err(FluentError::type_error(format!(
                        "DATETIME() got an unexpected keyword argument '{}'",
                        other
                    )))
                }
            }
        }
        Ok(())
    }
}

/// Offset of a supported zone name, in seconds east of UTC.
fn zone_offset(zone: &str) -> Option<i64> {
    match zone {
        "UTC" | "Etc/UTC" | "GMT" | "Z" => Some(0),
        _ => {
            let (sign, rest) = match zone.as_bytes().first()? {
                b'+' => (1, &zone[1..]),
                b'-' => (-1, &zone[1..]),
                _ => return None,
            };
            let (hours, minutes) = rest.split_once(':')?;
            let hours: i64 = hours.parse().ok()?;
            let minutes: i64 = minutes.parse().ok()?;
            if hours > 14 || minutes > 59 {
                return None;
            }
            Some(sign * (hours * 3600 + minutes * 60))
        }
    }
}

/// Date, or date and time, in UTC.
#[derive(Debug, Clone, PartialEq)]
pub struct FluentDateTime {
    pub value: NaiveDateTime,
    /// Date only values cannot be formatted with a time style.
    pub has_time: bool,
    pub options: DateFormatOptions,
}

impl FluentDateTime {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            value: date.and_hms_opt(0, 0, 0).unwrap_or_default(),
            has_time: false,
            options: DateFormatOptions::default(),
        }
    }

    pub fn from_datetime(value: NaiveDateTime) -> Self {
        Self {
            value,
            has_time: true,
            options: DateFormatOptions::default(),
        }
    }

    pub fn format(&self, locale: &Locale) -> String {
        let patterns = &locale.symbols().dates;
        let zone = self.options.time_zone.as_deref().unwrap_or("UTC");

        let value = match (self.has_time, zone_offset(zone)) {
            (true, Some(offset)) => self.value + Duration::seconds(offset),
            _ => self.value,
        };

        let date = |style: DateStyle| value.format(patterns.date[style.index()]).to_string();
        let time = |style: DateStyle| {
            value
                .format(patterns.time[style.index()])
                .to_string()
                .replace("{tz}", zone)
        };

        match (self.options.date_style, self.options.time_style) {
            (None, None) => date(DateStyle::Medium),
            (None, Some(t)) => time(t),
            (Some(d), None) => date(d),
            (Some(d), Some(t)) => patterns
                .datetime
                .replace("{1}", &date(d))
                .replace("{0}", &time(t)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn en() -> Locale {
        Locale::resolve(&["en-US"])
    }

    fn number(value: f64, named: &[(&str, FluentValue)]) -> FluentNumber {
        let mut n = FluentNumber::new(value);
        let args: FluentArgs = named.iter().cloned().collect();
        n.options.merge(&args).unwrap();
        n
    }

    #[test]
    fn test_decimal() {
        let en = en();
        assert_eq!(FluentNumber::new(1234567.0).format(&en), "1,234,567");
        assert_eq!(FluentNumber::new(-1.5).format(&en), "-1.5");
        assert_eq!(FluentNumber::new(0.12345).format(&en), "0.123");
        assert_eq!(FluentNumber::new(-0.0001).format(&en), "0");

        let de = Locale::resolve(&["de"]);
        assert_eq!(FluentNumber::new(1234.5).format(&de), "1.234,5");
    }

    #[test]
    fn test_fraction_digits() {
        let en = en();
        let n = number(1.0, &[("minimumFractionDigits", 2.into())]);
        assert_eq!(n.format(&en), "1.00");
        let n = number(3.14159, &[("maximumFractionDigits", 1.into())]);
        assert_eq!(n.format(&en), "3.1");
        let n = number(7.0, &[("minimumIntegerDigits", 3.into())]);
        assert_eq!(n.format(&en), "007");
        let n = number(1234.0, &[("useGrouping", 0.into())]);
        assert_eq!(n.format(&en), "1234");
    }

    #[test]
    fn test_significant_digits() {
        let en = en();
        let n = number(123456.0, &[("maximumSignificantDigits", 3.into())]);
        assert_eq!(n.format(&en), "123,000");
        let n = number(0.00123, &[("maximumSignificantDigits", 2.into())]);
        assert_eq!(n.format(&en), "0.0012");
        let n = number(1.5, &[("minimumSignificantDigits", 3.into())]);
        assert_eq!(n.format(&en), "1.50");
    }

    #[test]
    fn test_percent_and_currency() {
        let en = en();
        let n = number(0.25, &[("style", "percent".into())]);
        assert_eq!(n.format(&en), "25%");

        let n = number(
            1234.5,
            &[("style", "currency".into()), ("currency", "USD".into())],
        );
        assert_eq!(n.format(&en), "$1,234.50");

        let n = number(
            -3.0,
            &[
                ("style", "currency".into()),
                ("currency", "EUR".into()),
                ("currencyDisplay", "code".into()),
            ],
        );
        assert_eq!(n.format(&en), "-EUR\u{a0}3.00");

        let de = Locale::resolve(&["de"]);
        let n = number(5.0, &[("style", "currency".into()), ("currency", "EUR".into())]);
        assert_eq!(n.format(&de), "5,00\u{a0}€");
    }

    #[test]
    fn test_options_validation() {
        let mut n = FluentNumber::new(1.0);
        let args = FluentArgs::new().with("style", "currency");
        n.options.merge(&args).unwrap();
        assert_eq!(
            n.options.validate(),
            Err(FluentError::type_error("currency must be provided"))
        );

        let args = FluentArgs::new().with("style", "fancy");
        assert!(n.options.merge(&args).is_err());
    }

    #[test]
    fn test_plural_operand() {
        let literal = NumberLiteral {
            value: "1.50".to_string(),
            span: None,
        };
        let n = FluentNumber::from_literal(&literal);
        assert_eq!(n.plural_operand(), "1.50");
        assert_eq!(FluentNumber::new(3.0).plural_operand(), "3");
        assert_eq!(n.format(&en()), "1.50");
    }

    #[test]
    fn test_match_variant_key() {
        let en = en();
        let one = VariantKey::Identifier(fluent_syntax::ast::Identifier::new("one"));
        assert!(match_variant_key(&1.into(), &one, &en));
        assert!(!match_variant_key(&2.into(), &one, &en));
        assert!(match_variant_key(&"one".into(), &one, &en));
        assert!(!match_variant_key(&FluentNone::new("one").into(), &one, &en));

        let literal = VariantKey::NumberLiteral(NumberLiteral {
            value: "1".to_string(),
            span: None,
        });
        assert!(match_variant_key(&1.into(), &literal, &en));
        assert!(!match_variant_key(&"1".into(), &literal, &en));
    }

    #[test]
    fn test_dates() {
        let en = en();
        let date = NaiveDate::from_ymd_opt(2018, 2, 1).unwrap();
        let d = FluentDateTime::from_date(date);
        assert_eq!(d.format(&en), "Feb 1, 2018");

        let mut d = FluentDateTime::from_datetime(date.and_hms_opt(14, 15, 16).unwrap());
        let args = FluentArgs::new().with("dateStyle", "short").with("timeStyle", "short");
        d.options.merge(&args, d.has_time).unwrap();
        assert_eq!(d.format(&en), "2/1/18, 2:15 PM");

        let args = FluentArgs::new().with("timeZone", "+01:30").with("timeStyle", "long");
        d.options.merge(&args, true).unwrap();
        assert_eq!(d.format(&en), "2/1/18, 3:45:16 PM +01:30");
    }

    #[test]
    fn test_time_style_on_date() {
        let mut d = FluentDateTime::from_date(NaiveDate::from_ymd_opt(2018, 2, 1).unwrap());
        let args = FluentArgs::new().with("timeStyle", "short");
        assert!(matches!(d.options.merge(&args, d.has_time), Err(FluentError::Type(_))));
    }
}
