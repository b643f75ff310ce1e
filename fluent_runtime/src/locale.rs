//! Locale resolution and locale data.
//!
//! Plural categories come from `intl_pluralrules`. Number symbols and date
//! patterns come from a small table, keyed by language only.
use intl_pluralrules::{PluralCategory, PluralRuleType, PluralRules};
use log::warn;
use std::fmt;
use unic_langid::LanguageIdentifier;

/// Language used when none of the requested locales is known.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Number and date formatting data of one language.
#[derive(Debug)]
pub struct Symbols {
    pub language: &'static str,
    pub decimal: &'static str,
    pub group: &'static str,
    /// Between the number and the percent sign.
    pub percent_spacing: &'static str,
    /// Whether the currency symbol goes in front of the number.
    pub currency_prefix: bool,
    pub currency_spacing: &'static str,
    pub dates: DatePatterns,
}

/// `chrono` format strings, indexed full, long, medium, short.
///
/// `{tz}` in a time pattern is replaced with the zone name.
#[derive(Debug)]
pub struct DatePatterns {
    pub date: [&'static str; 4],
    pub time: [&'static str; 4],
    /// `{1}` is replaced with the date, `{0}` with the time.
    pub datetime: &'static str,
}

#[rustfmt::skip]
static SYMBOLS: &[Symbols] = &[
    Symbols {
        language: "en", decimal: ".", group: ",",
        percent_spacing: "", currency_prefix: true, currency_spacing: "",
        dates: DatePatterns {
            date: ["%A, %B %-d, %Y", "%B %-d, %Y", "%b %-d, %Y", "%-m/%-d/%y"],
            time: ["%-I:%M:%S %p {tz}", "%-I:%M:%S %p {tz}", "%-I:%M:%S %p", "%-I:%M %p"],
            datetime: "{1}, {0}",
        },
    },
    Symbols {
        language: "de", decimal: ",", group: ".",
        percent_spacing: "\u{a0}", currency_prefix: false, currency_spacing: "\u{a0}",
        dates: DatePatterns {
            date: ["%d.%m.%Y", "%d.%m.%Y", "%d.%m.%Y", "%d.%m.%y"],
            time: ["%H:%M:%S {tz}", "%H:%M:%S {tz}", "%H:%M:%S", "%H:%M"],
            datetime: "{1}, {0}",
        },
    },
    Symbols {
        language: "fr", decimal: ",", group: "\u{202f}",
        percent_spacing: "\u{202f}", currency_prefix: false, currency_spacing: "\u{a0}",
        dates: DatePatterns {
            date: ["%d/%m/%Y", "%d/%m/%Y", "%d/%m/%Y", "%d/%m/%Y"],
            time: ["%H:%M:%S {tz}", "%H:%M:%S {tz}", "%H:%M:%S", "%H:%M"],
            datetime: "{1} {0}",
        },
    },
    Symbols {
        language: "es", decimal: ",", group: ".",
        percent_spacing: "\u{a0}", currency_prefix: false, currency_spacing: "\u{a0}",
        dates: DatePatterns {
            date: ["%d/%m/%Y", "%d/%m/%Y", "%d/%m/%Y", "%-d/%-m/%y"],
            time: ["%-H:%M:%S ({tz})", "%-H:%M:%S {tz}", "%-H:%M:%S", "%-H:%M"],
            datetime: "{1}, {0}",
        },
    },
    Symbols {
        language: "it", decimal: ",", group: ".",
        percent_spacing: "", currency_prefix: false, currency_spacing: "\u{a0}",
        dates: DatePatterns {
            date: ["%d/%m/%Y", "%d/%m/%Y", "%d/%m/%Y", "%d/%m/%y"],
            time: ["%H:%M:%S {tz}", "%H:%M:%S {tz}", "%H:%M:%S", "%H:%M"],
            datetime: "{1}, {0}",
        },
    },
    Symbols {
        language: "nl", decimal: ",", group: ".",
        percent_spacing: "", currency_prefix: true, currency_spacing: "\u{a0}",
        dates: DatePatterns {
            date: ["%d-%m-%Y", "%d-%m-%Y", "%d-%m-%Y", "%d-%m-%Y"],
            time: ["%H:%M:%S {tz}", "%H:%M:%S {tz}", "%H:%M:%S", "%H:%M"],
            datetime: "{1} {0}",
        },
    },
    Symbols {
        language: "ru", decimal: ",", group: "\u{a0}",
        percent_spacing: "\u{a0}", currency_prefix: false, currency_spacing: "\u{a0}",
        dates: DatePatterns {
            date: ["%d.%m.%Y", "%d.%m.%Y", "%d.%m.%Y", "%d.%m.%Y"],
            time: ["%H:%M:%S {tz}", "%H:%M:%S {tz}", "%H:%M:%S", "%H:%M"],
            datetime: "{1}, {0}",
        },
    },
    Symbols {
        language: "pl", decimal: ",", group: "\u{a0}",
        percent_spacing: "", currency_prefix: false, currency_spacing: "\u{a0}",
        dates: DatePatterns {
            date: ["%d.%m.%Y", "%d.%m.%Y", "%d.%m.%Y", "%d.%m.%Y"],
            time: ["%H:%M:%S {tz}", "%H:%M:%S {tz}", "%H:%M:%S", "%H:%M"],
            datetime: "{1}, {0}",
        },
    },
    Symbols {
        language: "ja", decimal: ".", group: ",",
        percent_spacing: "", currency_prefix: true, currency_spacing: "",
        dates: DatePatterns {
            date: ["%Y/%m/%d", "%Y/%m/%d", "%Y/%m/%d", "%Y/%m/%d"],
            time: ["%-H:%M:%S {tz}", "%-H:%M:%S {tz}", "%-H:%M:%S", "%-H:%M"],
            datetime: "{1} {0}",
        },
    },
];

/// Locale bound to a bundle.
pub struct Locale {
    langid: LanguageIdentifier,
    rules: Option<PluralRules>,
    symbols: &'static Symbols,
}

impl Locale {
    /// Picks the first requested tag with known plural rules.
    ///
    /// Each tag is tried as given, then reduced to its language. When
    /// nothing matches, the default language is used.
    pub fn resolve<S: AsRef<str>>(tags: &[S]) -> Self {
        for tag in tags {
            let langid = match tag.as_ref().parse::<LanguageIdentifier>() {
                Ok(langid) => langid,
                Err(_) => continue,
            };

            if let Ok(rules) = PluralRules::create(langid.clone(), PluralRuleType::CARDINAL) {
                return Self::with_rules(langid, Some(rules));
            }

            let language = LanguageIdentifier::from_parts(langid.language, None, None, &[]);
            if let Ok(rules) = PluralRules::create(language.clone(), PluralRuleType::CARDINAL) {
                return Self::with_rules(language, Some(rules));
            }
        }

        let requested: Vec<&str> = tags.iter().map(AsRef::as_ref).collect();
        warn!(
            "no known locale in {:?}, falling back to '{}'",
            requested, DEFAULT_LANGUAGE
        );

        let langid: LanguageIdentifier = DEFAULT_LANGUAGE.parse().unwrap_or_default();
        let rules = PluralRules::create(langid.clone(), PluralRuleType::CARDINAL).ok();
        Self::with_rules(langid, rules)
    }

    fn with_rules(langid: LanguageIdentifier, rules: Option<PluralRules>) -> Self {
        let symbols = symbols_for(langid.language.as_str());
        Self {
            langid,
            rules,
            symbols,
        }
    }

    #[inline]
    pub fn language_identifier(&self) -> &LanguageIdentifier {
        &self.langid
    }

    #[inline]
    pub fn symbols(&self) -> &'static Symbols {
        self.symbols
    }

    /// CLDR cardinal category of a number written in plain decimal notation.
    ///
    /// Trailing fraction zeros are significant: `"1"` and `"1.0"` can
    /// fall into different categories.
    pub fn plural_category(&self, operand: &str) -> Option<&'static str> {
        let rules = self.rules.as_ref()?;
        let category = rules.select(operand).ok()?;
        Some(match category {
            PluralCategory::ZERO => "zero",
            PluralCategory::ONE => "one",
            PluralCategory::TWO => "two",
            PluralCategory::FEW => "few",
            PluralCategory::MANY => "many",
            PluralCategory::OTHER => "other",
        })
    }
}

impl fmt::Debug for Locale {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Locale")
            .field("langid", &self.langid.to_string())
            .field("symbols", &self.symbols.language)
            .finish()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.langid)
    }
}

/// Whether the identifier names a CLDR plural category.
#[inline]
pub fn is_plural_category(name: &str) -> bool {
    matches!(name, "zero" | "one" | "two" | "few" | "many" | "other")
}

fn symbols_for(language: &str) -> &'static Symbols {
    SYMBOLS
        .iter()
        .find(|symbols| symbols.language == language)
        .unwrap_or(&SYMBOLS[0])
}
