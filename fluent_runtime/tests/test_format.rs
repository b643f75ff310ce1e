use fluent_runtime::prelude::*;

const MESSAGES: &str = include_str!("messages.ftl");

const STRATEGIES: &[Strategy] = &[Strategy::Interpret, Strategy::Compile];

fn bundle(strategy: Strategy) -> FluentBundle {
    let config = BundleConfig {
        use_isolating: false,
        strategy,
        ..BundleConfig::default()
    };
    let mut bundle = FluentBundle::with_config(&["en-US"], FunctionTable::new(), config);
    let junk = bundle.add_messages(MESSAGES);
    assert!(junk.is_empty(), "{:?}", junk);
    bundle
}

fn args() -> FluentArgs {
    FluentArgs::new()
        .with("name", "World")
        .with("count", 3)
        .with("amount", 1.5)
        .with("choice", "b")
}

/// Formats with both strategies and checks they agree.
fn format(id: &str, attr: Option<&str>, args: &FluentArgs) -> (String, Vec<FluentError>) {
    let interpreted = bundle(Strategy::Interpret).format(id, attr, args);
    let compiled = bundle(Strategy::Compile).format(id, attr, args);
    assert_eq!(interpreted, compiled, "strategies disagree on {}", id);
    compiled
}

fn text(id: &str) -> String {
    let (text, errors) = format(id, None, &args());
    assert!(errors.is_empty(), "{}: {:?}", id, errors);
    text
}

#[test]
fn test_simple_messages() {
    assert_eq!(text("hello"), "Hello, World!");
    assert_eq!(text("brand-name"), "Firefox");
    assert_eq!(text("string-literal"), "literal");
    assert_eq!(text("number-literal"), "1.50");
    assert_eq!(text("both"), "Hello, World! You have 3 emails");
}

#[test]
fn test_plural_select() {
    let emails = |count: i32| format("emails", None, &FluentArgs::new().with("count", count)).0;
    assert_eq!(emails(0), "No emails");
    assert_eq!(emails(1), "One email");
    assert_eq!(emails(3), "3 emails");
}

#[test]
fn test_select_on_string() {
    assert_eq!(text("default-first"), "B");

    let args = FluentArgs::new().with("choice", "a");
    assert_eq!(format("default-first", None, &args).0, "A");

    let args = FluentArgs::new().with("choice", "c");
    assert_eq!(format("default-first", None, &args).0, "A");
}

#[test]
fn test_literal_select() {
    assert_eq!(text("literal-select"), "other");

    let bundle = bundle(Strategy::Compile);
    let source = bundle.compiled_source("literal-select").unwrap();
    assert!(!source.contains("if "), "{}", source);
}

#[test]
fn test_terms() {
    assert_eq!(text("brand-gender"), "He");
    assert_eq!(text("thing-definite"), "the thing");
    assert_eq!(text("thing-indefinite"), "a thing");
}

#[test]
fn test_number_options() {
    assert_eq!(text("price"), "1.50");
    assert_eq!(text("nested-number"), "1.5");
}

#[test]
fn test_attributes() {
    assert_eq!(text("attr-ref"), "Title for World");
    assert_eq!(
        format("attrs", Some("title"), &args()),
        ("Title for World".to_string(), vec![])
    );

    let (text, errors) = format("attr-fallback", None, &args());
    assert_eq!(text, "Attributes");
    assert_eq!(
        errors,
        vec![FluentError::Reference(ReferenceKind::Attribute {
            id: "attrs".to_string(),
            name: "missing".to_string(),
        })]
    );
}

#[test]
fn test_missing_references() {
    let (text, errors) = format("missing", None, &args());
    assert_eq!(text, "nope -nope NOPE()");
    assert_eq!(
        errors,
        vec![
            FluentError::Reference(ReferenceKind::Message("nope".to_string())),
            FluentError::Reference(ReferenceKind::Term("-nope".to_string())),
            FluentError::Reference(ReferenceKind::Function("NOPE".to_string())),
        ]
    );
}

#[test]
fn test_missing_external() {
    for strategy in STRATEGIES {
        let (text, errors) = bundle(*strategy).format("hello", None, &FluentArgs::new());
        assert_eq!(text, "Hello, name!");
        assert_eq!(
            errors,
            vec![FluentError::Reference(ReferenceKind::External("name".to_string()))]
        );
    }
}

#[test]
fn test_untaken_branch_arguments() {
    let source = "foo = { $gender ->\n    [male] { $name }\n   *[other] someone\n}\n";
    for strategy in STRATEGIES {
        let config = BundleConfig {
            use_isolating: false,
            strategy: *strategy,
            ..BundleConfig::default()
        };
        let mut bundle = FluentBundle::with_config(&["en-US"], FunctionTable::new(), config);
        bundle.add_messages(source);

        let args = FluentArgs::new().with("gender", "other");
        assert_eq!(bundle.format("foo", None, &args), ("someone".to_string(), vec![]));

        let args = FluentArgs::new().with("gender", "male");
        assert_eq!(
            bundle.format("foo", None, &args),
            (
                "name".to_string(),
                vec![FluentError::Reference(ReferenceKind::External("name".to_string()))]
            )
        );
    }
}

#[test]
fn test_term_attribute_fallback() {
    let source = "\
-t = T
    .attr = A
foo = { -t.missing ->
    [T] got-T
   *[other] other
}
";
    for strategy in STRATEGIES {
        let config = BundleConfig {
            use_isolating: false,
            strategy: *strategy,
            ..BundleConfig::default()
        };
        let mut bundle = FluentBundle::with_config(&["en-US"], FunctionTable::new(), config);
        assert!(bundle.add_messages(source).is_empty());
        assert_eq!(
            bundle.format("foo", None, &FluentArgs::new()),
            (
                "got-T".to_string(),
                vec![FluentError::Reference(ReferenceKind::Attribute {
                    id: "-t".to_string(),
                    name: "missing".to_string(),
                })]
            )
        );

        // Term attributes are only valid as selectors.
        let junk = bundle.add_messages("bar = { -t.missing }\n");
        assert_eq!(junk.len(), 1);
        assert_eq!(junk[0].annotations[0].code, "E0019");
    }
}

#[test]
fn test_isolation() {
    for strategy in STRATEGIES {
        let config = BundleConfig {
            strategy: *strategy,
            ..BundleConfig::default()
        };
        let mut bundle = FluentBundle::with_config(&["en-US"], FunctionTable::new(), config);
        bundle.add_messages("foo = Foo { $arg }\nbar = { $arg }\n");
        let args = FluentArgs::new().with("arg", "Bar");
        assert_eq!(bundle.format("foo", None, &args).0, "Foo \u{2068}Bar\u{2069}");
        assert_eq!(bundle.format("bar", None, &args).0, "Bar");
    }
}

#[test]
fn test_custom_function() {
    let shout = FluentFunction::new(FunctionSpec::new(1, Keywords::Any), |positional, _| {
        Ok(FluentValue::String(match positional.first() {
            Some(FluentValue::String(s)) => s.to_uppercase(),
            _ => String::new(),
        }))
    });

    for strategy in STRATEGIES {
        let config = BundleConfig {
            use_isolating: false,
            strategy: *strategy,
            ..BundleConfig::default()
        };
        let functions = FunctionTable::new().with("SHOUT", shout.clone());
        let mut bundle = FluentBundle::with_config(&["en-US"], functions, config);
        bundle.add_messages("loud = { SHOUT($word) }\nwrong = { SHOUT() }\n");

        let args = FluentArgs::new().with("word", "hey");
        assert_eq!(bundle.format("loud", None, &args), ("HEY".to_string(), vec![]));
        assert_eq!(
            bundle.format("wrong", None, &args),
            (
                "SHOUT()".to_string(),
                vec![FluentError::Type(
                    "SHOUT() takes 1 positional arguments but 0 were given".to_string()
                )]
            )
        );
    }
}

#[test]
fn test_format_pattern() {
    let bundle = bundle(Strategy::Compile);
    let resource = fluent_syntax::parser::parse("x = Hi { $name }\n");
    let pattern = match &resource.body[0] {
        fluent_syntax::ast::Entry::Message(m) => m.value.clone().unwrap(),
        other => panic!("unexpected {:?}", other),
    };
    assert_eq!(
        bundle.format_pattern(&pattern, &args()),
        ("Hi World".to_string(), vec![])
    );
}
