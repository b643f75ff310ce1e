use fluent_runtime::prelude::*;

const BOMB: &str = include_str!("bomb.ftl");
const EMPTY_BOMB: &str = include_str!("empty_bomb.ftl");
const CONFIG: &str = include_str!("bundle.yaml");

const STRATEGIES: &[Strategy] = &[Strategy::Interpret, Strategy::Compile];

fn init_logger() {
    // Several tests race to install it.
    let _ = simple_logger::SimpleLogger::new().env().init();
}

fn bundle(source: &str, config: BundleConfig) -> FluentBundle {
    init_logger();
    let mut bundle = FluentBundle::with_config(&["en-US"], FunctionTable::new(), config);
    assert!(bundle.add_messages(source).is_empty());
    bundle
}

fn config(strategy: Strategy) -> BundleConfig {
    BundleConfig {
        use_isolating: false,
        strategy,
        ..BundleConfig::default()
    }
}

#[test]
fn test_billion_laughs() {
    for strategy in STRATEGIES {
        let bundle = bundle(BOMB, config(*strategy));
        let (text, errors) = bundle.format("lolz", None, &FluentArgs::new());
        assert_eq!(text, "{???}");
        // lol2 expands to 5000 characters long before the parts run out.
        assert_eq!(
            errors,
            vec![FluentError::ResourceExhausted(Exhausted::TooManyCharacters {
                len: 5000,
                max: 2500
            })]
        );

        // Small expansions still work.
        let (text, errors) = bundle.format("lol1", None, &FluentArgs::new());
        assert_eq!(text.len(), 500);
        assert!(errors.is_empty());
    }
}

#[test]
fn test_billion_empty_laughs() {
    for strategy in STRATEGIES {
        let bundle = bundle(EMPTY_BOMB, config(*strategy));
        assert_eq!(
            bundle.format("lolz", None, &FluentArgs::new()),
            (
                "{???}".to_string(),
                vec![FluentError::ResourceExhausted(Exhausted::TooManyParts { max: 1000 })]
            )
        );
        assert_eq!(
            bundle.format("lol2", None, &FluentArgs::new()),
            (String::new(), vec![])
        );
    }
}

#[test]
fn test_only_taken_branches_are_charged() {
    let source = "\
foo = { $n ->
    [0] a{ $n }b{ $n }
    [one] c{ $n }d{ $n }
   *[other] e{ $n }e{ $n }e{ $n }e{ $n }e{ $n }e{ $n }
}
";
    for strategy in STRATEGIES {
        let config = BundleConfig {
            max_parts: 10,
            ..config(*strategy)
        };
        let bundle = bundle(source, config);

        let format = |n: i32| bundle.format("foo", None, &FluentArgs::new().with("n", n));
        assert_eq!(format(0), ("a0b0".to_string(), vec![]));
        assert_eq!(format(1), ("c1d1".to_string(), vec![]));
        assert_eq!(
            format(5),
            (
                "{???}".to_string(),
                vec![FluentError::ResourceExhausted(Exhausted::TooManyParts { max: 10 })]
            )
        );
    }
}

#[test]
fn test_long_argument() {
    for strategy in STRATEGIES {
        let bundle = bundle("foo = Value: { $arg }\n", config(*strategy));

        let args = FluentArgs::new().with("arg", "x".repeat(2500));
        assert!(bundle.format("foo", None, &args).1.is_empty());

        let args = FluentArgs::new().with("arg", "x".repeat(2501));
        assert_eq!(
            bundle.format("foo", None, &args),
            (
                "{???}".to_string(),
                vec![FluentError::ResourceExhausted(Exhausted::TooManyCharacters {
                    len: 2501,
                    max: 2500
                })]
            )
        );
    }
}

#[test]
fn test_cycles() {
    let source = "foo = { bar }\nbar = { foo }\nself = { self }\nuses-foo = Uses { foo }\n";
    for strategy in STRATEGIES {
        let bundle = bundle(source, config(*strategy));
        let args = FluentArgs::new();

        assert_eq!(
            bundle.format("foo", None, &args),
            ("???".to_string(), vec![FluentError::cyclic("foo")])
        );
        assert_eq!(
            bundle.format("self", None, &args),
            ("???".to_string(), vec![FluentError::cyclic("self")])
        );

        let (text, errors) = bundle.format("uses-foo", None, &args);
        assert!(text.starts_with("Uses "), "{}", text);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].category(), "cyclic");
    }
}

#[test]
fn test_term_cycle() {
    let source = "-a = { -b }\n-b = { -a }\nfoo = Foo { -a }\n";
    for strategy in STRATEGIES {
        let bundle = bundle(source, config(*strategy));
        let (text, errors) = bundle.format("foo", None, &FluentArgs::new());
        assert!(text.starts_with("Foo "), "{}", text);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].category(), "cyclic");
    }
}

#[test]
fn test_config_file() {
    let config = BundleConfig::from_yaml_str(CONFIG).unwrap();
    assert_eq!(
        config,
        BundleConfig {
            use_isolating: false,
            max_parts: 50,
            max_part_length: BundleConfig::MAX_PART_LENGTH,
            strategy: Strategy::Interpret,
        }
    );

    let bundle = bundle(BOMB, config);
    assert_eq!(bundle.format("lol1", None, &FluentArgs::new()).0.len(), 500);
    assert_eq!(
        bundle.format("lol2", None, &FluentArgs::new()).1,
        vec![FluentError::ResourceExhausted(Exhausted::TooManyParts { max: 50 })]
    );
}

#[test]
fn test_invalid_config() {
    assert!(matches!(
        BundleConfig::from_yaml_str("max_parts: 0\n"),
        Err(ConfigError::Invalid(_))
    ));
    assert!(matches!(
        BundleConfig::from_yaml_str("max_depth: 3\n"),
        Err(ConfigError::Yaml(_))
    ));
}
