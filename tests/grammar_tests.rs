//! End-to-end tests for the bracketed grammar and the writer policies.

use serde::Serialize;
use serde_uon::{
    from_str, to_string, to_string_with_config, Arena, Config, ConfigBuilder, Error,
    FieldDescriptor, LexErrorKind, NodeId, Parser, Record, Serializer, Swap, TypeDescriptor,
    TypeRef, TypeRegistry, UriContext, Value,
};
use std::cell::RefCell;

fn parse(text: &str) -> serde_uon::Result<Value> {
    let config = Config::default();
    Parser::new(&config).parse(text, &TypeRef::dynamic())
}

fn write(value: &Value, config: &Config) -> String {
    Serializer::new(config)
        .serialize(value, &TypeRef::dynamic())
        .unwrap()
}

fn three_cycle() -> (Arena, NodeId) {
    let mut arena = Arena::new();
    let r1 = arena.reserve();
    let r2 = arena.reserve();
    let r3 = arena.reserve();
    arena.set(r1, Record::new("R1").with_field("name", "foo").with_field("r2", r2).into());
    arena.set(r2, Record::new("R2").with_field("name", "bar").with_field("r3", r3).into());
    arena.set(r3, Record::new("R3").with_field("name", "baz").with_field("r1", r1).into());
    (arena, r1)
}

fn animals() -> TypeRegistry {
    TypeRegistry::new()
        .with(
            TypeDescriptor::record("Dog")
                .with_field("name", TypeDescriptor::string())
                .with_field("age", TypeDescriptor::number()),
        )
        .with(
            TypeDescriptor::record("Cat")
                .with_field("name", TypeDescriptor::string())
                .with_field("lives", TypeDescriptor::number()),
        )
        .with(
            TypeDescriptor::record("Kennel")
                .with_field("owner", TypeDescriptor::string())
                .with_field("pets", TypeDescriptor::sequence(TypeRef::dynamic())),
        )
}

#[test]
fn test_lex_error_messages() {
    let cases = [
        ("(", "missing attribute name"),
        ("(a=1,", "missing attribute name"),
        ("(a", "missing '=' after attribute name"),
        ("(a=", "dangling '=' with no value"),
        ("(a=1", "missing closing delimiter"),
        ("@(1,(b=2)", "missing closing delimiter"),
    ];
    for (input, message) in cases {
        let err = parse(input).unwrap_err();
        assert!(
            err.to_string().starts_with(message),
            "{:?} gave {:?}",
            input,
            err.to_string()
        );
    }
}

#[test]
fn test_lex_errors_are_distinct() {
    let kinds: Vec<_> = ["(", "(a", "(a=", "(a=1"]
        .iter()
        .map(|s| parse(s).unwrap_err().lex_kind())
        .collect();
    assert_eq!(
        kinds,
        vec![
            Some(LexErrorKind::MissingAttributeName),
            Some(LexErrorKind::MissingEquals),
            Some(LexErrorKind::DanglingEquals),
            Some(LexErrorKind::MissingClosingDelimiter),
        ]
    );
}

#[test]
fn test_lex_error_through_serde() {
    let err = from_str::<Vec<u32>>("@(1,2").unwrap_err();
    assert!(matches!(
        err,
        Error::Lex {
            kind: LexErrorKind::MissingClosingDelimiter,
            ..
        }
    ));
}

#[test]
fn test_empty_value_and_containers() {
    let v = parse("(a=,b=(),c=@(),d=null)").unwrap();
    let map = v.as_map().unwrap();
    assert_eq!(map.get("a").and_then(Value::as_str), Some(""));
    assert_eq!(map.get("b").and_then(Value::as_map).map(|m| m.len()), Some(0));
    assert_eq!(map.get("c").and_then(Value::as_sequence).map(Vec::len), Some(0));
    assert_eq!(map.get("d"), Some(&Value::Null));
}

#[test]
fn test_quoted_tokens_stay_strings() {
    let v = parse(r#"(n='1',b="true",z='null',s='a,b=c(d)')"#).unwrap();
    let map = v.as_map().unwrap();
    assert_eq!(map.get("n").and_then(Value::as_str), Some("1"));
    assert_eq!(map.get("b").and_then(Value::as_str), Some("true"));
    assert_eq!(map.get("z").and_then(Value::as_str), Some("null"));
    assert_eq!(map.get("s").and_then(Value::as_str), Some("a,b=c(d)"));
}

#[test]
fn test_null_keys_round_trip() {
    let v = parse("(null=x,'null'=y)").unwrap();
    let map = v.as_map().unwrap();
    assert_eq!(map.get_null_key().and_then(Value::as_str), Some("x"));
    assert_eq!(map.get("null").and_then(Value::as_str), Some("y"));
    assert_eq!(write(&v, &Config::default()), "(null=x,'null'=y)");
}

#[test]
fn test_repeated_key_promotion_in_objects() {
    let v = parse("(a=1,b=x,a=2)").unwrap();
    let map = v.as_map().unwrap();
    assert_eq!(
        map.get("a"),
        Some(&Value::Sequence(vec![Value::from(1), Value::from(2)]))
    );
    assert_eq!(map.get("b").and_then(Value::as_str), Some("x"));
}

#[test]
fn test_trim_nulls() {
    #[derive(Serialize)]
    struct A {
        s1: Option<String>,
        s2: String,
    }
    let a = A {
        s1: None,
        s2: "s2".to_string(),
    };
    let untrimmed = Config::builder().with_trim_nulls(false).build();
    assert_eq!(to_string_with_config(&a, &untrimmed).unwrap(), "(s1=null,s2=s2)");
    assert_eq!(to_string(&a).unwrap(), "(s2=s2)");
}

#[test]
fn test_trimmed_collection_parses_back_as_null() {
    let types = TypeRegistry::new().with(
        TypeDescriptor::record("A")
            .with_field("f1", TypeDescriptor::sequence(TypeRef::dynamic()))
            .with_field("f2", TypeDescriptor::sequence(TypeRef::dynamic())),
    );
    let value: Value = Record::new("A")
        .with_field("f1", Value::Sequence(vec![]))
        .with_field(
            "f2",
            vec![Value::Null, Record::new("B").with_field("s2", "s2").into()],
        )
        .into();

    let trimmed = Config::builder().with_trim_empty_collections(true).build();
    let text = Serializer::new(&trimmed)
        .with_types(&types)
        .serialize(&value, &TypeRef::named("A"))
        .unwrap();
    assert_eq!(text, "(f2=@(null,(s2=s2)))");

    let back = Parser::new(&trimmed)
        .with_types(&types)
        .parse(&text, &TypeRef::named("A"))
        .unwrap();
    let record = back.as_record().unwrap();
    assert_eq!(record.get("f1"), Some(&Value::Null));
    assert_eq!(
        record
            .get("f2")
            .and_then(Value::as_sequence)
            .map(Vec::len),
        Some(2)
    );
}

#[test]
fn test_recursion_policies() {
    let (arena, root) = three_cycle();
    let root = Value::Ref(root);

    let off = Config::default();
    let err = Serializer::new(&off)
        .with_arena(&arena)
        .serialize(&root, &TypeRef::dynamic())
        .unwrap_err();
    assert!(matches!(err, Error::DepthExceeded { .. }));
    assert!(err.to_string().contains("detect_recursions"));

    let detect = Config::builder().with_detect_recursions(true).build();
    let message = Serializer::new(&detect)
        .with_arena(&arena)
        .serialize(&root, &TypeRef::dynamic())
        .unwrap_err()
        .to_string();
    let mut from = 0;
    for step in ["[0]root:R1", "[1]r2:R2", "[2]r3:R3", "[3]r1:R1"] {
        let at = message[from..]
            .find(step)
            .unwrap_or_else(|| panic!("{:?} missing from {:?}", step, message));
        from += at + step.len();
    }

    let ignore = detect.to_builder().with_ignore_recursions(true).build();
    let text = Serializer::new(&ignore)
        .with_arena(&arena)
        .serialize(&root, &TypeRef::dynamic())
        .unwrap();
    assert_eq!(text, "(name=foo,r2=(name=bar,r3=(name=baz)))");
}

#[test]
fn test_uri_base_resolution() {
    let link = |s: &str| -> Value { Record::new("L").with_field("href", Value::uri(s)).into() };

    let plain = Config::default();
    assert_eq!(write(&link("f0/x0"), &plain), "(href=f0/x0)");

    let based = Config::builder()
        .with_uri_context(
            UriContext::new()
                .with_relative_base("/cr")
                .with_absolute_path_base("http://foo:9080/bar/"),
        )
        .build();
    assert_eq!(write(&link("f0/x0"), &based), "(href=/cr/f0/x0)");
    assert_eq!(write(&link("/f1/x1"), &based), "(href=http://foo:9080/bar/f1/x1)");
    assert_eq!(
        write(&link("http://host/f3/x3"), &based),
        "(href=http://host/f3/x3)"
    );
    assert_eq!(
        write(&link("f2/x y?a=1&b=2"), &based),
        "(href='/cr/f2/x y?a=1&b=2')"
    );
}

#[test]
fn test_uri_typed_string_is_resolved() {
    let types = TypeRegistry::new()
        .with(TypeDescriptor::record("Link").with_field("href", TypeDescriptor::uri()));
    let config = Config::builder()
        .with_uri_context(UriContext::new().with_relative_base("/cr/"))
        .build();
    let value: Value = Record::new("Link").with_field("href", "x").into();
    let text = Serializer::new(&config)
        .with_types(&types)
        .serialize(&value, &TypeRef::named("Link"))
        .unwrap();
    assert_eq!(text, "(href=/cr/x)");
}

#[test]
fn test_discriminator_round_trip() {
    let types = animals();
    let config = Config::default();
    let kennel: Value = Record::new("Kennel")
        .with_field("owner", "Ann")
        .with_field(
            "pets",
            vec![
                Record::new("Dog").with_field("name", "Rex").with_field("age", 3).into(),
                Record::new("Cat").with_field("name", "Tom").with_field("lives", 9).into(),
            ],
        )
        .into();

    let text = Serializer::new(&config)
        .with_types(&types)
        .serialize(&kennel, &TypeRef::named("Kennel"))
        .unwrap();
    assert_eq!(
        text,
        "(owner=Ann,pets=@((_type=Dog,name=Rex,age=3),(_type=Cat,name=Tom,lives=9)))"
    );

    let back = Parser::new(&config)
        .with_types(&types)
        .parse(&text, &TypeRef::named("Kennel"))
        .unwrap();
    assert_eq!(back, kennel);
}

#[test]
fn test_custom_discriminator_name() {
    let types = TypeRegistry::new().with(
        TypeDescriptor::record("Dog")
            .with_field("name", TypeDescriptor::string())
            .with_discriminator("kind"),
    );
    let config = Config::builder().with_add_type_info(true).build();
    let dog: Value = Record::new("Dog").with_field("name", "Rex").into();
    let text = Serializer::new(&config)
        .with_types(&types)
        .serialize(&dog, &TypeRef::named("Dog"))
        .unwrap();
    assert_eq!(text, "(kind=Dog,name=Rex)");
}

#[test]
fn test_unresolvable_discriminator() {
    let types = animals();
    let config = Config::default();
    let parser = Parser::new(&config).with_types(&types);

    let err = parser
        .parse("(_type=Horse,name=Ed)", &TypeRef::dynamic())
        .unwrap_err();
    assert!(matches!(err, Error::ClassResolution(_)));
    assert!(err.to_string().contains("Horse"));

    let err = parser
        .parse("(_type=Horse,name=Ed)", &TypeRef::named("Dog"))
        .unwrap_err();
    assert!(matches!(err, Error::ClassResolution(_)));

    let err = parser.parse("(a=1)", &TypeRef::named("Nope")).unwrap_err();
    assert!(matches!(err, Error::ClassResolution(_)));
}

#[test]
fn test_value_wrapper_is_unwrapped() {
    assert_eq!(
        parse("(_value=@(1,2))").unwrap(),
        Value::Sequence(vec![Value::from(1), Value::from(2)])
    );
    assert_eq!(parse("(_value=hello)").unwrap(), Value::from("hello"));
}

#[test]
fn test_unknown_properties() {
    let types = animals();
    let seen = RefCell::new(Vec::new());
    let handler = |p: &serde_uon::UnknownProperty<'_>| {
        seen.borrow_mut()
            .push(format!("{}.{}={:?}", p.record, p.property, p.value.as_str()));
    };

    let lenient = Config::default();
    let dog = Parser::new(&lenient)
        .with_types(&types)
        .with_unknown_property_handler(&handler)
        .parse("(name=Rex,color=brown)", &TypeRef::named("Dog"))
        .unwrap();
    assert_eq!(dog.as_record().map(Record::len), Some(2));
    assert_eq!(*seen.borrow(), vec!["Dog.color=Some(\"brown\")".to_string()]);

    let strict = Config::builder().with_strict(true).build();
    let err = Parser::new(&strict)
        .with_types(&types)
        .parse("(name=Rex,color=brown)", &TypeRef::named("Dog"))
        .unwrap_err();
    assert_eq!(err.to_string(), "Unknown property 'color' on record 'Dog'");
}

#[test]
fn test_swap_round_trip() {
    let types = TypeRegistry::new().with(
        TypeDescriptor::record("Event")
            .with_field(
                "at",
                TypeDescriptor::string().with_swap(Swap::EpochMillis),
            )
            .with_field("day", TypeDescriptor::string().with_swap(Swap::IsoDate)),
    );
    let config = Config::default();
    let event: Value = Record::new("Event")
        .with_field("at", "2024-01-15T10:30:00Z")
        .with_field("day", "2024-01-15T00:00:00Z")
        .into();

    let text = Serializer::new(&config)
        .with_types(&types)
        .serialize(&event, &TypeRef::named("Event"))
        .unwrap();
    assert_eq!(text, "(at=1705314600000,day=2024-01-15)");

    let back = Parser::new(&config)
        .with_types(&types)
        .parse(&text, &TypeRef::named("Event"))
        .unwrap();
    assert_eq!(back, event);
}

#[test]
fn test_expanded_field_in_bracketed_grammar_is_ordinary() {
    let types = TypeRegistry::new().with(
        TypeDescriptor::record("Search").with_field_descriptor(
            FieldDescriptor::new("tag", TypeDescriptor::sequence(TypeDescriptor::string()))
                .expanded(),
        ),
    );
    let config = Config::default();
    let value: Value = Record::new("Search")
        .with_field("tag", vec![Value::from("a"), Value::from("b")])
        .into();
    let text = Serializer::new(&config)
        .with_types(&types)
        .serialize(&value, &TypeRef::named("Search"))
        .unwrap();
    assert_eq!(text, "(tag=@(a,b))");
}

#[test]
fn test_quoting_is_a_function_of_raw_content() {
    let config = Config::default();
    let once = write(&Value::from("it's"), &config);
    assert_eq!(once, r"'it\'s'");

    // The escaped token is just another string the second time round.
    let twice = write(&Value::from(once.as_str()), &config);
    assert_eq!(twice, r"'\'it\\\'s\''");
    assert_eq!(parse(&twice).unwrap().as_str(), Some(once.as_str()));
    assert_eq!(parse(&once).unwrap().as_str(), Some("it's"));
}

#[test]
fn test_solidus_escaping() {
    let config = Config::builder().with_escape_solidus(true).build();
    let text = write(&Value::from("a/b c"), &config);
    assert_eq!(text, r"'a\/b c'");
    assert_eq!(parse(&text).unwrap().as_str(), Some("a/b c"));
}

#[test]
fn test_carriage_return_is_dropped() {
    let text = to_string(&"a\r\nb").unwrap();
    assert_eq!(text, r"'a\nb'");
}

#[test]
fn test_trim_strings() {
    let config = Config::builder().with_trim_strings(true).build();
    let v: Value = Record::new("R").with_field("s", "  padded ").into();
    assert_eq!(write(&v, &config), "(s=padded)");

    let parsed = Parser::new(&config)
        .parse("(s='  padded ')", &TypeRef::dynamic())
        .unwrap();
    assert_eq!(
        parsed.as_map().and_then(|m| m.get("s")).and_then(Value::as_str),
        Some("padded")
    );
}

#[test]
fn test_locked_config() {
    let mut builder = ConfigBuilder::new();
    builder.set("detect_recursions", "true").unwrap();
    builder.lock();

    let err = builder.set("detect_recursions", "false").unwrap_err();
    assert!(matches!(err, Error::ConfigLocked(ref name) if name == "detect_recursions"));

    let config = builder.with_detect_recursions(false).build();
    assert!(config.detect_recursions());
}

#[test]
fn test_shared_config_across_threads() {
    let config = Config::builder().with_sort_maps(true).build();
    std::thread::scope(|scope| {
        for i in 0..4 {
            let config = &config;
            scope.spawn(move || {
                let v = parse(&format!("(b={i},a=x)")).unwrap();
                assert_eq!(write(&v, config), format!("(a=x,b={i})"));
            });
        }
    });
}
