//! Property-based tests for the core round-trip guarantees.
//!
//! Generated strings never contain `\r`, which the writer drops. Generated
//! values are trees; cyclic graphs are covered by the writer's unit tests.

use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_uon::{
    from_form_str, from_str, to_form_string, to_string, Config, Parser, QuoteChar, Serializer,
    TypeRef, Value, ValueMap,
};
use std::collections::BTreeMap;

fn roundtrip<T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug>(
    value: &T,
) -> bool {
    match to_string(value) {
        Ok(serialized) => match from_str::<T>(&serialized) {
            Ok(deserialized) => *value == deserialized,
            Err(e) => {
                eprintln!("Deserialize failed: {}", e);
                eprintln!("Serialized was: {}", serialized);
                false
            }
        },
        Err(e) => {
            eprintln!("Serialize failed: {}", e);
            false
        }
    }
}

fn text() -> impl Strategy<Value = String> {
    "[^\r]{0,16}"
}

fn key() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9_]{0,8}"
}

/// Acyclic values in the shapes the parser produces: strings, numbers,
/// booleans, null, sequences and string-keyed maps.
fn value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        text().prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Sequence),
            prop::collection::vec((text(), inner), 0..4).prop_map(|entries| {
                let mut map = ValueMap::new();
                for (k, v) in entries {
                    map.insert(k, v);
                }
                Value::Map(map)
            }),
        ]
    })
}

proptest! {
    #[test]
    fn prop_i32(n in any::<i32>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_i64(n in any::<i64>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_u64(n in any::<u64>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_bool(b in any::<bool>()) {
        prop_assert!(roundtrip(&b));
    }

    #[test]
    fn prop_f64(f in -1.0e12f64..1.0e12) {
        prop_assert!(roundtrip(&f));
    }

    #[test]
    fn prop_string(s in text()) {
        prop_assert!(roundtrip(&s));
    }

    #[test]
    fn prop_vec_i32(v in prop::collection::vec(any::<i32>(), 0..20)) {
        prop_assert!(roundtrip(&v));
    }

    #[test]
    fn prop_vec_string(v in prop::collection::vec(text(), 0..8)) {
        prop_assert!(roundtrip(&v));
    }

    #[test]
    fn prop_option_i32(opt in proptest::option::of(any::<i32>())) {
        prop_assert!(roundtrip(&opt));
    }

    #[test]
    fn prop_map_string_string(m in prop::collection::btree_map(text(), text(), 0..6)) {
        prop_assert!(roundtrip(&m));
    }

    #[test]
    fn prop_tuple_i32_bool(t in (any::<i32>(), any::<bool>())) {
        prop_assert!(roundtrip(&t));
    }

    /// Writing and parsing a generic value gives the value back.
    #[test]
    fn prop_value_graph(v in value()) {
        let config = Config::default();
        let text = Serializer::new(&config).serialize(&v, &TypeRef::dynamic()).unwrap();
        let back = Parser::new(&config).parse(&text, &TypeRef::dynamic()).unwrap();
        prop_assert_eq!(back, v, "via {:?}", text);
    }

    /// Pretty output parses to the same value as compact output.
    #[test]
    fn prop_pretty_equivalent(v in value()) {
        let compact = Config::default();
        let pretty = Config::builder().with_pretty(true).build();
        let a = Serializer::new(&compact).serialize(&v, &TypeRef::dynamic()).unwrap();
        let b = Serializer::new(&pretty).serialize(&v, &TypeRef::dynamic()).unwrap();
        let parser = Parser::new(&compact);
        prop_assert_eq!(
            parser.parse(&a, &TypeRef::dynamic()).unwrap(),
            parser.parse(&b, &TypeRef::dynamic()).unwrap()
        );
    }

    /// A quoted token parses to exactly the text that was quoted, in either
    /// quoting mode and with either quote character.
    #[test]
    fn prop_quoting_idempotent(s in text(), simple in any::<bool>(), double in any::<bool>()) {
        let quote = if double { QuoteChar::Double } else { QuoteChar::Single };
        let config = Config::builder()
            .with_simple_mode(simple)
            .with_quote_char(quote)
            .build();
        let written = Serializer::new(&config)
            .serialize(&Value::from(s.as_str()), &TypeRef::dynamic())
            .unwrap();
        let back = Parser::new(&config).parse(&written, &TypeRef::dynamic()).unwrap();
        prop_assert_eq!(back.as_str(), Some(s.as_str()));
    }

    /// Form-encoded round trip for flat string maps.
    #[test]
    fn prop_form_map(m in prop::collection::btree_map(key(), text(), 1..6)) {
        let query = to_form_string(&m).unwrap();
        let back: BTreeMap<String, String> = from_form_str(&query).unwrap();
        prop_assert_eq!(back, m);
    }
}
