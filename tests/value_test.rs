use chainrt::value::Resolve;
use chainrt::{Error, ObjectTag, Scope, TypeSet, Value, ValueType};
use std::cmp::Ordering;
use std::collections::HashMap;

fn samples() -> Vec<Value> {
    let table: HashMap<String, Value> = [("a".to_string(), Value::Int(1)), ("b".to_string(), Value::from("x"))]
        .into_iter()
        .collect();
    vec![
        Value::None,
        Value::Bool(true),
        Value::Int(7),
        Value::Float(7.0),
        Value::Float(f64::NAN),
        Value::from("seven"),
        Value::from(vec![1u8, 2, 3]),
        Value::Seq(vec![Value::Int(1), Value::Seq(vec![Value::from("deep")])]),
        Value::Table(table),
        Value::context_var("seven"),
        Value::object(ObjectTag::new(1, 2), 5u32),
    ]
}

#[test]
fn test_equality_is_reflexive_symmetric_transitive() {
    let values = samples();
    for a in &values {
        assert_eq!(a, a, "reflexive: {a}");
        assert_eq!(a, &a.clone(), "clone equals original: {a}");
        for b in &values {
            assert_eq!(a == b, b == a, "symmetric: {a} / {b}");
            for c in &values {
                if a == b && b == c {
                    assert_eq!(a, c);
                }
            }
        }
    }
}

#[test]
fn test_int_and_float_are_distinct_tags() {
    assert_ne!(Value::Int(7), Value::Float(7.0));
    assert_eq!(Value::Int(7).compare(&Value::Float(7.0)).unwrap(), Ordering::Equal);
}

#[test]
fn test_tag_is_consistent() {
    for value in samples() {
        let tag = value.value_type();
        assert!(TypeSet::ANY.contains(tag));
        assert!(TypeSet::from(tag).contains(tag));
    }
    assert_eq!(Value::from("s").value_type(), ValueType::String);
    assert_eq!(Value::context_var("x").as_context_var(), Some("x"));
}

#[test]
fn test_objects_compare_by_identity() {
    let tag = ObjectTag::new(1, 2);
    let a = Value::object(tag, 5u32);
    let b = Value::object(tag, 5u32);
    assert_ne!(a, b);
    assert_eq!(a, a.clone());
    assert_eq!(a.as_object().and_then(|o| o.downcast_ref::<u32>()), Some(&5));
}

#[test]
fn test_conversions() {
    assert_eq!(Value::Int(3).convert_to(ValueType::Float).unwrap(), Value::Float(3.0));
    assert_eq!(Value::Float(3.9).convert_to(ValueType::Int).unwrap(), Value::Int(3));
    assert_eq!(Value::from("12").convert_to(ValueType::Int).unwrap(), Value::Int(12));
    assert_eq!(Value::Bool(true).convert_to(ValueType::String).unwrap(), Value::from("true"));

    assert!(matches!(Value::from("twelve").convert_to(ValueType::Int), Err(Error::TypeMismatch { .. })));
    assert!(matches!(Value::Float(f64::INFINITY).convert_to(ValueType::Int), Err(Error::TypeMismatch { .. })));
    assert!(matches!(Value::None.convert_to(ValueType::String), Err(Error::TypeMismatch { .. })));
    assert!(matches!(
        Value::Float(9223372036854775808.0).convert_to(ValueType::Int),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn test_references_resolve_through_scope() {
    let scope: Scope = [
        ("n", Value::Int(4)),
        ("list", Value::Seq(vec![Value::context_var("n"), Value::context_var("n")])),
    ]
    .into_iter()
    .collect();

    assert_eq!(scope.lookup("n"), Some(&Value::Int(4)));
    assert!(Value::context_var("list").eq_in(&Value::Seq(vec![Value::Int(4), Value::Int(4)]), &scope).unwrap());
    assert_eq!(
        Value::context_var("list").resolve_deep(&scope).unwrap(),
        Value::Seq(vec![Value::Int(4), Value::Int(4)])
    );
    assert_eq!(
        Value::context_var("missing").resolve_deep(&scope).unwrap_err(),
        Error::UnknownVariable("missing".to_string())
    );
}

#[test]
fn test_cyclic_values_are_detected() {
    let mut scope = Scope::new();
    scope.set("a", Value::Seq(vec![Value::context_var("b")]));
    scope.set("b", Value::Seq(vec![Value::context_var("a")]));

    let err = Value::context_var("a").resolve_deep(&scope).unwrap_err();
    assert!(matches!(err, Error::CyclicValue(_)));

    let err = Value::context_var("a").eq_in(&Value::context_var("b"), &scope).unwrap_err();
    assert!(matches!(err, Error::CyclicValue(_)));

    // Structural equality never follows references, so it always terminates.
    assert_ne!(Value::context_var("a"), Value::context_var("b"));
    assert_eq!(Value::context_var("a"), Value::context_var("a"));
}

#[test]
fn test_json_bridge() {
    let json = serde_json::json!({"n": 1, "f": 1.5, "v": "${x}", "list": [true, null]});
    let value = Value::from(json.clone());
    let table = value.as_table().unwrap();
    assert_eq!(table["n"], Value::Int(1));
    assert_eq!(table["f"], Value::Float(1.5));
    assert_eq!(table["v"], Value::context_var("x"));
    assert_eq!(table["list"], Value::Seq(vec![Value::Bool(true), Value::None]));
    assert_eq!(value.to_json().unwrap(), json);

    assert!(Value::object(ObjectTag::new(0, 0), ()).to_json().is_err());
    for f in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        assert!(matches!(
            Value::Seq(vec![Value::Float(f)]).to_json(),
            Err(Error::TypeMismatch { found: ValueType::Float, .. })
        ));
    }
}
