use crate::value::Value;
use std::cmp::Ordering;

#[test]
fn compare_numeric_across_int_and_float() {
    assert_eq!(Value::Int(3).compare(&Value::Float(3.5)), Some(Ordering::Less));
    assert_eq!(Value::Float(7.0).compare(&Value::Int(7)), Some(Ordering::Equal));
}

#[test]
fn compare_with_null_is_undefined() {
    assert_eq!(Value::Null.compare(&Value::Int(1)), None);
    assert_eq!(Value::Int(1).compare(&Value::Null), None);
    assert!(!Value::Null.sql_eq(&Value::Null));
}

#[test]
fn compare_rejects_mismatched_families() {
    assert_eq!(Value::Text("1".into()).compare(&Value::Int(1)), None);
    assert_eq!(Value::Bool(true).compare(&Value::Int(1)), None);
}

#[test]
fn canonical_cmp_ranks_families() {
    let mut values = vec![
        Value::Text("b".into()),
        Value::Int(2),
        Value::Null,
        Value::Bool(false),
        Value::Float(1.5),
        Value::Text("a".into()),
    ];
    values.sort_by(Value::canonical_cmp);

    assert_eq!(
        values,
        vec![
            Value::Null,
            Value::Bool(false),
            Value::Float(1.5),
            Value::Int(2),
            Value::Text("a".into()),
            Value::Text("b".into()),
        ]
    );
}

#[test]
fn untagged_json_shape_is_plain_scalars() {
    let json = serde_json::to_string(&vec![
        Value::Null,
        Value::Bool(true),
        Value::Int(10),
        Value::Float(2.5),
        Value::Text("x".into()),
    ])
    .expect("values should serialize");
    assert_eq!(json, r#"[null,true,10,2.5,"x"]"#);

    let decoded: Vec<Value> = serde_json::from_str(&json).expect("values should decode");
    assert_eq!(decoded[2], Value::Int(10));
    assert_eq!(decoded[3], Value::Float(2.5));
}

#[test]
fn option_conversion_maps_none_to_null() {
    assert_eq!(Value::from(None::<i64>), Value::Null);
    assert_eq!(Value::from(Some("t")), Value::Text("t".into()));
}
