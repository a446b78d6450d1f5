use crate::{
    db::{
        cursor::{CursorError, CursorValues},
        order::{OrderSpec, OrderTerm, SortError},
        predicate::{CompareOp, Predicate, eval, keyset_predicate, tuple_predicate},
        row::Record,
    },
    value::Value,
};
use proptest::prelude::*;
use std::cmp::Ordering;

fn values(pairs: &[(&str, i64)]) -> CursorValues {
    pairs.iter().map(|(k, v)| (*k, *v)).collect()
}

fn order(terms: Vec<OrderTerm>) -> OrderSpec {
    OrderSpec::new(terms).expect("test order should be valid")
}

#[test]
fn keyset_two_desc_columns_expands_to_or_of_ands() {
    let order = order(vec![OrderTerm::desc("likeCount"), OrderTerm::desc("id")]);
    let predicate = keyset_predicate(&order, &values(&[("likeCount", 10), ("id", 3)]))
        .expect("aligned cursor");

    assert_eq!(
        predicate,
        Predicate::Or(vec![
            Predicate::lt("likeCount", 10),
            Predicate::And(vec![Predicate::eq("likeCount", 10), Predicate::lt("id", 3)]),
        ])
    );
    assert_eq!(
        predicate.to_string(),
        "likeCount < 10 OR (likeCount = 10 AND id < 3)"
    );
}

#[test]
fn keyset_single_column_is_one_inequality() {
    let desc = keyset_predicate(&order(vec![OrderTerm::desc("id")]), &values(&[("id", 52)]))
        .expect("aligned cursor");
    assert_eq!(desc, Predicate::lt("id", 52));

    let asc = keyset_predicate(&order(vec![OrderTerm::asc("id")]), &values(&[("id", 52)]))
        .expect("aligned cursor");
    assert_eq!(asc, Predicate::gt("id", 52));
}

#[test]
fn keyset_mixed_directions_flip_per_column() {
    let order = order(vec![
        OrderTerm::desc("likeCount"),
        OrderTerm::asc("title"),
        OrderTerm::desc("id"),
    ]);
    let cursor: CursorValues = [
        ("likeCount", Value::Int(10)),
        ("title", Value::from("Dune")),
        ("id", Value::Int(3)),
    ]
    .into_iter()
    .collect();
    let predicate = keyset_predicate(&order, &cursor).expect("aligned cursor");

    assert_eq!(
        predicate.to_string(),
        "likeCount < 10 OR (likeCount = 10 AND title > 'Dune') \
         OR (likeCount = 10 AND title = 'Dune' AND id < 3)"
    );
}

#[test]
fn keyset_null_boundary_ties_through_is_null() {
    let order = order(vec![OrderTerm::desc("likeCount"), OrderTerm::desc("id")]);
    let cursor: CursorValues = [("likeCount", Value::Null), ("id", Value::Int(3))]
        .into_iter()
        .collect();
    let predicate = keyset_predicate(&order, &cursor).expect("aligned cursor");

    assert_eq!(
        predicate.to_string(),
        "likeCount IS NOT NULL OR (likeCount IS NULL AND id < 3)"
    );

    let matches = |like: Value, id: i64| {
        eval(&Record::new().with("likeCount", like).with("id", id), &predicate)
    };
    assert!(matches(Value::Null, 2));
    assert!(!matches(Value::Null, 3));
    assert!(!matches(Value::Null, 4));
    assert!(matches(Value::Int(0), 9));
    assert!(eval(&Record::new().with("id", 1), &predicate), "missing sorts as null");
}

#[test]
fn keyset_non_null_boundary_skips_null_rows() {
    for term in [OrderTerm::desc("likeCount"), OrderTerm::asc("likeCount")] {
        let predicate = keyset_predicate(
            &OrderSpec::single(term),
            &values(&[("likeCount", 5)]),
        )
        .expect("aligned cursor");

        assert!(!eval(&Record::new().with("likeCount", Value::Null), &predicate));
    }
}

#[test]
fn tuple_rejects_null_boundary_values() {
    let order = order(vec![OrderTerm::asc("likeCount"), OrderTerm::asc("id")]);
    let cursor: CursorValues = [("likeCount", Value::Null), ("id", Value::Int(3))]
        .into_iter()
        .collect();

    let err = tuple_predicate(&order, &cursor).expect_err("null boundary");
    assert_eq!(
        err,
        CursorError::NullTupleValue {
            field: "likeCount".to_string()
        }
    );
    assert!(!err.is_malformed());
}

#[test]
fn eval_is_null_covers_null_and_missing() {
    let row = Record::new().with("title", Value::Null).with("id", 4);

    assert!(eval(&row, &Predicate::is_null("title")));
    assert!(eval(&row, &Predicate::is_null("likeCount")));
    assert!(!eval(&row, &Predicate::is_null("id")));
    assert!(eval(&row, &Predicate::is_not_null("id")));
    assert_eq!(Predicate::is_not_null("id").to_string(), "id IS NOT NULL");
}

#[test]
fn keyset_rejects_misaligned_values() {
    let order = order(vec![OrderTerm::desc("likeCount"), OrderTerm::desc("id")]);
    let err = keyset_predicate(&order, &values(&[("id", 3), ("likeCount", 10)]))
        .expect_err("keys are out of order");

    assert!(matches!(err, CursorError::ValuesMismatch { .. }));
}

#[test]
fn tuple_requires_uniform_direction() {
    let mixed = order(vec![OrderTerm::desc("likeCount"), OrderTerm::asc("id")]);
    let err = tuple_predicate(&mixed, &values(&[("likeCount", 10), ("id", 3)]))
        .expect_err("mixed directions");
    assert_eq!(err, CursorError::Order(SortError::MixedDirections));

    let uniform = order(vec![OrderTerm::desc("likeCount"), OrderTerm::desc("id")]);
    let tuple = tuple_predicate(&uniform, &values(&[("likeCount", 10), ("id", 3)]))
        .expect("uniform directions");
    assert_eq!(tuple.to_string(), "(likeCount, id) < (10, 3)");
}

#[test]
fn keyset_and_tuple_select_same_rows() {
    let order = order(vec![OrderTerm::desc("likeCount"), OrderTerm::desc("id")]);
    let cursor = values(&[("likeCount", 10), ("id", 3)]);
    let keyset = keyset_predicate(&order, &cursor).expect("aligned cursor");
    let tuple = tuple_predicate(&order, &cursor).expect("uniform directions");

    let rows = [(10, 5), (10, 3), (10, 2), (7, 9), (11, 1)];
    let selected: Vec<_> = rows
        .iter()
        .filter(|(like, id)| {
            let row = Record::new().with("likeCount", *like).with("id", *id);
            let by_keyset = eval(&row, &keyset);
            assert_eq!(by_keyset, eval(&row, &tuple), "row ({like}, {id})");
            by_keyset
        })
        .collect();

    assert_eq!(selected, vec![&(10, 2), &(7, 9)]);
}

#[test]
fn eval_treats_missing_and_null_as_unknown() {
    let row = Record::new().with("title", Value::Null).with("id", 4);

    assert!(!eval(&row, &Predicate::eq("title", Value::Null)));
    assert!(!eval(&row, &Predicate::compare("title", CompareOp::Ne, "x")));
    assert!(!eval(&row, &Predicate::lt("likeCount", 10)));
    assert!(!eval(&row, &Predicate::eq("id", "4")));
    assert!(eval(&row, &Predicate::compare("id", CompareOp::Gte, 4)));
}

#[test]
fn eval_composes_boolean_connectives() {
    let row = Record::new().with("title", "The Matrix").with("id", 7);

    assert!(eval(&row, &(Predicate::text_contains("title", "Matrix") & Predicate::gt("id", 5))));
    assert!(!eval(&row, &Predicate::text_contains("title", "matrix")));
    assert!(eval(&row, &(Predicate::False | Predicate::eq("id", 7))));
    assert!(eval(&row, &Predicate::not(Predicate::lt("id", 7))));
    assert!(eval(&row, &Predicate::And(Vec::new())));
    assert!(!eval(&row, &Predicate::Or(Vec::new())));
}

#[test]
fn eval_compares_int_and_float_numerically() {
    let row = Record::new().with("likeCount", 10);

    assert!(eval(&row, &Predicate::lt("likeCount", 10.5)));
    assert!(eval(&row, &Predicate::eq("likeCount", 10.0)));
}

fn arb_order() -> impl Strategy<Value = OrderSpec> {
    (prop::sample::subsequence(vec!["a", "b", "c"], 1..=3), any::<[bool; 3]>()).prop_map(
        |(columns, desc)| {
            let terms = columns
                .into_iter()
                .zip(desc)
                .map(|(c, d)| if d { OrderTerm::desc(c) } else { OrderTerm::asc(c) })
                .collect();
            OrderSpec::new(terms).expect("subsequence has unique columns")
        },
    )
}

// Columns may hold a value, `Null`, or be missing altogether.
fn arb_cell() -> impl Strategy<Value = Option<Value>> {
    prop_oneof![
        4 => (0i64..4).prop_map(|v| Some(Value::Int(v))),
        1 => Just(Some(Value::Null)),
        1 => Just(None),
    ]
}

fn arb_row() -> impl Strategy<Value = Record> {
    (arb_cell(), arb_cell(), arb_cell()).prop_map(|(a, b, c)| {
        let mut row = Record::new();
        for (field, cell) in [("a", a), ("b", b), ("c", c)] {
            if let Some(value) = cell {
                row.set(field, value);
            }
        }
        row
    })
}

proptest! {
    // The keyset filter selects exactly the rows that sort after the boundary.
    #[test]
    fn keyset_matches_sort_position(
        order in arb_order(),
        boundary in arb_row(),
        rows in prop::collection::vec(arb_row(), 1..24),
    ) {
        let cursor: CursorValues = order
            .fields()
            .map(|f| (f, boundary.get(f).cloned().unwrap_or(Value::Null)))
            .collect();
        let keyset = keyset_predicate(&order, &cursor).expect("aligned cursor");
        let tuple = tuple_predicate(&order, &cursor).ok();

        for row in &rows {
            let after = order.compare_rows(row, &boundary) == Ordering::Greater;
            prop_assert_eq!(eval(row, &keyset), after);
            if let Some(tuple) = &tuple {
                prop_assert_eq!(eval(row, tuple), after);
            }
        }
    }
}
