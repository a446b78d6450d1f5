use crate::{
    db::{
        predicate::{CompareOp, ComparePredicate, Predicate, TuplePredicate},
        row::{FieldPresence, Row},
    },
    value::Value,
};
use std::cmp::Ordering;

///
/// Evaluate a predicate against a single row.
///
/// Pure runtime evaluation with SQL semantics for comparisons:
/// a missing field, a `Null` operand, or incomparable values make the
/// comparison false (including under `Ne`). `IsNull` matches both a
/// `Null` value and a missing field.
///
#[must_use]
pub fn eval<R: Row + ?Sized>(row: &R, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::True => true,
        Predicate::False => false,

        Predicate::And(children) => children.iter().all(|child| eval(row, child)),
        Predicate::Or(children) => children.iter().any(|child| eval(row, child)),
        Predicate::Not(inner) => !eval(row, inner),

        Predicate::Compare(cmp) => eval_compare(row, cmp),
        Predicate::Tuple(tuple) => eval_tuple(row, tuple),

        Predicate::IsNull { field } => is_null_field(row, field),
        Predicate::IsNotNull { field } => !is_null_field(row, field),

        Predicate::TextContains { field, value } => match row.field(field) {
            FieldPresence::Present(Value::Text(actual)) => actual.contains(value.as_str()),
            _ => false,
        },
    }
}

fn is_null_field<R: Row + ?Sized>(row: &R, field: &str) -> bool {
    match row.field(field) {
        FieldPresence::Present(value) => value.is_null(),
        FieldPresence::Missing => true,
    }
}

fn eval_compare<R: Row + ?Sized>(row: &R, cmp: &ComparePredicate) -> bool {
    let FieldPresence::Present(actual) = row.field(&cmp.field) else {
        return false;
    };

    actual
        .compare(&cmp.value)
        .is_some_and(|ordering| op_accepts(cmp.op, ordering))
}

// Lexicographic row-value comparison; the first non-equal column decides.
fn eval_tuple<R: Row + ?Sized>(row: &R, tuple: &TuplePredicate) -> bool {
    if tuple.fields.len() != tuple.values.len() {
        return false;
    }

    let mut ordering = Ordering::Equal;
    for (field, expected) in tuple.fields.iter().zip(&tuple.values) {
        let FieldPresence::Present(actual) = row.field(field) else {
            return false;
        };
        let Some(column) = actual.compare(expected) else {
            return false;
        };
        if column != Ordering::Equal {
            ordering = column;
            break;
        }
    }

    op_accepts(tuple.op, ordering)
}

const fn op_accepts(op: CompareOp, ordering: Ordering) -> bool {
    match op {
        CompareOp::Eq => matches!(ordering, Ordering::Equal),
        CompareOp::Ne => !matches!(ordering, Ordering::Equal),
        CompareOp::Lt => matches!(ordering, Ordering::Less),
        CompareOp::Lte => !matches!(ordering, Ordering::Greater),
        CompareOp::Gt => matches!(ordering, Ordering::Greater),
        CompareOp::Gte => !matches!(ordering, Ordering::Less),
    }
}
