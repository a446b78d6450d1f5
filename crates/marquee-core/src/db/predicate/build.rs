use crate::{
    db::{
        cursor::{CursorError, CursorValues},
        order::{OrderSpec, OrderTerm, SortError},
        predicate::{CompareOp, Predicate, TuplePredicate},
    },
    value::Value,
};

/// Build the keyset filter selecting rows strictly after a cursor boundary.
///
/// The result is an OR of one branch per ordering column `i`: every earlier
/// column equals its boundary value, and column `i` is strictly past its
/// boundary value in that column's direction (`<` for DESC, `>` for ASC).
/// A single-column order degenerates to one strict inequality.
///
/// ```text
/// likeCount_DESC, id_DESC  @ {likeCount: 10, id: 3}
///   => likeCount < 10 OR (likeCount = 10 AND id < 3)
/// ```
///
/// Nulls sort first in either direction (see [`OrderSpec::compare_rows`]),
/// so a `Null` boundary ties through `IS NULL` and is passed by
/// `IS NOT NULL`.
pub fn keyset_predicate(
    order: &OrderSpec,
    values: &CursorValues,
) -> Result<Predicate, CursorError> {
    values.check_aligned(order)?;

    let mut branches = Vec::with_capacity(order.len());
    let mut ties: Vec<Predicate> = Vec::with_capacity(order.len());

    for (term, (_, value)) in order.iter().zip(values.iter()) {
        let strict = past_boundary(term, value);

        if ties.is_empty() {
            branches.push(strict);
        } else {
            let mut conj = ties.clone();
            conj.push(strict);
            branches.push(Predicate::And(conj));
        }

        ties.push(at_boundary(term, value));
    }

    Ok(match branches.len() {
        1 => branches.remove(0),
        _ => Predicate::Or(branches),
    })
}

fn past_boundary(term: &OrderTerm, value: &Value) -> Predicate {
    if value.is_null() {
        Predicate::is_not_null(term.field.clone())
    } else {
        Predicate::compare(term.field.clone(), term.direction.strict_op(), value.clone())
    }
}

fn at_boundary(term: &OrderTerm, value: &Value) -> Predicate {
    if value.is_null() {
        Predicate::is_null(term.field.clone())
    } else {
        Predicate::eq(term.field.clone(), value.clone())
    }
}

/// Build the single row-value comparison `(c1, ..) op (v1, ..)`.
///
/// Only equivalent to [`keyset_predicate`] when every column shares one
/// direction and no boundary value is `Null`; other cursors are rejected.
pub fn tuple_predicate(
    order: &OrderSpec,
    values: &CursorValues,
) -> Result<Predicate, CursorError> {
    values.check_aligned(order)?;

    let Some(direction) = order.uniform_direction() else {
        return Err(CursorError::Order(SortError::MixedDirections));
    };
    if let Some((field, _)) = values.iter().find(|(_, value)| value.is_null()) {
        return Err(CursorError::NullTupleValue {
            field: field.to_string(),
        });
    }
    let op: CompareOp = direction.strict_op();

    Ok(Predicate::Tuple(TuplePredicate {
        fields: order.fields().map(str::to_string).collect(),
        op,
        values: values.iter().map(|(_, value)| value.clone()).collect(),
    }))
}
