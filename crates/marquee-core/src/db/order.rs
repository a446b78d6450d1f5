//! Module: db::order
//! Responsibility: parsing and validating client ordering (`col_DIR` entries).
//! Does not own: cursor token protocol or predicate construction.
//! Boundary: every ordering that reaches a query passes through `OrderSpec`.

use crate::{
    db::{direction::Direction, row::Row},
    model::EntityModel,
    value::Value,
};
use derive_more::{Deref, IntoIterator};
use std::{cmp::Ordering, fmt};
use thiserror::Error as ThisError;

///
/// SortError
///
/// Client ordering rejected before any I/O.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SortError {
    #[error("order must contain at least one column")]
    Empty,

    #[error("order entry '{entry}' must have the form column_ASC or column_DESC")]
    MalformedEntry { entry: String },

    #[error("order entry '{entry}' has direction '{direction}'; expected ASC or DESC")]
    InvalidDirection { entry: String, direction: String },

    #[error("order column '{field}' appears more than once")]
    DuplicateField { field: String },

    #[error("order column '{field}' is not sortable on '{entity}'")]
    UnknownField { entity: &'static str, field: String },

    #[error("tuple comparison requires every order column to share one direction")]
    MixedDirections,
}

///
/// OrderTerm
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct OrderTerm {
    pub field: String,
    pub direction: Direction,
}

impl OrderTerm {
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, Direction::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, Direction::Desc)
    }

    /// Parse one `column_DIRECTION` entry.
    ///
    /// The split happens at the last underscore so column names may contain
    /// underscores themselves.
    pub fn parse(entry: &str) -> Result<Self, SortError> {
        let Some((field, direction)) = entry.rsplit_once('_') else {
            return Err(SortError::MalformedEntry {
                entry: entry.to_string(),
            });
        };
        if field.is_empty() {
            return Err(SortError::MalformedEntry {
                entry: entry.to_string(),
            });
        }
        let Some(direction) = Direction::parse(direction) else {
            return Err(SortError::InvalidDirection {
                entry: entry.to_string(),
                direction: direction.to_string(),
            });
        };

        Ok(Self::new(field, direction))
    }
}

impl fmt::Display for OrderTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.field, self.direction)
    }
}

///
/// OrderSpec
///
/// Validated, non-empty ordering with unique columns. The last column acts
/// as the final tie-break, so callers should end with a unique key.
///

#[derive(Clone, Debug, Deref, Eq, IntoIterator, PartialEq)]
#[into_iterator(owned, ref)]
pub struct OrderSpec(Vec<OrderTerm>);

impl OrderSpec {
    pub fn new(terms: Vec<OrderTerm>) -> Result<Self, SortError> {
        if terms.is_empty() {
            return Err(SortError::Empty);
        }
        for (idx, term) in terms.iter().enumerate() {
            if terms[..idx].iter().any(|prev| prev.field == term.field) {
                return Err(SortError::DuplicateField {
                    field: term.field.clone(),
                });
            }
        }

        Ok(Self(terms))
    }

    /// One-column ordering; always valid.
    #[must_use]
    pub fn single(term: OrderTerm) -> Self {
        Self(vec![term])
    }

    /// Parse client order entries and check each column against `model`.
    ///
    /// Every entry is parsed (and its direction validated) before the
    /// allow-list is consulted, so a bad direction is always reported as such.
    pub fn parse<I, S>(entries: I, model: &EntityModel) -> Result<Self, SortError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms = entries
            .into_iter()
            .map(|entry| OrderTerm::parse(entry.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(term) = terms.iter().find(|term| !model.has_field(&term.field)) {
            return Err(SortError::UnknownField {
                entity: model.path,
                field: term.field.clone(),
            });
        }

        Self::new(terms)
    }

    /// Wire form of this ordering (`["likeCount_DESC", "id_DESC"]`).
    #[must_use]
    pub fn to_entries(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|term| term.field.as_str())
    }

    /// The shared direction, if every column sorts the same way.
    #[must_use]
    pub fn uniform_direction(&self) -> Option<Direction> {
        let first = self.0.first()?.direction;

        self.0
            .iter()
            .all(|term| term.direction == first)
            .then_some(first)
    }

    /// Compare two rows under this ordering.
    ///
    /// Missing fields compare as `Null`, and nulls sort first in both
    /// directions (`NULLS FIRST`). The keyset filter relies on this.
    pub fn compare_rows<R: Row + ?Sized>(&self, left: &R, right: &R) -> Ordering {
        for term in &self.0 {
            let l = left.field(&term.field).into_value().unwrap_or(Value::Null);
            let r = right.field(&term.field).into_value().unwrap_or(Value::Null);
            let ordering = match (l.is_null(), r.is_null()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                (false, false) => term.direction.apply(l.canonical_cmp(&r)),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }

        Ordering::Equal
    }
}

impl fmt::Display for OrderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_entries().join(","))
    }
}

///
/// TESTS
///
