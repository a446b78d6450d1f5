use crate::value::Value;
use std::cmp::Ordering;

impl Value {
    /// Compare two values with SQL comparison semantics.
    ///
    /// Returns `None` when either side is `Null` or the variants are not
    /// comparable. `Int` and `Float` compare numerically.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Int(a), Self::Float(b)) => (*a as f64).partial_cmp(b),
            (Self::Float(a), Self::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// SQL equality: `NULL = x` is never true.
    #[must_use]
    pub fn sql_eq(&self, other: &Self) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }

    /// Total ordering used when sorting materialized rows.
    ///
    /// Values of the same family order as [`Value::compare`]. Across families
    /// the rank is `Null < Bool < numeric < Text`; NaN sorts after every other
    /// float.
    #[must_use]
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        match self.compare(other) {
            Some(ordering) => ordering,
            None => match (self, other) {
                (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
                _ => self.rank().cmp(&other.rank()),
            },
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Int(_) | Self::Float(_) => 2,
            Self::Text(_) => 3,
        }
    }
}
