use crate::db::predicate::CompareOp;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

///
/// Direction
///
/// Sort direction of one ordering column. The wire spelling is the
/// upper-case keyword used in order entries (`likeCount_DESC`).
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Asc,
    #[default]
    Desc,
}

impl Direction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Parse the exact upper-case keyword; anything else is rejected.
    #[must_use]
    pub fn parse(keyword: &str) -> Option<Self> {
        match keyword {
            "ASC" => Some(Self::Asc),
            "DESC" => Some(Self::Desc),
            _ => None,
        }
    }

    /// Strict comparison that moves past a boundary in this direction.
    #[must_use]
    pub const fn strict_op(self) -> CompareOp {
        match self {
            Self::Asc => CompareOp::Gt,
            Self::Desc => CompareOp::Lt,
        }
    }

    /// Orient an ascending comparison result for this direction.
    #[must_use]
    pub const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
