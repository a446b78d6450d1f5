use crate::value::Value;
use std::{
    fmt,
    ops::{BitAnd, BitOr},
};

///
/// Predicate AST
///
/// Pure, schema-agnostic filter expression handed to the query layer.
/// Built fresh per request and never persisted. Backends either translate
/// it into their own statement language or evaluate it with [`super::eval`].
///

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl CompareOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
        }
    }
}

///
/// ComparePredicate
///

#[derive(Clone, Debug, PartialEq)]
pub struct ComparePredicate {
    pub field: String,
    pub op: CompareOp,
    pub value: Value,
}

impl ComparePredicate {
    pub fn new(field: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }
}

///
/// TuplePredicate
///
/// Row-value comparison `(f1, f2, ...) op (v1, v2, ...)`.
///

#[derive(Clone, Debug, PartialEq)]
pub struct TuplePredicate {
    pub fields: Vec<String>,
    pub op: CompareOp,
    pub values: Vec<Value>,
}

///
/// Predicate
///

#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    True,
    False,
    And(Vec<Self>),
    Or(Vec<Self>),
    Not(Box<Self>),
    Compare(ComparePredicate),
    Tuple(TuplePredicate),
    IsNull { field: String },
    IsNotNull { field: String },
    TextContains { field: String, value: String },
}

impl Predicate {
    #[must_use]
    pub const fn and(preds: Vec<Self>) -> Self {
        Self::And(preds)
    }

    #[must_use]
    pub const fn or(preds: Vec<Self>) -> Self {
        Self::Or(preds)
    }

    #[must_use]
    pub fn not(pred: Self) -> Self {
        Self::Not(Box::new(pred))
    }

    pub fn compare(field: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Self::Compare(ComparePredicate::new(field, op, value))
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Eq, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Lt, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Gt, value)
    }

    pub fn is_null(field: impl Into<String>) -> Self {
        Self::IsNull {
            field: field.into(),
        }
    }

    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self::IsNotNull {
            field: field.into(),
        }
    }

    pub fn text_contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::TextContains {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl BitAnd for Predicate {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::And(vec![self, rhs])
    }
}

impl BitOr for Predicate {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::Or(vec![self, rhs])
    }
}

// SQL-flavoured rendering for logs and diagnostics.
impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, children: &[Predicate], sep: &str) -> fmt::Result {
            for (idx, child) in children.iter().enumerate() {
                if idx > 0 {
                    f.write_str(sep)?;
                }
                match child {
                    Predicate::And(_) | Predicate::Or(_) => write!(f, "({child})")?,
                    _ => write!(f, "{child}")?,
                }
            }
            Ok(())
        }

        match self {
            Self::True => f.write_str("TRUE"),
            Self::False => f.write_str("FALSE"),
            Self::And(children) => join(f, children, " AND "),
            Self::Or(children) => join(f, children, " OR "),
            Self::Not(inner) => write!(f, "NOT ({inner})"),
            Self::Compare(cmp) => write!(f, "{} {} {}", cmp.field, cmp.op.symbol(), cmp.value),
            Self::Tuple(tuple) => {
                let values: Vec<String> = tuple.values.iter().map(ToString::to_string).collect();
                write!(
                    f,
                    "({}) {} ({})",
                    tuple.fields.join(", "),
                    tuple.op.symbol(),
                    values.join(", ")
                )
            }
            Self::IsNull { field } => write!(f, "{field} IS NULL"),
            Self::IsNotNull { field } => write!(f, "{field} IS NOT NULL"),
            Self::TextContains { field, value } => write!(f, "{field} LIKE '%{value}%'"),
        }
    }
}
