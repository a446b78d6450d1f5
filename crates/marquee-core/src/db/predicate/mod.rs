mod ast;
mod build;
mod eval;

#[cfg(test)]
mod tests;

pub use ast::{CompareOp, ComparePredicate, Predicate, TuplePredicate};
pub use build::{keyset_predicate, tuple_predicate};
pub use eval::eval;
