use crate::db::{
    order::OrderSpec,
    predicate::{Predicate, eval},
    query::FetchedPage,
    row::Row,
};

///
/// PageWindow
///
/// What a `PageSource` must fetch beyond its own base filters: an optional
/// keyset filter, an ordering, and an offset/limit slice. The keyset is kept
/// apart from the base filters so sources can count the full filtered set.
///

#[derive(Clone, Debug, PartialEq)]
pub struct PageWindow {
    pub keyset: Option<Predicate>,
    pub order: OrderSpec,
    pub offset: u64,
    pub limit: u32,
}

impl PageWindow {
    #[must_use]
    pub const fn new(order: OrderSpec, limit: u32) -> Self {
        Self {
            keyset: None,
            order,
            offset: 0,
            limit,
        }
    }

    #[must_use]
    pub fn with_keyset(mut self, keyset: Predicate) -> Self {
        self.keyset = Some(keyset);
        self
    }

    #[must_use]
    pub const fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Apply this window to rows that already passed the base filters.
    ///
    /// `count` is taken before the keyset, offset and limit are applied.
    pub fn apply<R: Row>(&self, rows: impl IntoIterator<Item = R>) -> FetchedPage<R> {
        let mut rows: Vec<R> = rows.into_iter().collect();
        let count = rows.len() as u64;

        if let Some(keyset) = &self.keyset {
            rows.retain(|row| eval(row, keyset));
        }
        rows.sort_by(|a, b| self.order.compare_rows(a, b));

        let rows = rows
            .into_iter()
            .skip(usize::try_from(self.offset).unwrap_or(usize::MAX))
            .take(self.limit as usize)
            .collect();

        FetchedPage { rows, count }
    }
}
