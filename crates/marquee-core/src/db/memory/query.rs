use crate::db::{
    BackendError,
    predicate::{Predicate, eval},
    query::{FetchedPage, PageSource, PageWindow},
    row::Record,
};

///
/// MemoryQuery
///
/// Base query over a snapshot of one table. Filters added here are the
/// base filters that `count` reflects.
///

#[derive(Clone, Debug)]
pub struct MemoryQuery {
    rows: Vec<Record>,
    filters: Vec<Predicate>,
}

impl MemoryQuery {
    pub(crate) const fn new(rows: Vec<Record>) -> Self {
        Self {
            rows,
            filters: Vec::new(),
        }
    }

    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filters.push(predicate);
        self
    }

    /// Case-sensitive substring match on a text column.
    #[must_use]
    pub fn contains(self, field: &str, needle: &str) -> Self {
        self.filter(Predicate::text_contains(field, needle))
    }

    /// Base-filtered rows, unordered.
    #[must_use]
    pub fn all(self) -> Vec<Record> {
        let Self { rows, filters } = self;

        rows.into_iter()
            .filter(|row| filters.iter().all(|filter| eval(row, filter)))
            .collect()
    }
}

impl PageSource for MemoryQuery {
    type Row = Record;

    async fn fetch_page(self, window: PageWindow) -> Result<FetchedPage<Record>, BackendError> {
        Ok(window.apply(self.all()))
    }
}
