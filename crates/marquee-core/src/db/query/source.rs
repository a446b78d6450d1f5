use crate::db::{BackendError, query::PageWindow, row::Row};

///
/// FetchedPage
///
/// One page of rows plus the size of the base-filtered set the page was cut
/// from.
///

#[derive(Clone, Debug, PartialEq)]
pub struct FetchedPage<R> {
    pub rows: Vec<R>,
    pub count: u64,
}

///
/// PageSource
///
/// A base query (entity plus caller filters) that can run once with a
/// pagination window applied. Backends translate the window into their own
/// statement language; in-process sources can use [`PageWindow::apply`].
///

pub trait PageSource {
    type Row: Row + Send;

    fn fetch_page(
        self,
        window: PageWindow,
    ) -> impl Future<Output = Result<FetchedPage<Self::Row>, BackendError>> + Send;
}

impl<R: Row + Send> PageSource for Vec<R> {
    type Row = R;

    async fn fetch_page(self, window: PageWindow) -> Result<FetchedPage<R>, BackendError> {
        Ok(window.apply(self))
    }
}
