use crate::{
    db::{
        direction::Direction,
        order::{OrderSpec, OrderTerm},
        query::{FetchedPage, PageError, PageSource, PageWindow},
    },
    model::EntityModel,
    obs::{MetricsEvent, SharedSink, noop_sink},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

///
/// OffsetPageRequest
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct OffsetPageRequest {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub order: Option<Direction>,
}

///
/// OffsetPage
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OffsetPage<R> {
    pub data: Vec<R>,
    pub count: u64,
}

///
/// OffsetPaginator
///
/// Page/limit pagination ordered by the entity's `id` column.
///

#[derive(Clone)]
pub struct OffsetPaginator {
    model: EntityModel,
    default_limit: u32,
    max_limit: u32,
    sink: SharedSink,
}

impl OffsetPaginator {
    #[must_use]
    pub fn new(model: EntityModel) -> Self {
        Self {
            model,
            default_limit: 5,
            max_limit: 100,
            sink: noop_sink(),
        }
    }

    pub fn with_limits(mut self, default_limit: u32, max_limit: u32) -> Result<Self, PageError> {
        if default_limit == 0 || max_limit == 0 {
            return Err(PageError::InvalidLimit);
        }
        self.default_limit = default_limit;
        self.max_limit = max_limit;

        Ok(self)
    }

    #[must_use]
    pub fn with_metrics_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    /// Resolve a request into a window. Performs no I/O.
    pub fn window(&self, request: &OffsetPageRequest) -> Result<PageWindow, PageError> {
        let page = request.page.unwrap_or(1);
        if page == 0 {
            return Err(PageError::InvalidPage);
        }
        let limit = match request.limit {
            Some(0) => return Err(PageError::InvalidLimit),
            Some(limit) => limit.min(self.max_limit),
            None => self.default_limit.min(self.max_limit),
        };
        let direction = request.order.unwrap_or_default();
        let order = OrderSpec::single(OrderTerm::new("id", direction));
        let offset = u64::from(page - 1) * u64::from(limit);

        Ok(PageWindow::new(order, limit).with_offset(offset))
    }

    pub async fn execute<S: PageSource>(
        &self,
        source: S,
        request: &OffsetPageRequest,
    ) -> Result<OffsetPage<S::Row>, PageError> {
        let window = self.window(request)?;
        let offset = window.offset;
        let FetchedPage { rows, count } = source
            .fetch_page(window)
            .await
            .map_err(PageError::Source)?;

        debug!(
            entity = self.model.path,
            offset,
            rows = rows.len(),
            count,
            "offset page served"
        );
        self.sink.record(MetricsEvent::PageServed {
            entity_path: self.model.path,
            rows: rows.len() as u64,
            first_page: offset == 0,
        });

        Ok(OffsetPage { data: rows, count })
    }
}
