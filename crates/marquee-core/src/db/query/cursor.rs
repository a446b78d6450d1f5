use crate::{
    config::PaginationConfig,
    db::{
        cursor::{CursorToken, next_cursor},
        order::{OrderSpec, OrderTerm},
        predicate::{Predicate, keyset_predicate},
        query::{FetchedPage, PageError, PageSource, PageWindow},
    },
    model::EntityModel,
    obs::{MetricsEvent, SharedSink, noop_sink},
};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

const DEFAULT_TAKE: u32 = 5;
const DEFAULT_MAX_TAKE: u32 = 100;

///
/// CursorPageRequest
///
/// Client input for one cursor page. `order` accepts a single entry or a
/// list; `None` means the paginator's default order.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CursorPageRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,

    #[serde(
        deserialize_with = "one_or_many",
        skip_serializing_if = "Option::is_none"
    )]
    pub order: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub take: Option<u32>,
}

impl CursorPageRequest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    #[must_use]
    pub fn with_order<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order = Some(entries.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub const fn with_take(mut self, take: u32) -> Self {
        self.take = Some(take);
        self
    }
}

fn one_or_many<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<String>>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(Option::<OneOrMany>::deserialize(deserializer)?.map(|order| match order {
        OneOrMany::One(entry) => vec![entry],
        OneOrMany::Many(entries) => entries,
    }))
}

///
/// CursorPage
///

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorPage<R> {
    pub data: Vec<R>,
    pub next_cursor: Option<String>,
    pub count: u64,
}

///
/// CursorPlan
///
/// Validated, I/O-free plan for one page. When a cursor was supplied its
/// embedded ordering replaces the request's.
///

#[derive(Clone, Debug, PartialEq)]
pub struct CursorPlan {
    pub order: OrderSpec,
    pub keyset: Option<Predicate>,
    pub take: u32,
}

impl CursorPlan {
    #[must_use]
    pub const fn is_first_page(&self) -> bool {
        self.keyset.is_none()
    }

    #[must_use]
    pub fn window(&self) -> PageWindow {
        let window = PageWindow::new(self.order.clone(), self.take);

        match &self.keyset {
            Some(keyset) => window.with_keyset(keyset.clone()),
            None => window,
        }
    }
}

///
/// CursorPaginator
///
/// Keyset paginator bound to one entity's column allow-list.
///

#[derive(Clone)]
pub struct CursorPaginator {
    model: EntityModel,
    default_take: u32,
    max_take: u32,
    default_order: OrderSpec,
    sink: SharedSink,
}

impl CursorPaginator {
    /// Paginator with the catalog defaults: 5 rows, at most 100, `id_DESC`.
    #[must_use]
    pub fn new(model: EntityModel) -> Self {
        Self {
            model,
            default_take: DEFAULT_TAKE,
            max_take: DEFAULT_MAX_TAKE,
            default_order: OrderSpec::single(OrderTerm::desc("id")),
            sink: noop_sink(),
        }
    }

    pub fn from_config(model: EntityModel, config: &PaginationConfig) -> Result<Self, PageError> {
        let default_order = OrderSpec::parse(&config.default_order, &model)?;

        Self::new(model)
            .with_take_limits(config.default_take, config.max_take)
            .map(|paginator| paginator.with_default_order(default_order))
    }

    pub fn with_take_limits(mut self, default_take: u32, max_take: u32) -> Result<Self, PageError> {
        if default_take == 0 || max_take == 0 {
            return Err(PageError::InvalidTake);
        }
        self.default_take = default_take;
        self.max_take = max_take;

        Ok(self)
    }

    #[must_use]
    pub fn with_default_order(mut self, order: OrderSpec) -> Self {
        self.default_order = order;
        self
    }

    #[must_use]
    pub fn with_metrics_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    #[must_use]
    pub const fn model(&self) -> &EntityModel {
        &self.model
    }

    /// Validate a request and resolve it into a plan. Performs no I/O.
    pub fn plan(&self, request: &CursorPageRequest) -> Result<CursorPlan, PageError> {
        let take = match request.take {
            Some(0) => return Err(PageError::InvalidTake),
            Some(take) => take.min(self.max_take),
            None => self.default_take.min(self.max_take),
        };

        // an empty cursor string means "first page"
        let cursor = request
            .cursor
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty());

        if let Some(token) = cursor {
            let (values, order) = CursorToken::decode(token, &self.model)?.into_parts();
            let keyset = keyset_predicate(&order, &values)?;

            return Ok(CursorPlan {
                order,
                keyset: Some(keyset),
                take,
            });
        }

        let order = match &request.order {
            Some(entries) => OrderSpec::parse(entries, &self.model)?,
            None => self.default_order.clone(),
        };

        Ok(CursorPlan {
            order,
            keyset: None,
            take,
        })
    }

    /// Plan, fetch one page from `source`, and compute the next cursor.
    pub async fn execute<S: PageSource>(
        &self,
        source: S,
        request: &CursorPageRequest,
    ) -> Result<CursorPage<S::Row>, PageError> {
        let plan = self.plan(request)?;
        let FetchedPage { rows, count } = source
            .fetch_page(plan.window())
            .await
            .map_err(PageError::Source)?;
        let next_cursor = next_cursor(&rows, &plan.order)?;

        debug!(
            entity = self.model.path,
            order = %plan.order,
            rows = rows.len(),
            count,
            first_page = plan.is_first_page(),
            "cursor page served"
        );
        self.sink.record(MetricsEvent::PageServed {
            entity_path: self.model.path,
            rows: rows.len() as u64,
            first_page: plan.is_first_page(),
        });

        Ok(CursorPage {
            data: rows,
            next_cursor,
            count,
        })
    }
}
