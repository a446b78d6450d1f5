use marquee_core::{
    ErrorClass,
    db::{
        memory::MemoryDatabase,
        order::OrderSpec,
        query::{CursorPageRequest, CursorPaginator, PageError},
        row::Record,
        tx::{Pool, RequestContext, TransactionError, TransactionLifecycle},
    },
    model::catalog::{DIRECTOR, MOVIE},
    value::Value,
};
use proptest::prelude::*;

const MOVIES: &str = "movie";

fn movie(id: i64, like_count: impl Into<Value>, title: &str) -> Record {
    Record::new()
        .with("id", id)
        .with("likeCount", like_count)
        .with("title", title)
}

fn ids(rows: &[Record]) -> Vec<i64> {
    rows.iter().filter_map(|row| row.int("id")).collect()
}

/// Follow `nextCursor` until it runs out, returning every page.
async fn walk(
    paginator: &CursorPaginator,
    db: &MemoryDatabase,
    first: CursorPageRequest,
) -> Result<Vec<Vec<Record>>, PageError> {
    let take = first.take;
    let mut pages = Vec::new();
    let mut request = first;

    loop {
        let page = paginator.execute(db.query(MOVIES), &request).await?;
        pages.push(page.data);

        let Some(cursor) = page.next_cursor else {
            return Ok(pages);
        };
        request = CursorPageRequest {
            cursor: Some(cursor),
            order: None,
            take,
        };
    }
}

#[tokio::test]
async fn movie_listing_scenario() {
    let db = MemoryDatabase::new();
    db.seed(
        MOVIES,
        [movie(5, 10, "Alien"), movie(3, 10, "Heat"), movie(9, 7, "Ronin")],
    );

    let pages = walk(
        &CursorPaginator::new(MOVIE),
        &db,
        CursorPageRequest::new()
            .with_order(["likeCount_DESC", "id_DESC"])
            .with_take(2),
    )
    .await
    .expect("walk succeeds");

    let page_ids: Vec<Vec<i64>> = pages.iter().map(|page| ids(page)).collect();
    assert_eq!(page_ids, vec![vec![5, 3], vec![9], vec![]]);
}

#[tokio::test]
async fn null_sort_values_page_without_gaps() {
    let db = MemoryDatabase::new();
    db.seed(
        MOVIES,
        [
            movie(1, 5, "Alien"),
            movie(2, Value::Null, "Heat"),
            movie(3, Value::Null, "Ronin"),
            movie(4, 7, "Dune"),
        ],
    );
    let paginator = CursorPaginator::new(MOVIE);

    for (order, expected) in [
        (["likeCount_DESC", "id_DESC"], vec![3, 2, 4, 1]),
        (["likeCount_ASC", "id_ASC"], vec![2, 3, 1, 4]),
    ] {
        let pages = walk(
            &paginator,
            &db,
            CursorPageRequest::new().with_order(order).with_take(1),
        )
        .await
        .expect("walk succeeds");

        let flattened: Vec<Record> = pages.into_iter().flatten().collect();
        assert_eq!(ids(&flattened), expected, "{order:?}");
    }
}

#[tokio::test]
async fn base_filters_shape_count_but_keyset_does_not() {
    let db = MemoryDatabase::new();
    db.seed(
        MOVIES,
        [
            movie(1, 4, "Alien"),
            movie(2, 4, "Aliens"),
            movie(3, 9, "Alien 3"),
            movie(4, 1, "Heat"),
        ],
    );
    let paginator = CursorPaginator::new(MOVIE);
    let request = CursorPageRequest::new().with_take(2);

    let first = paginator
        .execute(db.query(MOVIES).contains("title", "Alien"), &request)
        .await
        .expect("first page");
    assert_eq!(ids(&first.data), vec![3, 2]);
    assert_eq!(first.count, 3);

    let second = paginator
        .execute(
            db.query(MOVIES).contains("title", "Alien"),
            &CursorPageRequest::new()
                .with_cursor(first.next_cursor.expect("cursor"))
                .with_take(2),
        )
        .await
        .expect("second page");
    assert_eq!(ids(&second.data), vec![1]);
    assert_eq!(second.count, 3);
}

#[tokio::test]
async fn cursor_from_another_entity_is_rejected() {
    let db = MemoryDatabase::new();
    db.seed(MOVIES, [movie(1, 2, "Alien"), movie(2, 2, "Heat")]);

    let page = CursorPaginator::new(MOVIE)
        .execute(
            db.query(MOVIES),
            &CursorPageRequest::new()
                .with_order(["likeCount_DESC", "id_DESC"])
                .with_take(1),
        )
        .await
        .expect("movie page");
    let cursor = page.next_cursor.expect("cursor");

    let err = CursorPaginator::new(DIRECTOR)
        .plan(&CursorPageRequest::new().with_cursor(cursor))
        .expect_err("likeCount is not a director column");
    assert!(matches!(err, PageError::Cursor(_)));
    assert_eq!(err.class(), ErrorClass::InvalidInput);
}

#[tokio::test]
async fn paging_inside_a_transaction_sees_own_writes() {
    let db = MemoryDatabase::new();
    db.seed(MOVIES, [movie(1, 0, "Alien")]);
    let lifecycle = TransactionLifecycle::new(Pool::new(db.clone(), &Default::default()));
    let paginator = CursorPaginator::new(MOVIE);
    let mut ctx = RequestContext::new();

    let page = lifecycle
        .run(&mut ctx, async |ctx| {
            let tx = ctx.transaction()?;
            let conn = tx.connection()?;
            conn.insert(MOVIES, movie(2, 0, "Heat"))
                .await
                .expect("insert within transaction");
            let page = paginator
                .execute(conn.query(MOVIES), &CursorPageRequest::new())
                .await
                .expect("page within transaction");
            tx.mark_success()?;
            Ok::<_, TransactionError>(page)
        })
        .await
        .expect("request commits");

    assert_eq!(ids(&page.data), vec![2, 1]);
    assert_eq!(page.count, 2);
}

fn arb_table() -> impl Strategy<Value = Vec<Record>> {
    let like_count = prop::option::weighted(0.8, 0i64..5);

    prop::collection::vec((like_count, "[a-c]{1,2}"), 0..40).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(idx, (like_count, title))| {
                movie(i64::try_from(idx).expect("small table"), like_count, &title)
            })
            .collect()
    })
}

fn arb_order() -> impl Strategy<Value = Vec<String>> {
    let leading = prop::sample::subsequence(vec!["likeCount", "title"], 0..=2);
    let direction = || prop_oneof![Just("ASC"), Just("DESC")];

    (leading, prop::collection::vec(direction(), 3)).prop_map(|(columns, dirs)| {
        columns
            .into_iter()
            .chain(std::iter::once("id"))
            .zip(dirs)
            .map(|(column, dir)| format!("{column}_{dir}"))
            .collect()
    })
}

proptest! {
    // Concatenated pages reproduce the fully sorted table, without gaps or
    // repeats, for any order ending in the unique id column.
    #[test]
    fn paging_reproduces_full_sort(table in arb_table(), order in arb_order(), take in 1u32..7) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .expect("runtime");
        let db = MemoryDatabase::new();
        db.seed(MOVIES, table.clone());

        let pages = runtime
            .block_on(walk(
                &CursorPaginator::new(MOVIE),
                &db,
                CursorPageRequest::new().with_order(order.clone()).with_take(take),
            ))
            .expect("walk succeeds");

        let spec = OrderSpec::parse(&order, &MOVIE).expect("generated order is valid");
        let mut expected = table;
        expected.sort_by(|a, b| spec.compare_rows(a, b));

        for page in &pages[..pages.len() - 1] {
            prop_assert!(!page.is_empty());
            prop_assert!(page.len() <= take as usize);
        }
        prop_assert!(pages.last().is_some_and(Vec::is_empty));

        let flattened: Vec<Record> = pages.into_iter().flatten().collect();
        prop_assert_eq!(ids(&flattened), ids(&expected));
    }
}
