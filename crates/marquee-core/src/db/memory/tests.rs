use crate::db::{
    memory::{Fault, MemoryDatabase, MemoryStats},
    predicate::Predicate,
    row::Record,
    tx::{Connection, Database},
};

const MOVIES: &str = "movie";

fn movie(id: i64) -> Record {
    Record::new().with("id", id).with("title", format!("movie {id}"))
}

#[tokio::test]
async fn writes_stay_private_until_commit() {
    let db = MemoryDatabase::new();
    let mut conn = db.connect().await.expect("connect");

    conn.begin().await.expect("begin");
    conn.insert(MOVIES, movie(1)).await.expect("insert");

    assert_eq!(conn.rows(MOVIES).len(), 1, "own writes are visible");
    assert!(db.rows(MOVIES).is_empty(), "other sessions see nothing yet");

    conn.commit().await.expect("commit");
    assert_eq!(db.rows(MOVIES), vec![movie(1)]);
    assert!(!conn.in_transaction());
}

#[tokio::test]
async fn rollback_discards_pending_writes() {
    let db = MemoryDatabase::new();
    db.seed(MOVIES, [movie(1), movie(2)]);
    let mut conn = db.connect().await.expect("connect");

    conn.begin().await.expect("begin");
    let removed = conn
        .delete_where(MOVIES, Predicate::eq("id", 1))
        .await
        .expect("delete");
    conn.insert(MOVIES, movie(3)).await.expect("insert");
    assert_eq!(removed, 1);
    assert_eq!(conn.rows(MOVIES), vec![movie(2), movie(3)]);

    conn.rollback().await.expect("rollback");
    assert_eq!(conn.rows(MOVIES), vec![movie(1), movie(2)]);
    assert_eq!(db.rows(MOVIES), vec![movie(1), movie(2)]);
}

#[tokio::test]
async fn writes_require_open_transaction() {
    let db = MemoryDatabase::new();
    let mut conn = db.connect().await.expect("connect");

    conn.insert(MOVIES, movie(1))
        .await
        .expect_err("no transaction is open");

    conn.begin().await.expect("begin");
    conn.begin().await.expect_err("nested begin is rejected");
}

#[tokio::test]
async fn injected_faults_fire_once() {
    let db = MemoryDatabase::new();

    db.fail_next(Fault::Connect);
    assert!(db.connect().await.is_err());
    let mut conn = db.connect().await.expect("second connect succeeds");

    conn.begin().await.expect("begin");
    conn.insert(MOVIES, movie(1)).await.expect("insert");
    db.fail_next(Fault::Commit);
    conn.commit().await.expect_err("injected commit failure");
    assert!(conn.in_transaction(), "failed commit leaves the transaction open");

    conn.rollback().await.expect("rollback after failed commit");
    assert!(db.rows(MOVIES).is_empty());

    conn.close().await.expect("close");
    assert_eq!(
        db.stats(),
        MemoryStats {
            connects: 1,
            begins: 1,
            commits: 0,
            rollbacks: 1,
            closes: 1,
        }
    );
}

#[test]
fn query_applies_base_filters() {
    let db = MemoryDatabase::new();
    db.seed(
        MOVIES,
        [
            Record::new().with("id", 1).with("title", "Alien"),
            Record::new().with("id", 2).with("title", "Aliens"),
            Record::new().with("id", 3).with("title", "Heat"),
        ],
    );

    let rows = db.query(MOVIES).contains("title", "Alien").all();
    assert_eq!(rows.len(), 2);

    let rows = db
        .query(MOVIES)
        .filter(Predicate::gt("id", 1))
        .contains("title", "Alien")
        .all();
    assert_eq!(rows.iter().filter_map(|r| r.int("id")).collect::<Vec<_>>(), vec![2]);
}
