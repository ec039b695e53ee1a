//! Storage-level guarantees of the bins table against an on-disk database:
//! round-trip fidelity, exact lookups, collision detection under concurrent
//! writers and atomic inserts.

use std::collections::HashSet;
use std::sync::Arc;

use tempfile::TempDir;

use common::bin::Bin;
use common::short_id::{RandomIdGenerator, SequenceIdGenerator};
use minibin_daemon::{BinService, BinStoreError, Database};

/// Create a file-backed test database
async fn setup_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    let db = Database::open(&db_path).await.unwrap();

    (db, temp_dir)
}

#[tokio::test]
async fn test_round_trip_is_byte_exact() {
    let (db, _temp_dir) = setup_test_db().await;

    let cases = [
        ("rt000001", Bin::new("print('hi')", "python", "abcd1234")),
        ("rt000002", Bin::new("", "", "")),
        ("rt000003", Bin::new("  padded\n\ttext  \r\n", " rust ", " ")),
        ("rt000004", Bin::new("üñíçødé ✓ 🦀", "markdown", "")),
        ("rt000005", Bin::new("x\u{0}y", "none", "AAECAwQFBgcICQoL")),
    ];

    for (id, bin) in &cases {
        db.create_bin(id, bin).await.unwrap();
    }

    for (id, bin) in &cases {
        let record = db.get_bin(id).await.unwrap();
        assert_eq!(&record.id, id);
        assert_eq!(&record.bin, bin);
    }
}

#[tokio::test]
async fn test_records_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("persist.db");
    let bin = Bin::new("Zm9vYmFy", "javascript", "c2VjcmV0aXY=");

    {
        let db = Database::open(&db_path).await.unwrap();
        db.create_bin("persist1", &bin).await.unwrap();
        db.close().await;
    }

    // Reopening runs the schema setup again; existing rows must be untouched
    let db = Database::open(&db_path).await.unwrap();
    assert_eq!(db.get_bin("persist1").await.unwrap().bin, bin);
    assert_eq!(db.count_bins().await.unwrap(), 1);
}

#[tokio::test]
async fn test_never_created_id_is_not_found() {
    let (db, _temp_dir) = setup_test_db().await;

    match db.get_bin("missing1").await {
        Err(BinStoreError::NotFound(id)) => assert_eq!(id, "missing1"),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_concurrent_inserts_of_one_id_have_one_winner() {
    let (db, _temp_dir) = setup_test_db().await;

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let db = db.clone();
            tokio::spawn(async move {
                db.create_bin("contest1", &Bin::new(format!("writer {i}"), "", ""))
                    .await
            })
        })
        .collect();

    let mut winners = 0;
    let mut collisions = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => winners += 1,
            Err(BinStoreError::Collision(id)) => {
                assert_eq!(id, "contest1");
                collisions += 1;
            }
            Err(e) => panic!("unexpected storage error: {e}"),
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(collisions, 7);
    assert_eq!(db.count_bins().await.unwrap(), 1);
    assert!(db
        .get_bin("contest1")
        .await
        .unwrap()
        .bin
        .content
        .starts_with("writer "));
}

#[tokio::test]
async fn test_failed_insert_leaves_nothing_behind() {
    let (db, _temp_dir) = setup_test_db().await;

    // Simulate a storage fault in the middle of the write
    sqlx::query(
        r#"
        CREATE TRIGGER fail_poisoned_insert BEFORE INSERT ON bins
        WHEN NEW.content = 'poison'
        BEGIN
            SELECT RAISE(ABORT, 'simulated storage fault');
        END
        "#,
    )
    .execute(&*db)
    .await
    .unwrap();

    let err = db
        .create_bin("atomic01", &Bin::new("poison", "text", "iv"))
        .await
        .unwrap_err();

    assert!(
        matches!(err, BinStoreError::Storage(_)),
        "a fault must not look like a collision: {err:?}"
    );
    assert!(db.get_bin("atomic01").await.unwrap_err().is_not_found());
    assert_eq!(db.count_bins().await.unwrap(), 0);

    // The id is still free for a healthy write
    db.create_bin("atomic01", &Bin::new("fine", "text", "iv"))
        .await
        .unwrap();
    assert_eq!(db.get_bin("atomic01").await.unwrap().bin.content, "fine");
}

#[tokio::test]
async fn test_concurrent_creates_get_distinct_ids() {
    let (db, _temp_dir) = setup_test_db().await;
    let service = BinService::new(db.clone(), Arc::new(RandomIdGenerator::default()));

    let handles: Vec<_> = (0..50)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move { service.create(&Bin::new(format!("bin {i}"), "", "")).await })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        let created = handle.await.unwrap().unwrap();
        assert!(ids.insert(created.id));
    }

    assert_eq!(ids.len(), 50);
    assert_eq!(db.count_bins().await.unwrap(), 50);
}

#[tokio::test]
async fn test_concurrent_creates_survive_a_repeated_candidate() {
    let (db, _temp_dir) = setup_test_db().await;
    let ids = Arc::new(SequenceIdGenerator::new(["AAAAAAAA", "AAAAAAAA", "BBBBBBBB"]));
    let service = BinService::new(db.clone(), ids.clone());

    let first_bin = Bin::new("first", "", "");
    let second_bin = Bin::new("second", "", "");
    let (first, second) = tokio::join!(service.create(&first_bin), service.create(&second_bin));
    let (first, second) = (first.unwrap(), second.unwrap());

    let mut got: Vec<_> = vec![
        (first.id.to_string(), first.attempts),
        (second.id.to_string(), second.attempts),
    ];
    got.sort();

    // Exactly one create won the duplicate candidate, the other collided and
    // succeeded on its regenerated id
    assert_eq!(
        got,
        vec![("AAAAAAAA".to_string(), 1), ("BBBBBBBB".to_string(), 2)]
    );
    assert_eq!(ids.remaining(), 0);
    assert_eq!(db.count_bins().await.unwrap(), 2);

    let stored_a = db.get_bin("AAAAAAAA").await.unwrap().bin;
    let stored_b = db.get_bin("BBBBBBBB").await.unwrap().bin;
    let mut contents = vec![stored_a.content, stored_b.content];
    contents.sort();
    assert_eq!(contents, vec!["first".to_string(), "second".to_string()]);
}
