use chrono::Utc;
use rusty_inventory_ddd::adapters::mock::{
    ActivityLog as MockActivityLog, BorrowerStore as MockBorrowerStore, Db,
    ItemStore as MockItemStore, LoanStore as MockLoanStore,
};
use rusty_inventory_ddd::application::ServiceDependencies;
use rusty_inventory_ddd::application::scan::{ScanApplicationError, reset_scans, scan_item};
use rusty_inventory_ddd::domain::commands::{ResetScans, ScanItem};
use rusty_inventory_ddd::domain::{Barcode, Item, ItemStatus, NewItem};
use rusty_inventory_ddd::ports::ActivityAction;
use std::sync::Arc;

// ============================================================================
// テスト用のセットアップ
// ============================================================================

struct TestContext {
    deps: ServiceDependencies,
    item_store: Arc<MockItemStore>,
    activity_log: Arc<MockActivityLog>,
}

fn setup() -> TestContext {
    let db = Db::new();
    let item_store = Arc::new(MockItemStore::new(&db));
    let activity_log = Arc::new(MockActivityLog::new(&db));

    let deps = ServiceDependencies {
        item_store: item_store.clone(),
        loan_store: Arc::new(MockLoanStore::new(&db)),
        borrower_store: Arc::new(MockBorrowerStore::new(&db)),
        activity_log: activity_log.clone(),
    };

    TestContext {
        deps,
        item_store,
        activity_log,
    }
}

fn available_item(barcode: &str) -> Item {
    NewItem {
        barcode: Barcode::new(barcode).unwrap(),
        name: format!("Item {}", barcode),
        brand: None,
        color: None,
        size: None,
        price: 100.0,
        category: None,
    }
    .into_item(Utc::now())
}

fn scan_cmd(barcode: &str) -> ScanItem {
    ScanItem {
        barcode: Barcode::new(barcode).unwrap(),
        actor: "stocktaker".to_string(),
        scanned_at: Utc::now(),
    }
}

// ============================================================================
// スキャン：正常系
// ============================================================================

#[tokio::test]
async fn test_scan_marks_item_and_appends_activity() {
    let ctx = setup();
    ctx.item_store.add_item(available_item("X1"));

    let item = scan_item(&ctx.deps, scan_cmd("X1")).await.unwrap();

    // 不変条件：Scanned ⇔ scan_timestamp != None
    assert_eq!(item.status, ItemStatus::Scanned);
    assert!(item.scan_timestamp.is_some());

    let stored = ctx
        .deps
        .item_store
        .get(&Barcode::new("X1").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, ItemStatus::Scanned);
    assert!(stored.scan_timestamp.is_some());

    let entries = ctx.activity_log.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, ActivityAction::ItemScanned);
    assert_eq!(entries[0].entity_id, "X1");
}

#[tokio::test]
async fn test_scan_on_loan_item_is_allowed() {
    // 棚卸で貸出中の備品を読むケース。ガードは「Scannedでない」こと
    let ctx = setup();
    ctx.item_store
        .add_item(available_item("X1").into_on_loan(Utc::now()));

    let item = scan_item(&ctx.deps, scan_cmd("X1")).await.unwrap();

    assert_eq!(item.status, ItemStatus::Scanned);
    assert!(item.scan_timestamp.is_some());
}

// ============================================================================
// スキャン：異常系
// ============================================================================

#[tokio::test]
async fn test_scan_unknown_barcode_fails() {
    let ctx = setup();

    let result = scan_item(&ctx.deps, scan_cmd("MISSING")).await;

    assert!(matches!(result, Err(ScanApplicationError::ItemNotFound)));
    // 失敗した操作は監査されない
    assert!(ctx.activity_log.entries().is_empty());
}

#[tokio::test]
async fn test_scan_twice_is_rejected_idempotently() {
    let ctx = setup();
    ctx.item_store.add_item(available_item("X1"));

    scan_item(&ctx.deps, scan_cmd("X1")).await.unwrap();
    let second = scan_item(&ctx.deps, scan_cmd("X1")).await;

    assert!(matches!(second, Err(ScanApplicationError::AlreadyScanned)));

    // 最初のスキャンのエントリだけが残る
    let entries = ctx.activity_log.entries();
    assert_eq!(entries.len(), 1);
}

// ============================================================================
// スキャン：並行性
// ============================================================================

#[tokio::test]
async fn test_concurrent_scans_exactly_one_wins() {
    let ctx = setup();
    ctx.item_store.add_item(available_item("X1"));

    let mut handles = Vec::new();
    for n in 0..8 {
        let deps = ctx.deps.clone();
        handles.push(tokio::spawn(async move {
            let cmd = ScanItem {
                barcode: Barcode::new("X1").unwrap(),
                actor: format!("caller-{}", n),
                scanned_at: Utc::now(),
            };
            scan_item(&deps, cmd).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(err) => assert!(matches!(
                err,
                ScanApplicationError::AlreadyScanned
                    | ScanApplicationError::ConcurrentScanConflict
            )),
        }
    }

    // ちょうど1つの呼び出しだけが行を更新できる
    assert_eq!(successes, 1);

    let stored = ctx
        .deps
        .item_store
        .get(&Barcode::new("X1").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, ItemStatus::Scanned);
    assert!(stored.scan_timestamp.is_some());

    // 監査ログにはスキャンのエントリがちょうど1件
    let scan_entries: Vec<_> = ctx
        .activity_log
        .entries()
        .into_iter()
        .filter(|e| e.action == ActivityAction::ItemScanned)
        .collect();
    assert_eq!(scan_entries.len(), 1);
}

// ============================================================================
// リセット
// ============================================================================

#[tokio::test]
async fn test_reset_clears_all_scan_marks() {
    let ctx = setup();
    ctx.item_store.add_item(available_item("X1"));
    ctx.item_store.add_item(available_item("X2"));
    scan_item(&ctx.deps, scan_cmd("X1")).await.unwrap();
    scan_item(&ctx.deps, scan_cmd("X2")).await.unwrap();

    let cmd = ResetScans {
        barcode: None,
        actor: "admin".to_string(),
        reset_at: Utc::now(),
    };
    let affected = reset_scans(&ctx.deps, cmd).await.unwrap();
    assert_eq!(affected, 2);

    for barcode in ["X1", "X2"] {
        let stored = ctx
            .deps
            .item_store
            .get(&Barcode::new(barcode).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, ItemStatus::Available);
        assert!(stored.scan_timestamp.is_none());
    }

    // 冪等な一括クリア：二度目は0件
    let cmd = ResetScans {
        barcode: None,
        actor: "admin".to_string(),
        reset_at: Utc::now(),
    };
    let affected = reset_scans(&ctx.deps, cmd).await.unwrap();
    assert_eq!(affected, 0);
}

#[tokio::test]
async fn test_reset_single_barcode_leaves_others_scanned() {
    let ctx = setup();
    ctx.item_store.add_item(available_item("X1"));
    ctx.item_store.add_item(available_item("X2"));
    scan_item(&ctx.deps, scan_cmd("X1")).await.unwrap();
    scan_item(&ctx.deps, scan_cmd("X2")).await.unwrap();

    let cmd = ResetScans {
        barcode: Some(Barcode::new("X1").unwrap()),
        actor: "admin".to_string(),
        reset_at: Utc::now(),
    };
    let affected = reset_scans(&ctx.deps, cmd).await.unwrap();
    assert_eq!(affected, 1);

    let x1 = ctx
        .deps
        .item_store
        .get(&Barcode::new("X1").unwrap())
        .await
        .unwrap()
        .unwrap();
    let x2 = ctx
        .deps
        .item_store
        .get(&Barcode::new("X2").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(x1.status, ItemStatus::Available);
    assert_eq!(x2.status, ItemStatus::Scanned);
}
