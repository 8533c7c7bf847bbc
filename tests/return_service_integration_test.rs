use chrono::Utc;
use rusty_inventory_ddd::adapters::mock::{
    ActivityLog as MockActivityLog, BorrowerStore as MockBorrowerStore, Db,
    ItemStore as MockItemStore, LoanStore as MockLoanStore,
};
use rusty_inventory_ddd::application::ServiceDependencies;
use rusty_inventory_ddd::application::loan::create_loan;
use rusty_inventory_ddd::application::returns::{
    ReturnApplicationError, return_batch, return_item,
};
use rusty_inventory_ddd::application::scan::scan_item;
use rusty_inventory_ddd::domain::commands::{CreateLoan, ReturnBatch, ReturnItem, ScanItem};
use rusty_inventory_ddd::domain::{
    Barcode, Borrower, BorrowerId, InvoiceNo, Item, ItemStatus, LoanStatus, NewItem,
};
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

fn loan_cmd(barcodes: &[&str]) -> CreateLoan {
    CreateLoan {
        borrower: Borrower {
            id: BorrowerId::new("3174051234560001").unwrap(),
            name: "Alice Tan".to_string(),
            phone: None,
            email: None,
        },
        inputter: "operator".to_string(),
        program: "workshop".to_string(),
        reason: "quarterly training".to_string(),
        items: barcodes
            .iter()
            .map(|b| Barcode::new(*b).unwrap())
            .collect(),
        loan_period_days: 7,
        signature: None,
        loaned_at: Utc::now(),
    }
}

fn return_cmd(barcode: &str) -> ReturnItem {
    ReturnItem {
        barcode: Barcode::new(barcode).unwrap(),
        actor: "operator".to_string(),
        returned_at: Utc::now(),
    }
}

async fn seed_loan(ctx: &TestContext, barcodes: &[&str]) -> InvoiceNo {
    for barcode in barcodes {
        ctx.item_store.add_item(available_item(barcode));
    }
    let loan = create_loan(&ctx.deps, loan_cmd(barcodes)).await.unwrap();
    loan.invoice_no
}

async fn loan_status(ctx: &TestContext, invoice_no: &InvoiceNo) -> LoanStatus {
    let (loan, _) = ctx
        .deps
        .loan_store
        .get_by_invoice(invoice_no)
        .await
        .unwrap()
        .unwrap();
    loan.status
}

async fn item_status(ctx: &TestContext, barcode: &str) -> Item {
    ctx.deps
        .item_store
        .get(&Barcode::new(barcode).unwrap())
        .await
        .unwrap()
        .unwrap()
}

// ============================================================================
// 単品返却
// ============================================================================

#[tokio::test]
async fn test_return_one_releases_item_and_completes_single_item_loan() {
    let ctx = setup();
    let invoice_no = seed_loan(&ctx, &["X1"]).await;

    let returned = return_item(&ctx.deps, return_cmd("X1")).await.unwrap();

    assert!(returned.loan_completed);
    assert_eq!(returned.invoice_no, invoice_no);
    assert!(returned.loan_item.returned_at.is_some());

    let item = item_status(&ctx, "X1").await;
    assert_eq!(item.status, ItemStatus::Available);
    assert!(item.scan_timestamp.is_none());

    assert_eq!(loan_status(&ctx, &invoice_no).await, LoanStatus::Completed);

    // 監査ログは請求書番号を参照する
    let entries = ctx.activity_log.entries();
    let return_entry = entries
        .iter()
        .find(|e| e.action == ActivityAction::ItemReturned)
        .unwrap();
    assert_eq!(return_entry.entity_id, invoice_no.as_str());
}

#[tokio::test]
async fn test_return_twice_fails_with_not_on_loan() {
    let ctx = setup();
    seed_loan(&ctx, &["X1"]).await;

    return_item(&ctx.deps, return_cmd("X1")).await.unwrap();
    let second = return_item(&ctx.deps, return_cmd("X1")).await;

    assert!(matches!(second, Err(ReturnApplicationError::NotOnLoan)));

    // 1回目でAvailableになり、2回目では変わらない
    let item = item_status(&ctx, "X1").await;
    assert_eq!(item.status, ItemStatus::Available);
}

#[tokio::test]
async fn test_return_never_loaned_barcode_fails() {
    let ctx = setup();
    ctx.item_store.add_item(available_item("X1"));

    let result = return_item(&ctx.deps, return_cmd("X1")).await;

    assert!(matches!(result, Err(ReturnApplicationError::NotOnLoan)));
}

#[tokio::test]
async fn test_loan_completes_only_after_every_item_is_returned() {
    let ctx = setup();
    let invoice_no = seed_loan(&ctx, &["X1", "X2", "X3"]).await;

    return_item(&ctx.deps, return_cmd("X1")).await.unwrap();
    let second = return_item(&ctx.deps, return_cmd("X2")).await.unwrap();

    // 3件中2件の返却では貸出はOpenのまま
    assert!(!second.loan_completed);
    assert_eq!(loan_status(&ctx, &invoice_no).await, LoanStatus::Open);

    let third = return_item(&ctx.deps, return_cmd("X3")).await.unwrap();
    assert!(third.loan_completed);
    assert_eq!(loan_status(&ctx, &invoice_no).await, LoanStatus::Completed);
}

#[tokio::test]
async fn test_returning_scanned_on_loan_item_clears_scan_mark() {
    // 貸出中にスキャンされた備品を返却すると、スキャン印も同時に消える
    let ctx = setup();
    seed_loan(&ctx, &["X1"]).await;

    scan_item(
        &ctx.deps,
        ScanItem {
            barcode: Barcode::new("X1").unwrap(),
            actor: "stocktaker".to_string(),
            scanned_at: Utc::now(),
        },
    )
    .await
    .unwrap();

    return_item(&ctx.deps, return_cmd("X1")).await.unwrap();

    let item = item_status(&ctx, "X1").await;
    assert_eq!(item.status, ItemStatus::Available);
    assert!(item.scan_timestamp.is_none());
}

// ============================================================================
// 一括返却（ベストエフォート）
// ============================================================================

#[tokio::test]
async fn test_return_bulk_reports_per_item_outcome() {
    let ctx = setup();
    seed_loan(&ctx, &["A", "C"]).await;
    // B は貸出中ではない
    ctx.item_store.add_item(available_item("B"));

    let summary = return_batch(
        &ctx.deps,
        ReturnBatch {
            barcodes: vec![
                Barcode::new("A").unwrap(),
                Barcode::new("B").unwrap(),
                Barcode::new("C").unwrap(),
            ],
            actor: "operator".to_string(),
            returned_at: Utc::now(),
        },
    )
    .await;

    assert_eq!(summary.returned_count, 2);
    assert_eq!(summary.not_found, vec!["B".to_string()]);
    assert!(summary.errors.is_empty());

    // Bの失敗と無関係に、AとCは独立してAvailableへ戻る
    for barcode in ["A", "C"] {
        let item = item_status(&ctx, barcode).await;
        assert_eq!(item.status, ItemStatus::Available);
    }

    // バッチで監査ログ1エントリ
    let batch_entries: Vec<_> = ctx
        .activity_log
        .entries()
        .into_iter()
        .filter(|e| e.action == ActivityAction::BatchReturned)
        .collect();
    assert_eq!(batch_entries.len(), 1);
    assert_eq!(batch_entries[0].detail, "2 returned, 1 not on loan, 0 failed");
}

#[tokio::test]
async fn test_return_bulk_completes_each_affected_loan() {
    // バッチが複数の貸出に触れる場合、完了判定は貸出ごとに走る
    let ctx = setup();
    ctx.item_store.add_item(available_item("A"));
    ctx.item_store.add_item(available_item("B"));
    let first = create_loan(&ctx.deps, loan_cmd(&["A"])).await.unwrap();
    let second = create_loan(&ctx.deps, loan_cmd(&["B"])).await.unwrap();

    let summary = return_batch(
        &ctx.deps,
        ReturnBatch {
            barcodes: vec![Barcode::new("A").unwrap(), Barcode::new("B").unwrap()],
            actor: "operator".to_string(),
            returned_at: Utc::now(),
        },
    )
    .await;

    assert_eq!(summary.returned_count, 2);
    assert_eq!(loan_status(&ctx, &first.invoice_no).await, LoanStatus::Completed);
    assert_eq!(loan_status(&ctx, &second.invoice_no).await, LoanStatus::Completed);
}

#[tokio::test]
async fn test_return_bulk_with_all_unknown_barcodes_still_succeeds() {
    let ctx = setup();

    let summary = return_batch(
        &ctx.deps,
        ReturnBatch {
            barcodes: vec![Barcode::new("NOPE-1").unwrap(), Barcode::new("NOPE-2").unwrap()],
            actor: "operator".to_string(),
            returned_at: Utc::now(),
        },
    )
    .await;

    assert_eq!(summary.returned_count, 0);
    assert_eq!(
        summary.not_found,
        vec!["NOPE-1".to_string(), "NOPE-2".to_string()]
    );
    assert!(summary.errors.is_empty());
}
