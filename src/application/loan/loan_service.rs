use crate::application::{ServiceDependencies, record_activity};
use crate::domain::commands::CreateLoan;
use crate::domain::{Loan, due_date_for, validate_loan_items};
use crate::ports::loan_store::LoanStoreError;
use crate::ports::{ActivityAction, NewActivityEntry, NewLoan};

use super::errors::{LoanApplicationError, Result};

/// 貸出を作成する（純粋な関数）
///
/// ビジネスルール：
/// - 明細が1件以上あり、バーコードの重複がないこと
/// - すべての備品がAvailableであること（1件でも満たさなければ全体が失敗）
///
/// # 原子性保証
///
/// 請求書番号の採番・Loanヘッダ・N件の明細・N件の備品ステータス更新は、
/// ストア側の1トランザクションとしてコミットされる。部分的な貸出は
/// 発生しない（all-or-nothing）。
///
/// # 引数
/// * `deps` - サービスの依存関係
/// * `cmd` - 貸出作成コマンド
///
/// # 戻り値
/// 作成された貸出（請求書番号・返却期限つき）。伝票印刷・署名表示は
/// 呼び出し側（UI層）の責務
pub async fn create_loan(deps: &ServiceDependencies, cmd: CreateLoan) -> Result<Loan> {
    // 1. 明細リストの事前条件チェック
    validate_loan_items(&cmd.items)?;

    // 2. 借用者をキーでupsert（貸出はこの後も氏名スナップショットを保持する）
    deps.borrower_store
        .upsert(cmd.borrower.clone())
        .await
        .map_err(LoanApplicationError::BorrowerStoreError)?;

    // 3. 返却期限の計算
    let due_date = due_date_for(cmd.loaned_at, cmd.loan_period_days);

    // 4. アトミックな予約（採番 + ヘッダ + 明細 + 備品フリップ）
    let item_count = cmd.items.len();
    let loan = deps
        .loan_store
        .create_loan(NewLoan {
            borrower_id: cmd.borrower.id,
            borrower_name: cmd.borrower.name,
            inputter: cmd.inputter,
            program: cmd.program,
            reason: cmd.reason,
            items: cmd.items,
            due_date,
            signature: cmd.signature,
            created_at: cmd.loaned_at,
        })
        .await
        .map_err(|err| match err {
            LoanStoreError::ItemUnavailable(barcode) => {
                LoanApplicationError::ItemUnavailable(barcode)
            }
            LoanStoreError::InvoiceConflict => LoanApplicationError::InvoiceAllocationConflict,
            other => LoanApplicationError::LoanStoreError(other),
        })?;

    // 5. 監査ログ（1操作につき1エントリ）
    record_activity(
        &deps.activity_log,
        NewActivityEntry {
            actor: loan.inputter.clone(),
            action: ActivityAction::LoanCreated,
            entity_type: "loan".to_string(),
            entity_id: loan.invoice_no.as_str().to_string(),
            detail: format!("{} item(s) loaned to {}", item_count, loan.borrower_name),
            created_at: cmd.loaned_at,
        },
    )
    .await;

    Ok(loan)
}
