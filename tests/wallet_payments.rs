//! Money movement across the wallet and payment service: deposits,
//! withdrawals, refund-on-failure, and ledger conservation under
//! concurrent spending.

use std::sync::Arc;

use ludoroll::config::WalletConfig;
use ludoroll::payments::{MockGateway, PaymentService};
use ludoroll::wallet::{TransactionKind, TransactionStatus};
use ludoroll::{BalanceOp, Error, WalletLedger};

fn service(fail_payments: bool) -> (PaymentService, Arc<WalletLedger>) {
    let wallet = Arc::new(WalletLedger::new());
    let service = PaymentService::new(
        Arc::new(MockGateway { fail_payments }),
        wallet.clone(),
        WalletConfig::default(),
    );
    (service, wallet)
}

#[tokio::test]
async fn test_deposit_credits_wallet() {
    let (service, wallet) = service(false);
    wallet.create_account("dara", 0).unwrap();

    let balance = service.deposit("dara", 500, "upi").await.unwrap();
    assert_eq!(balance, 500);
    assert_eq!(wallet.balance("dara"), 500);

    let txs = wallet.transactions_for("dara").await;
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].kind, TransactionKind::Credit);
    assert_eq!(txs[0].status, TransactionStatus::Completed);
}

#[tokio::test]
async fn test_deposit_bounds_enforced() {
    let (service, wallet) = service(false);
    wallet.create_account("dara", 0).unwrap();

    assert!(service.deposit("dara", 5, "upi").await.is_err());
    assert!(service.deposit("dara", 1_000_000, "upi").await.is_err());
    assert_eq!(wallet.balance("dara"), 0);
    assert!(wallet.transactions_for("dara").await.is_empty());
}

#[tokio::test]
async fn test_gateway_failure_records_failed_transaction() {
    let (service, wallet) = service(true);
    wallet.create_account("dara", 100).unwrap();

    assert!(matches!(
        service.deposit("dara", 500, "upi").await,
        Err(Error::PaymentFailed(_))
    ));
    assert_eq!(wallet.balance("dara"), 100);

    let txs = wallet.transactions_for("dara").await;
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].status, TransactionStatus::Failed);
}

#[tokio::test]
async fn test_withdrawal_roundtrip() {
    let (service, wallet) = service(false);
    wallet.create_account("dara", 1000).unwrap();

    let withdrawal = service
        .request_withdrawal("dara", 400, "dara@bank")
        .await
        .unwrap();
    // Debited up front, pending settlement
    assert_eq!(wallet.balance("dara"), 600);

    service.settle_withdrawal(&withdrawal.id, true).await.unwrap();
    assert_eq!(wallet.balance("dara"), 600);

    let txs = wallet.transactions_for("dara").await;
    assert!(txs
        .iter()
        .any(|t| t.kind == TransactionKind::Withdrawal && t.status == TransactionStatus::Completed));
}

#[tokio::test]
async fn test_failed_withdrawal_refunds_exactly_once() {
    let (service, wallet) = service(false);
    wallet.create_account("dara", 1000).unwrap();

    let withdrawal = service
        .request_withdrawal("dara", 400, "dara@bank")
        .await
        .unwrap();
    assert_eq!(wallet.balance("dara"), 600);

    service
        .settle_withdrawal(&withdrawal.id, false)
        .await
        .unwrap();
    assert_eq!(wallet.balance("dara"), 1000);

    // Settling again must not refund twice
    assert!(service.settle_withdrawal(&withdrawal.id, false).await.is_err());
    assert_eq!(wallet.balance("dara"), 1000);
}

#[tokio::test]
async fn test_invalid_upi_rejected_without_debit() {
    let (service, wallet) = service(false);
    wallet.create_account("dara", 1000).unwrap();

    for bad in ["dara", "@bank", "dara@", "dara bank@upi", ""] {
        assert!(
            service.request_withdrawal("dara", 400, bad).await.is_err(),
            "{:?} should be rejected",
            bad
        );
    }
    assert_eq!(wallet.balance("dara"), 1000);
}

#[tokio::test]
async fn test_overdraft_rejected_with_failed_record() {
    let (service, wallet) = service(false);
    wallet.create_account("dara", 150).unwrap();

    assert!(matches!(
        service.request_withdrawal("dara", 300, "dara@bank").await,
        Err(Error::InsufficientBalance { .. })
    ));
    assert_eq!(wallet.balance("dara"), 150);

    let txs = wallet.transactions_for("dara").await;
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].status, TransactionStatus::Failed);
}

#[tokio::test]
async fn test_ledger_conserves_money_under_concurrent_spending() {
    let wallet = Arc::new(WalletLedger::new());
    wallet.create_account("dara", 1000).unwrap();

    // 20 tasks each try to spend 100; exactly 10 can succeed
    let mut handles = Vec::new();
    for i in 0..20 {
        let wallet = wallet.clone();
        handles.push(tokio::spawn(async move {
            wallet
                .update_balance("dara", 100, BalanceOp::Subtract, format!("spend {}", i))
                .await
                .is_ok()
        }));
    }
    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap() {
            successes += 1;
        }
    }

    assert_eq!(successes, 10);
    assert_eq!(wallet.balance("dara"), 0);

    let completed_debits = wallet
        .transactions_for("dara")
        .await
        .iter()
        .filter(|t| t.kind == TransactionKind::Debit && t.status == TransactionStatus::Completed)
        .count();
    assert_eq!(completed_debits, 10);
}
