//! Payment processor integration and withdrawal flow
//!
//! The gateway is an opaque external system behind [`PaymentProcessor`];
//! its confirmation is the only trigger for a wallet credit. Withdrawals
//! debit up front, settle asynchronously, and refund exactly once on
//! failure. Cancelling a pending payment never touches the wallet.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::WalletConfig;
use crate::error::{Error, Result};
use crate::wallet::{BalanceOp, TransactionKind, TransactionStatus, WalletLedger};

/// Order handed to the gateway for collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOrder {
    pub id: String,
    pub user_id: String,
    pub amount: u64,
}

/// Gateway confirmation of a successful payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub payment_id: String,
    pub order_id: String,
}

/// Opaque payment gateway abstraction
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn create_order(&self, amount: u64, user_id: &str) -> Result<PaymentOrder>;
    async fn pay(&self, order: &PaymentOrder, method: &str) -> Result<PaymentReceipt>;
}

/// Gateway stub that always succeeds; tests flip `fail_payments` to
/// exercise the failure paths.
pub struct MockGateway {
    pub fail_payments: bool,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self {
            fail_payments: false,
        }
    }
}

#[async_trait]
impl PaymentProcessor for MockGateway {
    async fn create_order(&self, amount: u64, user_id: &str) -> Result<PaymentOrder> {
        Ok(PaymentOrder {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            amount,
        })
    }

    async fn pay(&self, order: &PaymentOrder, _method: &str) -> Result<PaymentReceipt> {
        if self.fail_payments {
            return Err(Error::PaymentFailed("gateway declined".to_string()));
        }
        Ok(PaymentReceipt {
            payment_id: Uuid::new_v4().to_string(),
            order_id: order.id.clone(),
        })
    }
}

/// Withdrawal lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WithdrawalStatus {
    Pending,
    Completed,
    Failed,
}

/// A withdrawal request awaiting settlement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: String,
    pub user_id: String,
    pub amount: u64,
    pub upi_id: String,
    pub status: WithdrawalStatus,
}

/// Deposit, cancellation and withdrawal operations over the wallet
pub struct PaymentService {
    processor: Arc<dyn PaymentProcessor>,
    wallet: Arc<WalletLedger>,
    config: WalletConfig,
    withdrawals: DashMap<String, Withdrawal>,
}

impl PaymentService {
    pub fn new(
        processor: Arc<dyn PaymentProcessor>,
        wallet: Arc<WalletLedger>,
        config: WalletConfig,
    ) -> Self {
        Self {
            processor,
            wallet,
            config,
            withdrawals: DashMap::new(),
        }
    }

    /// Collect a deposit through the gateway and credit the wallet on
    /// confirmation. Gateway failure records a failed transaction and
    /// leaves the balance untouched.
    pub async fn deposit(&self, user_id: &str, amount: u64, method: &str) -> Result<u64> {
        if amount < self.config.min_deposit || amount > self.config.max_deposit {
            return Err(Error::Validation(format!(
                "deposit amount {} outside bounds [{}, {}]",
                amount, self.config.min_deposit, self.config.max_deposit
            )));
        }

        let order = self.processor.create_order(amount, user_id).await?;
        match self.processor.pay(&order, method).await {
            Ok(receipt) => {
                self.wallet
                    .apply_op(
                        user_id,
                        amount,
                        BalanceOp::Add,
                        TransactionKind::Credit,
                        TransactionStatus::Completed,
                        Some(method.to_string()),
                        format!("deposit via {} (payment {})", method, receipt.payment_id),
                    )
                    .await?;
                info!(user_id, amount, "deposit credited");
                Ok(self.wallet.balance(user_id))
            }
            Err(err) => {
                warn!(user_id, amount, %err, "payment failed, no balance change");
                self.wallet
                    .record(
                        user_id,
                        TransactionKind::Credit,
                        amount,
                        Some(method.to_string()),
                        TransactionStatus::Failed,
                        "deposit failed at gateway",
                    )
                    .await;
                Err(err)
            }
        }
    }

    /// User-initiated cancellation of a pending payment: a failed
    /// transaction record and no wallet mutation.
    pub async fn cancel_payment(&self, order: &PaymentOrder) {
        self.wallet
            .record(
                &order.user_id,
                TransactionKind::Credit,
                order.amount,
                None,
                TransactionStatus::Failed,
                "payment cancelled by user",
            )
            .await;
        info!(user_id = %order.user_id, order_id = %order.id, "payment cancelled");
    }

    /// Debit the wallet and open a pending withdrawal. Rejected
    /// synchronously on bad UPI shape, out-of-bounds amount or
    /// insufficient balance.
    pub async fn request_withdrawal(
        &self,
        user_id: &str,
        amount: u64,
        upi_id: &str,
    ) -> Result<Withdrawal> {
        validate_upi(upi_id)?;
        if amount < self.config.min_withdrawal || amount > self.config.max_withdrawal {
            return Err(Error::Validation(format!(
                "withdrawal amount {} outside bounds [{}, {}]",
                amount, self.config.min_withdrawal, self.config.max_withdrawal
            )));
        }

        let tx = self
            .wallet
            .apply_op(
                user_id,
                amount,
                BalanceOp::Subtract,
                TransactionKind::Withdrawal,
                TransactionStatus::Pending,
                Some("upi".to_string()),
                format!("withdrawal to {}", upi_id),
            )
            .await?;

        let withdrawal = Withdrawal {
            id: tx.id,
            user_id: user_id.to_string(),
            amount,
            upi_id: upi_id.to_string(),
            status: WithdrawalStatus::Pending,
        };
        self.withdrawals
            .insert(withdrawal.id.clone(), withdrawal.clone());
        info!(user_id, amount, withdrawal_id = %withdrawal.id, "withdrawal requested");
        Ok(withdrawal)
    }

    /// Settle a pending withdrawal. On failure the debited amount is
    /// refunded; the pending-status gate in the ledger makes a repeated
    /// failure settlement a no-op error, so refunds are exactly-once.
    pub async fn settle_withdrawal(&self, withdrawal_id: &str, success: bool) -> Result<()> {
        let mut entry = self
            .withdrawals
            .get_mut(withdrawal_id)
            .ok_or_else(|| Error::WithdrawalNotFound(withdrawal_id.to_string()))?;

        if success {
            self.wallet
                .settle_transaction(withdrawal_id, TransactionStatus::Completed)
                .await?;
            entry.status = WithdrawalStatus::Completed;
            info!(withdrawal_id, "withdrawal completed");
        } else {
            self.wallet
                .settle_transaction(withdrawal_id, TransactionStatus::Failed)
                .await?;
            entry.status = WithdrawalStatus::Failed;
            let user_id = entry.user_id.clone();
            let amount = entry.amount;
            drop(entry);
            self.wallet
                .apply_op(
                    &user_id,
                    amount,
                    BalanceOp::Add,
                    TransactionKind::Refund,
                    TransactionStatus::Completed,
                    None,
                    format!("refund for failed withdrawal {}", withdrawal_id),
                )
                .await?;
            warn!(withdrawal_id, amount, "withdrawal failed, amount refunded");
        }
        Ok(())
    }
}

/// Minimal UPI id shape check: `handle@provider`, both parts non-empty
fn validate_upi(upi_id: &str) -> Result<()> {
    let mut parts = upi_id.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(handle), Some(provider), None)
            if !handle.is_empty()
                && !provider.is_empty()
                && handle.chars().all(|c| c.is_ascii_alphanumeric() || c == '.')
                && provider.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            Ok(())
        }
        _ => Err(Error::Validation(format!("invalid UPI id: {}", upi_id))),
    }
}
