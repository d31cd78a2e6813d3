//! Wallet ledger operations
//!
//! Every balance mutation is an atomic add or subtract against a
//! per-user account, always paired with an append-only [`Transaction`]
//! record. Balances are unsigned and debits are checked before they
//! apply, so a balance can never go negative; per-account mutations are
//! serialized through the account map's sharded locks so concurrent
//! debits (two simultaneous tournament joins) cannot race the check.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Direction of a balance mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceOp {
    Add,
    Subtract,
}

/// Ledger transaction types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    Credit,
    Debit,
    Withdrawal,
    Refund,
}

/// Transaction lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

/// Append-only transaction record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub kind: TransactionKind,
    pub amount: u64,
    pub method: Option<String>,
    pub status: TransactionStatus,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

/// Account information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub user_id: String,
    pub balance: u64,
    pub transaction_count: u64,
}

/// Wallet ledger managing all user balances
pub struct WalletLedger {
    accounts: DashMap<String, Account>,
    transactions: RwLock<Vec<Transaction>>,
}

impl Default for WalletLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl WalletLedger {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            transactions: RwLock::new(Vec::new()),
        }
    }

    /// Create a new account with a starting balance
    pub fn create_account(&self, user_id: impl Into<String>, opening_balance: u64) -> Result<()> {
        let user_id = user_id.into();
        if self.accounts.contains_key(&user_id) {
            return Err(Error::InvalidState(format!(
                "account already exists: {}",
                user_id
            )));
        }
        self.accounts.insert(
            user_id.clone(),
            Account {
                user_id: user_id.clone(),
                balance: opening_balance,
                transaction_count: 0,
            },
        );
        info!(user_id = %user_id, opening_balance, "created wallet account");
        Ok(())
    }

    /// Get a user's balance; unknown users have zero
    pub fn balance(&self, user_id: &str) -> u64 {
        self.accounts.get(user_id).map(|a| a.balance).unwrap_or(0)
    }

    /// Apply a balance mutation and record the paired transaction.
    ///
    /// A subtract larger than the available balance is rejected with
    /// [`Error::InsufficientBalance`]; the rejection itself is recorded
    /// as a `Failed` transaction and no balance change occurs.
    pub async fn update_balance(
        &self,
        user_id: &str,
        amount: u64,
        op: BalanceOp,
        memo: impl Into<String>,
    ) -> Result<Transaction> {
        let kind = match op {
            BalanceOp::Add => TransactionKind::Credit,
            BalanceOp::Subtract => TransactionKind::Debit,
        };
        self.apply_op(user_id, amount, op, kind, TransactionStatus::Completed, None, memo)
            .await
    }

    /// Apply a mutation with an explicit transaction kind and status.
    /// Used by the payments flow for withdrawals and refunds.
    pub async fn apply_op(
        &self,
        user_id: &str,
        amount: u64,
        op: BalanceOp,
        kind: TransactionKind,
        status: TransactionStatus,
        method: Option<String>,
        memo: impl Into<String>,
    ) -> Result<Transaction> {
        let memo = memo.into();

        // The entry guard serializes the read-modify-write per account
        let result = {
            let mut entry = self
                .accounts
                .entry(user_id.to_string())
                .or_insert_with(|| Account {
                    user_id: user_id.to_string(),
                    balance: 0,
                    transaction_count: 0,
                });
            match op {
                BalanceOp::Add => {
                    entry.balance = entry.balance.saturating_add(amount);
                    entry.transaction_count += 1;
                    Ok(entry.balance)
                }
                BalanceOp::Subtract => {
                    if entry.balance < amount {
                        Err(Error::insufficient_balance_for(amount, entry.balance))
                    } else {
                        entry.balance -= amount;
                        entry.transaction_count += 1;
                        Ok(entry.balance)
                    }
                }
            }
        };

        match result {
            Ok(new_balance) => {
                let tx = self
                    .record(user_id, kind, amount, method, status, memo.clone())
                    .await;
                debug!(user_id, amount, new_balance, ?kind, "balance updated");
                Ok(tx)
            }
            Err(err) => {
                // Record the rejected attempt; the balance is untouched
                self.record(
                    user_id,
                    kind,
                    amount,
                    method,
                    TransactionStatus::Failed,
                    memo,
                )
                .await;
                Err(err)
            }
        }
    }

    /// Append a transaction record without touching any balance
    pub async fn record(
        &self,
        user_id: &str,
        kind: TransactionKind,
        amount: u64,
        method: Option<String>,
        status: TransactionStatus,
        description: impl Into<String>,
    ) -> Transaction {
        let tx = Transaction {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            kind,
            amount,
            method,
            status,
            description: description.into(),
            timestamp: Utc::now(),
        };
        self.transactions.write().await.push(tx.clone());
        tx
    }

    /// Flip a pending transaction's status. Returns the updated record;
    /// a second flip of the same transaction is a no-op error so failure
    /// refunds stay exactly-once.
    pub async fn settle_transaction(
        &self,
        tx_id: &str,
        status: TransactionStatus,
    ) -> Result<Transaction> {
        let mut transactions = self.transactions.write().await;
        let tx = transactions
            .iter_mut()
            .find(|t| t.id == tx_id)
            .ok_or_else(|| Error::WithdrawalNotFound(tx_id.to_string()))?;
        if tx.status != TransactionStatus::Pending {
            return Err(Error::InvalidState(format!(
                "transaction {} already settled",
                tx_id
            )));
        }
        tx.status = status;
        Ok(tx.clone())
    }

    /// All transactions for a user, oldest first
    pub async fn transactions_for(&self, user_id: &str) -> Vec<Transaction> {
        self.transactions
            .read()
            .await
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Ledger-wide statistics
    pub async fn stats(&self) -> LedgerStats {
        LedgerStats {
            total_accounts: self.accounts.len(),
            total_transactions: self.transactions.read().await.len(),
            total_balance: self.accounts.iter().map(|a| a.balance).sum(),
        }
    }
}

/// Ledger statistics
#[derive(Debug, Clone)]
pub struct LedgerStats {
    pub total_accounts: usize,
    pub total_transactions: usize,
    pub total_balance: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_credit_and_debit() {
        let ledger = WalletLedger::new();
        ledger.create_account("alice", 100).unwrap();

        ledger
            .update_balance("alice", 50, BalanceOp::Add, "deposit")
            .await
            .unwrap();
        assert_eq!(ledger.balance("alice"), 150);

        ledger
            .update_balance("alice", 30, BalanceOp::Subtract, "entry fee")
            .await
            .unwrap();
        assert_eq!(ledger.balance("alice"), 120);
    }

    #[tokio::test]
    async fn test_overdraft_rejected_with_failed_record() {
        let ledger = WalletLedger::new();
        ledger.create_account("bob", 100).unwrap();

        let err = ledger
            .update_balance("bob", 150, BalanceOp::Subtract, "withdrawal")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientBalance { required: 150, available: 100 }));
        assert_eq!(ledger.balance("bob"), 100);

        let txs = ledger.transactions_for("bob").await;
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].status, TransactionStatus::Failed);
    }

    #[tokio::test]
    async fn test_every_mutation_has_a_record() {
        let ledger = WalletLedger::new();
        ledger
            .update_balance("carol", 200, BalanceOp::Add, "signup bonus")
            .await
            .unwrap();
        ledger
            .update_balance("carol", 80, BalanceOp::Subtract, "mines bet")
            .await
            .unwrap();

        let txs = ledger.transactions_for("carol").await;
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].kind, TransactionKind::Credit);
        assert_eq!(txs[1].kind, TransactionKind::Debit);
    }

    #[tokio::test]
    async fn test_settle_is_exactly_once() {
        let ledger = WalletLedger::new();
        let tx = ledger
            .record(
                "dave",
                TransactionKind::Withdrawal,
                500,
                Some("upi".to_string()),
                TransactionStatus::Pending,
                "withdrawal request",
            )
            .await;

        ledger
            .settle_transaction(&tx.id, TransactionStatus::Failed)
            .await
            .unwrap();
        // Second settlement attempt must not succeed
        assert!(ledger
            .settle_transaction(&tx.id, TransactionStatus::Failed)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_concurrent_debits_preserve_invariant() {
        use std::sync::Arc;

        let ledger = Arc::new(WalletLedger::new());
        ledger.create_account("eve", 100).unwrap();

        let mut handles = Vec::new();
        for _ in 0..10 {
            let ledger = Arc::clone(&ledger);
            handles.push(tokio::spawn(async move {
                ledger
                    .update_balance("eve", 30, BalanceOp::Subtract, "concurrent join")
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
        // 100 / 30: at most 3 debits can land
        assert_eq!(successes, 3);
        assert_eq!(ledger.balance("eve"), 10);
    }
}
