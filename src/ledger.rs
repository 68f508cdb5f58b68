// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Balance bookkeeping for transaction create/edit/delete.
//!
//! Two phases: [`AccountBook::apply_local`] updates the in-memory accounts and
//! cannot fail; [`AccountBook::persist_remote`] writes the touched accounts and
//! returns a result the caller may await or ignore. [`AccountBook::sync_balances`]
//! is the usual choice: it logs a failed write and moves on, so local and stored
//! balances may drift.

use crate::error::StoreError;
use crate::models::{Account, Transaction, TxnType};
use crate::store::RecordStore;
use log::{debug, warn};
use rust_decimal::Decimal;

/// Signed effect of a transaction on its account.
pub fn effect(txn: &Transaction) -> Decimal {
    match txn.kind {
        TxnType::Income => txn.amount,
        TxnType::Expense => -txn.amount,
    }
}

#[derive(Debug, Clone, Copy)]
pub enum LedgerMutation<'a> {
    Create(&'a Transaction),
    /// `old` is None when the previous version is not held locally; its
    /// reversal is then skipped and the balance drifts.
    Edit {
        old: Option<&'a Transaction>,
        new: &'a Transaction,
    },
    Delete(&'a Transaction),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BalanceChange {
    pub account_id: String,
    pub delta: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Default, Clone)]
pub struct AccountBook {
    accounts: Vec<Account>,
}

impl AccountBook {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self { accounts }
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn get(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn insert(&mut self, account: Account) {
        self.accounts.push(account);
    }

    pub fn remove(&mut self, id: &str) -> Option<Account> {
        let idx = self.accounts.iter().position(|a| a.id == id)?;
        Some(self.accounts.remove(idx))
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Account> {
        let name = name.trim();
        self.accounts
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }

    pub fn total_balance(&self) -> Decimal {
        self.accounts.iter().map(|a| a.balance).sum()
    }

    fn adjust(&mut self, account_id: &str, delta: Decimal) -> Option<BalanceChange> {
        let Some(account) = self.accounts.iter_mut().find(|a| a.id == account_id) else {
            warn!("no local account '{}'; balance change of {} skipped", account_id, delta);
            return None;
        };
        account.balance += delta;
        Some(BalanceChange {
            account_id: account.id.clone(),
            delta,
            balance: account.balance,
        })
    }

    /// Applies a mutation to the in-memory balances and reports every change.
    pub fn apply_local(&mut self, mutation: LedgerMutation<'_>) -> Vec<BalanceChange> {
        let mut changes = Vec::new();
        match mutation {
            LedgerMutation::Create(txn) => {
                changes.extend(self.adjust(&txn.account_id, effect(txn)));
            }
            LedgerMutation::Edit { old, new } => {
                match old {
                    Some(old) => changes.extend(self.adjust(&old.account_id, -effect(old))),
                    None => warn!(
                        "previous version of transaction '{}' not held locally; reversal skipped",
                        new.id
                    ),
                }
                changes.extend(self.adjust(&new.account_id, effect(new)));
            }
            LedgerMutation::Delete(txn) => {
                changes.extend(self.adjust(&txn.account_id, -effect(txn)));
            }
        }
        changes
    }

    /// Writes the current balance of every account touched by `changes`.
    /// Stops at the first failure.
    pub fn persist_remote<S: RecordStore>(
        &self,
        store: &S,
        changes: &[BalanceChange],
    ) -> Result<(), StoreError> {
        let mut written: Vec<&str> = Vec::new();
        for change in changes {
            if written.contains(&change.account_id.as_str()) {
                continue;
            }
            if let Some(account) = self.get(&change.account_id) {
                store.update(account)?;
                debug!("synced balance of {} to {}", account.id, account.balance);
            }
            written.push(&change.account_id);
        }
        Ok(())
    }

    /// Fire-and-forget variant of [`Self::persist_remote`]: failures are logged only.
    pub fn sync_balances<S: RecordStore>(&self, store: &S, changes: &[BalanceChange]) {
        if let Err(e) = self.persist_remote(store, changes) {
            warn!("balance sync failed, keeping local balances: {}", e);
        }
    }
}
