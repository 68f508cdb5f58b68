// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! In-memory view of one user's finances, kept in step with the record store.
//!
//! Primary-entity writes (accounts, transactions, budgets, vehicles, fuel logs,
//! investments) either succeed or return one error. Secondary effects (balance
//! sync, category registration, fuel/investment updates derived from a
//! transaction) are best-effort and only logged when they fail.

use crate::budget::{self, BudgetStatus};
use crate::cache::LocalCache;
use crate::categories::{self, CategoryRegistry};
use crate::error::{StoreError, TrackerError, ValidationError};
use crate::import::effects::{self, AppliedEffect, SideEffect};
use crate::ledger::{AccountBook, LedgerMutation};
use crate::models::{Account, Budget, CustomCategory, FuelLog, Investment, Transaction, Vehicle};
use crate::store::RecordStore;
use chrono::NaiveDate;
use log::{info, warn};
use rust_decimal::Decimal;

/// A transaction that reached the store, plus its derived side effect.
#[derive(Debug, Clone)]
pub struct Committed {
    pub transaction: Transaction,
    pub effect: Option<AppliedEffect>,
}

pub struct Tracker<S: RecordStore> {
    store: S,
    cache: LocalCache,
    book: AccountBook,
    transactions: Vec<Transaction>,
    budgets: Vec<Budget>,
    vehicles: Vec<Vehicle>,
    fuel_logs: Vec<FuelLog>,
    investments: Vec<Investment>,
    categories: CategoryRegistry,
}

impl<S: RecordStore> Tracker<S> {
    /// Loads every collection. Any failed fetch fails the whole load; no partial
    /// state is returned.
    pub fn load(store: S, mut cache: LocalCache) -> Result<Self, StoreError> {
        let accounts = store.fetch_all::<Account>()?;
        let transactions = store.fetch_all::<Transaction>()?;
        let budgets = store.fetch_all::<Budget>()?;
        let vehicles = store.fetch_all::<Vehicle>()?;
        let fuel_logs = store.fetch_all::<FuelLog>()?;
        let investments = store.fetch_all::<Investment>()?;
        let custom = store.fetch_all::<CustomCategory>()?;

        if let Err(e) = cache.migrate_into(&store) {
            warn!("local category cache not migrated yet: {}", e);
        }
        let mut names: Vec<String> = custom.into_iter().map(|c| c.name).collect();
        if let Some(user) = store.user_id() {
            names.extend(cache.categories(user).iter().cloned());
        }

        info!(
            "loaded {} accounts, {} transactions, {} budgets",
            accounts.len(),
            transactions.len(),
            budgets.len()
        );
        Ok(Self {
            store,
            cache,
            book: AccountBook::new(accounts),
            transactions,
            budgets,
            vehicles,
            fuel_logs,
            investments,
            categories: CategoryRegistry::new(names),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    pub fn book(&self) -> &AccountBook {
        &self.book
    }

    pub fn accounts(&self) -> &[Account] {
        self.book.accounts()
    }

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.book.get(id)
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn budgets(&self) -> &[Budget] {
        &self.budgets
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn fuel_logs(&self) -> &[FuelLog] {
        &self.fuel_logs
    }

    pub fn investments(&self) -> &[Investment] {
        &self.investments
    }

    pub fn categories(&self) -> &CategoryRegistry {
        &self.categories
    }

    pub fn total_balance(&self) -> Decimal {
        self.book.total_balance()
    }

    pub fn budget_status(&self, today: NaiveDate) -> Vec<BudgetStatus> {
        budget::aggregate(&self.budgets, &self.transactions, today)
    }

    /// Registers a category if it is neither a default nor already known.
    /// Returns true for a newly seen name.
    pub fn ensure_category(&mut self, name: &str) -> bool {
        self.categories.ensure(&self.store, &mut self.cache, name)
    }

    // ---- accounts ----

    pub fn add_account(&mut self, mut account: Account) -> Result<Account, TrackerError> {
        if account.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name").into());
        }
        account.id = self.store.create(&account)?;
        info!("created account '{}' as {}", account.name, account.id);
        self.book.insert(account.clone());
        Ok(account)
    }

    /// Deletes an account and every fuel log paid from it.
    pub fn delete_account(&mut self, id: &str) -> Result<(), TrackerError> {
        self.store.delete::<Account>(id)?;
        self.book.remove(id);
        self.cascade_fuel_logs(|f| f.account_id.as_deref() == Some(id));
        Ok(())
    }

    fn cascade_fuel_logs(&mut self, owned: impl Fn(&FuelLog) -> bool) {
        let (orphans, kept): (Vec<FuelLog>, Vec<FuelLog>) = std::mem::take(&mut self.fuel_logs)
            .into_iter()
            .partition(|f| owned(f));
        self.fuel_logs = kept;
        for log in orphans {
            if let Err(e) = self.store.delete::<FuelLog>(&log.id) {
                warn!("fuel log {} not deleted from store: {}", log.id, e);
            }
        }
    }

    // ---- transactions ----

    fn validate(txn: &Transaction) -> Result<(), ValidationError> {
        if txn.account_id.trim().is_empty() {
            return Err(ValidationError::MissingField("accountId"));
        }
        if txn.amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount);
        }
        Ok(())
    }

    fn with_category(mut txn: Transaction) -> Transaction {
        txn.category = if txn.category.trim().is_empty() {
            categories::FALLBACK_CATEGORY.to_string()
        } else {
            categories::canonical(&txn.category)
        };
        txn
    }

    /// Single form submit: validate, persist, then adjust the balance.
    pub fn add_transaction(&mut self, txn: Transaction) -> Result<Committed, TrackerError> {
        Self::validate(&txn)?;
        let txn = Self::with_category(txn);
        self.ensure_category(&txn.category);
        Ok(self.commit_transaction(txn)?)
    }

    /// Persists an already-normalized transaction and runs its ledger mutation
    /// and side effect. Used by both the form path and bulk import.
    pub fn commit_transaction(&mut self, mut txn: Transaction) -> Result<Committed, StoreError> {
        txn.id = self.store.create(&txn)?;
        let changes = self.book.apply_local(LedgerMutation::Create(&txn));
        self.book.sync_balances(&self.store, &changes);
        let effect = effects::derive(&txn).map(|e| self.apply_side_effect(e, &txn));
        self.transactions.push(txn.clone());
        Ok(Committed {
            transaction: txn,
            effect,
        })
    }

    pub fn edit_transaction(&mut self, txn: Transaction) -> Result<(), TrackerError> {
        Self::validate(&txn)?;
        let txn = Self::with_category(txn);
        self.store.update(&txn)?;
        self.ensure_category(&txn.category);
        let idx = self.transactions.iter().position(|t| t.id == txn.id);
        let old = idx.map(|i| self.transactions[i].clone());
        let changes = self.book.apply_local(LedgerMutation::Edit {
            old: old.as_ref(),
            new: &txn,
        });
        self.book.sync_balances(&self.store, &changes);
        match idx {
            Some(i) => self.transactions[i] = txn,
            None => self.transactions.push(txn),
        }
        Ok(())
    }

    pub fn delete_transaction(&mut self, id: &str) -> Result<(), TrackerError> {
        self.store.delete::<Transaction>(id)?;
        match self.transactions.iter().position(|t| t.id == id) {
            Some(i) => {
                let txn = self.transactions.remove(i);
                let changes = self.book.apply_local(LedgerMutation::Delete(&txn));
                self.book.sync_balances(&self.store, &changes);
            }
            None => warn!("transaction {} not held locally; no balance reversal", id),
        }
        Ok(())
    }

    // ---- side effects ----

    fn apply_side_effect(&mut self, effect: SideEffect, txn: &Transaction) -> AppliedEffect {
        let outcome = match &effect {
            SideEffect::Fuel {
                vehicle_id,
                liters,
                odometer,
            } => self.record_fuel(vehicle_id, txn, *liters, *odometer),
            SideEffect::Investment {
                investment_id,
                delta,
            } => self.bump_investment(investment_id, *delta),
        };
        if let Err(e) = &outcome {
            warn!("side effect of transaction {} not applied: {}", txn.id, e);
        }
        AppliedEffect {
            effect,
            error: outcome.err().map(|e| e.to_string()),
        }
    }

    fn record_fuel(
        &mut self,
        vehicle_id: &str,
        txn: &Transaction,
        liters: Decimal,
        odometer: u32,
    ) -> Result<(), StoreError> {
        let mut log = FuelLog {
            id: String::new(),
            vehicle_id: vehicle_id.to_string(),
            account_id: Some(txn.account_id.clone()),
            date: txn.date,
            liters,
            cost: txn.amount,
            mileage: odometer,
        };
        log.id = self.store.create(&log)?;
        self.fuel_logs.push(log);
        if let Some(vehicle) = self.vehicles.iter_mut().find(|v| v.id == vehicle_id) {
            if odometer > vehicle.mileage {
                vehicle.mileage = odometer;
                if let Err(e) = self.store.update(&*vehicle) {
                    warn!("vehicle {} mileage not synced: {}", vehicle.id, e);
                }
            }
        }
        Ok(())
    }

    /// Cost-basis bump: the same delta goes to invested amount and current value.
    fn bump_investment(&mut self, investment_id: &str, delta: Decimal) -> Result<(), StoreError> {
        let investment = self
            .investments
            .iter_mut()
            .find(|i| i.id == investment_id)
            .ok_or_else(|| StoreError::NotFound {
                collection: "investments",
                id: investment_id.to_string(),
            })?;
        investment.invested_amount += delta;
        investment.current_value += delta;
        self.store.update(&*investment)
    }

    // ---- budgets ----

    /// Replaces the whole budget set: delete everything, then insert. A later
    /// entry for the same category wins.
    pub fn save_budgets(&mut self, budgets: Vec<Budget>) -> Result<(), TrackerError> {
        let mut unique: Vec<Budget> = Vec::with_capacity(budgets.len());
        for b in budgets {
            if b.category.trim().is_empty() {
                return Err(ValidationError::MissingField("category").into());
            }
            match unique
                .iter_mut()
                .find(|u| u.category.eq_ignore_ascii_case(&b.category))
            {
                Some(existing) => *existing = b,
                None => unique.push(b),
            }
        }
        self.store.delete_all::<Budget>()?;
        self.budgets.clear();
        for mut b in unique {
            b.id = self.store.create(&b)?;
            self.budgets.push(b);
        }
        Ok(())
    }

    // ---- vehicles & fuel ----

    pub fn add_vehicle(&mut self, mut vehicle: Vehicle) -> Result<Vehicle, TrackerError> {
        if vehicle.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name").into());
        }
        vehicle.id = self.store.create(&vehicle)?;
        self.vehicles.push(vehicle.clone());
        Ok(vehicle)
    }

    pub fn delete_vehicle(&mut self, id: &str) -> Result<(), TrackerError> {
        self.store.delete::<Vehicle>(id)?;
        self.vehicles.retain(|v| v.id != id);
        self.cascade_fuel_logs(|f| f.vehicle_id == id);
        Ok(())
    }

    pub fn add_fuel_log(&mut self, mut log: FuelLog) -> Result<FuelLog, TrackerError> {
        if log.vehicle_id.trim().is_empty() {
            return Err(ValidationError::MissingField("vehicleId").into());
        }
        log.id = self.store.create(&log)?;
        self.fuel_logs.push(log.clone());
        Ok(log)
    }

    // ---- investments ----

    pub fn add_investment(
        &mut self,
        mut investment: Investment,
    ) -> Result<Investment, TrackerError> {
        if investment.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name").into());
        }
        investment.id = self.store.create(&investment)?;
        self.investments.push(investment.clone());
        Ok(investment)
    }

    pub fn delete_investment(&mut self, id: &str) -> Result<(), TrackerError> {
        self.store.delete::<Investment>(id)?;
        self.investments.retain(|i| i.id != id);
        Ok(())
    }
}
