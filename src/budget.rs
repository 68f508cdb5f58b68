// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Budget, BudgetPeriod, Transaction, TxnType};
use chrono::{Datelike, Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    pub category: String,
    pub limit: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
    pub period: BudgetPeriod,
}

impl BudgetStatus {
    pub fn is_over(&self) -> bool {
        self.spent > self.limit
    }
}

fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Spend-to-date per budget for the calendar month containing `today`.
/// Derived on every call; nothing is stored.
pub fn aggregate(budgets: &[Budget], txns: &[Transaction], today: NaiveDate) -> Vec<BudgetStatus> {
    budgets
        .iter()
        .map(|b| {
            let spent: Decimal = txns
                .iter()
                .filter(|t| t.kind == TxnType::Expense)
                .filter(|t| t.category.eq_ignore_ascii_case(&b.category))
                .filter(|t| same_month(t.date, today))
                .map(|t| t.amount)
                .sum();
            BudgetStatus {
                category: b.category.clone(),
                limit: b.limit,
                spent,
                remaining: b.limit - spent,
                period: b.period,
            }
        })
        .collect()
}

/// [`aggregate`] against the local clock.
pub fn aggregate_current(budgets: &[Budget], txns: &[Transaction]) -> Vec<BudgetStatus> {
    aggregate(budgets, txns, Local::now().date_naive())
}
