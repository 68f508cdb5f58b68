// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use fintrack::budget::aggregate;
use fintrack::models::{Budget, BudgetPeriod, Transaction, TxnMetadata, TxnType};
use rust_decimal::Decimal;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn budget(category: &str, limit: &str) -> Budget {
    Budget {
        id: String::new(),
        category: category.into(),
        limit: d(limit),
        period: BudgetPeriod::Monthly,
    }
}

fn spend(date: &str, category: &str, kind: TxnType, amount: &str) -> Transaction {
    Transaction {
        id: String::new(),
        date: date.parse().unwrap(),
        amount: d(amount),
        kind,
        category: category.into(),
        description: String::new(),
        account_id: "1".into(),
        source: None,
        notes: None,
        metadata: TxnMetadata::None,
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 8, 20).unwrap()
}

#[test]
fn only_current_month_expenses_in_category_count() {
    let budgets = vec![budget("Food", "5000")];
    let txns = vec![
        spend("2025-08-01", "Food", TxnType::Expense, "1200"),
        spend("2025-08-19", "food", TxnType::Expense, "300"),
        spend("2025-07-31", "Food", TxnType::Expense, "999"),
        spend("2024-08-10", "Food", TxnType::Expense, "999"),
        spend("2025-08-05", "Food", TxnType::Income, "999"),
        spend("2025-08-05", "Transport", TxnType::Expense, "999"),
    ];
    let status = aggregate(&budgets, &txns, today());
    assert_eq!(status.len(), 1);
    assert_eq!(status[0].spent, d("1500"));
    assert_eq!(status[0].remaining, d("3500"));
    assert!(!status[0].is_over());
}

#[test]
fn overspending_goes_negative() {
    let budgets = vec![budget("Shopping", "100")];
    let txns = vec![spend("2025-08-02", "Shopping", TxnType::Expense, "150.50")];
    let status = aggregate(&budgets, &txns, today());
    assert_eq!(status[0].remaining, d("-50.50"));
    assert!(status[0].is_over());
}

#[test]
fn budget_without_spend_reports_full_limit() {
    let status = aggregate(&[budget("Rent", "20000")], &[], today());
    assert_eq!(status[0].spent, Decimal::ZERO);
    assert_eq!(status[0].remaining, d("20000"));
    assert_eq!(status[0].period, BudgetPeriod::Monthly);
}
