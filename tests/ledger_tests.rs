// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use fintrack::db::{Session, init_schema};
use fintrack::ledger::{AccountBook, LedgerMutation, effect};
use fintrack::models::{Account, AccountType, Transaction, TxnMetadata, TxnType};
use fintrack::store::{RecordStore, SqliteStore};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn account(id: &str, balance: &str) -> Account {
    let mut a = Account::new(&format!("Acct {}", id), "Bank", AccountType::Savings, d(balance));
    a.id = id.into();
    a
}

fn txn(id: &str, account_id: &str, kind: TxnType, amount: &str) -> Transaction {
    Transaction {
        id: id.into(),
        date: "2025-05-01".parse().unwrap(),
        amount: d(amount),
        kind,
        category: "Other".into(),
        description: String::new(),
        account_id: account_id.into(),
        source: None,
        notes: None,
        metadata: TxnMetadata::None,
    }
}

#[test]
fn effect_is_signed_by_direction() {
    assert_eq!(effect(&txn("t", "a", TxnType::Income, "5")), d("5"));
    assert_eq!(effect(&txn("t", "a", TxnType::Expense, "5")), d("-5"));
}

#[test]
fn create_then_delete_restores_balance() {
    let mut book = AccountBook::new(vec![account("a", "100")]);
    let t = txn("t1", "a", TxnType::Expense, "30");
    let changes = book.apply_local(LedgerMutation::Create(&t));
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].balance, d("70"));
    book.apply_local(LedgerMutation::Delete(&t));
    assert_eq!(book.get("a").unwrap().balance, d("100"));
}

#[test]
fn edit_moving_accounts_reverses_old_and_applies_new() {
    let mut book = AccountBook::new(vec![account("a", "100"), account("b", "50")]);
    let old = txn("t1", "a", TxnType::Expense, "20");
    book.apply_local(LedgerMutation::Create(&old));
    let new = txn("t1", "b", TxnType::Income, "10");
    let changes = book.apply_local(LedgerMutation::Edit {
        old: Some(&old),
        new: &new,
    });
    assert_eq!(changes.len(), 2);
    assert_eq!(book.get("a").unwrap().balance, d("100"));
    assert_eq!(book.get("b").unwrap().balance, d("60"));
}

#[test]
fn edit_without_old_copy_only_applies_new() {
    let mut book = AccountBook::new(vec![account("a", "100")]);
    let new = txn("t1", "a", TxnType::Expense, "10");
    let changes = book.apply_local(LedgerMutation::Edit { old: None, new: &new });
    assert_eq!(changes.len(), 1);
    assert_eq!(book.get("a").unwrap().balance, d("90"));
}

#[test]
fn unknown_account_changes_nothing() {
    let mut book = AccountBook::new(vec![account("a", "100")]);
    let t = txn("t1", "unknown", TxnType::Expense, "10");
    assert!(book.apply_local(LedgerMutation::Create(&t)).is_empty());
    assert_eq!(book.total_balance(), d("100"));
}

#[test]
fn find_by_name_ignores_case_and_padding() {
    let book = AccountBook::new(vec![account("a", "1")]);
    assert_eq!(book.find_by_name("  acct A ").map(|a| a.id.as_str()), Some("a"));
    assert!(book.find_by_name("acct b").is_none());
}

#[test]
fn persist_remote_writes_each_touched_account_once() {
    let conn = Connection::open_in_memory().unwrap();
    init_schema(&conn).unwrap();
    let store = SqliteStore::new(&conn, Some(Session::new("u1")));
    let mut a = account("", "100");
    a.id = store.create(&a).unwrap();
    let mut book = AccountBook::new(vec![a.clone()]);

    let t1 = txn("t1", &a.id, TxnType::Expense, "10");
    let t2 = txn("t2", &a.id, TxnType::Income, "4");
    let mut changes = book.apply_local(LedgerMutation::Create(&t1));
    changes.extend(book.apply_local(LedgerMutation::Create(&t2)));
    book.persist_remote(&store, &changes).unwrap();

    let stored: Vec<Account> = store.fetch_all().unwrap();
    assert_eq!(stored[0].balance, d("94"));
}

#[test]
fn sync_balances_swallows_store_failures() {
    let conn = Connection::open_in_memory().unwrap();
    init_schema(&conn).unwrap();
    let anon = SqliteStore::new(&conn, None);
    let mut book = AccountBook::new(vec![account("1", "100")]);
    let t = txn("t1", "1", TxnType::Expense, "10");
    let changes = book.apply_local(LedgerMutation::Create(&t));
    assert!(book.persist_remote(&anon, &changes).is_err());
    book.sync_balances(&anon, &changes);
    assert_eq!(book.get("1").unwrap().balance, d("90"));
}
