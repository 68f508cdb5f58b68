// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use fintrack::cache::LocalCache;
use fintrack::db::{Session, init_schema};
use fintrack::error::StoreError;
use fintrack::import::csv_map::{ColumnMapping, rows_from_csv};
use fintrack::import::normalize::{
    canonical_date, classify_direction, parse_amount, parse_signed_amount,
};
use fintrack::import::statement::{PRIMARY_PLACEHOLDER, linked_placeholder, rows_from_extraction};
use fintrack::import::{
    AccountRef, CandidateRow, ImportOrigin, ImportRequest, UNKNOWN_ACCOUNT, run_import,
};
use fintrack::models::{
    Account, AccountType, FuelMetadata, Investment, InvestmentMetadata, InvestmentType,
    Transaction, TxnMetadata, TxnSource, TxnType, Vehicle,
};
use fintrack::oracle::{AccountInfo, ExtractedTransaction, Extraction, LinkedAccount};
use fintrack::store::{Collection, Entity, RecordStore, SqliteStore};
use fintrack::tracker::Tracker;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::cell::Cell;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    init_schema(&conn).unwrap();
    conn
}

fn tracker(conn: &Connection) -> Tracker<SqliteStore<'_>> {
    let store = SqliteStore::new(conn, Some(Session::new("u1")));
    Tracker::load(store, LocalCache::in_memory()).unwrap()
}

fn row(date: &str, desc: &str, amount: &str, direction: &str, account: AccountRef) -> CandidateRow {
    CandidateRow {
        date: date.into(),
        description: desc.into(),
        amount: amount.into(),
        direction: Some(direction.into()).filter(|s: &String| !s.is_empty()),
        account,
        ..CandidateRow::default()
    }
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
        .unwrap()
}

/// Fails the n-th transaction write; everything else passes through.
struct FlakyStore<'c> {
    inner: SqliteStore<'c>,
    fail_on: usize,
    seen: Cell<usize>,
}

impl RecordStore for FlakyStore<'_> {
    fn user_id(&self) -> Option<&str> {
        self.inner.user_id()
    }
    fn fetch_all<E: Entity>(&self) -> Result<Vec<E>, StoreError> {
        self.inner.fetch_all()
    }
    fn create<E: Entity>(&self, entity: &E) -> Result<String, StoreError> {
        if E::COLLECTION == Collection::Transactions {
            let n = self.seen.get() + 1;
            self.seen.set(n);
            if n == self.fail_on {
                return Err(StoreError::Backend("connection reset".into()));
            }
        }
        self.inner.create(entity)
    }
    fn update<E: Entity>(&self, entity: &E) -> Result<(), StoreError> {
        self.inner.update(entity)
    }
    fn delete<E: Entity>(&self, id: &str) -> Result<(), StoreError> {
        self.inner.delete::<E>(id)
    }
    fn delete_all<E: Entity>(&self) -> Result<(), StoreError> {
        self.inner.delete_all::<E>()
    }
}

// ---- normalization ----

#[test]
fn amounts_lose_currency_marks_and_sign() {
    assert_eq!(parse_amount("₹1,234.50"), Some(d("1234.50")));
    assert_eq!(parse_amount("Rs. 99"), Some(d("99")));
    assert_eq!(parse_amount("INR 5,000"), Some(d("5000")));
    assert_eq!(parse_amount("-42.10"), Some(d("42.10")));
    assert_eq!(parse_amount("n/a"), None);
    assert_eq!(parse_amount("  "), None);
}

#[test]
fn balances_keep_their_sign() {
    assert_eq!(parse_signed_amount("-5,000.00"), Some(d("-5000.00")));
    assert_eq!(parse_signed_amount("-Rs. 250"), Some(d("-250")));
    assert_eq!(parse_signed_amount("₹1,20,000"), Some(d("120000")));
    assert_eq!(parse_signed_amount("-"), None);
}

#[test]
fn dates_are_read_day_first() {
    assert_eq!(canonical_date("2025-01-31").as_deref(), Some("2025-01-31"));
    assert_eq!(canonical_date("03/04/2025").as_deref(), Some("2025-04-03"));
    assert_eq!(canonical_date("03-04-2025").as_deref(), Some("2025-04-03"));
    assert_eq!(canonical_date("2025-04-03T10:00:00Z").as_deref(), Some("2025-04-03"));
    assert_eq!(canonical_date("April 3rd"), None);
}

#[test]
fn direction_prefers_type_field_over_description() {
    assert_eq!(classify_direction(Some("Deposit"), "ATM"), TxnType::Income);
    assert_eq!(classify_direction(Some("Withdrawal"), "Salary"), TxnType::Expense);
    assert_eq!(classify_direction(Some("  "), "SALARY MAY"), TxnType::Income);
    assert_eq!(classify_direction(None, "Refund credit"), TxnType::Income);
    assert_eq!(classify_direction(None, "Swiggy order"), TxnType::Expense);
}

// ---- pipeline ----

#[test]
fn bad_rows_are_dropped_and_the_rest_commit() {
    let conn = setup();
    let mut t = tracker(&conn);
    let a = t
        .add_account(Account::new("Main", "HDFC", AccountType::Savings, d("1000")))
        .unwrap();
    let sel = || AccountRef::Selected(a.id.clone());
    let rows = vec![
        row("2025-05-01", "Coffee", "150", "", sel()),
        row("2025-05-02", "Salary credit", "5,000", "", sel()),
        row("someday", "Bad date", "10", "", sel()),
        row("2025-05-03", "Zero", "0.00", "", sel()),
        row("2025-05-03", "Garbage", "abc", "", sel()),
    ];
    let report = run_import(&mut t, ImportRequest::new(ImportOrigin::Manual, TxnSource::Csv, rows));

    assert_eq!(report.committed.len(), 2);
    assert_eq!(
        report.dropped.iter().map(|s| s.index).collect::<Vec<_>>(),
        vec![2, 3, 4]
    );
    assert_eq!(report.committed[1].kind, TxnType::Income);
    assert_eq!(report.committed[0].source, Some(TxnSource::Csv));
    assert_eq!(report.committed[0].category, "Other");
    assert_eq!(t.account(&a.id).unwrap().balance, d("5850"));
}

#[test]
fn store_failure_mid_batch_keeps_earlier_and_later_rows() {
    let conn = setup();
    let store = FlakyStore {
        inner: SqliteStore::new(&conn, Some(Session::new("u1"))),
        fail_on: 3,
        seen: Cell::new(0),
    };
    let mut t = Tracker::load(store, LocalCache::in_memory()).unwrap();
    let a = t
        .add_account(Account::new("Main", "", AccountType::Savings, d("0")))
        .unwrap();
    let rows = (1..=5)
        .map(|i| {
            row(
                &format!("2025-05-0{}", i),
                &format!("Row {}", i),
                "10",
                "deposit",
                AccountRef::Selected(a.id.clone()),
            )
        })
        .collect();
    let report = run_import(&mut t, ImportRequest::new(ImportOrigin::Manual, TxnSource::Csv, rows));

    assert_eq!(report.committed.len(), 4);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 2);
    assert_eq!(count(&conn, "transactions"), 4);
    assert_eq!(t.account(&a.id).unwrap().balance, d("40"));
}

#[test]
fn manual_rows_without_account_are_rejected() {
    let conn = setup();
    let mut t = tracker(&conn);
    let rows = vec![
        row("2025-05-01", "Coffee", "150", "", AccountRef::Named("Nope".into())),
        row("2025-05-01", "Tea", "20", "", AccountRef::None),
    ];
    let report = run_import(&mut t, ImportRequest::new(ImportOrigin::Manual, TxnSource::Csv, rows));
    assert!(report.committed.is_empty());
    assert_eq!(report.rejected.len(), 2);
    assert_eq!(count(&conn, "transactions"), 0);
}

#[test]
fn statement_rows_without_account_go_to_the_unknown_bucket() {
    let conn = setup();
    let mut t = tracker(&conn);
    let rows = vec![row("2025-05-01", "Coffee", "150", "", AccountRef::None)];
    let report = run_import(&mut t, ImportRequest::new(ImportOrigin::Oracle, TxnSource::Pdf, rows));
    assert_eq!(report.committed.len(), 1);
    assert_eq!(report.committed[0].account_id, UNKNOWN_ACCOUNT);
    assert_eq!(report.unresolved, vec![0]);
}

#[test]
fn named_rows_match_account_or_unique_bank() {
    let conn = setup();
    let mut t = tracker(&conn);
    let main = t
        .add_account(Account::new("Main", "HDFC", AccountType::Savings, d("0")))
        .unwrap();
    let card = t
        .add_account(Account::new("Card", "ICICI", AccountType::CreditCard, d("0")))
        .unwrap();
    t.add_account(Account::new("Other ICICI", "ICICI", AccountType::Savings, d("0")))
        .unwrap();
    let rows = vec![
        row("2025-05-01", "a", "1", "", AccountRef::Named("main".into())),
        row("2025-05-01", "b", "1", "", AccountRef::Named("hdfc".into())),
        row("2025-05-01", "c", "1", "", AccountRef::Named("Card".into())),
        row("2025-05-01", "d", "1", "", AccountRef::Named("icici".into())),
    ];
    let report = run_import(&mut t, ImportRequest::new(ImportOrigin::Manual, TxnSource::Csv, rows));
    let ids: Vec<&str> = report.committed.iter().map(|c| c.account_id.as_str()).collect();
    assert_eq!(ids, vec![main.id.as_str(), main.id.as_str(), card.id.as_str()]);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].index, 3);
}

#[test]
fn default_account_catches_unresolved_rows() {
    let conn = setup();
    let mut t = tracker(&conn);
    let a = t
        .add_account(Account::new("Main", "", AccountType::Savings, d("0")))
        .unwrap();
    let rows = vec![row("2025-05-01", "x", "5", "", AccountRef::Named("missing".into()))];
    let mut req = ImportRequest::new(ImportOrigin::Oracle, TxnSource::Gmail, rows);
    req.default_account = Some(a.id.clone());
    let report = run_import(&mut t, req);
    assert_eq!(report.committed[0].account_id, a.id);
    assert!(report.unresolved.is_empty());
}

#[test]
fn importing_twice_books_twice() {
    let conn = setup();
    let mut t = tracker(&conn);
    let a = t
        .add_account(Account::new("Main", "", AccountType::Savings, d("100")))
        .unwrap();
    let rows = vec![row("2025-05-01", "Coffee", "10", "", AccountRef::Selected(a.id.clone()))];
    for _ in 0..2 {
        let req = ImportRequest::new(ImportOrigin::Manual, TxnSource::Csv, rows.clone());
        assert_eq!(run_import(&mut t, req).committed.len(), 1);
    }
    assert_eq!(count(&conn, "transactions"), 2);
    assert_eq!(t.account(&a.id).unwrap().balance, d("80"));
}

#[test]
fn overrides_win_and_new_categories_register_once() {
    let conn = setup();
    let mut t = tracker(&conn);
    let a = t
        .add_account(Account::new("Main", "", AccountType::Savings, d("0")))
        .unwrap();
    let sel = AccountRef::Selected(a.id.clone());
    let mut r1 = row("2025-05-01", "Vet", "10", "", sel.clone());
    r1.category = Some("Pets".into());
    let mut r2 = row("2025-05-02", "Vet again", "10", "", sel.clone());
    r2.category = Some("pets".into());
    let mut r3 = row("2025-05-03", "Groceries run", "10", "", sel);
    r3.category = Some("Shopping".into());
    r3.category_override = Some("groceries".into());
    let report = run_import(
        &mut t,
        ImportRequest::new(ImportOrigin::Manual, TxnSource::Csv, vec![r1, r2, r3]),
    );
    assert_eq!(report.new_categories, vec!["Pets".to_string()]);
    assert_eq!(report.committed[2].category, "Groceries");
    assert_eq!(count(&conn, "custom_categories"), 1);
}

#[test]
fn side_effects_follow_committed_rows() {
    let conn = setup();
    let mut t = tracker(&conn);
    let a = t
        .add_account(Account::new("Main", "", AccountType::Savings, d("5000")))
        .unwrap();
    let car = t
        .add_vehicle(Vehicle {
            id: String::new(),
            name: "Car".into(),
            make: String::new(),
            model: String::new(),
            year: None,
            license_plate: String::new(),
            kind: "car".into(),
            mileage: 100,
        })
        .unwrap();
    let gold = t
        .add_investment(Investment {
            id: String::new(),
            name: "Gold".into(),
            kind: InvestmentType::Gold,
            invested_amount: d("0"),
            current_value: d("0"),
            quantity: None,
            date: "2025-01-01".parse().unwrap(),
        })
        .unwrap();
    let sel = AccountRef::Selected(a.id.clone());
    let mut fuel = row("2025-05-01", "HP petrol", "800", "", sel.clone());
    fuel.category = Some("Fuel".into());
    fuel.metadata = TxnMetadata::Fuel(FuelMetadata {
        vehicle_id: car.id.clone(),
        liters: d("8"),
        odometer: 400,
    });
    let mut sip = row("2025-05-02", "Gold SIP", "1000", "", sel);
    sip.category = Some("Savings".into());
    sip.metadata = TxnMetadata::Investment(InvestmentMetadata {
        investment_id: gold.id.clone(),
        units: None,
        price: None,
    });
    let mut req = ImportRequest::new(ImportOrigin::Manual, TxnSource::Csv, vec![fuel, sip]);
    req.embed_metadata_in_notes = true;
    let report = run_import(&mut t, req);

    assert_eq!(report.side_effects.len(), 2);
    assert!(report.side_effects.iter().all(|e| e.error.is_none()));
    assert_eq!(t.fuel_logs().len(), 1);
    assert_eq!(t.vehicles()[0].mileage, 400);
    assert_eq!(t.investments()[0].invested_amount, d("1000"));
    let notes = report.committed[0].notes.clone().unwrap();
    assert!(notes.contains("\"vehicleId\""));
    let stored: Vec<Transaction> = t.store().fetch_all().unwrap();
    assert!(stored.iter().all(|s| s.metadata.is_none()));
}

// ---- statements ----

fn extracted(date: &str, desc: &str, amount: &str, kind: &str) -> ExtractedTransaction {
    ExtractedTransaction {
        date: date.into(),
        description: desc.into(),
        amount: amount.into(),
        debit_or_credit: Some(kind.into()),
        category: None,
        balance: None,
    }
}

fn statement() -> Extraction {
    Extraction {
        transactions: vec![
            extracted("01/05/2025", "Salary", "50,000", "Deposit"),
            extracted("02/05/2025", "Rent", "20,000", "Withdrawal"),
        ],
        account_info: AccountInfo {
            bank_name: Some("SBI".into()),
            account_number: Some("XXXX-1234-5678".into()),
            primary_balance: Some("80,000".into()),
            linked_accounts: vec![LinkedAccount {
                name: "PPF Account".into(),
                account_number: Some("99887766".into()),
                balance: Some("1,20,000".into()),
                status: None,
            }],
        },
        statement_period: None,
        extraction_quality: None,
    }
}

#[test]
fn extraction_detects_primary_and_linked_accounts() {
    let s = rows_from_extraction(&statement());
    assert_eq!(s.rows.len(), 2);
    assert!(
        s.rows
            .iter()
            .all(|r| r.account == AccountRef::Detected(PRIMARY_PLACEHOLDER.into()))
    );
    assert_eq!(s.detected.len(), 2);
    let primary = &s.detected[0];
    assert_eq!(primary.name, "SBI 5678");
    assert_eq!(primary.opening_balance, d("50000"));
    let linked = &s.detected[1];
    assert_eq!(linked.placeholder, linked_placeholder(0));
    assert_eq!(linked.kind, AccountType::Investment);
    assert_eq!(linked.opening_balance, d("120000"));
}

#[test]
fn created_detected_account_receives_rows_and_lands_on_closing_balance() {
    let conn = setup();
    let mut t = tracker(&conn);
    let s = rows_from_extraction(&statement());
    let mut req = ImportRequest::new(ImportOrigin::Oracle, TxnSource::Pdf, s.rows);
    req.create = vec![PRIMARY_PLACEHOLDER.to_string()];
    req.detected = s.detected;
    let report = run_import(&mut t, req);

    assert_eq!(report.created_accounts.len(), 1);
    let acct = &report.created_accounts[0];
    assert!(report.committed.iter().all(|c| c.account_id == acct.id));
    assert!(report.unresolved.is_empty());
    assert_eq!(t.account(&acct.id).unwrap().balance, d("80000"));
    assert_eq!(t.accounts().len(), 1);
}

#[test]
fn card_statement_owing_money_opens_negative() {
    let mut ex = statement();
    ex.transactions = vec![extracted("01/06/2025", "Fuel", "1,000", "Withdrawal")];
    ex.account_info.primary_balance = Some("-5,000.00".into());
    ex.account_info.linked_accounts[0].name = "Overdraft".into();
    ex.account_info.linked_accounts[0].balance = Some("-250".into());
    let s = rows_from_extraction(&ex);
    assert_eq!(s.detected[0].opening_balance, d("-4000"));
    assert_eq!(s.detected[1].opening_balance, d("-250"));

    let conn = setup();
    let mut t = tracker(&conn);
    let mut req = ImportRequest::new(ImportOrigin::Oracle, TxnSource::Pdf, s.rows);
    req.create = vec![PRIMARY_PLACEHOLDER.to_string()];
    req.detected = s.detected;
    let report = run_import(&mut t, req);
    let acct = &report.created_accounts[0];
    assert_eq!(t.account(&acct.id).unwrap().balance, d("-5000"));
}

#[test]
fn rows_import_will_drop_do_not_shift_the_opening_balance() {
    let mut ex = statement();
    ex.transactions = vec![
        extracted("01/06/2025", "Rent", "1000", "Withdrawal"),
        extracted("bad", "Groceries", "500", "Withdrawal"),
        extracted("02/06/2025", "Reversal", "0.00", "Deposit"),
    ];
    ex.account_info.primary_balance = Some("8500".into());
    let s = rows_from_extraction(&ex);
    assert_eq!(s.detected[0].opening_balance, d("9500"));

    let conn = setup();
    let mut t = tracker(&conn);
    let mut req = ImportRequest::new(ImportOrigin::Oracle, TxnSource::Pdf, s.rows);
    req.create = vec![PRIMARY_PLACEHOLDER.to_string()];
    req.detected = s.detected;
    let report = run_import(&mut t, req);
    assert_eq!(report.committed.len(), 1);
    assert_eq!(report.dropped.len(), 2);
    let acct = &report.created_accounts[0];
    assert_eq!(t.account(&acct.id).unwrap().balance, d("8500"));
}

#[test]
fn created_account_uses_requested_currency() {
    let conn = setup();
    let mut t = tracker(&conn);
    let mut travel = Account::new("Travel", "Wise", AccountType::Wallet, d("0"));
    travel.currency = "USD".into();
    t.add_account(travel).unwrap();

    let s = rows_from_extraction(&statement());
    let mut req = ImportRequest::new(ImportOrigin::Oracle, TxnSource::Pdf, s.rows);
    req.create = vec![PRIMARY_PLACEHOLDER.to_string()];
    req.detected = s.detected;
    req.currency = "INR".into();
    let report = run_import(&mut t, req);
    assert_eq!(report.created_accounts[0].currency, "INR");
}

#[test]
fn uncreated_detected_account_matches_existing_bank() {
    let conn = setup();
    let mut t = tracker(&conn);
    let existing = t
        .add_account(Account::new("My SBI", "sbi", AccountType::Savings, d("0")))
        .unwrap();
    let s = rows_from_extraction(&statement());
    let mut req = ImportRequest::new(ImportOrigin::Oracle, TxnSource::Pdf, s.rows);
    req.detected = s.detected;
    let report = run_import(&mut t, req);
    assert!(report.created_accounts.is_empty());
    assert!(report.committed.iter().all(|c| c.account_id == existing.id));
}

#[test]
fn statement_without_account_info_leaves_rows_unassigned() {
    let mut ex = statement();
    ex.account_info = AccountInfo::default();
    let s = rows_from_extraction(&ex);
    assert!(s.detected.is_empty());
    assert!(s.rows.iter().all(|r| r.account == AccountRef::None));
}

// ---- csv mapping ----

#[test]
fn csv_amount_column_with_selected_account() {
    let data = "Txn Date,Narration,Amount,Type\n01/05/2025,Coffee,150,Debit\n02/05/2025,Refund,20,Credit\n";
    let mapping = ColumnMapping {
        date: "txn date".into(),
        description: "Narration".into(),
        amount: Some("Amount".into()),
        direction: Some("type".into()),
        ..ColumnMapping::default()
    };
    let rows = rows_from_csv(data.as_bytes(), &mapping, Some("7")).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].account, AccountRef::Selected("7".into()));
    assert_eq!(rows[1].direction.as_deref(), Some("Credit"));
}

#[test]
fn csv_split_debit_credit_columns_carry_direction() {
    let data = "Date,Details,Withdrawal,Deposit,Bank\n2025-05-01,ATM,500,,HDFC\n2025-05-02,Salary,,9000,HDFC\n";
    let mapping = ColumnMapping {
        date: "Date".into(),
        description: "Details".into(),
        debit: Some("Withdrawal".into()),
        credit: Some("Deposit".into()),
        account: Some("Bank".into()),
        ..ColumnMapping::default()
    };
    let rows = rows_from_csv(data.as_bytes(), &mapping, None).unwrap();
    assert_eq!(rows[0].amount, "500");
    assert_eq!(rows[0].direction.as_deref(), Some("debit"));
    assert_eq!(rows[1].amount, "9000");
    assert_eq!(rows[1].direction.as_deref(), Some("credit"));
    assert_eq!(rows[1].account, AccountRef::Named("HDFC".into()));
    assert_eq!(classify_direction(rows[1].direction.as_deref(), ""), TxnType::Income);
}

#[test]
fn csv_zero_filled_debit_credit_columns_use_the_other_side() {
    let data = "Date,Narration,Debit,Credit\n01/06/2025,Salary,0.00,50000.00\n02/06/2025,Tea,40.00,0.00\n03/06/2025,Nothing,0.00,0.00\n";
    let mapping = ColumnMapping {
        date: "Date".into(),
        description: "Narration".into(),
        debit: Some("Debit".into()),
        credit: Some("Credit".into()),
        ..ColumnMapping::default()
    };
    let conn = setup();
    let mut t = tracker(&conn);
    let a = t
        .add_account(Account::new("Main", "", AccountType::Savings, d("0")))
        .unwrap();
    let rows = rows_from_csv(data.as_bytes(), &mapping, Some(&a.id)).unwrap();
    assert_eq!(rows[0].amount, "50000.00");
    assert_eq!(rows[0].direction.as_deref(), Some("credit"));
    assert_eq!(rows[1].amount, "40.00");
    assert_eq!(rows[1].direction.as_deref(), Some("debit"));

    let report = run_import(&mut t, ImportRequest::new(ImportOrigin::Manual, TxnSource::Csv, rows));
    assert_eq!(report.committed.len(), 2);
    assert_eq!(report.dropped.len(), 1);
    assert_eq!(report.dropped[0].reason, "amount is zero");
    assert_eq!(t.account(&a.id).unwrap().balance, d("49960"));
}

#[test]
fn csv_mapping_errors_name_the_problem() {
    let data = "Date,Details\n2025-05-01,ATM\n";
    let no_amount = ColumnMapping {
        date: "Date".into(),
        description: "Details".into(),
        ..ColumnMapping::default()
    };
    assert!(rows_from_csv(data.as_bytes(), &no_amount, None).is_err());
    let missing = ColumnMapping {
        amount: Some("Amount".into()),
        ..no_amount
    };
    let err = rows_from_csv(data.as_bytes(), &missing, None).unwrap_err();
    assert!(err.to_string().contains("Amount"));
}
