// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Statement import: semi-structured rows in, committed transactions out.
//!
//! Rows come from a column-mapped spreadsheet ([`csv_map`]), from a statement
//! extraction ([`statement`]) or from parsed inbox messages. [`pipeline`]
//! normalizes them, resolves accounts (creating detected ones first), assigns
//! categories, derives fuel/investment updates and commits row by row.

pub mod csv_map;
pub mod effects;
pub mod normalize;
pub mod pipeline;
pub mod statement;

pub use pipeline::run_import;

use crate::models::{Account, AccountType, DEFAULT_CURRENCY, Transaction, TxnMetadata, TxnSource};
use effects::AppliedEffect;
use rust_decimal::Decimal;
use serde::Serialize;

/// Account id given to statement rows that match no account.
pub const UNKNOWN_ACCOUNT: &str = "unknown";

/// How a candidate row points at its account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AccountRef {
    #[default]
    None,
    /// A real account id the user picked for this row.
    Selected(String),
    /// A detected placeholder id, see [`DetectedAccount`].
    Detected(String),
    /// Free text naming an account or bank.
    Named(String),
}

/// One raw row awaiting normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateRow {
    pub date: String,
    pub description: String,
    pub amount: String,
    /// Free-text direction ("Deposit", "Withdrawal", "Cr", ...).
    pub direction: Option<String>,
    /// Best-effort category from the source.
    pub category: Option<String>,
    /// Category chosen by the user while reviewing; wins over `category`.
    pub category_override: Option<String>,
    pub account: AccountRef,
    pub notes: Option<String>,
    pub metadata: TxnMetadata,
}

/// An account mentioned by a statement that may not exist yet.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedAccount {
    pub placeholder: String,
    pub name: String,
    pub bank_name: String,
    pub account_number: Option<String>,
    pub kind: AccountType,
    pub opening_balance: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOrigin {
    /// User-mapped spreadsheet: unresolvable rows are rejected.
    Manual,
    /// Extraction service or inbox: unresolvable rows go to [`UNKNOWN_ACCOUNT`].
    Oracle,
}

#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub origin: ImportOrigin,
    pub source: TxnSource,
    pub rows: Vec<CandidateRow>,
    pub detected: Vec<DetectedAccount>,
    /// Placeholders the user ticked "create this account" for.
    pub create: Vec<String>,
    pub default_account: Option<String>,
    /// Currency given to accounts created from `detected`.
    pub currency: String,
    pub embed_metadata_in_notes: bool,
}

impl ImportRequest {
    pub fn new(origin: ImportOrigin, source: TxnSource, rows: Vec<CandidateRow>) -> Self {
        Self {
            origin,
            source,
            rows,
            detected: Vec::new(),
            create: Vec::new(),
            default_account: None,
            currency: DEFAULT_CURRENCY.to_string(),
            embed_metadata_in_notes: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRow {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub committed: Vec<Transaction>,
    /// Rows discarded during normalization.
    pub dropped: Vec<SkippedRow>,
    /// Manual rows with no resolvable account.
    pub rejected: Vec<SkippedRow>,
    /// Statement rows committed against [`UNKNOWN_ACCOUNT`].
    pub unresolved: Vec<usize>,
    /// Rows the store refused; the rest of the batch still went in.
    pub failures: Vec<SkippedRow>,
    pub created_accounts: Vec<Account>,
    pub account_failures: Vec<SkippedRow>,
    pub new_categories: Vec<String>,
    pub side_effects: Vec<AppliedEffect>,
}

impl ImportReport {
    pub fn summary(&self) -> String {
        format!(
            "{} imported, {} dropped, {} rejected, {} unassigned, {} failed",
            self.committed.len(),
            self.dropped.len(),
            self.rejected.len(),
            self.unresolved.len(),
            self.failures.len()
        )
    }
}
