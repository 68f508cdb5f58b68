// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::normalize::{classify_direction, normalize_date, parse_amount};
use super::{
    AccountRef, CandidateRow, DetectedAccount, ImportOrigin, ImportReport, ImportRequest,
    SkippedRow, UNKNOWN_ACCOUNT,
};
use crate::categories::{self, FALLBACK_CATEGORY};
use crate::ledger::AccountBook;
use crate::models::{Account, Transaction, TxnMetadata, TxnType};
use crate::store::RecordStore;
use crate::tracker::Tracker;
use chrono::NaiveDate;
use log::{info, warn};
use rust_decimal::Decimal;
use std::collections::HashMap;

struct NormalizedRow {
    index: usize,
    date: NaiveDate,
    amount: Decimal,
    kind: TxnType,
    row: CandidateRow,
}

fn normalize(index: usize, row: CandidateRow) -> Result<NormalizedRow, SkippedRow> {
    let skip = |reason: String| SkippedRow { index, reason };
    let amount = parse_amount(&row.amount)
        .ok_or_else(|| skip(format!("amount '{}' is not a number", row.amount)))?;
    if amount <= Decimal::ZERO {
        return Err(skip("amount is zero".into()));
    }
    let date = normalize_date(&row.date)
        .ok_or_else(|| skip(format!("date '{}' not recognized", row.date)))?;
    let kind = classify_direction(row.direction.as_deref(), &row.description);
    Ok(NormalizedRow {
        index,
        date,
        amount,
        kind,
        row,
    })
}

/// Matches by account name first, then by bank when exactly one account is
/// held at that bank.
fn match_existing(book: &AccountBook, name: &str, bank: &str) -> Option<String> {
    if let Some(acct) = book.find_by_name(name) {
        return Some(acct.id.clone());
    }
    let bank = bank.trim();
    if bank.is_empty() {
        return None;
    }
    let mut at_bank = book
        .accounts()
        .iter()
        .filter(|a| a.bank_name.trim().eq_ignore_ascii_case(bank));
    match (at_bank.next(), at_bank.next()) {
        (Some(only), None) => Some(only.id.clone()),
        _ => None,
    }
}

fn resolve_account(
    book: &AccountBook,
    account: &AccountRef,
    detected: &[DetectedAccount],
    created: &HashMap<String, String>,
    default_account: Option<&str>,
) -> Option<String> {
    let existing = |id: &str| book.get(id).map(|a| a.id.clone());
    let found = match account {
        AccountRef::Selected(id) => existing(id),
        AccountRef::Detected(placeholder) => created.get(placeholder).cloned().or_else(|| {
            detected
                .iter()
                .find(|d| &d.placeholder == placeholder)
                .and_then(|d| match_existing(book, &d.name, &d.bank_name))
        }),
        AccountRef::Named(name) => match_existing(book, name, name),
        AccountRef::None => None,
    };
    found.or_else(|| default_account.and_then(existing))
}

fn pick_category(row: &CandidateRow) -> String {
    row.category_override
        .as_deref()
        .or(row.category.as_deref())
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(categories::canonical)
        .unwrap_or_else(|| FALLBACK_CATEGORY.to_string())
}

fn notes_with_metadata(notes: Option<String>, metadata: &TxnMetadata) -> Option<String> {
    if metadata.is_none() {
        return notes;
    }
    let Ok(json) = serde_json::to_string(metadata) else {
        return notes;
    };
    Some(match notes {
        Some(n) if !n.trim().is_empty() => format!("{}\n[meta] {}", n.trim(), json),
        _ => format!("[meta] {}", json),
    })
}

/// Runs one import batch against the tracker.
///
/// Detected accounts the user opted into are created first, one call at a
/// time, and rows pointing at their placeholders are rewritten to the new ids.
/// Rows are then committed one by one; a row the store refuses is reported
/// and the batch carries on. Nothing is rolled back and nothing is
/// deduplicated: importing the same statement twice books it twice.
pub fn run_import<S: RecordStore>(
    tracker: &mut Tracker<S>,
    request: ImportRequest,
) -> ImportReport {
    let ImportRequest {
        origin,
        source,
        rows,
        detected,
        create,
        default_account,
        currency,
        embed_metadata_in_notes,
    } = request;
    let mut report = ImportReport::default();

    let mut normalized = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        match normalize(index, row) {
            Ok(n) => normalized.push(n),
            Err(skipped) => report.dropped.push(skipped),
        }
    }

    let mut created: HashMap<String, String> = HashMap::new();
    for (index, d) in detected.iter().enumerate() {
        if !create.contains(&d.placeholder) {
            continue;
        }
        let mut account = Account::new(&d.name, &d.bank_name, d.kind, d.opening_balance);
        account.currency = currency.clone();
        match tracker.add_account(account) {
            Ok(saved) => {
                created.insert(d.placeholder.clone(), saved.id.clone());
                report.created_accounts.push(saved);
            }
            Err(e) => {
                warn!("detected account '{}' not created: {}", d.name, e);
                report.account_failures.push(SkippedRow {
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }

    for n in normalized {
        let NormalizedRow {
            index,
            date,
            amount,
            kind,
            row,
        } = n;
        let resolved = resolve_account(
            tracker.book(),
            &row.account,
            &detected,
            &created,
            default_account.as_deref(),
        );
        let account_id = match (resolved, origin) {
            (Some(id), _) => id,
            (None, ImportOrigin::Manual) => {
                report.rejected.push(SkippedRow {
                    index,
                    reason: "no matching account".into(),
                });
                continue;
            }
            (None, ImportOrigin::Oracle) => {
                report.unresolved.push(index);
                UNKNOWN_ACCOUNT.to_string()
            }
        };

        let category = pick_category(&row);
        if tracker.ensure_category(&category) {
            report.new_categories.push(category.clone());
        }

        let notes = if embed_metadata_in_notes {
            notes_with_metadata(row.notes, &row.metadata)
        } else {
            row.notes
        };
        let txn = Transaction {
            id: String::new(),
            date,
            amount,
            kind,
            category,
            description: row.description,
            account_id,
            source: Some(source),
            notes,
            metadata: row.metadata,
        };

        match tracker.commit_transaction(txn) {
            Ok(committed) => {
                report.side_effects.extend(committed.effect);
                report.committed.push(committed.transaction);
            }
            Err(e) => {
                warn!("row {} not imported: {}", index, e);
                report.failures.push(SkippedRow {
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }

    if !report.unresolved.is_empty() {
        warn!(
            "{} rows matched no account and were filed under '{}'",
            report.unresolved.len(),
            UNKNOWN_ACCOUNT
        );
    }
    info!("import finished: {}", report.summary());
    report
}
