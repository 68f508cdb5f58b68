// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::normalize::{parse_signed_amount, row_effect};
use super::{AccountRef, CandidateRow, DetectedAccount};
use crate::models::AccountType;
use crate::oracle::{Extraction, ExtractedTransaction, MessageParser};
use log::warn;
use rust_decimal::Decimal;

pub const PRIMARY_PLACEHOLDER: &str = "detected:primary";

pub fn linked_placeholder(index: usize) -> String {
    format!("detected:linked:{}", index)
}

/// Candidate rows and the accounts a statement mentions.
#[derive(Debug, Clone, Default)]
pub struct StatementRows {
    pub rows: Vec<CandidateRow>,
    pub detected: Vec<DetectedAccount>,
}

fn last_digits(number: &str) -> String {
    let digits: Vec<char> = number.chars().filter(char::is_ascii_digit).collect();
    digits[digits.len().saturating_sub(4)..].iter().collect()
}

fn guess_kind(name: &str) -> AccountType {
    let lower = name.to_ascii_lowercase();
    if lower.contains("ppf") || lower.contains("fd") || lower.contains("deposit a/c") {
        AccountType::Investment
    } else if lower.contains("credit") {
        AccountType::CreditCard
    } else if lower.contains("current") || lower.contains("checking") {
        AccountType::Checking
    } else {
        AccountType::Savings
    }
}

fn row_from_extracted(tx: &ExtractedTransaction, account: AccountRef) -> CandidateRow {
    CandidateRow {
        date: tx.date.clone(),
        description: tx.description.trim().to_string(),
        amount: tx.amount.clone(),
        direction: tx.debit_or_credit.clone(),
        category: tx.category.clone().filter(|c| !c.trim().is_empty()),
        account,
        ..CandidateRow::default()
    }
}

/// Maps an extraction onto candidate rows. When the statement names its own
/// account, every row points at the primary placeholder; linked accounts get
/// placeholders of their own.
///
/// The primary account opens at the closing balance minus the net effect of
/// the rows import will keep, so committing all of them lands on the closing
/// balance. Negative balances (cards, overdrafts) keep their sign.
pub fn rows_from_extraction(extraction: &Extraction) -> StatementRows {
    let info = &extraction.account_info;
    let bank = info.bank_name.clone().unwrap_or_default().trim().to_string();
    let number = info.account_number.clone().filter(|n| !n.trim().is_empty());

    let mut detected = Vec::new();
    let primary_ref = if !bank.is_empty() || number.is_some() {
        let net: Decimal = extraction
            .transactions
            .iter()
            .filter_map(|t| {
                row_effect(
                    &t.date,
                    &t.amount,
                    t.debit_or_credit.as_deref(),
                    &t.description,
                )
            })
            .sum();
        let closing = info
            .primary_balance
            .as_deref()
            .and_then(parse_signed_amount)
            .unwrap_or(net);
        let label = if bank.is_empty() { "Statement account" } else { bank.as_str() };
        let name = match &number {
            Some(n) => format!("{} {}", label, last_digits(n)),
            None => label.to_string(),
        };
        detected.push(DetectedAccount {
            placeholder: PRIMARY_PLACEHOLDER.to_string(),
            name,
            bank_name: bank.clone(),
            account_number: number.clone(),
            kind: AccountType::Savings,
            opening_balance: closing - net,
        });
        AccountRef::Detected(PRIMARY_PLACEHOLDER.to_string())
    } else {
        AccountRef::None
    };

    for (i, linked) in info.linked_accounts.iter().enumerate() {
        let name = match linked.account_number.as_deref() {
            Some(n) if !n.trim().is_empty() => format!("{} {}", linked.name.trim(), last_digits(n)),
            _ => linked.name.trim().to_string(),
        };
        detected.push(DetectedAccount {
            placeholder: linked_placeholder(i),
            name,
            bank_name: bank.clone(),
            account_number: linked.account_number.clone(),
            kind: guess_kind(&linked.name),
            opening_balance: linked
                .balance
                .as_deref()
                .and_then(parse_signed_amount)
                .unwrap_or(Decimal::ZERO),
        });
    }

    let rows = extraction
        .transactions
        .iter()
        .map(|t| row_from_extracted(t, primary_ref.clone()))
        .collect();
    StatementRows { rows, detected }
}

/// Runs each message through the parser and pins every hit to the caller's
/// default account. Failed messages are logged and skipped.
pub fn rows_from_inbox<P: MessageParser + ?Sized>(
    parser: &P,
    messages: &[String],
    default_account: &str,
) -> Vec<CandidateRow> {
    let mut rows = Vec::new();
    for (i, raw) in messages.iter().enumerate() {
        match parser.parse_message(raw) {
            Ok(Some(tx)) => rows.push(row_from_extracted(
                &tx,
                AccountRef::Selected(default_account.to_string()),
            )),
            Ok(None) => {}
            Err(e) => warn!("message {} skipped: {}", i, e),
        }
    }
    rows
}
