// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::TxnType;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Words that mark a row as money coming in. Anything else is an expense.
///
/// This is a keyword heuristic and misclassifies rows such as
/// "Credit card bill payment" or a bare "Cr"; reviewers are expected to fix
/// those by hand.
pub const INCOME_TOKENS: &[&str] = &["credit", "deposit", "salary", "income"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

/// Positive magnitude of a statement amount. Thousands separators, spaces and
/// a leading rupee marker are ignored. Non-numeric input yields `None`.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    parse_signed_amount(raw).map(|d| d.abs())
}

/// Like [`parse_amount`] but keeps the sign, for balances where negative
/// means owed. A minus may sit before or after the rupee marker.
pub fn parse_signed_amount(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    match trimmed.strip_prefix('-') {
        Some(rest) => unsigned_body(rest).map(|d| -d),
        None => unsigned_body(trimmed),
    }
}

fn unsigned_body(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();
    let body = ["inr", "rs.", "rs"]
        .iter()
        .find(|p| lower.starts_with(*p))
        .map(|p| &trimmed[p.len()..])
        .unwrap_or(trimmed);
    let cleaned: String = body
        .chars()
        .filter(|c| !matches!(c, ',' | ' ' | '\u{20b9}'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<Decimal>().ok()
}

/// Accepts `YYYY-MM-DD`, `DD/MM/YYYY` and `DD-MM-YYYY` (day first, as Indian
/// statements print them). An ISO timestamp is cut to its date.
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    if s.len() > 10 && s.is_char_boundary(10) && s.as_bytes().get(10) == Some(&b'T') {
        return NaiveDate::parse_from_str(&s[..10], "%Y-%m-%d").ok();
    }
    None
}

/// Canonical `YYYY-MM-DD` text for any accepted input.
pub fn canonical_date(raw: &str) -> Option<String> {
    normalize_date(raw).map(|d| d.format("%Y-%m-%d").to_string())
}

fn has_income_token(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    INCOME_TOKENS.iter().any(|t| lower.contains(t))
}

/// Income when the type field (or, if that is blank, the description)
/// contains one of [`INCOME_TOKENS`]; expense otherwise.
pub fn classify_direction(type_field: Option<&str>, description: &str) -> TxnType {
    let text = match type_field.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => description,
    };
    if has_income_token(text) {
        TxnType::Income
    } else {
        TxnType::Expense
    }
}

/// Signed balance effect of a raw row, or `None` when import would drop it
/// (unparsable or zero amount, unrecognized date).
pub fn row_effect(
    date: &str,
    amount: &str,
    direction: Option<&str>,
    description: &str,
) -> Option<Decimal> {
    let amount = parse_amount(amount).filter(|a| *a > Decimal::ZERO)?;
    normalize_date(date)?;
    Some(match classify_direction(direction, description) {
        TxnType::Income => amount,
        TxnType::Expense => -amount,
    })
}
