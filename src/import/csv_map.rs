// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::normalize::parse_amount;
use super::{AccountRef, CandidateRow};
use anyhow::{Context, Result, bail};
use csv::{ReaderBuilder, StringRecord};
use std::io::Read;

/// Which header holds which field. Either `amount`, or `debit`/`credit`
/// columns, must be mapped.
#[derive(Debug, Clone, Default)]
pub struct ColumnMapping {
    pub date: String,
    pub description: String,
    pub amount: Option<String>,
    pub debit: Option<String>,
    pub credit: Option<String>,
    pub direction: Option<String>,
    pub category: Option<String>,
    pub account: Option<String>,
}

struct Indices {
    date: usize,
    description: usize,
    amount: Option<usize>,
    debit: Option<usize>,
    credit: Option<usize>,
    direction: Option<usize>,
    category: Option<usize>,
    account: Option<usize>,
}

fn find(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name.trim()))
}

fn required(headers: &StringRecord, name: &str) -> Result<usize> {
    find(headers, name).with_context(|| format!("Column '{}' not found", name))
}

fn optional(headers: &StringRecord, name: &Option<String>) -> Result<Option<usize>> {
    match name {
        Some(n) => Ok(Some(required(headers, n)?)),
        None => Ok(None),
    }
}

impl ColumnMapping {
    fn resolve(&self, headers: &StringRecord) -> Result<Indices> {
        if self.amount.is_none() && self.debit.is_none() && self.credit.is_none() {
            bail!("Map an amount column, or debit/credit columns");
        }
        Ok(Indices {
            date: required(headers, &self.date)?,
            description: required(headers, &self.description)?,
            amount: optional(headers, &self.amount)?,
            debit: optional(headers, &self.debit)?,
            credit: optional(headers, &self.credit)?,
            direction: optional(headers, &self.direction)?,
            category: optional(headers, &self.category)?,
            account: optional(headers, &self.account)?,
        })
    }
}

fn cell(rec: &StringRecord, idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| rec.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn is_nonzero(value: &Option<String>) -> bool {
    value
        .as_deref()
        .and_then(parse_amount)
        .is_some_and(|a| !a.is_zero())
}

/// Reads a headered CSV into candidate rows. With `selected_account` every row
/// is pinned to that account; otherwise a mapped account column is matched by name.
pub fn rows_from_csv<R: Read>(
    reader: R,
    mapping: &ColumnMapping,
    selected_account: Option<&str>,
) -> Result<Vec<CandidateRow>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers = rdr.headers().context("Read CSV header")?.clone();
    let idx = mapping.resolve(&headers)?;

    let mut rows = Vec::new();
    for result in rdr.records() {
        let rec = result?;
        let mut amount = cell(&rec, idx.amount);
        let mut direction = cell(&rec, idx.direction);
        // split debit/credit columns carry their direction with them; the
        // unused side may be blank or zero
        if amount.is_none() {
            let debit = cell(&rec, idx.debit);
            let credit = cell(&rec, idx.credit);
            let picked = if is_nonzero(&debit) {
                debit.map(|v| (v, "debit"))
            } else if is_nonzero(&credit) {
                credit.map(|v| (v, "credit"))
            } else {
                debit
                    .map(|v| (v, "debit"))
                    .or_else(|| credit.map(|v| (v, "credit")))
            };
            if let Some((value, side)) = picked {
                amount = Some(value);
                direction.get_or_insert_with(|| side.to_string());
            }
        }
        let account = match (selected_account, cell(&rec, idx.account)) {
            (Some(id), _) => AccountRef::Selected(id.to_string()),
            (None, Some(name)) => AccountRef::Named(name),
            (None, None) => AccountRef::None,
        };
        rows.push(CandidateRow {
            date: cell(&rec, Some(idx.date)).unwrap_or_default(),
            description: cell(&rec, Some(idx.description)).unwrap_or_default(),
            amount: amount.unwrap_or_default(),
            direction,
            category: cell(&rec, idx.category),
            account,
            ..CandidateRow::default()
        });
    }
    Ok(rows)
}
