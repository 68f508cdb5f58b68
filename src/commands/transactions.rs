// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{FuelMetadata, InvestmentMetadata, Transaction, TxnMetadata, TxnSource, TxnType};
use crate::store::RecordStore;
use crate::tracker::{Committed, Tracker};
use crate::utils::{maybe_print_json, parse_date, parse_decimal, parse_month, pretty_table};
use anyhow::{Context, Result, anyhow};
use chrono::Datelike;

pub fn handle<S: RecordStore>(tracker: &mut Tracker<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(tracker, sub)?,
        Some(("edit", sub)) => edit(tracker, sub)?,
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            tracker.delete_transaction(id)?;
            println!("Removed transaction {}", id);
        }
        Some(("list", sub)) => list(tracker, sub)?,
        _ => {}
    }
    Ok(())
}

fn parse_kind(s: &str) -> Result<TxnType> {
    s.parse().map_err(|e: String| anyhow!(e))
}

fn metadata_from_args(sub: &clap::ArgMatches) -> Result<Option<TxnMetadata>> {
    if let Some(vehicle) = sub.get_one::<String>("vehicle") {
        let liters = match sub.get_one::<String>("liters") {
            Some(l) => parse_decimal(l)?,
            None => rust_decimal::Decimal::ZERO,
        };
        return Ok(Some(TxnMetadata::Fuel(FuelMetadata {
            vehicle_id: vehicle.clone(),
            liters,
            odometer: sub.get_one::<u32>("odometer").copied().unwrap_or(0),
        })));
    }
    if let Some(investment) = sub.get_one::<String>("investment") {
        let units = sub.get_one::<String>("units").map(|s| parse_decimal(s)).transpose()?;
        let price = sub.get_one::<String>("price").map(|s| parse_decimal(s)).transpose()?;
        return Ok(Some(TxnMetadata::Investment(InvestmentMetadata {
            investment_id: investment.clone(),
            units,
            price,
        })));
    }
    Ok(None)
}

fn report_effect(committed: &Committed) {
    if let Some(applied) = &committed.effect {
        match &applied.error {
            None => println!("Linked update applied: {:?}", applied.effect),
            Some(e) => println!("Linked update failed: {}", e),
        }
    }
}

fn add<S: RecordStore>(tracker: &mut Tracker<S>, sub: &clap::ArgMatches) -> Result<()> {
    let txn = Transaction {
        id: String::new(),
        date: parse_date(sub.get_one::<String>("date").unwrap())?,
        amount: parse_decimal(sub.get_one::<String>("amount").unwrap())?,
        kind: parse_kind(sub.get_one::<String>("type").unwrap())?,
        category: sub.get_one::<String>("category").cloned().unwrap_or_default(),
        description: sub.get_one::<String>("description").cloned().unwrap_or_default(),
        account_id: sub.get_one::<String>("account").unwrap().clone(),
        source: Some(TxnSource::Manual),
        notes: sub.get_one::<String>("notes").cloned(),
        metadata: metadata_from_args(sub)?.unwrap_or_default(),
    };
    let committed = tracker.add_transaction(txn)?;
    let t = &committed.transaction;
    println!(
        "Recorded {} {} on {} in '{}' (acct: {})",
        t.kind, t.amount, t.date, t.category, t.account_id
    );
    report_effect(&committed);
    Ok(())
}

fn edit<S: RecordStore>(tracker: &mut Tracker<S>, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap();
    let mut txn = tracker
        .transactions()
        .iter()
        .find(|t| &t.id == id)
        .cloned()
        .with_context(|| format!("Transaction {} not found", id))?;
    if let Some(date) = sub.get_one::<String>("date") {
        txn.date = parse_date(date)?;
    }
    if let Some(amount) = sub.get_one::<String>("amount") {
        txn.amount = parse_decimal(amount)?;
    }
    if let Some(kind) = sub.get_one::<String>("type") {
        txn.kind = parse_kind(kind)?;
    }
    if let Some(account) = sub.get_one::<String>("account") {
        txn.account_id = account.clone();
    }
    if let Some(category) = sub.get_one::<String>("category") {
        txn.category = category.clone();
    }
    if let Some(description) = sub.get_one::<String>("description") {
        txn.description = description.clone();
    }
    if let Some(notes) = sub.get_one::<String>("notes") {
        txn.notes = Some(notes.clone());
    }
    tracker.edit_transaction(txn)?;
    println!("Updated transaction {}", id);
    Ok(())
}

fn list<S: RecordStore>(tracker: &Tracker<S>, sub: &clap::ArgMatches) -> Result<()> {
    let month = sub
        .get_one::<String>("month")
        .map(|m| parse_month(m))
        .transpose()?;
    let account = sub.get_one::<String>("account");
    let category = sub.get_one::<String>("category");

    let mut data: Vec<&Transaction> = tracker
        .transactions()
        .iter()
        .filter(|t| {
            month.is_none_or(|m| t.date.year() == m.year() && t.date.month() == m.month())
        })
        .filter(|t| account.is_none_or(|a| &t.account_id == a))
        .filter(|t| category.is_none_or(|c| t.category.eq_ignore_ascii_case(c)))
        .collect();
    data.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
    if let Some(limit) = sub.get_one::<usize>("limit") {
        data.truncate(*limit);
    }

    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|t| {
                let account = tracker
                    .account(&t.account_id)
                    .map(|a| a.name.clone())
                    .unwrap_or_else(|| t.account_id.clone());
                vec![
                    t.id.clone(),
                    t.date.to_string(),
                    account,
                    t.description.clone(),
                    t.kind.to_string(),
                    t.amount.to_string(),
                    t.category.clone(),
                    t.notes.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Date", "Account", "Description", "Type", "Amount", "Category", "Note"],
                rows,
            )
        );
    }
    Ok(())
}
