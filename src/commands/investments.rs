// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Investment, InvestmentType};
use crate::store::RecordStore;
use crate::tracker::Tracker;
use crate::utils::{maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::{Result, anyhow};
use chrono::Local;
use rust_decimal::Decimal;

pub fn handle<S: RecordStore>(tracker: &mut Tracker<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(tracker, sub)?,
        Some(("list", sub)) => list(tracker, sub)?,
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            tracker.delete_investment(id)?;
            println!("Removed investment {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn add<S: RecordStore>(tracker: &mut Tracker<S>, sub: &clap::ArgMatches) -> Result<()> {
    let kind: InvestmentType = sub
        .get_one::<String>("type")
        .unwrap()
        .parse()
        .map_err(|e: String| anyhow!(e))?;
    let invested = parse_decimal(sub.get_one::<String>("invested").unwrap())?;
    let current = match sub.get_one::<String>("current") {
        Some(c) => parse_decimal(c)?,
        None => invested,
    };
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => Local::now().date_naive(),
    };
    let investment = Investment {
        id: String::new(),
        name: sub.get_one::<String>("name").unwrap().clone(),
        kind,
        invested_amount: invested,
        current_value: current,
        quantity: sub
            .get_one::<String>("quantity")
            .map(|q| parse_decimal(q))
            .transpose()?,
        date,
    };
    let saved = tracker.add_investment(investment)?;
    println!("Added investment '{}' as {}", saved.name, saved.id);
    Ok(())
}

fn list<S: RecordStore>(tracker: &Tracker<S>, sub: &clap::ArgMatches) -> Result<()> {
    let holdings = tracker.investments();
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &holdings)? {
        return Ok(());
    }
    let mut invested = Decimal::ZERO;
    let mut current = Decimal::ZERO;
    let mut data = Vec::new();
    for h in holdings {
        invested += h.invested_amount;
        current += h.current_value;
        let gain = h.current_value - h.invested_amount;
        let pct = if h.invested_amount.is_zero() {
            String::new()
        } else {
            format!("{:.2}%", (gain / h.invested_amount * Decimal::ONE_HUNDRED).round_dp(2))
        };
        data.push(vec![
            h.id.clone(),
            h.name.clone(),
            format!("{:?}", h.kind).to_lowercase(),
            h.invested_amount.to_string(),
            h.current_value.to_string(),
            gain.to_string(),
            pct,
        ]);
    }
    println!(
        "{}",
        pretty_table(
            &["Id", "Name", "Type", "Invested", "Current", "Gain", "Gain %"],
            data
        )
    );
    println!("Invested {} / current {}", invested, current);
    Ok(())
}
