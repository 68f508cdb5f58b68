// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::budget;
use crate::categories;
use crate::models::{Budget, BudgetPeriod};
use crate::store::RecordStore;
use crate::tracker::Tracker;
use crate::utils::{maybe_print_json, parse_decimal, parse_month, pretty_table};
use anyhow::{Result, bail};

pub fn handle<S: RecordStore>(tracker: &mut Tracker<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(tracker, sub)?,
        Some(("rm", sub)) => rm(tracker, sub)?,
        Some(("report", sub)) => report(tracker, sub)?,
        _ => {}
    }
    Ok(())
}

fn set<S: RecordStore>(tracker: &mut Tracker<S>, sub: &clap::ArgMatches) -> Result<()> {
    let category = categories::canonical(sub.get_one::<String>("category").unwrap());
    let limit = parse_decimal(sub.get_one::<String>("limit").unwrap())?;
    let mut budgets = tracker.budgets().to_vec();
    budgets.push(Budget {
        id: String::new(),
        category: category.clone(),
        limit,
        period: BudgetPeriod::Monthly,
    });
    tracker.save_budgets(budgets)?;
    tracker.ensure_category(&category);
    println!("Budget set for {} = {} per month", category, limit);
    Ok(())
}

fn rm<S: RecordStore>(tracker: &mut Tracker<S>, sub: &clap::ArgMatches) -> Result<()> {
    let category = sub.get_one::<String>("category").unwrap();
    let before = tracker.budgets().len();
    let budgets: Vec<Budget> = tracker
        .budgets()
        .iter()
        .filter(|b| !b.category.eq_ignore_ascii_case(category))
        .cloned()
        .collect();
    if budgets.len() == before {
        bail!("No budget for '{}'", category);
    }
    tracker.save_budgets(budgets)?;
    println!("Removed budget for {}", category);
    Ok(())
}

fn report<S: RecordStore>(tracker: &Tracker<S>, sub: &clap::ArgMatches) -> Result<()> {
    let data = match sub.get_one::<String>("month") {
        Some(m) => tracker.budget_status(parse_month(m)?),
        None => budget::aggregate_current(tracker.budgets(), tracker.transactions()),
    };
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|s| {
                vec![
                    s.category.clone(),
                    s.limit.to_string(),
                    s.spent.to_string(),
                    s.remaining.to_string(),
                    if s.is_over() { "OVER".into() } else { "ok".into() },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Category", "Limit", "Spent", "Remaining", "Status"], rows)
        );
    }
    Ok(())
}
