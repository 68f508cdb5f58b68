// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Config;
use crate::models::{Account, AccountType};
use crate::store::RecordStore;
use crate::tracker::Tracker;
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::{Result, anyhow};

pub fn handle<S: RecordStore>(
    tracker: &mut Tracker<S>,
    cfg: &Config,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let bank = sub.get_one::<String>("bank").unwrap();
            let kind: AccountType = sub
                .get_one::<String>("type")
                .unwrap()
                .parse()
                .map_err(|e: String| anyhow!(e))?;
            let balance = parse_decimal(sub.get_one::<String>("balance").unwrap())?;
            let mut account = Account::new(name, bank, kind, balance);
            account.currency = sub
                .get_one::<String>("currency")
                .unwrap_or(&cfg.currency)
                .to_uppercase();
            if let Some(limit) = sub.get_one::<String>("credit-limit") {
                account.credit_limit = Some(parse_decimal(limit)?);
            }
            if let Some(due) = sub.get_one::<String>("due-date") {
                account.due_date = Some(parse_date(due)?);
            }
            let saved = tracker.add_account(account)?;
            println!(
                "Added account '{}' ({}, {}) as {}",
                saved.name, saved.kind, saved.currency, saved.id
            );
        }
        Some(("list", sub)) => {
            let accounts = tracker.accounts();
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &accounts)? {
                let data = accounts
                    .iter()
                    .map(|a| {
                        vec![
                            a.id.clone(),
                            a.name.clone(),
                            a.bank_name.clone(),
                            a.kind.to_string(),
                            fmt_money(&a.balance, &a.currency),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Id", "Name", "Bank", "Type", "Balance"], data)
                );
                println!("Total: {}", fmt_money(&tracker.total_balance(), &cfg.currency));
            }
        }
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            tracker.delete_account(id)?;
            println!("Removed account {}", id);
        }
        _ => {}
    }
    Ok(())
}
