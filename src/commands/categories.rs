// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::categories::is_default_category;
use crate::store::RecordStore;
use crate::tracker::Tracker;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Result, bail};

pub fn handle<S: RecordStore>(tracker: &mut Tracker<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            if name.is_empty() {
                bail!("Category name cannot be empty");
            }
            if tracker.ensure_category(name) {
                println!("Added category '{}'", name);
            } else {
                println!("Category '{}' already exists", name);
            }
        }
        Some(("list", sub)) => {
            let names = tracker.categories().all();
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &names)? {
                let data = names
                    .into_iter()
                    .map(|n| {
                        let origin = if is_default_category(&n) { "default" } else { "custom" };
                        vec![n, origin.to_string()]
                    })
                    .collect();
                println!("{}", pretty_table(&["Category", "Kind"], data));
            }
        }
        _ => {}
    }
    Ok(())
}
