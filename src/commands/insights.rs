// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Config;
use crate::models::Transaction;
use crate::oracle::{OracleClient, insights_or_fallback};
use crate::store::RecordStore;
use crate::tracker::Tracker;
use anyhow::Result;

pub fn handle<S: RecordStore>(
    tracker: &Tracker<S>,
    cfg: &Config,
    m: &clap::ArgMatches,
) -> Result<()> {
    let limit = *m.get_one::<usize>("recent").unwrap();
    let mut recent: Vec<Transaction> = tracker.transactions().to_vec();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    recent.truncate(limit);

    let client = OracleClient::new(cfg)?;
    println!(
        "{}",
        insights_or_fallback(&client, &recent, tracker.total_balance())
    );
    Ok(())
}
