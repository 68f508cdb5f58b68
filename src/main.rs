// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use log::warn;

use fintrack::cache::LocalCache;
use fintrack::config::Config;
use fintrack::store::SqliteStore;
use fintrack::tracker::Tracker;
use fintrack::{cli, commands, db};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let cfg = Config::load()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cfg.log_level))
        .init();

    let conn = db::open_or_init()?;
    if let Some(("init", _)) = matches.subcommand() {
        println!("Database initialized at {}", db::db_path()?.display());
        return Ok(());
    }

    let session = cfg.session();
    if session.is_none() {
        warn!("no user configured; set userId in config.json or FINTRACK_USER");
    }
    let store = SqliteStore::new(&conn, session);
    let cache = LocalCache::open(db::data_dir()?.join("cache.json"))?;
    let mut tracker = Tracker::load(store, cache)?;

    match matches.subcommand() {
        Some(("account", sub)) => commands::accounts::handle(&mut tracker, &cfg, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&mut tracker, sub)?,
        Some(("budget", sub)) => commands::budgets::handle(&mut tracker, sub)?,
        Some(("category", sub)) => commands::categories::handle(&mut tracker, sub)?,
        Some(("vehicle", sub)) => commands::vehicles::handle(&mut tracker, sub)?,
        Some(("fuel", sub)) => commands::vehicles::handle_fuel(&mut tracker, sub)?,
        Some(("investment", sub)) => commands::investments::handle(&mut tracker, sub)?,
        Some(("import", sub)) => commands::importer::handle(&mut tracker, &cfg, sub)?,
        Some(("insights", sub)) => commands::insights::handle(&tracker, &cfg, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
