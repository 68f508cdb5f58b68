// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Config;
use crate::import::csv_map::{ColumnMapping, rows_from_csv};
use crate::import::statement::{rows_from_extraction, rows_from_inbox};
use crate::import::{ImportOrigin, ImportReport, ImportRequest, run_import};
use crate::models::TxnSource;
use crate::oracle::{OracleClient, PasswordPrompt, StatementDocument, extract_with_prompt};
use crate::store::RecordStore;
use crate::tracker::Tracker;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Context, Result, anyhow, bail};
use log::debug;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

pub fn handle<S: RecordStore>(
    tracker: &mut Tracker<S>,
    cfg: &Config,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("csv", sub)) => import_csv(tracker, cfg, sub),
        Some(("pdf", sub)) => import_pdf(tracker, cfg, sub),
        Some(("inbox", sub)) => import_inbox(tracker, cfg, sub),
        _ => Ok(()),
    }
}

fn print_report(report: &ImportReport, sub: &clap::ArgMatches) -> Result<()> {
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), report)? {
        return Ok(());
    }
    for a in &report.created_accounts {
        println!("Created account '{}' ({}) as {}", a.name, a.kind, a.id);
    }
    if !report.new_categories.is_empty() {
        println!("New categories: {}", report.new_categories.join(", "));
    }
    let skipped: Vec<Vec<String>> = report
        .dropped
        .iter()
        .map(|s| ("dropped", s))
        .chain(report.rejected.iter().map(|s| ("rejected", s)))
        .chain(report.failures.iter().map(|s| ("failed", s)))
        .map(|(what, s)| vec![(s.index + 1).to_string(), what.to_string(), s.reason.clone()])
        .collect();
    if !skipped.is_empty() {
        println!("{}", pretty_table(&["Row", "Outcome", "Reason"], skipped));
    }
    for applied in &report.side_effects {
        if let Some(e) = &applied.error {
            println!("Linked update failed: {}", e);
        }
    }
    println!("{}", report.summary());
    Ok(())
}

fn import_csv<S: RecordStore>(
    tracker: &mut Tracker<S>,
    cfg: &Config,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let path = sub.get_one::<String>("path").unwrap().trim();
    let mapping = ColumnMapping {
        date: sub.get_one::<String>("date-col").unwrap().clone(),
        description: sub.get_one::<String>("desc-col").unwrap().clone(),
        amount: sub.get_one::<String>("amount-col").cloned(),
        debit: sub.get_one::<String>("debit-col").cloned(),
        credit: sub.get_one::<String>("credit-col").cloned(),
        direction: sub.get_one::<String>("type-col").cloned(),
        category: sub.get_one::<String>("category-col").cloned(),
        account: sub.get_one::<String>("account-col").cloned(),
    };
    let selected = sub.get_one::<String>("account").map(String::as_str);
    if let Some(id) = selected {
        if tracker.account(id).is_none() {
            bail!("Account {} not found", id);
        }
    }
    let file = fs::File::open(path).with_context(|| format!("Open CSV {}", path))?;
    let rows = rows_from_csv(file, &mapping, selected)?;
    debug!("read {} rows from {}", rows.len(), path);

    let mut request = ImportRequest::new(ImportOrigin::Manual, TxnSource::Csv, rows);
    request.currency = cfg.currency.trim().to_uppercase();
    request.embed_metadata_in_notes = cfg.embed_metadata_in_notes;
    let report = run_import(tracker, request);
    print_report(&report, sub)
}

/// Asks on stdin; an empty line gives up.
fn ask_password(prompt: PasswordPrompt) -> Option<String> {
    match prompt {
        PasswordPrompt::Required => {
            eprint!("This PDF is password-protected. Password (empty to cancel): ")
        }
        PasswordPrompt::Rejected { message } => eprint!("{} Password: ", message),
    }
    io::stderr().flush().ok()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).ok()?;
    let line = line.trim_end_matches(['\r', '\n']).to_string();
    (!line.is_empty()).then_some(line)
}

fn import_pdf<S: RecordStore>(
    tracker: &mut Tracker<S>,
    cfg: &Config,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let path = Path::new(sub.get_one::<String>("path").unwrap().trim());
    let doc = StatementDocument {
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        bytes: fs::read(path).with_context(|| format!("Read {}", path.display()))?,
    };
    doc.validate(cfg.max_pdf_bytes)?;

    let client = OracleClient::new(cfg)?;
    let password = sub.get_one::<String>("password").cloned();
    let extraction = extract_with_prompt(&client, &doc, password, ask_password)
        .map_err(|e| anyhow!("{} ({})", e.user_message(), e))?;
    let statement = rows_from_extraction(&extraction);

    if sub.get_flag("dry-run") {
        let rows = statement
            .rows
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.description.clone(),
                    r.amount.clone(),
                    r.direction.clone().unwrap_or_default(),
                    r.category.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Date", "Description", "Amount", "Type", "Category"], rows)
        );
        for d in &statement.detected {
            println!("Detected account '{}' opening at {}", d.name, d.opening_balance);
        }
        return Ok(());
    }

    let mut request = ImportRequest::new(ImportOrigin::Oracle, TxnSource::Pdf, statement.rows);
    if sub.get_flag("create-detected") {
        request.create = statement.detected.iter().map(|d| d.placeholder.clone()).collect();
    }
    request.detected = statement.detected;
    request.default_account = sub.get_one::<String>("default-account").cloned();
    request.currency = cfg.currency.trim().to_uppercase();
    request.embed_metadata_in_notes = cfg.embed_metadata_in_notes;
    let report = run_import(tracker, request);
    print_report(&report, sub)
}

fn split_messages(raw: &str) -> Vec<String> {
    raw.split("\n\n")
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

fn import_inbox<S: RecordStore>(
    tracker: &mut Tracker<S>,
    cfg: &Config,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let path = sub.get_one::<String>("path").unwrap().trim();
    let account = sub.get_one::<String>("account").unwrap();
    if tracker.account(account).is_none() {
        bail!("Account {} not found", account);
    }
    let raw = fs::read_to_string(path).with_context(|| format!("Read {}", path))?;
    let messages = split_messages(&raw.replace("\r\n", "\n"));

    let client = OracleClient::new(cfg)?;
    let rows = rows_from_inbox(&client, &messages, account);
    println!("{} of {} messages held a transaction", rows.len(), messages.len());

    let mut request = ImportRequest::new(ImportOrigin::Oracle, TxnSource::Gmail, rows);
    request.default_account = Some(account.clone());
    request.currency = cfg.currency.trim().to_uppercase();
    let report = run_import(tracker, request);
    print_report(&report, sub)
}
