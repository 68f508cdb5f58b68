// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{FuelLog, Vehicle};
use crate::store::RecordStore;
use crate::tracker::Tracker;
use crate::utils::{maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::Result;
use rust_decimal::Decimal;

pub fn handle<S: RecordStore>(tracker: &mut Tracker<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let vehicle = Vehicle {
                id: String::new(),
                name: sub.get_one::<String>("name").unwrap().clone(),
                make: sub.get_one::<String>("make").unwrap().clone(),
                model: sub.get_one::<String>("model").unwrap().clone(),
                year: sub.get_one::<i32>("year").copied(),
                license_plate: sub.get_one::<String>("plate").unwrap().clone(),
                kind: sub.get_one::<String>("type").unwrap().clone(),
                mileage: *sub.get_one::<u32>("mileage").unwrap(),
            };
            let saved = tracker.add_vehicle(vehicle)?;
            println!("Added vehicle '{}' as {}", saved.name, saved.id);
        }
        Some(("list", sub)) => {
            let vehicles = tracker.vehicles();
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &vehicles)? {
                let data = vehicles
                    .iter()
                    .map(|v| {
                        vec![
                            v.id.clone(),
                            v.name.clone(),
                            format!("{} {}", v.make, v.model).trim().to_string(),
                            v.year.map(|y| y.to_string()).unwrap_or_default(),
                            v.license_plate.clone(),
                            v.mileage.to_string(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Id", "Name", "Model", "Year", "Plate", "Odometer"], data)
                );
            }
        }
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            tracker.delete_vehicle(id)?;
            println!("Removed vehicle {} and its fuel logs", id);
        }
        _ => {}
    }
    Ok(())
}

/// Distance per liter between consecutive fills, keyed on the later fill.
fn efficiency(logs: &[&FuelLog]) -> Vec<Option<Decimal>> {
    let mut out = Vec::with_capacity(logs.len());
    for (i, log) in logs.iter().enumerate() {
        let prev = i.checked_sub(1).map(|p| logs[p]);
        out.push(match prev {
            Some(p) if log.mileage > p.mileage && log.liters > Decimal::ZERO => {
                Some((Decimal::from(log.mileage - p.mileage) / log.liters).round_dp(2))
            }
            _ => None,
        });
    }
    out
}

pub fn handle_fuel<S: RecordStore>(tracker: &mut Tracker<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let log = FuelLog {
                id: String::new(),
                vehicle_id: sub.get_one::<String>("vehicle").unwrap().clone(),
                account_id: sub.get_one::<String>("account").cloned(),
                date: parse_date(sub.get_one::<String>("date").unwrap())?,
                liters: parse_decimal(sub.get_one::<String>("liters").unwrap())?,
                cost: parse_decimal(sub.get_one::<String>("cost").unwrap())?,
                mileage: *sub.get_one::<u32>("mileage").unwrap(),
            };
            let saved = tracker.add_fuel_log(log)?;
            println!("Logged {} L for vehicle {}", saved.liters, saved.vehicle_id);
        }
        Some(("list", sub)) => {
            let vehicle = sub.get_one::<String>("vehicle");
            let mut logs: Vec<&FuelLog> = tracker
                .fuel_logs()
                .iter()
                .filter(|f| vehicle.is_none_or(|v| &f.vehicle_id == v))
                .collect();
            logs.sort_by(|a, b| a.vehicle_id.cmp(&b.vehicle_id).then(a.date.cmp(&b.date)));
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &logs)? {
                let per_vehicle: Vec<Option<Decimal>> = logs
                    .chunk_by(|a, b| a.vehicle_id == b.vehicle_id)
                    .flat_map(efficiency)
                    .collect();
                let data = logs
                    .iter()
                    .zip(per_vehicle)
                    .map(|(f, eff)| {
                        vec![
                            f.vehicle_id.clone(),
                            f.date.to_string(),
                            f.liters.to_string(),
                            f.cost.to_string(),
                            f.mileage.to_string(),
                            eff.map(|e| e.to_string()).unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["Vehicle", "Date", "Liters", "Cost", "Odometer", "Km/L"],
                        data
                    )
                );
            }
        }
        _ => {}
    }
    Ok(())
}
