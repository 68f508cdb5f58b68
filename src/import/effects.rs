// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{InvestmentMetadata, Transaction, TxnMetadata};
use rust_decimal::Decimal;
use serde::Serialize;

/// Domain update derived from a transaction's metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SideEffect {
    Fuel {
        vehicle_id: String,
        liters: Decimal,
        odometer: u32,
    },
    Investment {
        investment_id: String,
        delta: Decimal,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedEffect {
    pub effect: SideEffect,
    /// Set when the update could not be stored.
    pub error: Option<String>,
}

pub fn is_fuel_category(category: &str) -> bool {
    category.trim().eq_ignore_ascii_case("fuel")
}

pub fn is_investment_category(category: &str) -> bool {
    let c = category.trim();
    c.eq_ignore_ascii_case("savings") || c.eq_ignore_ascii_case("investment")
}

/// `units * price` when both are present and positive, else the raw amount.
pub fn investment_delta(meta: &InvestmentMetadata, amount: Decimal) -> Decimal {
    match (meta.units, meta.price) {
        (Some(units), Some(price)) if units > Decimal::ZERO && price > Decimal::ZERO => {
            units * price
        }
        _ => amount,
    }
}

/// Metadata only counts when the category agrees with it: fuel linkage on a
/// Fuel row, investment linkage on a Savings/Investment row.
pub fn derive(txn: &Transaction) -> Option<SideEffect> {
    match &txn.metadata {
        TxnMetadata::None => None,
        TxnMetadata::Fuel(fuel) if is_fuel_category(&txn.category) => Some(SideEffect::Fuel {
            vehicle_id: fuel.vehicle_id.clone(),
            liters: fuel.liters,
            odometer: fuel.odometer,
        }),
        TxnMetadata::Investment(inv) if is_investment_category(&txn.category) => {
            Some(SideEffect::Investment {
                investment_id: inv.investment_id.clone(),
                delta: investment_delta(inv, txn.amount),
            })
        }
        TxnMetadata::Fuel(_) | TxnMetadata::Investment(_) => None,
    }
}
