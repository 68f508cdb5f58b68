// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_CURRENCY: &str = "INR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    Checking,
    Savings,
    CreditCard,
    Wallet,
    Investment,
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace([' ', '-', '_'], "").as_str() {
            "checking" => Ok(Self::Checking),
            "savings" => Ok(Self::Savings),
            "creditcard" => Ok(Self::CreditCard),
            "wallet" => Ok(Self::Wallet),
            "investment" => Ok(Self::Investment),
            other => Err(format!("Unknown account type '{}'", other)),
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Checking => "Checking",
            Self::Savings => "Savings",
            Self::CreditCard => "CreditCard",
            Self::Wallet => "Wallet",
            Self::Investment => "Investment",
        };
        f.write_str(s)
    }
}

/// A money-holding account. Credit cards carry negative balances for amounts owed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub bank_name: String,
    #[serde(rename = "type")]
    pub kind: AccountType,
    pub balance: Decimal,
    pub currency: String,
    #[serde(default)]
    pub credit_limit: Option<Decimal>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl Account {
    pub fn new(name: &str, bank_name: &str, kind: AccountType, balance: Decimal) -> Self {
        Self {
            id: String::new(),
            name: name.to_string(),
            bank_name: bank_name.to_string(),
            kind,
            balance,
            currency: DEFAULT_CURRENCY.to_string(),
            credit_limit: None,
            due_date: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxnType {
    Income,
    Expense,
}

impl FromStr for TxnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(format!("Unknown transaction type '{}'", other)),
        }
    }
}

impl fmt::Display for TxnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => f.write_str("Income"),
            Self::Expense => f.write_str("Expense"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxnSource {
    Manual,
    Gmail,
    Csv,
    Pdf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelMetadata {
    pub vehicle_id: String,
    pub liters: Decimal,
    pub odometer: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentMetadata {
    pub investment_id: String,
    #[serde(default)]
    pub units: Option<Decimal>,
    #[serde(default)]
    pub price: Option<Decimal>,
}

/// Domain linkage carried by a transaction. Never written to the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TxnMetadata {
    #[default]
    None,
    Fuel(FuelMetadata),
    Investment(InvestmentMetadata),
}

impl TxnMetadata {
    pub fn is_none(&self) -> bool {
        matches!(self, TxnMetadata::None)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default)]
    pub id: String,
    pub date: NaiveDate,
    /// Always a positive magnitude; direction lives in `kind`.
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TxnType,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub account_id: String,
    #[serde(default)]
    pub source: Option<TxnSource>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "TxnMetadata::is_none")]
    pub metadata: TxnMetadata,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    #[default]
    Monthly,
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("monthly")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    #[serde(default)]
    pub id: String,
    pub category: String,
    pub limit: Decimal,
    #[serde(default)]
    pub period: BudgetPeriod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub license_plate: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Last known odometer reading; advisory only.
    #[serde(default)]
    pub mileage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelLog {
    #[serde(default)]
    pub id: String,
    pub vehicle_id: String,
    /// Wallet the fill was paid from, when known.
    #[serde(default)]
    pub account_id: Option<String>,
    pub date: NaiveDate,
    pub liters: Decimal,
    pub cost: Decimal,
    pub mileage: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvestmentType {
    Stocks,
    Funds,
    Bonds,
    Gold,
    Fd,
    Crypto,
    Other,
}

impl FromStr for InvestmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stocks" => Ok(Self::Stocks),
            "funds" => Ok(Self::Funds),
            "bonds" => Ok(Self::Bonds),
            "gold" => Ok(Self::Gold),
            "fd" => Ok(Self::Fd),
            "crypto" => Ok(Self::Crypto),
            "other" => Ok(Self::Other),
            other => Err(format!("Unknown investment type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: InvestmentType,
    pub invested_amount: Decimal,
    pub current_value: Decimal,
    #[serde(default)]
    pub quantity: Option<Decimal>,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomCategory {
    #[serde(default)]
    pub id: String,
    pub name: String,
}
