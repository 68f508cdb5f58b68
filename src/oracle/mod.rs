// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Remote AI-backed collaborators: statement extraction, insight text and
//! per-message transaction parsing. All of them are best-effort and nothing
//! here retries on its own.

mod client;

pub use client::OracleClient;

use crate::error::{OracleError, ValidationError};
use crate::models::Transaction;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const FALLBACK_INSIGHT: &str = "Unable to generate insights right now. \
Review your largest expense categories this month and compare them with your budgets.";

/// An uploaded statement file.
#[derive(Debug, Clone)]
pub struct StatementDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl StatementDocument {
    pub fn validate(&self, max_bytes: usize) -> Result<(), ValidationError> {
        if self.file_name.trim().is_empty() {
            return Err(ValidationError::EmptyFileName);
        }
        if !self.file_name.to_ascii_lowercase().ends_with(".pdf") {
            return Err(ValidationError::NotPdf);
        }
        if self.bytes.is_empty() {
            return Err(ValidationError::EmptyFile);
        }
        if self.bytes.len() > max_bytes {
            return Err(ValidationError::TooLarge {
                size: self.bytes.len(),
                max: max_bytes,
            });
        }
        Ok(())
    }
}

fn text_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(opt_text_or_number(d)?.unwrap_or_default())
}

fn opt_text_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(d)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected text or number, got {}",
            other
        ))),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedTransaction {
    #[serde(default, deserialize_with = "text_or_number")]
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub amount: String,
    /// Free text such as "Deposit", "Withdrawal", "Cr", "Dr".
    #[serde(default, alias = "type")]
    pub debit_or_credit: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "opt_text_or_number")]
    pub balance: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedAccount {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default, deserialize_with = "opt_text_or_number")]
    pub balance: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default, deserialize_with = "opt_text_or_number")]
    pub primary_balance: Option<String>,
    #[serde(default)]
    pub linked_accounts: Vec<LinkedAccount>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionQuality {
    #[serde(default)]
    pub confidence: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extraction {
    pub transactions: Vec<ExtractedTransaction>,
    #[serde(default)]
    pub account_info: AccountInfo,
    #[serde(default)]
    pub statement_period: Option<String>,
    #[serde(default)]
    pub extraction_quality: Option<ExtractionQuality>,
}

pub trait StatementOracle {
    fn extract(
        &self,
        doc: &StatementDocument,
        password: Option<&str>,
    ) -> Result<Extraction, OracleError>;
}

pub trait InsightService {
    /// Markdown advice for the given recent activity.
    fn generate(&self, recent: &[Transaction], balance: Decimal) -> Result<String, OracleError>;
}

pub trait MessageParser {
    /// At most one transaction per message; `None` when the message has none.
    fn parse_message(&self, raw: &str) -> Result<Option<ExtractedTransaction>, OracleError>;
}

static JSON_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[\s\S]*\}").expect("valid regex"));

/// Recovers the JSON object embedded in free model text (outermost braces).
pub fn parse_model_json(text: &str) -> Result<Value, OracleError> {
    let block = JSON_BLOCK
        .find(text)
        .ok_or_else(|| OracleError::Malformed("no JSON object in model output".into()))?;
    serde_json::from_str(block.as_str())
        .map_err(|e| OracleError::Malformed(format!("invalid JSON in model output: {}", e)))
}

/// Builds an [`Extraction`] from the payload's `data` member.
pub fn extraction_from_value(data: Value) -> Result<Extraction, OracleError> {
    let data = match data {
        Value::String(text) => parse_model_json(&text)?,
        other => other,
    };
    match data.get("transactions") {
        Some(Value::Array(_)) => {}
        Some(_) => return Err(OracleError::Malformed("'transactions' is not a list".into())),
        None => return Err(OracleError::Malformed("missing 'transactions'".into())),
    }
    let extraction: Extraction = serde_json::from_value(data)
        .map_err(|e| OracleError::Malformed(format!("unexpected extraction shape: {}", e)))?;
    if extraction.transactions.is_empty() {
        return Err(OracleError::NoTransactions);
    }
    Ok(extraction)
}

/// Maps the extraction endpoint's HTTP status and body onto the failure taxonomy.
pub fn interpret_response(status: u16, body: &str) -> Result<Extraction, OracleError> {
    let payload: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) if (200..300).contains(&status) => {
            return Err(OracleError::Malformed(format!("response is not JSON: {}", e)));
        }
        Err(_) => {
            return Err(OracleError::Service {
                code: status.to_string(),
                message: body.chars().take(200).collect(),
            });
        }
    };

    if let Some(code) = payload.get("error").and_then(Value::as_str) {
        let message = payload
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or(code)
            .to_string();
        return Err(match code {
            "PDF_PASSWORD_REQUIRED" => OracleError::PasswordRequired,
            "PDF_INVALID_PASSWORD" => OracleError::InvalidPassword,
            "EXTRACTION_FAILED" => OracleError::EmptyContent(message),
            "FORMAT_FAILED" | "PARSE_FAILED" | "PARSE_ERROR" => OracleError::Malformed(message),
            other => OracleError::Service {
                code: other.to_string(),
                message,
            },
        });
    }

    if !(200..300).contains(&status) {
        return Err(OracleError::Service {
            code: status.to_string(),
            message: "unexpected response".into(),
        });
    }

    let data = payload
        .get("data")
        .cloned()
        .ok_or_else(|| OracleError::Malformed("missing 'data'".into()))?;
    let extraction = extraction_from_value(data)?;
    info!(
        "statement extraction returned {} transactions",
        extraction.transactions.len()
    );
    Ok(extraction)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordPrompt {
    /// The statement is encrypted and no password was given.
    Required,
    /// The last password was rejected; show the message and ask again.
    Rejected { message: &'static str },
}

/// Runs an extraction, asking `prompt` for a password whenever the service
/// needs one. The prompt returning `None` ends the attempt with the last
/// password error. Every other failure is terminal.
pub fn extract_with_prompt<O, F>(
    oracle: &O,
    doc: &StatementDocument,
    initial_password: Option<String>,
    mut prompt: F,
) -> Result<Extraction, OracleError>
where
    O: StatementOracle + ?Sized,
    F: FnMut(PasswordPrompt) -> Option<String>,
{
    let mut password = initial_password;
    loop {
        let asked = match oracle.extract(doc, password.as_deref()) {
            Err(OracleError::PasswordRequired) => {
                (PasswordPrompt::Required, OracleError::PasswordRequired)
            }
            Err(OracleError::InvalidPassword) => (
                PasswordPrompt::Rejected {
                    message: OracleError::InvalidPassword.user_message(),
                },
                OracleError::InvalidPassword,
            ),
            other => return other,
        };
        match prompt(asked.0) {
            Some(next) => password = Some(next),
            None => return Err(asked.1),
        }
    }
}

/// Insight text, or [`FALLBACK_INSIGHT`] when the service fails.
pub fn insights_or_fallback<I: InsightService + ?Sized>(
    service: &I,
    recent: &[Transaction],
    balance: Decimal,
) -> String {
    match service.generate(recent, balance) {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => FALLBACK_INSIGHT.to_string(),
        Err(e) => {
            warn!("insight generation failed: {}", e);
            FALLBACK_INSIGHT.to_string()
        }
    }
}
