// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{
    ExtractedTransaction, Extraction, InsightService, MessageParser, StatementDocument,
    StatementOracle, interpret_response,
};
use crate::config::Config;
use crate::error::OracleError;
use crate::models::Transaction;
use crate::utils::http_client;
use anyhow::Result;
use log::{debug, info};
use reqwest::blocking::multipart::{Form, Part};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

/// HTTP client for the extraction backend.
pub struct OracleClient {
    base_url: String,
    max_text_chars: usize,
    client: reqwest::blocking::Client,
}

impl OracleClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        Ok(Self {
            base_url: cfg.oracle_url.trim_end_matches('/').to_string(),
            max_text_chars: cfg.max_text_chars,
            // model calls are slow; one generous timeout, no retries
            client: http_client(120)?,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl StatementOracle for OracleClient {
    fn extract(
        &self,
        doc: &StatementDocument,
        password: Option<&str>,
    ) -> Result<Extraction, OracleError> {
        info!("uploading {} ({} bytes) for extraction", doc.file_name, doc.bytes.len());
        let part = Part::bytes(doc.bytes.clone())
            .file_name(doc.file_name.clone())
            .mime_str("application/pdf")?;
        let mut form = Form::new().part("file", part);
        if let Some(pw) = password.filter(|p| !p.trim().is_empty()) {
            form = form.text("password", pw.to_string());
        }
        let resp = self
            .client
            .post(self.url("/api/pdf/parse"))
            .multipart(form)
            .send()?;
        let status = resp.status().as_u16();
        let body = resp.text()?;
        debug!("extraction service answered {}", status);
        interpret_response(status, &body)
    }
}

#[derive(Deserialize)]
struct InsightReply {
    #[serde(alias = "advice", alias = "text")]
    insights: String,
}

impl InsightService for OracleClient {
    fn generate(&self, recent: &[Transaction], balance: Decimal) -> Result<String, OracleError> {
        let resp = self
            .client
            .post(self.url("/api/insights"))
            .json(&json!({ "transactions": recent, "balance": balance }))
            .send()?;
        let status = resp.status();
        let body = resp.text()?;
        if !status.is_success() {
            return Err(OracleError::Service {
                code: status.as_u16().to_string(),
                message: body.chars().take(200).collect(),
            });
        }
        // the endpoint may answer with bare markdown
        Ok(match serde_json::from_str::<InsightReply>(&body) {
            Ok(reply) => reply.insights,
            Err(_) => body,
        })
    }
}

#[derive(Deserialize)]
struct MessageReply {
    #[serde(default)]
    transaction: Option<ExtractedTransaction>,
}

impl MessageParser for OracleClient {
    fn parse_message(&self, raw: &str) -> Result<Option<ExtractedTransaction>, OracleError> {
        let text: String = raw.chars().take(self.max_text_chars).collect();
        let resp = self
            .client
            .post(self.url("/api/email/parse"))
            .json(&json!({ "text": text }))
            .send()?;
        let status = resp.status();
        let body = resp.text()?;
        if !status.is_success() {
            return Err(OracleError::Service {
                code: status.as_u16().to_string(),
                message: body.chars().take(200).collect(),
            });
        }
        let reply: MessageReply = serde_json::from_str(&body)
            .map_err(|e| OracleError::Malformed(format!("message parse reply: {}", e)))?;
        Ok(reply.transaction)
    }
}
