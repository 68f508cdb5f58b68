// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{Session, project_dirs};
use crate::models::DEFAULT_CURRENCY;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_ORACLE_URL: &str = "http://localhost:5000";
pub const DEFAULT_MAX_PDF_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_MAX_TEXT_CHARS: usize = 50_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Signed-in user; without one, reads come back empty and writes fail.
    pub user_id: Option<String>,
    pub oracle_url: String,
    pub max_pdf_bytes: usize,
    pub max_text_chars: usize,
    pub currency: String,
    /// Serialize vehicle/investment linkage into the notes of imported rows.
    pub embed_metadata_in_notes: bool,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_id: None,
            oracle_url: DEFAULT_ORACLE_URL.to_string(),
            max_pdf_bytes: DEFAULT_MAX_PDF_BYTES,
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            currency: DEFAULT_CURRENCY.to_string(),
            embed_metadata_in_notes: false,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.json"))
    }

    /// Loads `config.json` from the platform config dir (defaults when absent),
    /// then applies `FINTRACK_*` environment overrides.
    pub fn load() -> Result<Self> {
        let cfg = Self::load_from(&Self::path()?)?;
        Ok(cfg.with_overrides(|key| std::env::var(key).ok()))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Read config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("Failed to create config dir")?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("Write config {}", path.display()))
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(user) = lookup("FINTRACK_USER").filter(|s| !s.trim().is_empty()) {
            self.user_id = Some(user.trim().to_string());
        }
        if let Some(url) = lookup("FINTRACK_ORACLE_URL").filter(|s| !s.trim().is_empty()) {
            self.oracle_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(level) = lookup("FINTRACK_LOG").filter(|s| !s.trim().is_empty()) {
            self.log_level = level.trim().to_string();
        }
        self
    }

    pub fn session(&self) -> Option<Session> {
        self.user_id.as_deref().map(Session::new)
    }
}
