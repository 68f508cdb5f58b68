// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Local fallback state used when the record store cannot take a write.
//!
//! Entries are keyed by user. Cached custom categories are pushed into the store
//! once; a persisted per-user flag marks that migration as done.

use crate::error::StoreError;
use crate::models::CustomCategory;
use crate::store::RecordStore;
use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CacheState {
    custom_categories: BTreeMap<String, Vec<String>>,
    migrated_users: BTreeSet<String>,
}

#[derive(Debug, Default)]
pub struct LocalCache {
    path: Option<PathBuf>,
    state: CacheState,
}

impl LocalCache {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens (or starts) a cache file. A missing file is an empty cache.
    pub fn open(path: PathBuf) -> Result<Self> {
        let state = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("Read cache {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Invalid cache file {}", path.display()))?
        } else {
            CacheState::default()
        };
        Ok(Self {
            path: Some(path),
            state,
        })
    }

    pub fn categories(&self, user: &str) -> &[String] {
        self.state
            .custom_categories
            .get(user)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_migrated(&self, user: &str) -> bool {
        self.state.migrated_users.contains(user)
    }

    /// Returns false when the name was already cached.
    pub fn remember_category(&mut self, user: &str, name: &str) -> bool {
        let names = self
            .state
            .custom_categories
            .entry(user.to_string())
            .or_default();
        if names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
            return false;
        }
        names.push(name.to_string());
        // a fresh entry needs another migration pass
        self.state.migrated_users.remove(user);
        self.flush();
        true
    }

    /// Pushes cached categories into the store once per user. Duplicates in the
    /// store count as migrated; any other failure leaves the flag unset so the
    /// next load tries again.
    pub fn migrate_into<S: RecordStore>(&mut self, store: &S) -> Result<usize, StoreError> {
        let Some(user) = store.user_id().map(str::to_string) else {
            return Ok(0);
        };
        if self.is_migrated(&user) {
            return Ok(0);
        }
        let mut pushed = 0;
        for name in self.categories(&user).to_vec() {
            let record = CustomCategory {
                id: String::new(),
                name,
            };
            match store.create(&record) {
                Ok(_) => pushed += 1,
                Err(e) if e.is_constraint() => {}
                Err(e) => return Err(e),
            }
        }
        self.state.migrated_users.insert(user.clone());
        self.flush();
        info!("migrated {} cached categories for {}", pushed, user);
        Ok(pushed)
    }

    fn flush(&self) {
        let Some(path) = &self.path else {
            return;
        };
        let write = || -> Result<()> {
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)?;
            }
            fs::write(path, serde_json::to_string_pretty(&self.state)?)?;
            Ok(())
        };
        if let Err(e) = write() {
            warn!("could not write local cache {}: {:#}", path.display(), e);
        }
    }
}
