// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::cache::LocalCache;
use crate::models::CustomCategory;
use crate::store::RecordStore;
use log::{debug, warn};

pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Food",
    "Groceries",
    "Transport",
    "Fuel",
    "Shopping",
    "Bills",
    "Rent",
    "Healthcare",
    "Education",
    "Entertainment",
    "Travel",
    "Salary",
    "Savings",
    "Investment",
    "Other",
];

pub const FALLBACK_CATEGORY: &str = "Other";

pub fn is_default_category(name: &str) -> bool {
    DEFAULT_CATEGORIES
        .iter()
        .any(|c| c.eq_ignore_ascii_case(name.trim()))
}

/// Returns the canonical spelling for default categories, the trimmed input otherwise.
pub fn canonical(name: &str) -> String {
    let trimmed = name.trim();
    DEFAULT_CATEGORIES
        .iter()
        .find(|c| c.eq_ignore_ascii_case(trimmed))
        .map(|c| c.to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// User-defined categories layered over the defaults.
#[derive(Debug, Default, Clone)]
pub struct CategoryRegistry {
    custom: Vec<String>,
}

impl CategoryRegistry {
    pub fn new(custom: impl IntoIterator<Item = String>) -> Self {
        let mut registry = Self::default();
        for name in custom {
            registry.insert_local(&name);
        }
        registry
    }

    pub fn contains(&self, name: &str) -> bool {
        is_default_category(name) || self.custom.iter().any(|c| c.eq_ignore_ascii_case(name.trim()))
    }

    pub fn custom(&self) -> &[String] {
        &self.custom
    }

    /// Defaults first, then custom names, no duplicates.
    pub fn all(&self) -> Vec<String> {
        let mut out: Vec<String> = DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect();
        for c in &self.custom {
            if !out.iter().any(|o| o.eq_ignore_ascii_case(c)) {
                out.push(c.clone());
            }
        }
        out
    }

    fn insert_local(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.custom.push(name.to_string());
        true
    }

    /// Makes sure a category is registered. Unknown names are persisted to the
    /// store the first time they are seen; a duplicate in the store is fine, any
    /// other failure falls back to the local cache. Returns true for a new name.
    pub fn ensure<S: RecordStore>(
        &mut self,
        store: &S,
        cache: &mut LocalCache,
        name: &str,
    ) -> bool {
        if !self.insert_local(name) {
            return false;
        }
        let name = name.trim();
        let record = CustomCategory {
            id: String::new(),
            name: name.to_string(),
        };
        match store.create(&record) {
            Ok(id) => debug!("registered custom category '{}' as {}", name, id),
            Err(e) if e.is_constraint() => debug!("custom category '{}' already stored", name),
            Err(e) => {
                warn!("could not store custom category '{}': {}; caching locally", name, e);
                if let Some(user) = store.user_id() {
                    cache.remember_category(user, name);
                }
            }
        }
        true
    }
}
