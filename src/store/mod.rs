// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Typed CRUD facade over the record store.
//!
//! Every entity lives in one [`Collection`] with a fixed stored schema. Records
//! cross the boundary as JSON: serialized in the application's naming, translated
//! by [`crate::casing`], then trimmed to the collection's columns. Anything not in
//! the schema (a client-side id, `metadata`, display-only fields) never reaches
//! the store.

mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::StoreError;
use crate::models::{Account, Budget, CustomCategory, FuelLog, Investment, Transaction, Vehicle};
use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Accounts,
    Transactions,
    Budgets,
    Vehicles,
    FuelLogs,
    Investments,
    CustomCategories,
}

impl Collection {
    pub fn table(self) -> &'static str {
        match self {
            Collection::Accounts => "accounts",
            Collection::Transactions => "transactions",
            Collection::Budgets => "budgets",
            Collection::Vehicles => "vehicles",
            Collection::FuelLogs => "fuel_logs",
            Collection::Investments => "investments",
            Collection::CustomCategories => "custom_categories",
        }
    }

    /// Stored columns in store naming, excluding `id` and `user_id`.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Collection::Accounts => &[
                "name",
                "bank_name",
                "type",
                "balance",
                "currency",
                "credit_limit",
                "due_date",
            ],
            Collection::Transactions => &[
                "date",
                "amount",
                "type",
                "category",
                "description",
                "account_id",
                "source",
                "notes",
            ],
            Collection::Budgets => &["category", "limit", "period"],
            Collection::Vehicles => &[
                "name",
                "make",
                "model",
                "year",
                "license_plate",
                "type",
                "mileage",
            ],
            Collection::FuelLogs => &[
                "vehicle_id",
                "account_id",
                "date",
                "liters",
                "cost",
                "mileage",
            ],
            Collection::Investments => &[
                "name",
                "type",
                "invested_amount",
                "current_value",
                "quantity",
                "date",
            ],
            Collection::CustomCategories => &["name"],
        }
    }
}

pub trait Entity: Serialize + DeserializeOwned + Clone {
    const COLLECTION: Collection;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
}

macro_rules! entity {
    ($ty:ty, $collection:expr) => {
        impl Entity for $ty {
            const COLLECTION: Collection = $collection;

            fn id(&self) -> &str {
                &self.id
            }

            fn set_id(&mut self, id: String) {
                self.id = id;
            }
        }
    };
}

entity!(Account, Collection::Accounts);
entity!(Transaction, Collection::Transactions);
entity!(Budget, Collection::Budgets);
entity!(Vehicle, Collection::Vehicles);
entity!(FuelLog, Collection::FuelLogs);
entity!(Investment, Collection::Investments);
entity!(CustomCategory, Collection::CustomCategories);

/// Store operations, implicitly scoped to the signed-in user.
///
/// Reads without a session return empty collections; writes without one fail
/// with [`StoreError::Unauthenticated`]. Nothing is retried.
pub trait RecordStore {
    fn user_id(&self) -> Option<&str>;

    fn fetch_all<E: Entity>(&self) -> Result<Vec<E>, StoreError>;

    /// Writes a new record and returns the store-assigned id. Callers must
    /// replace any optimistic local id with it.
    fn create<E: Entity>(&self, entity: &E) -> Result<String, StoreError>;

    fn update<E: Entity>(&self, entity: &E) -> Result<(), StoreError>;

    fn delete<E: Entity>(&self, id: &str) -> Result<(), StoreError>;

    fn delete_all<E: Entity>(&self) -> Result<(), StoreError>;
}

/// Serializes an entity into a store-named column map, dropping the id and
/// every field outside the collection schema.
pub fn to_row<E: Entity>(
    entity: &E,
) -> Result<serde_json::Map<String, serde_json::Value>, StoreError> {
    let value = crate::casing::to_store(serde_json::to_value(entity)?);
    let serde_json::Value::Object(mut fields) = value else {
        return Err(StoreError::Backend(format!(
            "{} record did not serialize to an object",
            E::COLLECTION.table()
        )));
    };
    let columns = E::COLLECTION.columns();
    fields.retain(|k, _| columns.contains(&k.as_str()));
    Ok(fields)
}

/// Inverse of [`to_row`]: `id` plus store-named columns back into an entity.
pub fn from_row<E: Entity>(
    id: String,
    mut fields: serde_json::Map<String, serde_json::Value>,
) -> Result<E, StoreError> {
    fields.insert("id".into(), serde_json::Value::String(id));
    let value = crate::casing::to_app(serde_json::Value::Object(fields));
    Ok(serde_json::from_value(value)?)
}
