// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{Entity, RecordStore, from_row, to_row};
use crate::db::Session;
use crate::error::StoreError;
use log::debug;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{Connection, params, params_from_iter};
use serde_json::{Map, Number, Value};

/// Record store backed by the local SQLite database. Every row carries the
/// owning `user_id`; all statements filter on it.
pub struct SqliteStore<'c> {
    conn: &'c Connection,
    session: Option<Session>,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection, session: Option<Session>) -> Self {
        Self { conn, session }
    }

    fn require_user(&self) -> Result<&str, StoreError> {
        self.session
            .as_ref()
            .map(|s| s.user_id.as_str())
            .ok_or(StoreError::Unauthenticated)
    }
}

fn quoted(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ")
}

fn json_to_sql(value: Option<&Value>) -> SqlValue {
    match value {
        None | Some(Value::Null) => SqlValue::Null,
        Some(Value::Bool(b)) => SqlValue::Integer(i64::from(*b)),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Some(Value::String(s)) => SqlValue::Text(s.clone()),
        Some(nested) => SqlValue::Text(nested.to_string()),
    }
}

fn sql_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(t) | ValueRef::Blob(t) => {
            Value::String(String::from_utf8_lossy(t).into_owned())
        }
    }
}

fn parse_id<E: Entity>(id: &str) -> Result<i64, StoreError> {
    id.trim().parse::<i64>().map_err(|_| StoreError::NotFound {
        collection: E::COLLECTION.table(),
        id: id.to_string(),
    })
}

impl RecordStore for SqliteStore<'_> {
    fn user_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.user_id.as_str())
    }

    fn fetch_all<E: Entity>(&self) -> Result<Vec<E>, StoreError> {
        let Some(user) = self.user_id() else {
            return Ok(Vec::new());
        };
        let collection = E::COLLECTION;
        let columns = collection.columns();
        let sql = format!(
            "SELECT id, {} FROM {} WHERE user_id=?1 ORDER BY id",
            quoted(columns),
            collection.table()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![user])?;
        let mut out = Vec::new();
        while let Some(r) = rows.next()? {
            let id: i64 = r.get(0)?;
            let mut fields = Map::with_capacity(columns.len());
            for (idx, col) in columns.iter().enumerate() {
                fields.insert((*col).to_string(), sql_to_json(r.get_ref(idx + 1)?));
            }
            out.push(from_row::<E>(id.to_string(), fields)?);
        }
        Ok(out)
    }

    fn create<E: Entity>(&self, entity: &E) -> Result<String, StoreError> {
        let user = self.require_user()?;
        let collection = E::COLLECTION;
        let columns = collection.columns();
        let row = to_row(entity)?;
        let placeholders = (2..=columns.len() + 1)
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {}(user_id, {}) VALUES (?1, {})",
            collection.table(),
            quoted(columns),
            placeholders
        );
        let mut values = vec![SqlValue::Text(user.to_string())];
        values.extend(columns.iter().map(|c| json_to_sql(row.get(*c))));
        self.conn.execute(&sql, params_from_iter(values))?;
        let id = self.conn.last_insert_rowid().to_string();
        debug!("created {} record {}", collection.table(), id);
        Ok(id)
    }

    fn update<E: Entity>(&self, entity: &E) -> Result<(), StoreError> {
        let user = self.require_user()?;
        let collection = E::COLLECTION;
        let columns = collection.columns();
        let id = parse_id::<E>(entity.id())?;
        let row = to_row(entity)?;
        let assignments = columns
            .iter()
            .enumerate()
            .map(|(i, c)| format!("\"{}\"=?{}", c, i + 3))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {} WHERE id=?1 AND user_id=?2",
            collection.table(),
            assignments
        );
        let mut values = vec![SqlValue::Integer(id), SqlValue::Text(user.to_string())];
        values.extend(columns.iter().map(|c| json_to_sql(row.get(*c))));
        let changed = self.conn.execute(&sql, params_from_iter(values))?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                collection: collection.table(),
                id: entity.id().to_string(),
            });
        }
        Ok(())
    }

    fn delete<E: Entity>(&self, id: &str) -> Result<(), StoreError> {
        let user = self.require_user()?;
        let collection = E::COLLECTION;
        let row_id = parse_id::<E>(id)?;
        let sql = format!("DELETE FROM {} WHERE id=?1 AND user_id=?2", collection.table());
        let changed = self.conn.execute(&sql, params![row_id, user])?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                collection: collection.table(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    fn delete_all<E: Entity>(&self) -> Result<(), StoreError> {
        let user = self.require_user()?;
        let sql = format!("DELETE FROM {} WHERE user_id=?1", E::COLLECTION.table());
        self.conn.execute(&sql, params![user])?;
        Ok(())
    }
}
