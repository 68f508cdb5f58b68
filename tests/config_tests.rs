// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use fintrack::cache::LocalCache;
use fintrack::config::{Config, DEFAULT_ORACLE_URL};
use fintrack::db::Session;
use std::collections::HashMap;
use tempfile::tempdir;

#[test]
fn missing_file_gives_defaults() {
    let dir = tempdir().unwrap();
    let cfg = Config::load_from(&dir.path().join("config.json")).unwrap();
    assert_eq!(cfg, Config::default());
    assert_eq!(cfg.oracle_url, DEFAULT_ORACLE_URL);
    assert_eq!(cfg.max_pdf_bytes, 10 * 1024 * 1024);
    assert!(cfg.session().is_none());
}

#[test]
fn partial_file_keeps_other_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"userId": "alice", "embedMetadataInNotes": true}"#).unwrap();
    let cfg = Config::load_from(&path).unwrap();
    assert_eq!(cfg.session(), Some(Session::new("alice")));
    assert!(cfg.embed_metadata_in_notes);
    assert_eq!(cfg.currency, "INR");
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");
    let cfg = Config {
        user_id: Some("bob".into()),
        max_text_chars: 10,
        ..Config::default()
    };
    cfg.save_to(&path).unwrap();
    assert_eq!(Config::load_from(&path).unwrap(), cfg);
}

#[test]
fn invalid_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{not json").unwrap();
    assert!(Config::load_from(&path).is_err());
}

#[test]
fn environment_overrides_apply_and_blank_values_are_ignored() {
    let env: HashMap<&str, &str> = [
        ("FINTRACK_USER", " carol "),
        ("FINTRACK_ORACLE_URL", "http://oracle:8080/"),
        ("FINTRACK_LOG", "   "),
    ]
    .into_iter()
    .collect();
    let cfg = Config::default().with_overrides(|k| env.get(k).map(|v| v.to_string()));
    assert_eq!(cfg.user_id.as_deref(), Some("carol"));
    assert_eq!(cfg.oracle_url, "http://oracle:8080");
    assert_eq!(cfg.log_level, "info");
}

#[test]
fn cache_dedups_and_persists_per_user() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cache.json");
    {
        let mut cache = LocalCache::open(path.clone()).unwrap();
        assert!(cache.remember_category("u1", "Pets"));
        assert!(!cache.remember_category("u1", "PETS"));
        assert!(cache.remember_category("u2", "Garden"));
    }
    let cache = LocalCache::open(path).unwrap();
    assert_eq!(cache.categories("u1"), ["Pets".to_string()]);
    assert_eq!(cache.categories("u2"), ["Garden".to_string()]);
    assert!(cache.categories("u3").is_empty());
}
