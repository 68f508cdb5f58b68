// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod budget;
pub mod cache;
pub mod casing;
pub mod categories;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod ledger;
pub mod models;
pub mod oracle;
pub mod store;
pub mod tracker;
pub mod utils;
