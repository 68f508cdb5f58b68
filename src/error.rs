// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Failures surfaced by a [`crate::store::RecordStore`]. Never retried.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not signed in: no active session")]
    Unauthenticated,
    #[error("{collection} record '{id}' not found")]
    NotFound { collection: &'static str, id: String },
    #[error("constraint violated: {0}")]
    Constraint(String),
    #[error("store error: {0}")]
    Backend(String),
    #[error("record (de)serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_constraint(&self) -> bool {
        matches!(self, StoreError::Constraint(_))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(code, msg)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::Constraint(msg.unwrap_or_else(|| code.to_string()))
            }
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// Raised before any store call is made.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
    #[error("no file selected")]
    EmptyFileName,
    #[error("file must be a PDF")]
    NotPdf,
    #[error("file is empty")]
    EmptyFile,
    #[error("file is {size} bytes, larger than the {max} byte limit")]
    TooLarge { size: usize, max: usize },
}

/// Outcomes of the statement-extraction service that the caller must tell apart.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("statement is password protected")]
    PasswordRequired,
    #[error("statement password rejected")]
    InvalidPassword,
    #[error("no readable text in the statement: {0}")]
    EmptyContent(String),
    #[error("could not parse extraction response: {0}")]
    Malformed(String),
    #[error("no transactions found in the statement")]
    NoTransactions,
    #[error("extraction service error {code}: {message}")]
    Service { code: String, message: String },
    #[error("extraction service unreachable: {0}")]
    Transport(String),
}

impl OracleError {
    /// Text shown to the user; each failure mode gets its own prompt.
    pub fn user_message(&self) -> &'static str {
        match self {
            OracleError::PasswordRequired => {
                "This PDF is password-protected. Please provide a password."
            }
            OracleError::InvalidPassword => "Invalid password. Please try again.",
            OracleError::EmptyContent(_) => "Could not extract text from PDF",
            OracleError::Malformed(_) => "Could not parse the statement. Please try another file.",
            OracleError::NoTransactions => "No transactions were found in this statement.",
            OracleError::Service { .. } => "The statement service failed. Please try again later.",
            OracleError::Transport(_) => {
                "Could not reach the statement service. Please try again later."
            }
        }
    }
}

impl From<reqwest::Error> for OracleError {
    fn from(err: reqwest::Error) -> Self {
        OracleError::Transport(err.to_string())
    }
}

/// Error for single-entity operations: either fully succeeds or surfaces one of these.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
