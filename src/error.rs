// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Message shown when an edit is attempted after the edit window closed.
pub const LOCKED_MESSAGE: &str = "Transactions can only be edited within 12 hours of creation";

/// Errors surfaced by the ledger engine and its sources.
///
/// None of these are fatal: the view stays usable after any of them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Rejected locally before any network call.
    #[error("{0}")]
    Validation(String),
    /// Edit attempted outside the edit window. Never conflated with `Validation`.
    #[error("{}", LOCKED_MESSAGE)]
    Locked { id: String },
    /// Failure reported by (or while talking to) the ledger source.
    #[error("{message}")]
    Remote {
        status: Option<u16>,
        message: String,
    },
    #[error("Operation not supported by this ledger source: {0}")]
    Unsupported(&'static str),
    /// Local SQLite store failure.
    #[error("Local store error: {0}")]
    Store(String),
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        LedgerError::Validation(msg.into())
    }

    /// Server message verbatim when present, otherwise `fallback`.
    pub fn remote(status: Option<u16>, message: Option<String>, fallback: &str) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());
        LedgerError::Remote { status, message }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, LedgerError::Locked { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, LedgerError::Validation(_))
    }
}

impl From<rusqlite::Error> for LedgerError {
    fn from(e: rusqlite::Error) -> Self {
        LedgerError::Store(e.to_string())
    }
}
