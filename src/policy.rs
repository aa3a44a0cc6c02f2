// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Duration, Utc};

use crate::error::LedgerError;
use crate::models::Transaction;

pub const EDIT_WINDOW_HOURS: i64 = 12;

pub fn edit_window() -> Duration {
    Duration::hours(EDIT_WINDOW_HOURS)
}

/// True while less than twelve hours have passed since creation.
pub fn can_edit(tx: &Transaction, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(tx.created_at) < edit_window()
}

/// Deletion is not time-boxed.
pub fn can_delete(_tx: &Transaction) -> bool {
    true
}

pub fn ensure_editable(tx: &Transaction, now: DateTime<Utc>) -> Result<(), LedgerError> {
    if can_edit(tx, now) {
        Ok(())
    } else {
        Err(LedgerError::Locked { id: tx.id.clone() })
    }
}

/// Time left before the record locks, `None` once locked.
pub fn time_until_lock(tx: &Transaction, now: DateTime<Utc>) -> Option<Duration> {
    let left = tx.created_at + edit_window() - now;
    (left > Duration::zero()).then_some(left)
}
