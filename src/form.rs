// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Local validation of transaction and transfer forms.
//!
//! Nothing here performs I/O: a form either becomes a payload ready for the
//! ledger source or a [`LedgerError::Validation`].

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::LedgerError;
use crate::models::{Category, Division, Transaction, TxKind};

/// Raw form fields as the user typed them. `date` and `time` are edited
/// independently and only combined by [`TransactionForm::validate_in`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionForm {
    pub kind: TxKind,
    pub amount: String,
    pub description: String,
    pub category: Category,
    pub division: Division,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`, blank means midnight
    pub time: String,
    pub account: String,
}

/// Validated payload for create/update calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionInput {
    #[serde(rename = "type")]
    pub kind: TxKind,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub description: String,
    pub category: Category,
    pub division: Division,
    #[serde(rename = "date")]
    pub occurred_at: DateTime<Utc>,
    #[serde(rename = "account")]
    pub account_id: String,
}

impl TransactionForm {
    /// Blank form dated `now` in `tz`.
    pub fn blank_at<Tz: TimeZone>(now: DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        TransactionForm {
            date: now.format("%Y-%m-%d").to_string(),
            time: now.format("%H:%M").to_string(),
            ..Default::default()
        }
    }

    /// Prefilled from an existing record, its date/time shown in `tz`.
    pub fn from_transaction_in<Tz: TimeZone>(tx: &Transaction, tz: &Tz) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        let local = tx.occurred_at.with_timezone(tz);
        TransactionForm {
            kind: tx.kind,
            amount: tx.amount.to_string(),
            description: tx.description.clone(),
            category: tx.category,
            division: tx.division,
            date: local.format("%Y-%m-%d").to_string(),
            time: local.format("%H:%M").to_string(),
            account: tx.account_id.clone().unwrap_or_default(),
        }
    }

    pub fn from_transaction(tx: &Transaction) -> Self {
        Self::from_transaction_in(tx, &Local)
    }

    /// Validates the form and combines date and time, read in `tz`.
    pub fn validate_in<Tz: TimeZone>(&self, tz: &Tz) -> Result<TransactionInput, LedgerError> {
        let amount = parse_positive_amount(&self.amount)?;
        let description = self.description.trim();
        if description.is_empty() {
            return Err(LedgerError::validation("Description is required"));
        }
        let account = self.account.trim();
        if account.is_empty() {
            return Err(LedgerError::validation("Account is required"));
        }
        let naive = combine_date_time(&self.date, &self.time)?;
        let occurred_at = tz
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| {
                LedgerError::validation(format!("'{}' does not exist in the local timezone", naive))
            })?
            .with_timezone(&Utc);

        Ok(TransactionInput {
            kind: self.kind,
            amount,
            description: description.to_string(),
            category: self.category,
            division: self.division,
            occurred_at,
            account_id: account.to_string(),
        })
    }

    pub fn validate(&self) -> Result<TransactionInput, LedgerError> {
        self.validate_in(&Local)
    }
}

pub fn parse_positive_amount(s: &str) -> Result<Decimal, LedgerError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(LedgerError::validation("Amount is required"));
    }
    let amount = s
        .parse::<Decimal>()
        .map_err(|_| LedgerError::validation(format!("Invalid amount '{}'", s)))?;
    if amount <= Decimal::ZERO {
        return Err(LedgerError::validation("Amount must be greater than zero"));
    }
    Ok(amount)
}

/// Joins a `YYYY-MM-DD` date with an `HH:MM[:SS]` time; blank time is midnight.
pub fn combine_date_time(date: &str, time: &str) -> Result<NaiveDateTime, LedgerError> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| {
        LedgerError::validation(format!("Invalid date '{}', expected YYYY-MM-DD", date.trim()))
    })?;
    let time = time.trim();
    let time = if time.is_empty() {
        NaiveTime::MIN
    } else {
        NaiveTime::parse_from_str(time, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
            .map_err(|_| {
                LedgerError::validation(format!("Invalid time '{}', expected HH:MM", time))
            })?
    };
    Ok(date.and_time(time))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransferForm {
    pub from_account: String,
    pub to_account: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub from_account_id: String,
    pub to_account_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

impl TransferForm {
    pub fn validate(&self) -> Result<TransferRequest, LedgerError> {
        let from = self.from_account.trim();
        let to = self.to_account.trim();
        if from.is_empty() || to.is_empty() || self.amount.trim().is_empty() {
            return Err(LedgerError::validation("Please fill all required fields"));
        }
        if from == to {
            return Err(LedgerError::validation("Cannot transfer to the same account"));
        }
        let amount = parse_positive_amount(&self.amount)?;
        Ok(TransferRequest {
            from_account_id: from.to_string(),
            to_account_id: to.to_string(),
            amount,
        })
    }
}
