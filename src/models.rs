// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::LedgerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Income,
    #[default]
    Expense,
}

impl TxKind {
    pub const ALL: [TxKind; 2] = [TxKind::Income, TxKind::Expense];

    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Income => "income",
            TxKind::Expense => "expense",
        }
    }
}

impl FromStr for TxKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TxKind::Income),
            "expense" => Ok(TxKind::Expense),
            other => Err(LedgerError::validation(format!(
                "Unknown transaction type '{}' (use income|expense)",
                other
            ))),
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Fuel,
    Food,
    Entertainment,
    Medical,
    Transportation,
    LoanEmi,
    Shopping,
    Utilities,
    Education,
    #[default]
    Others,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Fuel,
        Category::Food,
        Category::Entertainment,
        Category::Medical,
        Category::Transportation,
        Category::LoanEmi,
        Category::Shopping,
        Category::Utilities,
        Category::Education,
        Category::Others,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Fuel => "fuel",
            Category::Food => "food",
            Category::Entertainment => "entertainment",
            Category::Medical => "medical",
            Category::Transportation => "transportation",
            Category::LoanEmi => "loan_emi",
            Category::Shopping => "shopping",
            Category::Utilities => "utilities",
            Category::Education => "education",
            Category::Others => "others",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Fuel => "Fuel",
            Category::Food => "Food",
            Category::Entertainment => "Entertainment",
            Category::Medical => "Medical",
            Category::Transportation => "Transportation",
            Category::LoanEmi => "Loan/EMI",
            Category::Shopping => "Shopping",
            Category::Utilities => "Utilities",
            Category::Education => "Education",
            Category::Others => "Others",
        }
    }
}

impl FromStr for Category {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| LedgerError::validation(format!("Unknown category '{}'", s.trim())))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Division {
    #[default]
    Personal,
    Office,
}

impl Division {
    pub fn as_str(&self) -> &'static str {
        match self {
            Division::Personal => "personal",
            Division::Office => "office",
        }
    }
}

impl FromStr for Division {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "personal" => Ok(Division::Personal),
            "office" => Ok(Division::Office),
            other => Err(LedgerError::validation(format!(
                "Unknown division '{}' (use personal|office)",
                other
            ))),
        }
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single ledger entry as returned by a ledger source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TxKind,
    pub amount: Decimal,
    pub description: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub division: Division,
    /// When the transaction took effect; user editable.
    #[serde(rename = "date")]
    pub occurred_at: DateTime<Utc>,
    /// Record creation time; only the edit-window policy reads it.
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(
        rename = "account",
        default,
        deserialize_with = "account_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub account_id: Option<String>,
}

impl Transaction {
    /// Amount with its sign applied, for display.
    pub fn signed_amount(&self) -> String {
        match self.kind {
            TxKind::Income => format!("+{}", self.amount.round_dp(2)),
            TxKind::Expense => format!("-{}", self.amount.round_dp(2)),
        }
    }
}

// The backend sends either the bare account id or the populated account document.
fn account_ref<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum AccountRef {
        Id(String),
        Doc {
            #[serde(rename = "_id", alias = "id")]
            id: String,
        },
    }

    Ok(Option::<AccountRef>::deserialize(de)?.map(|r| match r {
        AccountRef::Id(id) => id,
        AccountRef::Doc { id } => id,
    }))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub r#type: Option<String>,
    #[serde(default)]
    pub balance: Option<Decimal>,
}
