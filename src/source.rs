// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::LedgerError;
use crate::form::{TransactionInput, TransferRequest};
use crate::models::{Account, Transaction};
use crate::query::{Filters, Sort};

/// Parameters of one paged list call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub page: u32,
    pub limit: u32,
    pub sort: Sort,
    pub filters: Filters,
}

impl ListParams {
    /// Wire parameters: paging and sort always, filters only when set.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut out = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
            ("sortBy", self.sort.field.as_str().to_string()),
            ("sortOrder", self.sort.order.as_str().to_string()),
        ];
        out.extend(self.filters.to_params());
        out
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.max(1) - 1) * u64::from(self.limit)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListPage {
    pub records: Vec<Transaction>,
    pub total: u64,
}

/// A paged ledger the engine reads from and mutates through.
pub trait LedgerSource {
    fn list_transactions(&self, params: &ListParams) -> Result<ListPage, LedgerError>;

    fn get_transaction(&self, id: &str) -> Result<Transaction, LedgerError>;

    fn create_transaction(&self, input: &TransactionInput) -> Result<Transaction, LedgerError>;

    fn update_transaction(
        &self,
        id: &str,
        input: &TransactionInput,
    ) -> Result<Transaction, LedgerError>;

    fn delete_transaction(&self, id: &str) -> Result<(), LedgerError>;

    fn list_accounts(&self) -> Result<Vec<Account>, LedgerError>;

    fn create_account(&self, name: &str, kind: &str) -> Result<Account, LedgerError>;

    /// Moving money between accounts is owned entirely by the backend.
    fn transfer(&self, _request: &TransferRequest) -> Result<(), LedgerError> {
        Err(LedgerError::Unsupported("transfer"))
    }
}
