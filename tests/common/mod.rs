// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use finledger::error::LedgerError;
use finledger::form::TransactionInput;
use finledger::models::{Account, Category, Division, Transaction, TxKind};
use finledger::source::{LedgerSource, ListPage, ListParams};
use rust_decimal::Decimal;
use std::cell::{Cell, RefCell};

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 8, 1, 9, 0, 0).unwrap()
}

pub fn tx(i: usize, created_at: DateTime<Utc>) -> Transaction {
    Transaction {
        id: format!("t{}", i),
        kind: if i % 2 == 0 { TxKind::Expense } else { TxKind::Income },
        amount: Decimal::from(i as i64 + 1),
        description: format!("Item {}", i),
        category: if i % 3 == 0 { Category::Food } else { Category::Others },
        division: Division::Personal,
        occurred_at: t0() + Duration::minutes(i as i64),
        created_at,
        account_id: Some("acc1".into()),
    }
}

pub fn records(n: usize) -> Vec<Transaction> {
    (0..n).map(|i| tx(i, t0())).collect()
}

/// In-memory ledger that records every call made to it.
#[derive(Default)]
pub struct FakeSource {
    pub records: RefCell<Vec<Transaction>>,
    pub list_calls: RefCell<Vec<ListParams>>,
    pub mutations: Cell<usize>,
    pub fail_list: RefCell<Option<LedgerError>>,
    pub fail_mutation: RefCell<Option<LedgerError>>,
}

impl FakeSource {
    pub fn with_records(n: usize) -> Self {
        FakeSource {
            records: RefCell::new(records(n)),
            ..Default::default()
        }
    }

    pub fn list_count(&self) -> usize {
        self.list_calls.borrow().len()
    }

    pub fn last_list(&self) -> ListParams {
        self.list_calls.borrow().last().cloned().expect("no list call")
    }

    fn mutation_error(&self) -> Result<(), LedgerError> {
        self.mutations.set(self.mutations.get() + 1);
        match self.fail_mutation.borrow().clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl LedgerSource for FakeSource {
    fn list_transactions(&self, params: &ListParams) -> Result<ListPage, LedgerError> {
        self.list_calls.borrow_mut().push(params.clone());
        if let Some(e) = self.fail_list.borrow().clone() {
            return Err(e);
        }
        let matching: Vec<Transaction> = self
            .records
            .borrow()
            .iter()
            .filter(|t| params.filters.category.is_none_or(|c| t.category == c))
            .filter(|t| params.filters.kind.is_none_or(|k| t.kind == k))
            .cloned()
            .collect();
        let total = matching.len() as u64;
        let records = matching
            .into_iter()
            .skip(params.offset() as usize)
            .take(params.limit as usize)
            .collect();
        Ok(ListPage { records, total })
    }

    fn get_transaction(&self, id: &str) -> Result<Transaction, LedgerError> {
        self.records
            .borrow()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| LedgerError::remote(Some(404), Some("Not found".into()), "x"))
    }

    fn create_transaction(&self, input: &TransactionInput) -> Result<Transaction, LedgerError> {
        self.mutation_error()?;
        let mut recs = self.records.borrow_mut();
        let created = Transaction {
            id: format!("new{}", recs.len()),
            kind: input.kind,
            amount: input.amount,
            description: input.description.clone(),
            category: input.category,
            division: input.division,
            occurred_at: input.occurred_at,
            created_at: t0(),
            account_id: Some(input.account_id.clone()),
        };
        recs.insert(0, created.clone());
        Ok(created)
    }

    fn update_transaction(
        &self,
        id: &str,
        input: &TransactionInput,
    ) -> Result<Transaction, LedgerError> {
        self.mutation_error()?;
        let mut recs = self.records.borrow_mut();
        let t = recs
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| LedgerError::remote(Some(404), None, "Failed to save transaction"))?;
        t.amount = input.amount;
        t.description = input.description.clone();
        Ok(t.clone())
    }

    fn delete_transaction(&self, id: &str) -> Result<(), LedgerError> {
        self.mutation_error()?;
        self.records.borrow_mut().retain(|t| t.id != id);
        Ok(())
    }

    fn list_accounts(&self) -> Result<Vec<Account>, LedgerError> {
        Ok(vec![])
    }

    fn create_account(&self, name: &str, kind: &str) -> Result<Account, LedgerError> {
        Ok(Account {
            id: "acc1".into(),
            name: name.into(),
            r#type: Some(kind.into()),
            balance: None,
        })
    }
}
