// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! REST client for the finance backend.

use reqwest::Method;
use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::LedgerError;
use crate::form::{TransactionInput, TransferRequest};
use crate::models::{Account, Transaction};
use crate::source::{LedgerSource, ListPage, ListParams};
use crate::utils::http_client;

pub struct RemoteLedger {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl RemoteLedger {
    pub fn new(base_url: &str, token: Option<String>) -> anyhow::Result<Self> {
        Ok(RemoteLedger {
            client: http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let rb = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(t) => rb.bearer_auth(t),
            None => rb,
        }
    }

    /// Sends `rb` and returns the response body, mapping failures to
    /// [`LedgerError::Remote`] with the server's message when it sent one.
    fn send(&self, rb: RequestBuilder, fallback: &str) -> Result<String, LedgerError> {
        let resp = rb.send().map_err(|e| {
            log::warn!("{}: {}", fallback, e);
            LedgerError::remote(e.status().map(|s| s.as_u16()), None, fallback)
        })?;
        let status = resp.status();
        let body = resp.text().unwrap_or_default();
        if status.is_success() {
            Ok(body)
        } else {
            log::warn!("{}: HTTP {}", fallback, status);
            Err(LedgerError::remote(
                Some(status.as_u16()),
                error_message(&body),
                fallback,
            ))
        }
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize, Default)]
struct TransactionList {
    #[serde(default)]
    transactions: Option<Vec<Transaction>>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Deserialize, Default)]
struct Pagination {
    #[serde(default)]
    total: Option<u64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneTransaction {
    Wrapped { transaction: Transaction },
    Bare(Transaction),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneAccount {
    Wrapped { account: Account },
    Bare(Account),
}

#[derive(Deserialize, Default)]
struct AccountList {
    #[serde(default)]
    accounts: Option<Vec<Account>>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// `message` field of an error body, if the server sent one.
pub fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
}

fn decode<T: DeserializeOwned>(body: &str, fallback: &str) -> Result<T, LedgerError> {
    serde_json::from_str::<Envelope<T>>(body)
        .map(|e| e.data)
        .map_err(|e| {
            log::warn!("{}: unexpected response body: {}", fallback, e);
            LedgerError::remote(None, None, fallback)
        })
}

/// Decodes a list response; a missing list or total reads as empty.
pub fn parse_list_body(body: &str) -> Result<ListPage, LedgerError> {
    let list: TransactionList = decode(body, "Failed to fetch transactions")?;
    Ok(ListPage {
        records: list.transactions.unwrap_or_default(),
        total: list.pagination.and_then(|p| p.total).unwrap_or(0),
    })
}

pub fn parse_transaction_body(body: &str, fallback: &str) -> Result<Transaction, LedgerError> {
    Ok(match decode::<OneTransaction>(body, fallback)? {
        OneTransaction::Wrapped { transaction } => transaction,
        OneTransaction::Bare(tx) => tx,
    })
}

pub fn parse_accounts_body(body: &str) -> Result<Vec<Account>, LedgerError> {
    let list: AccountList = decode(body, "Failed to fetch accounts")?;
    Ok(list.accounts.unwrap_or_default())
}

impl LedgerSource for RemoteLedger {
    fn list_transactions(&self, params: &ListParams) -> Result<ListPage, LedgerError> {
        let rb = self
            .request(Method::GET, "/transactions")
            .query(&params.to_query());
        let body = self.send(rb, "Failed to fetch transactions")?;
        parse_list_body(&body)
    }

    fn get_transaction(&self, id: &str) -> Result<Transaction, LedgerError> {
        let fallback = "Failed to fetch transaction";
        let body = self.send(
            self.request(Method::GET, &format!("/transactions/{}", id)),
            fallback,
        )?;
        parse_transaction_body(&body, fallback)
    }

    fn create_transaction(&self, input: &TransactionInput) -> Result<Transaction, LedgerError> {
        let fallback = "Failed to save transaction";
        let body = self.send(
            self.request(Method::POST, "/transactions").json(input),
            fallback,
        )?;
        parse_transaction_body(&body, fallback)
    }

    fn update_transaction(
        &self,
        id: &str,
        input: &TransactionInput,
    ) -> Result<Transaction, LedgerError> {
        let fallback = "Failed to save transaction";
        let body = self.send(
            self.request(Method::PUT, &format!("/transactions/{}", id))
                .json(input),
            fallback,
        )?;
        parse_transaction_body(&body, fallback)
    }

    fn delete_transaction(&self, id: &str) -> Result<(), LedgerError> {
        self.send(
            self.request(Method::DELETE, &format!("/transactions/{}", id)),
            "Failed to delete transaction",
        )?;
        Ok(())
    }

    fn list_accounts(&self) -> Result<Vec<Account>, LedgerError> {
        let body = self.send(
            self.request(Method::GET, "/accounts"),
            "Failed to fetch accounts",
        )?;
        parse_accounts_body(&body)
    }

    fn create_account(&self, name: &str, kind: &str) -> Result<Account, LedgerError> {
        let fallback = "Failed to create account";
        let body = self.send(
            self.request(Method::POST, "/accounts")
                .json(&json!({ "name": name, "type": kind })),
            fallback,
        )?;
        Ok(match decode::<OneAccount>(&body, fallback)? {
            OneAccount::Wrapped { account } => account,
            OneAccount::Bare(a) => a,
        })
    }

    fn transfer(&self, request: &TransferRequest) -> Result<(), LedgerError> {
        self.send(
            self.request(Method::POST, "/accounts/transfer")
                .json(request),
            "Failed to transfer",
        )?;
        Ok(())
    }
}
