// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use finledger::error::LedgerError;
use finledger::models::{Category, Division, TxKind};
use finledger::remote::{
    RemoteLedger, error_message, parse_accounts_body, parse_list_body, parse_transaction_body,
};

const LIST_BODY: &str = r#"{
  "success": true,
  "data": {
    "transactions": [
      {
        "_id": "66b1",
        "type": "expense",
        "amount": 250.75,
        "description": "Fuel refill",
        "category": "fuel",
        "division": "office",
        "date": "2025-08-01T09:30:00.000Z",
        "createdAt": "2025-08-01T09:31:12.000Z",
        "account": { "_id": "acc9", "name": "Wallet" }
      },
      {
        "_id": "66b2",
        "type": "income",
        "amount": "1000",
        "description": "Salary",
        "date": "2025-07-31T00:00:00Z",
        "createdAt": "2025-07-31T08:00:00Z",
        "account": "acc1"
      }
    ],
    "pagination": { "page": 3, "limit": 100, "total": 312, "pages": 4 }
  }
}"#;

#[test]
fn list_body_decodes_records_and_total() {
    let page = parse_list_body(LIST_BODY).unwrap();
    assert_eq!(page.total, 312);
    assert_eq!(page.records.len(), 2);

    let fuel = &page.records[0];
    assert_eq!(fuel.id, "66b1");
    assert_eq!(fuel.kind, TxKind::Expense);
    assert_eq!(fuel.amount.to_string(), "250.75");
    assert_eq!(fuel.category, Category::Fuel);
    assert_eq!(fuel.division, Division::Office);
    assert_eq!(fuel.account_id.as_deref(), Some("acc9"));

    let salary = &page.records[1];
    assert_eq!(salary.kind, TxKind::Income);
    assert_eq!(salary.category, Category::Others);
    assert_eq!(salary.division, Division::Personal);
    assert_eq!(salary.account_id.as_deref(), Some("acc1"));
    assert_eq!(salary.signed_amount(), "+1000");
}

#[test]
fn missing_list_or_total_reads_as_empty() {
    let page = parse_list_body(r#"{"data":{}}"#).unwrap();
    assert!(page.records.is_empty());
    assert_eq!(page.total, 0);

    let page = parse_list_body(r#"{"data":{"transactions":[],"pagination":{}}}"#).unwrap();
    assert_eq!(page.total, 0);
}

#[test]
fn malformed_body_uses_fallback_message() {
    let err = parse_list_body("<html>bad gateway</html>").unwrap_err();
    assert_eq!(
        err,
        LedgerError::Remote {
            status: None,
            message: "Failed to fetch transactions".into()
        }
    );
}

#[test]
fn single_transaction_wrapped_or_bare() {
    let bare = r#"{"data":{"id":"x1","type":"expense","amount":5,"description":"Tea",
        "date":"2025-08-01T10:00:00Z","createdAt":"2025-08-01T10:00:00Z"}}"#;
    let tx = parse_transaction_body(bare, "Failed to save transaction").unwrap();
    assert_eq!(tx.id, "x1");
    assert_eq!(tx.account_id, None);

    let wrapped = r#"{"data":{"transaction":{"_id":"x2","type":"income","amount":7.5,
        "description":"Refund","date":"2025-08-01T10:00:00Z",
        "createdAt":"2025-08-01T10:00:00Z","account":"a"}}}"#;
    let tx = parse_transaction_body(wrapped, "Failed to save transaction").unwrap();
    assert_eq!(tx.id, "x2");
    assert_eq!(tx.description, "Refund");
}

#[test]
fn error_message_is_taken_verbatim_when_present() {
    assert_eq!(
        error_message(r#"{"success":false,"message":"Insufficient balance"}"#).as_deref(),
        Some("Insufficient balance")
    );
    assert_eq!(error_message(r#"{"message":"   "}"#), None);
    assert_eq!(error_message("Internal Server Error"), None);

    let err = LedgerError::remote(Some(500), error_message("oops"), "Failed to save transaction");
    assert_eq!(err.to_string(), "Failed to save transaction");
}

#[test]
fn server_message_is_not_trimmed() {
    let err = LedgerError::remote(
        Some(400),
        error_message(r#"{"message":"  Insufficient balance\n"}"#),
        "Failed to save transaction",
    );
    assert_eq!(err.to_string(), "  Insufficient balance\n");
}

#[test]
fn accounts_body_decodes() {
    let body = r#"{"data":{"accounts":[
        {"_id":"a1","name":"Wallet","type":"cash","balance":120.5},
        {"_id":"a2","name":"HDFC"}
    ]}}"#;
    let accounts = parse_accounts_body(body).unwrap();
    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts[0].r#type.as_deref(), Some("cash"));
    assert_eq!(accounts[0].balance.map(|b| b.to_string()).as_deref(), Some("120.5"));
    assert_eq!(accounts[1].balance, None);
}

#[test]
fn base_url_is_normalized() {
    let remote = RemoteLedger::new("http://localhost:5000/api/", None).unwrap();
    assert_eq!(remote.base_url(), "http://localhost:5000/api");
}
