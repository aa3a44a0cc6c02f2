// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Ledger source backed by the local SQLite file.
//!
//! Mirrors the backend's list semantics (filters, sort, `page`/`limit`,
//! total count) so the engine behaves the same offline.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use std::str::FromStr;

use crate::error::LedgerError;
use crate::form::TransactionInput;
use crate::models::{Account, Transaction};
use crate::query::{Filters, SortField, SortOrder};
use crate::source::{LedgerSource, ListPage, ListParams};

const TX_COLUMNS: &str = "t.id, t.kind, t.amount, t.description, t.category, t.division, \
                          t.occurred_at, t.created_at, t.account_id";

/// Date filters are read as calendar days in `tz`.
pub struct SqliteLedger<'a, Tz: TimeZone = Local> {
    conn: &'a Connection,
    clock: fn() -> DateTime<Utc>,
    tz: Tz,
}

impl<'a> SqliteLedger<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        SqliteLedger {
            conn,
            clock: Utc::now,
            tz: Local,
        }
    }

    /// Uses `clock` to stamp `created_at` on new records.
    pub fn with_clock(conn: &'a Connection, clock: fn() -> DateTime<Utc>) -> Self {
        SqliteLedger {
            conn,
            clock,
            tz: Local,
        }
    }
}

impl<'a, Tz: TimeZone> SqliteLedger<'a, Tz> {
    /// Same ledger, with date filters read in `tz`.
    pub fn in_timezone<T: TimeZone>(self, tz: T) -> SqliteLedger<'a, T> {
        SqliteLedger {
            conn: self.conn,
            clock: self.clock,
            tz,
        }
    }

    /// Resolves an account given either its id or its name.
    pub fn account_id(&self, key: &str) -> Result<i64, LedgerError> {
        let key = key.trim();
        if let Ok(id) = key.parse::<i64>() {
            let found: Option<i64> = self
                .conn
                .query_row("SELECT id FROM accounts WHERE id=?1", params![id], |r| {
                    r.get(0)
                })
                .optional()?;
            if let Some(id) = found {
                return Ok(id);
            }
        }
        self.conn
            .query_row("SELECT id FROM accounts WHERE name=?1", params![key], |r| {
                r.get(0)
            })
            .optional()?
            .ok_or_else(|| not_found(format!("Account '{}' not found", key)))
    }

    fn fetch_one(&self, id: i64) -> Result<Option<Transaction>, LedgerError> {
        let sql = format!("SELECT {} FROM transactions t WHERE t.id=?1", TX_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, params![id], row_to_transaction)
            .optional()?)
    }
}

fn not_found(message: String) -> LedgerError {
    LedgerError::remote(Some(404), Some(message), "Not found")
}

fn parse_id(id: &str) -> Result<i64, LedgerError> {
    id.trim()
        .parse::<i64>()
        .map_err(|_| not_found(format!("Transaction '{}' not found", id.trim())))
}

fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::Description => "t.description",
        SortField::Type => "t.kind",
        SortField::Category => "t.category",
        SortField::Division => "t.division",
        SortField::Date => "t.occurred_at",
        SortField::Amount => "CAST(t.amount AS REAL)",
    }
}

/// First instant of `day` in `tz`. A midnight skipped by a DST change falls
/// back to the day's first valid hour.
pub fn day_start_in<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    (0..24)
        .find_map(|h| {
            let t = NaiveTime::from_hms_opt(h, 0, 0)?;
            tz.from_local_datetime(&day.and_time(t)).earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| day.and_time(NaiveTime::MIN).and_utc())
}

/// `s` as a `LIKE` substring pattern with `\`, `%` and `_` taken literally.
fn like_pattern(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('%');
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

fn where_clause<Tz: TimeZone>(filters: &Filters, tz: &Tz) -> (String, Vec<Value>) {
    let mut sql = String::from(" WHERE 1=1");
    let mut args = Vec::new();

    if let Some(k) = filters.kind {
        sql.push_str(" AND t.kind=?");
        args.push(Value::Text(k.as_str().into()));
    }
    if let Some(d) = filters.division {
        sql.push_str(" AND t.division=?");
        args.push(Value::Text(d.as_str().into()));
    }
    if let Some(c) = filters.category {
        sql.push_str(" AND t.category=?");
        args.push(Value::Text(c.as_str().into()));
    }
    if let Some(s) = filters.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        sql.push_str(" AND t.description LIKE ? ESCAPE '\\'");
        args.push(Value::Text(like_pattern(s)));
    }
    if let Some(d) = filters.start_date {
        sql.push_str(" AND t.occurred_at >= ?");
        args.push(Value::Text(stored_instant(day_start_in(d, tz))));
    }
    // End date is inclusive: everything before the following day starts.
    if let Some(d) = filters.end_date.and_then(|d| d.succ_opt()) {
        sql.push_str(" AND t.occurred_at < ?");
        args.push(Value::Text(stored_instant(day_start_in(d, tz))));
    }
    (sql, args)
}

// Matches the text rusqlite writes for a `DateTime<Utc>` column value.
fn stored_instant(at: DateTime<Utc>) -> String {
    at.format("%F %T%.f%:z").to_string()
}

fn parsed<T>(r: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let s: String = r.get(idx)?;
    s.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_transaction(r: &Row<'_>) -> rusqlite::Result<Transaction> {
    let id: i64 = r.get(0)?;
    let account_id: i64 = r.get(8)?;
    Ok(Transaction {
        id: id.to_string(),
        kind: parsed(r, 1)?,
        amount: parsed(r, 2)?,
        description: r.get(3)?,
        category: parsed(r, 4)?,
        division: parsed(r, 5)?,
        occurred_at: r.get(6)?,
        created_at: r.get(7)?,
        account_id: Some(account_id.to_string()),
    })
}

impl<Tz: TimeZone> LedgerSource for SqliteLedger<'_, Tz> {
    fn list_transactions(&self, params: &ListParams) -> Result<ListPage, LedgerError> {
        let (filter_sql, mut args) = where_clause(&params.filters, &self.tz);

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM transactions t{}", filter_sql),
            params_from_iter(args.iter()),
            |r| r.get(0),
        )?;

        let order = match params.sort.order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        let sql = format!(
            "SELECT {} FROM transactions t{} ORDER BY {} {}, t.id {} LIMIT ? OFFSET ?",
            TX_COLUMNS,
            filter_sql,
            sort_column(params.sort.field),
            order,
            order
        );
        args.push(Value::Integer(i64::from(params.limit)));
        args.push(Value::Integer(params.offset() as i64));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), row_to_transaction)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        log::debug!(
            "local list page {} limit {}: {} of {}",
            params.page,
            params.limit,
            records.len(),
            total
        );
        Ok(ListPage {
            records,
            total: total.max(0) as u64,
        })
    }

    fn get_transaction(&self, id: &str) -> Result<Transaction, LedgerError> {
        self.fetch_one(parse_id(id)?)?
            .ok_or_else(|| not_found(format!("Transaction '{}' not found", id.trim())))
    }

    fn create_transaction(&self, input: &TransactionInput) -> Result<Transaction, LedgerError> {
        let account_id = self.account_id(&input.account_id)?;
        self.conn.execute(
            "INSERT INTO transactions(kind, amount, description, category, division, occurred_at, created_at, account_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                input.kind.as_str(),
                input.amount.to_string(),
                input.description,
                input.category.as_str(),
                input.division.as_str(),
                input.occurred_at,
                (self.clock)(),
                account_id
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.fetch_one(id)?
            .ok_or_else(|| not_found(format!("Transaction '{}' not found", id)))
    }

    fn update_transaction(
        &self,
        id: &str,
        input: &TransactionInput,
    ) -> Result<Transaction, LedgerError> {
        let tx_id = parse_id(id)?;
        let account_id = self.account_id(&input.account_id)?;
        let changed = self.conn.execute(
            "UPDATE transactions SET kind=?1, amount=?2, description=?3, category=?4, division=?5,
             occurred_at=?6, account_id=?7 WHERE id=?8",
            params![
                input.kind.as_str(),
                input.amount.to_string(),
                input.description,
                input.category.as_str(),
                input.division.as_str(),
                input.occurred_at,
                account_id,
                tx_id
            ],
        )?;
        if changed == 0 {
            return Err(not_found(format!("Transaction '{}' not found", id.trim())));
        }
        self.get_transaction(id)
    }

    fn delete_transaction(&self, id: &str) -> Result<(), LedgerError> {
        let changed = self
            .conn
            .execute("DELETE FROM transactions WHERE id=?1", params![parse_id(id)?])?;
        if changed == 0 {
            return Err(not_found(format!("Transaction '{}' not found", id.trim())));
        }
        Ok(())
    }

    fn list_accounts(&self) -> Result<Vec<Account>, LedgerError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, type FROM accounts ORDER BY name")?;
        let rows = stmt.query_map([], |r| {
            Ok(Account {
                id: r.get::<_, i64>(0)?.to_string(),
                name: r.get(1)?,
                r#type: r.get(2)?,
                balance: None,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn create_account(&self, name: &str, kind: &str) -> Result<Account, LedgerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::validation("Account name is required"));
        }
        self.conn.execute(
            "INSERT INTO accounts(name, type) VALUES (?1, ?2)",
            params![name, kind.trim()],
        )?;
        Ok(Account {
            id: self.conn.last_insert_rowid().to_string(),
            name: name.to_string(),
            r#type: Some(kind.trim().to_string()),
            balance: None,
        })
    }
}
