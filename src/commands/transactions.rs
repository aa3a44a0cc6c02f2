// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::Serialize;
use std::io::{self, BufRead, Write};

use crate::config::Settings;
use crate::engine::{FetchOutcome, LedgerView, PendingFetch};
use crate::form::TransactionForm;
use crate::models::Transaction;
use crate::policy;
use crate::query::{Filters, QueryState, Sort, SortField};
use crate::source::LedgerSource;
use crate::utils::{maybe_print_json, parse_date, pretty_table, write_csv};

pub fn handle(source: &dyn LedgerSource, settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(source, settings, sub)?,
        Some(("browse", sub)) => {
            let mut query = settings.initial_query();
            if let Some(limit) = sub.get_one::<u32>("limit") {
                query = query.with_display_limit(*limit)?;
            }
            let mut view = LedgerView::new(query);
            let stdin = io::stdin();
            browse(source, &mut view, stdin.lock(), &mut io::stdout(), Utc::now)?;
        }
        Some(("add", sub)) => add(source, settings, sub)?,
        Some(("edit", sub)) => edit(source, settings, sub)?,
        Some(("rm", sub)) => remove(source, settings, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: String,
    pub date: String,
    pub description: String,
    pub r#type: String,
    pub category: String,
    pub division: String,
    pub amount: String,
    pub account: String,
    pub editable: bool,
}

impl TransactionRow {
    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.date.clone(),
            self.description.clone(),
            self.r#type.clone(),
            self.category.clone(),
            self.division.clone(),
            self.amount.clone(),
            if self.editable { "open" } else { "locked" }.to_string(),
        ]
    }
}

const HEADERS: [&str; 8] = [
    "ID", "Date", "Description", "Type", "Category", "Division", "Amount", "Edit",
];

pub fn rows(records: &[Transaction], now: DateTime<Utc>) -> Vec<TransactionRow> {
    records
        .iter()
        .map(|tx| TransactionRow {
            id: tx.id.clone(),
            date: tx
                .occurred_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M")
                .to_string(),
            description: tx.description.clone(),
            r#type: tx.kind.to_string(),
            category: tx.category.label().to_string(),
            division: tx.division.to_string(),
            amount: tx.signed_amount(),
            account: tx.account_id.clone().unwrap_or_default(),
            editable: policy::can_edit(tx, now),
        })
        .collect()
}

pub fn filters_from(sub: &clap::ArgMatches) -> Result<Filters> {
    let date = |key: &str| -> Result<Option<NaiveDate>> {
        sub.get_one::<String>(key).map(|s| parse_date(s)).transpose()
    };
    let filters = Filters {
        kind: sub.get_one::<String>("type").map(|s| s.parse()).transpose()?,
        division: sub
            .get_one::<String>("division")
            .map(|s| s.parse())
            .transpose()?,
        category: sub
            .get_one::<String>("category")
            .map(|s| s.parse())
            .transpose()?,
        search: sub.get_one::<String>("search").cloned(),
        start_date: date("from")?,
        end_date: date("to")?,
    };
    filters.check_date_range()?;
    Ok(filters)
}

/// Query for `tx list`: settings defaults, then limit, criteria, page.
pub fn query_from(settings: &Settings, sub: &clap::ArgMatches) -> Result<QueryState> {
    let mut query = settings.initial_query();
    if let Some(limit) = sub.get_one::<u32>("limit") {
        query = query.with_display_limit(*limit)?;
    }
    query = query.with_filters(filters_from(sub)?);
    let mut sort = Sort::default();
    if let Some(field) = sub.get_one::<String>("sort") {
        sort.field = field.parse()?;
    }
    if let Some(order) = sub.get_one::<String>("order") {
        sort.order = order.parse()?;
    }
    query = query.with_sort(sort);
    if let Some(page) = sub.get_one::<u32>("page") {
        query = query.with_display_page(*page);
    }
    Ok(query)
}

/// Loads the page `query` asks for, falling back to the last page when it
/// points past the end.
pub fn load_view(source: &dyn LedgerSource, query: QueryState) -> Result<LedgerView> {
    let mut view = LedgerView::new(query);
    view.refresh(source)?;
    if view.visible().is_empty() && view.total() > 0 {
        let last = view.page_count();
        if let Some(p) = view.on_display_page_change(last) {
            run_pending(source, &mut view, p)?;
        }
    }
    Ok(view)
}

fn run_pending(source: &dyn LedgerSource, view: &mut LedgerView, p: PendingFetch) -> Result<()> {
    let result = source.list_transactions(&p.request.params());
    match view.complete_fetch(p.ticket, result) {
        FetchOutcome::Failed(e) => Err(e.into()),
        FetchOutcome::Applied | FetchOutcome::Stale => Ok(()),
    }
}

fn footer(view: &LedgerView) -> String {
    format!(
        "Page {} of {} · {} per page · {} records",
        view.display_page(),
        view.page_count(),
        view.display_limit(),
        view.total()
    )
}

fn list(source: &dyn LedgerSource, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let view = load_view(source, query_from(settings, sub)?)?;
    let data = rows(view.visible(), Utc::now());

    if sub.get_flag("csv") {
        let cells: Vec<Vec<String>> = data.iter().map(TransactionRow::cells).collect();
        return write_csv(io::stdout().lock(), &HEADERS, &cells);
    }
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        if data.is_empty() {
            println!("No transactions found.");
        } else {
            println!(
                "{}",
                pretty_table(&HEADERS, data.iter().map(TransactionRow::cells).collect())
            );
        }
        println!("{}", footer(&view));
    }
    Ok(())
}

fn apply_form_args(form: &mut TransactionForm, sub: &clap::ArgMatches) -> Result<()> {
    if let Some(v) = sub.get_one::<String>("amount") {
        form.amount = v.clone();
    }
    if let Some(v) = sub.get_one::<String>("description") {
        form.description = v.clone();
    }
    if let Some(v) = sub.get_one::<String>("type") {
        form.kind = v.parse()?;
    }
    if let Some(v) = sub.get_one::<String>("category") {
        form.category = v.parse()?;
    }
    if let Some(v) = sub.get_one::<String>("division") {
        form.division = v.parse()?;
    }
    if let Some(v) = sub.get_one::<String>("date") {
        form.date = v.clone();
    }
    if let Some(v) = sub.get_one::<String>("time") {
        form.time = v.clone();
    }
    if let Some(v) = sub.get_one::<String>("account") {
        form.account = v.clone();
    }
    Ok(())
}

fn add(source: &dyn LedgerSource, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let mut form = TransactionForm::blank_at(Local::now());
    // An explicit date without a time means midnight.
    if sub.get_one::<String>("date").is_some() {
        form.time.clear();
    }
    apply_form_args(&mut form, sub)?;

    let mut view = LedgerView::new(settings.initial_query());
    let saved = view.on_submit(source, None, &form, Utc::now())?;
    println!(
        "Recorded {} {} '{}' on {} (id {})",
        saved.kind,
        saved.amount,
        saved.description,
        saved.occurred_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
        saved.id
    );
    Ok(())
}

fn edit(source: &dyn LedgerSource, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub
        .get_one::<String>("id")
        .ok_or_else(|| anyhow!("--id is required"))?
        .trim();
    let existing = source
        .get_transaction(id)
        .with_context(|| format!("Loading transaction {}", id))?;

    let mut form = TransactionForm::from_transaction(&existing);
    apply_form_args(&mut form, sub)?;

    let mut view = LedgerView::new(settings.initial_query());
    let saved = view.on_submit(source, Some(&existing), &form, Utc::now())?;
    println!("Updated transaction {} ('{}')", saved.id, saved.description);
    Ok(())
}

fn remove(source: &dyn LedgerSource, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub
        .get_one::<String>("id")
        .ok_or_else(|| anyhow!("--id is required"))?
        .trim();
    let mut view = LedgerView::new(settings.initial_query());
    view.on_delete(source, id)?;
    println!("Removed transaction {}", id);
    Ok(())
}

/// One line of input in a browse session.
#[derive(Debug, Clone, PartialEq)]
pub enum BrowseCommand {
    Next,
    Prev,
    Page(u32),
    Limit(u32),
    Sort(SortField),
    Filter(Filters),
    Clear,
    Delete(String),
    Help,
    Quit,
}

const BROWSE_HELP: &str = "commands: n | p | page N | limit 20|50|100 | sort FIELD | \
type/division/category/search/from/to [VALUE] (no value clears) | clear | rm ID | q";

/// Parses one browse command; filter commands are applied on top of `current`.
pub fn parse_browse_command(line: &str, current: &Filters) -> Result<BrowseCommand> {
    let line = line.trim();
    let (cmd, arg) = match line.split_once(char::is_whitespace) {
        Some((c, a)) => (c, a.trim()),
        None => (line, ""),
    };
    let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
    let mut filters = current.clone();

    Ok(match cmd.to_lowercase().as_str() {
        "n" | "next" => BrowseCommand::Next,
        "p" | "prev" => BrowseCommand::Prev,
        "page" => BrowseCommand::Page(
            arg.parse()
                .map_err(|_| anyhow!("Invalid page '{}'", arg))?,
        ),
        "limit" => BrowseCommand::Limit(
            arg.parse()
                .map_err(|_| anyhow!("Invalid page size '{}'", arg))?,
        ),
        "sort" => BrowseCommand::Sort(arg.parse()?),
        "type" => {
            filters.kind = opt(arg).map(|s| s.parse()).transpose()?;
            BrowseCommand::Filter(filters)
        }
        "division" => {
            filters.division = opt(arg).map(|s| s.parse()).transpose()?;
            BrowseCommand::Filter(filters)
        }
        "category" => {
            filters.category = opt(arg).map(|s| s.parse()).transpose()?;
            BrowseCommand::Filter(filters)
        }
        "search" => {
            filters.search = opt(arg);
            BrowseCommand::Filter(filters)
        }
        "from" => {
            filters.start_date = opt(arg).map(|s| parse_date(&s)).transpose()?;
            filters.check_date_range()?;
            BrowseCommand::Filter(filters)
        }
        "to" => {
            filters.end_date = opt(arg).map(|s| parse_date(&s)).transpose()?;
            filters.check_date_range()?;
            BrowseCommand::Filter(filters)
        }
        "clear" => BrowseCommand::Clear,
        "rm" | "delete" if !arg.is_empty() => BrowseCommand::Delete(arg.to_string()),
        "h" | "help" | "?" => BrowseCommand::Help,
        "q" | "quit" | "exit" => BrowseCommand::Quit,
        _ => bail!("Unknown command '{}'", line),
    })
}

fn render<W: Write>(view: &LedgerView, out: &mut W, now: DateTime<Utc>) -> Result<()> {
    let data = rows(view.visible(), now);
    if data.is_empty() {
        writeln!(out, "No records found.")?;
    } else {
        writeln!(
            out,
            "{}",
            pretty_table(&HEADERS, data.iter().map(TransactionRow::cells).collect())
        )?;
    }
    writeln!(out, "{}", footer(view))?;
    Ok(())
}

/// Interactive paging over one [`LedgerView`]; each input line is one event.
/// Errors are printed and the session continues.
pub fn browse<R: BufRead, W: Write>(
    source: &dyn LedgerSource,
    view: &mut LedgerView,
    input: R,
    out: &mut W,
    clock: fn() -> DateTime<Utc>,
) -> Result<()> {
    if let Err(e) = view.refresh(source) {
        writeln!(out, "error: {}", e)?;
    }
    render(view, out, clock())?;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let cmd = match parse_browse_command(&line, &view.query().filters) {
            Ok(c) => c,
            Err(e) => {
                writeln!(out, "error: {}", e)?;
                continue;
            }
        };
        let pending = match cmd {
            BrowseCommand::Quit => break,
            BrowseCommand::Help => {
                writeln!(out, "{}", BROWSE_HELP)?;
                continue;
            }
            BrowseCommand::Next => view.next_page(),
            BrowseCommand::Prev => view.prev_page(),
            BrowseCommand::Page(n) => view.on_display_page_change(n),
            BrowseCommand::Limit(n) => match view.on_display_limit_change(n) {
                Ok(p) => p,
                Err(e) => {
                    writeln!(out, "error: {}", e)?;
                    continue;
                }
            },
            BrowseCommand::Sort(field) => view.on_sort_toggle(field),
            BrowseCommand::Filter(f) => view.on_filter_change(f),
            BrowseCommand::Clear => view.on_filter_change(Filters::default()),
            BrowseCommand::Delete(id) => {
                if let Err(e) = view.on_delete(source, &id) {
                    writeln!(out, "error: {}", e)?;
                }
                None
            }
        };
        if let Some(p) = pending {
            if let Err(e) = run_pending(source, view, p) {
                writeln!(out, "error: {}", e)?;
            }
        }
        render(view, out, clock())?;
    }
    Ok(())
}
