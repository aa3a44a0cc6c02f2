// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The transaction-list view state machine.
//!
//! [`LedgerView`] owns the requested [`QueryState`], the buffered API page
//! and the single in-flight fetch. Every UI event is one call; calls that may
//! need data return a [`PendingFetch`] which the caller executes against a
//! [`LedgerSource`] and hands back through [`LedgerView::complete_fetch`].
//! Responses carry the ticket they were issued under, and anything but the
//! latest ticket is dropped.
//!
//! The `refresh`, `on_submit` and `on_delete` helpers drive a blocking
//! source directly.

use chrono::{DateTime, Utc};

use crate::error::LedgerError;
use crate::form::TransactionForm;
use crate::models::Transaction;
use crate::policy;
use crate::query::{Filters, QueryState, SortField};
use crate::reconcile::{Buffer, Decision, FetchRequest, reconcile};
use crate::source::{LedgerSource, ListPage};
use crate::window::window;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFetch {
    pub ticket: u64,
    pub request: FetchRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// The fetch failed; buffer and pagination are unchanged.
    Failed(LedgerError),
    /// The response belonged to a superseded request and was ignored.
    Stale,
}

#[derive(Debug, Clone)]
pub struct LedgerView {
    /// What the user asked for most recently.
    query: QueryState,
    /// What the buffer currently renders.
    settled: QueryState,
    buffer: Option<Buffer>,
    in_flight: Option<PendingFetch>,
    next_ticket: u64,
    last_error: Option<LedgerError>,
}

impl Default for LedgerView {
    fn default() -> Self {
        LedgerView::new(QueryState::default())
    }
}

impl LedgerView {
    pub fn new(query: QueryState) -> Self {
        LedgerView {
            settled: query.clone(),
            query,
            buffer: None,
            in_flight: None,
            next_ticket: 1,
            last_error: None,
        }
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn buffer(&self) -> Option<&Buffer> {
        self.buffer.as_ref()
    }

    pub fn in_flight(&self) -> Option<&PendingFetch> {
        self.in_flight.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn last_error(&self) -> Option<&LedgerError> {
        self.last_error.as_ref()
    }

    pub fn display_page(&self) -> u32 {
        self.settled.display_page
    }

    pub fn display_limit(&self) -> u32 {
        self.settled.display_limit
    }

    pub fn total(&self) -> u64 {
        self.settled.total
    }

    pub fn page_count(&self) -> u32 {
        self.settled.page_count()
    }

    /// Records on the rendered display page.
    pub fn visible(&self) -> &[Transaction] {
        match &self.buffer {
            Some(b) => window(
                &b.records,
                b.tag.api_limit,
                self.settled.display_page,
                self.settled.display_limit,
            ),
            None => &[],
        }
    }

    pub fn is_editable(&self, tx: &Transaction, now: DateTime<Utc>) -> bool {
        policy::can_edit(tx, now)
    }

    pub fn on_filter_change(&mut self, filters: Filters) -> Option<PendingFetch> {
        self.query = self.query.with_filters(filters);
        self.reconcile()
    }

    pub fn on_sort_toggle(&mut self, field: SortField) -> Option<PendingFetch> {
        self.query = self.query.with_sort_toggled(field);
        self.reconcile()
    }

    pub fn on_display_page_change(&mut self, page: u32) -> Option<PendingFetch> {
        let mut page = page.max(1);
        if self.query.total > 0 {
            page = page.min(self.query.page_count());
        }
        self.query = self.query.with_display_page(page);
        self.reconcile()
    }

    pub fn on_display_limit_change(
        &mut self,
        limit: u32,
    ) -> Result<Option<PendingFetch>, LedgerError> {
        let mut next = self.query.with_display_limit(limit)?;
        if next.total > 0 {
            next.display_page = next.display_page.min(next.page_count());
        }
        self.query = next;
        Ok(self.reconcile())
    }

    pub fn next_page(&mut self) -> Option<PendingFetch> {
        if !self.query.has_next_page() {
            return None;
        }
        self.on_display_page_change(self.query.display_page + 1)
    }

    pub fn prev_page(&mut self) -> Option<PendingFetch> {
        if !self.query.has_prev_page() {
            return None;
        }
        self.on_display_page_change(self.query.display_page - 1)
    }

    /// Runs the reconciler for the current query. Returns a fetch to perform,
    /// or `None` when the buffer already covers the query or an identical
    /// fetch is already in flight.
    pub fn reconcile(&mut self) -> Option<PendingFetch> {
        let r = reconcile(&self.query, self.buffer.as_ref().map(|b| &b.tag));
        self.query = r.query;
        match r.decision {
            Decision::Reuse => {
                if let Some(p) = self.in_flight.take() {
                    log::debug!("ticket {} superseded by buffered data", p.ticket);
                }
                self.settled = self.query.clone();
                None
            }
            Decision::Fetch { request, .. } => {
                if let Some(p) = &self.in_flight {
                    if p.request == request {
                        return None;
                    }
                }
                let pending = PendingFetch {
                    ticket: self.next_ticket,
                    request,
                };
                self.next_ticket += 1;
                log::debug!(
                    "issuing ticket {} for page {} limit {}",
                    pending.ticket,
                    pending.request.page,
                    pending.request.limit
                );
                self.in_flight = Some(pending.clone());
                Some(pending)
            }
        }
    }

    /// Applies the response for `ticket`.
    pub fn complete_fetch(
        &mut self,
        ticket: u64,
        result: Result<ListPage, LedgerError>,
    ) -> FetchOutcome {
        let Some(pending) = self.in_flight.take_if(|p| p.ticket == ticket) else {
            log::debug!("discarding stale response for ticket {}", ticket);
            return FetchOutcome::Stale;
        };

        match result {
            Ok(page) => {
                log::info!(
                    "fetched page {} (limit {}): {} records of {}",
                    pending.request.page,
                    pending.request.limit,
                    page.records.len(),
                    page.total
                );
                self.query.total = page.total;
                self.query.api_page = pending.request.page;
                self.query.api_limit = pending.request.limit;
                self.buffer = Some(Buffer {
                    tag: pending.request.tag(),
                    records: page.records,
                    total: page.total,
                });
                self.settled = self.query.clone();
                self.last_error = None;
                FetchOutcome::Applied
            }
            Err(e) => {
                log::warn!("fetch for ticket {} failed: {}", ticket, e);
                // Keep showing what the buffer renders.
                self.query = self.settled.clone();
                self.last_error = Some(e.clone());
                FetchOutcome::Failed(e)
            }
        }
    }

    /// Drops the buffer so the next reconciliation refetches. Any fetch in
    /// flight predates the change and is ignored when it lands.
    pub fn invalidate(&mut self) {
        self.buffer = None;
        self.in_flight = None;
    }

    /// Reconciles and, if needed, performs the fetch synchronously.
    pub fn refresh<S: LedgerSource + ?Sized>(&mut self, source: &S) -> Result<(), LedgerError> {
        let Some(pending) = self.reconcile() else {
            return Ok(());
        };
        let result = source.list_transactions(&pending.request.params());
        match self.complete_fetch(pending.ticket, result) {
            FetchOutcome::Failed(e) => Err(e),
            FetchOutcome::Applied | FetchOutcome::Stale => Ok(()),
        }
    }

    /// Creates (`editing == None`) or updates a transaction from `form`.
    ///
    /// Edits outside the edit window fail with [`LedgerError::Locked`] and
    /// invalid forms with [`LedgerError::Validation`], both before any call
    /// to `source`. Source errors are returned as-is so the form can be
    /// retried. On success the buffer is invalidated and refetched.
    pub fn on_submit<S: LedgerSource + ?Sized>(
        &mut self,
        source: &S,
        editing: Option<&Transaction>,
        form: &TransactionForm,
        now: DateTime<Utc>,
    ) -> Result<Transaction, LedgerError> {
        if let Some(tx) = editing {
            policy::ensure_editable(tx, now)?;
        }
        let input = form.validate()?;
        let saved = match editing {
            Some(tx) => source.update_transaction(&tx.id, &input)?,
            None => source.create_transaction(&input)?,
        };
        self.invalidate();
        self.settle(source);
        Ok(saved)
    }

    pub fn on_delete<S: LedgerSource + ?Sized>(
        &mut self,
        source: &S,
        id: &str,
    ) -> Result<(), LedgerError> {
        source.delete_transaction(id)?;
        self.invalidate();
        self.settle(source);
        Ok(())
    }

    // Refetch after a mutation. A failure here does not undo the mutation;
    // it is kept as `last_error` instead.
    fn settle<S: LedgerSource + ?Sized>(&mut self, source: &S) {
        if self.refresh(source).is_err() {
            return;
        }
        if self.visible().is_empty() && self.query.display_page > self.query.page_count() {
            let last = self.query.page_count();
            self.query = self.query.with_display_page(last);
            let _ = self.refresh(source);
        }
    }
}
