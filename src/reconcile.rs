// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Decides whether the buffered API page still covers what the user wants
//! to see, and which `(page, limit)` to fetch when it does not.

use std::ops::Range;

use crate::models::Transaction;
use crate::query::{Criteria, QueryState, aligned_api_limit};
use crate::source::ListParams;

/// The window and criteria a buffer was fetched under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferTag {
    pub api_page: u32,
    pub api_limit: u32,
    pub criteria: Criteria,
}

impl BufferTag {
    pub fn range(&self) -> Range<u64> {
        let limit = u64::from(self.api_limit);
        let start = u64::from(self.api_page.max(1) - 1) * limit;
        start..start + limit
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Buffer {
    pub tag: BufferTag,
    pub records: Vec<Transaction>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub page: u32,
    pub limit: u32,
    pub criteria: Criteria,
}

impl FetchRequest {
    pub fn params(&self) -> ListParams {
        ListParams {
            page: self.page,
            limit: self.limit,
            sort: self.criteria.sort,
            filters: self.criteria.filters.clone(),
        }
    }

    pub fn tag(&self) -> BufferTag {
        BufferTag {
            api_page: self.page,
            api_limit: self.limit,
            criteria: self.criteria.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchReason {
    /// Nothing buffered yet, or the buffer was invalidated.
    NoBuffer,
    /// The API window was resized to hold whole display pages.
    LimitRaised,
    CriteriaChanged,
    /// The display range left the buffered window.
    OutOfWindow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Reuse,
    Fetch {
        request: FetchRequest,
        reason: FetchReason,
    },
}

impl Decision {
    pub fn is_fetch(&self) -> bool {
        matches!(self, Decision::Fetch { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// The query adjusted for the decision (aligned API limit, target page).
    pub query: QueryState,
    pub decision: Decision,
}

/// Reconciles `query` against the buffer currently held (if any).
pub fn reconcile(query: &QueryState, buffer: Option<&BufferTag>) -> Reconciliation {
    let mut next = query.clone();
    next.display_page = next.display_page.max(1);

    // Range math below assumes whole display pages fit in one API page.
    let aligned = aligned_api_limit(next.api_limit, next.display_limit);
    let limit_raised = aligned != next.api_limit;
    next.api_limit = aligned;

    let criteria = next.criteria();
    let reason = match buffer {
        None => Some(FetchReason::NoBuffer),
        Some(tag) if tag.criteria != criteria => Some(FetchReason::CriteriaChanged),
        Some(tag) if limit_raised || tag.api_limit != next.api_limit => {
            Some(FetchReason::LimitRaised)
        }
        Some(tag) => {
            let want = next.display_range();
            let have = tag.range();
            if want.start < have.start || want.end > have.end {
                Some(FetchReason::OutOfWindow)
            } else {
                None
            }
        }
    };

    let Some(reason) = reason else {
        if let Some(tag) = buffer {
            next.api_page = tag.api_page;
        }
        log::debug!(
            "reuse buffer: api page {} / limit {} covers display page {}",
            next.api_page,
            next.api_limit,
            next.display_page
        );
        return Reconciliation {
            query: next,
            decision: Decision::Reuse,
        };
    };

    if reason == FetchReason::CriteriaChanged {
        next.display_page = 1;
        next.api_page = 1;
    } else {
        let start = next.display_range().start;
        let page = start / u64::from(next.api_limit) + 1;
        next.api_page = u32::try_from(page).unwrap_or(u32::MAX);
    }

    log::debug!(
        "fetch needed ({:?}): api page {} / limit {}",
        reason,
        next.api_page,
        next.api_limit
    );
    let request = FetchRequest {
        page: next.api_page,
        limit: next.api_limit,
        criteria,
    };
    Reconciliation {
        query: next,
        decision: Decision::Fetch { request, reason },
    }
}
