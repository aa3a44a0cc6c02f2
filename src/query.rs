// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! What the user currently wants to see: filters, sort and the two
//! pagination windows.
//!
//! Every setter returns a new [`QueryState`]; nothing here talks to a
//! ledger source. Deciding whether a new state needs a fetch is the job of
//! [`crate::reconcile`].

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::LedgerError;
use crate::models::{Category, Division, TxKind};

/// Page sizes offered to the user.
pub const DISPLAY_LIMITS: [u32; 3] = [20, 50, 100];
pub const DEFAULT_DISPLAY_LIMIT: u32 = 20;
pub const DEFAULT_API_LIMIT: u32 = 100;
/// Largest API page a source is asked for.
pub const MAX_API_LIMIT: u32 = 1000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Filters {
    pub kind: Option<TxKind>,
    pub division: Option<Division>,
    pub category: Option<Category>,
    pub search: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Filters {
    /// Blank search text counts as no search.
    pub fn normalized(mut self) -> Self {
        self.search = self
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Filters::default()
    }

    /// Rejects a start date after the end date.
    pub fn check_date_range(&self) -> Result<(), LedgerError> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if start > end => Err(LedgerError::validation(format!(
                "Start date {} is after end date {}",
                start, end
            ))),
            _ => Ok(()),
        }
    }

    /// Query parameters for the set filters only; unset ones are omitted.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        if let Some(k) = self.kind {
            out.push(("type", k.as_str().to_string()));
        }
        if let Some(d) = self.division {
            out.push(("division", d.as_str().to_string()));
        }
        if let Some(c) = self.category {
            out.push(("category", c.as_str().to_string()));
        }
        if let Some(s) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            out.push(("search", s.to_string()));
        }
        if let Some(d) = self.start_date {
            out.push(("startDate", d.format("%Y-%m-%d").to_string()));
        }
        if let Some(d) = self.end_date {
            out.push(("endDate", d.format("%Y-%m-%d").to_string()));
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Description,
    Type,
    Category,
    Division,
    #[default]
    Date,
    Amount,
}

impl SortField {
    pub const ALL: [SortField; 6] = [
        SortField::Description,
        SortField::Type,
        SortField::Category,
        SortField::Division,
        SortField::Date,
        SortField::Amount,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Description => "description",
            SortField::Type => "type",
            SortField::Category => "category",
            SortField::Division => "division",
            SortField::Date => "date",
            SortField::Amount => "amount",
        }
    }
}

impl FromStr for SortField {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        SortField::ALL
            .into_iter()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| LedgerError::validation(format!("Unknown sort field '{}'", s.trim())))
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

impl FromStr for SortOrder {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(LedgerError::validation(format!(
                "Unknown sort order '{}' (use asc|desc)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Sort {
    pub field: SortField,
    pub order: SortOrder,
}

impl Sort {
    pub fn new(field: SortField, order: SortOrder) -> Self {
        Sort { field, order }
    }

    /// Clicking the active field flips its order; any other field becomes
    /// active in descending order.
    pub fn toggled(self, field: SortField) -> Self {
        if self.field == field {
            Sort {
                field,
                order: self.order.flipped(),
            }
        } else {
            Sort {
                field,
                order: SortOrder::Desc,
            }
        }
    }
}

/// Filters plus sort: the inputs that define a distinct result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Criteria {
    pub filters: Filters,
    pub sort: Sort,
}

impl Criteria {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut out = vec![
            ("sortBy", self.sort.field.as_str().to_string()),
            ("sortOrder", self.sort.order.as_str().to_string()),
        ];
        out.extend(self.filters.to_params());
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryState {
    pub filters: Filters,
    pub sort: Sort,
    pub api_page: u32,
    /// API page size as configured, before alignment.
    pub base_api_limit: u32,
    /// API page size in use: `base_api_limit` aligned to `display_limit`.
    pub api_limit: u32,
    pub display_page: u32,
    pub display_limit: u32,
    /// Last known matching-record count.
    pub total: u64,
}

impl Default for QueryState {
    fn default() -> Self {
        QueryState::new(DEFAULT_API_LIMIT, DEFAULT_DISPLAY_LIMIT)
    }
}

impl QueryState {
    pub fn new(api_limit: u32, display_limit: u32) -> Self {
        let display_limit = display_limit.max(1);
        QueryState {
            filters: Filters::default(),
            sort: Sort::default(),
            api_page: 1,
            base_api_limit: api_limit,
            api_limit: aligned_api_limit(api_limit, display_limit),
            display_page: 1,
            display_limit,
            total: 0,
        }
    }

    pub fn criteria(&self) -> Criteria {
        Criteria {
            filters: self.filters.clone(),
            sort: self.sort,
        }
    }

    pub fn with_filters(&self, filters: Filters) -> Self {
        QueryState {
            filters: filters.normalized(),
            display_page: 1,
            ..self.clone()
        }
    }

    pub fn with_sort(&self, sort: Sort) -> Self {
        QueryState {
            sort,
            display_page: 1,
            ..self.clone()
        }
    }

    pub fn with_sort_toggled(&self, field: SortField) -> Self {
        self.with_sort(self.sort.toggled(field))
    }

    pub fn with_display_page(&self, page: u32) -> Self {
        QueryState {
            display_page: page.max(1),
            ..self.clone()
        }
    }

    /// Changes the visible page size. The page number is kept and the API
    /// window is realigned from the configured size.
    pub fn with_display_limit(&self, limit: u32) -> Result<Self, LedgerError> {
        if !DISPLAY_LIMITS.contains(&limit) {
            return Err(LedgerError::validation(format!(
                "Page size must be one of {:?}",
                DISPLAY_LIMITS
            )));
        }
        Ok(QueryState {
            display_limit: limit,
            api_limit: aligned_api_limit(self.base_api_limit, limit),
            ..self.clone()
        })
    }

    /// Absolute record range the user wants to see.
    pub fn display_range(&self) -> Range<u64> {
        let limit = u64::from(self.display_limit);
        let start = u64::from(self.display_page.max(1) - 1) * limit;
        start..start + limit
    }

    /// Number of display pages for the last known total (at least one).
    pub fn page_count(&self) -> u32 {
        let limit = u64::from(self.display_limit.max(1));
        let pages = self.total.div_ceil(limit).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn has_next_page(&self) -> bool {
        self.display_range().end < self.total
    }

    pub fn has_prev_page(&self) -> bool {
        self.display_page > 1
    }
}

/// Smallest multiple of `display_limit` that is at least `api_limit`.
///
/// When `display_limit > api_limit` this is `display_limit` itself. Results
/// that would not fit a `u32` clamp to the largest multiple that does.
pub fn aligned_api_limit(api_limit: u32, display_limit: u32) -> u32 {
    let display = u64::from(display_limit.max(1));
    let api = u64::from(api_limit).max(display);
    let aligned = api.div_ceil(display) * display;
    u32::try_from(aligned).unwrap_or(u32::MAX / display_limit.max(1) * display_limit.max(1))
}
