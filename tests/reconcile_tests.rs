// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use finledger::models::Category;
use finledger::query::{Filters, QueryState, SortField};
use finledger::reconcile::{BufferTag, Decision, FetchReason, reconcile};

fn tag_for(q: &QueryState, api_page: u32) -> BufferTag {
    BufferTag {
        api_page,
        api_limit: q.api_limit,
        criteria: q.criteria(),
    }
}

fn fetched(decision: &Decision) -> (u32, u32, FetchReason) {
    match decision {
        Decision::Fetch { request, reason } => (request.page, request.limit, *reason),
        Decision::Reuse => panic!("expected a fetch"),
    }
}

#[test]
fn no_buffer_fetches_page_containing_display_range() {
    let q = QueryState::default().with_display_page(7);
    let r = reconcile(&q, None);
    assert_eq!(fetched(&r.decision), (2, 100, FetchReason::NoBuffer));
    assert_eq!(r.query.api_page, 2);
}

#[test]
fn page_inside_buffer_is_reused() {
    // apiLimit 100, buffer 0..100, displayLimit 20, page 3 => [40, 60)
    let base = QueryState::default();
    let tag = tag_for(&base, 1);
    let q = base.with_display_page(3);
    let r = reconcile(&q, Some(&tag));
    assert_eq!(r.decision, Decision::Reuse);
    assert_eq!(r.query.api_page, 1);
}

#[test]
fn page_past_buffer_fetches_next_api_page() {
    // page 6 of 20 => [100, 120)
    let base = QueryState::default();
    let tag = tag_for(&base, 1);
    let q = base.with_display_page(6);
    let r = reconcile(&q, Some(&tag));
    assert_eq!(fetched(&r.decision), (2, 100, FetchReason::OutOfWindow));
}

#[test]
fn page_before_buffer_fetches_earlier_api_page() {
    let base = QueryState::default();
    let tag = tag_for(&base, 3);
    let q = base.with_display_page(2);
    let r = reconcile(&q, Some(&tag));
    assert_eq!(fetched(&r.decision), (1, 100, FetchReason::OutOfWindow));
}

#[test]
fn criteria_change_fetches_first_page() {
    let base = QueryState::default().with_display_page(4);
    let tag = tag_for(&base, 3);
    let q = base.with_filters(Filters {
        category: Some(Category::Food),
        ..Default::default()
    });
    let r = reconcile(&q, Some(&tag));
    let (page, _, reason) = fetched(&r.decision);
    assert_eq!((page, reason), (1, FetchReason::CriteriaChanged));
    assert_eq!(r.query.display_page, 1);
    match r.decision {
        Decision::Fetch { request, .. } => {
            assert_eq!(request.criteria.filters.category, Some(Category::Food));
            assert!(
                request
                    .params()
                    .to_query()
                    .contains(&("category", "food".to_string()))
            );
        }
        Decision::Reuse => unreachable!(),
    }
}

#[test]
fn sort_change_is_a_criteria_change() {
    let base = QueryState::default();
    let tag = tag_for(&base, 1);
    let q = base.with_sort_toggled(SortField::Date);
    let (page, _, reason) = fetched(&reconcile(&q, Some(&tag)).decision);
    assert_eq!((page, reason), (1, FetchReason::CriteriaChanged));
}

#[test]
fn display_limit_above_api_limit_raises_and_fetches() {
    let base = QueryState::new(50, 50);
    let tag = tag_for(&base, 1);
    let mut q = base.clone();
    q.display_limit = 100;
    let r = reconcile(&q, Some(&tag));
    assert_eq!(fetched(&r.decision), (1, 100, FetchReason::LimitRaised));
    assert_eq!(r.query.api_limit, 100);
}

#[test]
fn buffer_fetched_under_other_limit_is_stale() {
    let q = QueryState::new(100, 50);
    let tag = BufferTag {
        api_page: 1,
        api_limit: 50,
        criteria: q.criteria(),
    };
    let r = reconcile(&q, Some(&tag));
    assert_eq!(fetched(&r.decision), (1, 100, FetchReason::LimitRaised));
}

#[test]
fn reconciling_after_applying_decision_is_idempotent() {
    let q = QueryState::default().with_display_page(6);
    let r = reconcile(&q, None);
    let Decision::Fetch { request, .. } = r.decision else {
        panic!("expected a fetch");
    };
    let tag = request.tag();
    let again = reconcile(&r.query, Some(&tag));
    assert_eq!(again.decision, Decision::Reuse);
    let third = reconcile(&again.query, Some(&tag));
    assert_eq!(third, again);
}
