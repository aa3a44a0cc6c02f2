// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use chrono::Duration;
use common::{FakeSource, t0};
use finledger::engine::{FetchOutcome, LedgerView};
use finledger::error::LedgerError;
use finledger::form::TransactionForm;
use finledger::models::Category;
use finledger::query::{Filters, QueryState, SortField};
use finledger::source::{LedgerSource, ListPage};

fn loaded(source: &FakeSource) -> LedgerView {
    let mut view = LedgerView::new(QueryState::default());
    view.refresh(source).unwrap();
    view
}

fn ids(view: &LedgerView) -> Vec<String> {
    view.visible().iter().map(|t| t.id.clone()).collect()
}

#[test]
fn paging_inside_buffer_does_not_fetch() {
    let source = FakeSource::with_records(250);
    let mut view = loaded(&source);
    assert_eq!(source.list_count(), 1);
    assert_eq!(view.total(), 250);
    assert_eq!(view.page_count(), 13);

    assert!(view.on_display_page_change(3).is_none());
    view.refresh(&source).unwrap();
    assert_eq!(source.list_count(), 1);
    let visible = ids(&view);
    assert_eq!(visible.len(), 20);
    assert_eq!(visible[0], "t40");
    assert_eq!(visible[19], "t59");
}

#[test]
fn paging_past_buffer_fetches_next_api_page() {
    let source = FakeSource::with_records(250);
    let mut view = loaded(&source);

    let pending = view.on_display_page_change(6).expect("fetch expected");
    assert_eq!(pending.request.page, 2);
    assert_eq!(pending.request.limit, 100);
    let result = source.list_transactions(&pending.request.params());
    assert_eq!(
        view.complete_fetch(pending.ticket, result),
        FetchOutcome::Applied
    );
    assert_eq!(ids(&view)[0], "t100");
    assert_eq!(view.query().api_page, 2);
    assert_eq!(view.display_page(), 6);
}

#[test]
fn filter_change_resets_to_first_page_and_replaces_buffer() {
    let source = FakeSource::with_records(250);
    let mut view = loaded(&source);
    view.on_display_page_change(4);
    assert_eq!(view.display_page(), 4);

    let pending = view
        .on_filter_change(Filters {
            category: Some(Category::Food),
            ..Default::default()
        })
        .expect("fetch expected");
    assert_eq!(pending.request.page, 1);
    assert_eq!(view.query().display_page, 1);
    let result = source.list_transactions(&pending.request.params());
    view.complete_fetch(pending.ticket, result);

    assert!(
        source
            .last_list()
            .to_query()
            .contains(&("category", "food".to_string()))
    );
    assert!(view.visible().iter().all(|t| t.category == Category::Food));
    assert_eq!(view.total(), 84);
}

#[test]
fn identical_reconciliation_does_not_refetch() {
    let source = FakeSource::with_records(50);
    let mut view = loaded(&source);
    assert!(view.reconcile().is_none());
    view.refresh(&source).unwrap();
    view.refresh(&source).unwrap();
    assert_eq!(source.list_count(), 1);

    // Same request while one is still in flight.
    let first = view.on_sort_toggle(SortField::Amount).expect("fetch");
    assert!(view.reconcile().is_none());
    assert_eq!(view.in_flight(), Some(&first));
}

#[test]
fn late_response_for_superseded_request_is_discarded() {
    let source = FakeSource::with_records(250);
    let mut view = loaded(&source);

    let slow = view
        .on_filter_change(Filters {
            category: Some(Category::Food),
            ..Default::default()
        })
        .expect("fetch");
    let fast = view
        .on_filter_change(Filters {
            category: Some(Category::Others),
            ..Default::default()
        })
        .expect("fetch");
    assert_ne!(slow.ticket, fast.ticket);

    let fast_result = source.list_transactions(&fast.request.params());
    let slow_result = source.list_transactions(&slow.request.params());
    assert_eq!(
        view.complete_fetch(fast.ticket, fast_result),
        FetchOutcome::Applied
    );
    assert_eq!(
        view.complete_fetch(slow.ticket, slow_result),
        FetchOutcome::Stale
    );
    assert!(view.visible().iter().all(|t| t.category == Category::Others));
    assert!(view.last_error().is_none());
}

#[test]
fn returning_to_buffered_criteria_drops_in_flight_fetch() {
    let source = FakeSource::with_records(30);
    let mut view = loaded(&source);

    let pending = view
        .on_filter_change(Filters {
            category: Some(Category::Food),
            ..Default::default()
        })
        .expect("fetch");
    assert!(view.on_filter_change(Filters::default()).is_none());
    assert!(!view.is_loading());

    let result = source.list_transactions(&pending.request.params());
    assert_eq!(
        view.complete_fetch(pending.ticket, result),
        FetchOutcome::Stale
    );
    assert_eq!(view.total(), 30);
}

#[test]
fn failed_fetch_keeps_previous_buffer_and_pagination() {
    let source = FakeSource::with_records(250);
    let mut view = loaded(&source);
    view.on_display_page_change(2);
    let before = ids(&view);

    *source.fail_list.borrow_mut() = Some(LedgerError::remote(
        Some(500),
        Some("database offline".into()),
        "Failed to fetch transactions",
    ));
    let err = view
        .on_display_page_change(7)
        .map(|p| {
            let r = source.list_transactions(&p.request.params());
            view.complete_fetch(p.ticket, r)
        })
        .expect("fetch expected");
    let FetchOutcome::Failed(e) = err else {
        panic!("expected failure, got {:?}", err);
    };
    assert_eq!(e.to_string(), "database offline");
    assert_eq!(view.last_error(), Some(&e));
    assert_eq!(view.display_page(), 2);
    assert_eq!(view.query().display_page, 2);
    assert_eq!(view.query().api_page, 1);
    assert_eq!(ids(&view), before);
    assert!(!view.is_loading());
}

#[test]
fn empty_result_is_a_valid_terminal_state() {
    let source = FakeSource::default();
    let mut view = loaded(&source);
    assert_eq!(view.total(), 0);
    assert!(view.visible().is_empty());
    assert!(view.last_error().is_none());
    view.refresh(&source).unwrap();
    assert_eq!(source.list_count(), 1);
    assert_eq!(view.page_count(), 1);
}

#[test]
fn empty_page_response_does_not_crash_window() {
    let mut view = LedgerView::new(QueryState::default().with_display_page(3));
    let pending = view.reconcile().expect("fetch");
    view.complete_fetch(pending.ticket, Ok(ListPage::default()));
    assert!(view.visible().is_empty());
}

#[test]
fn raising_display_limit_refetches_with_larger_api_window() {
    let source = FakeSource::with_records(250);
    let mut view = LedgerView::new(QueryState::new(50, 50));
    view.refresh(&source).unwrap();
    assert_eq!(source.last_list().limit, 50);

    let pending = view
        .on_display_limit_change(100)
        .unwrap()
        .expect("fetch expected");
    assert_eq!(pending.request.limit, 100);
    assert!(view.on_display_limit_change(30).is_err());
}

#[test]
fn invalid_amount_is_rejected_without_calling_source() {
    let source = FakeSource::with_records(5);
    let mut view = loaded(&source);
    let form = TransactionForm {
        amount: "0".into(),
        description: "Coffee".into(),
        date: "2025-08-01".into(),
        account: "acc1".into(),
        ..Default::default()
    };
    let err = view.on_submit(&source, None, &form, t0()).unwrap_err();
    assert!(err.is_validation());
    assert_eq!(source.mutations.get(), 0);
    assert_eq!(source.list_count(), 1);
}

#[test]
fn edit_outside_window_is_locked_without_calling_source() {
    let source = FakeSource::with_records(5);
    let mut view = loaded(&source);
    let tx = source.get_transaction("t1").unwrap();
    let form = TransactionForm::from_transaction(&tx);

    let err = view
        .on_submit(&source, Some(&tx), &form, t0() + Duration::hours(12))
        .unwrap_err();
    assert!(err.is_locked());
    assert_eq!(source.mutations.get(), 0);

    let saved = view
        .on_submit(&source, Some(&tx), &form, t0() + Duration::hours(11))
        .unwrap();
    assert_eq!(saved.id, "t1");
    assert_eq!(source.mutations.get(), 1);
}

#[test]
fn successful_mutation_invalidates_and_refetches() {
    let source = FakeSource::with_records(5);
    let mut view = loaded(&source);
    let form = TransactionForm {
        amount: "9.99".into(),
        description: "Fuel top-up".into(),
        category: Category::Fuel,
        date: "2025-08-02".into(),
        time: "08:00".into(),
        account: "acc1".into(),
        ..Default::default()
    };
    let saved = view.on_submit(&source, None, &form, t0()).unwrap();
    assert_eq!(source.list_count(), 2);
    assert_eq!(view.total(), 6);
    assert_eq!(view.visible()[0].id, saved.id);
}

#[test]
fn server_message_is_surfaced_verbatim_on_mutation_failure() {
    let source = FakeSource::with_records(5);
    let mut view = loaded(&source);
    *source.fail_mutation.borrow_mut() = Some(LedgerError::remote(
        Some(400),
        Some("Insufficient balance".into()),
        "Failed to save transaction",
    ));
    let form = TransactionForm {
        amount: "10".into(),
        description: "Rent".into(),
        date: "2025-08-02".into(),
        account: "acc1".into(),
        ..Default::default()
    };
    let err = view.on_submit(&source, None, &form, t0()).unwrap_err();
    assert_eq!(err.to_string(), "Insufficient balance");
    // Nothing refetched: the buffer is still the one loaded before.
    assert_eq!(source.list_count(), 1);
    assert_eq!(view.total(), 5);
}

#[test]
fn deleting_last_record_on_last_page_steps_back() {
    let source = FakeSource::with_records(21);
    let mut view = loaded(&source);
    assert!(view.on_display_page_change(2).is_none());
    assert_eq!(ids(&view), ["t20"]);

    // Delete is allowed regardless of age.
    view.on_delete(&source, "t20").unwrap();
    assert_eq!(view.total(), 20);
    assert_eq!(view.display_page(), 1);
    assert_eq!(view.visible().len(), 20);
}
