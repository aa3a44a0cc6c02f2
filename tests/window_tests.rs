// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use finledger::window::{slice_bounds, window};

#[test]
fn third_page_of_twenty_maps_to_forty_sixty() {
    let buffer: Vec<usize> = (0..100).collect();
    let slice = window(&buffer, 100, 3, 20);
    assert_eq!(slice.first(), Some(&40));
    assert_eq!(slice.len(), 20);
    assert_eq!(slice.last(), Some(&59));
}

#[test]
fn pages_wrap_modulo_api_limit() {
    // Display page 7 of 20 lives in API page 2 at offset 20.
    assert_eq!(slice_bounds(100, 7, 20), 20..40);
    assert_eq!(slice_bounds(100, 2, 50), 50..100);
    assert_eq!(slice_bounds(100, 3, 100), 0..100);
}

#[test]
fn final_page_is_short_and_past_end_is_empty() {
    let buffer: Vec<usize> = (100..130).collect();
    let slice = window(&buffer, 100, 7, 20);
    assert_eq!(slice, &[120, 121, 122, 123, 124, 125, 126, 127, 128, 129][..]);
    assert!(window(&buffer, 100, 8, 20).is_empty());
    let empty: Vec<usize> = Vec::new();
    assert!(window(&empty, 100, 1, 20).is_empty());
}
