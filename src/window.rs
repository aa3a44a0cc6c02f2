// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::ops::Range;

/// Index range inside a buffer fetched with `api_limit` that backs the given
/// display page. Not clamped to the buffer length.
pub fn slice_bounds(api_limit: u32, display_page: u32, display_limit: u32) -> Range<usize> {
    if api_limit == 0 {
        return 0..0;
    }
    let absolute = u64::from(display_page.max(1) - 1) * u64::from(display_limit);
    let start = (absolute % u64::from(api_limit)) as usize;
    start..start + display_limit as usize
}

/// Records of `buffer` visible on the given display page. Shorter than
/// `display_limit` on the final page, empty past the end.
pub fn window<T>(buffer: &[T], api_limit: u32, display_page: u32, display_limit: u32) -> &[T] {
    let bounds = slice_bounds(api_limit, display_page, display_limit);
    let end = bounds.end.min(buffer.len());
    if bounds.start >= end {
        return &[];
    }
    &buffer[bounds.start..end]
}
