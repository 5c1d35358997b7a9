// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Terminal width model for single characters.

use unicode_width::UnicodeWidthChar;

/// Get the display width of a character in terminal columns.
///
/// Control codes and combining marks take no columns, East-Asian wide and
/// fullwidth characters take two, everything else takes one. Characters the
/// width tables cannot classify fall back to a single column.
#[inline]
pub(crate) fn display_width(ch: char) -> usize {
    if ch.is_control() {
        return 0;
    }
    UnicodeWidthChar::width(ch).unwrap_or(1).min(2)
}

/// Number of bytes `ch` occupies when encoded as UTF-8.
#[inline]
pub(crate) fn byte_len(ch: char) -> usize {
    ch.len_utf8()
}
