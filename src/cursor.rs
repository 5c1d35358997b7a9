// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Cursor placement for the prompt line.
//!
//! The input buffer is edited by byte offset, but the terminal cursor is
//! placed by column. This module maps one onto the other.

use crate::width::{byte_len, display_width};

/// Compute the 0-based column at which the cursor is drawn.
///
/// The column starts after the framing text and then advances one step for
/// every visible character of `input` that lies entirely before
/// `edit_point`. Wide characters advance a single step as well: the count is
/// in characters, not terminal cells. Zero-width characters never advance it.
pub(crate) fn visual_column(framing: &str, input: &str, edit_point: usize) -> usize {
    let mut column = framing.chars().count();
    let mut bytes = 0;

    for ch in input.chars() {
        bytes += byte_len(ch);
        if bytes > edit_point {
            break;
        }
        if display_width(ch) > 0 {
            column += 1;
        }
    }

    column
}
