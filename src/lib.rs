// SPDX-License-Identifier: MIT
//
// vu-core — rendering core for the vu pager.
//
// Turns raw text lines (ANSI/SGR escapes, tabs, backspace overstrike,
// wide and combining Unicode) into a precise model of terminal display
// cells, and manages lazy, concurrent, cached access to an arbitrarily
// large stream of such lines so a screen of any size can be redrawn
// without re-parsing already-seen content.
//
// What lives here:
//
//   - `color` / `style` / `sgr` — SGR parameter strings to portable
//     styles, with color-space reduction and memoized resolution.
//   - `parse` / `cell`        — the grapheme-level state machine that
//     emits display cells, and the cell model itself.
//   - `cache` / `buffer`      — cost-budgeted content cache and the
//     mutex-guarded line buffer a producer appends to while consumers
//     render.
//
// What deliberately does not: terminal drawing, input handling, file
// opening and decompression, navigation. Those collaborators consume
// cells, line counts, and EOF status through this crate's API. Cursor
// movement and other non-SGR escape classes are consumed and discarded
// rather than emulated — this is a pager core, not a terminal emulator.

pub mod buffer;
pub mod cache;
pub mod cell;
pub mod color;
pub mod error;
pub mod parse;
pub mod sgr;
pub mod style;

pub use buffer::LineBuffer;
pub use cache::{CacheStats, ContentCache};
pub use cell::{Cell, LineContents, contents_to_str};
pub use color::{Color, xterm_color};
pub use error::Error;
pub use parse::{ContentParser, str_to_contents};
pub use sgr::SgrResolver;
pub use style::{Attr, Style};
