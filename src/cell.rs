// SPDX-License-Identifier: MIT
//
// Cell — one terminal column's worth of display state.
//
// The parser turns a raw text line into an ordered `Vec<Cell>`. Each
// cell carries a primary code point, any combining marks attached to
// it, a display width, and a resolved style. Cell counts differ from
// code point counts: tabs expand, escape sequences vanish, backspaces
// delete.
//
// Wide characters (CJK, some emoji) occupy two columns. The first cell
// holds the code point with `width == 2`; the second is a placeholder
// (`mainc == '\0'`) so cell indices always line up with terminal
// columns. Renderers skip placeholder cells when emitting characters.

use std::collections::HashMap;

use crate::color::Color;
use crate::style::{Attr, Style};

// ─── Cell ────────────────────────────────────────────────────────────────────

/// Placeholder marker: a cell whose `mainc` is NUL either pads the
/// second column of a wide character or fills a tab stop.
const PLACEHOLDER: char = '\0';

/// A single display cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cell {
    /// Primary code point. `'\0'` marks a placeholder cell.
    pub mainc: char,
    /// Zero-width combining code points attached to `mainc`.
    pub combc: Vec<char>,
    /// Display width: 0, 1, or 2. Width 0 only appears transiently
    /// while combining marks are being attached, and on placeholders.
    pub width: u8,
    /// Resolved style for this cell.
    pub style: Style,
}

impl Cell {
    /// The `~` marker renderers use to pad rows past end of file.
    pub const EOF_MARK: Self = Self {
        mainc: '~',
        combc: Vec::new(),
        width: 1,
        style: Style {
            attrs: Attr::empty(),
            fg: Color::Name("gray"),
            bg: Color::Unset,
        },
    };

    /// A visible cell with the given code point, width, and style.
    #[inline]
    #[must_use]
    pub const fn new(mainc: char, width: u8, style: Style) -> Self {
        Self {
            mainc,
            combc: Vec::new(),
            width,
            style,
        }
    }

    /// Whether this is a placeholder cell (wide-char padding or tab fill).
    #[inline]
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        self.mainc == PLACEHOLDER
    }
}

/// One parsed line: an ordered sequence of display cells.
pub type LineContents = Vec<Cell>;

/// The last visible cell of a line, looking through wide-char padding.
///
/// If the final cell is the placeholder half of a wide character, the
/// wide cell one position back is returned instead. An empty line
/// yields a default (empty) cell.
#[must_use]
pub(crate) fn last_content(lc: &[Cell]) -> Cell {
    let n = lc.len();
    if n == 0 {
        return Cell::default();
    }
    if n > 1 && lc[n - 2].width > 1 {
        return lc[n - 2].clone();
    }
    lc[n - 1].clone()
}

// ─── Plain-text reconstruction ───────────────────────────────────────────────

/// Rebuild the plain string a line of contents displays, plus a byte
/// offset → cell index map.
///
/// Placeholder cells are skipped; every remaining `mainc` contributes
/// its UTF-8 bytes followed by those of its combining marks. The map
/// has one entry per emitted code-point boundary pointing at the cell
/// whose `mainc` starts there, and a sentinel entry at the final byte
/// offset mapping to the total cell count. Search and selection use
/// the map to translate byte ranges in the plain string back into cell
/// ranges for highlighting.
///
/// # Examples
///
/// ```
/// use vu_core::parse::str_to_contents;
/// use vu_core::cell::contents_to_str;
///
/// let lc = str_to_contents("a\x1b[31mb", 8);
/// let (text, map) = contents_to_str(&lc);
/// assert_eq!(text, "ab");
/// assert_eq!(map[&0], 0);
/// assert_eq!(map[&1], 1);
/// assert_eq!(map[&2], 2); // sentinel
/// ```
#[must_use]
pub fn contents_to_str(lc: &[Cell]) -> (String, HashMap<usize, usize>) {
    let mut text = String::with_capacity(lc.len());
    let mut map = HashMap::with_capacity(lc.len() + 1);

    for (index, cell) in lc.iter().enumerate() {
        if cell.is_placeholder() {
            continue;
        }
        map.insert(text.len(), index);
        text.push(cell.mainc);
        text.extend(&cell.combc);
    }
    map.insert(text.len(), lc.len());
    (text, map)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
