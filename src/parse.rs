// SPDX-License-Identifier: MIT
//
// Line parsing — raw text to display cells, one grapheme at a time.
//
// This is the character-level state machine at the heart of the pager.
// It consumes one raw line (no embedded newline splitting — that is the
// line source's job) and produces the exact cells a terminal would
// show: SGR escapes become styles, tabs expand to tab stops, backspace
// overstrike reproduces man-page bold/underline, wide characters get
// their padding cell, and combining marks attach to their base.
//
// Parsing never fails. Malformed or truncated escape sequences degrade
// to "ignore and resume text"; unresolved state at end of line is
// dropped (escape state never carries across lines).
//
// Four states:
//
//   Text ──ESC──▶ Escape ──'['──▶ ControlSequence ──final byte──▶ Text
//                   │                    ▲
//                   └─'P' ']' 'X' '^' '_'┴──ESC── Substring
//
// Device control strings (Substring) are consumed and discarded; the
// terminator is recognized by its leading ESC alone, mirroring xterm's
// lenient handling of ST.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

use crate::cell::{Cell, LineContents, last_content};
use crate::sgr::SgrResolver;
use crate::style::{Attr, Style};

/// The escape character that starts every recognized sequence.
const ESC: char = '\u{1b}';

/// The parser's ANSI state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Plain text; characters emit cells.
    Text,
    /// Just saw ESC; deciding what kind of sequence follows.
    Escape,
    /// Inside a device control / operating system string; discarding.
    Substring,
    /// Inside `CSI ... final`; accumulating parameter bytes.
    ControlSequence,
}

// ─── ContentParser ───────────────────────────────────────────────────────────

/// Converts raw text lines into display cells.
///
/// One parser lives for a viewer session. It owns the SGR resolver (and
/// its memo table) plus the styles substituted for backspace overstrike,
/// so the core carries no hidden global state. `parse` takes `&self` and
/// may be called from any number of threads.
///
/// # Examples
///
/// ```
/// use vu_core::parse::ContentParser;
///
/// let parser = ContentParser::new();
/// let lc = parser.parse("a\tb", 4);
/// assert_eq!(lc.len(), 5); // 'a', tab, two fill cells, 'b'
/// assert_eq!(lc[4].mainc, 'b');
/// ```
#[derive(Debug)]
pub struct ContentParser {
    resolver: SgrResolver,
    /// Style substituted when a character overstrikes itself (`X\bX`).
    overstrike: Style,
    /// Style substituted when `_` overstrikes a character (`_\bX`).
    overline: Style,
}

impl Default for ContentParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentParser {
    /// Create a parser with the conventional overstrike styles:
    /// bold for self-overstrike, underline for `_`-overstrike.
    #[must_use]
    pub fn new() -> Self {
        Self {
            resolver: SgrResolver::new(),
            overstrike: Style::from_attr(Attr::BOLD),
            overline: Style::from_attr(Attr::UNDERLINE),
        }
    }

    /// Replace the styles used for overstrike rendering.
    ///
    /// Supplied by configuration so themes can color man-page bold and
    /// underline independently of real SGR attributes.
    #[must_use]
    pub const fn with_overstrike_styles(mut self, overstrike: Style, overline: Style) -> Self {
        self.overstrike = overstrike;
        self.overline = overline;
        self
    }

    /// Parse one raw line into display cells.
    ///
    /// `tab_width` selects the tab policy: positive expands to tab
    /// stops, `0` strips tabs entirely, and negative renders each tab
    /// literally as reverse-video `\t` (a "show tabs" diagnostic mode).
    ///
    /// Never fails; see the module docs for degradation rules.
    #[must_use]
    #[allow(clippy::too_many_lines, clippy::cast_possible_truncation)]
    pub fn parse(&self, line: &str, tab_width: i32) -> LineContents {
        let mut lc = LineContents::with_capacity(line.len());
        let mut state = State::Text;
        let mut params = String::new();
        let mut style = Style::DEFAULT;
        // Column counter for tab stops. Tracks visible columns only.
        let mut tab_x: usize = 0;
        // Code point removed by the last backspace, waiting to be
        // combined with the next visible character.
        let mut overstruck: Option<char> = None;

        for grapheme in line.graphemes(true) {
            let mut chars = grapheme.chars();
            let Some(main) = chars.next() else { continue };

            match state {
                State::Escape => match main {
                    '[' => {
                        params.clear();
                        state = State::ControlSequence;
                        continue;
                    }
                    'c' => {
                        // RIS — full reset.
                        style = Style::DEFAULT;
                        state = State::Text;
                        continue;
                    }
                    'P' | ']' | 'X' | '^' | '_' => {
                        state = State::Substring;
                        continue;
                    }
                    // Unrecognized single escape: drop the ESC and let
                    // the character fall through as plain text.
                    _ => state = State::Text,
                },
                State::Substring => {
                    if main == ESC {
                        state = State::ControlSequence;
                    }
                    continue;
                }
                State::ControlSequence => {
                    if main == 'm' {
                        style = self.resolver.resolve(style, &params);
                    } else if matches!(main, '\u{30}'..='\u{3f}') {
                        params.push(main);
                        continue;
                    }
                    // Any other final byte (cursor movement, erase, …)
                    // terminates the sequence without effect.
                    state = State::Text;
                    continue;
                }
                State::Text => {}
            }

            match main {
                ESC => {
                    state = State::Escape;
                    continue;
                }
                // Line splitting happens upstream; a stray newline is
                // consumed without emitting a cell.
                '\n' => continue,
                _ => {}
            }

            match main.width().unwrap_or(0) {
                0 => match main {
                    '\t' => {
                        if tab_width > 0 {
                            let tw = tab_width as usize;
                            let tab_stop = tw - (tab_x % tw);
                            lc.push(Cell::new('\t', 1, style));
                            tab_x += 1;
                            for _ in 1..tab_stop {
                                lc.push(Cell::new('\0', 1, style));
                                tab_x += 1;
                            }
                        } else if tab_width < 0 {
                            let reversed = style.with_attr(Attr::REVERSE);
                            lc.push(Cell::new('\\', 1, reversed));
                            lc.push(Cell::new('t', 1, reversed));
                            tab_x += 2;
                        }
                        // tab_width == 0: tabs are stripped.
                    }
                    '\u{8}' => {
                        // Backspace: remove the last cell (both halves
                        // of a wide character) and remember its code
                        // point for the overstrike rule.
                        if lc.is_empty() {
                            continue;
                        }
                        let removed = last_content(&lc);
                        let cut = if removed.width > 1 { 2 } else { 1 };
                        lc.truncate(lc.len().saturating_sub(cut));
                        overstruck = Some(removed.mainc);
                    }
                    _ => {
                        // A zero-width code point outside a grapheme
                        // (lone combining mark, ZWJ, …) attaches to the
                        // last base cell, looking through wide padding.
                        let mut base = last_content(&lc);
                        base.combc.push(main);
                        if !lc.is_empty() {
                            let n = lc.len().saturating_sub(usize::from(base.width));
                            if n < lc.len() {
                                lc[n] = base;
                            }
                        }
                        // With no base cell, the mark is dropped.
                    }
                },
                w => {
                    let cell_style = match overstruck.take() {
                        Some(prev) if prev == main => self.overstrike,
                        Some('_') => self.overline,
                        _ => style,
                    };
                    lc.push(Cell {
                        mainc: main,
                        combc: chars.collect(),
                        width: w as u8,
                        style: cell_style,
                    });
                    if w == 2 {
                        // Width invariant: a wide cell is always
                        // immediately followed by one placeholder.
                        lc.push(Cell::default());
                    }
                    tab_x += w;
                }
            }
        }
        lc
    }
}

/// Parse a line with a one-off parser and default overstrike styles.
///
/// The pure, lower-level entry point. Callers that parse many lines
/// should hold a [`ContentParser`] (or go through the line buffer) so
/// SGR memoization pays off.
#[must_use]
pub fn str_to_contents(line: &str, tab_width: i32) -> LineContents {
    ContentParser::new().parse(line, tab_width)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
