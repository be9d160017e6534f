// SPDX-License-Identifier: MIT
//
// SGR resolution — semicolon-delimited parameter strings to styles.
//
// The parser hands this module the raw bytes it captured between `CSI`
// and the final `m`. Parameter strings repeat heavily in real input
// (a highlighted log file uses the same handful of sequences on every
// line), so parsed deltas are memoized by the exact parameter string.
// The memo table is behind an `RwLock` and shared by every consumer
// thread that triggers a parse; a poisoned lock degrades to parsing
// without the cache rather than panicking.
//
// Semantics note: codes 22/24/25/27 clear the entire delta accumulated
// so far in the current parameter string, colors included. Common
// terminal convention would reset only the matching attribute, but the
// full clear is the behavior pagers in the wild exhibit and what this
// resolver preserves.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::color::{Color, xterm_color};
use crate::style::{Attr, Style};

// ─── Resolver ────────────────────────────────────────────────────────────────

/// Resolves SGR parameter strings into styles, memoizing parsed deltas.
///
/// One resolver lives for a viewer session (owned by the parser). It is
/// safe to call from multiple threads concurrently.
///
/// # Examples
///
/// ```
/// use vu_core::color::Color;
/// use vu_core::sgr::SgrResolver;
/// use vu_core::style::{Attr, Style};
///
/// let resolver = SgrResolver::new();
/// let style = resolver.resolve(Style::DEFAULT, "1;31");
/// assert!(style.attrs.contains(Attr::BOLD));
/// assert_eq!(style.fg, Color::Name("maroon"));
/// ```
#[derive(Debug, Default)]
pub struct SgrResolver {
    /// Parameter string → parsed delta. Keys are the exact raw strings.
    table: RwLock<HashMap<Box<str>, Style>>,
}

impl SgrResolver {
    /// Create a resolver with an empty memo table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a parameter string against a base style.
    ///
    /// An empty string, `"0"`, or `";"` is a full reset and returns the
    /// default style regardless of `base`. Anything else is parsed into
    /// a delta (via the memo table) and combined onto `base` with
    /// [`Style::apply`]. Unrecognized tokens are silently skipped, so
    /// resolution never fails.
    #[must_use]
    pub fn resolve(&self, base: Style, params: &str) -> Style {
        if params.is_empty() || params == "0" || params == ";" {
            return Style::DEFAULT;
        }

        if let Ok(table) = self.table.read() {
            if let Some(delta) = table.get(params) {
                return base.apply(*delta);
            }
        }

        let delta = parse_params(params);
        if let Ok(mut table) = self.table.write() {
            table.insert(params.into(), delta);
        }
        base.apply(delta)
    }

    /// Number of memoized parameter strings (test and diagnostics aid).
    #[must_use]
    pub fn memo_len(&self) -> usize {
        self.table.read().map_or(0, |table| table.len())
    }
}

// ─── Parameter grammar ───────────────────────────────────────────────────────

/// Parse a parameter string into a style delta.
///
/// Tokens are matched as exact strings (a leading zero is accepted only
/// where terminals emit one, e.g. `01` for bold); malformed tokens fall
/// through the match and are skipped.
fn parse_params(params: &str) -> Style {
    let fields: Vec<&str> = params.split(';').collect();
    let mut style = Style::DEFAULT;

    let mut index = 0;
    while index < fields.len() {
        match fields[index] {
            "1" | "01" => style.attrs |= Attr::BOLD,
            "2" | "02" => style.attrs |= Attr::DIM,
            "3" | "03" => style.attrs |= Attr::ITALIC,
            "4" | "04" => style.attrs |= Attr::UNDERLINE,
            "5" | "05" | "6" | "06" => style.attrs |= Attr::BLINK,
            "7" | "07" | "8" | "08" => style.attrs |= Attr::REVERSE,
            "9" | "09" => style.attrs |= Attr::STRIKETHROUGH,
            // Attribute-off codes wipe the whole accumulated delta
            // (see the module note on semantics).
            "22" | "24" | "25" | "27" => style = Style::DEFAULT,
            "30" | "31" | "32" | "33" | "34" | "35" | "36" | "37" => {
                style.fg = named(fields[index], 30);
            }
            "39" => style.fg = Color::Default,
            "40" | "41" | "42" | "43" | "44" | "45" | "46" | "47" => {
                style.bg = named(fields[index], 40);
            }
            "49" => style.bg = Color::Default,
            "90" | "91" | "92" | "93" | "94" | "95" | "96" | "97" => {
                style.fg = named(fields[index], 82);
            }
            "100" | "101" | "102" | "103" | "104" | "105" | "106" | "107" => {
                style.bg = named(fields[index], 92);
            }
            "38" | "48" => {
                let (consumed, with_color) = extended_color(style, &fields[index..]);
                style = with_color;
                index += consumed;
            }
            _ => {} // Unknown token — skip.
        }
        index += 1;
    }
    style
}

/// Map a plain color token to its palette entry (`token - offset`).
fn named(token: &str, offset: u32) -> Color {
    token
        .parse::<u32>()
        .map_or(Color::Unset, |n| xterm_color(n - offset))
}

/// Parse an extended color introducer (`38` foreground / `48` background).
///
/// `fields[0]` is the introducer itself. `5;n` selects an 8-bit palette
/// index, `2;r;g;b` a 24-bit triple. Returns how many *additional*
/// tokens were consumed so the caller can advance its cursor; a
/// truncated sequence consumes what it can and sets nothing.
fn extended_color(mut style: Style, fields: &[&str]) -> (usize, Style) {
    if fields.len() < 2 {
        return (1, style);
    }

    let mut index = 1;
    let color = if fields[index] == "5" && fields.len() > index + 1 {
        index += 1;
        let n = fields[index].parse::<u32>().unwrap_or(0);
        xterm_color(n)
    } else if fields[index] == "2" && fields.len() > index + 3 {
        let r = fields[index + 1].parse::<u8>().unwrap_or(0);
        let g = fields[index + 2].parse::<u8>().unwrap_or(0);
        let b = fields[index + 3].parse::<u8>().unwrap_or(0);
        index += 3;
        Color::Rgb(r, g, b)
    } else {
        Color::Unset
    };

    if !color.is_unset() {
        if fields[0] == "38" {
            style.fg = color;
        } else {
            style.bg = color;
        }
    }
    (index, style)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn resolve(base: Style, params: &str) -> Style {
        SgrResolver::new().resolve(base, params)
    }

    #[test]
    fn reset_forms_return_default() {
        let loud = Style {
            attrs: Attr::BOLD | Attr::REVERSE,
            fg: Color::Name("red"),
            bg: Color::Rgb(1, 2, 3),
        };
        assert_eq!(resolve(loud, ""), Style::DEFAULT);
        assert_eq!(resolve(loud, "0"), Style::DEFAULT);
        assert_eq!(resolve(loud, ";"), Style::DEFAULT);
    }

    #[test]
    fn single_attributes() {
        assert!(resolve(Style::DEFAULT, "1").attrs.contains(Attr::BOLD));
        assert!(resolve(Style::DEFAULT, "01").attrs.contains(Attr::BOLD));
        assert!(resolve(Style::DEFAULT, "2").attrs.contains(Attr::DIM));
        assert!(resolve(Style::DEFAULT, "3").attrs.contains(Attr::ITALIC));
        assert!(resolve(Style::DEFAULT, "4").attrs.contains(Attr::UNDERLINE));
        assert!(resolve(Style::DEFAULT, "5").attrs.contains(Attr::BLINK));
        assert!(resolve(Style::DEFAULT, "6").attrs.contains(Attr::BLINK));
        assert!(resolve(Style::DEFAULT, "7").attrs.contains(Attr::REVERSE));
        assert!(resolve(Style::DEFAULT, "8").attrs.contains(Attr::REVERSE));
        assert!(
            resolve(Style::DEFAULT, "9")
                .attrs
                .contains(Attr::STRIKETHROUGH)
        );
    }

    #[test]
    fn named_colors() {
        assert_eq!(resolve(Style::DEFAULT, "31").fg, Color::Name("maroon"));
        assert_eq!(resolve(Style::DEFAULT, "37").fg, Color::Name("silver"));
        assert_eq!(resolve(Style::DEFAULT, "41").bg, Color::Name("maroon"));
        // Bright variants land on palette entries 8–15.
        assert_eq!(resolve(Style::DEFAULT, "90").fg, Color::Name("gray"));
        assert_eq!(resolve(Style::DEFAULT, "97").fg, Color::Name("white"));
        assert_eq!(resolve(Style::DEFAULT, "100").bg, Color::Name("gray"));
        assert_eq!(resolve(Style::DEFAULT, "107").bg, Color::Name("white"));
    }

    #[test]
    fn default_color_codes() {
        let base = Style {
            fg: Color::Name("red"),
            bg: Color::Name("blue"),
            ..Style::DEFAULT
        };
        assert_eq!(resolve(base, "39").fg, Color::Default);
        assert_eq!(resolve(base, "49").bg, Color::Default);
    }

    #[test]
    fn combined_sequence() {
        let style = resolve(Style::DEFAULT, "1;4;32;45");
        assert!(style.attrs.contains(Attr::BOLD));
        assert!(style.attrs.contains(Attr::UNDERLINE));
        assert_eq!(style.fg, Color::Name("green"));
        assert_eq!(style.bg, Color::Name("purple"));
    }

    #[test]
    fn attribute_off_clears_delta() {
        // 22 wipes everything accumulated before it in the same string.
        let style = resolve(Style::DEFAULT, "1;31;22");
        assert_eq!(style, Style::DEFAULT);
        // ...but later tokens still apply.
        let style = resolve(Style::DEFAULT, "1;22;4");
        assert_eq!(style.attrs, Attr::UNDERLINE);
    }

    #[test]
    fn delta_combines_onto_base() {
        let base = Style::from_attr(Attr::BOLD);
        let style = resolve(base, "31");
        assert!(style.attrs.contains(Attr::BOLD));
        assert_eq!(style.fg, Color::Name("maroon"));
    }

    #[test]
    fn extended_8bit_colors() {
        assert_eq!(resolve(Style::DEFAULT, "38;5;196").fg, Color::Rgb(255, 0, 0));
        assert_eq!(resolve(Style::DEFAULT, "48;5;21").bg, Color::Rgb(0, 0, 255));
        assert_eq!(resolve(Style::DEFAULT, "38;5;1").fg, Color::Name("maroon"));
    }

    #[test]
    fn extended_24bit_colors() {
        assert_eq!(
            resolve(Style::DEFAULT, "38;2;10;20;30").fg,
            Color::Rgb(10, 20, 30)
        );
        assert_eq!(
            resolve(Style::DEFAULT, "48;2;255;255;255").bg,
            Color::Rgb(255, 255, 255)
        );
    }

    #[test]
    fn extended_color_then_attribute() {
        // The cursor must advance past the consumed color tokens.
        let style = resolve(Style::DEFAULT, "38;5;40;1");
        assert!(style.attrs.contains(Attr::BOLD));
        assert_eq!(style.fg, xterm_color(40));
    }

    #[test]
    fn truncated_extended_color_sets_nothing() {
        assert!(resolve(Style::DEFAULT, "38").fg.is_unset());
        assert!(resolve(Style::DEFAULT, "38;5").fg.is_unset());
        assert!(resolve(Style::DEFAULT, "38;2;1;2").fg.is_unset());
    }

    #[test]
    fn unknown_tokens_skipped() {
        let style = resolve(Style::DEFAULT, "1;junk;31;;99999");
        assert!(style.attrs.contains(Attr::BOLD));
        assert_eq!(style.fg, Color::Name("maroon"));
    }

    #[test]
    fn memo_table_fills_and_hits() {
        let resolver = SgrResolver::new();
        assert_eq!(resolver.memo_len(), 0);
        let first = resolver.resolve(Style::DEFAULT, "1;31");
        assert_eq!(resolver.memo_len(), 1);
        let second = resolver.resolve(Style::DEFAULT, "1;31");
        assert_eq!(resolver.memo_len(), 1);
        assert_eq!(first, second);
        // Reset fast path never touches the table.
        let _ = resolver.resolve(Style::DEFAULT, "0");
        assert_eq!(resolver.memo_len(), 1);
    }

    #[test]
    fn memo_is_shareable_across_threads() {
        let resolver = std::sync::Arc::new(SgrResolver::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let resolver = std::sync::Arc::clone(&resolver);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let s = resolver.resolve(Style::DEFAULT, "1;38;5;196");
                        assert_eq!(s.fg, Color::Rgb(255, 0, 0));
                        assert!(s.attrs.contains(Attr::BOLD));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(resolver.memo_len(), 1);
    }
}
