// SPDX-License-Identifier: MIT
//
// Color mapping — ANSI color indices to a portable representation.
//
// Terminals speak three color dialects: the 16 classic named colors,
// the xterm 256-color palette (a 6×6×6 cube plus a grayscale ramp),
// and 24-bit direct color. The parser reduces all three to one `Color`
// value so downstream renderers never have to care which dialect the
// input used.
//
// The low 16 indices stay symbolic (a terminal may theme "maroon"
// however it likes); everything above 15 has a fixed RGB definition
// in the xterm palette, so it is computed to a concrete triple.

use std::fmt;

// ─── Color ───────────────────────────────────────────────────────────────────

/// A portable terminal color.
///
/// `Display` produces the string form used across the pager: the empty
/// string for [`Color::Unset`], `"default"` for the terminal default,
/// a palette name for the classic 16, and `#rrggbb` for everything else.
///
/// # Examples
///
/// ```
/// use vu_core::color::{xterm_color, Color};
///
/// assert_eq!(xterm_color(1).to_string(), "maroon");
/// assert_eq!(xterm_color(196).to_string(), "#ff0000");
/// assert_eq!(Color::Rgb(0, 0, 0).to_string(), "#000000");
/// assert_eq!(Color::Unset.to_string(), "");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Color {
    /// No color set — inherit whatever is already in effect.
    #[default]
    Unset,
    /// The terminal's configured default color (SGR 39 / 49).
    Default,
    /// One of the classic 16 palette colors, by name.
    Name(&'static str),
    /// A concrete 24-bit color.
    Rgb(u8, u8, u8),
}

impl Color {
    /// Whether this color carries no information (inherit).
    #[inline]
    #[must_use]
    pub const fn is_unset(self) -> bool {
        matches!(self, Self::Unset)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => Ok(()),
            Self::Default => f.write_str("default"),
            Self::Name(name) => f.write_str(name),
            Self::Rgb(r, g, b) => write!(f, "#{r:02x}{g:02x}{b:02x}"),
        }
    }
}

// ─── Palette ─────────────────────────────────────────────────────────────────

/// The classic 16-color palette, indexed 0–15.
///
/// Names follow the X11/tcell convention ("maroon" for low-intensity
/// red, "red" for its bright counterpart) so indices map onto the same
/// symbolic colors a terminal theme overrides.
const PALETTE: [&str; 16] = [
    "black", "maroon", "green", "olive", "navy", "purple", "teal", "silver",
    "gray", "red", "lime", "yellow", "blue", "fuchsia", "aqua", "white",
];

/// Map an ANSI color index (0–255) to a [`Color`].
///
/// - 0–15: named palette color.
/// - 16–231: 6×6×6 color cube. Each component is 0–5, scaled to 0–255
///   as `255 * component / 5`.
/// - 232–255: 24-step grayscale ramp, `255 * (index - 232) / 23`.
/// - Anything above 255 is out of range and maps to [`Color::Unset`].
///
/// # Examples
///
/// ```
/// use vu_core::color::{xterm_color, Color};
///
/// assert_eq!(xterm_color(0), Color::Name("black"));
/// assert_eq!(xterm_color(16), Color::Rgb(0, 0, 0));
/// assert_eq!(xterm_color(231), Color::Rgb(255, 255, 255));
/// assert_eq!(xterm_color(999), Color::Unset);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation)] // components are bounded by construction
pub fn xterm_color(index: u32) -> Color {
    match index {
        0..=15 => Color::Name(PALETTE[index as usize]),
        16..=231 => {
            let n = index - 16;
            let r = n / 36;
            let g = (n / 6) % 6;
            let b = n % 6;
            Color::Rgb((255 * r / 5) as u8, (255 * g / 5) as u8, (255 * b / 5) as u8)
        }
        232..=255 => {
            let grey = (255 * (index - 232) / 23) as u8;
            Color::Rgb(grey, grey, grey)
        }
        _ => Color::Unset,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
