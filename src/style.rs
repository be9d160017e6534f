// SPDX-License-Identifier: MIT
//
// Style — the attribute record carried by every display cell.
//
// A style is a small value type: a bitfield of text attributes plus a
// foreground and background color. Styles are never mutated in place;
// the SGR resolver derives new values by combining a parsed delta onto
// a base, which keeps cached deltas safe to share between lines.

use crate::color::Color;

// ─── Text Attributes ─────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Text attributes stored as a compact bitfield.
    ///
    /// These map directly to SGR (Select Graphic Rendition) parameters.
    /// Combine with bitwise OR:
    ///
    /// ```
    /// use vu_core::style::Attr;
    ///
    /// let attrs = Attr::BOLD | Attr::UNDERLINE;
    /// assert!(attrs.contains(Attr::BOLD));
    /// assert!(!attrs.contains(Attr::BLINK));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1 — increased intensity.
        const BOLD          = 1 << 0;
        /// SGR 2 — decreased intensity (faint).
        const DIM           = 1 << 1;
        /// SGR 3 — italic or oblique.
        const ITALIC        = 1 << 2;
        /// SGR 4 — underline.
        const UNDERLINE     = 1 << 3;
        /// SGR 5 / 6 — blinking text.
        const BLINK         = 1 << 4;
        /// SGR 7 / 8 — swap foreground and background.
        const REVERSE       = 1 << 5;
        /// SGR 9 — crossed-out text.
        const STRIKETHROUGH = 1 << 6;
    }
}

// ─── Style ───────────────────────────────────────────────────────────────────

/// A resolved cell style: attribute flags plus foreground/background.
///
/// [`Color::Unset`] means "inherit" — when a style is used as a delta,
/// an unset color leaves the base color alone while a set one (including
/// [`Color::Default`], the explicit SGR 39/49 reset) replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Style {
    /// Active text attributes.
    pub attrs: Attr,
    /// Foreground color. `Unset` inherits.
    pub fg: Color,
    /// Background color. `Unset` inherits.
    pub bg: Color,
}

impl Style {
    /// The all-default style: no attributes, both colors unset.
    pub const DEFAULT: Self = Self {
        attrs: Attr::empty(),
        fg: Color::Unset,
        bg: Color::Unset,
    };

    /// A style consisting of a single attribute set.
    #[inline]
    #[must_use]
    pub const fn from_attr(attrs: Attr) -> Self {
        Self {
            attrs,
            fg: Color::Unset,
            bg: Color::Unset,
        }
    }

    /// This style with an extra attribute turned on.
    #[inline]
    #[must_use]
    pub const fn with_attr(mut self, attr: Attr) -> Self {
        self.attrs = self.attrs.union(attr);
        self
    }

    /// Combine a parsed delta onto this style, returning the result.
    ///
    /// Attributes accumulate (bitwise OR); each color is replaced only
    /// when the delta actually sets one. This mirrors how a terminal
    /// applies an SGR sequence on top of its current state.
    ///
    /// # Examples
    ///
    /// ```
    /// use vu_core::color::Color;
    /// use vu_core::style::{Attr, Style};
    ///
    /// let base = Style::from_attr(Attr::BOLD);
    /// let delta = Style { fg: Color::Name("maroon"), ..Style::DEFAULT };
    /// let combined = base.apply(delta);
    /// assert!(combined.attrs.contains(Attr::BOLD));
    /// assert_eq!(combined.fg, Color::Name("maroon"));
    /// ```
    #[inline]
    #[must_use]
    pub fn apply(self, delta: Self) -> Self {
        Self {
            attrs: self.attrs | delta.attrs,
            fg: if delta.fg.is_unset() { self.fg } else { delta.fg },
            bg: if delta.bg.is_unset() { self.bg } else { delta.bg },
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty() {
        let s = Style::default();
        assert_eq!(s, Style::DEFAULT);
        assert!(s.attrs.is_empty());
        assert!(s.fg.is_unset());
        assert!(s.bg.is_unset());
    }

    #[test]
    fn apply_accumulates_attrs() {
        let base = Style::from_attr(Attr::BOLD);
        let delta = Style::from_attr(Attr::UNDERLINE);
        assert_eq!(base.apply(delta).attrs, Attr::BOLD | Attr::UNDERLINE);
    }

    #[test]
    fn apply_unset_color_inherits() {
        let base = Style {
            fg: Color::Name("green"),
            ..Style::DEFAULT
        };
        let combined = base.apply(Style::from_attr(Attr::DIM));
        assert_eq!(combined.fg, Color::Name("green"));
        assert!(combined.attrs.contains(Attr::DIM));
    }

    #[test]
    fn apply_set_color_replaces() {
        let base = Style {
            fg: Color::Name("green"),
            bg: Color::Name("black"),
            ..Style::DEFAULT
        };
        let delta = Style {
            fg: Color::Rgb(1, 2, 3),
            bg: Color::Default,
            ..Style::DEFAULT
        };
        let combined = base.apply(delta);
        assert_eq!(combined.fg, Color::Rgb(1, 2, 3));
        // An explicit "default" (SGR 39/49) replaces, unlike Unset.
        assert_eq!(combined.bg, Color::Default);
    }

    #[test]
    fn with_attr_adds() {
        let s = Style::DEFAULT.with_attr(Attr::REVERSE);
        assert!(s.attrs.contains(Attr::REVERSE));
        assert!(s.fg.is_unset());
    }
}
