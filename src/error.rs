// SPDX-License-Identifier: MIT
//
// Error kinds for the buffer boundary.
//
// Parsing never fails (malformed input degrades, see `parse`), and the
// cache is statically typed, so the only error the core produces is a
// line number outside the buffer. Input open/read failures belong to
// the external line source and are propagated by it, not re-wrapped
// here.

/// Errors returned by [`LineBuffer`](crate::buffer::LineBuffer).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The requested line number is outside `[0, line_count)`.
    ///
    /// Recoverable: renderers treat it as "nothing to show" and pad.
    #[error("line {line} is out of range (buffer holds {count} lines)")]
    OutOfRange {
        /// The requested line number.
        line: usize,
        /// The buffer's line count at the time of the request.
        count: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_message() {
        let err = Error::OutOfRange { line: 12, count: 3 };
        assert_eq!(
            err.to_string(),
            "line 12 is out of range (buffer holds 3 lines)"
        );
    }
}
