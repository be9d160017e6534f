// SPDX-License-Identifier: MIT
//
// Line buffer — the growing sequence of raw lines behind the screen.
//
// One background producer (fed by the external line source) appends
// lines and eventually marks EOF, while any number of consumers read
// lines and request parsed contents to redraw the screen. The three
// buffer fields (lines, count, EOF flag) live under a single mutex;
// every accessor holds it only for O(1) bookkeeping. Parsing happens
// outside the lock — a consumer that misses the content cache clones
// the raw line out, parses, and inserts the result.
//
// Raw lines are the source of truth. Parsed contents are derived, soft
// state: the cache may evict anything at any time and a miss simply
// re-parses, so correctness never depends on what the cache holds.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace};

use crate::cache::ContentCache;
use crate::cell::LineContents;
use crate::error::Error;
use crate::parse::ContentParser;

/// Initial capacity for the raw line vector.
const INITIAL_LINES: usize = 1000;

/// Default total-cost budget for the content cache. With unit cost per
/// line this comfortably covers several screens of scroll-back.
const DEFAULT_CACHE_BUDGET: u32 = 1000;

/// The producer-mutated trio guarded by one lock.
#[derive(Debug)]
struct RawLines {
    /// Raw text lines, append-only, no embedded newlines.
    lines: Vec<String>,
    /// Number of lines read so far. Monotonically non-decreasing.
    end_num: usize,
    /// True once no more lines will ever be appended.
    eof: bool,
}

// ─── LineBuffer ──────────────────────────────────────────────────────────────

/// Concurrent line buffer with lazily parsed, cached contents.
///
/// Created empty at session start; grows for the life of the input
/// stream. The producer side is [`append_line`](Self::append_line) and
/// [`mark_eof`](Self::mark_eof); everything else is a consumer-safe
/// read. All methods take `&self` and may be called from any thread.
///
/// # Examples
///
/// ```
/// use vu_core::buffer::LineBuffer;
///
/// let buffer = LineBuffer::new();
/// buffer.append_line("hello \x1b[31mworld".into());
/// buffer.mark_eof();
///
/// assert_eq!(buffer.line_count(), 1);
/// assert!(buffer.is_eof());
/// let lc = buffer.contents(0, 8).unwrap();
/// assert_eq!(lc.len(), 11);
/// ```
#[derive(Debug)]
pub struct LineBuffer {
    raw: Mutex<RawLines>,
    cache: ContentCache,
    parser: ContentParser,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineBuffer {
    /// Create an empty buffer with the default cache budget.
    #[must_use]
    pub fn new() -> Self {
        Self::with_parser(ContentParser::new(), DEFAULT_CACHE_BUDGET)
    }

    /// Create an empty buffer with a configured parser (overstrike
    /// styles) and content-cache cost budget.
    #[must_use]
    pub fn with_parser(parser: ContentParser, cache_budget: u32) -> Self {
        Self {
            raw: Mutex::new(RawLines {
                lines: Vec::with_capacity(INITIAL_LINES),
                end_num: 0,
                eof: false,
            }),
            cache: ContentCache::new(cache_budget),
            parser,
        }
    }

    /// Lock the raw state. A poisoned lock is recovered by taking the
    /// inner value: every critical section is a single field update, so
    /// the state is never observably half-written.
    fn raw(&self) -> MutexGuard<'_, RawLines> {
        self.raw.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ─── Producer side ───────────────────────────────────────────────────

    /// Append one raw line. Producer-only.
    pub fn append_line(&self, line: String) {
        let mut raw = self.raw();
        raw.lines.push(line);
        raw.end_num += 1;
    }

    /// Mark that no more lines will ever arrive. Idempotent.
    pub fn mark_eof(&self) {
        let mut raw = self.raw();
        if !raw.eof {
            raw.eof = true;
            debug!(lines = raw.end_num, "input complete");
        }
    }

    // ─── Consumer side ───────────────────────────────────────────────────

    /// The raw line at index `n`, or an empty string when `n` is out of
    /// range. Out of range is a defined empty result, not an error —
    /// renderers rely on it to pad past EOF.
    #[must_use]
    pub fn line(&self, n: usize) -> String {
        let raw = self.raw();
        raw.lines.get(n).cloned().unwrap_or_default()
    }

    /// Number of lines currently buffered.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.raw().end_num
    }

    /// Whether the input stream has ended.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.raw().eof
    }

    /// Parsed contents for line `n` at the given tab width.
    ///
    /// Returns the cached cells when present; otherwise parses the raw
    /// line (outside the buffer lock), stores the result at unit cost,
    /// and returns it.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] when `n >= line_count()`.
    pub fn contents(&self, n: usize, tab_width: i32) -> Result<Arc<LineContents>, Error> {
        let count = self.line_count();
        if n >= count {
            return Err(Error::OutOfRange { line: n, count });
        }

        if let Some(lc) = self.cache.get(n) {
            return Ok(lc);
        }

        trace!(line = n, "content cache miss, parsing");
        let lc = Arc::new(self.parser.parse(&self.line(n), tab_width));
        self.cache.set(n, Arc::clone(&lc), 1);
        Ok(lc)
    }

    /// Like [`contents`](Self::contents), but out of range yields empty
    /// contents instead of an error. Convenience for render loops that
    /// pad rows past the end of input.
    #[must_use]
    pub fn contents_or_empty(&self, n: usize, tab_width: i32) -> Arc<LineContents> {
        self.contents(n, tab_width)
            .unwrap_or_else(|_| Arc::new(LineContents::new()))
    }

    /// Drop all cached contents.
    ///
    /// Must be called after any change to a parsing parameter that
    /// affects cell layout (tab width): cached cells encode tab-width
    /// dependent column positions. Safe to call concurrently with
    /// ongoing reads — a racing read just re-parses.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
