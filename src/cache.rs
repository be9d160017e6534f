// SPDX-License-Identifier: MIT
//
// Content cache — parsed cells by line number, bounded by cost.
//
// Parsing is cheap but not free, and a pager re-renders the same
// screenful of lines on every keystroke. This cache remembers parsed
// contents per line number under a total-cost budget (not an entry
// count), evicting with an S3-FIFO policy: a small probationary queue,
// a main queue for entries that proved themselves, and a ghost list of
// recently evicted keys that earn direct re-admission to main. The
// frequency awareness means hot lines (the visible window, headers)
// survive a one-off scan through thousands of lines.
//
// Entries are soft state. A miss is never an error — the caller just
// re-parses — so eviction and `clear()` are always safe, including
// concurrently with in-flight gets.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use tracing::trace;

use crate::cell::LineContents;

/// Which queue an entry currently lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Location {
    Small,
    Main,
}

/// A cached line with its cost and access frequency.
#[derive(Debug)]
struct Entry {
    line: usize,
    contents: Arc<LineContents>,
    cost: u32,
    /// Saturating access counter, capped at 3 (S3-FIFO convention).
    freq: u8,
}

/// Cache hit/miss counters, taken as a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Lookups that found an entry.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Total cost currently held.
    pub cost: u32,
    /// Configured cost budget.
    pub budget: u32,
}

// ─── ContentCache ────────────────────────────────────────────────────────────

/// A concurrent, cost-budgeted cache of parsed line contents.
///
/// All methods take `&self`; synchronization is internal (one mutex
/// around the queues — every operation is short and allocation-free on
/// the hot path). Values are `Arc`s, so a hit hands back a shared
/// reference without cloning cells.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use vu_core::cache::ContentCache;
/// use vu_core::parse::str_to_contents;
///
/// let cache = ContentCache::new(100);
/// assert!(cache.get(0).is_none());
/// cache.set(0, Arc::new(str_to_contents("hello", 8)), 1);
/// assert_eq!(cache.get(0).unwrap().len(), 5);
/// cache.clear();
/// assert!(cache.get(0).is_none());
/// ```
#[derive(Debug)]
pub struct ContentCache {
    shelves: Mutex<Shelves>,
}

#[derive(Debug)]
struct Shelves {
    /// Line number → which queue holds it.
    index: HashMap<usize, Location>,
    /// Probationary FIFO (~10% of the budget).
    small: VecDeque<Entry>,
    /// Promoted FIFO (the rest of the budget).
    main: VecDeque<Entry>,
    /// Keys recently evicted from small; re-admission goes to main.
    ghost: VecDeque<usize>,
    budget: u32,
    small_budget: u32,
    ghost_cap: usize,
    small_cost: u32,
    main_cost: u32,
    hits: u64,
    misses: u64,
}

impl ContentCache {
    /// Create a cache with the given total cost budget (minimum 2).
    #[must_use]
    pub fn new(budget: u32) -> Self {
        let budget = budget.max(2);
        let small_budget = (budget / 10).max(1);
        Self {
            shelves: Mutex::new(Shelves {
                index: HashMap::new(),
                small: VecDeque::new(),
                main: VecDeque::new(),
                ghost: VecDeque::new(),
                budget,
                small_budget,
                ghost_cap: small_budget as usize,
                small_cost: 0,
                main_cost: 0,
                hits: 0,
                misses: 0,
            }),
        }
    }

    /// Look up the contents cached for a line number.
    ///
    /// A hit bumps the entry's frequency counter; a miss (including a
    /// lookup racing a [`clear`](Self::clear)) returns `None` and the
    /// caller re-parses.
    #[must_use]
    pub fn get(&self, line: usize) -> Option<Arc<LineContents>> {
        let Ok(mut shelves) = self.shelves.lock() else {
            return None;
        };
        shelves.get(line)
    }

    /// Insert contents for a line at the given cost.
    ///
    /// Evicts as needed to stay within the budget. An item costing more
    /// than the whole budget is not admitted (the cache stays useful
    /// for everything else). Re-inserting an existing line replaces its
    /// value in place.
    pub fn set(&self, line: usize, contents: Arc<LineContents>, cost: u32) {
        if let Ok(mut shelves) = self.shelves.lock() {
            shelves.set(line, contents, cost);
        }
    }

    /// Drop every entry.
    ///
    /// Required whenever a parsing parameter that affects cell layout
    /// (tab width) changes, since cached cells encode column positions.
    pub fn clear(&self) {
        if let Ok(mut shelves) = self.shelves.lock() {
            shelves.clear();
            trace!("content cache cleared");
        }
    }

    /// Snapshot of the hit/miss counters and current cost.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.shelves.lock().map_or_else(
            |_| CacheStats::default(),
            |shelves| CacheStats {
                hits: shelves.hits,
                misses: shelves.misses,
                cost: shelves.small_cost + shelves.main_cost,
                budget: shelves.budget,
            },
        )
    }
}

impl Shelves {
    fn get(&mut self, line: usize) -> Option<Arc<LineContents>> {
        let location = match self.index.get(&line) {
            Some(&location) => location,
            None => {
                self.misses += 1;
                return None;
            }
        };
        let queue = match location {
            Location::Small => &mut self.small,
            Location::Main => &mut self.main,
        };
        let entry = queue.iter_mut().find(|entry| entry.line == line)?;
        entry.freq = entry.freq.saturating_add(1).min(3);
        self.hits += 1;
        Some(Arc::clone(&entry.contents))
    }

    fn set(&mut self, line: usize, contents: Arc<LineContents>, cost: u32) {
        if cost > self.budget {
            trace!(line, cost, budget = self.budget, "entry exceeds cache budget, not admitted");
            return;
        }

        // Replace in place when the line is already cached.
        if let Some(&location) = self.index.get(&line) {
            let (queue, total) = match location {
                Location::Small => (&mut self.small, &mut self.small_cost),
                Location::Main => (&mut self.main, &mut self.main_cost),
            };
            if let Some(entry) = queue.iter_mut().find(|entry| entry.line == line) {
                *total = *total - entry.cost + cost;
                entry.contents = contents;
                entry.cost = cost;
                entry.freq = entry.freq.saturating_add(1).min(3);
            }
            // Replacing can push the total over budget.
            self.evict_to_fit(0);
            return;
        }

        // Ghost membership is read before eviction so the incoming
        // entry cannot push its own key off the ghost list first.
        let was_ghost = self.ghost.contains(&line);
        if was_ghost {
            self.ghost.retain(|&key| key != line);
        }

        self.evict_to_fit(cost);
        let entry = Entry {
            line,
            contents,
            cost,
            freq: 0,
        };
        if was_ghost {
            // The key was evicted recently and is wanted again: skip
            // probation.
            self.main_cost += cost;
            self.index.insert(line, Location::Main);
            self.main.push_back(entry);
        } else {
            self.small_cost += cost;
            self.index.insert(line, Location::Small);
            self.small.push_back(entry);
        }
    }

    /// Evict until `incoming` more cost fits within the budget.
    fn evict_to_fit(&mut self, incoming: u32) {
        while self.small_cost + self.main_cost + incoming > self.budget {
            if self.small_cost > self.small_budget || self.main.is_empty() {
                if !self.evict_small() {
                    break;
                }
            } else if !self.evict_main() {
                break;
            }
        }
    }

    /// Evict one entry from the small queue. Entries that were accessed
    /// at least once get promoted to main instead; the evicted key is
    /// remembered on the ghost list. Returns false if nothing happened.
    fn evict_small(&mut self) -> bool {
        let Some(entry) = self.small.pop_front() else {
            return false;
        };
        self.small_cost -= entry.cost;
        if entry.freq > 0 {
            self.main_cost += entry.cost;
            self.index.insert(entry.line, Location::Main);
            self.main.push_back(entry);
            // Promotion moved cost to main; if we're still over budget
            // the outer loop evicts from main next.
            if self.main_cost + self.small_cost > self.budget {
                return self.evict_main();
            }
        } else {
            self.index.remove(&entry.line);
            if self.ghost.len() == self.ghost_cap {
                self.ghost.pop_front();
            }
            self.ghost.push_back(entry.line);
        }
        true
    }

    /// Evict one entry from the main queue, giving recently used
    /// entries a second lap (frequency decrements on each pass).
    fn evict_main(&mut self) -> bool {
        let mut lap = self.main.len();
        while let Some(mut entry) = self.main.pop_front() {
            if entry.freq > 0 && lap > 0 {
                entry.freq -= 1;
                lap -= 1;
                self.main.push_back(entry);
                continue;
            }
            self.main_cost -= entry.cost;
            self.index.remove(&entry.line);
            return true;
        }
        false
    }

    fn clear(&mut self) {
        self.index.clear();
        self.small.clear();
        self.main.clear();
        self.ghost.clear();
        self.small_cost = 0;
        self.main_cost = 0;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use crate::style::Style;

    fn contents(text: &str) -> Arc<LineContents> {
        Arc::new(text.chars().map(|c| Cell::new(c, 1, Style::DEFAULT)).collect())
    }

    #[test]
    fn miss_then_hit() {
        let cache = ContentCache::new(100);
        assert!(cache.get(7).is_none());
        cache.set(7, contents("abc"), 1);
        assert_eq!(cache.get(7).unwrap().len(), 3);
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn replace_in_place() {
        let cache = ContentCache::new(100);
        cache.set(0, contents("old"), 1);
        cache.set(0, contents("newer"), 1);
        assert_eq!(cache.get(0).unwrap().len(), 5);
        assert_eq!(cache.stats().cost, 1);
    }

    #[test]
    fn clear_empties_everything() {
        let cache = ContentCache::new(100);
        for line in 0..10 {
            cache.set(line, contents("x"), 1);
        }
        cache.clear();
        for line in 0..10 {
            assert!(cache.get(line).is_none());
        }
        assert_eq!(cache.stats().cost, 0);
    }

    #[test]
    fn stays_within_budget() {
        let cache = ContentCache::new(10);
        for line in 0..50 {
            cache.set(line, contents("x"), 1);
        }
        assert!(cache.stats().cost <= 10);
    }

    #[test]
    fn oversized_entry_not_admitted() {
        let cache = ContentCache::new(10);
        cache.set(0, contents("huge"), 11);
        assert!(cache.get(0).is_none());
        assert_eq!(cache.stats().cost, 0);
    }

    #[test]
    fn hot_entries_survive_a_scan() {
        let cache = ContentCache::new(20);
        // Establish a hot line and access it repeatedly so it promotes.
        cache.set(0, contents("hot"), 1);
        for _ in 0..3 {
            assert!(cache.get(0).is_some());
        }
        // A long one-off scan should not dislodge it.
        for line in 1..200 {
            cache.set(line, contents("cold"), 1);
        }
        assert!(cache.get(0).is_some(), "hot line evicted by scan");
    }

    #[test]
    fn ghost_readmission_skips_probation() {
        let cache = ContentCache::new(10);
        cache.set(0, contents("a"), 1);
        // The eleventh insert pushes line 0 (never accessed) out of the
        // small queue and onto the ghost list.
        for line in 1..=10 {
            cache.set(line, contents("x"), 1);
        }
        assert!(cache.get(0).is_none());
        // Re-inserting a ghosted key lands it in main directly; it then
        // outlives another cold scan of the small queue.
        cache.set(0, contents("a"), 1);
        for line in 11..=14 {
            cache.set(line, contents("x"), 1);
        }
        assert!(cache.get(0).is_some());
    }

    #[test]
    fn concurrent_get_set_clear() {
        let cache = Arc::new(ContentCache::new(64));
        let writers: Vec<_> = (0..3)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..500 {
                        cache.set(t * 1000 + i, contents("line"), 1);
                        let _ = cache.get(t * 1000 + (i / 2));
                        if i % 100 == 0 {
                            cache.clear();
                        }
                    }
                })
            })
            .collect();
        for handle in writers {
            handle.join().unwrap();
        }
        // Still functional after the churn.
        cache.set(1, contents("ok"), 1);
        assert!(cache.get(1).is_some());
    }
}
