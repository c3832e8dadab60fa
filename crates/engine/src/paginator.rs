//! Cursor pagination over a definition series
//!
//! A page is read in two tiers: definitions are scanned in `(first_seen,
//! id)` order, then each is resolved against its history as of the pinned
//! version. How many definitions resolve to something visible is unknown up
//! front, so every page over-fetches a lookahead window of `L` definitions
//! (plus one probe past the window) and collects up to `P + 1` visible rows.
//!
//! Each window ends in exactly one [`WindowOutcome`]:
//!
//! | Outcome | Condition | Next cursor |
//! |---------|-----------|-------------|
//! | `PageFull` | a `(P+1)`-th visible row was found | that row's position (inclusive) |
//! | `BudgetExhausted` | window scanned, fewer than `P+1` visible, more definitions beyond | position right after the window's last definition |
//! | `SeriesExhausted` | window reached the end of the series | none |
//!
//! Following next cursors with the same version and filter yields every
//! visible row exactly once, however many filtered rows sit between them.

use crate::ledger::PaginationConfig;
use ledgerview_core::{CancelToken, Cursor, Direction, EntrySource, EntryState, Result, StateVersion};
use tracing::trace;

/// How a lookahead window ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowOutcome {
    /// The page filled and another visible row exists at `next`
    PageFull {
        /// Position of the first row of the next page
        next: Cursor,
    },
    /// The lookahead budget ran out before the page filled
    BudgetExhausted {
        /// First position not yet scanned
        next: Cursor,
    },
    /// The series ended inside the window
    SeriesExhausted,
}

impl WindowOutcome {
    /// Cursor to resume from, `None` when pagination is complete
    pub fn next_cursor(&self) -> Option<Cursor> {
        match self {
            WindowOutcome::PageFull { next } | WindowOutcome::BudgetExhausted { next } => {
                Some(*next)
            }
            WindowOutcome::SeriesExhausted => None,
        }
    }
}

/// Result of one page read.
#[derive(Debug, Clone)]
pub struct Window<E> {
    /// Visible entries, at most `page_size`
    pub items: Vec<E>,
    /// How the window ended
    pub outcome: WindowOutcome,
    /// Definitions resolved while filling the page
    pub scanned: usize,
}

impl<E> Window<E> {
    /// Cursor to resume from
    pub fn next_cursor(&self) -> Option<Cursor> {
        self.outcome.next_cursor()
    }
}

/// Paginator bound to one entry source and one set of paging knobs.
pub struct CursorPaginator<'a, S> {
    source: &'a S,
    page_size: usize,
    lookahead: usize,
    direction: Direction,
}

impl<'a, S: EntrySource> CursorPaginator<'a, S> {
    /// Create a paginator.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the knobs are inconsistent.
    pub fn new(source: &'a S, config: &PaginationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            page_size: config.page_size,
            lookahead: config.definition_lookahead_limit,
            direction: config.direction,
        })
    }

    /// Read one page of non-deleted entries.
    pub fn fetch(
        &self,
        parent: &S::Parent,
        as_of: StateVersion,
        start: Option<Cursor>,
        cancel: &CancelToken,
    ) -> Result<Window<S::Entry>> {
        self.fetch_filtered(parent, as_of, start, cancel, |_| true)
    }

    /// Read one page of non-deleted entries accepted by `keep`.
    ///
    /// Entries rejected by `keep` consume lookahead like tombstones do.
    pub fn fetch_filtered<F>(
        &self,
        parent: &S::Parent,
        as_of: StateVersion,
        start: Option<Cursor>,
        cancel: &CancelToken,
        mut keep: F,
    ) -> Result<Window<S::Entry>>
    where
        F: FnMut(&S::Entry) -> bool,
    {
        cancel.check()?;
        let candidates = self.source.scan_definitions(
            parent,
            start,
            self.direction,
            as_of,
            self.lookahead.saturating_add(1),
        )?;
        let window_len = candidates.len().min(self.lookahead);
        let more_beyond = candidates.len() > self.lookahead;

        let mut items = Vec::with_capacity(self.page_size.min(window_len));
        for (scanned, position) in candidates[..window_len].iter().enumerate() {
            cancel.check()?;
            let Some(entry) = self.source.resolve_at(*position, as_of)? else {
                continue;
            };
            if entry.is_deleted() || !keep(&entry) {
                continue;
            }
            if items.len() == self.page_size {
                trace!(next = %position, scanned, "page full");
                return Ok(Window {
                    items,
                    outcome: WindowOutcome::PageFull { next: *position },
                    scanned: scanned + 1,
                });
            }
            items.push(entry);
        }

        let outcome = match candidates[..window_len].last() {
            Some(boundary) if more_beyond => match boundary.step(self.direction) {
                Some(next) => WindowOutcome::BudgetExhausted { next },
                None => WindowOutcome::SeriesExhausted,
            },
            _ => WindowOutcome::SeriesExhausted,
        };
        trace!(?outcome, scanned = window_len, "window closed");
        Ok(Window {
            items,
            outcome,
            scanned: window_len,
        })
    }
}
