//! Book State Machine
//!
//! Owns the page the user asked for (`target_page`), the page the book is
//! actually showing (`displayed_page`) and the narrow-viewport focus side.
//!
//! The displayed page never jumps. A settle loop walks it toward the target
//! one spread at a time: quickly (50 ms per step) while far away, then at a
//! readable pace (150 ms) for the last two steps. Time is passed in
//! explicitly, so the loop is fully deterministic under a synthetic clock.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Delay between steps while more than [`FAST_DISTANCE`] spreads away.
pub const FAST_STEP_DELAY: Duration = Duration::from_millis(50);
/// Delay between the final steps.
pub const SLOW_STEP_DELAY: Duration = Duration::from_millis(150);
pub const FAST_DISTANCE: usize = 2;

/// Which half of an open book a narrow viewport shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Focus {
    Left,
    #[default]
    Right,
}

/// One side of a spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Face {
    Front,
    Back,
}

impl Face {
    /// Side of the open book this face is seen on. Back faces belong to turned
    /// pages, which lie on the left.
    #[inline]
    #[must_use]
    pub fn side(self) -> Focus {
        match self {
            Self::Front => Focus::Right,
            Self::Back => Focus::Left,
        }
    }
}

/// A settle step that fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleStep {
    pub from: usize,
    pub to: usize,
    /// Clock time the step was due.
    pub at: Duration,
}

/// What a click on a page did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Narrow viewport: the click only brought the other half into view.
    FocusOnly(Focus),
    /// A new target page was requested.
    Turn {
        target: usize,
        focus: Focus,
        step: Option<SettleStep>,
    },
}

pub type SettleSteps = SmallVec<[SettleStep; 4]>;

#[derive(Debug, Clone, Default)]
pub struct BookState {
    target_page: usize,
    displayed_page: usize,
    total_spreads: usize,
    focus: Focus,
    /// Due time of the single pending step, if any.
    next_step_at: Option<Duration>,
}

impl BookState {
    #[must_use]
    pub fn new(total_spreads: usize) -> Self {
        Self {
            total_spreads,
            ..Self::default()
        }
    }

    // ========================================================================
    // Observers
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn target_page(&self) -> usize {
        self.target_page
    }

    #[inline]
    #[must_use]
    pub fn displayed_page(&self) -> usize {
        self.displayed_page
    }

    #[inline]
    #[must_use]
    pub fn total_spreads(&self) -> usize {
        self.total_spreads
    }

    #[inline]
    #[must_use]
    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// Shows the front or back cover only.
    #[inline]
    #[must_use]
    pub fn is_book_closed(&self) -> bool {
        self.displayed_page == 0 || self.displayed_page == self.total_spreads
    }

    /// Spread `spread` has been turned to the left.
    #[inline]
    #[must_use]
    pub fn is_opened(&self, spread: usize) -> bool {
        self.displayed_page > spread
    }

    #[inline]
    #[must_use]
    pub fn is_settling(&self) -> bool {
        self.next_step_at.is_some()
    }

    #[inline]
    #[must_use]
    pub fn next_step_at(&self) -> Option<Duration> {
        self.next_step_at
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Replaces the spread count. Both indices are re-clamped and the pending
    /// step is dropped; if the displayed page still differs from the target
    /// the settle resumes with a step due at `now`.
    pub fn set_total_spreads(&mut self, total: usize, now: Duration) {
        self.total_spreads = total;
        self.target_page = self.target_page.min(total);
        self.displayed_page = self.displayed_page.min(total);
        self.next_step_at = (self.displayed_page != self.target_page).then_some(now);
    }

    /// Returns `true` if the focus changed.
    pub fn set_focus(&mut self, focus: Focus) -> bool {
        let changed = self.focus != focus;
        self.focus = focus;
        changed
    }

    /// Requests a page. Out-of-range indices are clamped.
    ///
    /// A new target cancels the pending step and takes the first step
    /// right away, which is returned.
    pub fn set_target_page(&mut self, index: usize, now: Duration) -> Option<SettleStep> {
        let index = index.min(self.total_spreads);
        if index == self.target_page {
            return None;
        }

        log::debug!(
            "Target page {} -> {index} (displayed {})",
            self.target_page,
            self.displayed_page
        );
        self.target_page = index;
        self.next_step_at = None;

        (self.displayed_page != self.target_page).then(|| self.step(now))
    }

    /// Fires every step due at or before `now`, in order.
    pub fn tick(&mut self, now: Duration) -> SettleSteps {
        let mut fired = SettleSteps::new();
        while let Some(due) = self.next_step_at {
            if due > now {
                break;
            }
            fired.push(self.step(due));
        }
        fired
    }

    /// Applies a click on `face` of `spread`.
    ///
    /// `narrow` enables the single-page refinement: while the book is open,
    /// clicking the half that is not in focus only moves the focus there.
    pub fn click(
        &mut self,
        spread: usize,
        face: Face,
        narrow: bool,
        now: Duration,
    ) -> ClickOutcome {
        if narrow && !self.is_book_closed() && face.side() != self.focus {
            self.focus = face.side();
            return ClickOutcome::FocusOnly(self.focus);
        }

        let opened = self.is_opened(spread);
        let target = if opened { spread } else { spread + 1 };
        // Turning an opened page back keeps the reader on the left half
        self.focus = if opened && spread < self.target_page {
            Focus::Left
        } else {
            Focus::Right
        };

        let step = self.set_target_page(target, now);
        ClickOutcome::Turn {
            target: self.target_page,
            focus: self.focus,
            step,
        }
    }

    fn step(&mut self, at: Duration) -> SettleStep {
        let from = self.displayed_page;
        let distance = from.abs_diff(self.target_page);
        self.displayed_page = if self.target_page > from { from + 1 } else { from - 1 };

        self.next_step_at = (self.displayed_page != self.target_page).then(|| {
            at + if distance > FAST_DISTANCE {
                FAST_STEP_DELAY
            } else {
                SLOW_STEP_DELAY
            }
        });

        log::trace!("Settle step {from} -> {} at {at:?}", self.displayed_page);
        SettleStep {
            from,
            to: self.displayed_page,
            at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn first_step_is_immediate() {
        let mut s = BookState::new(10);
        let step = s.set_target_page(5, ms(0)).unwrap();
        assert_eq!((step.from, step.to), (0, 1));
        assert_eq!(s.next_step_at(), Some(ms(50)));
    }

    #[test]
    fn clamps_to_total() {
        let mut s = BookState::new(3);
        s.set_target_page(99, ms(0));
        assert_eq!(s.target_page(), 3);
    }

    #[test]
    fn retarget_to_displayed_at_rest_is_noop() {
        let mut s = BookState::new(3);
        assert!(s.set_target_page(0, ms(0)).is_none());
        assert!(!s.is_settling());
    }

    #[test]
    fn narrow_click_on_unfocused_half_only_moves_focus() {
        let mut s = BookState::new(4);
        s.set_target_page(2, ms(0));
        s.tick(ms(1000));
        assert_eq!(s.displayed_page(), 2);
        assert_eq!(s.focus(), Focus::Right);

        let outcome = s.click(1, Face::Back, true, ms(2000));
        assert_eq!(outcome, ClickOutcome::FocusOnly(Focus::Left));
        assert_eq!(s.target_page(), 2);
    }
}
