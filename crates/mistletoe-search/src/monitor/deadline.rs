// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Deadline Monitor
//!
//! A lightweight monitor that stops the search at an absolute wall-clock
//! `Instant`. Reading the clock on every node would dominate the cost of cheap
//! nodes, so the monitor only looks at it when `(steps & clock_check_mask) == 0`.
//! The default mask (`0x3FF`) checks about every 1,024 steps. The first step
//! is always checked, so a deadline that has already passed stops the search
//! at the root.
//!
//! A relative time limit is turned into a deadline once, when the monitor is
//! built. Workers started later in the same solve therefore share one budget.
//!
//! ## Usage
//!
//! ```rust
//! use mistletoe_search::monitor::deadline::DeadlineMonitor;
//! use mistletoe_search::monitor::search_monitor::{SearchCommand, SearchMonitor};
//! use std::time::{Duration, Instant};
//!
//! let mut mon = DeadlineMonitor::new(Instant::now() - Duration::from_millis(1));
//! mon.on_step();
//! assert!(matches!(mon.search_command(), SearchCommand::Terminate(_)));
//! ```

use crate::monitor::search_monitor::{SearchCommand, SearchMonitor};
use mistletoe_model::{assignment::Assignment, model::ConstraintModel};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadlineMonitor {
    clock_check_mask: u64,
    steps: u64,
    due: bool,
    deadline: Option<Instant>,
}

impl DeadlineMonitor {
    /// 1024 - 1 = 1023 = 0x3FF
    pub const DEFAULT_STEP_CLOCK_CHECK_MASK: u64 = 0x3FF;

    #[inline]
    pub fn new(deadline: Instant) -> Self {
        Self::with_clock_check_mask(deadline, Self::DEFAULT_STEP_CLOCK_CHECK_MASK)
    }

    #[inline]
    pub fn with_clock_check_mask(deadline: Instant, clock_check_mask: u64) -> Self {
        Self {
            clock_check_mask,
            steps: 0,
            due: false,
            deadline: Some(deadline),
        }
    }

    /// Creates a monitor whose deadline is `time_limit` from now. A limit too
    /// large to represent never expires.
    #[inline]
    pub fn from_time_limit(time_limit: Duration) -> Self {
        Self {
            clock_check_mask: Self::DEFAULT_STEP_CLOCK_CHECK_MASK,
            steps: 0,
            due: false,
            deadline: Instant::now().checked_add(time_limit),
        }
    }

    #[inline]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

impl SearchMonitor for DeadlineMonitor {
    fn name(&self) -> &str {
        "DeadlineMonitor"
    }

    fn on_enter_search(&mut self, _model: &ConstraintModel) {
        self.steps = 0;
        self.due = false;
    }

    fn on_exit_search(&mut self) {}

    fn on_solution_found(&mut self, _assignment: &Assignment) {}

    #[inline(always)]
    fn on_step(&mut self) {
        self.due = (self.steps & self.clock_check_mask) == 0;
        self.steps = self.steps.wrapping_add(1);
    }

    #[inline(always)]
    fn search_command(&self) -> SearchCommand {
        if self.due
            && self
                .deadline
                .is_some_and(|deadline| Instant::now() >= deadline)
        {
            return SearchCommand::Terminate("deadline reached".to_string());
        }
        SearchCommand::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn past() -> Instant {
        Instant::now() - Duration::from_millis(5)
    }

    #[test]
    fn test_no_check_before_first_step() {
        let mon = DeadlineMonitor::new(past());
        assert_eq!(mon.search_command(), SearchCommand::Continue);
    }

    #[test]
    fn test_elapsed_deadline_stops_on_first_step() {
        let mut mon = DeadlineMonitor::new(past());
        mon.on_step();
        assert_eq!(
            mon.search_command(),
            SearchCommand::Terminate("deadline reached".to_string())
        );
    }

    #[test]
    fn test_mask_skips_intermediate_steps() {
        let mut mon = DeadlineMonitor::with_clock_check_mask(past(), 0b11);
        mon.on_step(); // step 0: checked
        assert!(matches!(mon.search_command(), SearchCommand::Terminate(_)));
        for _ in 0..3 {
            mon.on_step(); // steps 1..=3: skipped
            assert_eq!(mon.search_command(), SearchCommand::Continue);
        }
        mon.on_step(); // step 4: checked
        assert!(matches!(mon.search_command(), SearchCommand::Terminate(_)));
    }

    #[test]
    fn test_future_deadline_continues() {
        let mut mon = DeadlineMonitor::from_time_limit(Duration::from_secs(3600));
        assert!(mon.deadline().is_some());
        for _ in 0..2048 {
            mon.on_step();
            assert_eq!(mon.search_command(), SearchCommand::Continue);
        }
    }

    #[test]
    fn test_unrepresentable_limit_never_expires() {
        let mut mon = DeadlineMonitor::from_time_limit(Duration::MAX);
        assert!(mon.deadline().is_none());
        mon.on_step();
        assert_eq!(mon.search_command(), SearchCommand::Continue);
    }
}
