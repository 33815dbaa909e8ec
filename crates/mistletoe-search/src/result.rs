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

use crate::stats::SolverStatistics;
use mistletoe_model::assignment::Assignment;

/// The result of a search.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverResult {
    /// The search space was exhausted without finding a feasible assignment.
    Infeasible,
    /// An assignment was found and proven to have maximum weight.
    Optimal(Assignment),
    /// The search was stopped early. Carries the best assignment found so far,
    /// without a proof of optimality.
    Cancelled(Option<Assignment>),
}

impl SolverResult {
    /// Returns the carried assignment, if any.
    #[inline]
    pub fn assignment(&self) -> Option<&Assignment> {
        match self {
            SolverResult::Optimal(assignment) => Some(assignment),
            SolverResult::Cancelled(assignment) => assignment.as_ref(),
            SolverResult::Infeasible => None,
        }
    }

    /// Returns the objective of the carried assignment, if any.
    #[inline]
    pub fn objective(&self) -> Option<f64> {
        self.assignment().map(Assignment::objective)
    }
}

impl std::fmt::Display for SolverResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverResult::Infeasible => write!(f, "Infeasible"),
            SolverResult::Optimal(assignment) => {
                write!(f, "Optimal(objective={})", assignment.objective())
            }
            SolverResult::Cancelled(Some(assignment)) => {
                write!(f, "Cancelled(objective={})", assignment.objective())
            }
            SolverResult::Cancelled(None) => write!(f, "Cancelled(no solution)"),
        }
    }
}

/// Why the search stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationReason {
    /// The search space was exhausted and a solution was found.
    OptimalityProven,
    /// The search space was exhausted without a solution.
    InfeasibilityProven,
    /// A monitor or external signal stopped the search.
    /// The string describes what triggered it.
    Aborted(String),
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminationReason::OptimalityProven => write!(f, "Optimality Proven"),
            TerminationReason::InfeasibilityProven => write!(f, "Infeasibility Proven"),
            TerminationReason::Aborted(reason) => write!(f, "Aborted: {}", reason),
        }
    }
}

/// A result together with its termination reason and aggregated statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOutcome {
    pub result: SolverResult,
    pub reason: TerminationReason,
    pub statistics: SolverStatistics,
}

impl SolverOutcome {
    #[inline]
    pub fn new(
        result: SolverResult,
        reason: TerminationReason,
        statistics: SolverStatistics,
    ) -> Self {
        Self {
            result,
            reason,
            statistics,
        }
    }

    #[inline]
    pub fn optimal(assignment: Assignment, statistics: SolverStatistics) -> Self {
        Self::new(
            SolverResult::Optimal(assignment),
            TerminationReason::OptimalityProven,
            statistics,
        )
    }

    #[inline]
    pub fn infeasible(statistics: SolverStatistics) -> Self {
        Self::new(
            SolverResult::Infeasible,
            TerminationReason::InfeasibilityProven,
            statistics,
        )
    }

    #[inline]
    pub fn cancelled<S>(
        best: Option<Assignment>,
        reason: S,
        statistics: SolverStatistics,
    ) -> Self
    where
        S: Into<String>,
    {
        Self::new(
            SolverResult::Cancelled(best),
            TerminationReason::Aborted(reason.into()),
            statistics,
        )
    }

    #[inline]
    pub fn is_optimal(&self) -> bool {
        matches!(self.result, SolverResult::Optimal(_))
    }

    #[inline]
    pub fn is_infeasible(&self) -> bool {
        matches!(self.result, SolverResult::Infeasible)
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self.result, SolverResult::Cancelled(_))
    }

    #[inline]
    pub fn has_solution(&self) -> bool {
        self.result.assignment().is_some()
    }
}

impl std::fmt::Display for SolverOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Result: {}", self.result)?;
        writeln!(f, "Termination: {}", self.reason)?;
        write!(f, "{}", self.statistics)
    }
}
