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

use crate::stats::BnbSolverStatistics;
use mistletoe_model::assignment::Assignment;
use mistletoe_search::{
    result::{SolverOutcome, SolverResult, TerminationReason},
    stats::SolverStatisticsBuilder,
};

/// Result of one branch-and-bound run after termination.
///
/// When the run shares an incumbent with other workers, `Infeasible` means
/// that nothing in the explored tree beats the shared incumbent, not that the
/// whole problem is infeasible.
#[derive(Debug, Clone)]
pub struct BnbSolverOutcome {
    result: SolverResult,
    termination_reason: TerminationReason,
    statistics: BnbSolverStatistics,
}

impl BnbSolverOutcome {
    #[inline]
    pub fn optimal(assignment: Assignment, statistics: BnbSolverStatistics) -> Self {
        Self {
            result: SolverResult::Optimal(assignment),
            termination_reason: TerminationReason::OptimalityProven,
            statistics,
        }
    }

    #[inline]
    pub fn infeasible(statistics: BnbSolverStatistics) -> Self {
        Self {
            result: SolverResult::Infeasible,
            termination_reason: TerminationReason::InfeasibilityProven,
            statistics,
        }
    }

    #[inline]
    pub fn aborted<R>(
        assignment: Option<Assignment>,
        reason: R,
        statistics: BnbSolverStatistics,
    ) -> Self
    where
        R: Into<String>,
    {
        Self {
            result: SolverResult::Cancelled(assignment),
            termination_reason: TerminationReason::Aborted(reason.into()),
            statistics,
        }
    }

    #[inline]
    pub fn result(&self) -> &SolverResult {
        &self.result
    }

    #[inline]
    pub fn termination_reason(&self) -> &TerminationReason {
        &self.termination_reason
    }

    #[inline]
    pub fn statistics(&self) -> &BnbSolverStatistics {
        &self.statistics
    }

    #[inline]
    pub fn into_parts(self) -> (SolverResult, TerminationReason, BnbSolverStatistics) {
        (self.result, self.termination_reason, self.statistics)
    }
}

impl From<BnbSolverOutcome> for SolverOutcome {
    fn from(val: BnbSolverOutcome) -> Self {
        let statistics = SolverStatisticsBuilder::new()
            .solutions_found(val.statistics.solutions_found)
            .nodes_explored(val.statistics.nodes_explored)
            .prunings(val.statistics.total_prunings())
            .solve_duration(val.statistics.time_total)
            .build();
        SolverOutcome::new(val.result, val.termination_reason, statistics)
    }
}

impl std::fmt::Display for BnbSolverOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Result: {}", self.result)?;
        writeln!(f, "Termination: {}", self.termination_reason)?;
        write!(f, "{}", self.statistics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mistletoe_model::{index::ParticipantIndex, model::ModelBuilder, weights::WeightMatrix};

    fn assignment() -> Assignment {
        let model = ModelBuilder::new(WeightMatrix::uniform(2, 1.5).unwrap())
            .build()
            .unwrap();
        Assignment::from_edges(&model, [(ParticipantIndex::new(0), ParticipantIndex::new(1))])
    }

    #[test]
    fn test_into_solver_outcome_keeps_result_and_counters() {
        let mut stats = BnbSolverStatistics::default();
        stats.nodes_explored = 12;
        stats.prunings_bound = 3;
        stats.prunings_infeasible = 4;
        stats.solutions_found = 2;

        let outcome: SolverOutcome = BnbSolverOutcome::optimal(assignment(), stats).into();
        assert!(outcome.is_optimal());
        assert_eq!(outcome.result.objective(), Some(1.5));
        assert_eq!(outcome.statistics.nodes_explored, 12);
        assert_eq!(outcome.statistics.prunings, 7);
        assert_eq!(outcome.statistics.solutions_found, 2);
        assert_eq!(outcome.statistics.used_threads, 1);
    }

    #[test]
    fn test_aborted_carries_reason_and_best() {
        let outcome =
            BnbSolverOutcome::aborted(Some(assignment()), "deadline reached", Default::default());
        assert!(matches!(outcome.result(), SolverResult::Cancelled(Some(_))));
        assert_eq!(
            outcome.termination_reason(),
            &TerminationReason::Aborted("deadline reached".to_string())
        );

        let outcome = BnbSolverOutcome::aborted(None, "interrupt", Default::default());
        assert_eq!(outcome.result(), &SolverResult::Cancelled(None));
    }

    #[test]
    fn test_infeasible() {
        let outcome = BnbSolverOutcome::infeasible(BnbSolverStatistics::default());
        let (result, reason, _) = outcome.into_parts();
        assert_eq!(result, SolverResult::Infeasible);
        assert_eq!(reason, TerminationReason::InfeasibilityProven);
    }
}
