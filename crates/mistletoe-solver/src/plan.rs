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

//! Gift plans: validated, identifier-level solver results
//!
//! `Solver::plan` runs a solve over a `Problem` and re-checks every returned
//! assignment with the `SolutionExtractor` before it becomes a
//! `GiftSchedule`. An assignment that fails the check is a search-engine
//! fault: it is logged at `error!` level and surfaced as `PlanError::Model`,
//! never handed to the caller.

use crate::solver::Solver;
use mistletoe_model::{
    assignment::Assignment,
    error::ModelError,
    extract::SolutionExtractor,
    model::ConstraintModel,
    problem::{GiftRecord, Problem},
    schedule::GiftSchedule,
};
use mistletoe_search::{
    result::{SolverOutcome, SolverResult, TerminationReason},
    stats::SolverStatistics,
};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// The outcome of planning one gift exchange.
#[derive(Debug, Clone, PartialEq)]
pub enum GiftPlan {
    /// A schedule of maximum total weight.
    Optimal(GiftSchedule),
    /// No schedule satisfies the rules.
    Infeasible,
    /// The search was stopped early; the best schedule found so far, if any.
    Cancelled(Option<GiftSchedule>),
}

impl GiftPlan {
    #[inline]
    pub fn schedule(&self) -> Option<&GiftSchedule> {
        match self {
            GiftPlan::Optimal(schedule) | GiftPlan::Cancelled(Some(schedule)) => Some(schedule),
            GiftPlan::Infeasible | GiftPlan::Cancelled(None) => None,
        }
    }

    #[inline]
    pub fn total_weight(&self) -> Option<f64> {
        self.schedule().map(GiftSchedule::total_weight)
    }

    #[inline]
    pub fn is_optimal(&self) -> bool {
        matches!(self, GiftPlan::Optimal(_))
    }

    #[inline]
    pub fn is_infeasible(&self) -> bool {
        matches!(self, GiftPlan::Infeasible)
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, GiftPlan::Cancelled(_))
    }
}

impl std::fmt::Display for GiftPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GiftPlan::Optimal(schedule) => {
                write!(f, "Optimal(total_weight: {})", schedule.total_weight())
            }
            GiftPlan::Infeasible => write!(f, "Infeasible"),
            GiftPlan::Cancelled(Some(schedule)) => {
                write!(f, "Cancelled(total_weight: {})", schedule.total_weight())
            }
            GiftPlan::Cancelled(None) => write!(f, "Cancelled(no schedule)"),
        }
    }
}

/// A `GiftPlan` together with why the search ended and what it cost.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanOutcome {
    plan: GiftPlan,
    reason: TerminationReason,
    statistics: SolverStatistics,
}

impl PlanOutcome {
    /// Validates the assignment in `outcome` against `model` and converts it
    /// into a plan.
    ///
    /// # Errors
    ///
    /// `PlanError::Model` with `ModelError::InvariantViolated` if the
    /// assignment breaks any rule of the model.
    pub fn from_outcome(
        model: &ConstraintModel,
        outcome: SolverOutcome,
    ) -> Result<Self, PlanError> {
        let SolverOutcome {
            result,
            reason,
            statistics,
        } = outcome;

        let plan = match result {
            SolverResult::Optimal(assignment) => GiftPlan::Optimal(extract(model, &assignment)?),
            SolverResult::Infeasible => GiftPlan::Infeasible,
            SolverResult::Cancelled(best) => GiftPlan::Cancelled(
                best.map(|assignment| extract(model, &assignment))
                    .transpose()?,
            ),
        };

        Ok(Self {
            plan,
            reason,
            statistics,
        })
    }

    #[inline]
    pub fn plan(&self) -> &GiftPlan {
        &self.plan
    }

    #[inline]
    pub fn reason(&self) -> &TerminationReason {
        &self.reason
    }

    #[inline]
    pub fn statistics(&self) -> &SolverStatistics {
        &self.statistics
    }

    #[inline]
    pub fn into_plan(self) -> GiftPlan {
        self.plan
    }

    /// Renders the schedule, if any, as one identifier record per giver.
    pub fn records(&self, problem: &Problem) -> Option<Vec<GiftRecord>> {
        self.plan.schedule().map(|schedule| problem.records(schedule))
    }
}

impl std::fmt::Display for PlanOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Plan: {}", self.plan)?;
        writeln!(f, "Reason: {}", self.reason)?;
        write!(f, "{}", self.statistics)
    }
}

fn extract(model: &ConstraintModel, assignment: &Assignment) -> Result<GiftSchedule, PlanError> {
    SolutionExtractor::new(model)
        .extract(assignment)
        .map_err(|err| {
            error!(
                error = %err,
                objective = assignment.objective(),
                "solver returned an invalid assignment"
            );
            PlanError::from(err)
        })
}

impl<'a> Solver<'a> {
    /// Solves `problem` and validates the result.
    ///
    /// # Errors
    ///
    /// Fails only if the search returned an assignment that breaks the rules.
    pub fn plan(&self, problem: &Problem) -> Result<PlanOutcome, PlanError> {
        let outcome = self.solve(problem.model());
        PlanOutcome::from_outcome(problem.model(), outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::SolverBuilder;
    use mistletoe_model::{
        index::ParticipantIndex, model::ModelBuilder, problem::ProblemBuilder,
        weights::WeightMatrix,
    };
    use mistletoe_search::stats::SolverStatisticsBuilder;

    fn p(i: usize) -> ParticipantIndex {
        ParticipantIndex::new(i)
    }

    /// Everyone is their own family.
    fn singletons(ids: &[&str]) -> Problem {
        let mut builder = ProblemBuilder::new(ids.iter().copied());
        for id in ids {
            builder = builder.family([*id]);
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_plan_optimal_renders_records() {
        let problem = singletons(&["ann", "bob", "cat", "dan", "eve"]);
        let outcome = SolverBuilder::new()
            .with_threads(1)
            .build()
            .plan(&problem)
            .unwrap();

        assert!(outcome.plan().is_optimal());
        assert_eq!(outcome.plan().total_weight(), Some(10.0));
        let records = outcome.records(&problem).unwrap();
        assert_eq!(records.len(), 5);
        for record in &records {
            assert_eq!(record.receivers.len(), 2);
            assert!(!record.receivers.contains(&record.giver));
        }
    }

    #[test]
    fn test_plan_infeasible_has_no_records() {
        let problem = singletons(&["ann", "bob", "cat"]);
        let outcome = SolverBuilder::new().build().plan(&problem).unwrap();
        assert_eq!(outcome.plan(), &GiftPlan::Infeasible);
        assert_eq!(outcome.records(&problem), None);
        assert_eq!(outcome.reason(), &TerminationReason::InfeasibilityProven);
    }

    #[test]
    fn test_invalid_assignment_is_rejected() {
        let model = ModelBuilder::new(WeightMatrix::uniform(5, 1.0).unwrap())
            .build()
            .unwrap();
        // One edge only: every degree is wrong.
        let bogus = Assignment::from_edges(&model, [(p(0), p(1))]);
        let outcome = SolverOutcome::optimal(bogus, SolverStatisticsBuilder::new().build());

        let err = PlanOutcome::from_outcome(&model, outcome).unwrap_err();
        assert!(matches!(
            err,
            PlanError::Model(ModelError::InvariantViolated { .. })
        ));
    }

    #[test]
    fn test_cancelled_without_schedule() {
        let model = ModelBuilder::new(WeightMatrix::uniform(5, 1.0).unwrap())
            .build()
            .unwrap();
        let stats = SolverStatisticsBuilder::new().build();
        let outcome = SolverOutcome::cancelled(None, "deadline reached", stats);
        let plan = PlanOutcome::from_outcome(&model, outcome).unwrap();
        assert!(plan.plan().is_cancelled());
        assert_eq!(plan.plan().schedule(), None);
        assert_eq!(plan.plan().to_string(), "Cancelled(no schedule)");
    }
}
