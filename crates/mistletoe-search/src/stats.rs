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

/// Statistics aggregated over a complete solve, across all workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverStatistics {
    /// Number of improving solutions found by all workers.
    pub solutions_found: u64,
    /// Number of worker threads used.
    pub used_threads: usize,
    /// Number of subtrees the search was split into.
    pub subtrees: usize,
    /// Total number of search nodes explored.
    pub nodes_explored: u64,
    /// Total number of pruned nodes.
    pub prunings: u64,
    /// Wall-clock duration of the solve.
    pub solve_duration: std::time::Duration,
}

impl Default for SolverStatistics {
    fn default() -> Self {
        SolverStatisticsBuilder::new().build()
    }
}

impl std::fmt::Display for SolverStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solver Statistics:")?;
        writeln!(f, "  Solutions Found: {}", self.solutions_found)?;
        writeln!(f, "  Used Threads: {}", self.used_threads)?;
        writeln!(f, "  Subtrees: {}", self.subtrees)?;
        writeln!(f, "  Nodes Explored: {}", self.nodes_explored)?;
        writeln!(f, "  Prunings: {}", self.prunings)?;
        writeln!(
            f,
            "  Solve Duration (secs): {:.3}",
            self.solve_duration.as_secs_f64()
        )
    }
}

/// Builder for `SolverStatistics`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverStatisticsBuilder {
    solutions_found: u64,
    used_threads: usize,
    subtrees: usize,
    nodes_explored: u64,
    prunings: u64,
    solve_duration: std::time::Duration,
}

impl Default for SolverStatisticsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverStatisticsBuilder {
    #[inline]
    pub fn new() -> Self {
        Self {
            solutions_found: 0,
            used_threads: 1,
            subtrees: 1,
            nodes_explored: 0,
            prunings: 0,
            solve_duration: std::time::Duration::ZERO,
        }
    }

    #[inline]
    pub fn solutions_found(mut self, solutions_found: u64) -> Self {
        self.solutions_found = solutions_found;
        self
    }

    #[inline]
    pub fn used_threads(mut self, used_threads: usize) -> Self {
        self.used_threads = used_threads;
        self
    }

    #[inline]
    pub fn subtrees(mut self, subtrees: usize) -> Self {
        self.subtrees = subtrees;
        self
    }

    #[inline]
    pub fn nodes_explored(mut self, nodes_explored: u64) -> Self {
        self.nodes_explored = nodes_explored;
        self
    }

    #[inline]
    pub fn prunings(mut self, prunings: u64) -> Self {
        self.prunings = prunings;
        self
    }

    #[inline]
    pub fn solve_duration(mut self, solve_duration: std::time::Duration) -> Self {
        self.solve_duration = solve_duration;
        self
    }

    #[inline]
    pub fn build(self) -> SolverStatistics {
        SolverStatistics {
            solutions_found: self.solutions_found,
            used_threads: self.used_threads,
            subtrees: self.subtrees,
            nodes_explored: self.nodes_explored,
            prunings: self.prunings,
            solve_duration: self.solve_duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SolverStatistics, SolverStatisticsBuilder};
    use std::time::Duration;

    #[test]
    fn test_builder_constructs_expected_struct() {
        let stats = SolverStatisticsBuilder::new()
            .solutions_found(3)
            .used_threads(8)
            .subtrees(16)
            .nodes_explored(12_345)
            .prunings(678)
            .solve_duration(Duration::from_millis(1234))
            .build();

        assert_eq!(stats.solutions_found, 3);
        assert_eq!(stats.used_threads, 8);
        assert_eq!(stats.subtrees, 16);
        assert_eq!(stats.nodes_explored, 12_345);
        assert_eq!(stats.prunings, 678);
        assert_eq!(stats.solve_duration, Duration::from_millis(1234));
    }

    #[test]
    fn test_display_formats_all_fields() {
        let stats = SolverStatisticsBuilder::new()
            .solutions_found(2)
            .used_threads(4)
            .nodes_explored(99)
            .solve_duration(Duration::from_millis(1234))
            .build();
        let rendered = format!("{}", stats);

        assert!(rendered.contains("Solver Statistics:"));
        assert!(rendered.contains("Solutions Found: 2"));
        assert!(rendered.contains("Used Threads: 4"));
        assert!(rendered.contains("Subtrees: 1"));
        assert!(rendered.contains("Nodes Explored: 99"));
        assert!(rendered.contains("Solve Duration (secs): 1.234"));
    }

    #[test]
    fn test_default_is_single_threaded_and_empty() {
        let stats = SolverStatistics::default();
        assert_eq!(stats.used_threads, 1);
        assert_eq!(stats.solutions_found, 0);
        assert_eq!(stats.solve_duration, Duration::ZERO);
    }
}
