//! Regression guard
//!
//! Lower and upper bounds on registry size and corpus coverage. The defaults
//! are the figures of the reference extension and test corpora; a check
//! returns every bound that no longer holds.

use crate::report::CoverageReport;
use extcov_registry::RegistryStats;
use miette::Diagnostic;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    AtLeast(u64),
    AtMost(u64),
}

impl Bound {
    fn holds(self, actual: u64) -> bool {
        match self {
            Bound::AtLeast(min) => actual >= min,
            Bound::AtMost(max) => actual <= max,
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::AtLeast(min) => write!(f, "at least {min}"),
            Bound::AtMost(max) => write!(f, "at most {max}"),
        }
    }
}

/// One violated bound
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
#[error("{metric} is {actual}, expected {bound}")]
#[diagnostic(code(extcov::guard::violation))]
pub struct GuardViolation {
    pub metric: &'static str,
    pub actual: u64,
    pub bound: Bound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegressionGuard {
    pub min_namespaces: u64,
    pub min_functions: u64,
    pub min_variants: u64,
    pub min_dependencies: u64,
    pub min_scalar_functions: u64,
    pub min_aggregate_functions: u64,
    pub min_window_functions: u64,
    pub min_test_count: u64,
    pub max_unresolved: u64,
    pub min_covered_variants: u64,
    pub max_coverage_gap: u64,
}

impl Default for RegressionGuard {
    fn default() -> Self {
        Self {
            min_namespaces: 0,
            min_functions: 161,
            min_variants: 510,
            min_dependencies: 13,
            min_scalar_functions: 162,
            min_aggregate_functions: 29,
            min_window_functions: 0,
            min_test_count: 1018,
            max_unresolved: 0,
            min_covered_variants: 223,
            max_coverage_gap: 287,
        }
    }
}

impl RegressionGuard {
    /// A guard that only requires every test to resolve
    pub fn permissive() -> Self {
        Self {
            min_namespaces: 0,
            min_functions: 0,
            min_variants: 0,
            min_dependencies: 0,
            min_scalar_functions: 0,
            min_aggregate_functions: 0,
            min_window_functions: 0,
            min_test_count: 0,
            max_unresolved: 0,
            min_covered_variants: 0,
            max_coverage_gap: u64::MAX,
        }
    }

    /// Every bound violated by this registry and report
    pub fn check(&self, stats: &RegistryStats, report: &CoverageReport) -> Vec<GuardViolation> {
        let measurements = [
            ("namespaces", stats.namespaces as u64, Bound::AtLeast(self.min_namespaces)),
            ("functions", stats.functions as u64, Bound::AtLeast(self.min_functions)),
            ("variants", stats.variants as u64, Bound::AtLeast(self.min_variants)),
            ("dependencies", stats.dependencies as u64, Bound::AtLeast(self.min_dependencies)),
            (
                "scalar functions",
                stats.scalar_functions as u64,
                Bound::AtLeast(self.min_scalar_functions),
            ),
            (
                "aggregate functions",
                stats.aggregate_functions as u64,
                Bound::AtLeast(self.min_aggregate_functions),
            ),
            (
                "window functions",
                stats.window_functions as u64,
                Bound::AtLeast(self.min_window_functions),
            ),
            ("test count", report.test_count, Bound::AtLeast(self.min_test_count)),
            (
                "tests with no matching function",
                report.num_tests_with_no_matching_function,
                Bound::AtMost(self.max_unresolved),
            ),
            (
                "covered variants",
                report.num_covered_function_variants as u64,
                Bound::AtLeast(self.min_covered_variants),
            ),
            (
                "total variants",
                report.total_function_variants as u64,
                Bound::AtLeast(self.min_variants),
            ),
            (
                "coverage gap",
                report.coverage_gap() as u64,
                Bound::AtMost(self.max_coverage_gap),
            ),
        ];

        measurements
            .into_iter()
            .filter(|(_, actual, bound)| !bound.holds(*actual))
            .map(|(metric, actual, bound)| GuardViolation {
                metric,
                actual,
                bound,
            })
            .collect()
    }
}
