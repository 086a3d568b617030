//! extcov Coverage
//!
//! Attributes a corpus of test cases to the function variants of a registry
//! and reports per-variant, per-function and per-extension test counts.

pub mod aggregator;
pub mod counters;
pub mod diagnostics;
pub mod guard;
pub mod report;

#[cfg(test)]
#[path = "tests/mod.rs"]
mod tests;

pub use aggregator::{CoverageAggregator, CoverageRun, CoverageTally};
pub use counters::CoverageCounters;
pub use diagnostics::CoverageDiagnostic;
pub use guard::{Bound, GuardViolation, RegressionGuard};
pub use report::{CoverageReport, FileCoverage, FunctionCoverage, ReportOptions, VariantCoverage};

use extcov_parser::TestFile;
use extcov_registry::FunctionRegistry;

/// Run the aggregator with default report options
pub fn get_test_coverage(test_files: &[TestFile], registry: &FunctionRegistry) -> CoverageRun {
    CoverageAggregator::new(registry).run(test_files)
}
