//! Test coverage aggregation
//!
//! Each test case is resolved to the variant it exercises and counted. Test
//! cases that cannot be attributed (unknown function, wrong return type,
//! unknown extension or type) are diagnosed and counted as unresolved; they
//! never stop the run.

use crate::counters::CoverageCounters;
use crate::diagnostics::CoverageDiagnostic;
use crate::report::{CoverageReport, ReportOptions};
use extcov_parser::{TestCase, TestFile};
use extcov_registry::{arg_types_of, same_type, DataType, FunctionRegistry, NamespaceId};

/// Result of a complete run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageRun {
    pub report: CoverageReport,
    pub diagnostics: Vec<CoverageDiagnostic>,
}

/// Running totals of a pass over some test files
///
/// Tallies of disjoint parts of a corpus merge into the tally of the whole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageTally {
    pub counters: CoverageCounters,
    /// Tests processed, by weight
    pub test_count: u64,
    /// Tests that could not be attributed to a variant, by weight like
    /// `test_count`
    pub unresolved: u64,
    pub diagnostics: Vec<CoverageDiagnostic>,
}

impl CoverageTally {
    pub fn merge(&mut self, other: CoverageTally) {
        self.counters.merge(&other.counters);
        self.test_count += other.test_count;
        self.unresolved += other.unresolved;
        self.diagnostics.extend(other.diagnostics);
    }

    fn reject(&mut self, weight: u64, diagnostic: CoverageDiagnostic) {
        tracing::warn!(
            file = diagnostic.file_name(),
            line = diagnostic.line(),
            "{diagnostic}"
        );
        self.unresolved += weight;
        self.diagnostics.push(diagnostic);
    }
}

/// Attributes test cases to the variants of a registry
pub struct CoverageAggregator<'r> {
    registry: &'r FunctionRegistry,
    options: ReportOptions,
}

impl<'r> CoverageAggregator<'r> {
    pub fn new(registry: &'r FunctionRegistry) -> Self {
        Self {
            registry,
            options: ReportOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ReportOptions) -> Self {
        self.options = options;
        self
    }

    /// Process every test file in order and build the report
    pub fn run(&self, test_files: &[TestFile]) -> CoverageRun {
        self.finish(self.tally(test_files))
    }

    /// Count test files without building a report
    pub fn tally(&self, test_files: &[TestFile]) -> CoverageTally {
        let mut tally = CoverageTally::default();
        for test_file in test_files {
            self.tally_file(test_file, &mut tally);
        }
        tally
    }

    /// Build the report from a (possibly merged) tally
    pub fn finish(&self, tally: CoverageTally) -> CoverageRun {
        let report = CoverageReport::build(
            self.registry,
            &tally.counters,
            tally.test_count,
            tally.unresolved,
            self.options,
        );

        tracing::info!(
            tests = report.test_count,
            unresolved = report.num_tests_with_no_matching_function,
            covered = report.num_covered_function_variants,
            total = report.total_function_variants,
            "coverage computed"
        );

        CoverageRun {
            report,
            diagnostics: tally.diagnostics,
        }
    }

    fn tally_file(&self, test_file: &TestFile, tally: &mut CoverageTally) {
        let weight: u64 = test_file.test_cases().map(|case| u64::from(case.weight)).sum();
        tally.test_count += weight;

        let Some(namespace) = self.registry.namespace_for(test_file.include()) else {
            tally.reject(
                weight,
                CoverageDiagnostic::UnknownNamespace {
                    file_name: test_file.file_name.clone(),
                    include: test_file.include().to_string(),
                    test_count: weight,
                },
            );
            return;
        };

        tracing::debug!(
            file = %test_file.file_name,
            namespace = %self.registry.namespace(namespace).key,
            "attributing test file"
        );
        for case in test_file.test_cases() {
            self.tally_case(test_file, namespace, case, tally);
        }
    }

    fn tally_case(
        &self,
        test_file: &TestFile,
        namespace: NamespaceId,
        case: &TestCase,
        tally: &mut CoverageTally,
    ) {
        let file_name = || test_file.file_name.clone();
        let line = case.span.line();
        let weight = u64::from(case.weight);
        let unsupported = |error| CoverageDiagnostic::UnsupportedType {
            file_name: file_name(),
            line,
            signature: case.signature(),
            error,
        };

        let args = match arg_types_of(case) {
            Ok(args) => args,
            Err(error) => return tally.reject(weight, unsupported(error)),
        };

        let Some(variant) = self
            .registry
            .resolve_overload(&case.function_name, namespace, &args)
        else {
            return tally.reject(
                weight,
                CoverageDiagnostic::FunctionNotFound {
                    file_name: file_name(),
                    line,
                    signature: case.signature(),
                },
            );
        };

        if let Some(expected) = case.return_type() {
            let expected = match DataType::from_expr(expected) {
                Ok(expected) => expected,
                Err(error) => return tally.reject(weight, unsupported(error)),
            };
            if !same_type(&variant.return_type, &expected) {
                return tally.reject(
                    weight,
                    CoverageDiagnostic::ReturnTypeMismatch {
                        file_name: file_name(),
                        line,
                        signature: case.signature(),
                        declared: variant.return_type.to_string(),
                        expected: expected.to_string(),
                    },
                );
            }
        }

        tally.counters.increment(variant.id, weight);
    }
}
