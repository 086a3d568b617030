//! Coverage report
//!
//! A read-only snapshot nested namespace -> function -> variant, in registry
//! discovery order, plus run-level totals. Serializes to the JSON document
//! consumed by downstream tooling.

use crate::counters::CoverageCounters;
use extcov_registry::FunctionRegistry;
use serde::Serialize;

/// What the report lists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    /// List functions without any tests too; by default only functions with
    /// at least one test appear (with all of their variants)
    pub include_uncovered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantCoverage {
    pub signature: String,
    pub test_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionCoverage {
    pub function_name: String,
    pub test_count: u64,
    pub variants: Vec<VariantCoverage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileCoverage {
    pub file_name: String,
    pub test_count: u64,
    pub function_coverage: Vec<FunctionCoverage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageReport {
    pub file_coverage: Vec<FileCoverage>,
    pub test_count: u64,
    pub num_tests_with_no_matching_function: u64,
    pub num_covered_function_variants: usize,
    pub total_function_variants: usize,
}

impl CoverageReport {
    /// Build the report from a finished set of counters
    pub fn build(
        registry: &FunctionRegistry,
        counters: &CoverageCounters,
        test_count: u64,
        num_tests_with_no_matching_function: u64,
        options: ReportOptions,
    ) -> Self {
        let file_coverage = registry
            .list_namespaces()
            .iter()
            .map(|namespace| {
                let function_coverage: Vec<FunctionCoverage> = registry
                    .functions_of(namespace.id)
                    .map(|function| {
                        let variants: Vec<VariantCoverage> = registry
                            .variants_of(function.id)
                            .map(|variant| VariantCoverage {
                                signature: variant.signature.clone(),
                                test_count: counters.count(variant.id),
                            })
                            .collect();
                        FunctionCoverage {
                            function_name: function.name.clone(),
                            test_count: variants.iter().map(|v| v.test_count).sum(),
                            variants,
                        }
                    })
                    .filter(|function| options.include_uncovered || function.test_count > 0)
                    .collect();

                FileCoverage {
                    file_name: namespace.key.clone(),
                    test_count: function_coverage.iter().map(|f| f.test_count).sum(),
                    function_coverage,
                }
            })
            .collect();

        // One traversal of every known variant for the run-level totals
        let mut num_covered_function_variants = 0;
        let mut total_function_variants = 0;
        registry.for_each_variant(|_, _, variant| {
            total_function_variants += 1;
            if counters.count(variant.id) > 0 {
                num_covered_function_variants += 1;
            }
        });
        debug_assert_eq!(total_function_variants, registry.variant_count());

        Self {
            file_coverage,
            test_count,
            num_tests_with_no_matching_function,
            num_covered_function_variants,
            total_function_variants,
        }
    }

    /// Variants without any attributed test
    pub fn coverage_gap(&self) -> usize {
        self.total_function_variants - self.num_covered_function_variants
    }

    /// Pretty-printed JSON document
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Coverage entry of one namespace
    pub fn file(&self, file_name: &str) -> Option<&FileCoverage> {
        self.file_coverage.iter().find(|f| f.file_name == file_name)
    }
}

impl FileCoverage {
    pub fn function(&self, function_name: &str) -> Option<&FunctionCoverage> {
        self.function_coverage
            .iter()
            .find(|f| f.function_name == function_name)
    }
}
