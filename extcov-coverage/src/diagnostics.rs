//! Per-test diagnostics
//!
//! None of these stop a run. Each is counted against the test it concerns and
//! reported alongside the finished report.

use extcov_registry::TypeError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum CoverageDiagnostic {
    #[error("Function not found: {signature}")]
    #[diagnostic(
        code(extcov::coverage::function_not_found),
        severity(Warning),
        help("No overload of this function accepts these argument types")
    )]
    FunctionNotFound {
        file_name: String,
        line: Option<usize>,
        signature: String,
    },

    #[error("Return type mismatch in function {signature}: {declared} != {expected}")]
    #[diagnostic(code(extcov::coverage::return_type_mismatch), severity(Warning))]
    ReturnTypeMismatch {
        file_name: String,
        line: Option<usize>,
        signature: String,
        declared: String,
        expected: String,
    },

    #[error("Unknown extension {include} included by {file_name}")]
    #[diagnostic(
        code(extcov::coverage::unknown_extension),
        severity(Warning),
        help("Every test case in this file is counted as unresolved")
    )]
    UnknownNamespace {
        file_name: String,
        include: String,
        test_count: u64,
    },

    #[error("Unsupported type in {signature}")]
    #[diagnostic(code(extcov::coverage::unsupported_type), severity(Warning))]
    UnsupportedType {
        file_name: String,
        line: Option<usize>,
        signature: String,
        #[source]
        #[diagnostic_source]
        error: TypeError,
    },
}

impl CoverageDiagnostic {
    /// Test file the diagnostic refers to
    pub fn file_name(&self) -> &str {
        match self {
            CoverageDiagnostic::FunctionNotFound { file_name, .. }
            | CoverageDiagnostic::ReturnTypeMismatch { file_name, .. }
            | CoverageDiagnostic::UnknownNamespace { file_name, .. }
            | CoverageDiagnostic::UnsupportedType { file_name, .. } => file_name,
        }
    }

    /// Line of the offending test case, when it concerns a single case
    pub fn line(&self) -> Option<usize> {
        match self {
            CoverageDiagnostic::FunctionNotFound { line, .. }
            | CoverageDiagnostic::ReturnTypeMismatch { line, .. }
            | CoverageDiagnostic::UnsupportedType { line, .. } => *line,
            CoverageDiagnostic::UnknownNamespace { .. } => None,
        }
    }
}
