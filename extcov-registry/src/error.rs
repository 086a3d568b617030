//! Error types for the function registry
//!
//! Follows the parser's miette patterns so load failures render with the
//! offending source text.

use crate::model::FunctionKind;
use miette::{Diagnostic, NamedSource, SourceSpan};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while canonicalizing a type
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("Unknown type name `{name}`")]
    #[diagnostic(
        code(extcov::types::unknown_name),
        help("Every type must have a short alias so overload signatures stay unambiguous")
    )]
    UnknownTypeName { name: String },

    #[error("Invalid type expression `{text}`: {reason}")]
    #[diagnostic(code(extcov::types::invalid_expression))]
    InvalidType { text: String, reason: String },
}

/// Structural errors in extension sources; any of these aborts the load
#[derive(Error, Diagnostic, Debug)]
pub enum RegistryError {
    #[error("Failed to read {}", .path.display())]
    #[diagnostic(code(extcov::registry::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed extension source: {message}")]
    #[diagnostic(code(extcov::registry::malformed_source))]
    Malformed {
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: Option<SourceSpan>,
        message: String,
    },

    #[error("Function `{function}` in {namespace} is declared as both {existing} and {found}")]
    #[diagnostic(
        code(extcov::registry::conflicting_kind),
        help("A function name may only appear in one of the scalar, aggregate and window sections")
    )]
    ConflictingKind {
        namespace: String,
        function: String,
        existing: FunctionKind,
        found: FunctionKind,
    },

    #[error("Extension {key} is loaded twice")]
    #[diagnostic(code(extcov::registry::duplicate_namespace))]
    DuplicateNamespace { key: String },

    #[error("Duplicate overload {signature} in {namespace}")]
    #[diagnostic(code(extcov::registry::duplicate_variant))]
    DuplicateVariant { namespace: String, signature: String },

    #[error("Invalid type in `{function}` of {namespace}")]
    #[diagnostic(code(extcov::registry::invalid_type))]
    InvalidType {
        namespace: String,
        function: String,
        #[source]
        #[diagnostic_source]
        error: TypeError,
    },

    #[error("Argument {index} of `{function}` in {namespace} has neither `value` nor `options`")]
    #[diagnostic(code(extcov::registry::invalid_argument))]
    InvalidArgument {
        namespace: String,
        function: String,
        index: usize,
    },
}

impl RegistryError {
    /// Wrap a YAML error, pointing at its location in the source when known
    pub fn from_yaml_error(error: serde_yaml::Error, src: NamedSource<String>) -> Self {
        let span = error
            .location()
            .map(|location| SourceSpan::new(location.index().into(), 0));
        RegistryError::Malformed {
            src,
            span,
            message: error.to_string(),
        }
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;
