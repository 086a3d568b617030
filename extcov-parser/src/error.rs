// Test case parser error handling
// miette diagnostics carrying the offending source text

use crate::parser::Rule;
use miette::{Diagnostic, NamedSource, SourceSpan};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while parsing a test file or a type expression
#[derive(Error, Diagnostic, Debug)]
pub enum ParseError {
    #[error("Syntax error: {message}")]
    #[diagnostic(
        code(extcov::parse::syntax),
        help("Test lines look like `name(1::i32, 2::i32) = 3::i32`")
    )]
    Syntax {
        #[source_code]
        src: NamedSource<String>,
        #[label("error occurred here")]
        span: SourceSpan,
        message: String,
    },

    #[error("Unknown table `{table}`")]
    #[diagnostic(
        code(extcov::parse::unknown_table),
        help("Tables must be declared with `DEFINE {table}(...) = (...)` before use")
    )]
    UnknownTable {
        #[source_code]
        src: NamedSource<String>,
        #[label("referenced here")]
        span: SourceSpan,
        table: String,
    },

    #[error("Column col{column} does not exist; the table has {width} columns")]
    #[diagnostic(code(extcov::parse::column_out_of_range))]
    ColumnOutOfRange {
        #[source_code]
        src: NamedSource<String>,
        #[label("no such column")]
        span: SourceSpan,
        column: usize,
        width: usize,
    },

    #[error("Column col{column} has no type")]
    #[diagnostic(
        code(extcov::parse::untyped_column),
        help("Write the column type inline, e.g. `col{column}::i32`, or reference a DEFINEd table")
    )]
    UntypedColumn {
        #[source_code]
        src: NamedSource<String>,
        #[label("type required")]
        span: SourceSpan,
        column: usize,
    },

    #[error("Invalid integer `{found}`")]
    #[diagnostic(code(extcov::parse::invalid_integer))]
    InvalidInteger {
        #[source_code]
        src: NamedSource<String>,
        #[label("invalid integer")]
        span: SourceSpan,
        found: String,
    },

    #[error("Unexpected grammar rule: expected {expected}, found {found:?}")]
    #[diagnostic(code(extcov::parse::unexpected_rule))]
    UnexpectedRule { expected: String, found: Rule },
}

impl ParseError {
    /// Create a parse error from a Pest parsing error
    pub fn from_pest_error(error: pest::error::Error<Rule>, src: NamedSource<String>) -> Self {
        let span = match error.location {
            pest::error::InputLocation::Pos(pos) => SourceSpan::new(pos.into(), 0),
            pest::error::InputLocation::Span((start, end)) => {
                SourceSpan::new(start.into(), end - start)
            }
        };

        let message = match &error.variant {
            pest::error::ErrorVariant::ParsingError { positives, .. } if !positives.is_empty() => {
                let expected = positives
                    .iter()
                    .map(rule_to_user_friendly_description)
                    .collect::<Vec<_>>();
                format!("expected {}", expected.join(" or "))
            }
            pest::error::ErrorVariant::ParsingError { .. } => "unexpected input".to_string(),
            pest::error::ErrorVariant::CustomError { message } => message.clone(),
        };

        ParseError::Syntax { src, span, message }
    }

    pub fn unexpected_rule(expected: &str, found: Rule) -> Self {
        ParseError::UnexpectedRule {
            expected: expected.to_string(),
            found,
        }
    }
}

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Convert a grammar rule to a description a test author understands
fn rule_to_user_friendly_description(rule: &Rule) -> String {
    match rule {
        Rule::version_line => "a `### SUBSTRAIT_SCALAR_TEST: v1.0` header".to_string(),
        Rule::include_line => "a `### SUBSTRAIT_INCLUDE: '<uri>'` header".to_string(),
        Rule::test_kind => "SUBSTRAIT_SCALAR_TEST or SUBSTRAIT_AGGREGATE_TEST".to_string(),
        Rule::format_version => "a format version (like v1.0)".to_string(),
        Rule::test_group | Rule::description_line => "a `#` group description".to_string(),
        Rule::test_line | Rule::test_case => "a test case (like f(1::i8) = 1::i8)".to_string(),
        Rule::table_definition => "a table definition (DEFINE t(i32) = ((1)))".to_string(),
        Rule::function_name | Rule::identifier => "a function name".to_string(),
        Rule::argument | Rule::arguments => "an argument (like 1::i32)".to_string(),
        Rule::literal => "a literal value".to_string(),
        Rule::string_literal => "a quoted string (like 'abc')".to_string(),
        Rule::number_literal => "a number (like 42 or 1.5e3)".to_string(),
        Rule::options => "an option list (like [overflow:ERROR])".to_string(),
        Rule::result => "an expected result (like 3::i32 or <!ERROR>)".to_string(),
        Rule::data_type | Rule::type_name => "a type (like i32 or dec<38,2>)".to_string(),
        Rule::type_parameters => "type parameters (like <38,2>)".to_string(),
        Rule::EOI => "end of input".to_string(),
        other => format!("{other:?}"),
    }
}

/// Errors raised while loading a directory of test files
#[derive(Error, Diagnostic, Debug)]
pub enum LoadError {
    #[error("Failed to read {}", .path.display())]
    #[diagnostic(code(extcov::load::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {file_name}")]
    #[diagnostic(code(extcov::load::parse))]
    Parse {
        file_name: String,
        #[source]
        #[diagnostic_source]
        error: ParseError,
    },
}
