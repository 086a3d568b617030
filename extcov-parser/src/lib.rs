// extcov Parser Library
// Pest-based parser for function extension test case files

pub mod ast;
pub mod error;
pub mod loader;
pub mod parser;

pub use ast::*;
pub use error::*;
pub use loader::load_test_files;
pub use parser::{CaseFileParser, Rule};

/// Parse the text of a test file; `file_name` is used for diagnostics and
/// recorded on the result
pub fn parse_test_file(input: &str, file_name: &str) -> Result<TestFile, ParseError> {
    CaseFileParser::parse_file(input, file_name)
}

/// Parse a single type expression such as `list<i32?>` or `decimal<P1,S1>`
pub fn parse_type(input: &str) -> Result<TypeExpr, ParseError> {
    CaseFileParser::parse_type_expression(input.trim())
}

// Version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests;
