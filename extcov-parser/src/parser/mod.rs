// Test case parser
// Pest front end plus the shared helpers used by the rule-specific modules

mod cases;
mod literals;
mod types;

use crate::ast::{Span, TableDefinition, TestFile, TypeExpr};
use crate::error::{ParseError, ParseResult};
use miette::{NamedSource, SourceSpan};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use std::collections::HashMap;

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct CaseFileParser;

/// Per-file parsing state: the source for diagnostics and the tables
/// declared so far
pub(crate) struct ParseContext<'a> {
    source: &'a str,
    file_name: &'a str,
    tables: HashMap<String, TableDefinition>,
}

impl<'a> ParseContext<'a> {
    fn new(source: &'a str, file_name: &'a str) -> Self {
        Self {
            source,
            file_name,
            tables: HashMap::new(),
        }
    }

    /// Named copy of the source for attaching to an error
    pub(crate) fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(self.file_name, self.source.to_string())
    }
}

impl CaseFileParser {
    /// Parse a complete test file
    pub fn parse_file(source: &str, file_name: &str) -> ParseResult<TestFile> {
        let mut ctx = ParseContext::new(source, file_name);
        let mut pairs = Self::parse(Rule::file, source)
            .map_err(|e| ParseError::from_pest_error(e, ctx.named_source()))?;

        let file_pair = pairs
            .next()
            .ok_or_else(|| ParseError::unexpected_rule("file", Rule::EOI))?;
        Self::parse_test_file(file_pair, &mut ctx)
    }

    /// Parse a standalone type expression such as `decimal<P1,S1>`
    pub fn parse_type_expression(source: &str) -> ParseResult<TypeExpr> {
        let named = || NamedSource::new("<type>", source.to_string());
        let mut pairs = Self::parse(Rule::type_expression, source)
            .map_err(|e| ParseError::from_pest_error(e, named()))?;

        let expression = pairs
            .next()
            .ok_or_else(|| ParseError::unexpected_rule("type expression", Rule::EOI))?;
        let data_type = expression
            .into_inner()
            .find(|pair| pair.as_rule() == Rule::data_type)
            .ok_or_else(|| ParseError::unexpected_rule("data type", Rule::type_expression))?;
        Self::parse_data_type(data_type)
    }

    pub(crate) fn span_from_pair(pair: &Pair<Rule>) -> Span {
        let pest_span = pair.as_span();
        Span::with_line_col(
            pest_span.start(),
            pest_span.end(),
            pest_span.start_pos().line_col(),
            pest_span.end_pos().line_col(),
        )
    }

    pub(crate) fn source_span(pair: &Pair<Rule>) -> SourceSpan {
        let span = pair.as_span();
        SourceSpan::new(span.start().into(), span.end() - span.start())
    }

    /// First inner pair, or an error naming what the grammar should have produced
    pub(crate) fn first_inner<'i>(pair: Pair<'i, Rule>, expected: &str) -> ParseResult<Pair<'i, Rule>> {
        let rule = pair.as_rule();
        pair.into_inner()
            .next()
            .ok_or_else(|| ParseError::unexpected_rule(expected, rule))
    }
}
