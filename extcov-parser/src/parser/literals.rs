// Literal parsing functions
// Handles null, boolean, numeric, string and list literals plus column data

use super::{CaseFileParser, Rule};
use crate::ast::*;
use crate::error::*;
use pest::iterators::Pair;

impl CaseFileParser {
    /// `literal::type`
    pub(super) fn parse_typed_literal(pair: Pair<Rule>) -> ParseResult<(Literal, TypeExpr)> {
        let mut inner = pair.into_inner();
        let literal = inner
            .next()
            .ok_or_else(|| ParseError::unexpected_rule("literal", Rule::typed_literal))?;
        let data_type = inner
            .next()
            .ok_or_else(|| ParseError::unexpected_rule("data type", Rule::typed_literal))?;
        Ok((Self::parse_literal(literal)?, Self::parse_data_type(data_type)?))
    }

    /// `(v, v, ...)::type`
    pub(super) fn parse_column_data(pair: Pair<Rule>) -> ParseResult<(Vec<Literal>, TypeExpr)> {
        let mut inner = pair.into_inner();
        let values = inner
            .next()
            .ok_or_else(|| ParseError::unexpected_rule("column values", Rule::column_data))?;
        let data_type = inner
            .next()
            .ok_or_else(|| ParseError::unexpected_rule("data type", Rule::column_data))?;
        Ok((
            Self::parse_literal_sequence(values)?,
            Self::parse_data_type(data_type)?,
        ))
    }

    /// `((1, 2), (3, 4))`
    pub(super) fn parse_table_rows(pair: Pair<Rule>) -> ParseResult<Vec<Vec<Literal>>> {
        pair.into_inner()
            .map(Self::parse_literal_sequence)
            .collect()
    }

    /// Inner literals of a list, column or row
    fn parse_literal_sequence(pair: Pair<Rule>) -> ParseResult<Vec<Literal>> {
        pair.into_inner().map(Self::parse_literal).collect()
    }

    pub(super) fn parse_literal(pair: Pair<Rule>) -> ParseResult<Literal> {
        let inner = Self::first_inner(pair, "literal")?;
        let text = inner.as_str();

        match inner.as_rule() {
            Rule::null_literal => Ok(Literal::Null),
            Rule::boolean_literal => Ok(Literal::Boolean(text.eq_ignore_ascii_case("true"))),
            Rule::special_float => Ok(Literal::SpecialFloat(text.to_string())),
            Rule::number_literal => Ok(Literal::Number(text.to_string())),
            Rule::string_literal => Ok(Literal::String(Self::unquote(text))),
            Rule::list_literal => Ok(Literal::List(Self::parse_literal_sequence(inner)?)),
            other => Err(ParseError::unexpected_rule("literal", other)),
        }
    }

    /// Strip the surrounding quotes and collapse `''` and `\'` escapes
    pub(super) fn unquote(text: &str) -> String {
        let body = text
            .strip_prefix('\'')
            .and_then(|rest| rest.strip_suffix('\''))
            .unwrap_or(text);
        body.replace("''", "'").replace("\\'", "'")
    }
}
