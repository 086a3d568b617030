// Type expression parsing
// Handles base names, nullability markers and parameter lists

use super::{CaseFileParser, Rule};
use crate::ast::*;
use crate::error::*;
use pest::iterators::Pair;

impl CaseFileParser {
    pub(crate) fn parse_data_type(pair: Pair<Rule>) -> ParseResult<TypeExpr> {
        let mut name = String::new();
        let mut nullable = false;
        let mut parameters = Vec::new();

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::type_name => name = inner.as_str().to_string(),
                Rule::nullable => nullable = true,
                Rule::type_parameters => {
                    for parameter in inner.into_inner() {
                        parameters.push(Self::parse_type_parameter(parameter)?);
                    }
                }
                other => return Err(ParseError::unexpected_rule("data type", other)),
            }
        }

        Ok(TypeExpr {
            name,
            nullable,
            parameters,
        })
    }

    fn parse_type_parameter(pair: Pair<Rule>) -> ParseResult<TypeParameter> {
        let inner = Self::first_inner(pair, "type parameter")?;
        match inner.as_rule() {
            Rule::integer_parameter => {
                let text = inner.as_str();
                text.parse::<i64>()
                    .map(TypeParameter::Integer)
                    .map_err(|_| ParseError::InvalidInteger {
                        src: miette::NamedSource::new("<type>", text.to_string()),
                        span: Self::source_span(&inner),
                        found: text.to_string(),
                    })
            }
            Rule::data_type => Ok(TypeParameter::Type(Self::parse_data_type(inner)?)),
            other => Err(ParseError::unexpected_rule("type parameter", other)),
        }
    }
}
