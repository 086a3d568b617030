// Test file structure parsing
// Handles the header, groups, table definitions and test case lines

use super::{CaseFileParser, ParseContext, Rule};
use crate::ast::*;
use crate::error::*;
use pest::iterators::Pair;

impl CaseFileParser {
    pub(super) fn parse_test_file(
        pair: Pair<Rule>,
        ctx: &mut ParseContext,
    ) -> ParseResult<TestFile> {
        let mut header = None;
        let mut groups: Vec<TestGroup> = Vec::new();

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::header => header = Some(Self::parse_header(inner)?),
                Rule::test_group => groups.push(Self::parse_test_group(inner, ctx)?),
                Rule::test_line => {
                    // Lines before the first description form an unnamed group
                    if let Some(case) = Self::parse_test_line(inner, ctx)? {
                        match groups.last_mut() {
                            Some(group) if group.description.is_empty() => group.cases.push(case),
                            _ => groups.push(TestGroup {
                                description: String::new(),
                                cases: vec![case],
                            }),
                        }
                    }
                }
                Rule::EOI => {}
                other => return Err(ParseError::unexpected_rule("test file content", other)),
            }
        }

        let (kind, version, includes) =
            header.ok_or_else(|| ParseError::unexpected_rule("header", Rule::file))?;

        Ok(TestFile {
            file_name: ctx.file_name.to_string(),
            kind,
            version,
            includes,
            groups,
        })
    }

    fn parse_header(pair: Pair<Rule>) -> ParseResult<(TestKind, String, Vec<String>)> {
        let mut kind = TestKind::Scalar;
        let mut version = String::new();
        let mut includes = Vec::new();

        for line in pair.into_inner() {
            match line.as_rule() {
                Rule::version_line => {
                    for part in line.into_inner() {
                        match part.as_rule() {
                            Rule::test_kind => {
                                let kind_pair = Self::first_inner(part, "test kind")?;
                                kind = match kind_pair.as_rule() {
                                    Rule::aggregate_test => TestKind::Aggregate,
                                    _ => TestKind::Scalar,
                                };
                            }
                            Rule::format_version => version = part.as_str().to_string(),
                            _ => {}
                        }
                    }
                }
                Rule::include_line => {
                    for part in line.into_inner() {
                        if part.as_rule() == Rule::string_literal {
                            includes.push(Self::unquote(part.as_str()));
                        }
                    }
                }
                other => return Err(ParseError::unexpected_rule("header line", other)),
            }
        }

        Ok((kind, version, includes))
    }

    fn parse_test_group(pair: Pair<Rule>, ctx: &mut ParseContext) -> ParseResult<TestGroup> {
        let mut description = String::new();
        let mut cases = Vec::new();

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::description_line => {
                    description = inner
                        .into_inner()
                        .next()
                        .map(|text| text.as_str().trim().to_string())
                        .unwrap_or_default();
                }
                Rule::test_line => {
                    if let Some(case) = Self::parse_test_line(inner, ctx)? {
                        cases.push(case);
                    }
                }
                other => return Err(ParseError::unexpected_rule("test group content", other)),
            }
        }

        Ok(TestGroup { description, cases })
    }

    /// A test line is either a case or a table definition; definitions only
    /// update the context
    fn parse_test_line(pair: Pair<Rule>, ctx: &mut ParseContext) -> ParseResult<Option<TestCase>> {
        let inner = Self::first_inner(pair, "test case or table definition")?;
        match inner.as_rule() {
            Rule::table_definition => {
                let table = Self::parse_table_definition(inner)?;
                ctx.tables.insert(table.name.clone(), table);
                Ok(None)
            }
            Rule::test_case => Self::parse_test_case(inner, ctx).map(Some),
            other => Err(ParseError::unexpected_rule("test case", other)),
        }
    }

    fn parse_table_definition(pair: Pair<Rule>) -> ParseResult<TableDefinition> {
        let mut name = String::new();
        let mut column_types = Vec::new();
        let mut rows = Vec::new();

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::table_name => name = inner.as_str().to_string(),
                Rule::data_type => column_types.push(Self::parse_data_type(inner)?),
                Rule::table_rows => rows = Self::parse_table_rows(inner)?,
                other => return Err(ParseError::unexpected_rule("table definition", other)),
            }
        }

        Ok(TableDefinition {
            name,
            column_types,
            rows,
        })
    }

    fn parse_test_case(pair: Pair<Rule>, ctx: &ParseContext) -> ParseResult<TestCase> {
        let span = Self::span_from_pair(&pair);
        let mut rows: Option<Vec<Vec<Literal>>> = None;
        let mut function_name = String::new();
        let mut arguments = Vec::new();
        let mut options = Vec::new();
        let mut result = TestResult::Undefined;

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::table_rows => rows = Some(Self::parse_table_rows(inner)?),
                Rule::function_name => function_name = inner.as_str().to_string(),
                Rule::arguments => {
                    for argument in inner.into_inner() {
                        arguments.push(Self::parse_argument(argument, rows.as_deref(), ctx)?);
                    }
                }
                Rule::options => {
                    for option in inner.into_inner() {
                        options.push(Self::parse_option(option)?);
                    }
                }
                Rule::result => result = Self::parse_result(inner)?,
                other => return Err(ParseError::unexpected_rule("test case", other)),
            }
        }

        Ok(TestCase {
            function_name,
            arguments,
            options,
            result,
            weight: 1,
            span,
        })
    }

    fn parse_argument(
        pair: Pair<Rule>,
        rows: Option<&[Vec<Literal>]>,
        ctx: &ParseContext,
    ) -> ParseResult<Argument> {
        let inner = Self::first_inner(pair, "argument")?;
        match inner.as_rule() {
            Rule::typed_literal => {
                let (value, data_type) = Self::parse_typed_literal(inner)?;
                Ok(Argument::Value { value, data_type })
            }
            Rule::column_data => {
                let (values, data_type) = Self::parse_column_data(inner)?;
                Ok(Argument::Column {
                    source: ColumnSource::Inline,
                    values,
                    data_type,
                })
            }
            Rule::column_reference => Self::parse_column_reference(inner, rows, ctx),
            Rule::enum_argument => Ok(Argument::Enum {
                value: inner.as_str().to_string(),
            }),
            other => Err(ParseError::unexpected_rule("argument", other)),
        }
    }

    /// `t1.col0`, `col0::i32`, or `t1.col0::i32`
    fn parse_column_reference(
        pair: Pair<Rule>,
        rows: Option<&[Vec<Literal>]>,
        ctx: &ParseContext,
    ) -> ParseResult<Argument> {
        let source_span = Self::source_span(&pair);
        let mut table_name = None;
        let mut column = 0;
        let mut inline_type = None;

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::table_name => table_name = Some(inner.as_str().to_string()),
                Rule::column_name => {
                    column = inner.as_str()["col".len()..].parse::<usize>().map_err(|_| {
                        ParseError::InvalidInteger {
                            src: ctx.named_source(),
                            span: Self::source_span(&inner),
                            found: inner.as_str().to_string(),
                        }
                    })?;
                }
                Rule::data_type => inline_type = Some(Self::parse_data_type(inner)?),
                other => return Err(ParseError::unexpected_rule("column reference", other)),
            }
        }

        match table_name {
            Some(table) => {
                let definition =
                    ctx.tables
                        .get(&table)
                        .ok_or_else(|| ParseError::UnknownTable {
                            src: ctx.named_source(),
                            span: source_span,
                            table: table.clone(),
                        })?;
                let declared = definition.column_types.get(column).cloned().ok_or_else(|| {
                    ParseError::ColumnOutOfRange {
                        src: ctx.named_source(),
                        span: source_span,
                        column,
                        width: definition.column_types.len(),
                    }
                })?;
                Ok(Argument::Column {
                    source: ColumnSource::Table {
                        table,
                        column,
                    },
                    values: definition.column(column),
                    data_type: inline_type.unwrap_or(declared),
                })
            }
            None => {
                let data_type = inline_type.ok_or_else(|| ParseError::UntypedColumn {
                    src: ctx.named_source(),
                    span: source_span,
                    column,
                })?;
                let values = rows.map(|rows| column_of(rows, column)).unwrap_or_default();
                Ok(Argument::Column {
                    source: ColumnSource::Rows { column },
                    values,
                    data_type,
                })
            }
        }
    }

    fn parse_option(pair: Pair<Rule>) -> ParseResult<FuncOption> {
        let mut name = String::new();
        let mut value = String::new();
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::option_name => name = inner.as_str().to_string(),
                Rule::option_value => value = inner.as_str().to_string(),
                other => return Err(ParseError::unexpected_rule("option", other)),
            }
        }
        Ok(FuncOption { name, value })
    }

    fn parse_result(pair: Pair<Rule>) -> ParseResult<TestResult> {
        let inner = Self::first_inner(pair, "result")?;
        match inner.as_rule() {
            Rule::error_result => Ok(TestResult::Error),
            Rule::undefined_result => Ok(TestResult::Undefined),
            Rule::typed_literal => {
                let (value, data_type) = Self::parse_typed_literal(inner)?;
                Ok(TestResult::Value { value, data_type })
            }
            Rule::column_data => {
                let (values, data_type) = Self::parse_column_data(inner)?;
                Ok(TestResult::Value {
                    value: Literal::List(values),
                    data_type,
                })
            }
            other => Err(ParseError::unexpected_rule("result", other)),
        }
    }
}
