// Test case file AST
// Syntax tree produced from `.test` files and standalone type expressions

use std::fmt;

/// Source location of a syntax node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub start_line_col: Option<(usize, usize)>,
    pub end_line_col: Option<(usize, usize)>,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            start_line_col: None,
            end_line_col: None,
        }
    }

    pub fn with_line_col(
        start: usize,
        end: usize,
        start_line_col: (usize, usize),
        end_line_col: (usize, usize),
    ) -> Self {
        Self {
            start,
            end,
            start_line_col: Some(start_line_col),
            end_line_col: Some(end_line_col),
        }
    }

    /// 1-based line of the start of this span, if known
    pub fn line(&self) -> Option<usize> {
        self.start_line_col.map(|(line, _)| line)
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Which kind of function a test file exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestKind {
    Scalar,
    Aggregate,
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestKind::Scalar => write!(f, "scalar"),
            TestKind::Aggregate => write!(f, "aggregate"),
        }
    }
}

/// A parsed `.test` file
#[derive(Debug, Clone, PartialEq)]
pub struct TestFile {
    /// Name the file was loaded under (relative path for corpus files)
    pub file_name: String,
    pub kind: TestKind,
    /// Format version from the header, e.g. `v1.0`
    pub version: String,
    /// Extension sources named by `SUBSTRAIT_INCLUDE`, in header order
    pub includes: Vec<String>,
    pub groups: Vec<TestGroup>,
}

impl TestFile {
    /// The primary include; every test case in the file targets it
    pub fn include(&self) -> &str {
        self.includes.first().map(String::as_str).unwrap_or_default()
    }

    /// All test cases in file order
    pub fn test_cases(&self) -> impl Iterator<Item = &TestCase> {
        self.groups.iter().flat_map(|group| group.cases.iter())
    }

    pub fn test_case_count(&self) -> usize {
        self.groups.iter().map(|group| group.cases.len()).sum()
    }
}

/// Test cases sharing a `#` description line
#[derive(Debug, Clone, PartialEq)]
pub struct TestGroup {
    /// Description text, empty for cases that precede the first group line
    pub description: String,
    pub cases: Vec<TestCase>,
}

/// A single function invocation with its expected outcome
#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    pub function_name: String,
    pub arguments: Vec<Argument>,
    pub options: Vec<FuncOption>,
    pub result: TestResult,
    /// How many tests this case counts for
    pub weight: u32,
    pub span: Span,
}

impl TestCase {
    /// Types of the value arguments; enumeration arguments have none
    pub fn arg_types(&self) -> impl Iterator<Item = Option<&TypeExpr>> {
        self.arguments.iter().map(Argument::data_type)
    }

    /// Expected return type, absent when an error or undefined result is expected
    pub fn return_type(&self) -> Option<&TypeExpr> {
        match &self.result {
            TestResult::Value { data_type, .. } => Some(data_type),
            TestResult::Error | TestResult::Undefined => None,
        }
    }

    /// True when the case expects an error (or undefined) instead of a value
    pub fn is_return_type_error(&self) -> bool {
        self.return_type().is_none()
    }

    /// `name(type, type)` with the argument types as written
    pub fn signature(&self) -> String {
        let args = self
            .arguments
            .iter()
            .map(|arg| arg.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({})", self.function_name, args)
    }
}

/// Argument of a test case invocation
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// `literal::type`
    Value { value: Literal, data_type: TypeExpr },
    /// Column of values for an aggregate, from `(v, ...)::type` or a table
    Column {
        source: ColumnSource,
        values: Vec<Literal>,
        data_type: TypeExpr,
    },
    /// Bare enumeration value such as `YEAR`
    Enum { value: String },
}

impl Argument {
    pub fn data_type(&self) -> Option<&TypeExpr> {
        match self {
            Argument::Value { data_type, .. } | Argument::Column { data_type, .. } => {
                Some(data_type)
            }
            Argument::Enum { .. } => None,
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Value { data_type, .. } | Argument::Column { data_type, .. } => {
                write!(f, "{data_type}")
            }
            Argument::Enum { value } => write!(f, "{value}"),
        }
    }
}

/// Where the values of a column argument come from
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSource {
    /// `(1, 2, 3)::i32`
    Inline,
    /// `t1.col0`, typed by a preceding `DEFINE`
    Table { table: String, column: usize },
    /// `col0::i32`, taken from the rows written before the function name
    Rows { column: usize },
}

/// Literal values. Numbers keep their source text; coverage never evaluates them.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Number(String),
    /// `inf`, `-inf`, `nan` in any case
    SpecialFloat(String),
    String(String),
    List(Vec<Literal>),
}

/// `name:value` entry of a test case option list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncOption {
    pub name: String,
    pub value: String,
}

/// Expected outcome of a test case
#[derive(Debug, Clone, PartialEq)]
pub enum TestResult {
    Value { value: Literal, data_type: TypeExpr },
    /// `<!ERROR>`
    Error,
    /// `<!UNDEFINED>`
    Undefined,
}

/// A `DEFINE`d table available to later aggregate test cases
#[derive(Debug, Clone, PartialEq)]
pub struct TableDefinition {
    pub name: String,
    pub column_types: Vec<TypeExpr>,
    pub rows: Vec<Vec<Literal>>,
}

impl TableDefinition {
    /// Values of one column across all rows; short rows contribute nothing
    pub fn column(&self, index: usize) -> Vec<Literal> {
        column_of(&self.rows, index)
    }
}

pub(crate) fn column_of(rows: &[Vec<Literal>], index: usize) -> Vec<Literal> {
    rows.iter().filter_map(|row| row.get(index).cloned()).collect()
}

/// A type as written: base name, nullability and parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeExpr {
    pub name: String,
    pub nullable: bool,
    pub parameters: Vec<TypeParameter>,
}

impl TypeExpr {
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nullable: false,
            parameters: Vec::new(),
        }
    }

    pub fn with_parameters(name: impl Into<String>, parameters: Vec<TypeParameter>) -> Self {
        Self {
            name: name.into(),
            nullable: false,
            parameters,
        }
    }

    /// True for a bare name with neither parameters nor nullability marker
    pub fn is_bare(&self) -> bool {
        !self.nullable && self.parameters.is_empty()
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.nullable {
            write!(f, "?")?;
        }
        if !self.parameters.is_empty() {
            let params = self
                .parameters
                .iter()
                .map(|param| param.to_string())
                .collect::<Vec<_>>()
                .join(",");
            write!(f, "<{params}>")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeParameter {
    Integer(i64),
    Type(TypeExpr),
}

impl fmt::Display for TypeParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeParameter::Integer(value) => write!(f, "{value}"),
            TypeParameter::Type(type_expr) => write!(f, "{type_expr}"),
        }
    }
}
