//! Registry data model
//!
//! Namespaces, functions and variants live in flat tables owned by the
//! registry and refer to each other through small copyable ids. Ids are
//! assigned in discovery order and never reused, so they double as stable
//! keys for side tables such as coverage counters.

use crate::types::DataType;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Index of a namespace in discovery order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespaceId(pub u32);

/// Index of a function in discovery order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(pub u32);

/// Index of a variant in discovery order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariantId(pub u32);

impl NamespaceId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl FunctionId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl VariantId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionKind {
    Scalar,
    Aggregate,
    Window,
}

impl FunctionKind {
    pub const ALL: [FunctionKind; 3] = [
        FunctionKind::Scalar,
        FunctionKind::Aggregate,
        FunctionKind::Window,
    ];
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionKind::Scalar => write!(f, "scalar"),
            FunctionKind::Aggregate => write!(f, "aggregate"),
            FunctionKind::Window => write!(f, "window"),
        }
    }
}

/// One extension source
#[derive(Debug, Clone)]
pub struct Namespace {
    pub id: NamespaceId,
    /// Extension URI, e.g. `/extensions/functions_arithmetic.yaml`
    pub key: String,
    pub urn: Option<String>,
    /// Functions by name, in declaration order
    pub functions: IndexMap<String, FunctionId>,
    /// Declared dependencies: alias to target namespace key
    pub dependencies: IndexMap<String, String>,
}

/// A named function of one kind inside a namespace
#[derive(Debug, Clone)]
pub struct Function {
    pub id: FunctionId,
    pub namespace: NamespaceId,
    pub name: String,
    pub kind: FunctionKind,
    pub variants: Vec<VariantId>,
}

/// Repetition bounds of a variadic last parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variadic {
    pub min: usize,
    pub max: Option<usize>,
}

/// Declared parameter pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamPattern {
    Value(DataType),
    /// Enumeration argument with its allowed options
    Enum(Vec<String>),
}

impl ParamPattern {
    pub fn accepts(&self, arg: &ArgType) -> bool {
        match (self, arg) {
            (ParamPattern::Value(declared), ArgType::Value(concrete)) => declared.accepts(concrete),
            (ParamPattern::Enum(options), ArgType::Enum(value)) => options
                .iter()
                .any(|option| option.eq_ignore_ascii_case(value)),
            _ => false,
        }
    }

    pub fn specificity(&self) -> usize {
        match self {
            ParamPattern::Value(data_type) => data_type.specificity(),
            ParamPattern::Enum(_) => 1,
        }
    }
}

impl fmt::Display for ParamPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamPattern::Value(data_type) => write!(f, "{data_type}"),
            ParamPattern::Enum(options) => write!(f, "{{{}}}", options.join("|")),
        }
    }
}

/// Concrete argument of a test case, after canonicalization
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArgType {
    Value(DataType),
    Enum(String),
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgType::Value(data_type) => write!(f, "{data_type}"),
            ArgType::Enum(value) => write!(f, "{value}"),
        }
    }
}

/// One overload of a function
#[derive(Debug, Clone)]
pub struct Variant {
    pub id: VariantId,
    pub function: FunctionId,
    pub params: Vec<ParamPattern>,
    pub variadic: Option<Variadic>,
    pub return_type: DataType,
    /// Canonical signature, see [`format_signature`]
    pub signature: String,
}

impl Variant {
    /// Whether `arity` arguments can be passed
    pub fn accepts_arity(&self, arity: usize) -> bool {
        match self.variadic {
            None => arity == self.params.len(),
            Some(Variadic { min, max }) => {
                let fixed = self.params.len().saturating_sub(1);
                arity >= fixed + min && max.is_none_or(|max| arity <= fixed + max)
            }
        }
    }

    /// Declared pattern for the argument at `index`; variadic tails repeat the
    /// last parameter
    pub fn param_at(&self, index: usize) -> Option<&ParamPattern> {
        match self.params.get(index) {
            Some(param) => Some(param),
            None if self.variadic.is_some() => self.params.last(),
            None => None,
        }
    }

    /// Whether every argument is accepted by the corresponding parameter
    pub fn matches(&self, args: &[ArgType]) -> bool {
        self.accepts_arity(args.len())
            && args.iter().enumerate().all(|(index, arg)| {
                self.param_at(index)
                    .is_some_and(|param| param.accepts(arg))
            })
    }

    pub fn specificity(&self) -> usize {
        self.params.iter().map(ParamPattern::specificity).sum()
    }
}

/// `name(shortType, ...)`: the single formatting routine for overload keys.
/// A variadic last parameter carries a `...` suffix.
pub fn format_signature(name: &str, params: &[ParamPattern], variadic: Option<Variadic>) -> String {
    let last = params.len().saturating_sub(1);
    let params = params
        .iter()
        .enumerate()
        .map(|(index, param)| {
            if variadic.is_some() && index == last {
                format!("{param}...")
            } else {
                param.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("{name}({params})")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(text: &str) -> ParamPattern {
        ParamPattern::Value(DataType::parse(text).unwrap())
    }

    fn arg(text: &str) -> ArgType {
        ArgType::Value(DataType::parse(text).unwrap())
    }

    fn variant(params: Vec<ParamPattern>, variadic: Option<Variadic>) -> Variant {
        let signature = format_signature("f", &params, variadic);
        Variant {
            id: VariantId(0),
            function: FunctionId(0),
            params,
            variadic,
            return_type: DataType::parse("i64").unwrap(),
            signature,
        }
    }

    #[test]
    fn test_signature_uses_short_names() {
        let params = vec![value("timestamp_tz"), value("DECIMAL<P1,S1>")];
        assert_eq!(format_signature("add", &params, None), "add(tstz, dec<P1,S1>)");
    }

    #[test]
    fn test_signature_marks_variadic_and_enum_params() {
        let params = vec![
            ParamPattern::Enum(vec!["YEAR".to_string(), "MONTH".to_string()]),
            value("varchar<L1>"),
        ];
        let variadic = Some(Variadic { min: 1, max: None });
        assert_eq!(
            format_signature("concat", &params, variadic),
            "concat({YEAR|MONTH}, vchar<L1>...)"
        );
    }

    #[test]
    fn test_fixed_arity() {
        let variant = variant(vec![value("i64"), value("i64")], None);
        assert!(variant.accepts_arity(2));
        assert!(!variant.accepts_arity(1));
        assert!(!variant.accepts_arity(3));
    }

    #[test]
    fn test_variadic_arity_bounds() {
        let unbounded = variant(vec![value("str")], Some(Variadic { min: 1, max: None }));
        assert!(!unbounded.accepts_arity(0));
        assert!(unbounded.accepts_arity(1));
        assert!(unbounded.accepts_arity(7));

        let bounded = variant(
            vec![value("i64"), value("str")],
            Some(Variadic { min: 0, max: Some(2) }),
        );
        assert!(bounded.accepts_arity(1));
        assert!(bounded.accepts_arity(3));
        assert!(!bounded.accepts_arity(4));
    }

    #[test]
    fn test_variadic_tail_repeats_last_param() {
        let variant = variant(vec![value("str")], Some(Variadic { min: 1, max: None }));
        assert!(variant.matches(&[arg("str"), arg("str"), arg("str")]));
        assert!(!variant.matches(&[arg("str"), arg("i64")]));
    }

    #[test]
    fn test_enum_params_match_case_insensitively() {
        let param = ParamPattern::Enum(vec!["YEAR".to_string(), "MONTH".to_string()]);
        assert!(param.accepts(&ArgType::Enum("year".to_string())));
        assert!(!param.accepts(&ArgType::Enum("DAY".to_string())));
        assert!(!param.accepts(&arg("i64")));
    }
}
