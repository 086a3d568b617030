//! Type canonicalization
//!
//! Extension sources spell types in long form (`timestamp_tz`, `DECIMAL<P1,S1>`)
//! while test files use short aliases (`tstz`, `dec<38,2>`). Both are reduced to a
//! [`DataType`] keyed by the canonical long name, and rendered back in short form
//! so that signatures stay compact and unambiguous.

use crate::error::TypeError;
use extcov_parser::{TypeExpr, TypeParameter};
use indexmap::IndexMap;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt;

lazy_static! {
    /// Long-form type name to short alias, in declaration order
    static ref LONG_TO_SHORT: IndexMap<&'static str, &'static str> = [
        ("boolean", "bool"),
        ("i8", "i8"),
        ("i16", "i16"),
        ("i32", "i32"),
        ("i64", "i64"),
        ("fp32", "fp32"),
        ("fp64", "fp64"),
        ("string", "str"),
        ("binary", "vbin"),
        ("timestamp", "ts"),
        ("timestamp_tz", "tstz"),
        ("date", "date"),
        ("time", "time"),
        ("interval_year", "iyear"),
        ("interval_day", "iday"),
        ("interval_compound", "icompound"),
        ("uuid", "uuid"),
        ("fixedchar", "fchar"),
        ("varchar", "vchar"),
        ("fixedbinary", "fbin"),
        ("decimal", "dec"),
        ("precision_time", "pt"),
        ("precision_timestamp", "pts"),
        ("precision_timestamp_tz", "ptstz"),
        ("struct", "struct"),
        ("list", "list"),
        ("map", "map"),
    ]
    .into_iter()
    .collect();

    static ref SHORT_TO_LONG: HashMap<&'static str, &'static str> =
        LONG_TO_SHORT.iter().map(|(long, short)| (*short, *long)).collect();
}

/// Prefix marking a user defined type, e.g. `u!point`
pub const USER_DEFINED_PREFIX: &str = "u!";

/// Container kinds whose parameters are themselves types
const CONTAINER_KINDS: [&str; 3] = ["list", "map", "struct"];

/// Short alias of a long-form type name
///
/// Fails on names outside the table: an unmapped type would make two
/// overloads print the same signature.
pub fn short_alias(long_name: &str) -> Result<&'static str, TypeError> {
    LONG_TO_SHORT
        .get(long_name.to_ascii_lowercase().as_str())
        .copied()
        .ok_or_else(|| TypeError::UnknownTypeName {
            name: long_name.to_string(),
        })
}

/// Long-form name of a short alias
pub fn long_name(short_alias: &str) -> Result<&'static str, TypeError> {
    SHORT_TO_LONG
        .get(short_alias.to_ascii_lowercase().as_str())
        .copied()
        .ok_or_else(|| TypeError::UnknownTypeName {
            name: short_alias.to_string(),
        })
}

/// The full long-to-short table in declaration order
pub fn alias_table() -> impl Iterator<Item = (&'static str, &'static str)> {
    LONG_TO_SHORT.iter().map(|(long, short)| (*long, *short))
}

/// Canonical long name for a type written in either form
fn canonical_name(name: &str) -> Option<&'static str> {
    let lower = name.to_ascii_lowercase();
    LONG_TO_SHORT
        .get_key_value(lower.as_str())
        .map(|(long, _)| *long)
        .or_else(|| SHORT_TO_LONG.get(lower.as_str()).copied())
}

/// `any`, `any1`, `any2`, ...
fn is_wildcard_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower
        .strip_prefix("any")
        .is_some_and(|suffix| suffix.chars().all(|c| c.is_ascii_digit()))
}

/// Base kind of a type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// A built-in type, by canonical long name
    Builtin(&'static str),
    /// `u!name`
    UserDefined(String),
    /// `any`/`anyN`, matching every type
    Any(String),
}

impl TypeKind {
    pub fn is_wildcard(&self) -> bool {
        matches!(self, TypeKind::Any(_))
    }

    fn is_container(&self) -> bool {
        matches!(self, TypeKind::Builtin(name) if CONTAINER_KINDS.contains(name))
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Builtin(long) => {
                let short = LONG_TO_SHORT.get(*long).copied().unwrap_or(*long);
                write!(f, "{short}")
            }
            TypeKind::UserDefined(name) => write!(f, "{USER_DEFINED_PREFIX}{name}"),
            TypeKind::Any(name) => write!(f, "{name}"),
        }
    }
}

/// A type parameter after canonicalization
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Param {
    /// Concrete integer, e.g. the `38` of `dec<38,2>`
    Value(i64),
    /// Unbound parameter name, e.g. `P1`; matches any value
    Var(String),
    /// Nested type of a container
    Type(DataType),
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Value(value) => write!(f, "{value}"),
            Param::Var(name) => write!(f, "{name}"),
            Param::Type(data_type) => write!(f, "{data_type}"),
        }
    }
}

/// A canonical type: base kind, nullability and parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataType {
    pub kind: TypeKind,
    pub nullable: bool,
    pub params: Vec<Param>,
}

impl DataType {
    pub fn builtin(long_name: &str) -> Result<Self, TypeError> {
        let kind = canonical_name(long_name).ok_or_else(|| TypeError::UnknownTypeName {
            name: long_name.to_string(),
        })?;
        Ok(Self {
            kind: TypeKind::Builtin(kind),
            nullable: false,
            params: Vec::new(),
        })
    }

    /// Canonicalize a parsed type expression
    pub fn from_expr(expr: &TypeExpr) -> Result<Self, TypeError> {
        let kind = if let Some(name) = expr.name.strip_prefix(USER_DEFINED_PREFIX) {
            TypeKind::UserDefined(name.to_ascii_lowercase())
        } else if is_wildcard_name(&expr.name) {
            TypeKind::Any(expr.name.to_ascii_lowercase())
        } else {
            let long = canonical_name(&expr.name).ok_or_else(|| TypeError::UnknownTypeName {
                name: expr.name.clone(),
            })?;
            TypeKind::Builtin(long)
        };

        let params = expr
            .parameters
            .iter()
            .map(|param| Self::param_from_expr(&kind, param))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            kind,
            nullable: expr.nullable,
            params,
        })
    }

    /// Parse and canonicalize type text, e.g. `DECIMAL<P1,S1>` or `list<i32?>`
    pub fn parse(text: &str) -> Result<Self, TypeError> {
        let expr = extcov_parser::parse_type(text).map_err(|error| TypeError::InvalidType {
            text: text.to_string(),
            reason: error.to_string(),
        })?;
        Self::from_expr(&expr)
    }

    fn param_from_expr(kind: &TypeKind, param: &TypeParameter) -> Result<Param, TypeError> {
        match param {
            TypeParameter::Integer(value) => Ok(Param::Value(*value)),
            // Outside containers a bare identifier names a parameter, not a type
            TypeParameter::Type(expr) if !kind.is_container() && expr.is_bare() => {
                Ok(Param::Var(expr.name.clone()))
            }
            TypeParameter::Type(expr) => Ok(Param::Type(Self::from_expr(expr)?)),
        }
    }

    /// Whether a value of type `concrete` is accepted where `self` is declared
    ///
    /// Base kinds must match unless `self` is a wildcard. Unbound parameters
    /// match anything, integer parameters must be equal and nested types are
    /// compared recursively. Nullability is not compared.
    pub fn accepts(&self, concrete: &DataType) -> bool {
        if self.kind.is_wildcard() {
            return true;
        }
        if self.kind != concrete.kind {
            return false;
        }
        if self.params.is_empty() {
            return true;
        }
        self.params.len() == concrete.params.len()
            && self
                .params
                .iter()
                .zip(&concrete.params)
                .all(|(declared, actual)| match (declared, actual) {
                    (Param::Var(_), _) => true,
                    (Param::Value(a), Param::Value(b)) => a == b,
                    (Param::Type(a), Param::Type(b)) => a.accepts(b),
                    _ => false,
                })
    }

    /// How many concrete (non-wildcard) components this pattern pins down;
    /// the more specific of two matching overloads wins
    pub fn specificity(&self) -> usize {
        if self.kind.is_wildcard() {
            return 0;
        }
        1 + self
            .params
            .iter()
            .map(|param| match param {
                Param::Value(_) => 1,
                Param::Var(_) => 0,
                Param::Type(data_type) => data_type.specificity(),
            })
            .sum::<usize>()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if self.nullable {
            write!(f, "?")?;
        }
        if !self.params.is_empty() {
            let params = self
                .params
                .iter()
                .map(|param| param.to_string())
                .collect::<Vec<_>>()
                .join(",");
            write!(f, "<{params}>")?;
        }
        Ok(())
    }
}

/// Return-type comparison between a declared pattern and a concrete type
pub fn same_type(declared: &DataType, concrete: &DataType) -> bool {
    declared.accepts(concrete)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn ty(text: &str) -> DataType {
        DataType::parse(text).unwrap()
    }

    #[test]
    fn test_short_alias_fixture() {
        let expected = [
            ("i64", "i64"),
            ("fp64", "fp64"),
            ("timestamp", "ts"),
            ("timestamp_tz", "tstz"),
            ("precision_timestamp", "pts"),
            ("precision_timestamp_tz", "ptstz"),
            ("interval_year", "iyear"),
            ("interval_day", "iday"),
            ("decimal", "dec"),
            ("boolean", "bool"),
            ("string", "str"),
            ("binary", "vbin"),
            ("fixedbinary", "fbin"),
            ("fixedchar", "fchar"),
            ("varchar", "vchar"),
            ("list", "list"),
            ("map", "map"),
            ("struct", "struct"),
        ];
        for (long, short) in expected {
            assert_eq!(short_alias(long).unwrap(), short, "alias of {long}");
        }
    }

    #[test]
    fn test_alias_table_is_injective() {
        let shorts: HashSet<&str> = alias_table().map(|(_, short)| short).collect();
        assert_eq!(shorts.len(), alias_table().count());
    }

    #[test]
    fn test_long_name_reverses_short_alias() {
        for (long, short) in alias_table() {
            assert_eq!(long_name(short).unwrap(), long);
        }
    }

    #[test]
    fn test_unknown_long_name_fails() {
        assert!(matches!(
            short_alias("float128"),
            Err(TypeError::UnknownTypeName { .. })
        ));
    }

    #[test]
    fn test_long_and_short_spellings_canonicalize_equally() {
        assert_eq!(ty("TIMESTAMP_TZ"), ty("tstz"));
        assert_eq!(ty("DECIMAL<38,2>"), ty("dec<38,2>"));
        assert_eq!(ty("varchar<L1>").to_string(), "vchar<L1>");
    }

    #[test]
    fn test_display_uses_short_form() {
        assert_eq!(ty("precision_timestamp_tz?<P>").to_string(), "ptstz?<P>");
        assert_eq!(ty("LIST<STRING>").to_string(), "list<str>");
        assert_eq!(ty("u!Point").to_string(), "u!point");
        assert_eq!(ty("any1").to_string(), "any1");
    }

    #[test]
    fn test_unbound_parameters_match_values() {
        assert!(same_type(&ty("DECIMAL<P1,S1>"), &ty("dec<38,2>")));
        assert!(same_type(&ty("decimal<38,S>"), &ty("dec<38,2>")));
        assert!(!same_type(&ty("decimal<38,S>"), &ty("dec<10,2>")));
    }

    #[test]
    fn test_base_kind_must_match() {
        assert!(!same_type(&ty("i64"), &ty("i32")));
        assert!(!same_type(&ty("list<i32>"), &ty("map<i32,i32>")));
    }

    #[test]
    fn test_wildcards() {
        assert!(same_type(&ty("any1"), &ty("list<str>")));
        assert!(same_type(&ty("list<any1>"), &ty("list<i64?>")));
        assert!(!same_type(&ty("list<any1>"), &ty("map<i64,i64>")));
    }

    #[test]
    fn test_nullability_is_ignored() {
        assert!(same_type(&ty("i64?"), &ty("i64")));
        assert!(same_type(&ty("i64"), &ty("i64?")));
    }

    #[test]
    fn test_unparameterized_declaration_accepts_parameterized_value() {
        assert!(same_type(&ty("list"), &ty("list<i32>")));
        assert!(same_type(&ty("varchar"), &ty("vchar<10>")));
    }

    #[test]
    fn test_nested_types_are_compared() {
        assert!(same_type(&ty("list<decimal<P,S>>"), &ty("list<dec<38,2>>")));
        assert!(!same_type(&ty("list<i32>"), &ty("list<i64>")));
    }

    #[test]
    fn test_specificity_prefers_concrete_patterns() {
        assert!(ty("i64").specificity() > ty("any1").specificity());
        assert!(ty("dec<38,S>").specificity() > ty("dec<P,S>").specificity());
        assert!(ty("list<i32>").specificity() > ty("list<any1>").specificity());
    }

    #[test]
    fn test_invalid_type_text() {
        assert!(matches!(
            DataType::parse("list<"),
            Err(TypeError::InvalidType { .. })
        ));
        assert!(matches!(
            DataType::parse("float128"),
            Err(TypeError::UnknownTypeName { .. })
        ));
    }
}
