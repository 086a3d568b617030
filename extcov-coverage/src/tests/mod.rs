//! Coverage tests over small in-memory registries and test files

mod test_report;

use extcov_parser::TestFile;
use extcov_registry::FunctionRegistry;

pub(crate) const ARITHMETIC_KEY: &str = "/extensions/functions_arithmetic.yaml";
pub(crate) const BOOLEAN_KEY: &str = "/extensions/functions_boolean.yaml";

const ARITHMETIC: &str = r#"
urn: extension:io.extcov:functions_arithmetic
scalar_functions:
  - name: add
    impls:
      - args: [ { value: i8 }, { value: i8 } ]
        return: i8
      - args: [ { value: i64 }, { value: i64 } ]
        return: i64
  - name: subtract
    impls:
      - args: [ { value: i64 }, { value: i64 } ]
        return: i64
aggregate_functions:
  - name: avg
    impls:
      - args: [ { value: i64 } ]
        return: fp64?
"#;

const BOOLEAN: &str = r#"
scalar_functions:
  - name: not
    impls:
      - args: [ { value: boolean } ]
        return: boolean
  - name: and
    impls:
      - args: [ { value: boolean } ]
        variadic: { min: 0 }
        return: boolean
"#;

/// Two namespaces with six variants in total
pub(crate) fn registry() -> FunctionRegistry {
    let mut registry = FunctionRegistry::new();
    registry.add_source(ARITHMETIC_KEY, ARITHMETIC).unwrap();
    registry.add_source(BOOLEAN_KEY, BOOLEAN).unwrap();
    registry
}

/// A scalar test file including `include` with the given case lines
pub(crate) fn test_file(file_name: &str, include: &str, cases: &str) -> TestFile {
    let source = format!(
        "### SUBSTRAIT_SCALAR_TEST: v1.0\n### SUBSTRAIT_INCLUDE: '{include}'\n\n# cases\n{cases}"
    );
    extcov_parser::parse_test_file(&source, file_name).unwrap()
}

/// Five arithmetic cases: three resolve, one names no overload and one
/// expects the wrong return type
pub(crate) fn mixed_file() -> TestFile {
    test_file(
        "arithmetic/add.test",
        ARITHMETIC_KEY,
        "add(1::i8, 2::i8) = 3::i8\n\
         add(1::i64, 2::i64) = 3::i64\n\
         add(120::i8, 10::i8) [overflow:ERROR] = <!ERROR>\n\
         add(1::fp32, 2::fp32) = 3::fp32\n\
         add(1::i64, 2::i64) = 3::i32\n",
    )
}
