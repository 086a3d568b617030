//! Extension source loading
//!
//! Every YAML document under the extension directory becomes one namespace.
//! Only the function sections and the dependency map are read; type and type
//! variation declarations are ignored.

use crate::error::{RegistryError, RegistryResult};
use crate::model::{FunctionKind, NamespaceId, ParamPattern, Variadic};
use crate::registry::FunctionRegistry;
use crate::types::DataType;
use indexmap::IndexMap;
use miette::NamedSource;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// File extensions of extension sources
pub const SOURCE_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// How namespace keys are derived from source paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Prepended to the relative path of each source
    pub uri_prefix: String,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            uri_prefix: "/extensions/".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExtensionDocument {
    #[serde(default)]
    urn: Option<String>,
    #[serde(default)]
    dependencies: IndexMap<String, String>,
    #[serde(default)]
    scalar_functions: Vec<FunctionDocument>,
    #[serde(default)]
    aggregate_functions: Vec<FunctionDocument>,
    #[serde(default)]
    window_functions: Vec<FunctionDocument>,
}

#[derive(Debug, Deserialize)]
struct FunctionDocument {
    name: String,
    #[serde(default)]
    impls: Vec<ImplDocument>,
}

#[derive(Debug, Deserialize)]
struct ImplDocument {
    #[serde(default)]
    args: Vec<ArgDocument>,
    #[serde(default)]
    variadic: Option<VariadicDocument>,
    #[serde(rename = "return")]
    return_type: String,
}

/// A value argument has `value`, an enumeration argument has `options`
#[derive(Debug, Deserialize)]
struct ArgDocument {
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    options: Option<Vec<serde_yaml::Value>>,
}

#[derive(Debug, Deserialize)]
struct VariadicDocument {
    #[serde(default)]
    min: Option<usize>,
    #[serde(default)]
    max: Option<usize>,
}

impl FunctionRegistry {
    /// Load every extension source under `dir` with default options
    pub fn load(dir: &Path) -> RegistryResult<Self> {
        Self::load_with_options(dir, &LoaderOptions::default())
    }

    pub fn load_with_options(dir: &Path, options: &LoaderOptions) -> RegistryResult<Self> {
        let mut registry = FunctionRegistry::new();

        for (relative_path, absolute_path) in find_sources(dir)? {
            let source = fs::read_to_string(&absolute_path).map_err(|source| RegistryError::Io {
                path: absolute_path.clone(),
                source,
            })?;
            let key = format!("{}{}", options.uri_prefix, relative_path);
            let namespace = registry.add_source(&key, &source)?;

            tracing::debug!(
                namespace = %key,
                functions = registry.functions_of(namespace).count(),
                "loaded extension source"
            );
        }

        tracing::info!(
            namespaces = registry.namespace_count(),
            variants = registry.variant_count(),
            "function registry loaded"
        );
        Ok(registry)
    }

    /// Parse one YAML extension document into a new namespace named `key`
    pub fn add_source(&mut self, key: &str, source: &str) -> RegistryResult<NamespaceId> {
        let document: ExtensionDocument = serde_yaml::from_str(source).map_err(|error| {
            RegistryError::from_yaml_error(error, NamedSource::new(key, source.to_string()))
        })?;

        let namespace = self.add_namespace(key, document.urn.as_deref())?;
        for (alias, target) in &document.dependencies {
            self.add_dependency(namespace, alias, target);
        }

        let sections = [
            (FunctionKind::Scalar, &document.scalar_functions),
            (FunctionKind::Aggregate, &document.aggregate_functions),
            (FunctionKind::Window, &document.window_functions),
        ];
        for (kind, functions) in sections {
            for function in functions {
                self.add_function_document(namespace, key, kind, function)?;
            }
        }

        Ok(namespace)
    }

    fn add_function_document(
        &mut self,
        namespace: NamespaceId,
        key: &str,
        kind: FunctionKind,
        document: &FunctionDocument,
    ) -> RegistryResult<()> {
        let function = self.add_function(namespace, &document.name, kind)?;
        let type_error = |error| RegistryError::InvalidType {
            namespace: key.to_string(),
            function: document.name.clone(),
            error,
        };

        for implementation in &document.impls {
            let mut params = Vec::with_capacity(implementation.args.len());
            for (index, arg) in implementation.args.iter().enumerate() {
                let param = match (&arg.value, &arg.options) {
                    (Some(value), _) => ParamPattern::Value(DataType::parse(value).map_err(type_error)?),
                    (None, Some(options)) => {
                        ParamPattern::Enum(options.iter().filter_map(option_text).collect())
                    }
                    (None, None) => {
                        return Err(RegistryError::InvalidArgument {
                            namespace: key.to_string(),
                            function: document.name.clone(),
                            index,
                        });
                    }
                };
                params.push(param);
            }

            let variadic = implementation.variadic.as_ref().map(|v| Variadic {
                min: v.min.unwrap_or(0),
                max: v.max,
            });
            let return_type =
                DataType::parse(return_type_line(&implementation.return_type)).map_err(type_error)?;

            self.add_variant(function, params, variadic, return_type)?;
        }

        Ok(())
    }
}

/// Return types may be derivation programs; the last non-empty line is the type
fn return_type_line(text: &str) -> &str {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .unwrap_or(text)
}

/// Scalar YAML option values as written
fn option_text(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(text) => Some(text.clone()),
        serde_yaml::Value::Bool(flag) => Some(flag.to_string().to_uppercase()),
        serde_yaml::Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Find all extension sources, as (relative path, absolute path) pairs
/// sorted by relative path
fn find_sources(dir: &Path) -> RegistryResult<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();
    find_sources_recursive(dir, dir, &mut files)?;
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

fn find_sources_recursive(
    root_dir: &Path,
    current_dir: &Path,
    files: &mut Vec<(String, PathBuf)>,
) -> RegistryResult<()> {
    let io_error = |source| RegistryError::Io {
        path: current_dir.to_path_buf(),
        source,
    };

    for entry in fs::read_dir(current_dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();

        if path.is_dir() {
            find_sources_recursive(root_dir, &path, files)?;
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
        {
            let relative_path = path
                .strip_prefix(root_dir)
                .unwrap_or(&path)
                .to_string_lossy()
                .replace('\\', "/");
            files.push((relative_path, path));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ARITHMETIC: &str = r#"
urn: extension:io.test:functions_arithmetic
dependencies:
  types: extension:io.test:types
scalar_functions:
  - name: add
    description: Add two values.
    impls:
      - args:
          - name: x
            value: i8
          - name: y
            value: i8
        options:
          overflow:
            values: [SILENT, SATURATE, ERROR]
        return: i8
      - args:
          - value: DECIMAL<P1,S1>
          - value: DECIMAL<P2,S2>
        return: |-
          init_scale = max(S1,S2)
          DECIMAL<38, init_scale>
aggregate_functions:
  - name: sum
    impls:
      - args:
          - value: i64
        nullability: DECLARED_OUTPUT
        return: i64?
"#;

    #[test]
    fn test_add_source_reads_sections() {
        let mut registry = FunctionRegistry::new();
        let ns = registry
            .add_source("/extensions/functions_arithmetic.yaml", ARITHMETIC)
            .unwrap();

        let namespace = registry.namespace(ns);
        assert_eq!(namespace.urn.as_deref(), Some("extension:io.test:functions_arithmetic"));
        assert_eq!(registry.dependency_count(), 1);

        let signatures: Vec<String> = registry
            .functions_of(ns)
            .flat_map(|f| registry.variants_of(f.id))
            .map(|v| v.signature.clone())
            .collect();
        assert_eq!(
            signatures,
            vec!["add(i8, i8)", "add(dec<P1,S1>, dec<P2,S2>)", "sum(i64)"]
        );
    }

    #[test]
    fn test_derivation_program_uses_last_line() {
        let mut registry = FunctionRegistry::new();
        let ns = registry.add_source("/extensions/a.yaml", ARITHMETIC).unwrap();
        let add = registry.functions_of(ns).next().unwrap().id;
        let decimal = registry.variants_of(add).nth(1).unwrap();

        assert_eq!(decimal.return_type.to_string(), "dec<38,init_scale>");
    }

    #[test]
    fn test_enum_and_variadic_impls() {
        let source = r#"
scalar_functions:
  - name: extract
    impls:
      - args:
          - name: component
            options: [ YEAR, MONTH, DAY ]
          - value: date
        return: i64
  - name: concat
    impls:
      - args:
          - value: "varchar<L1>"
        variadic:
          min: 1
        return: "varchar<L1>"
"#;
        let mut registry = FunctionRegistry::new();
        let ns = registry.add_source("/extensions/s.yaml", source).unwrap();

        let signatures: Vec<String> = registry
            .functions_of(ns)
            .flat_map(|f| registry.variants_of(f.id))
            .map(|v| v.signature.clone())
            .collect();
        assert_eq!(
            signatures,
            vec!["extract({YEAR|MONTH|DAY}, date)", "concat(vchar<L1>...)"]
        );
    }

    #[test]
    fn test_argument_without_value_or_options_is_rejected() {
        let source = "scalar_functions:\n  - name: f\n    impls:\n      - args:\n          - name: x\n        return: i64\n";
        let mut registry = FunctionRegistry::new();

        assert!(matches!(
            registry.add_source("/extensions/f.yaml", source),
            Err(RegistryError::InvalidArgument { index: 0, .. })
        ));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let source = "scalar_functions:\n  - name: f\n    impls:\n      - args:\n          - value: float128\n        return: i64\n";
        let mut registry = FunctionRegistry::new();

        assert!(matches!(
            registry.add_source("/extensions/f.yaml", source),
            Err(RegistryError::InvalidType { .. })
        ));
    }

    #[test]
    fn test_malformed_yaml_carries_location() {
        let source = "scalar_functions:\n  - name: [unterminated\n";
        let mut registry = FunctionRegistry::new();

        match registry.add_source("/extensions/bad.yaml", source) {
            Err(RegistryError::Malformed { span, .. }) => assert!(span.is_some()),
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn test_return_type_line() {
        assert_eq!(return_type_line("i64"), "i64");
        assert_eq!(return_type_line("a = 1\n\n  DECIMAL<P, S>\n\n"), "DECIMAL<P, S>");
    }
}
