// End-to-end coverage over the on-disk fixture corpus

use extcov_coverage::*;
use extcov_parser::load_test_files;
use extcov_registry::FunctionRegistry;
use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture_run() -> (FunctionRegistry, CoverageRun) {
    let registry = FunctionRegistry::load(&fixtures_dir().join("extensions")).unwrap();
    let test_files = load_test_files(&fixtures_dir().join("cases")).unwrap();
    let run = get_test_coverage(&test_files, &registry);
    (registry, run)
}

#[test]
fn test_fixture_totals() {
    let (_, run) = fixture_run();

    assert!(run.diagnostics.is_empty(), "{:?}", run.diagnostics);
    assert_eq!(run.report.test_count, 14);
    assert_eq!(run.report.num_tests_with_no_matching_function, 0);
    assert_eq!(run.report.num_covered_function_variants, 10);
    assert_eq!(run.report.total_function_variants, 14);
}

#[test]
fn test_fixture_namespace_totals() {
    let (_, run) = fixture_run();

    let totals: Vec<(&str, u64)> = run
        .report
        .file_coverage
        .iter()
        .map(|file| (file.file_name.as_str(), file.test_count))
        .collect();
    assert_eq!(
        totals,
        vec![
            ("/extensions/functions_arithmetic.yaml", 10),
            ("/extensions/functions_datetime.yaml", 4),
            ("/extensions/functions_unused.yaml", 0),
        ]
    );
}

#[test]
fn test_inherited_function_is_attributed_to_its_declaring_namespace() {
    let (_, run) = fixture_run();

    let add = run
        .report
        .file("/extensions/functions_arithmetic.yaml")
        .and_then(|file| file.function("add"))
        .unwrap();
    let counts: Vec<(&str, u64)> = add
        .variants
        .iter()
        .map(|v| (v.signature.as_str(), v.test_count))
        .collect();
    assert_eq!(
        counts,
        vec![
            ("add(i8, i8)", 3),
            ("add(i16, i16)", 1),
            ("add(i32, i32)", 1),
            ("add(i64, i64)", 2),
            ("add(fp64, fp64)", 0),
        ]
    );

    let datetime = run.report.file("/extensions/functions_datetime.yaml").unwrap();
    assert!(datetime.function("add").is_none());
}

#[test]
fn test_enum_and_parameterized_overloads() {
    let (_, run) = fixture_run();
    let datetime = run.report.file("/extensions/functions_datetime.yaml").unwrap();

    let extract = datetime.function("extract").unwrap();
    assert_eq!(extract.variants[0].signature, "extract({YEAR|MONTH|DAY}, date)");
    assert_eq!(extract.variants[0].test_count, 2);
    assert_eq!(extract.variants[1].test_count, 1);

    let lt = datetime.function("lt").unwrap();
    assert_eq!(lt.variants[0].signature, "lt(pts<P>, pts<P>)");
    assert_eq!(lt.test_count, 1);
}

#[test]
fn test_fixture_guard() {
    let (registry, run) = fixture_run();

    let guard = RegressionGuard {
        min_namespaces: 3,
        min_functions: 7,
        min_variants: 14,
        min_dependencies: 1,
        min_scalar_functions: 5,
        min_aggregate_functions: 2,
        min_window_functions: 0,
        min_test_count: 14,
        max_unresolved: 0,
        min_covered_variants: 10,
        max_coverage_gap: 4,
    };
    assert_eq!(guard.check(&registry.stats(), &run.report), Vec::new());
}

#[test]
fn test_fixture_report_is_stable() {
    let (_, first) = fixture_run();
    let (_, second) = fixture_run();

    assert_eq!(
        first.report.to_json().unwrap(),
        second.report.to_json().unwrap()
    );
}
