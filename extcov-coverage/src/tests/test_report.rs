use super::*;
use crate::*;
use pretty_assertions::assert_eq;

#[test]
fn test_every_namespace_appears_even_without_tests() {
    let registry = registry();
    let run = get_test_coverage(&[mixed_file()], &registry);

    let names: Vec<&str> = run
        .report
        .file_coverage
        .iter()
        .map(|file| file.file_name.as_str())
        .collect();
    assert_eq!(names, vec![ARITHMETIC_KEY, BOOLEAN_KEY]);

    let boolean = run.report.file(BOOLEAN_KEY).unwrap();
    assert_eq!(boolean.test_count, 0);
    assert!(boolean.function_coverage.is_empty());
}

#[test]
fn test_default_report_lists_only_tested_functions() {
    let registry = registry();
    let run = get_test_coverage(&[mixed_file()], &registry);

    let arithmetic = run.report.file(ARITHMETIC_KEY).unwrap();
    let functions: Vec<&str> = arithmetic
        .function_coverage
        .iter()
        .map(|f| f.function_name.as_str())
        .collect();
    assert_eq!(functions, vec!["add"]);
}

#[test]
fn test_include_uncovered_lists_every_variant() {
    let registry = registry();
    let run = CoverageAggregator::new(&registry)
        .with_options(ReportOptions {
            include_uncovered: true,
        })
        .run(&[mixed_file()]);

    let listed: usize = run
        .report
        .file_coverage
        .iter()
        .flat_map(|file| &file.function_coverage)
        .map(|function| function.variants.len())
        .sum();
    assert_eq!(listed, run.report.total_function_variants);

    let subtract = run
        .report
        .file(ARITHMETIC_KEY)
        .and_then(|file| file.function("subtract"))
        .unwrap();
    assert_eq!(subtract.test_count, 0);
}

#[test]
fn test_totals_roll_up() {
    let registry = registry();
    let files = vec![
        mixed_file(),
        test_file(
            "not.test",
            BOOLEAN_KEY,
            "not(true::bool) = false::bool\nnot(false::bool) = true::bool\n",
        ),
    ];
    let report = get_test_coverage(&files, &registry).report;

    for file in &report.file_coverage {
        let function_sum: u64 = file.function_coverage.iter().map(|f| f.test_count).sum();
        assert_eq!(file.test_count, function_sum, "{}", file.file_name);
        for function in &file.function_coverage {
            let variant_sum: u64 = function.variants.iter().map(|v| v.test_count).sum();
            assert_eq!(function.test_count, variant_sum, "{}", function.function_name);
        }
    }

    let attributed: u64 = report.file_coverage.iter().map(|f| f.test_count).sum();
    assert_eq!(
        attributed + report.num_tests_with_no_matching_function,
        report.test_count
    );
}

#[test]
fn test_variant_totals_are_independent_of_tests() {
    let registry = registry();

    let empty = get_test_coverage(&[], &registry).report;
    let full = get_test_coverage(&[mixed_file()], &registry).report;

    assert_eq!(empty.total_function_variants, 6);
    assert_eq!(full.total_function_variants, 6);
    assert_eq!(empty.num_covered_function_variants, 0);
    assert!(full.num_covered_function_variants <= full.total_function_variants);
    assert_eq!(full.coverage_gap(), 4);
}

#[test]
fn test_json_document_shape() {
    let registry = registry();
    let report = get_test_coverage(&[mixed_file()], &registry).report;
    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

    assert_eq!(json["test_count"], 5);
    assert_eq!(json["num_tests_with_no_matching_function"], 2);
    assert_eq!(json["num_covered_function_variants"], 2);
    assert_eq!(json["total_function_variants"], 6);

    let first = &json["file_coverage"][0];
    assert_eq!(first["file_name"], ARITHMETIC_KEY);
    assert_eq!(first["test_count"], 3);
    assert_eq!(first["function_coverage"][0]["function_name"], "add");
    assert_eq!(
        first["function_coverage"][0]["variants"][0]["signature"],
        "add(i8, i8)"
    );
    assert_eq!(json["file_coverage"][1]["function_coverage"], serde_json::json!([]));
}
