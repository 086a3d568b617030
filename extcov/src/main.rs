use clap::{Args, Parser, Subcommand};
use extcov_coverage::{CoverageAggregator, CoverageRun, RegressionGuard, ReportOptions};
use extcov_parser::load_test_files;
use extcov_registry::{FunctionRegistry, LoaderOptions};
use miette::{IntoDiagnostic, MietteHandlerOpts, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "extcov",
    version,
    about = "Test coverage of function extension definitions",
    long_about = "Attributes the cases of a function test corpus to the overloads declared by a set of YAML extension files and reports how many tests exercise each one."
)]
struct Cli {
    /// Log filter directive, overriding RUST_LOG (e.g. `debug`, `extcov_registry=trace`)
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the coverage report and print it as JSON
    Report {
        #[command(flatten)]
        inputs: Inputs,

        /// List functions without any tests as well
        #[arg(long)]
        include_uncovered: bool,

        /// Write the report here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Check registry size and coverage against regression bounds
    Check {
        #[command(flatten)]
        inputs: Inputs,

        #[command(flatten)]
        thresholds: Thresholds,
    },

    /// Print registry statistics as JSON
    Stats {
        /// Directory of YAML extension files
        #[arg(long, value_name = "DIR")]
        extensions: PathBuf,

        /// Prefix prepended to each extension's relative path to form its key
        #[arg(long, value_name = "PREFIX", default_value = "/extensions/")]
        uri_prefix: String,
    },
}

#[derive(Args)]
struct Inputs {
    /// Directory of YAML extension files
    #[arg(long, value_name = "DIR")]
    extensions: PathBuf,

    /// Directory of `.test` files
    #[arg(long, value_name = "DIR")]
    cases: PathBuf,

    /// Prefix prepended to each extension's relative path to form its key
    #[arg(long, value_name = "PREFIX", default_value = "/extensions/")]
    uri_prefix: String,
}

/// Overrides of the default regression bounds
#[derive(Args)]
struct Thresholds {
    /// Start from bounds that only require every test to resolve
    #[arg(long)]
    permissive: bool,

    #[arg(long, value_name = "N")]
    min_namespaces: Option<u64>,

    #[arg(long, value_name = "N")]
    min_functions: Option<u64>,

    #[arg(long, value_name = "N")]
    min_scalar_functions: Option<u64>,

    #[arg(long, value_name = "N")]
    min_aggregate_functions: Option<u64>,

    #[arg(long, value_name = "N")]
    min_window_functions: Option<u64>,

    #[arg(long, value_name = "N")]
    min_variants: Option<u64>,

    #[arg(long, value_name = "N")]
    min_dependencies: Option<u64>,

    #[arg(long, value_name = "N")]
    min_test_count: Option<u64>,

    #[arg(long, value_name = "N")]
    max_unresolved: Option<u64>,

    #[arg(long, value_name = "N")]
    min_covered_variants: Option<u64>,

    #[arg(long, value_name = "N")]
    max_coverage_gap: Option<u64>,
}

impl Thresholds {
    fn guard(&self) -> RegressionGuard {
        let mut guard = if self.permissive {
            RegressionGuard::permissive()
        } else {
            RegressionGuard::default()
        };

        let overrides = [
            (self.min_namespaces, &mut guard.min_namespaces),
            (self.min_functions, &mut guard.min_functions),
            (self.min_scalar_functions, &mut guard.min_scalar_functions),
            (self.min_aggregate_functions, &mut guard.min_aggregate_functions),
            (self.min_window_functions, &mut guard.min_window_functions),
            (self.min_variants, &mut guard.min_variants),
            (self.min_dependencies, &mut guard.min_dependencies),
            (self.min_test_count, &mut guard.min_test_count),
            (self.max_unresolved, &mut guard.max_unresolved),
            (self.min_covered_variants, &mut guard.min_covered_variants),
            (self.max_coverage_gap, &mut guard.max_coverage_gap),
        ];
        for (value, bound) in overrides {
            if let Some(value) = value {
                *bound = value;
            }
        }
        guard
    }
}

fn main() {
    setup_miette_handler();

    let cli = Cli::parse();

    if let Err(report) = setup_tracing(cli.log_level.as_deref()) {
        eprintln!("{:?}", report);
        process::exit(1);
    }

    let result = match cli.command {
        Some(Commands::Report {
            inputs,
            include_uncovered,
            output,
        }) => handle_report_command(&inputs, include_uncovered, output.as_deref()),
        Some(Commands::Check { inputs, thresholds }) => handle_check_command(&inputs, &thresholds),
        Some(Commands::Stats {
            extensions,
            uri_prefix,
        }) => handle_stats_command(&extensions, uri_prefix),
        None => {
            // No subcommand provided, show help
            Cli::parse_from(["extcov", "--help"]);
            Ok(())
        }
    };

    if let Err(report) = result {
        eprintln!("{:?}", report);
        process::exit(1);
    }
}

fn setup_miette_handler() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .tab_width(4)
                .with_cause_chain()
                .build(),
        )
    }))
    .ok();
}

/// Log to stderr so JSON on stdout stays clean
fn setup_tracing(log_level: Option<&str>) -> Result<()> {
    let filter = match log_level {
        Some(directive) => EnvFilter::try_new(directive).into_diagnostic()?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .try_init()
        .into_diagnostic()
}

fn load_registry(extensions: &Path, uri_prefix: String) -> Result<FunctionRegistry> {
    let options = LoaderOptions { uri_prefix };
    Ok(FunctionRegistry::load_with_options(extensions, &options)?)
}

fn compute_coverage(
    registry: &FunctionRegistry,
    inputs: &Inputs,
    options: ReportOptions,
) -> Result<CoverageRun> {
    let test_files = load_test_files(&inputs.cases)?;
    let run = CoverageAggregator::new(registry)
        .with_options(options)
        .run(&test_files);

    if !run.diagnostics.is_empty() {
        tracing::warn!(
            files = test_files.len(),
            diagnostics = run.diagnostics.len(),
            "some tests could not be attributed"
        );
    }
    Ok(run)
}

fn handle_report_command(
    inputs: &Inputs,
    include_uncovered: bool,
    output: Option<&Path>,
) -> Result<()> {
    let registry = load_registry(&inputs.extensions, inputs.uri_prefix.clone())?;
    let run = compute_coverage(&registry, inputs, ReportOptions { include_uncovered })?;
    let json = run.report.to_json().into_diagnostic()?;

    match output {
        Some(path) => fs::write(path, json + "\n").into_diagnostic()?,
        None => println!("{json}"),
    }
    Ok(())
}

fn handle_check_command(inputs: &Inputs, thresholds: &Thresholds) -> Result<()> {
    let registry = load_registry(&inputs.extensions, inputs.uri_prefix.clone())?;
    let run = compute_coverage(&registry, inputs, ReportOptions::default())?;

    let violations = thresholds.guard().check(&registry.stats(), &run.report);
    if violations.is_empty() {
        println!(
            "✅ {} tests, {}/{} variants covered",
            run.report.test_count,
            run.report.num_covered_function_variants,
            run.report.total_function_variants
        );
        return Ok(());
    }

    for violation in &violations {
        eprintln!("{:?}", miette::Report::new(violation.clone()));
    }
    Err(miette::miette!(
        "{} regression bound(s) violated",
        violations.len()
    ))
}

fn handle_stats_command(extensions: &Path, uri_prefix: String) -> Result<()> {
    let registry = load_registry(extensions, uri_prefix)?;
    let json = serde_json::to_string_pretty(&registry.stats()).into_diagnostic()?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds(args: &[&str]) -> Thresholds {
        let argv = ["extcov", "check", "--extensions", "ext", "--cases", "cases"]
            .into_iter()
            .chain(args.iter().copied());
        match Cli::try_parse_from(argv).unwrap().command {
            Some(Commands::Check { thresholds, .. }) => thresholds,
            _ => panic!("expected the check command"),
        }
    }

    #[test]
    fn test_every_registry_bound_can_be_overridden() {
        let guard = thresholds(&[
            "--min-namespaces",
            "3",
            "--min-scalar-functions",
            "5",
            "--min-aggregate-functions",
            "2",
            "--min-window-functions",
            "1",
        ])
        .guard();

        assert_eq!(guard.min_namespaces, 3);
        assert_eq!(guard.min_scalar_functions, 5);
        assert_eq!(guard.min_aggregate_functions, 2);
        assert_eq!(guard.min_window_functions, 1);
        assert_eq!(guard.min_test_count, RegressionGuard::default().min_test_count);
    }

    #[test]
    fn test_overrides_apply_on_top_of_permissive_bounds() {
        let guard = thresholds(&["--permissive", "--min-functions", "7"]).guard();

        assert_eq!(guard.min_functions, 7);
        assert_eq!(guard.min_scalar_functions, 0);
        assert_eq!(guard.max_coverage_gap, u64::MAX);
    }
}
