use chartweave_core::mapping::{MappingSet, parse_mapping_document};
use chartweave_core::{ChartFamily, Engine, PipelineConfig, sample_marketing_rows, templates};
use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "CHARTWEAVE_LOG";

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Core(chartweave_core::Error),
    Json(serde_json::Error),
    NotPassed,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Core(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::NotPassed => write!(f, "Dry run or validation did not pass"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<chartweave_core::Error> for CliError {
    fn from(value: chartweave_core::Error) -> Self {
        Self::Core(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Command {
    #[default]
    Transform,
    Catalog,
    DryRun,
    Validate,
    Families,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    chart: Option<String>,
    mapping: Option<String>,
    data: Option<String>,
    sample: bool,
    config: Option<String>,
    input: Option<String>,
    pretty: bool,
    strict: bool,
    verbose: bool,
}

fn usage() -> &'static str {
    "chartweave-cli\n\
\n\
USAGE:\n\
  chartweave-cli transform --chart <chart-type> [--pretty] [<template.json>|-]\n\
  chartweave-cli catalog --chart <chart-type> [--pretty] [<template.json>|-]\n\
  chartweave-cli dry-run --chart <chart-type> --mapping <mapping.json> (--data <rows.json>|--sample) [--strict] [<template.json>|-]\n\
  chartweave-cli validate --chart <chart-type> --mapping <mapping.json> (--data <rows.json>|--sample) [<template.json>|-]\n\
  chartweave-cli families [--pretty]\n\
\n\
OPTIONS:\n\
  --config <path>   YAML (.yaml/.yml) or JSON5 overrides merged onto the defaults\n\
  --verbose         debug logging on stderr (otherwise CHARTWEAVE_LOG, default warn)\n\
\n\
NOTES:\n\
  - Without a template path the built-in generic template of the chart family is used.\n\
  - '-' reads the template from stdin.\n\
  - dry-run and validate exit with status 3 when the run did not pass.\n\
"
}

fn next_value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<String, CliError> {
    it.next().cloned().ok_or(CliError::Usage(usage()))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "transform" => args.command = Command::Transform,
            "catalog" => args.command = Command::Catalog,
            "dry-run" => args.command = Command::DryRun,
            "validate" => args.command = Command::Validate,
            "families" => args.command = Command::Families,
            "--pretty" => args.pretty = true,
            "--sample" => args.sample = true,
            "--strict" => args.strict = true,
            "--verbose" | "-v" => args.verbose = true,
            "--chart" => args.chart = Some(next_value(&mut it)?),
            "--mapping" => args.mapping = Some(next_value(&mut it)?),
            "--data" => args.data = Some(next_value(&mut it)?),
            "--config" => args.config = Some(next_value(&mut it)?),
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    let needs_chart = args.command != Command::Families;
    let needs_binding = matches!(args.command, Command::DryRun | Command::Validate);
    if needs_chart && args.chart.is_none() {
        return Err(CliError::Usage(usage()));
    }
    if needs_binding && (args.mapping.is_none() || args.data.is_some() == args.sample) {
        return Err(CliError::Usage(usage()));
    }

    Ok(args)
}

fn init_tracing(verbose: bool) {
    let mut filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    if verbose {
        filter = filter.add_directive(tracing::Level::DEBUG.into());
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn read_template(input: Option<&str>, engine: &Engine, chart: &str) -> Result<Value, CliError> {
    match input {
        None => Ok(templates::generic_template(
            engine.transformer().family_for(chart),
        )),
        Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(serde_json::from_str(&buf)?)
        }
        Some(path) => Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?),
    }
}

fn load_config(path: &str) -> Result<Value, CliError> {
    let text = std::fs::read_to_string(path)?;
    let is_yaml = std::path::Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
    let overrides = if is_yaml {
        PipelineConfig::overrides_from_yaml(&text)?
    } else {
        PipelineConfig::overrides_from_json5(&text)?
    };
    Ok(overrides)
}

fn load_rows(args: &Args) -> Result<Vec<Value>, CliError> {
    match args.data.as_deref() {
        Some(path) => {
            let rows: Vec<Value> = serde_json::from_str(&std::fs::read_to_string(path)?)?;
            Ok(rows)
        }
        None => Ok(sample_marketing_rows()),
    }
}

fn load_mappings(path: &str) -> Result<MappingSet, CliError> {
    Ok(parse_mapping_document(&std::fs::read_to_string(path)?)?)
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FamilyOut {
    code: &'static str,
    description: &'static str,
    chart_types: &'static [&'static str],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DryRunOut<'a> {
    passed: bool,
    #[serde(flatten)]
    report: &'a chartweave_core::RenderReport,
    diagnostics: &'a [chartweave_core::Diagnostic],
}

fn run(args: Args) -> Result<(), CliError> {
    let mut engine = Engine::new();
    if let Some(path) = args.config.as_deref() {
        engine = engine.with_config(&load_config(path)?);
    }

    if args.command == Command::Families {
        let families: Vec<FamilyOut> = ChartFamily::ALL
            .into_iter()
            .map(|family| FamilyOut {
                code: family.code(),
                description: family.description(),
                chart_types: family.supported_chart_types(),
            })
            .collect();
        return write_json(&families, args.pretty);
    }

    let chart = args.chart.as_deref().unwrap_or_default();
    let template = read_template(args.input.as_deref(), &engine, chart)?;
    tracing::debug!(chart, family = %engine.transformer().family_for(chart), "template loaded");

    match args.command {
        Command::Transform => write_json(&engine.transform_template(chart, &template), args.pretty),
        Command::Catalog => write_json(&engine.catalog_template(chart, &template), args.pretty),
        Command::DryRun => {
            let mappings = load_mappings(args.mapping.as_deref().unwrap_or_default())?;
            let rows = load_rows(&args)?;
            let outcome = engine.dry_run_template(chart, &template, &mappings, &rows);
            let passed = outcome.value.succeeded() && (!args.strict || outcome.is_clean());
            write_json(
                &DryRunOut {
                    passed,
                    report: &outcome.value,
                    diagnostics: &outcome.diagnostics,
                },
                args.pretty,
            )?;
            if passed { Ok(()) } else { Err(CliError::NotPassed) }
        }
        Command::Validate => {
            let mappings = load_mappings(args.mapping.as_deref().unwrap_or_default())?;
            let rows = load_rows(&args)?;
            let result = engine.validate_template_mapping(chart, &template, &mappings, &rows);
            write_json(&result, args.pretty)?;
            if result.passed { Ok(()) } else { Err(CliError::NotPassed) }
        }
        Command::Families => Ok(()),
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    init_tracing(args.verbose);

    match run(args) {
        Ok(()) => {}
        Err(CliError::NotPassed) => {
            eprintln!("{}", CliError::NotPassed);
            std::process::exit(3);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
