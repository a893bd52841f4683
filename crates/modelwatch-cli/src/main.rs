use anyhow::Result;
use clap::{Arg, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use modelwatch_cli::commands::detect::run_detect;
use modelwatch_cli::commands::entity::entity_summary;
use modelwatch_cli::commands::export::{parse_sections, run_export, ExportArgs};
use modelwatch_cli::commands::summary::{load_thresholds, snapshot_kpis, summarize, write_kpi_csv, SummaryView};
use modelwatch_cli::snapshot::load_snapshot;
use modelwatch_export::ExportFormat;

fn snapshot_arg() -> Arg {
    Arg::new("snapshot")
        .help("Path to a JSON snapshot of models, metrics, monitoring jobs, deployments and quality reports")
        .required(true)
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::FilePath)
}

fn thresholds_arg() -> Arg {
    Arg::new("thresholds")
        .long("thresholds")
        .help("JSON KPI threshold table. Defaults to the built-in table.")
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::FilePath)
}

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("MODELWATCH_LOG", "error,modelwatch=info"))
        .init();

    let matches = Command::new("modelwatch")
        .version(clap::crate_version!())
        .about("\u{1F4C8} modelwatch - ML portfolio monitoring aggregates and report export")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("summary")
                .about("Print a dashboard aggregate as JSON")
                .arg(snapshot_arg())
                .arg(
                    Arg::new("view")
                        .long("view")
                        .help("Aggregate to compute")
                        .value_parser(SummaryView::NAMES)
                        .default_value("health"),
                )
                .arg(thresholds_arg())
                .arg(
                    Arg::new("csv")
                        .long("csv")
                        .help("Also write the KPI list to this CSV file (kpis view only)")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("entity")
                .about("Print the metric history and latest snapshot of one entity")
                .arg(snapshot_arg())
                .arg(
                    Arg::new("entity_id")
                        .help("Entity (model) identifier")
                        .required(true)
                        .value_parser(clap::builder::NonEmptyStringValueParser::new()),
                ),
        )
        .subcommand(
            Command::new("detect")
                .about("Detect data, concept and prediction drift between two CSV samples")
                .arg(
                    Arg::new("baseline")
                        .help("Baseline sample (CSV or TSV with a header row)")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("current")
                        .help("Current sample with the same columns")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("threshold")
                        .short('t')
                        .long("threshold")
                        .help("Drift threshold (KS p-value cut-off and relative shift). Default 0.10.")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    Arg::new("entity")
                        .short('e')
                        .long("entity")
                        .help("Also emit a monitoring job record for this entity")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new()),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export a monitoring report as a paginated document or slide deck")
                .arg(snapshot_arg())
                .arg(
                    Arg::new("format")
                        .short('f')
                        .long("format")
                        .help("Artifact format")
                        .value_parser(["document", "slides"])
                        .default_value("document"),
                )
                .arg(
                    Arg::new("entity")
                        .short('e')
                        .long("entity")
                        .help("Scope the report to one entity. Defaults to the whole portfolio.")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new()),
                )
                .arg(
                    Arg::new("sections")
                        .short('s')
                        .long("sections")
                        .help("Comma separated sections, e.g. kpis,drift_distribution. Overrides the config file.")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new()),
                )
                .arg(
                    Arg::new("captures")
                        .long("captures")
                        .help("Directory holding pre-rendered section images (<target>.png)")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("output_dir")
                        .short('o')
                        .long("output-dir")
                        .help("Directory the artifact is written to. Overrides the config file.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .help("JSON export configuration file")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(thresholds_arg()),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    match matches.subcommand() {
        Some(("summary", sub_m)) => handle_summary(sub_m),
        Some(("entity", sub_m)) => handle_entity(sub_m),
        Some(("detect", sub_m)) => handle_detect(sub_m),
        Some(("export", sub_m)) => handle_export(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn handle_summary(matches: &ArgMatches) -> Result<()> {
    let snapshot_path: &PathBuf = matches.get_one("snapshot").unwrap();
    let view: SummaryView = matches
        .get_one::<String>("view")
        .map(|v| v.parse::<SummaryView>())
        .transpose()
        .map_err(anyhow::Error::msg)?
        .unwrap_or(SummaryView::Health);
    log::info!("[modelwatch::summary] {} view of {:?}", view, snapshot_path);

    let snapshot = load_snapshot(snapshot_path)?;
    let thresholds = load_thresholds(matches.get_one::<PathBuf>("thresholds").map(|p| p.as_path()))?;

    print_json(&summarize(&snapshot, view, &thresholds)?)?;

    if let Some(csv_path) = matches.get_one::<PathBuf>("csv") {
        if view == SummaryView::Kpis {
            write_kpi_csv(&snapshot_kpis(&snapshot, &thresholds), csv_path)?;
        } else {
            log::warn!("--csv is only supported for the kpis view; ignoring");
        }
    }
    Ok(())
}

fn handle_entity(matches: &ArgMatches) -> Result<()> {
    let snapshot_path: &PathBuf = matches.get_one("snapshot").unwrap();
    let entity_id: &String = matches.get_one("entity_id").unwrap();

    let snapshot = load_snapshot(snapshot_path)?;
    print_json(&entity_summary(&snapshot, entity_id))
}

fn handle_detect(matches: &ArgMatches) -> Result<()> {
    let baseline: &PathBuf = matches.get_one("baseline").unwrap();
    let current: &PathBuf = matches.get_one("current").unwrap();
    let threshold = matches.get_one::<f64>("threshold").copied();
    let entity = matches.get_one::<String>("entity").map(|s| s.as_str());
    log::info!("[modelwatch::detect] {:?} vs {:?}", baseline, current);

    let output = run_detect(baseline, current, threshold, entity)?;
    print_json(&output)
}

fn handle_export(matches: &ArgMatches) -> Result<()> {
    let format: ExportFormat = matches
        .get_one::<String>("format")
        .map(|f| f.parse::<ExportFormat>())
        .transpose()
        .map_err(anyhow::Error::msg)?
        .unwrap_or_default();
    let sections = matches
        .get_one::<String>("sections")
        .map(|s| parse_sections(s))
        .transpose()?;

    let args = ExportArgs {
        snapshot: matches.get_one::<PathBuf>("snapshot").cloned().unwrap_or_default(),
        format,
        entity: matches.get_one::<String>("entity").cloned(),
        sections,
        captures: matches.get_one::<PathBuf>("captures").cloned(),
        output_dir: matches.get_one::<PathBuf>("output_dir").cloned(),
        config: matches.get_one::<PathBuf>("config").cloned(),
        thresholds: matches.get_one::<PathBuf>("thresholds").cloned(),
    };
    log::info!("[modelwatch::export] {} report from {:?}", args.format, args.snapshot);

    let runtime = tokio::runtime::Runtime::new()?;
    match runtime.block_on(run_export(&args)) {
        Ok(outcome) => {
            println!("{}", outcome.path.display());
            Ok(())
        }
        Err(e) => {
            log::error!("Export failed: {:#}", e);
            std::process::exit(1)
        }
    }
}
