use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use pss_qc::app::QcPipeline;
use pss_qc::bulk::ConfiguredLoader;
use pss_qc::catalog::SqliteCatalog;
use pss_qc::columns;
use pss_qc::config::ConfigLoader;
use pss_qc::outcome::Outcome;
use pss_qc::output::{JsonOutput, OutputMode, TextOutput, TracingSink};
use pss_qc::report::report_timestamp;
use pss_qc::set_file::write_set_file;

#[derive(Parser)]
#[command(name = "pss-qc")]
#[command(about = "QC reports for problem sequence setload files")]
#[command(version)]
struct Cli {
    #[arg(long, global = true, help = "Print results as JSON on stdout")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Validate a delta file against the accession catalog")]
    Run(RunArgs),
    #[command(about = "Write the two-column setload file")]
    SetFile(SetFileArgs),
    #[command(about = "Check that every line of a tab-delimited file has enough columns")]
    CheckColumns(CheckColumnsArgs),
}

#[derive(Args)]
struct RunArgs {
    input: Utf8PathBuf,
}

#[derive(Args)]
struct SetFileArgs {
    #[arg(long, help = "Input file (default: $INPUT_FILE_DEFAULT)")]
    input: Option<Utf8PathBuf>,

    #[arg(long, help = "Output file (default: $INPUT_FILE_SET)")]
    output: Option<Utf8PathBuf>,
}

#[derive(Args)]
struct CheckColumnsArgs {
    file: Utf8PathBuf,
    num_columns: usize,
}

fn main() -> ExitCode {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(Outcome::Exceptional.exit_code()),
            };
        }
    };

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(report) => {
            eprintln!("{report:?}");
            ExitCode::from(Outcome::Exceptional.exit_code())
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> miette::Result<u8> {
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    match cli.command {
        Commands::Run(args) => run_qc(args, output_mode),
        Commands::SetFile(args) => run_set_file(args, output_mode),
        Commands::CheckColumns(args) => run_check_columns(args, output_mode),
    }
}

fn run_qc(args: RunArgs, output_mode: OutputMode) -> miette::Result<u8> {
    let config = ConfigLoader::from_env()?;
    tracing::info!(
        server = %config.target.server,
        database = %config.target.database,
        live_run = config.live_run,
        "starting QC run"
    );

    let catalog = SqliteCatalog::open(config.require_catalog_db()?)?;
    let loader = ConfiguredLoader::from_config(&config)?;
    let pipeline = QcPipeline::new(config, loader);

    let timestamp = report_timestamp();
    let result = pipeline.run(catalog, &args.input, &timestamp, &TracingSink);
    let outcome = Outcome::from_run(&result);
    let summary = result?;

    if matches!(output_mode, OutputMode::Json) {
        JsonOutput::print_summary(&summary).into_diagnostic()?;
    }
    Ok(outcome.exit_code())
}

fn run_set_file(args: SetFileArgs, output_mode: OutputMode) -> miette::Result<u8> {
    let paths = ConfigLoader::set_file_from_env().with_overrides(args.input, args.output);
    let input = paths.require_input()?;
    let output = paths.require_output()?;

    tracing::info!("creating set file {output}");
    let result = write_set_file(input, output)?;
    if matches!(output_mode, OutputMode::Json) {
        JsonOutput::print_set_file(&result).into_diagnostic()?;
    }
    Ok(0)
}

fn run_check_columns(args: CheckColumnsArgs, output_mode: OutputMode) -> miette::Result<u8> {
    let result = columns::check_file(&args.file, args.num_columns)?;
    match output_mode {
        OutputMode::Json => JsonOutput::print_columns(&result).into_diagnostic()?,
        OutputMode::Text => TextOutput::print_columns(&result).into_diagnostic()?,
    }
    Ok(if result.passed() { 0 } else { 1 })
}
